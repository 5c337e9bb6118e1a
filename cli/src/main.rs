mod config;
mod prompt;
mod runner;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use command_args_core::{ArgValue, ArgumentCompiler, Schema, load_path};
use tracing_subscriber::EnvFilter;

use crate::config::RunnerConfig;

const DEFAULT_SCHEMA: &str = "cfg.json";

#[derive(Debug, Parser)]
#[command(name = "command-args")]
#[command(about = "Render and run commands described by typed argument schemas")]
struct Cli {
    /// Log compilation details to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show a schema's title, executable, and parameters.
    Show(ShowArgs),
    /// Compile values into a command line and print it.
    Render(RenderArgs),
    /// Collect values, compile, and execute the command.
    Run(RunArgs),
    /// Check that one or more schema documents load.
    Validate(ValidateArgs),
}

#[derive(Debug, Args)]
struct ShowArgs {
    /// Schema document (JSON, or YAML by extension).
    #[arg(default_value = DEFAULT_SCHEMA)]
    schema: PathBuf,
    /// Print the loaded schema, defaults applied, as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Args)]
struct ValueArgs {
    /// Parameter value as NAME=VALUE; repeatable.
    #[arg(long = "set", value_name = "NAME=VALUE")]
    set: Vec<String>,
}

#[derive(Debug, Args)]
struct RenderArgs {
    /// Schema document (JSON, or YAML by extension).
    #[arg(default_value = DEFAULT_SCHEMA)]
    schema: PathBuf,
    #[command(flatten)]
    values: ValueArgs,
    /// Print the command, tokens, and corrections as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Args)]
struct RunArgs {
    /// Schema document (JSON, or YAML by extension).
    #[arg(default_value = DEFAULT_SCHEMA)]
    schema: PathBuf,
    #[command(flatten)]
    values: ValueArgs,
    /// Prompt on stdin for parameters not given with --set.
    #[arg(short, long)]
    interactive: bool,
    /// Print the command without executing it.
    #[arg(long)]
    dry_run: bool,
    /// Runner configuration (YAML).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Kill the command after this many seconds (overrides the config).
    #[arg(long)]
    timeout: Option<u64>,
}

#[derive(Debug, Args)]
struct ValidateArgs {
    /// Schema documents to check.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Show(args) => run_show(args),
        Command::Render(args) => run_render(args),
        Command::Run(args) => run_run(args),
        Command::Validate(args) => run_validate(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_schema(path: &Path) -> Result<Schema, String> {
    load_path(path)
        .map(|outcome| outcome.schema)
        .map_err(|err| err.to_string())
}

/// Turns `NAME=VALUE` pairs into runtime values typed by each parameter's
/// kind.
fn parse_values(schema: &Schema, pairs: &[String]) -> Result<HashMap<String, ArgValue>, String> {
    let mut values = HashMap::new();
    for pair in pairs {
        let (name, raw) = pair
            .split_once('=')
            .ok_or_else(|| format!("expected NAME=VALUE, got '{pair}'"))?;
        let parameter = schema
            .get(name)
            .ok_or_else(|| format!("unknown parameter: {name}"))?;
        let kind = parameter.spec.kind().ok_or_else(|| {
            format!(
                "parameter '{name}' has unsupported type '{}'",
                parameter.spec.tag()
            )
        })?;
        let value = ArgValue::parse_for(kind, raw)
            .ok_or_else(|| format!("invalid value for '{name}' ({kind}): '{raw}'"))?;
        values.insert(name.to_string(), value);
    }
    Ok(values)
}

// ---------------------------------------------------------------------------
// show / validate
// ---------------------------------------------------------------------------

fn run_show(args: ShowArgs) -> Result<(), String> {
    let outcome = load_path(&args.schema).map_err(|err| err.to_string())?;
    let schema = &outcome.schema;

    if args.json {
        let warnings: Vec<String> = outcome.warnings.iter().map(ToString::to_string).collect();
        let output = serde_json::json!({
            "schema": schema,
            "warnings": warnings,
        });
        let json = serde_json::to_string_pretty(&output)
            .map_err(|e| format!("Failed to serialize output: {e}"))?;
        println!("{json}");
        return Ok(());
    }

    println!("{}", schema.title);
    println!("executable: {}", schema.executable);
    println!("version: {}", schema.version);
    for warning in &outcome.warnings {
        println!("warning: {warning}");
    }
    for parameter in schema.parameters() {
        println!(
            "  {:<16} {:<24} {}",
            parameter.name,
            prompt::describe(parameter),
            parameter.prompt
        );
    }
    Ok(())
}

fn run_validate(args: ValidateArgs) -> Result<(), String> {
    let mut failures = 0usize;
    for input in &args.inputs {
        match load_path(input) {
            Ok(outcome) => {
                println!(
                    "ok: {} ({} parameter(s))",
                    input.display(),
                    outcome.schema.len()
                );
                for warning in &outcome.warnings {
                    println!("  warning: {warning}");
                }
            }
            Err(err) => {
                failures += 1;
                eprintln!("invalid: {}: {err}", input.display());
            }
        }
    }

    if failures > 0 {
        return Err(format!(
            "{failures} of {} schema(s) failed to load",
            args.inputs.len()
        ));
    }
    println!("Validated {} schema(s).", args.inputs.len());
    Ok(())
}

// ---------------------------------------------------------------------------
// render / run
// ---------------------------------------------------------------------------

fn run_render(args: RenderArgs) -> Result<(), String> {
    let schema = load_schema(&args.schema)?;
    let values = parse_values(&schema, &args.values.set)?;

    let mut compiler = ArgumentCompiler::new(schema);
    let command = compiler.compile(&values).map_err(|err| err.to_string())?;

    if args.json {
        let output = serde_json::json!({
            "command": command,
            "tokens": compiler.tokens(),
            "events": compiler.events(),
        });
        let json = serde_json::to_string_pretty(&output)
            .map_err(|e| format!("Failed to serialize output: {e}"))?;
        println!("{json}");
    } else {
        println!("{command}");
    }
    Ok(())
}

fn run_run(args: RunArgs) -> Result<(), String> {
    let mut config = match &args.config {
        Some(path) => RunnerConfig::load(path).map_err(|err| err.to_string())?,
        None => RunnerConfig::default(),
    };
    if args.timeout.is_some() {
        config.timeout_secs = args.timeout;
    }

    let schema = load_schema(&args.schema)?;
    let mut values = parse_values(&schema, &args.values.set)?;

    if args.interactive {
        println!("{}", schema.title);
        let stdin = std::io::stdin();
        let stdout = std::io::stdout();
        prompt::collect_values(&schema, &mut values, &mut stdin.lock(), &mut stdout.lock())
            .map_err(|err| format!("Failed to read input: {err}"))?;
    }

    let mut compiler = ArgumentCompiler::new(schema);
    let command = compiler.compile(&values).map_err(|err| err.to_string())?;

    if args.dry_run {
        println!("{command}");
        return Ok(());
    }

    println!("Running {command} ...");
    let execution = runner::execute(&command, &config)
        .map_err(|err| format!("Failed to start '{}': {err}", config.shell))?;

    if config.capture_output {
        if !execution.stdout.is_empty() {
            println!("Standard Output:");
            print!("{}", execution.stdout);
        }
        if !execution.stderr.is_empty() {
            println!("Standard Error:");
            print!("{}", execution.stderr);
        }
    }

    if execution.timed_out {
        return Err(format!(
            "command timed out after {}s",
            config.timeout_secs.unwrap_or_default()
        ));
    }
    match execution.code {
        Some(code) => println!("Command executed with exit code: {code}"),
        None => println!("Command terminated by signal"),
    }
    if !execution.success() {
        return Err("command failed".to_string());
    }
    Ok(())
}
