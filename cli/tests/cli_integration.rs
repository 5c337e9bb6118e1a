use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

/// Helper to create a temp directory that is cleaned up on drop.
struct TempDir {
    path: PathBuf,
}

impl TempDir {
    fn new(name: &str) -> Self {
        let path = std::env::temp_dir().join(format!(
            "command_args_cli_test_{name}_{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&path);
        fs::create_dir_all(&path).expect("failed to create temp dir");
        Self { path }
    }

    fn join(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

/// Schema for a fictional compiler whose executable is `echo`, so runs are
/// observable without a toolchain.
fn write_echo_schema(dir: &TempDir) -> PathBuf {
    let json = serde_json::json!({
        "version": 1,
        "title": "Compile C++",
        "exec": "echo",
        "args": {
            "source": {"type": "fmtstr", "format": "%s", "prompt": "Source File"},
            "save": {"type": "fmtstr", "format": "-o %s", "prompt": "Save As"},
            "std": {"type": "choose", "options": ["c++11", "c++17"], "default": "c++11",
                    "format": "-std=%s", "prompt": "Standard"},
            "jobs": {"type": "num", "min": 1, "max": 4, "format": "-j%d"},
            "opt": {"type": "str", "value": "-O2", "prompt": "O2"}
        }
    });
    let path = dir.join("cfg.json");
    fs::write(&path, serde_json::to_string_pretty(&json).unwrap()).expect("failed to write schema");
    path
}

fn bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_command-args"))
}

fn stdout_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

// ---------------------------------------------------------------------------
// render
// ---------------------------------------------------------------------------

#[test]
fn render_prints_compiled_command() {
    let dir = TempDir::new("render");
    let schema = write_echo_schema(&dir);

    let output = bin()
        .arg("render")
        .arg(&schema)
        .args(["--set", "source=main.cpp", "--set", "opt=y", "--set", "jobs=10"])
        .output()
        .unwrap();

    assert!(output.status.success(), "{output:?}");
    assert_eq!(stdout_of(&output).trim_end(), "echo main.cpp -std=c++11 -j4 -O2");
}

#[test]
fn render_json_reports_events() {
    let dir = TempDir::new("render_json");
    let schema = write_echo_schema(&dir);

    let output = bin()
        .arg("render")
        .arg(&schema)
        .args(["--set", "std=c++99", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{output:?}");

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["command"], "echo -std=c++11");
    assert_eq!(value["tokens"], serde_json::json!(["echo", "-std=c++11"]));
    assert_eq!(value["events"][0]["event"], "choice_substituted");
    assert_eq!(value["events"][0]["rejected"], "c++99");
}

#[test]
fn render_rejects_unknown_parameter() {
    let dir = TempDir::new("render_unknown");
    let schema = write_echo_schema(&dir);

    let output = bin()
        .arg("render")
        .arg(&schema)
        .args(["--set", "bogus=1"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown parameter: bogus"));
}

#[test]
fn render_rejects_non_numeric_number() {
    let dir = TempDir::new("render_nan");
    let schema = write_echo_schema(&dir);

    let output = bin()
        .arg("render")
        .arg(&schema)
        .args(["--set", "jobs=many"])
        .output()
        .unwrap();
    assert!(!output.status.success());
}

// ---------------------------------------------------------------------------
// show / validate
// ---------------------------------------------------------------------------

#[test]
fn show_lists_parameters_in_order() {
    let dir = TempDir::new("show");
    let schema = write_echo_schema(&dir);

    let output = bin().arg("show").arg(&schema).output().unwrap();
    assert!(output.status.success(), "{output:?}");

    let stdout = stdout_of(&output);
    assert!(stdout.starts_with("Compile C++\n"));
    let order: Vec<usize> = ["source", "save", "std", "jobs", "opt"]
        .iter()
        .map(|name| stdout.find(&format!("  {name} ")).unwrap())
        .collect();
    assert!(order.windows(2).all(|w| w[0] < w[1]), "{stdout}");
}

#[test]
fn show_json_serializes_schema_with_defaults() {
    let dir = TempDir::new("show_json");
    let schema = write_echo_schema(&dir);

    let output = bin().arg("show").arg(&schema).arg("--json").output().unwrap();
    assert!(output.status.success(), "{output:?}");

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["schema"]["executable"], "echo");
    assert_eq!(value["schema"]["version"], 1);
    assert_eq!(value["warnings"].as_array().map(Vec::len), Some(0));

    let parameters = value["schema"]["parameters"].as_array().unwrap();
    let names: Vec<&str> = parameters
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["source", "save", "std", "jobs", "opt"]);
    assert_eq!(parameters[2]["spec"]["type"], "choose");
    assert_eq!(parameters[2]["spec"]["default"], "c++11");
    assert_eq!(parameters[3]["prompt"], "jobs");
    assert_eq!(parameters[3]["spec"]["max"], 4.0);
}

#[test]
fn validate_reports_missing_and_malformed() {
    let dir = TempDir::new("validate");
    let good = write_echo_schema(&dir);
    let bad = dir.join("bad.json");
    fs::write(&bad, "{\"args\": 3}").unwrap();
    let missing = dir.join("missing.json");

    let output = bin().arg("validate").arg(&good).output().unwrap();
    assert!(output.status.success(), "{output:?}");

    let output = bin()
        .arg("validate")
        .arg(&good)
        .arg(&bad)
        .arg(&missing)
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("malformed schema"), "{stderr}");
    assert!(stderr.contains("schema not found"), "{stderr}");
}

#[test]
fn version_mismatch_is_not_fatal() {
    let dir = TempDir::new("version");
    let path = dir.join("v9.json");
    fs::write(&path, r#"{"version": 9, "exec": "echo"}"#).unwrap();

    let output = bin().arg("validate").arg(&path).output().unwrap();
    assert!(output.status.success(), "{output:?}");
    assert!(stdout_of(&output).contains("warning: schema version 9"));
}

// ---------------------------------------------------------------------------
// run
// ---------------------------------------------------------------------------

#[test]
fn run_dry_run_does_not_execute() {
    let dir = TempDir::new("dry_run");
    let schema = write_echo_schema(&dir);

    let output = bin()
        .arg("run")
        .arg(&schema)
        .args(["--set", "source=a.cpp", "--dry-run"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{output:?}");
    assert_eq!(stdout_of(&output), "echo a.cpp -std=c++11\n");
}

#[test]
fn run_executes_and_captures_output() {
    let dir = TempDir::new("run");
    let schema = write_echo_schema(&dir);

    let output = bin()
        .arg("run")
        .arg(&schema)
        .args(["--set", "source=hello.cpp", "--set", "std=c++17"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{output:?}");

    let stdout = stdout_of(&output);
    assert!(stdout.contains("Running echo hello.cpp -std=c++17 ..."), "{stdout}");
    assert!(stdout.contains("Standard Output:\nhello.cpp -std=c++17\n"), "{stdout}");
    assert!(stdout.contains("Command executed with exit code: 0"), "{stdout}");
}

#[test]
fn run_interactive_reads_answers_from_stdin() {
    let dir = TempDir::new("interactive");
    let schema = write_echo_schema(&dir);

    let mut child = bin()
        .arg("run")
        .arg(&schema)
        .args(["--interactive", "--dry-run"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"main.cpp\na.out\nc++17\n2\ny\n")
        .unwrap();
    let output = child.wait_with_output().unwrap();
    assert!(output.status.success(), "{output:?}");

    let stdout = stdout_of(&output);
    assert!(stdout.contains("Source File: "), "{stdout}");
    assert!(
        stdout.ends_with("echo main.cpp -o a.out -std=c++17 -j2 -O2\n"),
        "{stdout}"
    );
}

#[test]
fn run_reports_failing_command() {
    let dir = TempDir::new("run_fail");
    let path = dir.join("false.json");
    fs::write(&path, r#"{"exec": "false"}"#).unwrap();

    let output = bin().arg("run").arg(&path).output().unwrap();
    assert!(!output.status.success());
    assert!(stdout_of(&output).contains("Command executed with exit code: 1"));
}

#[test]
fn run_uses_runner_config() {
    let dir = TempDir::new("run_config");
    let schema = dir.join("slow.json");
    fs::write(
        &schema,
        r#"{"exec": "exec sleep", "args": {"secs": {"type": "num", "format": "%d"}}}"#,
    )
    .unwrap();
    let config = dir.join("runner.yml");
    fs::write(&config, "shell: sh\ntimeout_secs: 1\n").unwrap();

    let output = bin()
        .arg("run")
        .arg(&schema)
        .args(["--set", "secs=5", "--config"])
        .arg(&config)
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("timed out"));
}
