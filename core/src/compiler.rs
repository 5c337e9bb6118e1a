//! Argument compilation: validating runtime values and rendering tokens.
//!
//! An [`ArgumentCompiler`] owns one [`Schema`] and a token buffer seeded with
//! the executable. Each `add_*` call validates one value against its
//! parameter and appends at most one token. A pass is `reset`, then one add
//! per parameter, then `render`; the compiler never resets on its own.
//!
//! Recoverable corrections (an invalid choice replaced by its default, a
//! number clamped into range) do not fail the call. They are logged and
//! recorded as [`CompileEvent`]s until the next reset.
//!
//! # Examples
//!
//! ```
//! use command_args_core::{ArgValue, ArgumentCompiler, KindSpec, Parameter, Schema};
//!
//! let schema = Schema::new("g++")
//!     .with_parameter(Parameter::new("source", KindSpec::formatted("%s")))
//!     .with_parameter(Parameter::new("opt", KindSpec::literal("-O2")))
//!     .with_parameter(Parameter::new("jobs", KindSpec::number("-j%d", Some(1.0), Some(4.0))));
//!
//! let mut compiler = ArgumentCompiler::new(schema);
//! compiler.add_parameter("source", Some(&"main.cpp".into())).unwrap();
//! compiler.add_parameter("opt", None).unwrap();
//! compiler.add_number("jobs", &ArgValue::Int(10)).unwrap();
//!
//! assert_eq!(compiler.render(), "g++ main.cpp -O2 -j4");
//! assert_eq!(compiler.events().len(), 1);
//!
//! compiler.reset();
//! assert_eq!(compiler.render(), "g++");
//! ```

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{CompileError, Result};
use crate::format;
use crate::types::{KindSpec, Parameter, ParameterKind, Schema};
use crate::value::ArgValue;

/// Which bound a clamp was applied against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Bound {
    Min,
    Max,
}

/// A recoverable correction applied while compiling a value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CompileEvent {
    /// A `choose` value outside its options was replaced by the default.
    ChoiceSubstituted {
        name: String,
        rejected: Option<String>,
        substituted: String,
    },
    /// A `num` value was moved onto a bound.
    Clamped {
        name: String,
        bound: Bound,
        original: ArgValue,
        clamped: ArgValue,
    },
}

impl fmt::Display for CompileEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileEvent::ChoiceSubstituted {
                name,
                rejected: Some(rejected),
                substituted,
            } => write!(f, "{name}: '{rejected}' is not an option, using '{substituted}'"),
            CompileEvent::ChoiceSubstituted {
                name, substituted, ..
            } => write!(f, "{name}: no choice given, using '{substituted}'"),
            CompileEvent::Clamped {
                name,
                bound,
                original,
                clamped,
            } => {
                let relation = match bound {
                    Bound::Min => "below minimum",
                    Bound::Max => "above maximum",
                };
                write!(f, "{name}: {original} is {relation}, clamped to {clamped}")
            }
        }
    }
}

/// Result of compiling one parameter, before it touches the buffer.
#[derive(Debug, Default)]
struct Step {
    token: Option<String>,
    events: Vec<CompileEvent>,
}

impl Step {
    fn token(token: String) -> Self {
        Self {
            token: Some(token),
            events: Vec::new(),
        }
    }

    fn suppressed() -> Self {
        Self::default()
    }
}

/// Builds a command invocation from a [`Schema`] and runtime values.
///
/// Not meant to be shared: callers serialize a whole
/// `reset` → `add_*` → `render` pass per compiler.
#[derive(Debug, Clone)]
pub struct ArgumentCompiler {
    schema: Schema,
    tokens: Vec<String>,
    events: Vec<CompileEvent>,
}

impl ArgumentCompiler {
    /// Creates a compiler whose invocation holds only the executable.
    pub fn new(schema: Schema) -> Self {
        let tokens = vec![schema.executable.clone()];
        Self {
            schema,
            tokens,
            events: Vec::new(),
        }
    }

    /// Tokens of the current invocation, executable first.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Corrections recorded since the last reset.
    pub fn events(&self) -> &[CompileEvent] {
        &self.events
    }

    /// Returns the kind of parameter `name`.
    ///
    /// # Errors
    ///
    /// [`CompileError::UnknownParameter`] if there is no such parameter and
    /// [`CompileError::UnsupportedKind`] if its type has no handler.
    pub fn parameter_kind(&self, name: &str) -> Result<ParameterKind> {
        let parameter = self.lookup(name)?;
        parameter
            .spec
            .kind()
            .ok_or_else(|| unsupported(parameter))
    }

    /// Prompt labels of all parameters, in schema order.
    pub fn prompts(&self) -> Vec<&str> {
        self.schema
            .parameters()
            .iter()
            .map(|p| p.prompt.as_str())
            .collect()
    }

    /// Truncates the invocation back to the executable and clears events.
    pub fn reset(&mut self) {
        self.tokens.truncate(1);
        self.events.clear();
        debug!(executable = %self.schema.executable, "Reset invocation");
    }

    /// Joins the current tokens with single spaces.
    pub fn render(&self) -> String {
        self.tokens.join(" ")
    }

    /// Adds parameter `name`, dispatching on its kind.
    ///
    /// `value` is ignored by `str`. For `bool` an absent value means `true`;
    /// for the other kinds an absent value is falsy, so `fmtstr`, `file`,
    /// `path` and `num` append nothing and `choose` falls back to its
    /// default.
    ///
    /// # Errors
    ///
    /// [`CompileError::UnknownParameter`], [`CompileError::UnsupportedKind`],
    /// and any error of the kind-specific operation. On error nothing is
    /// appended.
    pub fn add_parameter(&mut self, name: &str, value: Option<&ArgValue>) -> Result<()> {
        let kind = self.parameter_kind(name)?;
        self.apply(name, kind, value)
    }

    /// Adds a `bool` parameter: its true token when `value` is true, its
    /// false token otherwise, or nothing if that token is unset or empty.
    pub fn add_bool(&mut self, name: &str, value: bool) -> Result<()> {
        self.apply(name, ParameterKind::Bool, Some(&ArgValue::Bool(value)))
    }

    /// Adds a `str` parameter: its literal, if set and non-empty.
    pub fn add_literal(&mut self, name: &str) -> Result<()> {
        self.apply(name, ParameterKind::Str, None)
    }

    /// Adds a `fmtstr` parameter. A falsy value appends nothing.
    pub fn add_formatted(&mut self, name: &str, value: &ArgValue) -> Result<()> {
        self.apply(name, ParameterKind::FmtStr, Some(value))
    }

    /// Adds a `choose` parameter. A value outside the options is replaced by
    /// the default and a [`CompileEvent::ChoiceSubstituted`] is recorded.
    ///
    /// # Errors
    ///
    /// [`CompileError::NoValidChoice`] if the value is rejected and the
    /// default is empty.
    pub fn add_choice(&mut self, name: &str, value: &ArgValue) -> Result<()> {
        self.apply(name, ParameterKind::Choose, Some(value))
    }

    /// Adds a `file` parameter. A falsy value appends nothing.
    pub fn add_file(&mut self, name: &str, value: &ArgValue) -> Result<()> {
        self.apply(name, ParameterKind::File, Some(value))
    }

    /// Adds a `path` parameter. A falsy value appends nothing.
    pub fn add_path(&mut self, name: &str, value: &ArgValue) -> Result<()> {
        self.apply(name, ParameterKind::Path, Some(value))
    }

    /// Adds a `num` parameter. A falsy value appends nothing; values outside
    /// a set bound are clamped onto it and a [`CompileEvent::Clamped`] is
    /// recorded.
    ///
    /// # Errors
    ///
    /// [`CompileError::InvalidValue`] if the value is not numeric.
    pub fn add_number(&mut self, name: &str, value: &ArgValue) -> Result<()> {
        self.apply(name, ParameterKind::Num, Some(value))
    }

    /// Runs a full pass: reset, add every parameter in schema order with its
    /// value from `values`, and render.
    ///
    /// A `bool` without a value is added as `false`; a `str` is added only
    /// when its value is truthy; value kinds without a value are added with
    /// none. Values for names the schema does not declare are rejected.
    ///
    /// # Errors
    ///
    /// The first error of any add; tokens added before it remain.
    pub fn compile(&mut self, values: &HashMap<String, ArgValue>) -> Result<String> {
        if let Some(unknown) = values.keys().find(|name| self.schema.get(name).is_none()) {
            return Err(CompileError::UnknownParameter(unknown.clone()));
        }

        self.reset();
        let names: Vec<String> = self
            .schema
            .parameters()
            .iter()
            .map(|p| p.name.clone())
            .collect();

        for name in &names {
            let value = values.get(name);
            match self.parameter_kind(name)? {
                ParameterKind::Bool => {
                    self.add_bool(name, value.is_some_and(ArgValue::is_truthy))?;
                }
                ParameterKind::Str => {
                    if value.is_some_and(ArgValue::is_truthy) {
                        self.add_literal(name)?;
                    }
                }
                kind => self.apply(name, kind, value)?,
            }
        }

        Ok(self.render())
    }

    fn lookup(&self, name: &str) -> Result<&Parameter> {
        self.schema
            .get(name)
            .ok_or_else(|| CompileError::UnknownParameter(name.to_string()))
    }

    fn apply(&mut self, name: &str, expected: ParameterKind, value: Option<&ArgValue>) -> Result<()> {
        let step = {
            let parameter = self.lookup(name)?;
            compile_step(parameter, expected, value)?
        };

        for event in &step.events {
            warn!(parameter = name, "{event}");
        }
        self.events.extend(step.events);

        match step.token {
            Some(token) => {
                debug!(parameter = name, token = %token, "Appended token");
                self.tokens.push(token);
            }
            None => debug!(parameter = name, "Suppressed parameter"),
        }
        Ok(())
    }
}

fn unsupported(parameter: &Parameter) -> CompileError {
    CompileError::UnsupportedKind {
        name: parameter.name.clone(),
        kind: parameter.spec.tag().to_string(),
    }
}

fn compile_step(
    parameter: &Parameter,
    expected: ParameterKind,
    value: Option<&ArgValue>,
) -> Result<Step> {
    let name = parameter.name.as_str();
    match parameter.spec.kind() {
        None => return Err(unsupported(parameter)),
        Some(found) if found != expected => {
            return Err(CompileError::KindMismatch {
                name: name.to_string(),
                expected,
                found: found.to_string(),
            });
        }
        Some(_) => {}
    }

    match &parameter.spec {
        KindSpec::Bool {
            true_token,
            false_token,
        } => {
            let token = if value.is_none_or(ArgValue::is_truthy) {
                true_token
            } else {
                false_token
            };
            Ok(non_empty(token.as_deref()))
        }
        KindSpec::Str { literal } => Ok(non_empty(literal.as_deref())),
        KindSpec::FmtStr { format } | KindSpec::File { format, .. } | KindSpec::Path { format } => {
            match value.filter(|v| v.is_truthy()) {
                Some(value) => render(name, format, value).map(Step::token),
                None => Ok(Step::suppressed()),
            }
        }
        KindSpec::Choose {
            options,
            default,
            format,
        } => compile_choice(name, options, default, format, value),
        KindSpec::Num { format, min, max } => compile_number(name, format, *min, *max, value),
        KindSpec::Unsupported { .. } => Err(unsupported(parameter)),
    }
}

fn non_empty(token: Option<&str>) -> Step {
    match token {
        Some(token) if !token.is_empty() => Step::token(token.to_string()),
        _ => Step::suppressed(),
    }
}

fn render(name: &str, format: &str, value: &ArgValue) -> Result<String> {
    format::apply(format, value).map_err(|source| CompileError::Format {
        name: name.to_string(),
        source,
    })
}

fn compile_choice(
    name: &str,
    options: &[String],
    default: &str,
    format: &str,
    value: Option<&ArgValue>,
) -> Result<Step> {
    let requested = value.map(ArgValue::to_string);
    if let Some(choice) = requested.as_ref().filter(|c| options.contains(c)) {
        return render(name, format, &ArgValue::Text(choice.clone())).map(Step::token);
    }

    if default.is_empty() {
        return Err(CompileError::NoValidChoice(name.to_string()));
    }
    let token = render(name, format, &ArgValue::Text(default.to_string()))?;
    Ok(Step {
        token: Some(token),
        events: vec![CompileEvent::ChoiceSubstituted {
            name: name.to_string(),
            rejected: requested,
            substituted: default.to_string(),
        }],
    })
}

fn compile_number(
    name: &str,
    format: &str,
    min: Option<f64>,
    max: Option<f64>,
    value: Option<&ArgValue>,
) -> Result<Step> {
    let Some(value) = value.filter(|v| v.is_truthy()) else {
        return Ok(Step::suppressed());
    };
    let number = value.to_number().ok_or_else(|| CompileError::InvalidValue {
        name: name.to_string(),
        kind: ParameterKind::Num,
        value: value.to_string(),
    })?;
    if !number.is_truthy() {
        return Ok(Step::suppressed());
    }

    let mut current = number;
    let mut events = Vec::new();
    for (bound, limit) in [(Bound::Min, min), (Bound::Max, max)] {
        let Some(limit) = limit else { continue };
        let Some(x) = current.as_f64() else { continue };
        let violated = match bound {
            Bound::Min => x < limit,
            Bound::Max => x > limit,
        };
        if violated {
            let clamped = bound_value(limit, &current);
            events.push(CompileEvent::Clamped {
                name: name.to_string(),
                bound,
                original: current.clone(),
                clamped: clamped.clone(),
            });
            current = clamped;
        }
    }

    let token = render(name, format, &current)?;
    Ok(Step {
        token: Some(token),
        events,
    })
}

/// A bound as a value of the same flavour as `like`, when it fits.
fn bound_value(limit: f64, like: &ArgValue) -> ArgValue {
    let integral = limit.fract() == 0.0 && limit.abs() < i64::MAX as f64;
    match like {
        ArgValue::Int(_) if integral => ArgValue::Int(limit as i64),
        _ => ArgValue::Float(limit),
    }
}
