//! Schema type definitions for typed command arguments.
//!
//! This module defines the in-memory model produced by the loader and
//! consumed by the [`ArgumentCompiler`](crate::ArgumentCompiler): a
//! [`Schema`] naming the executable to invoke, and an ordered list of
//! [`Parameter`]s, each carrying a [`KindSpec`] with only the fields its kind
//! needs.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Schema document format version understood by this engine.
///
/// A loaded document declaring a different version still loads; the loader
/// reports the difference as a [`LoadWarning`](crate::LoadWarning).
pub const ENGINE_SCHEMA_VERSION: u32 = 1;

/// Title used when a document does not declare one.
pub const DEFAULT_TITLE: &str = "Untitled";

/// Format used by value kinds when a document does not declare one.
pub const DEFAULT_FORMAT: &str = "%s";

/// Format used by `num` parameters when a document does not declare one.
pub const DEFAULT_NUMBER_FORMAT: &str = "%d";

/// Parameter kind, named by its document tag.
///
/// # Examples
///
/// ```
/// use command_args_core::ParameterKind;
///
/// assert_eq!(ParameterKind::from_tag("fmtstr"), Some(ParameterKind::FmtStr));
/// assert_eq!(ParameterKind::Num.as_str(), "num");
/// assert_eq!(ParameterKind::from_tag("matrix"), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterKind {
    /// On/off switch mapped to a true or false token.
    Bool,
    /// Literal token taken verbatim from the schema.
    Str,
    /// Free-form value substituted into a format.
    FmtStr,
    /// Value restricted to a fixed set of options.
    Choose,
    /// File path, with picker metadata.
    File,
    /// Directory or generic path.
    Path,
    /// Numeric value, optionally clamped.
    Num,
}

impl ParameterKind {
    /// All supported kinds, in declaration order.
    pub const ALL: [ParameterKind; 7] = [
        ParameterKind::Bool,
        ParameterKind::Str,
        ParameterKind::FmtStr,
        ParameterKind::Choose,
        ParameterKind::File,
        ParameterKind::Path,
        ParameterKind::Num,
    ];

    /// Returns the document tag (`"type"` value) for this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            ParameterKind::Bool => "bool",
            ParameterKind::Str => "str",
            ParameterKind::FmtStr => "fmtstr",
            ParameterKind::Choose => "choose",
            ParameterKind::File => "file",
            ParameterKind::Path => "path",
            ParameterKind::Num => "num",
        }
    }

    /// Resolves a document tag to a kind.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == tag)
    }

    /// Returns `true` for kinds that read a runtime value.
    pub fn takes_value(self) -> bool {
        !matches!(self, ParameterKind::Bool | ParameterKind::Str)
    }
}

impl fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a file picker should treat a `file` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileMethod {
    /// Pick an existing file (the default).
    #[default]
    Open,
    /// Choose a destination file name.
    Save,
}

/// Kind-specific fields of a parameter.
///
/// Each variant carries only the fields its kind uses. Documents with a
/// `type` this engine does not know load as [`KindSpec::Unsupported`] so that
/// newer schemas still open; compiling such a parameter fails.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum KindSpec {
    /// `bool`: emits `true_token` or `false_token` depending on the value.
    Bool {
        true_token: Option<String>,
        false_token: Option<String>,
    },
    /// `str`: emits `literal` verbatim.
    Str { literal: Option<String> },
    /// `fmtstr`: emits `format` applied to the value.
    FmtStr { format: String },
    /// `choose`: emits `format` applied to a member of `options`.
    Choose {
        options: Vec<String>,
        default: String,
        format: String,
    },
    /// `file`: like `fmtstr`; `method` and `extensions` are picker metadata.
    File {
        format: String,
        method: FileMethod,
        extensions: Vec<String>,
    },
    /// `path`: like `fmtstr`.
    Path { format: String },
    /// `num`: emits `format` applied to the value clamped into `[min, max]`.
    Num {
        format: String,
        min: Option<f64>,
        max: Option<f64>,
    },
    /// A `type` tag this engine does not handle.
    Unsupported { kind: String },
}

impl KindSpec {
    /// A `bool` spec with the given tokens.
    pub fn boolean(true_token: Option<&str>, false_token: Option<&str>) -> Self {
        KindSpec::Bool {
            true_token: true_token.map(String::from),
            false_token: false_token.map(String::from),
        }
    }

    /// A `str` spec emitting `literal`.
    pub fn literal(literal: &str) -> Self {
        KindSpec::Str {
            literal: Some(literal.to_string()),
        }
    }

    /// A `fmtstr` spec.
    pub fn formatted(format: &str) -> Self {
        KindSpec::FmtStr {
            format: format.to_string(),
        }
    }

    /// A `choose` spec. Duplicate options are dropped, keeping first occurrence.
    pub fn choice(options: &[&str], default: &str, format: &str) -> Self {
        KindSpec::Choose {
            options: dedup_ordered(options.iter().map(|o| o.to_string())),
            default: default.to_string(),
            format: format.to_string(),
        }
    }

    /// A `file` spec.
    pub fn file(format: &str, method: FileMethod, extensions: &[&str]) -> Self {
        KindSpec::File {
            format: format.to_string(),
            method,
            extensions: dedup_ordered(extensions.iter().map(|e| e.to_string())),
        }
    }

    /// A `path` spec.
    pub fn path(format: &str) -> Self {
        KindSpec::Path {
            format: format.to_string(),
        }
    }

    /// A `num` spec.
    pub fn number(format: &str, min: Option<f64>, max: Option<f64>) -> Self {
        KindSpec::Num {
            format: format.to_string(),
            min,
            max,
        }
    }

    /// Returns the kind, or `None` for [`KindSpec::Unsupported`].
    pub fn kind(&self) -> Option<ParameterKind> {
        match self {
            KindSpec::Bool { .. } => Some(ParameterKind::Bool),
            KindSpec::Str { .. } => Some(ParameterKind::Str),
            KindSpec::FmtStr { .. } => Some(ParameterKind::FmtStr),
            KindSpec::Choose { .. } => Some(ParameterKind::Choose),
            KindSpec::File { .. } => Some(ParameterKind::File),
            KindSpec::Path { .. } => Some(ParameterKind::Path),
            KindSpec::Num { .. } => Some(ParameterKind::Num),
            KindSpec::Unsupported { .. } => None,
        }
    }

    /// Returns the document tag, including unsupported ones.
    pub fn tag(&self) -> &str {
        match self {
            KindSpec::Unsupported { kind } => kind,
            other => other.kind().map_or("", ParameterKind::as_str),
        }
    }
}

pub(crate) fn dedup_ordered(items: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

/// A named parameter of a [`Schema`].
///
/// # Examples
///
/// ```
/// use command_args_core::{KindSpec, Parameter, ParameterKind};
///
/// let param = Parameter::new("opt", KindSpec::literal("-O2"));
/// assert_eq!(param.prompt, "opt");
/// assert_eq!(param.spec.kind(), Some(ParameterKind::Str));
///
/// let param = param.with_prompt("Optimize");
/// assert_eq!(param.prompt, "Optimize");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameter {
    /// Key of the parameter in the document
    pub name: String,
    /// Display label for collaborators; the name when not given
    pub prompt: String,
    /// Kind and kind-specific fields
    pub spec: KindSpec,
}

impl Parameter {
    /// Creates a parameter whose prompt is its name.
    pub fn new(name: &str, spec: KindSpec) -> Self {
        Self {
            name: name.to_string(),
            prompt: name.to_string(),
            spec,
        }
    }

    /// Sets the prompt label.
    pub fn with_prompt(mut self, prompt: &str) -> Self {
        self.prompt = prompt.to_string();
        self
    }
}

/// A loaded schema: the executable and its parameters in document order.
///
/// Read-only once built. Lookups by name are O(1) through an internal index.
///
/// # Examples
///
/// ```
/// use command_args_core::{KindSpec, Parameter, Schema};
///
/// let schema = Schema::new("g++")
///     .with_title("Compile")
///     .with_parameter(Parameter::new("source", KindSpec::formatted("%s")))
///     .with_parameter(Parameter::new("opt", KindSpec::literal("-O2")));
///
/// assert_eq!(schema.executable, "g++");
/// assert_eq!(schema.parameter_names(), vec!["source", "opt"]);
/// assert!(schema.get("opt").is_some());
/// assert!(schema.get("missing").is_none());
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct Schema {
    /// Document format version
    pub version: u32,
    /// Display title
    pub title: String,
    /// Program to invoke; may be empty
    pub executable: String,
    parameters: Vec<Parameter>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl Schema {
    /// Creates an empty schema for `executable` at the engine's version.
    pub fn new(executable: &str) -> Self {
        Self {
            version: ENGINE_SCHEMA_VERSION,
            title: DEFAULT_TITLE.to_string(),
            executable: executable.to_string(),
            parameters: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Sets the title.
    pub fn with_title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    /// Sets the declared document version.
    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    /// Adds a parameter at the end. A parameter with the same name is
    /// replaced in place and keeps its position.
    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.insert(parameter);
        self
    }

    pub(crate) fn insert(&mut self, parameter: Parameter) {
        match self.index.get(&parameter.name) {
            Some(&position) => self.parameters[position] = parameter,
            None => {
                self.index
                    .insert(parameter.name.clone(), self.parameters.len());
                self.parameters.push(parameter);
            }
        }
    }

    /// Looks up a parameter by name.
    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.index.get(name).map(|&i| &self.parameters[i])
    }

    /// Parameters in document order.
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Parameter names in document order.
    pub fn parameter_names(&self) -> Vec<&str> {
        self.parameters.iter().map(|p| p.name.as_str()).collect()
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    /// Returns `true` if the schema declares no parameters.
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// Returns `true` when the declared version matches
    /// [`ENGINE_SCHEMA_VERSION`].
    pub fn is_current_version(&self) -> bool {
        self.version == ENGINE_SCHEMA_VERSION
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_tags_round_trip() {
        for kind in ParameterKind::ALL {
            assert_eq!(ParameterKind::from_tag(kind.as_str()), Some(kind));
        }
        assert_eq!(ParameterKind::from_tag(""), None);
    }

    #[test]
    fn test_takes_value() {
        assert!(!ParameterKind::Bool.takes_value());
        assert!(!ParameterKind::Str.takes_value());
        assert!(ParameterKind::Num.takes_value());
        assert!(ParameterKind::Choose.takes_value());
    }

    #[test]
    fn test_unsupported_spec_keeps_tag() {
        let spec = KindSpec::Unsupported {
            kind: "matrix".into(),
        };
        assert_eq!(spec.kind(), None);
        assert_eq!(spec.tag(), "matrix");
        assert_eq!(KindSpec::path("%s").tag(), "path");
    }

    #[test]
    fn test_choice_drops_duplicate_options() {
        let spec = KindSpec::choice(&["a", "b", "a"], "a", "%s");
        let KindSpec::Choose { options, .. } = spec else {
            panic!("expected choose spec");
        };
        assert_eq!(options, vec!["a", "b"]);
    }

    #[test]
    fn test_replacing_parameter_keeps_position() {
        let schema = Schema::new("tool")
            .with_parameter(Parameter::new("a", KindSpec::literal("-a")))
            .with_parameter(Parameter::new("b", KindSpec::literal("-b")))
            .with_parameter(Parameter::new("a", KindSpec::literal("-A")));

        assert_eq!(schema.parameter_names(), vec!["a", "b"]);
        assert_eq!(schema.get("a").unwrap().spec, KindSpec::literal("-A"));
    }

    #[test]
    fn test_new_schema_defaults() {
        let schema = Schema::new("");
        assert_eq!(schema.title, DEFAULT_TITLE);
        assert!(schema.is_current_version());
        assert!(schema.is_empty());
    }
}
