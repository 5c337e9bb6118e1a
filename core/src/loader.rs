//! Schema document loading.
//!
//! Reads a JSON or YAML document of the form
//!
//! ```json
//! {
//!   "version": 1,
//!   "title": "Compile",
//!   "exec": "g++",
//!   "args": {
//!     "source": { "type": "fmtstr", "format": "%s", "prompt": "Source file" },
//!     "opt":    { "type": "str", "value": "-O2" }
//!   }
//! }
//! ```
//!
//! into a [`Schema`], applying defaults for missing fields. Only the shape of
//! the document is checked: a `choose` parameter with no options loads fine
//! and fails later, when a value is compiled. Unknown top-level keys are
//! ignored, and an unknown parameter `type` loads as
//! [`KindSpec::Unsupported`].
//!
//! # Examples
//!
//! ```
//! use command_args_core::{load_str, ParameterKind, SchemaFormat};
//!
//! let outcome = load_str(r#"{"exec": "g++", "args": {"opt": {"type": "str", "value": "-O2"}}}"#,
//!     SchemaFormat::Json).unwrap();
//! assert_eq!(outcome.schema.title, "Untitled");
//! assert_eq!(outcome.schema.get("opt").unwrap().spec.kind(), Some(ParameterKind::Str));
//! assert!(outcome.warnings.is_empty());
//! ```

use std::fmt;
use std::path::Path;

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::{LoadError, LoadResult};
use crate::types::{
    DEFAULT_FORMAT, DEFAULT_NUMBER_FORMAT, DEFAULT_TITLE, ENGINE_SCHEMA_VERSION, FileMethod,
    KindSpec, Parameter, ParameterKind, Schema, dedup_ordered,
};

/// Serialization format of a schema document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchemaFormat {
    /// JSON (the default).
    #[default]
    Json,
    /// YAML.
    Yaml,
}

impl SchemaFormat {
    /// Picks the format from a file extension: `.yaml`/`.yml` are YAML,
    /// anything else is JSON.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("yaml" | "yml") => SchemaFormat::Yaml,
            _ => SchemaFormat::Json,
        }
    }
}

/// Non-fatal findings reported alongside a successfully loaded schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadWarning {
    /// The document declares a version other than [`ENGINE_SCHEMA_VERSION`].
    VersionMismatch { found: u32, supported: u32 },
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadWarning::VersionMismatch { found, supported } => write!(
                f,
                "schema version {found} differs from supported version {supported}; continuing"
            ),
        }
    }
}

/// A loaded schema plus any advisories raised while loading it.
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    pub schema: Schema,
    pub warnings: Vec<LoadWarning>,
}

#[derive(Debug, Deserialize)]
struct RawSchema {
    #[serde(default = "default_version")]
    version: u32,
    #[serde(default = "default_title")]
    title: String,
    #[serde(default, rename = "exec")]
    executable: String,
    #[serde(default)]
    args: Map<String, Value>,
}

fn default_version() -> u32 {
    ENGINE_SCHEMA_VERSION
}

fn default_title() -> String {
    DEFAULT_TITLE.to_string()
}

fn default_format() -> String {
    DEFAULT_FORMAT.to_string()
}

fn default_number_format() -> String {
    DEFAULT_NUMBER_FORMAT.to_string()
}

#[derive(Debug, Deserialize)]
struct RawParameter {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    prompt: Option<String>,
    #[serde(flatten)]
    fields: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct BoolFields {
    #[serde(rename = "true", default)]
    true_token: Option<String>,
    #[serde(rename = "false", default)]
    false_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StrFields {
    #[serde(default)]
    value: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FormatFields {
    #[serde(default = "default_format")]
    format: String,
}

#[derive(Debug, Deserialize)]
struct ChooseFields {
    #[serde(default)]
    options: Vec<String>,
    #[serde(default)]
    default: String,
    #[serde(default = "default_format")]
    format: String,
}

#[derive(Debug, Deserialize)]
struct FileFields {
    #[serde(default = "default_format")]
    format: String,
    #[serde(default)]
    method: FileMethod,
    #[serde(default)]
    extensions: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct NumFields {
    #[serde(default = "default_number_format")]
    format: String,
    #[serde(default)]
    min: Option<f64>,
    #[serde(default)]
    max: Option<f64>,
}

/// Loads a schema document from disk, choosing JSON or YAML by extension.
///
/// # Errors
///
/// Returns [`LoadError::SchemaNotFound`] if `path` does not exist,
/// [`LoadError::Io`] if it cannot be read, and
/// [`LoadError::SchemaMalformed`] if it does not parse into a schema.
pub fn load_path(path: impl AsRef<Path>) -> LoadResult<LoadOutcome> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(LoadError::SchemaNotFound(path.to_path_buf()));
    }
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), "Loading schema document");
    load_str(&text, SchemaFormat::from_path(path))
}

/// Loads a schema from document text.
///
/// # Errors
///
/// Returns [`LoadError::SchemaMalformed`] if the text does not parse into a
/// schema.
pub fn load_str(text: &str, format: SchemaFormat) -> LoadResult<LoadOutcome> {
    let raw: RawSchema = match format {
        SchemaFormat::Json => serde_json::from_str(text)?,
        SchemaFormat::Yaml => serde_yaml::from_str(text)?,
    };
    build_schema(raw)
}

fn build_schema(raw: RawSchema) -> LoadResult<LoadOutcome> {
    let mut schema = Schema::new(&raw.executable)
        .with_title(&raw.title)
        .with_version(raw.version);

    for (name, value) in raw.args {
        let parameter = build_parameter(&name, value)
            .map_err(|err| LoadError::SchemaMalformed(format!("parameter '{name}': {err}")))?;
        schema.insert(parameter);
    }

    let mut warnings = Vec::new();
    if !schema.is_current_version() {
        let warning = LoadWarning::VersionMismatch {
            found: schema.version,
            supported: ENGINE_SCHEMA_VERSION,
        };
        warn!(title = %schema.title, "{warning}");
        warnings.push(warning);
    }

    debug!(
        title = %schema.title,
        executable = %schema.executable,
        parameters = schema.len(),
        "Loaded schema"
    );
    Ok(LoadOutcome { schema, warnings })
}

fn build_parameter(name: &str, value: Value) -> Result<Parameter, serde_json::Error> {
    let raw: RawParameter = serde_json::from_value(value)?;
    let fields = Value::Object(raw.fields);

    let spec = match ParameterKind::from_tag(&raw.kind) {
        Some(ParameterKind::Bool) => {
            let f: BoolFields = serde_json::from_value(fields)?;
            KindSpec::Bool {
                true_token: f.true_token,
                false_token: f.false_token,
            }
        }
        Some(ParameterKind::Str) => {
            let f: StrFields = serde_json::from_value(fields)?;
            KindSpec::Str { literal: f.value }
        }
        Some(ParameterKind::FmtStr) => {
            let f: FormatFields = serde_json::from_value(fields)?;
            KindSpec::FmtStr { format: f.format }
        }
        Some(ParameterKind::Path) => {
            let f: FormatFields = serde_json::from_value(fields)?;
            KindSpec::Path { format: f.format }
        }
        Some(ParameterKind::Choose) => {
            let f: ChooseFields = serde_json::from_value(fields)?;
            KindSpec::Choose {
                options: dedup_ordered(f.options),
                default: f.default,
                format: f.format,
            }
        }
        Some(ParameterKind::File) => {
            let f: FileFields = serde_json::from_value(fields)?;
            KindSpec::File {
                format: f.format,
                method: f.method,
                extensions: dedup_ordered(f.extensions),
            }
        }
        Some(ParameterKind::Num) => {
            let f: NumFields = serde_json::from_value(fields)?;
            KindSpec::Num {
                format: f.format,
                min: f.min,
                max: f.max,
            }
        }
        None => {
            warn!(parameter = name, kind = %raw.kind, "Unsupported parameter type");
            KindSpec::Unsupported { kind: raw.kind }
        }
    };

    let parameter = Parameter::new(name, spec);
    Ok(match raw.prompt {
        Some(prompt) => parameter.with_prompt(&prompt),
        None => parameter,
    })
}
