//! Error types for schema loading and argument compilation.
//!
//! Load errors are fatal to startup. Compile errors belong to a single
//! `add_*` call and never leave a partial token in the invocation.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::ParameterKind;

/// Errors raised while loading a schema document.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The document source does not exist.
    #[error("schema not found: {}", .0.display())]
    SchemaNotFound(PathBuf),

    /// The document exists but could not be read.
    #[error("failed to read schema '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document could not be parsed into the expected shape.
    #[error("malformed schema: {0}")]
    SchemaMalformed(String),
}

impl From<serde_json::Error> for LoadError {
    fn from(err: serde_json::Error) -> Self {
        LoadError::SchemaMalformed(err.to_string())
    }
}

impl From<serde_yaml::Error> for LoadError {
    fn from(err: serde_yaml::Error) -> Self {
        LoadError::SchemaMalformed(err.to_string())
    }
}

/// Errors raised by a printf-style format string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// A `%` conversion this formatter does not support.
    #[error("unsupported conversion '%{0}'")]
    UnknownConversion(char),
    /// The format has more than one placeholder for a single value.
    #[error("format has more than one placeholder")]
    TooManyPlaceholders,
    /// The value cannot be rendered by the conversion (e.g. text for `%d`).
    #[error("'%{conversion}' cannot render value '{value}'")]
    IncompatibleValue { conversion: char, value: String },
    /// A width or precision is larger than the formatter allows.
    #[error("width or precision exceeds {limit}")]
    FieldTooWide { limit: usize },
    /// The format ends inside a conversion.
    #[error("format ends inside a conversion")]
    Truncated,
}

/// Errors raised while compiling a parameter into the invocation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    /// No parameter with this name exists in the schema.
    #[error("unknown parameter: {0}")]
    UnknownParameter(String),

    /// The parameter's `type` has no handler in this engine.
    #[error("parameter '{name}' has unsupported type '{kind}'")]
    UnsupportedKind { name: String, kind: String },

    /// A kind-specific operation was called on a parameter of another kind.
    #[error("parameter '{name}': expected {expected}, found {found}")]
    KindMismatch {
        name: String,
        expected: ParameterKind,
        found: String,
    },

    /// The runtime value cannot be used for this kind.
    #[error("parameter '{name}' ({kind}) cannot take value '{value}'")]
    InvalidValue {
        name: String,
        kind: ParameterKind,
        value: String,
    },

    /// A `choose` parameter rejected the value and has no default to fall
    /// back on.
    #[error("parameter '{0}' has no valid choice and no default")]
    NoValidChoice(String),

    /// The parameter's format string could not be applied.
    #[error("parameter '{name}': {source}")]
    Format {
        name: String,
        #[source]
        source: FormatError,
    },
}

/// Convenience alias for load results.
pub type LoadResult<T> = std::result::Result<T, LoadError>;

/// Convenience alias for compile results.
pub type Result<T> = std::result::Result<T, CompileError>;
