//! Error types for config reading.

use std::io;
use std::path::PathBuf;

use accfg_syntax::SyntaxError;

use crate::field::Shape;

/// Boxed error returned by custom value parsers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors returned while reading a config into a record.
///
/// Reading stops at the first error. Errors raised inside a file are wrapped
/// once in [`Error::Parse`] with the file and line they occurred on.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("cannot open '{}': {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot parse file '{}' line {line}: {source}", .file.display())]
    Parse {
        file: PathBuf,
        line: usize,
        #[source]
        source: Box<Error>,
    },

    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    /// A key with no matching field.
    #[error("invalid param '{0}'")]
    InvalidParam(String),

    /// A block whose name has no matching field.
    #[error("invalid section '{0}'")]
    InvalidSection(String),

    /// A map entry declared without its value.
    #[error("syntax error for {key}/{name}: value expected")]
    ValueExpected { key: String, name: String },

    /// A block bound to a field that cannot hold one.
    #[error("invalid config type ({shape}) for section '{key}'; should be a list of boxed records, a record, or a map")]
    InvalidBlockType { key: String, shape: Shape },

    /// A value bound to a field that cannot hold one.
    #[error("field '{key}' has unsupported type ({shape})")]
    UnsupportedType { key: String, shape: Shape },

    /// A value that failed to convert to the field's type.
    #[error("cannot parse {expected} for '{key}': {source}")]
    InvalidValue {
        key: String,
        expected: &'static str,
        #[source]
        source: BoxError,
    },

    #[error("missing '}}' to close section '{0}'")]
    UnclosedBlock(String),

    #[error("sections and includes nested deeper than {0} levels")]
    TooDeep(usize),

    #[error("include directives are disabled")]
    IncludeDisabled,
}

impl Error {
    /// The innermost error, looking through [`Error::Parse`] wrappers.
    pub fn root(&self) -> &Error {
        match self {
            Self::Parse { source, .. } => source.root(),
            other => other,
        }
    }

    pub(crate) fn invalid_value(
        key: &str,
        expected: &'static str,
        source: impl Into<BoxError>,
    ) -> Self {
        Self::InvalidValue {
            key: key.to_string(),
            expected,
            source: source.into(),
        }
    }
}
