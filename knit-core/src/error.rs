//! Error types for knit-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while reading or writing descriptors.
#[derive(Debug, Error)]
pub enum DescriptorError {
    /// A non-empty line did not contain `=`.
    #[error("malformed descriptor: line {line} has no '=': {content:?}")]
    Malformed { line: usize, content: String },

    /// `store` was not `bigquery` (or absent where it is required).
    #[error("unsupported store {0:?}; expected \"bigquery\"")]
    UnsupportedStore(String),

    /// One of `projectid`, `datasetid`, `tableid` is absent or empty.
    #[error("descriptor is missing required field '{0}'")]
    MissingField(&'static str),

    /// The value cannot be written on a single line.
    #[error("value for '{key}' contains a line break and cannot be encoded")]
    UnencodableValue { key: &'static str },

    /// A dependency filename is not usable as a query alias.
    #[error("invalid dependency alias {0:?}; expected [A-Za-z_][A-Za-z0-9_]*")]
    InvalidAlias(String),

    /// Two dependency filenames differ only in letter case; query aliases are
    /// case-insensitive.
    #[error("dependency alias {0:?} collides with another alias ignoring case")]
    DuplicateAlias(String),

    /// Underlying I/O failure while reading descriptor files.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> DescriptorError {
    DescriptorError::Io {
        path: path.into(),
        source,
    }
}
