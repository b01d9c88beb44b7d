//! Error types for knit-build.

use std::path::PathBuf;

use thiserror::Error;

use knit_core::DescriptorError;
use knit_warehouse::WarehouseError;

/// All errors that can arise from a build step.
#[derive(Debug, Error)]
pub enum BuildError {
    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("descriptor error: {0}")]
    Descriptor(#[from] DescriptorError),

    #[error("warehouse error: {0}")]
    Warehouse(#[from] WarehouseError),

    /// The session file is incomplete or unusable.
    #[error("session error: {0}")]
    Session(String),

    /// Live metadata no longer matches the digest recorded in the descriptor.
    #[error("tamper detected on {table}\nexpected: {expected}\nactual:   {actual}")]
    TamperDetected {
        table: String,
        expected: String,
        actual: String,
    },
}

/// Convenience constructor for [`BuildError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> BuildError {
    BuildError::Io {
        path: path.into(),
        source,
    }
}
