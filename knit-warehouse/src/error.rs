//! Error types for knit-warehouse.

use thiserror::Error;

/// All errors that can arise from warehouse calls.
#[derive(Debug, Error)]
pub enum WarehouseError {
    /// The dataset being created already exists.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// The API answered with a non-success status; message passed through.
    #[error("warehouse API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// A job ran to completion and reported an error result.
    #[error("job {job_id} failed: {message}")]
    Job { job_id: String, message: String },

    /// The job did not finish within the configured timeout.
    #[error("job {job_id} did not complete within the configured timeout")]
    Timeout { job_id: String },

    /// Connection, TLS, or timeout failure below HTTP.
    #[error("transport error: {0}")]
    Transport(String),

    /// A response body did not have the expected shape.
    #[error("unexpected response: {0}")]
    Decode(String),
}
