//! Knit core library — descriptors, dependency queries, tamper digests.
//!
//! - [`types`] — `Resource`, `TableRef`, `ResourceMetadata`
//! - [`descriptor`] — the `key=value` descriptor codec
//! - [`compose`] — dependency prologue for a query body
//! - [`tamper`] — canonical metadata digest and verification
//! - [`error`] — [`DescriptorError`]

pub mod compose;
pub mod descriptor;
pub mod error;
pub mod tamper;
pub mod types;

pub use error::DescriptorError;
pub use types::{Resource, ResourceMetadata, TableRef, STORE_BIGQUERY};
