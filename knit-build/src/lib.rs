//! # knit-build
//!
//! Build orchestration over tracked table descriptors.
//!
//! - [`Orchestrator::transform`] materializes a composed query into a fresh table.
//! - [`Orchestrator::gate`] re-checks a descriptor against live metadata and
//!   promotes its exact bytes on a match.
//! - [`Orchestrator::lift`] adopts an existing table.

pub mod error;
pub mod layout;
pub mod orchestrator;
pub mod promote;
pub mod session;
pub mod writer;

pub use error::BuildError;
pub use orchestrator::{Orchestrator, TransformRequest, DEFAULT_DATASET, PREVIEW_LIMIT};
pub use promote::{Candidate, Promoted, Verified};
pub use session::Session;
