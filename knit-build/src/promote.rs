//! Descriptor promotion.
//!
//! ```text
//! Candidate ──verify──▶ Verified ──promote──▶ Promoted
//!     │
//!     └── digest mismatch ──▶ BuildError::TamperDetected (nothing written)
//! ```
//!
//! A candidate's bytes are read once. The same bytes are parsed, verified and
//! written out, so what gets published is exactly what was checked.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use knit_core::descriptor::{self, StoreCheck};
use knit_core::{tamper, Resource, ResourceMetadata};

use crate::error::{io_err, BuildError};
use crate::writer;

/// A descriptor read from disk whose digest has not been checked yet.
#[derive(Debug)]
pub struct Candidate {
    bytes: Vec<u8>,
    resource: Resource,
}

/// A descriptor whose digest matched live metadata.
#[derive(Debug)]
pub struct Verified {
    bytes: Vec<u8>,
    resource: Resource,
}

/// A verified descriptor copied to its output location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Promoted {
    pub resource: Resource,
    pub path: PathBuf,
}

impl Candidate {
    /// Read and strictly parse the descriptor at `path`.
    pub fn read(path: &Path) -> Result<Self, BuildError> {
        let bytes = fs::read(path).map_err(|e| io_err(path, e))?;
        let text = std::str::from_utf8(&bytes)
            .map_err(|e| io_err(path, io::Error::new(io::ErrorKind::InvalidData, e)))?;
        let resource = descriptor::parse(text, StoreCheck::Strict)?;
        Ok(Self { bytes, resource })
    }

    pub fn resource(&self) -> &Resource {
        &self.resource
    }

    /// Compare the recorded digest with the digest of `live`.
    pub fn verify(self, live: &ResourceMetadata) -> Result<Verified, BuildError> {
        let actual = tamper::digest(live);
        if actual != self.resource.tamper {
            tracing::warn!(state = "rejected", table = %self.resource.table, "tamper detected");
            return Err(BuildError::TamperDetected {
                table: self.resource.table.to_string(),
                expected: self.resource.tamper,
                actual,
            });
        }
        tracing::info!(state = "verified", table = %self.resource.table);
        Ok(Verified {
            bytes: self.bytes,
            resource: self.resource,
        })
    }
}

impl Verified {
    pub fn resource(&self) -> &Resource {
        &self.resource
    }

    /// Write the original bytes to `output`.
    pub fn promote(self, output: &Path) -> Result<Promoted, BuildError> {
        writer::atomic_write(output, &self.bytes)?;
        tracing::info!(state = "promoted", table = %self.resource.table, path = %output.display());
        Ok(Promoted {
            resource: self.resource,
            path: output.to_path_buf(),
        })
    }
}
