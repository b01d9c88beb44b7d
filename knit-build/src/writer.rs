//! File helpers for build inputs and outputs.
//!
//! ## `atomic_write`
//!
//! 1. Ensure the parent directory exists.
//! 2. Write the full content to `<path>.knit.tmp`.
//! 3. Rename onto `<path>` (atomic on POSIX).
//! 4. On rename failure, remove the `.tmp` and leave any prior file intact.

use std::fs;
use std::path::{Path, PathBuf};

use knit_core::{descriptor, Resource};

use crate::error::{io_err, BuildError};

/// Read a text input with leading and trailing newlines removed.
pub fn read_trimmed(path: &Path) -> Result<String, BuildError> {
    let contents = fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    Ok(contents.trim_matches('\n').to_string())
}

/// Write `content` so that readers see either the old file or the whole new one.
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<(), BuildError> {
    let tmp = PathBuf::from(format!("{}.knit.tmp", path.display()));
    atomic_write_with_tmp(path, content, &tmp)
}

fn atomic_write_with_tmp(path: &Path, content: &[u8], tmp: &Path) -> Result<(), BuildError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    if let Some(tmp_parent) = tmp.parent() {
        fs::create_dir_all(tmp_parent).map_err(|e| io_err(tmp_parent, e))?;
    }
    fs::write(tmp, content).map_err(|e| io_err(tmp, e))?;

    if let Err(e) = fs::rename(tmp, path) {
        let _ = fs::remove_file(tmp);
        return Err(io_err(path, e));
    }

    tracing::info!("wrote: {}", path.display());
    Ok(())
}

/// Serialize `resource` canonically and write it atomically.
pub fn write_descriptor(path: &Path, resource: &Resource) -> Result<(), BuildError> {
    let text = descriptor::serialize(resource)?;
    atomic_write(path, text.as_bytes())
}
