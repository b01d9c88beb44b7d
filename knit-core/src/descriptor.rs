//! Resource descriptor codec.
//!
//! # Format
//!
//! ```text
//! datasetid=<dataset>
//! projectid=<project>
//! store=bigquery
//! tableid=<table>
//! tamper=<digest>
//! ```
//!
//! One `key=value` pair per line, split on the first `=`. Unknown keys are
//! ignored on parse. Values are not quoted or escaped, so a value can never
//! hold a line break. [`serialize`] always writes the five keys above in that
//! order with a trailing newline; only text produced by it round-trips
//! byte-for-byte.

use std::fs;
use std::path::Path;

use crate::error::{io_err, DescriptorError};
use crate::types::{Resource, TableRef, STORE_BIGQUERY};

/// How `parse` treats a missing `store` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreCheck {
    /// `store=bigquery` must be present.
    #[default]
    Strict,
    /// An absent `store` is accepted; a present one must still be `bigquery`.
    Lenient,
}

/// Split `text` into `(line_number, key, value)` triples, skipping blank lines.
///
/// Shared with the session file, which uses the same line grammar.
pub fn pairs(text: &str) -> Result<Vec<(usize, &str, &str)>, DescriptorError> {
    let mut out = Vec::new();
    for (idx, line) in text.split('\n').enumerate() {
        if line.is_empty() {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            return Err(DescriptorError::Malformed {
                line: idx + 1,
                content: line.to_string(),
            });
        };
        out.push((idx + 1, key, value));
    }
    Ok(out)
}

/// Parse descriptor text.
pub fn parse(text: &str, check: StoreCheck) -> Result<Resource, DescriptorError> {
    let mut store = None;
    let mut project_id = None;
    let mut dataset_id = None;
    let mut table_id = None;
    let mut tamper = String::new();

    for (_, key, value) in pairs(text)? {
        match key {
            "store" => {
                if value != STORE_BIGQUERY {
                    return Err(DescriptorError::UnsupportedStore(value.to_string()));
                }
                store = Some(value);
            }
            "projectid" => project_id = Some(value),
            "datasetid" => dataset_id = Some(value),
            "tableid" => table_id = Some(value),
            "tamper" => tamper = value.to_string(),
            other => tracing::debug!(key = other, "ignoring unknown descriptor key"),
        }
    }

    if store.is_none() && check == StoreCheck::Strict {
        return Err(DescriptorError::UnsupportedStore(String::new()));
    }

    Ok(Resource::new(
        TableRef::new(
            required("projectid", project_id)?,
            required("datasetid", dataset_id)?,
            required("tableid", table_id)?,
        ),
        tamper,
    ))
}

/// Read and parse a descriptor file.
pub fn read(path: &Path, check: StoreCheck) -> Result<Resource, DescriptorError> {
    let text = fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    parse(&text, check)
}

/// Canonical descriptor text for `resource`.
pub fn serialize(resource: &Resource) -> Result<String, DescriptorError> {
    let fields = [
        ("datasetid", resource.dataset_id()),
        ("projectid", resource.project_id()),
        ("store", STORE_BIGQUERY),
        ("tableid", resource.table_id()),
        ("tamper", resource.tamper.as_str()),
    ];

    let mut out = String::new();
    for (key, value) in fields {
        if value.contains(['\n', '\r']) {
            return Err(DescriptorError::UnencodableValue { key });
        }
        out.push_str(key);
        out.push('=');
        out.push_str(value);
        out.push('\n');
    }
    Ok(out)
}

fn required(key: &'static str, value: Option<&str>) -> Result<String, DescriptorError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(DescriptorError::MissingField(key)),
    }
}
