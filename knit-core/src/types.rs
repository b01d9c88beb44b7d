//! Domain types for warehouse tables and their trust state.
//!
//! All identifiers are opaque strings; nothing here validates them against
//! warehouse naming rules.

use std::fmt;

use chrono::{DateTime, Utc};

/// The only store a descriptor may name.
pub const STORE_BIGQUERY: &str = "bigquery";

// ---------------------------------------------------------------------------
// TableRef
// ---------------------------------------------------------------------------

/// Coordinates of one warehouse table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableRef {
    pub project_id: String,
    pub dataset_id: String,
    pub table_id: String,
}

impl TableRef {
    pub fn new(
        project_id: impl Into<String>,
        dataset_id: impl Into<String>,
        table_id: impl Into<String>,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            dataset_id: dataset_id.into(),
            table_id: table_id.into(),
        }
    }
}

/// `project.dataset.table`, unquoted.
impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.project_id, self.dataset_id, self.table_id)
    }
}

// ---------------------------------------------------------------------------
// Resource
// ---------------------------------------------------------------------------

/// A warehouse table plus the tamper digest recorded when the descriptor was
/// produced.
///
/// A non-empty `tamper` says nothing about the live table until it has been
/// checked against fresh metadata (see [`crate::tamper::verify`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub table: TableRef,
    pub tamper: String,
}

impl Resource {
    pub fn new(table: TableRef, tamper: impl Into<String>) -> Self {
        Self {
            table,
            tamper: tamper.into(),
        }
    }

    pub fn project_id(&self) -> &str {
        &self.table.project_id
    }

    pub fn dataset_id(&self) -> &str {
        &self.table.dataset_id
    }

    pub fn table_id(&self) -> &str {
        &self.table.table_id
    }
}

// ---------------------------------------------------------------------------
// ResourceMetadata
// ---------------------------------------------------------------------------

/// Snapshot of a table's identity and modification metadata.
///
/// `etag` and `last_modified_time` move whenever content or schema change;
/// `full_id` is stable for the table's lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceMetadata {
    pub full_id: String,
    pub creation_time: DateTime<Utc>,
    pub last_modified_time: DateTime<Utc>,
    pub etag: String,
}
