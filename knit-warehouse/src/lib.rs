//! # knit-warehouse
//!
//! The [`Warehouse`] capability consumed by the build orchestrator, and
//! [`BigQuery`], its implementation over the BigQuery v2 REST API.
//!
//! Every call blocks until the warehouse answers. Nothing here retries.

pub mod bigquery;
pub mod config;
pub mod error;

use knit_core::{ResourceMetadata, TableRef};

pub use bigquery::BigQuery;
pub use config::{AccessToken, WarehouseConfig};
pub use error::WarehouseError;

/// Rows returned by [`Warehouse::read_rows`], rendered as display strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Operations the orchestrator needs from a warehouse.
pub trait Warehouse {
    /// Create `project.dataset`.
    ///
    /// Returns [`WarehouseError::AlreadyExists`] when it is already there, so
    /// callers can tolerate exactly that case and nothing else.
    fn ensure_dataset(&self, project_id: &str, dataset_id: &str) -> Result<(), WarehouseError>;

    /// Run `query` with its result written to `destination`, blocking until
    /// the job completes.
    fn run_query_materialized(
        &self,
        query: &str,
        destination: &TableRef,
    ) -> Result<(), WarehouseError>;

    /// Current identity/modification metadata of `table`.
    fn table_metadata(&self, table: &TableRef) -> Result<ResourceMetadata, WarehouseError>;

    /// Run `query` billed to `project_id` and return at most `limit` rows.
    fn read_rows(
        &self,
        project_id: &str,
        query: &str,
        limit: usize,
    ) -> Result<RowSet, WarehouseError>;
}

impl<W: Warehouse + ?Sized> Warehouse for &W {
    fn ensure_dataset(&self, project_id: &str, dataset_id: &str) -> Result<(), WarehouseError> {
        (**self).ensure_dataset(project_id, dataset_id)
    }

    fn run_query_materialized(
        &self,
        query: &str,
        destination: &TableRef,
    ) -> Result<(), WarehouseError> {
        (**self).run_query_materialized(query, destination)
    }

    fn table_metadata(&self, table: &TableRef) -> Result<ResourceMetadata, WarehouseError> {
        (**self).table_metadata(table)
    }

    fn read_rows(
        &self,
        project_id: &str,
        query: &str,
        limit: usize,
    ) -> Result<RowSet, WarehouseError> {
        (**self).read_rows(project_id, query, limit)
    }
}
