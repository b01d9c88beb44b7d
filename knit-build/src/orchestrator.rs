//! Build orchestrator: `transform`, `gate`, `lift`, `preview`.
//!
//! Every step is synchronous: warehouse calls are issued one after another
//! and each blocks until the warehouse answers. The output descriptor is
//! always the last thing written, so a failed step leaves no output behind.
//! A crash after materialization can leave an untracked table; its id is
//! never reused.

use std::path::{Path, PathBuf};

use uuid::Uuid;

use knit_core::compose::{self, Dependencies};
use knit_core::{tamper, Resource, TableRef};
use knit_warehouse::{RowSet, Warehouse, WarehouseError};

use crate::error::BuildError;
use crate::promote::{Candidate, Promoted};
use crate::writer;

/// Dataset that `transform` materializes into unless configured otherwise.
pub const DEFAULT_DATASET: &str = "knit";

/// Row cap for `preview`.
pub const PREVIEW_LIMIT: usize = 100;

/// File-level inputs of a `transform` step.
#[derive(Debug, Clone)]
pub struct TransformRequest {
    pub project_id: String,
    pub dataset_id: String,
    pub query_path: PathBuf,
    pub tables_dir: PathBuf,
    pub output: PathBuf,
}

/// Runs build steps against a [`Warehouse`].
pub struct Orchestrator<W> {
    warehouse: W,
}

impl<W: Warehouse> Orchestrator<W> {
    pub fn new(warehouse: W) -> Self {
        Self { warehouse }
    }

    // -----------------------------------------------------------------------
    // transform
    // -----------------------------------------------------------------------

    /// Compose the query from its inputs, materialize it into a fresh table
    /// and write the new descriptor.
    pub fn transform(&self, req: &TransformRequest) -> Result<Resource, BuildError> {
        let body = writer::read_trimmed(&req.query_path)?;
        let deps = compose::load_dependencies(&req.tables_dir)?;
        let resource = self.materialize(&req.project_id, &req.dataset_id, &body, &deps)?;
        writer::write_descriptor(&req.output, &resource)?;
        tracing::info!(state = "created", table = %resource.table, dependencies = deps.len());
        Ok(resource)
    }

    /// In-memory core of [`Self::transform`]: no files are read or written.
    pub fn materialize(
        &self,
        project_id: &str,
        dataset_id: &str,
        body: &str,
        deps: &Dependencies,
    ) -> Result<Resource, BuildError> {
        let query = compose::compose(deps, body);
        let table = TableRef::new(project_id, dataset_id, fresh_table_id());
        tracing::debug!(%query, destination = %table, "composed query");

        self.ensure_dataset(project_id, dataset_id)?;
        self.warehouse.run_query_materialized(&query, &table)?;

        let meta = self.warehouse.table_metadata(&table)?;
        Ok(Resource::new(table, tamper::digest(&meta)))
    }

    fn ensure_dataset(&self, project_id: &str, dataset_id: &str) -> Result<(), BuildError> {
        match self.warehouse.ensure_dataset(project_id, dataset_id) {
            Ok(()) => {
                tracing::info!(project_id, dataset_id, "dataset created");
                Ok(())
            }
            Err(WarehouseError::AlreadyExists(_)) => {
                tracing::warn!(project_id, dataset_id, "dataset already exists");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    // -----------------------------------------------------------------------
    // gate
    // -----------------------------------------------------------------------

    /// Check `input` against the live table and copy its bytes to `output`
    /// only if the digests match.
    pub fn gate(&self, input: &Path, output: &Path) -> Result<Promoted, BuildError> {
        let candidate = Candidate::read(input)?;
        let live = self.warehouse.table_metadata(&candidate.resource().table)?;
        candidate.verify(&live)?.promote(output)
    }

    // -----------------------------------------------------------------------
    // lift
    // -----------------------------------------------------------------------

    /// Adopt an existing table, recording its current digest.
    pub fn lift(&self, table: TableRef, output: &Path) -> Result<Resource, BuildError> {
        let meta = self.warehouse.table_metadata(&table)?;
        let resource = Resource::new(table, tamper::digest(&meta));
        writer::write_descriptor(output, &resource)?;
        tracing::info!(state = "created", table = %resource.table, "lifted");
        Ok(resource)
    }

    // -----------------------------------------------------------------------
    // preview
    // -----------------------------------------------------------------------

    /// First `limit` rows of `source` (a fully qualified table name).
    pub fn preview(
        &self,
        project_id: &str,
        source: &str,
        limit: usize,
    ) -> Result<RowSet, BuildError> {
        let query = preview_query(source, limit);
        Ok(self.warehouse.read_rows(project_id, &query, limit)?)
    }
}

/// Read lift coordinates from three single-value files.
pub fn read_table_ref(
    project_path: &Path,
    dataset_path: &Path,
    table_path: &Path,
) -> Result<TableRef, BuildError> {
    Ok(TableRef::new(
        writer::read_trimmed(project_path)?,
        writer::read_trimmed(dataset_path)?,
        writer::read_trimmed(table_path)?,
    ))
}

fn preview_query(source: &str, limit: usize) -> String {
    format!("SELECT * FROM `{source}` LIMIT {limit}")
}

fn fresh_table_id() -> String {
    Uuid::new_v4().simple().to_string()
}
