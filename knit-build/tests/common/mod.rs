//! In-memory warehouse used by the orchestrator tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Duration, TimeZone, Utc};
use knit_core::{ResourceMetadata, TableRef};
use knit_warehouse::{RowSet, Warehouse, WarehouseError};

#[derive(Default)]
pub struct FakeWarehouse {
    pub datasets: RefCell<HashSet<(String, String)>>,
    pub tables: RefCell<HashMap<TableRef, ResourceMetadata>>,
    pub queries: RefCell<Vec<(String, TableRef)>>,
    pub dataset_error: Option<(u16, String)>,
    pub query_error: Option<String>,
}

pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap()
}

pub fn metadata_for(table: &TableRef, etag: &str) -> ResourceMetadata {
    ResourceMetadata {
        full_id: format!("{}:{}.{}", table.project_id, table.dataset_id, table.table_id),
        creation_time: epoch(),
        last_modified_time: epoch(),
        etag: etag.to_string(),
    }
}

impl FakeWarehouse {
    pub fn with_table(self, table: TableRef, etag: &str) -> Self {
        let meta = metadata_for(&table, etag);
        self.tables.borrow_mut().insert(table, meta);
        self
    }

    /// Simulate an out-of-band write to `table`.
    pub fn touch(&self, table: &TableRef) {
        let mut tables = self.tables.borrow_mut();
        let meta = tables.get_mut(table).expect("table present");
        meta.etag.push('+');
        meta.last_modified_time += Duration::seconds(1);
    }

    pub fn last_query(&self) -> Option<(String, TableRef)> {
        self.queries.borrow().last().cloned()
    }
}

impl Warehouse for FakeWarehouse {
    fn ensure_dataset(&self, project_id: &str, dataset_id: &str) -> Result<(), WarehouseError> {
        if let Some((status, message)) = &self.dataset_error {
            return Err(WarehouseError::Api {
                status: *status,
                message: message.clone(),
            });
        }
        let key = (project_id.to_string(), dataset_id.to_string());
        if !self.datasets.borrow_mut().insert(key) {
            return Err(WarehouseError::AlreadyExists(format!(
                "Dataset {project_id}:{dataset_id}"
            )));
        }
        Ok(())
    }

    fn run_query_materialized(
        &self,
        query: &str,
        destination: &TableRef,
    ) -> Result<(), WarehouseError> {
        self.queries
            .borrow_mut()
            .push((query.to_string(), destination.clone()));
        if let Some(message) = &self.query_error {
            return Err(WarehouseError::Job {
                job_id: "job_fake".to_string(),
                message: message.clone(),
            });
        }
        let meta = metadata_for(destination, "etag-0");
        self.tables.borrow_mut().insert(destination.clone(), meta);
        Ok(())
    }

    fn table_metadata(&self, table: &TableRef) -> Result<ResourceMetadata, WarehouseError> {
        self.tables
            .borrow()
            .get(table)
            .cloned()
            .ok_or_else(|| WarehouseError::Api {
                status: 404,
                message: format!("Not found: Table {table}"),
            })
    }

    fn read_rows(
        &self,
        _project_id: &str,
        query: &str,
        limit: usize,
    ) -> Result<RowSet, WarehouseError> {
        self.queries
            .borrow_mut()
            .push((query.to_string(), TableRef::new("", "", "")));
        let rows = (0..limit.min(3))
            .map(|i| vec![i.to_string(), format!("name-{i}")])
            .collect();
        Ok(RowSet {
            columns: vec!["id".to_string(), "name".to_string()],
            rows,
        })
    }
}
