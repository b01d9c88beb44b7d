//! `knit preview` — print the first rows of a table.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tabled::{builder::Builder, settings::Style};

use knit_build::{Orchestrator, Session, PREVIEW_LIMIT};
use knit_warehouse::{BigQuery, RowSet};

/// Arguments for `knit preview`.
#[derive(Args, Debug)]
pub struct PreviewArgs {
    /// File holding an OAuth2 access token.
    pub credentials: PathBuf,

    /// Project the preview query is billed to.
    pub project: String,

    /// Fully qualified table, e.g. `project.dataset.table`.
    pub source: String,

    #[arg(long, default_value_t = PREVIEW_LIMIT)]
    pub limit: usize,
}

impl PreviewArgs {
    pub fn run(self) -> Result<()> {
        let session = Session {
            project_id: Some(self.project.clone()),
            credentials: Some(self.credentials.clone()),
            dataset: knit_build::DEFAULT_DATASET.to_string(),
            location: None,
        };
        let config = session
            .warehouse_config()
            .context("failed to load warehouse credentials")?;
        let orchestrator = Orchestrator::new(BigQuery::new(config));

        let rows = orchestrator
            .preview(&self.project, &self.source, self.limit)
            .with_context(|| format!("preview failed for '{}'", self.source))?;
        println!("{}", render(&rows));
        Ok(())
    }
}

fn render(rows: &RowSet) -> String {
    let mut builder = Builder::default();
    builder.push_record(rows.columns.clone());
    for row in &rows.rows {
        builder.push_record(row.clone());
    }
    let mut table = builder.build();
    table.with(Style::psql());
    table.to_string()
}
