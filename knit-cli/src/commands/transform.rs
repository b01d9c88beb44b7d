//! `knit transform` — materialize a query into a fresh tracked table.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use knit_build::{layout, TransformRequest};

use super::{connect, or_default};

/// Arguments for `knit transform`.
#[derive(Args, Debug)]
pub struct TransformArgs {
    /// Session file [default: <workdir>/in/session].
    #[arg(long)]
    pub session: Option<PathBuf>,

    /// Query body file [default: <workdir>/in/query].
    #[arg(long)]
    pub query: Option<PathBuf>,

    /// Directory of dependency descriptors; filenames become aliases
    /// [default: <workdir>/in/tables].
    #[arg(long)]
    pub tables: Option<PathBuf>,

    /// Output descriptor [default: <workdir>/out/table].
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Target dataset; overrides the session's `dataset`.
    #[arg(long)]
    pub dataset: Option<String>,
}

impl TransformArgs {
    pub fn run(self, workdir: &Path) -> Result<()> {
        let (session, orchestrator) = connect(&self.session, workdir)?;
        let project_id = session.project_id()?.to_string();
        let dataset_id = self.dataset.clone().unwrap_or_else(|| session.dataset.clone());

        let req = TransformRequest {
            project_id,
            dataset_id,
            query_path: or_default(&self.query, workdir, layout::query_path),
            tables_dir: or_default(&self.tables, workdir, layout::tables_dir),
            output: or_default(&self.out, workdir, layout::output_table_path),
        };

        let resource = orchestrator.transform(&req).context("transform failed")?;
        println!(
            "{} built {} → {}",
            "✓".green(),
            resource.table,
            req.output.display()
        );
        Ok(())
    }
}
