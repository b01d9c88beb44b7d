//! `knit lift` — adopt an existing table.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use knit_build::{layout, orchestrator::read_table_ref};
use knit_core::TableRef;

use super::{connect, or_default};

/// Arguments for `knit lift`.
///
/// Coordinates come from the flags when all three are given, otherwise from
/// `in/projectid`, `in/datasetid` and `in/tableid`.
#[derive(Args, Debug)]
pub struct LiftArgs {
    /// Session file [default: <workdir>/in/session].
    #[arg(long)]
    pub session: Option<PathBuf>,

    #[arg(long, requires_all = ["dataset", "table"])]
    pub project: Option<String>,

    #[arg(long, requires_all = ["project", "table"])]
    pub dataset: Option<String>,

    #[arg(long, requires_all = ["project", "dataset"])]
    pub table: Option<String>,

    /// Output descriptor [default: <workdir>/out/table].
    #[arg(long)]
    pub out: Option<PathBuf>,
}

impl LiftArgs {
    pub fn run(self, workdir: &Path) -> Result<()> {
        let table = match (&self.project, &self.dataset, &self.table) {
            (Some(p), Some(d), Some(t)) => TableRef::new(p, d, t),
            _ => read_table_ref(
                &layout::project_id_path(workdir),
                &layout::dataset_id_path(workdir),
                &layout::table_id_path(workdir),
            )
            .context("failed to read table coordinates")?,
        };

        let (_, orchestrator) = connect(&self.session, workdir)?;
        let output = or_default(&self.out, workdir, layout::output_table_path);
        let resource = orchestrator
            .lift(table.clone(), &output)
            .with_context(|| format!("lift failed for '{table}'"))?;
        println!(
            "{} lifted {} → {}",
            "✓".green(),
            resource.table,
            output.display()
        );
        Ok(())
    }
}
