//! `knit gate` — promote a descriptor only if its table is unchanged.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use knit_build::layout;

use super::{connect, or_default};

/// Arguments for `knit gate`.
#[derive(Args, Debug)]
pub struct GateArgs {
    /// Session file [default: <workdir>/in/session].
    #[arg(long)]
    pub session: Option<PathBuf>,

    /// Descriptor to verify [default: <workdir>/in/table].
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Where the verified descriptor is copied [default: <workdir>/out/table].
    #[arg(long)]
    pub out: Option<PathBuf>,
}

impl GateArgs {
    pub fn run(self, workdir: &Path) -> Result<()> {
        let (_, orchestrator) = connect(&self.session, workdir)?;
        let input = or_default(&self.input, workdir, layout::input_table_path);
        let output = or_default(&self.out, workdir, layout::output_table_path);

        let promoted = orchestrator
            .gate(&input, &output)
            .with_context(|| format!("gate failed for '{}'", input.display()))?;
        println!(
            "{} verified {} → {}",
            "✓".green(),
            promoted.resource.table,
            promoted.path.display()
        );
        Ok(())
    }
}
