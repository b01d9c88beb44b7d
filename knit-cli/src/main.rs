//! Knit: tracked derived tables in BigQuery.
//!
//! # Usage
//!
//! ```text
//! knit transform [--session P] [--query P] [--tables DIR] [--out P] [--dataset NAME]
//! knit gate      [--session P] [--input P] [--out P]
//! knit lift      [--session P] [--project ID --dataset ID --table ID] [--out P]
//! knit preview   <credentials> <project> <source> [--limit N]
//! ```
//!
//! Paths default to the `in/` + `out/` layout under `--workdir` (default `.`).

mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{gate::GateArgs, lift::LiftArgs, preview::PreviewArgs, transform::TransformArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "knit",
    version,
    about = "Build, verify and adopt tracked BigQuery tables",
    long_about = None,
)]
struct Cli {
    /// Root of the in/ and out/ layout.
    #[arg(long, global = true, env = "KNIT_WORKDIR", default_value = ".")]
    workdir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Materialize a query over dependency descriptors into a fresh table.
    Transform(TransformArgs),

    /// Verify a descriptor against its live table and promote it unchanged.
    Gate(GateArgs),

    /// Adopt an existing table as a new descriptor.
    Lift(LiftArgs),

    /// Print the first rows of a table.
    Preview(PreviewArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Commands::Transform(args) => args.run(&cli.workdir),
        Commands::Gate(args) => args.run(&cli.workdir),
        Commands::Lift(args) => args.run(&cli.workdir),
        Commands::Preview(args) => args.run(),
    }
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
