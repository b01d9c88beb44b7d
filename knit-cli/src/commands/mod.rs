pub mod gate;
pub mod lift;
pub mod preview;
pub mod transform;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use knit_build::{layout, Orchestrator, Session};
use knit_warehouse::BigQuery;

/// `explicit` if given, otherwise the layout default under `workdir`.
pub(crate) fn or_default(
    explicit: &Option<PathBuf>,
    workdir: &Path,
    default: fn(&Path) -> PathBuf,
) -> PathBuf {
    explicit.clone().unwrap_or_else(|| default(workdir))
}

/// Load the session and build an orchestrator over BigQuery.
pub(crate) fn connect(
    session: &Option<PathBuf>,
    workdir: &Path,
) -> Result<(Session, Orchestrator<BigQuery>)> {
    let path = or_default(session, workdir, layout::session_path);
    let session = Session::load(&path)
        .with_context(|| format!("failed to load session '{}'", path.display()))?;
    let config = session
        .warehouse_config()
        .context("failed to load warehouse credentials")?;
    Ok((session, Orchestrator::new(BigQuery::new(config))))
}
