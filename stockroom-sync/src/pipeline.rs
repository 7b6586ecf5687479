//! Shared commit entrypoint used by the CLI and the session worker.

use serde::Serialize;

use stockroom_core::WorkingSet;
use stockroom_store::Store;

use crate::{preview, ChangePreview, CommitReport, SyncEngine, SyncError};

/// Result of a pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// Changes were persisted and the working set reloaded.
    Committed(CommitReport),
    /// `--dry-run`: what a commit would have sent. Nothing was written.
    Previewed(ChangePreview),
}

/// Commit `ws`, or only preview the commit when `dry_run` is set.
pub fn run<S: Store>(
    engine: &mut SyncEngine<S>,
    ws: &mut WorkingSet,
    dry_run: bool,
) -> Result<Outcome, SyncError> {
    if dry_run {
        return Ok(Outcome::Previewed(preview(ws)));
    }
    engine.commit(ws).map(Outcome::Committed)
}
