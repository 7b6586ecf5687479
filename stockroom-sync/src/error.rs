//! Error types for stockroom-sync.

use thiserror::Error;

use stockroom_core::{RecordKey, WorkingSetError};
use stockroom_store::StoreError;

use crate::engine::CommitStep;

/// All errors that can arise from a commit.
///
/// A failed commit leaves the bucket of the failing step in place and skips
/// every later step, including the reload, so unsaved edits are never lost.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A store call failed while `step` was being persisted.
    #[error("commit failed at {step}: {source}")]
    Step {
        step: CommitStep,
        #[source]
        source: StoreError,
    },

    /// The store returned a different number of generated record ids than
    /// rows. The rows are written but stay unsaved in the working set.
    #[error("{step} returned {returned} generated id(s) for {expected} row(s); the rows were written and a retry inserts them again")]
    KeyCountMismatch {
        step: CommitStep,
        expected: usize,
        returned: usize,
    },

    /// A newly inserted group could not be matched to exactly one stored row.
    /// Its row was written but it stays unsaved in the working set.
    #[error("cannot resolve id of new group '{name}': {matches} stored group(s) share that name; its row was written and a retry inserts it again")]
    IdentifierResolution { name: String, matches: usize },

    /// A record's owning group had no id when the record was persisted.
    #[error("owner of {record} has no store id")]
    UnresolvedOwner { record: RecordKey },

    /// The classified change set refers to an entity no longer in the working set.
    #[error("working set changed during commit: {0}")]
    WorkingSet(#[from] WorkingSetError),

    /// Every batch was persisted but the fresh read failed.
    #[error("reload after commit failed: {0}")]
    Reload(#[source] StoreError),
}

impl SyncError {
    /// The step that was mid-flight when the commit stopped, if any.
    pub fn step(&self) -> Option<CommitStep> {
        match self {
            SyncError::Step { step, .. } | SyncError::KeyCountMismatch { step, .. } => Some(*step),
            SyncError::IdentifierResolution { .. } => Some(CommitStep::GroupInsert),
            SyncError::Reload(_) => Some(CommitStep::Reload),
            SyncError::UnresolvedOwner { .. } | SyncError::WorkingSet(_) => None,
        }
    }

    /// `true` when some changes may already be in the store.
    ///
    /// Retrying after a store failure writes only what is still dirty or
    /// pending. See [`SyncError::is_retry_safe`] for the exceptions.
    pub fn is_partial(&self) -> bool {
        !matches!(self.step(), Some(CommitStep::GroupUpdate))
    }

    /// `false` when a retry would insert an already written row again.
    ///
    /// Happens when the store wrote a row but its id could not be learned.
    pub fn is_retry_safe(&self) -> bool {
        !matches!(
            self,
            SyncError::KeyCountMismatch { .. } | SyncError::IdentifierResolution { .. }
        )
    }
}

/// Convenience constructor for [`SyncError::Step`].
pub(crate) fn step_err(step: CommitStep) -> impl FnOnce(StoreError) -> SyncError {
    move |source| {
        tracing::error!("{step} failed: {source}");
        SyncError::Step { step, source }
    }
}
