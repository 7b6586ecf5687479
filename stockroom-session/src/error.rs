use thiserror::Error;

/// Error surface for the session worker and its handles.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("a commit is already in progress")]
    CommitInProgress,

    #[error("sync error: {0}")]
    Sync(#[from] stockroom_sync::SyncError),

    #[error("working set error: {0}")]
    WorkingSet(#[from] stockroom_core::WorkingSetError),

    #[error("store error: {0}")]
    Store(#[from] stockroom_store::StoreError),

    #[error("channel closed: {0}")]
    ChannelClosed(&'static str),

    #[error("blocking task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
