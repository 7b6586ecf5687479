//! # stockroom-sync
//!
//! Change classification and ordered persistence of a working set.
//!
//! Call [`classify`] to see what a commit would send, or
//! [`SyncEngine::commit`] to persist it and reload a clean baseline.

pub mod classify;
pub mod engine;
pub mod error;
pub mod pipeline;
pub mod preview;

pub use classify::{classify, ChangeSet, GroupBuckets, OwnedRecord, RecordBuckets};
pub use engine::{CommitReport, CommitStep, SyncEngine};
pub use error::SyncError;
pub use preview::{preview, ChangePreview, PlannedChange};
