//! Error types for stockroom-store.

use std::path::PathBuf;

use thiserror::Error;

/// Connectivity, query, and constraint failures from a [`crate::Store`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// SQLite reported an error (query, constraint, busy database, ...).
    #[error("sqlite: {0}")]
    Sql(#[from] rusqlite::Error),

    /// The database location could not be prepared.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failure reported by a non-SQLite store implementation.
    #[error("store backend: {0}")]
    Backend(String),
}

/// Convenience constructor for [`StoreError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.into(),
        source,
    }
}
