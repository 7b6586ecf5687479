//! Error types for stockroom-core.

use std::path::PathBuf;

use thiserror::Error;

use crate::working_set::{GroupKey, RecordKey};

/// Errors from loading or saving the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure (permission denied, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization error (save path).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// YAML parse error on load, with the offending file.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// `dirs::home_dir()` returned `None`, so there is no locate `~/.stockroom/`.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,

    /// The config file did not exist at the expected path.
    #[error("config not found at {path}; run `stockroom init` first")]
    ConfigNotFound { path: PathBuf },
}

/// Errors from addressing entities that are not in the working set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkingSetError {
    #[error("unknown group {0}")]
    UnknownGroup(GroupKey),

    #[error("unknown record {0}")]
    UnknownRecord(RecordKey),
}
