//! Stockroom configuration file.
//!
//! # Storage layout
//!
//! ```text
//! ~/.stockroom/
//!   config.yaml     (mode 0600, written by `stockroom init`)
//!   stockroom.db    (default database location)
//! ```
//!
//! # API pattern
//!
//! Every function touching the filesystem takes an explicit home:
//! `fn_at(home: &Path, …)`, used in tests with `TempDir`. [`init`] also has
//! a no-arg form that derives home from [`home`].
//!
//! Tests must NEVER call the no-arg wrappers; always use `_at`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const DEFAULT_LOG_FILTER: &str = "info";

/// Contents of `config.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// SQLite database file. Relative paths resolve against `~/.stockroom/`.
    pub database: PathBuf,
    /// `tracing` env-filter directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

impl Config {
    /// Defaults rooted at `home`.
    pub fn default_at(home: &Path) -> Self {
        Self {
            database: root_at(home).join("stockroom.db"),
            log_filter: default_log_filter(),
        }
    }

    /// Absolute database path.
    pub fn database_path_at(&self, home: &Path) -> PathBuf {
        if self.database.is_absolute() {
            self.database.clone()
        } else {
            root_at(home).join(&self.database)
        }
    }
}

// ---------------------------------------------------------------------------
// 1. Path helpers
// ---------------------------------------------------------------------------

/// `<home>/.stockroom/`: pure, no I/O.
pub fn root_at(home: &Path) -> PathBuf {
    home.join(".stockroom")
}

/// `<home>/.stockroom/config.yaml`: pure, no I/O.
pub fn config_path_at(home: &Path) -> PathBuf {
    root_at(home).join("config.yaml")
}

// ---------------------------------------------------------------------------
// 2. Load
// ---------------------------------------------------------------------------

/// Load `<home>/.stockroom/config.yaml`.
///
/// Returns `ConfigError::ConfigNotFound` if absent,
/// `ConfigError::Parse` (with path + line context) if malformed YAML.
pub fn load_at(home: &Path) -> Result<Config, ConfigError> {
    let path = config_path_at(home);
    if !path.exists() {
        return Err(ConfigError::ConfigNotFound { path });
    }
    let contents = std::fs::read_to_string(&path)?;
    serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse { path, source: e })
}

// ---------------------------------------------------------------------------
// 3. Save (atomic)
// ---------------------------------------------------------------------------

/// Atomically save `config` to `<home>/.stockroom/config.yaml`.
///
/// Write flow: serialize → `.yaml.tmp` sibling → `chmod 0600` → `rename`.
pub fn save_at(home: &Path, config: &Config) -> Result<(), ConfigError> {
    let dir = root_at(home);
    if !dir.exists() {
        std::fs::create_dir_all(&dir)?;
        set_dir_permissions(&dir)?;
    }
    let path = config_path_at(home);
    let tmp_path = path.with_file_name("config.yaml.tmp");

    let yaml = serde_yaml::to_string(config)?;
    std::fs::write(&tmp_path, yaml)?;
    set_file_permissions(&tmp_path)?;
    std::fs::rename(&tmp_path, &path)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// 4. Init
// ---------------------------------------------------------------------------

/// Write a config under `home`, pointing at `database` or the default file.
///
/// Idempotent: if a config already exists it is loaded and returned unchanged.
pub fn init_at(home: &Path, database: Option<PathBuf>) -> Result<Config, ConfigError> {
    if config_path_at(home).exists() {
        return load_at(home);
    }
    let mut config = Config::default_at(home);
    if let Some(database) = database {
        config.database = database;
    }
    save_at(home, &config)?;
    Ok(config)
}

/// `init_at` convenience wrapper.
pub fn init(database: Option<PathBuf>) -> Result<Config, ConfigError> {
    init_at(&home()?, database)
}

/// The user's home directory.
pub fn home() -> Result<PathBuf, ConfigError> {
    dirs::home_dir().ok_or(ConfigError::HomeNotFound)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

#[cfg(unix)]
fn set_dir_permissions(path: &Path) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))?;
    Ok(())
}
#[cfg(not(unix))]
fn set_dir_permissions(_path: &Path) -> Result<(), ConfigError> {
    Ok(())
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(())
}
#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), ConfigError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
