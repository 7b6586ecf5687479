//! Stockroom core library: entities, working set, store rows, configuration.
//!
//! - [`types`]: identifier newtypes, [`Record`], [`Group`], store row structs
//! - [`working_set`]: [`WorkingSet`], the in-memory edited object graph
//! - [`config`]: load / save `~/.stockroom/config.yaml`
//! - [`error`]: [`ConfigError`], [`WorkingSetError`]

pub mod config;
pub mod error;
pub mod types;
pub mod working_set;

pub use config::Config;
pub use error::{ConfigError, WorkingSetError};
pub use types::{
    Group, GroupId, GroupRow, GroupUpdate, NewGroup, NewRecord, Record, RecordId, RecordRow,
    RecordUpdate,
};
pub use working_set::{GroupKey, RecordKey, WorkingSet};
