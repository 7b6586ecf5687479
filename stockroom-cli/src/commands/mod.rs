//! Subcommand implementations and the helpers they share.

pub mod group;
pub mod init;
pub mod list;
pub mod record;

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use colored::Colorize;

use stockroom_core::{config, GroupId, GroupKey, RecordId, RecordKey, WorkingSet};
use stockroom_session::init_tracing;
use stockroom_store::SqliteStore;
use stockroom_sync::{
    pipeline::{self, Outcome},
    SyncEngine, SyncError,
};

/// The loaded inventory: engine plus the working set read from it.
pub struct Inventory {
    pub engine: SyncEngine<SqliteStore>,
    pub ws: WorkingSet,
}

impl Inventory {
    /// Load config, open the database and read every group.
    pub fn open() -> Result<Self> {
        let home: PathBuf = config::home().context("could not determine home directory")?;
        let config =
            config::load_at(&home).context("failed to load config; run `stockroom init` first")?;
        init_tracing(&config.log_filter);

        let path = config.database_path_at(&home);
        let store = SqliteStore::open(&path)
            .with_context(|| format!("cannot open database '{}'", path.display()))?;
        let engine = SyncEngine::new(store);
        let ws = engine.reload().context("failed to read inventory")?;
        Ok(Self { engine, ws })
    }

    /// Resolve `<group>`: a numeric id, otherwise a unique name.
    pub fn group_key(&self, arg: &str) -> Result<GroupKey> {
        if let Ok(id) = arg.parse::<i64>() {
            return self
                .ws
                .find_group_by_id(GroupId(id))
                .map(|g| g.key())
                .ok_or_else(|| anyhow!("no group with id {id}"));
        }
        let matches = self.ws.find_groups_by_name(arg);
        match matches.as_slice() {
            [] => bail!("no group named '{arg}'"),
            [group] => Ok(group.key()),
            several => bail!(
                "{} groups are named '{arg}'; use the numeric id",
                several.len()
            ),
        }
    }

    pub fn record_key(&self, id: i64) -> Result<RecordKey> {
        self.ws
            .find_record_by_id(RecordId(id))
            .map(|r| r.key())
            .ok_or_else(|| anyhow!("no record with id {id}"))
    }

    /// Commit the edits made to `ws`, or only print them with `--dry-run`.
    pub fn save(mut self, dry_run: bool) -> Result<()> {
        let outcome = pipeline::run(&mut self.engine, &mut self.ws, dry_run)
            .map_err(commit_failure)?;
        print_outcome(&outcome);
        Ok(())
    }
}

/// Reject names that are empty after trimming.
pub fn non_blank(kind: &str, name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        bail!("{kind} name must not be blank");
    }
    Ok(trimmed.to_string())
}

fn commit_failure(err: SyncError) -> anyhow::Error {
    let hint = if !err.is_retry_safe() {
        "commit partially failed; check the store for duplicate rows before retrying"
    } else if err.is_partial() {
        "commit partially failed; some changes may already be saved, retry"
    } else {
        "commit failed; nothing was saved"
    };
    anyhow::Error::new(err).context(hint)
}

fn print_outcome(outcome: &Outcome) {
    match outcome {
        Outcome::Previewed(preview) if preview.is_empty() => {
            println!("[dry-run] nothing to commit");
        }
        Outcome::Previewed(preview) => {
            println!("[dry-run] would commit {} change(s):", preview.changes.len());
            for line in preview.to_string().lines() {
                println!("  {line}");
            }
        }
        Outcome::Committed(report) if report.total() == 0 => {
            println!("{} nothing to commit", "✓".green());
        }
        Outcome::Committed(report) => {
            println!("{} committed {} change(s)", "✓".green(), report.total());
        }
    }
}
