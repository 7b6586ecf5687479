//! Ordered persistence of a classified change set.
//!
//! ## Commit protocol
//!
//! 1. `groups.update`: batch update by id.
//! 2. `groups.insert`: batch insert, then assign the generated ids.
//! 3. `groups.delete`: batch delete by id.
//! 4. `records.update`: batch update, writing the current owner's id.
//! 5. `records.insert`: batch insert, writing the current owner's id, then
//!    assign the generated ids.
//! 6. `records.delete`: batch delete by id.
//! 7. Reload: replace the working set with a fresh read.
//!
//! A step empties its bucket and clears dirty flags only after the store
//! call succeeded. The first failure stops the commit: its bucket stays
//! populated, later steps and the reload are skipped.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use stockroom_core::{
    GroupId, GroupKey, GroupUpdate, NewGroup, NewRecord, RecordId, RecordUpdate, WorkingSet,
};
use stockroom_store::{GeneratedKeys, Store};

use crate::classify::{classify, ChangeSet, OwnedRecord};
use crate::error::{step_err, SyncError};

// ---------------------------------------------------------------------------
// Steps & report
// ---------------------------------------------------------------------------

/// One ordered step of a commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitStep {
    GroupUpdate,
    GroupInsert,
    GroupDelete,
    RecordUpdate,
    RecordInsert,
    RecordDelete,
    Reload,
}

impl CommitStep {
    /// Every step in execution order.
    pub const ORDER: [CommitStep; 7] = [
        CommitStep::GroupUpdate,
        CommitStep::GroupInsert,
        CommitStep::GroupDelete,
        CommitStep::RecordUpdate,
        CommitStep::RecordInsert,
        CommitStep::RecordDelete,
        CommitStep::Reload,
    ];
}

impl fmt::Display for CommitStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CommitStep::GroupUpdate => "groups.update",
            CommitStep::GroupInsert => "groups.insert",
            CommitStep::GroupDelete => "groups.delete",
            CommitStep::RecordUpdate => "records.update",
            CommitStep::RecordInsert => "records.insert",
            CommitStep::RecordDelete => "records.delete",
            CommitStep::Reload => "reload",
        };
        f.write_str(label)
    }
}

/// What a successful commit persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitReport {
    pub committed_at: DateTime<Utc>,
    pub groups_updated: usize,
    pub groups_inserted: usize,
    pub groups_deleted: usize,
    pub records_updated: usize,
    pub records_inserted: usize,
    pub records_deleted: usize,
}

impl CommitReport {
    fn new() -> Self {
        Self {
            committed_at: Utc::now(),
            groups_updated: 0,
            groups_inserted: 0,
            groups_deleted: 0,
            records_updated: 0,
            records_inserted: 0,
            records_deleted: 0,
        }
    }

    /// Total number of rows written or deleted.
    pub fn total(&self) -> usize {
        self.groups_updated
            + self.groups_inserted
            + self.groups_deleted
            + self.records_updated
            + self.records_inserted
            + self.records_deleted
    }
}

// ---------------------------------------------------------------------------
// SyncEngine
// ---------------------------------------------------------------------------

/// Persists change sets to a [`Store`].
#[derive(Debug)]
pub struct SyncEngine<S> {
    store: S,
}

impl<S: Store> SyncEngine<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Classify `ws` and persist everything it holds.
    pub fn commit(&mut self, ws: &mut WorkingSet) -> Result<CommitReport, SyncError> {
        let mut changes = classify(ws);
        self.apply(&mut changes, ws)
    }

    /// Persist an already classified change set.
    ///
    /// On failure `changes` keeps the failed bucket and every later one, so
    /// the same change set can be passed back in to retry.
    pub fn apply(
        &mut self,
        changes: &mut ChangeSet,
        ws: &mut WorkingSet,
    ) -> Result<CommitReport, SyncError> {
        let mut report = CommitReport::new();

        report.groups_updated = self.update_groups(&mut changes.groups.update, ws)?;
        report.groups_inserted = self.insert_groups(&mut changes.groups.insert, ws)?;
        report.groups_deleted = self.delete_groups(&mut changes.groups.delete)?;
        report.records_updated = self.update_records(&mut changes.records.update, ws)?;
        report.records_inserted = self.insert_records(&mut changes.records.insert, ws)?;
        report.records_deleted = self.delete_records(&mut changes.records.delete)?;

        // Both delete steps are persisted; the holding area has served its purpose.
        ws.clear_pending_deletions();

        *ws = self.reload()?;
        tracing::info!(
            "commit finished: {} row(s) written, {} group(s) reloaded",
            report.total(),
            ws.groups().len()
        );
        Ok(report)
    }

    /// Read the full group → record graph from the store.
    pub fn reload(&self) -> Result<WorkingSet, SyncError> {
        let groups = self.store.list_groups().map_err(SyncError::Reload)?;
        let mut rows = Vec::with_capacity(groups.len());
        for group in groups {
            let records = self.store.list_records(group.id).map_err(SyncError::Reload)?;
            rows.push((group, records));
        }
        Ok(WorkingSet::from_rows(rows))
    }

    // -----------------------------------------------------------------------
    // Steps 1-3: groups
    // -----------------------------------------------------------------------

    fn update_groups(
        &mut self,
        bucket: &mut Vec<GroupKey>,
        ws: &mut WorkingSet,
    ) -> Result<usize, SyncError> {
        if bucket.is_empty() {
            return Ok(0);
        }
        let mut rows = Vec::with_capacity(bucket.len());
        for key in bucket.iter() {
            let group = ws.group(*key)?;
            // Never-persisted groups are inserted, not updated.
            let Some(id) = group.id() else { continue };
            rows.push(GroupUpdate {
                id,
                name: group.name().to_string(),
                description: group.description().to_string(),
            });
        }

        tracing::info!("{}: {} row(s)", CommitStep::GroupUpdate, rows.len());
        self.store
            .batch_update_groups(&rows)
            .map_err(step_err(CommitStep::GroupUpdate))?;

        for key in bucket.drain(..) {
            ws.group_mut(key)?.mark_clean();
        }
        Ok(rows.len())
    }

    fn insert_groups(
        &mut self,
        bucket: &mut Vec<GroupKey>,
        ws: &mut WorkingSet,
    ) -> Result<usize, SyncError> {
        if bucket.is_empty() {
            return Ok(0);
        }
        let mut rows = Vec::with_capacity(bucket.len());
        for key in bucket.iter() {
            let group = ws.group(*key)?;
            rows.push(NewGroup {
                name: group.name().to_string(),
                description: group.description().to_string(),
            });
        }

        tracing::info!("{}: {} row(s)", CommitStep::GroupInsert, rows.len());
        let keys = self
            .store
            .batch_insert_groups(&rows)
            .map_err(step_err(CommitStep::GroupInsert))?;

        let inserted = rows.len();
        match keys {
            GeneratedKeys::Returned(ids) if ids.len() == inserted => {
                for (key, id) in bucket.drain(..).zip(ids) {
                    assign_group_id(ws, key, id)?;
                }
                return Ok(inserted);
            }
            GeneratedKeys::Returned(ids) => {
                // The rows are written but the keys cannot be paired with
                // them, so resolve the whole batch by name instead.
                tracing::warn!(
                    "{}: store returned {} key(s) for {} row(s), resolving by name",
                    CommitStep::GroupInsert,
                    ids.len(),
                    inserted
                );
            }
            GeneratedKeys::Unavailable => {}
        }

        // Natural-key fallback. Resolved groups leave the bucket one by one
        // so a retry does not insert them twice.
        while let Some(key) = bucket.first().copied() {
            let name = ws.group(key)?.name().to_string();
            let matches = self
                .store
                .lookup_group_ids(&name)
                .map_err(step_err(CommitStep::GroupInsert))?;
            let [id] = matches.as_slice() else {
                tracing::error!(
                    "new group '{}' matched {} stored row(s)",
                    name,
                    matches.len()
                );
                return Err(SyncError::IdentifierResolution {
                    name,
                    matches: matches.len(),
                });
            };
            assign_group_id(ws, key, *id)?;
            bucket.remove(0);
        }
        Ok(inserted)
    }

    fn delete_groups(&mut self, bucket: &mut Vec<GroupId>) -> Result<usize, SyncError> {
        if bucket.is_empty() {
            return Ok(0);
        }
        tracing::info!("{}: {} row(s)", CommitStep::GroupDelete, bucket.len());
        self.store
            .batch_delete_groups(bucket)
            .map_err(step_err(CommitStep::GroupDelete))?;
        let deleted = bucket.len();
        bucket.clear();
        Ok(deleted)
    }

    // -----------------------------------------------------------------------
    // Steps 4-6: records
    // -----------------------------------------------------------------------

    fn update_records(
        &mut self,
        bucket: &mut Vec<OwnedRecord>,
        ws: &mut WorkingSet,
    ) -> Result<usize, SyncError> {
        if bucket.is_empty() {
            return Ok(0);
        }
        let mut rows = Vec::with_capacity(bucket.len());
        for owned in bucket.iter() {
            let group_id = owner_id(ws, owned)?;
            let record = ws.record(owned.record)?;
            let Some(id) = record.id() else { continue };
            rows.push(RecordUpdate {
                id,
                quantity: record.quantity(),
                name: record.name().to_string(),
                description: record.description().to_string(),
                group_id,
            });
        }

        tracing::info!("{}: {} row(s)", CommitStep::RecordUpdate, rows.len());
        self.store
            .batch_update_records(&rows)
            .map_err(step_err(CommitStep::RecordUpdate))?;

        for owned in bucket.drain(..) {
            ws.record_mut(owned.record)?.mark_clean();
        }
        Ok(rows.len())
    }

    fn insert_records(
        &mut self,
        bucket: &mut Vec<OwnedRecord>,
        ws: &mut WorkingSet,
    ) -> Result<usize, SyncError> {
        if bucket.is_empty() {
            return Ok(0);
        }
        let mut rows = Vec::with_capacity(bucket.len());
        for owned in bucket.iter() {
            let group_id = owner_id(ws, owned)?;
            let record = ws.record(owned.record)?;
            rows.push(NewRecord {
                quantity: record.quantity(),
                name: record.name().to_string(),
                description: record.description().to_string(),
                group_id,
            });
        }

        tracing::info!("{}: {} row(s)", CommitStep::RecordInsert, rows.len());
        let ids = self
            .store
            .batch_insert_records(&rows)
            .map_err(step_err(CommitStep::RecordInsert))?;
        if ids.len() != rows.len() {
            return Err(SyncError::KeyCountMismatch {
                step: CommitStep::RecordInsert,
                expected: rows.len(),
                returned: ids.len(),
            });
        }

        // Later edits become updates and deletes are keyed by these ids,
        // even when a following step fails before the reload.
        for (owned, id) in bucket.drain(..).zip(ids) {
            let record = ws.record_mut(owned.record)?;
            record.assign_id(id);
            record.mark_clean();
        }
        Ok(rows.len())
    }

    fn delete_records(&mut self, bucket: &mut Vec<RecordId>) -> Result<usize, SyncError> {
        if bucket.is_empty() {
            return Ok(0);
        }
        tracing::info!("{}: {} row(s)", CommitStep::RecordDelete, bucket.len());
        self.store
            .batch_delete_records(bucket)
            .map_err(step_err(CommitStep::RecordDelete))?;
        let deleted = bucket.len();
        bucket.clear();
        Ok(deleted)
    }
}

fn assign_group_id(ws: &mut WorkingSet, key: GroupKey, id: GroupId) -> Result<(), SyncError> {
    let group = ws.group_mut(key)?;
    group.assign_id(id);
    group.mark_clean();
    tracing::debug!("group '{}' assigned id {}", group.name(), id);
    Ok(())
}

/// Store id of the group that owned the record at classification time.
fn owner_id(ws: &WorkingSet, owned: &OwnedRecord) -> Result<GroupId, SyncError> {
    ws.group(owned.owner)?
        .id()
        .ok_or(SyncError::UnresolvedOwner {
            record: owned.record,
        })
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
