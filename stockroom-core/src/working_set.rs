//! The in-memory edited object graph.
//!
//! Every entity added to a [`WorkingSet`] is stamped with an opaque key
//! ([`GroupKey`] / [`RecordKey`]). Keys survive ownership transfers and are
//! what the change classifier records, so nothing depends on object identity
//! or on store ids that may not exist yet.
//!
//! Deleting is never immediate: removed entities move into the pending-deletion
//! lists and stay reachable until a commit has persisted the deletion.

use std::fmt;

use crate::error::WorkingSetError;
use crate::types::{Group, GroupId, GroupRow, Record, RecordId, RecordRow};

/// In-memory handle of a group inside one [`WorkingSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupKey(u64);

impl GroupKey {
    pub(crate) const UNASSIGNED: GroupKey = GroupKey(0);
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "group#{}", self.0)
    }
}

/// In-memory handle of a record inside one [`WorkingSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordKey(u64);

impl RecordKey {
    pub(crate) const UNASSIGNED: RecordKey = RecordKey(0);
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "record#{}", self.0)
    }
}

/// All groups (and transitively records) presented to the user, plus the two
/// pending-deletion lists.
#[derive(Debug, Clone, Default)]
pub struct WorkingSet {
    groups: Vec<Group>,
    deleted_groups: Vec<Group>,
    deleted_records: Vec<Record>,
    next_key: u64,
}

impl WorkingSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a clean working set from store rows, preserving their order.
    pub fn from_rows(rows: Vec<(GroupRow, Vec<RecordRow>)>) -> Self {
        let mut ws = Self::new();
        for (group, records) in rows {
            let records = records.into_iter().map(Record::from).collect();
            ws.insert_group(Group::existing(
                group.id,
                group.name,
                group.description,
                records,
            ));
        }
        ws
    }

    // -----------------------------------------------------------------------
    // Groups
    // -----------------------------------------------------------------------

    /// Add a group (and any records it already holds) to the working set.
    pub fn insert_group(&mut self, mut group: Group) -> GroupKey {
        group.key = GroupKey(self.fresh_key());
        for record in &mut group.records {
            record.key = RecordKey(self.fresh_key());
        }
        let key = group.key;
        self.groups.push(group);
        key
    }

    /// Create a new, unsaved group.
    pub fn add_group(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> GroupKey {
        self.insert_group(Group::new(name, description))
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn group(&self, key: GroupKey) -> Result<&Group, WorkingSetError> {
        self.groups
            .iter()
            .find(|g| g.key == key)
            .ok_or(WorkingSetError::UnknownGroup(key))
    }

    pub fn group_mut(&mut self, key: GroupKey) -> Result<&mut Group, WorkingSetError> {
        self.groups
            .iter_mut()
            .find(|g| g.key == key)
            .ok_or(WorkingSetError::UnknownGroup(key))
    }

    pub fn find_group_by_id(&self, id: GroupId) -> Option<&Group> {
        self.groups.iter().find(|g| g.id() == Some(id))
    }

    /// Every group with exactly this name. Names are not unique.
    pub fn find_groups_by_name(&self, name: &str) -> Vec<&Group> {
        self.groups.iter().filter(|g| g.name() == name).collect()
    }

    /// Remove a group and cascade: its records move to the record
    /// pending-deletion list and the group, now empty, to the group list.
    pub fn delete_group(&mut self, key: GroupKey) -> Result<(), WorkingSetError> {
        let pos = self
            .groups
            .iter()
            .position(|g| g.key == key)
            .ok_or(WorkingSetError::UnknownGroup(key))?;
        let mut group = self.groups.remove(pos);
        self.deleted_records.extend(group.take_records());
        self.deleted_groups.push(group);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Records
    // -----------------------------------------------------------------------

    /// Hand `record` to the group identified by `group`.
    pub fn add_record(
        &mut self,
        group: GroupKey,
        mut record: Record,
    ) -> Result<RecordKey, WorkingSetError> {
        // Resolve the target before spending a key on it.
        self.group(group)?;
        let key = RecordKey(self.fresh_key());
        record.key = key;
        self.group_mut(group)?.push_record(record);
        Ok(key)
    }

    pub fn record(&self, key: RecordKey) -> Result<&Record, WorkingSetError> {
        self.groups
            .iter()
            .flat_map(|g| g.records.iter())
            .find(|r| r.key == key)
            .ok_or(WorkingSetError::UnknownRecord(key))
    }

    pub fn record_mut(&mut self, key: RecordKey) -> Result<&mut Record, WorkingSetError> {
        self.groups
            .iter_mut()
            .flat_map(|g| g.records.iter_mut())
            .find(|r| r.key == key)
            .ok_or(WorkingSetError::UnknownRecord(key))
    }

    pub fn find_record_by_id(&self, id: RecordId) -> Option<&Record> {
        self.groups
            .iter()
            .flat_map(|g| g.records.iter())
            .find(|r| r.id() == Some(id))
    }

    /// The group currently owning `record`.
    pub fn owner_of(&self, record: RecordKey) -> Result<GroupKey, WorkingSetError> {
        self.groups
            .iter()
            .find(|g| g.records.iter().any(|r| r.key == record))
            .map(|g| g.key)
            .ok_or(WorkingSetError::UnknownRecord(record))
    }

    /// Transfer ownership of `record` to `to`: add to the new group, remove
    /// from the old one. Both ends are validated before anything moves.
    ///
    /// The record becomes dirty: its stored group id is now stale.
    pub fn move_record(&mut self, record: RecordKey, to: GroupKey) -> Result<(), WorkingSetError> {
        let from = self.owner_of(record)?;
        self.group(to)?;
        if from == to {
            return Ok(());
        }
        let mut moved = self
            .group_mut(from)?
            .remove_record(record)
            .ok_or(WorkingSetError::UnknownRecord(record))?;
        moved.mark_dirty();
        self.group_mut(to)?.push_record(moved);
        Ok(())
    }

    /// Remove a record from its group into the record pending-deletion list.
    pub fn delete_record(&mut self, record: RecordKey) -> Result<(), WorkingSetError> {
        let owner = self.owner_of(record)?;
        let removed = self
            .group_mut(owner)?
            .remove_record(record)
            .ok_or(WorkingSetError::UnknownRecord(record))?;
        self.deleted_records.push(removed);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Pending deletions & state
    // -----------------------------------------------------------------------

    pub fn pending_group_deletions(&self) -> &[Group] {
        &self.deleted_groups
    }

    pub fn pending_record_deletions(&self) -> &[Record] {
        &self.deleted_records
    }

    pub fn clear_pending_deletions(&mut self) {
        self.deleted_groups.clear();
        self.deleted_records.clear();
    }

    /// `true` when nothing would be sent to the store on commit.
    pub fn is_clean(&self) -> bool {
        self.deleted_groups.is_empty()
            && self.deleted_records.is_empty()
            && self
                .groups
                .iter()
                .all(|g| !g.is_dirty() && g.records.iter().all(|r| !r.is_dirty()))
    }

    pub fn record_count(&self) -> usize {
        self.groups.iter().map(|g| g.records.len()).sum()
    }

    fn fresh_key(&mut self) -> u64 {
        self.next_key += 1;
        self.next_key
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
