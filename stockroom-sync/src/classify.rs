//! Change classification.
//!
//! Rules, applied in working-set order:
//! 1. Group without id → `groups.insert`; dirty group with id → `groups.update`.
//! 2. Record without id → `records.insert`; dirty record with id →
//!    `records.update`. Both remember the record's current owner.
//! 3. `groups.delete` = pending groups; `records.delete` = pending records
//!    plus anything still attached to a pending group.
//! 4. Pending entities without an id are dropped: there is no row to delete.
//!
//! Classification only reads; it never touches dirty flags or identifiers.

use stockroom_core::{GroupId, GroupKey, RecordId, RecordKey, WorkingSet};

/// A record paired with the group that owned it at classification time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnedRecord {
    pub record: RecordKey,
    pub owner: GroupKey,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupBuckets {
    pub update: Vec<GroupKey>,
    pub insert: Vec<GroupKey>,
    pub delete: Vec<GroupId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordBuckets {
    pub update: Vec<OwnedRecord>,
    pub insert: Vec<OwnedRecord>,
    pub delete: Vec<RecordId>,
}

/// The six buckets of one commit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    pub groups: GroupBuckets,
    pub records: RecordBuckets,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total number of entries across all buckets.
    pub fn len(&self) -> usize {
        self.groups.update.len()
            + self.groups.insert.len()
            + self.groups.delete.len()
            + self.records.update.len()
            + self.records.insert.len()
            + self.records.delete.len()
    }
}

/// Partition the working set and its pending deletions into buckets.
pub fn classify(ws: &WorkingSet) -> ChangeSet {
    let mut changes = ChangeSet::default();

    for group in ws.groups() {
        match group.id() {
            None => changes.groups.insert.push(group.key()),
            Some(_) if group.is_dirty() => changes.groups.update.push(group.key()),
            Some(_) => {}
        }

        for record in group.records() {
            let owned = OwnedRecord {
                record: record.key(),
                owner: group.key(),
            };
            match record.id() {
                None => changes.records.insert.push(owned),
                Some(_) if record.is_dirty() => changes.records.update.push(owned),
                Some(_) => {}
            }
        }
    }

    for group in ws.pending_group_deletions() {
        // Deleting a group already cascades, but a pending group may still
        // hold records if it was built by hand.
        changes
            .records
            .delete
            .extend(group.records().iter().filter_map(|r| r.id()));
        changes.groups.delete.extend(group.id());
    }

    changes.records.delete.extend(
        ws.pending_record_deletions()
            .iter()
            .filter_map(|r| r.id()),
    );

    changes
}
