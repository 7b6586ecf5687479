//! In-memory store that records every call, for commit-order assertions.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::BTreeMap;

use stockroom_core::{
    GroupId, GroupRow, GroupUpdate, NewGroup, NewRecord, RecordId, RecordRow, RecordUpdate,
};
use stockroom_store::{GeneratedKeys, Store, StoreError};
use stockroom_sync::CommitStep;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListGroups,
    ListRecords(GroupId),
    UpdateGroups(Vec<GroupUpdate>),
    InsertGroups(Vec<NewGroup>),
    LookupGroup(String),
    DeleteGroups(Vec<GroupId>),
    UpdateRecords(Vec<RecordUpdate>),
    InsertRecords(Vec<NewRecord>),
    DeleteRecords(Vec<RecordId>),
}

#[derive(Debug, Default)]
pub struct RecordingStore {
    pub groups: BTreeMap<GroupId, GroupRow>,
    pub records: BTreeMap<RecordId, (GroupId, RecordRow)>,
    pub calls: RefCell<Vec<Call>>,
    /// The store call backing this step fails (`Reload` fails `list_groups`).
    pub fail_on: Option<CommitStep>,
    /// Report generated keys as unavailable, forcing the name lookup.
    pub keys_unavailable: bool,
    /// Return one generated group key fewer than rows written.
    pub short_keys: bool,
    /// Return one generated record id fewer than rows written.
    pub short_record_ids: bool,
    next_group: i64,
    next_record: i64,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self {
            next_group: 100,
            next_record: 1000,
            ..Self::default()
        }
    }

    pub fn with_group(mut self, id: i64, name: &str) -> Self {
        self.groups.insert(
            GroupId(id),
            GroupRow {
                id: GroupId(id),
                name: name.to_string(),
                description: String::new(),
            },
        );
        self
    }

    pub fn with_record(mut self, id: i64, group: i64, quantity: u32, name: &str) -> Self {
        self.records.insert(
            RecordId(id),
            (
                GroupId(group),
                RecordRow {
                    id: RecordId(id),
                    quantity,
                    name: name.to_string(),
                    description: String::new(),
                },
            ),
        );
        self
    }

    /// Next generated group id.
    pub fn next_group_id(mut self, id: i64) -> Self {
        self.next_group = id;
        self
    }

    /// Recorded calls excluding reads.
    pub fn writes(&self) -> Vec<Call> {
        self.calls
            .borrow()
            .iter()
            .filter(|c| !matches!(c, Call::ListGroups | Call::ListRecords(_) | Call::LookupGroup(_)))
            .cloned()
            .collect()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    fn log(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }

    fn check(&self, step: CommitStep) -> Result<(), StoreError> {
        if self.fail_on == Some(step) {
            return Err(StoreError::Backend(format!("injected failure at {step}")));
        }
        Ok(())
    }
}

impl Store for RecordingStore {
    fn list_groups(&self) -> Result<Vec<GroupRow>, StoreError> {
        self.log(Call::ListGroups);
        self.check(CommitStep::Reload)?;
        Ok(self.groups.values().cloned().collect())
    }

    fn list_records(&self, group: GroupId) -> Result<Vec<RecordRow>, StoreError> {
        self.log(Call::ListRecords(group));
        Ok(self
            .records
            .values()
            .filter(|(owner, _)| *owner == group)
            .map(|(_, row)| row.clone())
            .collect())
    }

    fn batch_update_groups(&mut self, rows: &[GroupUpdate]) -> Result<(), StoreError> {
        self.log(Call::UpdateGroups(rows.to_vec()));
        self.check(CommitStep::GroupUpdate)?;
        for row in rows {
            if let Some(g) = self.groups.get_mut(&row.id) {
                g.name = row.name.clone();
                g.description = row.description.clone();
            }
        }
        Ok(())
    }

    fn batch_insert_groups(&mut self, rows: &[NewGroup]) -> Result<GeneratedKeys, StoreError> {
        self.log(Call::InsertGroups(rows.to_vec()));
        self.check(CommitStep::GroupInsert)?;
        let mut ids = Vec::new();
        for row in rows {
            let id = GroupId(self.next_group);
            self.next_group += 1;
            self.groups.insert(
                id,
                GroupRow {
                    id,
                    name: row.name.clone(),
                    description: row.description.clone(),
                },
            );
            ids.push(id);
        }
        if self.keys_unavailable {
            return Ok(GeneratedKeys::Unavailable);
        }
        if self.short_keys {
            ids.pop();
        }
        Ok(GeneratedKeys::Returned(ids))
    }

    fn lookup_group_ids(&self, name: &str) -> Result<Vec<GroupId>, StoreError> {
        self.log(Call::LookupGroup(name.to_string()));
        Ok(self
            .groups
            .values()
            .filter(|g| g.name == name)
            .map(|g| g.id)
            .collect())
    }

    fn batch_delete_groups(&mut self, ids: &[GroupId]) -> Result<(), StoreError> {
        self.log(Call::DeleteGroups(ids.to_vec()));
        self.check(CommitStep::GroupDelete)?;
        for id in ids {
            self.groups.remove(id);
        }
        Ok(())
    }

    fn batch_update_records(&mut self, rows: &[RecordUpdate]) -> Result<(), StoreError> {
        self.log(Call::UpdateRecords(rows.to_vec()));
        self.check(CommitStep::RecordUpdate)?;
        for row in rows {
            if let Some(entry) = self.records.get_mut(&row.id) {
                entry.0 = row.group_id;
                entry.1.quantity = row.quantity;
                entry.1.name = row.name.clone();
                entry.1.description = row.description.clone();
            }
        }
        Ok(())
    }

    fn batch_insert_records(&mut self, rows: &[NewRecord]) -> Result<Vec<RecordId>, StoreError> {
        self.log(Call::InsertRecords(rows.to_vec()));
        self.check(CommitStep::RecordInsert)?;
        let mut ids = Vec::new();
        for row in rows {
            let id = RecordId(self.next_record);
            self.next_record += 1;
            self.records.insert(
                id,
                (
                    row.group_id,
                    RecordRow {
                        id,
                        quantity: row.quantity,
                        name: row.name.clone(),
                        description: row.description.clone(),
                    },
                ),
            );
            ids.push(id);
        }
        if self.short_record_ids {
            ids.pop();
        }
        Ok(ids)
    }

    fn batch_delete_records(&mut self, ids: &[RecordId]) -> Result<(), StoreError> {
        self.log(Call::DeleteRecords(ids.to_vec()));
        self.check(CommitStep::RecordDelete)?;
        for id in ids {
            self.records.remove(id);
        }
        Ok(())
    }
}
