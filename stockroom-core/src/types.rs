//! Domain types for Stockroom.
//!
//! Store-assigned identifiers are newtypes; "never persisted" is `None`, never
//! a zero sentinel. Entity fields are private so that every mutation goes
//! through a setter that flips the dirty flag.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::working_set::{GroupKey, RecordKey};

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Store-assigned identifier of a group row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GroupId(pub i64);

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<i64> for GroupId {
    fn from(v: i64) -> Self {
        Self(v)
    }
}

/// Store-assigned identifier of a record row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecordId(pub i64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<i64> for RecordId {
    fn from(v: i64) -> Self {
        Self(v)
    }
}

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// A leaf entity owned by exactly one [`Group`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub(crate) key: RecordKey,
    id: Option<RecordId>,
    quantity: u32,
    name: String,
    description: String,
    dirty: bool,
}

impl Record {
    /// A record loaded from the store. Starts clean.
    pub fn existing(
        id: RecordId,
        quantity: u32,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            key: RecordKey::UNASSIGNED,
            id: Some(id),
            quantity,
            name: name.into(),
            description: description.into(),
            dirty: false,
        }
    }

    /// A record created by the user. Has no id and starts dirty.
    pub fn new(quantity: u32, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            key: RecordKey::UNASSIGNED,
            id: None,
            quantity,
            name: name.into(),
            description: description.into(),
            dirty: true,
        }
    }

    pub fn key(&self) -> RecordKey {
        self.key
    }

    pub fn id(&self) -> Option<RecordId> {
        self.id
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// `true` when the record has unsaved field changes (or was never saved).
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn set_quantity(&mut self, quantity: u32) {
        self.quantity = quantity;
        self.dirty = true;
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.dirty = true;
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
        self.dirty = true;
    }

    /// Record the identifier the store generated for this record.
    pub fn assign_id(&mut self, id: RecordId) {
        self.id = Some(id);
    }

    /// Clear the dirty flag once the record's persistence step succeeded.
    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}

// ---------------------------------------------------------------------------
// Group
// ---------------------------------------------------------------------------

/// A container entity owning an ordered collection of [`Record`]s.
///
/// A group without an id has never been persisted and is always dirty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub(crate) key: GroupKey,
    id: Option<GroupId>,
    name: String,
    description: String,
    dirty: bool,
    pub(crate) records: Vec<Record>,
}

impl Group {
    /// A group loaded from the store together with its records. Starts clean.
    pub fn existing(
        id: GroupId,
        name: impl Into<String>,
        description: impl Into<String>,
        records: Vec<Record>,
    ) -> Self {
        Self {
            key: GroupKey::UNASSIGNED,
            id: Some(id),
            name: name.into(),
            description: description.into(),
            dirty: false,
            records,
        }
    }

    /// A blank group created by the user. Has no id and starts dirty.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            key: GroupKey::UNASSIGNED,
            id: None,
            name: name.into(),
            description: description.into(),
            dirty: true,
            records: Vec::new(),
        }
    }

    pub fn key(&self) -> GroupKey {
        self.key
    }

    pub fn id(&self) -> Option<GroupId> {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.dirty = true;
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
        self.dirty = true;
    }

    /// Record the identifier the store generated for this group.
    ///
    /// Does not set the dirty flag: the id reflects the store's own state.
    pub fn assign_id(&mut self, id: GroupId) {
        self.id = Some(id);
    }

    /// Clear the dirty flag once the group's persistence step succeeded.
    ///
    /// A group that still has no id stays dirty.
    pub fn mark_clean(&mut self) {
        if self.id.is_some() {
            self.dirty = false;
        }
    }

    // Ownership changes are persisted through the record's group id, so they
    // leave the group's own dirty flag alone.
    pub(crate) fn push_record(&mut self, record: Record) {
        self.records.push(record);
    }

    pub(crate) fn remove_record(&mut self, key: RecordKey) -> Option<Record> {
        let pos = self.records.iter().position(|r| r.key == key)?;
        Some(self.records.remove(pos))
    }

    /// Empty the record collection, returning what it held.
    pub fn take_records(&mut self) -> Vec<Record> {
        std::mem::take(&mut self.records)
    }
}

// ---------------------------------------------------------------------------
// Store rows
// ---------------------------------------------------------------------------

/// A group row as read from the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRow {
    pub id: GroupId,
    pub name: String,
    pub description: String,
}

/// A record row as read from the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordRow {
    pub id: RecordId,
    pub quantity: u32,
    pub name: String,
    pub description: String,
}

/// Values for a group insert. The store generates the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewGroup {
    pub name: String,
    pub description: String,
}

/// Values for a group update keyed by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupUpdate {
    pub id: GroupId,
    pub name: String,
    pub description: String,
}

/// Values for a record insert, including its owning group's id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRecord {
    pub quantity: u32,
    pub name: String,
    pub description: String,
    pub group_id: GroupId,
}

/// Values for a record update keyed by id, including its current owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordUpdate {
    pub id: RecordId,
    pub quantity: u32,
    pub name: String,
    pub description: String,
    pub group_id: GroupId,
}

impl From<RecordRow> for Record {
    fn from(row: RecordRow) -> Self {
        Record::existing(row.id, row.quantity, row.name, row.description)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
