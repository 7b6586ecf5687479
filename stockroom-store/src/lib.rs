//! # stockroom-store
//!
//! The relational persistence collaborator behind a working set.
//!
//! [`Store`] is the contract the sync engine is written against;
//! [`SqliteStore`] is the shipped implementation.

pub mod error;
pub mod sqlite;

pub use error::StoreError;
pub use sqlite::SqliteStore;

use stockroom_core::{
    GroupId, GroupRow, GroupUpdate, NewGroup, NewRecord, RecordId, RecordRow, RecordUpdate,
};

/// Identifiers generated by a group insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneratedKeys {
    /// One id per inserted row, in input order.
    Returned(Vec<GroupId>),
    /// The store cannot report generated keys; callers must look them up.
    Unavailable,
}

/// Structured reads and batched writes against the backing store.
///
/// Each batch call is atomic only as far as the implementation allows; no
/// transaction spans more than one call.
pub trait Store {
    /// Every group, ordered by id.
    fn list_groups(&self) -> Result<Vec<GroupRow>, StoreError>;

    /// Every record owned by `group`, ordered by id.
    fn list_records(&self, group: GroupId) -> Result<Vec<RecordRow>, StoreError>;

    fn batch_update_groups(&mut self, rows: &[GroupUpdate]) -> Result<(), StoreError>;

    fn batch_insert_groups(&mut self, rows: &[NewGroup]) -> Result<GeneratedKeys, StoreError>;

    /// Ids of every group named `name`. Natural-key fallback for stores that
    /// return [`GeneratedKeys::Unavailable`].
    fn lookup_group_ids(&self, name: &str) -> Result<Vec<GroupId>, StoreError>;

    fn batch_delete_groups(&mut self, ids: &[GroupId]) -> Result<(), StoreError>;

    fn batch_update_records(&mut self, rows: &[RecordUpdate]) -> Result<(), StoreError>;

    /// Insert records, returning one generated id per row in input order.
    fn batch_insert_records(&mut self, rows: &[NewRecord]) -> Result<Vec<RecordId>, StoreError>;

    fn batch_delete_records(&mut self, ids: &[RecordId]) -> Result<(), StoreError>;
}

impl<S: Store + ?Sized> Store for Box<S> {
    fn list_groups(&self) -> Result<Vec<GroupRow>, StoreError> {
        (**self).list_groups()
    }

    fn list_records(&self, group: GroupId) -> Result<Vec<RecordRow>, StoreError> {
        (**self).list_records(group)
    }

    fn batch_update_groups(&mut self, rows: &[GroupUpdate]) -> Result<(), StoreError> {
        (**self).batch_update_groups(rows)
    }

    fn batch_insert_groups(&mut self, rows: &[NewGroup]) -> Result<GeneratedKeys, StoreError> {
        (**self).batch_insert_groups(rows)
    }

    fn lookup_group_ids(&self, name: &str) -> Result<Vec<GroupId>, StoreError> {
        (**self).lookup_group_ids(name)
    }

    fn batch_delete_groups(&mut self, ids: &[GroupId]) -> Result<(), StoreError> {
        (**self).batch_delete_groups(ids)
    }

    fn batch_update_records(&mut self, rows: &[RecordUpdate]) -> Result<(), StoreError> {
        (**self).batch_update_records(rows)
    }

    fn batch_insert_records(&mut self, rows: &[NewRecord]) -> Result<Vec<RecordId>, StoreError> {
        (**self).batch_insert_records(rows)
    }

    fn batch_delete_records(&mut self, ids: &[RecordId]) -> Result<(), StoreError> {
        (**self).batch_delete_records(ids)
    }
}
