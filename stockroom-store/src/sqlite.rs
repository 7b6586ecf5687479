//! SQLite-backed [`Store`].
//!
//! Every batch runs inside its own transaction, so a batch lands completely
//! or not at all. The `stock_records.group_id` column is indexed but not a
//! foreign-key constraint: a commit deletes parent rows before their children
//! (see the sync engine's step order) and must not be rejected in between.

use std::path::Path;

use rusqlite::{params, Connection, Row};
use stockroom_core::{
    GroupId, GroupRow, GroupUpdate, NewGroup, NewRecord, RecordId, RecordRow, RecordUpdate,
};

use crate::error::{io_err, StoreError};
use crate::{GeneratedKeys, Store};

#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) the database file at `path`, creating parent
    /// directories as needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
            }
        }
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    /// Private in-memory database (tests, previews).
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            r#"
            PRAGMA journal_mode=WAL;
            PRAGMA synchronous=NORMAL;

            CREATE TABLE IF NOT EXISTS stock_groups (
              id INTEGER PRIMARY KEY AUTOINCREMENT,
              name TEXT NOT NULL,
              description TEXT NOT NULL DEFAULT ''
            );

            CREATE TABLE IF NOT EXISTS stock_records (
              id INTEGER PRIMARY KEY AUTOINCREMENT,
              group_id INTEGER NOT NULL,
              quantity INTEGER NOT NULL CHECK (quantity >= 0),
              name TEXT NOT NULL,
              description TEXT NOT NULL DEFAULT ''
            );

            CREATE INDEX IF NOT EXISTS idx_stock_records_group ON stock_records(group_id);
            CREATE INDEX IF NOT EXISTS idx_stock_groups_name ON stock_groups(name);
            "#,
        )?;
        Ok(())
    }
}

impl Store for SqliteStore {
    fn list_groups(&self) -> Result<Vec<GroupRow>, StoreError> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT id, name, description FROM stock_groups ORDER BY id")?;
        let rows = stmt.query_map([], group_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn list_records(&self, group: GroupId) -> Result<Vec<RecordRow>, StoreError> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT id, quantity, name, description FROM stock_records WHERE group_id = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map(params![group.0], record_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn batch_update_groups(&mut self, rows: &[GroupUpdate]) -> Result<(), StoreError> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "UPDATE stock_groups SET name = ?1, description = ?2 WHERE id = ?3",
            )?;
            for row in rows {
                let changed = stmt.execute(params![row.name, row.description, row.id.0])?;
                if changed == 0 {
                    tracing::debug!("group {} no longer exists; update skipped", row.id);
                }
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn batch_insert_groups(&mut self, rows: &[NewGroup]) -> Result<GeneratedKeys, StoreError> {
        let tx = self.conn.transaction()?;
        let mut ids = Vec::with_capacity(rows.len());
        {
            let mut stmt =
                tx.prepare_cached("INSERT INTO stock_groups (name, description) VALUES (?1, ?2)")?;
            for row in rows {
                stmt.execute(params![row.name, row.description])?;
                ids.push(GroupId(tx.last_insert_rowid()));
            }
        }
        tx.commit()?;
        Ok(GeneratedKeys::Returned(ids))
    }

    fn lookup_group_ids(&self, name: &str) -> Result<Vec<GroupId>, StoreError> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT id FROM stock_groups WHERE name = ?1 ORDER BY id")?;
        let ids = stmt.query_map(params![name], |row| Ok(GroupId(row.get(0)?)))?;
        Ok(ids.collect::<Result<Vec<_>, _>>()?)
    }

    fn batch_delete_groups(&mut self, ids: &[GroupId]) -> Result<(), StoreError> {
        if ids.is_empty() {
            return Ok(());
        }
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached("DELETE FROM stock_groups WHERE id = ?1")?;
            for id in ids {
                stmt.execute(params![id.0])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn batch_update_records(&mut self, rows: &[RecordUpdate]) -> Result<(), StoreError> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "UPDATE stock_records SET quantity = ?1, name = ?2, description = ?3, group_id = ?4 WHERE id = ?5",
            )?;
            for row in rows {
                let changed = stmt.execute(params![
                    row.quantity,
                    row.name,
                    row.description,
                    row.group_id.0,
                    row.id.0
                ])?;
                if changed == 0 {
                    tracing::debug!("record {} no longer exists; update skipped", row.id);
                }
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn batch_insert_records(&mut self, rows: &[NewRecord]) -> Result<Vec<RecordId>, StoreError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let tx = self.conn.transaction()?;
        let mut ids = Vec::with_capacity(rows.len());
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO stock_records (group_id, quantity, name, description) VALUES (?1, ?2, ?3, ?4)",
            )?;
            for row in rows {
                stmt.execute(params![row.group_id.0, row.quantity, row.name, row.description])?;
                ids.push(RecordId(tx.last_insert_rowid()));
            }
        }
        tx.commit()?;
        Ok(ids)
    }

    fn batch_delete_records(&mut self, ids: &[RecordId]) -> Result<(), StoreError> {
        if ids.is_empty() {
            return Ok(());
        }
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached("DELETE FROM stock_records WHERE id = ?1")?;
            for id in ids {
                stmt.execute(params![id.0])?;
            }
        }
        tx.commit()?;
        Ok(())
    }
}

fn group_row(row: &Row<'_>) -> rusqlite::Result<GroupRow> {
    Ok(GroupRow {
        id: GroupId(row.get(0)?),
        name: row.get(1)?,
        description: row.get(2)?,
    })
}

fn record_row(row: &Row<'_>) -> rusqlite::Result<RecordRow> {
    Ok(RecordRow {
        id: RecordId(row.get(0)?),
        quantity: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
    })
}
