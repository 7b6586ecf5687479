use std::sync::mpsc as std_mpsc;

use stockroom_core::{
    GroupId, GroupRow, GroupUpdate, NewGroup, NewRecord, Record, RecordId, RecordRow,
    RecordUpdate, WorkingSetError,
};
use stockroom_session::{Session, SessionError};
use stockroom_store::{GeneratedKeys, SqliteStore, Store, StoreError};
use tempfile::TempDir;

/// SQLite store whose group insert blocks until the test releases it.
struct GateStore {
    inner: SqliteStore,
    entered: std_mpsc::Sender<()>,
    release: std_mpsc::Receiver<()>,
    /// The next group insert fails after the gate opens.
    fail_next: bool,
}

impl GateStore {
    fn new(entered: std_mpsc::Sender<()>, release: std_mpsc::Receiver<()>) -> Self {
        Self {
            inner: SqliteStore::open_in_memory().expect("store"),
            entered,
            release,
            fail_next: false,
        }
    }
}

impl Store for GateStore {
    fn list_groups(&self) -> Result<Vec<GroupRow>, StoreError> {
        self.inner.list_groups()
    }

    fn list_records(&self, group: GroupId) -> Result<Vec<RecordRow>, StoreError> {
        self.inner.list_records(group)
    }

    fn batch_update_groups(&mut self, rows: &[GroupUpdate]) -> Result<(), StoreError> {
        self.inner.batch_update_groups(rows)
    }

    fn batch_insert_groups(&mut self, rows: &[NewGroup]) -> Result<GeneratedKeys, StoreError> {
        let _ = self.entered.send(());
        let _ = self.release.recv();
        if std::mem::take(&mut self.fail_next) {
            return Err(StoreError::Backend("group insert rejected".into()));
        }
        self.inner.batch_insert_groups(rows)
    }

    fn lookup_group_ids(&self, name: &str) -> Result<Vec<GroupId>, StoreError> {
        self.inner.lookup_group_ids(name)
    }

    fn batch_delete_groups(&mut self, ids: &[GroupId]) -> Result<(), StoreError> {
        self.inner.batch_delete_groups(ids)
    }

    fn batch_update_records(&mut self, rows: &[RecordUpdate]) -> Result<(), StoreError> {
        self.inner.batch_update_records(rows)
    }

    fn batch_insert_records(&mut self, rows: &[NewRecord]) -> Result<Vec<RecordId>, StoreError> {
        self.inner.batch_insert_records(rows)
    }

    fn batch_delete_records(&mut self, ids: &[RecordId]) -> Result<(), StoreError> {
        self.inner.batch_delete_records(ids)
    }
}

#[tokio::test]
async fn edit_preview_commit_cycle() {
    let home = TempDir::new().expect("home");
    let session = Session::open(home.path().join("stock.db"))
        .await
        .expect("open session");

    let added = session
        .edit(|ws| {
            let g = ws.add_group("Tools", "");
            ws.add_record(g, Record::new(5, "Hammer", ""))
        })
        .await
        .expect("edit");
    assert!(added.is_ok());

    let preview = session.preview().await.expect("preview");
    assert_eq!(preview.changes.len(), 2);

    let report = session.commit().await.expect("commit");
    assert_eq!(report.groups_inserted, 1);
    assert_eq!(report.records_inserted, 1);

    let ws = session.snapshot().await.expect("snapshot");
    assert!(ws.is_clean());
    assert!(ws.groups()[0].id().is_some());
    assert!(session.preview().await.expect("preview").changes.is_empty());

    session.shutdown().await.expect("shutdown");
    assert!(matches!(
        session.snapshot().await,
        Err(SessionError::ChannelClosed(_))
    ));
}

#[tokio::test]
async fn working_set_errors_come_back_from_edits() {
    let session = Session::spawn(SqliteStore::open_in_memory().expect("store"))
        .await
        .expect("spawn");
    let stray = session
        .edit(|ws| -> Result<(), WorkingSetError> {
            let g = ws.add_group("Tmp", "");
            let r = ws.add_record(g, Record::new(1, "x", ""))?;
            ws.delete_record(r)?;
            ws.delete_record(r)
        })
        .await
        .expect("edit ran");
    let err = SessionError::from(stray.unwrap_err());
    assert!(matches!(err, SessionError::WorkingSet(_)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_commit_is_rejected() {
    let (entered_tx, entered_rx) = std_mpsc::channel();
    let (release_tx, release_rx) = std_mpsc::channel();
    let store = GateStore::new(entered_tx, release_rx);
    let session = Session::spawn(store).await.expect("spawn");
    session
        .edit(|ws| {
            ws.add_group("Paint", "");
        })
        .await
        .expect("edit");

    let first = tokio::spawn({
        let session = session.clone();
        async move { session.commit().await }
    });
    tokio::task::spawn_blocking(move || entered_rx.recv())
        .await
        .expect("join")
        .expect("commit reached the store");

    assert!(session.is_committing());
    assert!(matches!(
        session.commit().await,
        Err(SessionError::CommitInProgress)
    ));

    // Queued behind the running commit, applied once it finishes.
    let queued = tokio::spawn({
        let session = session.clone();
        async move {
            session
                .edit(|ws| {
                    ws.add_group("Glue", "");
                })
                .await
        }
    });

    release_tx.send(()).expect("release");
    let report = first.await.expect("join").expect("first commit");
    assert_eq!(report.groups_inserted, 1);
    queued.await.expect("join").expect("queued edit");

    assert!(!session.is_committing());
    let ws = session.snapshot().await.expect("snapshot");
    let names: Vec<_> = ws.groups().iter().map(|g| g.name().to_string()).collect();
    assert_eq!(names, ["Paint", "Glue"]);

    // The flag is released, so the next commit goes through.
    release_tx.send(()).expect("release");
    let report = session.commit().await.expect("second commit");
    assert_eq!(report.groups_inserted, 1);
}

#[tokio::test]
async fn failed_commit_releases_the_flag() {
    let (entered_tx, _entered_rx) = std_mpsc::channel();
    let (release_tx, release_rx) = std_mpsc::channel();
    let mut store = GateStore::new(entered_tx, release_rx);
    store.fail_next = true;
    release_tx.send(()).expect("open gate");
    release_tx.send(()).expect("open gate");

    let session = Session::spawn(store).await.expect("spawn");
    session
        .edit(|ws| {
            ws.add_group("Paint", "");
        })
        .await
        .expect("edit");

    let err = session.commit().await.unwrap_err();
    assert!(matches!(err, SessionError::Sync(_)), "unexpected error: {err}");
    assert!(!session.is_committing());
    let ws = session.snapshot().await.expect("snapshot");
    assert!(!ws.is_clean(), "unsaved edits survive a failed commit");

    let report = session.commit().await.expect("retry");
    assert_eq!(report.groups_inserted, 1);
    assert!(!session.is_committing());
    assert!(session.snapshot().await.expect("snapshot").is_clean());
}
