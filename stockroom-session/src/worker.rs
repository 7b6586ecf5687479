use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};

use stockroom_core::WorkingSet;
use stockroom_store::{SqliteStore, Store};
use stockroom_sync::{preview, ChangePreview, CommitReport, SyncEngine};

use crate::error::SessionError;

const COMMAND_BUFFER: usize = 64;

type EditFn = Box<dyn FnOnce(&mut WorkingSet) + Send>;

enum Command {
    Edit(EditFn),
    Snapshot(oneshot::Sender<WorkingSet>),
    Preview(oneshot::Sender<ChangePreview>),
    Commit(oneshot::Sender<Result<CommitReport, SessionError>>),
    Shutdown(oneshot::Sender<()>),
}

/// Entry point for starting a session worker.
pub struct Session;

impl Session {
    /// Load the working set from `store` and start the worker that owns it.
    pub async fn spawn<S>(store: S) -> Result<SessionHandle, SessionError>
    where
        S: Store + Send + 'static,
    {
        let (engine, ws) = tokio::task::spawn_blocking(move || {
            let engine = SyncEngine::new(store);
            let ws = engine.reload()?;
            Ok::<_, SessionError>((engine, ws))
        })
        .await??;

        tracing::info!(
            groups = ws.groups().len(),
            records = ws.record_count(),
            "session loaded"
        );

        let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
        let committing = Arc::new(AtomicBool::new(false));
        tokio::spawn(worker_task(engine, ws, rx, committing.clone()));
        Ok(SessionHandle { tx, committing })
    }

    /// Open (or create) the SQLite database at `path` and start a session on it.
    pub async fn open(path: impl Into<PathBuf>) -> Result<SessionHandle, SessionError> {
        let path = path.into();
        let store = tokio::task::spawn_blocking(move || SqliteStore::open(&path)).await??;
        Self::spawn(store).await
    }
}

/// Cloneable handle to a running session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    tx: mpsc::Sender<Command>,
    committing: Arc<AtomicBool>,
}

impl SessionHandle {
    /// Run `f` against the working set on the worker.
    ///
    /// Edits run in submission order and never while a commit is writing.
    pub async fn edit<F, T>(&self, f: F) -> Result<T, SessionError>
    where
        F: FnOnce(&mut WorkingSet) -> T + Send + 'static,
        T: Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let job: EditFn = Box::new(move |ws: &mut WorkingSet| {
            let _ = tx.send(f(ws));
        });
        self.send(Command::Edit(job), "edit").await?;
        rx.await.map_err(|_| SessionError::ChannelClosed("edit"))
    }

    /// Copy of the current working set.
    pub async fn snapshot(&self) -> Result<WorkingSet, SessionError> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Snapshot(tx), "snapshot").await?;
        rx.await.map_err(|_| SessionError::ChannelClosed("snapshot"))
    }

    /// What a commit would send right now.
    pub async fn preview(&self) -> Result<ChangePreview, SessionError> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Preview(tx), "preview").await?;
        rx.await.map_err(|_| SessionError::ChannelClosed("preview"))
    }

    /// Persist every pending change and wait for the outcome.
    ///
    /// Fails fast with [`SessionError::CommitInProgress`] while another
    /// commit from any handle is still running.
    pub async fn commit(&self) -> Result<CommitReport, SessionError> {
        if self
            .committing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(SessionError::CommitInProgress);
        }

        let (tx, rx) = oneshot::channel();
        if let Err(err) = self.send(Command::Commit(tx), "commit").await {
            self.committing.store(false, Ordering::Release);
            return Err(err);
        }
        rx.await
            .map_err(|_| SessionError::ChannelClosed("commit"))?
    }

    /// `true` while a commit is running.
    pub fn is_committing(&self) -> bool {
        self.committing.load(Ordering::Acquire)
    }

    /// Stop the worker after the commands queued before this one.
    pub async fn shutdown(&self) -> Result<(), SessionError> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Shutdown(tx), "shutdown").await?;
        rx.await.map_err(|_| SessionError::ChannelClosed("shutdown"))
    }

    async fn send(&self, command: Command, what: &'static str) -> Result<(), SessionError> {
        self.tx
            .send(command)
            .await
            .map_err(|_| SessionError::ChannelClosed(what))
    }
}

async fn worker_task<S>(
    mut engine: SyncEngine<S>,
    mut ws: WorkingSet,
    mut rx: mpsc::Receiver<Command>,
    committing: Arc<AtomicBool>,
) where
    S: Store + Send + 'static,
{
    while let Some(command) = rx.recv().await {
        match command {
            Command::Edit(f) => f(&mut ws),
            Command::Snapshot(respond_to) => {
                let _ = respond_to.send(ws.clone());
            }
            Command::Preview(respond_to) => {
                let _ = respond_to.send(preview(&ws));
            }
            Command::Commit(respond_to) => {
                let joined = tokio::task::spawn_blocking(move || {
                    let result = engine.commit(&mut ws);
                    (engine, ws, result)
                })
                .await;
                committing.store(false, Ordering::Release);

                let (returned_engine, returned_ws, result) = match joined {
                    Ok(parts) => parts,
                    Err(err) => {
                        // The engine and working set went down with the task.
                        tracing::error!(error = %err, "commit task failed, stopping session");
                        let _ = respond_to.send(Err(SessionError::Join(err)));
                        return;
                    }
                };
                engine = returned_engine;
                ws = returned_ws;

                match &result {
                    Ok(report) => tracing::info!(rows = report.total(), "commit finished"),
                    Err(err) if !err.is_retry_safe() => tracing::error!(
                        error = %err,
                        "commit partially failed, a retry would duplicate rows"
                    ),
                    Err(err) if err.is_partial() => tracing::error!(
                        error = %err,
                        "commit partially failed, some changes may already be saved; retry"
                    ),
                    Err(err) => tracing::error!(error = %err, "commit failed, nothing saved"),
                }
                let _ = respond_to.send(result.map_err(SessionError::from));
            }
            Command::Shutdown(ack) => {
                drop(engine);
                let _ = ack.send(());
                tracing::info!("session stopped");
                return;
            }
        }
    }
}

/// Install a `tracing` subscriber honouring `RUST_LOG`, falling back to
/// `default_filter`. Also captures records from the `log` facade.
pub fn init_tracing(default_filter: &str) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
