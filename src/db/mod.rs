use std::{
    path::{Path, PathBuf},
    sync::{mpsc, Arc, Mutex},
    thread::{self, JoinHandle},
};

use anyhow::{anyhow, Context, Result};
use log::{error, info};
use rusqlite::Connection;
use tokio::sync::oneshot;

pub mod helpers;
mod migrations;
mod repositories;
pub mod seed;

use migrations::run_migrations;

pub use repositories::preferences::Theme;

/// Local-storage keys. Each one holds a single serialized blob.
pub const KEY_STUDENTS: &str = "skillswap_students";
pub const KEY_CURRENT_USER_ID: &str = "skillswap_current_user_id";
pub const KEY_SESSIONS: &str = "skillswap_sessions";
pub const KEY_THEME: &str = "skillswap_theme";

type DbTask = Box<dyn FnOnce(&mut Connection) + Send + 'static>;

enum DbCommand {
    Execute(DbTask),
    Shutdown,
}

struct DatabaseInner {
    sender: mpsc::Sender<DbCommand>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for DatabaseInner {
    fn drop(&mut self) {
        let mut guard = match self.worker.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Some(handle) = guard.take() {
            if let Err(err) = self.sender.send(DbCommand::Shutdown) {
                error!("Failed to send shutdown to store thread: {err}");
            }
            if let Err(join_err) = handle.join() {
                error!("Failed to join store thread: {join_err:?}");
            }
        }
    }
}

enum Location {
    File(PathBuf),
    Memory,
}

/// Handle to the key-value store. Cheap to clone; every clone talks to the
/// same worker thread, which owns the only SQLite connection.
#[derive(Clone)]
pub struct Database {
    inner: Arc<DatabaseInner>,
    db_path: Option<Arc<PathBuf>>,
}

impl Database {
    pub fn new(db_path: PathBuf) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create store directory {}", parent.display())
            })?;
        }

        let inner = spawn_worker(Location::File(db_path.clone()))?;
        info!("Store initialized at {}", db_path.display());

        Ok(Self {
            inner: Arc::new(inner),
            db_path: Some(Arc::new(db_path)),
        })
    }

    /// Volatile store, used by tests and dry runs.
    pub fn open_in_memory() -> Result<Self> {
        let inner = spawn_worker(Location::Memory)?;
        Ok(Self {
            inner: Arc::new(inner),
            db_path: None,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.db_path.as_deref().map(PathBuf::as_path)
    }

    pub async fn execute<F, T>(&self, task: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let sender = self.inner.sender.clone();
        let (reply_tx, reply_rx) = oneshot::channel();

        let command = DbCommand::Execute(Box::new(move |conn| {
            let result = task(conn);
            if reply_tx.send(result).is_err() {
                error!("Store caller dropped before receiving result");
            }
        }));

        sender
            .send(command)
            .map_err(|err| anyhow!("failed to send command to store thread: {err}"))?;

        reply_rx
            .await
            .map_err(|_| anyhow!("store thread terminated unexpectedly"))?
    }

    pub async fn get_value(&self, key: &str) -> Result<Option<String>> {
        let key = key.to_string();
        self.execute(move |conn| helpers::read_value(conn, &key)).await
    }

    pub async fn set_value(&self, key: &str, value: String) -> Result<()> {
        let key = key.to_string();
        self.execute(move |conn| helpers::write_value(conn, &key, &value))
            .await
    }

    pub async fn remove_value(&self, key: &str) -> Result<()> {
        let key = key.to_string();
        self.execute(move |conn| helpers::remove_value(conn, &key)).await
    }
}

fn spawn_worker(location: Location) -> Result<DatabaseInner> {
    let (command_tx, command_rx) = mpsc::channel::<DbCommand>();
    let (ready_tx, ready_rx) = mpsc::channel();

    let worker = thread::Builder::new()
        .name("skillswap-store".into())
        .spawn(move || {
            let opened = match &location {
                Location::File(path) => Connection::open(path),
                Location::Memory => Connection::open_in_memory(),
            };
            let mut conn = match opened {
                Ok(connection) => connection,
                Err(err) => {
                    let _ = ready_tx.send(Err(
                        anyhow::Error::new(err).context("failed to open SQLite store")
                    ));
                    return;
                }
            };

            if let Location::File(_) = location {
                if let Err(err) = conn.pragma_update(None, "journal_mode", "WAL") {
                    error!("Failed to enable WAL mode: {err}");
                }
            }

            let init_result = run_migrations(&mut conn).context("failed to run store migrations");
            if ready_tx.send(init_result).is_err() {
                error!("Store initialization receiver dropped before ready signal");
                return;
            }

            while let Ok(command) = command_rx.recv() {
                match command {
                    DbCommand::Execute(task) => {
                        task(&mut conn);
                    }
                    DbCommand::Shutdown => break,
                }
            }

            info!("Store thread shutting down");
        })
        .with_context(|| "failed to spawn store worker thread")?;

    ready_rx
        .recv()
        .context("store worker exited before signaling readiness")??;

    Ok(DatabaseInner {
        sender: command_tx,
        worker: Mutex::new(Some(worker)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn values_round_trip_and_overwrite() {
        let db = Database::open_in_memory().unwrap();

        assert_eq!(db.get_value("k").await.unwrap(), None);
        db.set_value("k", "one".into()).await.unwrap();
        db.set_value("k", "two".into()).await.unwrap();
        assert_eq!(db.get_value("k").await.unwrap().as_deref(), Some("two"));

        db.remove_value("k").await.unwrap();
        assert_eq!(db.get_value("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("skillswap.sqlite3");

        {
            let db = Database::new(path.clone()).unwrap();
            db.set_value(KEY_THEME, "dark".into()).await.unwrap();
            assert_eq!(db.path(), Some(path.as_path()));
        }

        let reopened = Database::new(path).unwrap();
        assert_eq!(
            reopened.get_value(KEY_THEME).await.unwrap().as_deref(),
            Some("dark")
        );
    }
}
