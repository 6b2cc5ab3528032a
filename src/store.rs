//! Snapshot persistence.
//!
//! A snapshot is the whole tree in its serialized `Node` form. Stores only
//! load and save snapshots; deciding when to save is the shell's job, and the
//! actual writes happen on a background task so input handling never waits.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Deserialize;
use surrealdb::engine::local::Db;
use surrealdb::{Connection, Surreal};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::{FileSystem, Node, Result};

/// Pretty-printed JSON file, replaced atomically on every save.
#[derive(Debug, Clone)]
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn load(&self) -> Result<Option<Node>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(body) => Ok(Some(serde_json::from_str(&body)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn save(&self, root: &Node) -> Result<()> {
        let body = serde_json::to_string_pretty(root)?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        tokio::fs::write(&tmp, body).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct SnapshotRow {
    snapshot: String,
}

/// One-record SurrealDB table holding the latest snapshot as JSON text.
pub struct SurrealStore<DB = Db>
where
    DB: Connection,
{
    db: Surreal<DB>,
    table: String,
}

impl<DB> SurrealStore<DB>
where
    DB: Connection,
{
    pub fn new(db: Surreal<DB>) -> Self {
        Self {
            db,
            table: "fs_snapshot".into(),
        }
    }

    pub fn with_table(db: Surreal<DB>, table: impl Into<String>) -> Self {
        Self {
            db,
            table: table.into(),
        }
    }

    pub async fn load(&self) -> Result<Option<Node>> {
        let mut res = self
            .db
            .query(format!(
                "SELECT snapshot, updated_at FROM {} ORDER BY updated_at DESC LIMIT 1",
                self.table
            ))
            .await?;
        let row: Option<SnapshotRow> = res.take(0)?;
        match row {
            Some(row) => Ok(Some(serde_json::from_str(&row.snapshot)?)),
            None => Ok(None),
        }
    }

    pub async fn save(&self, root: &Node) -> Result<()> {
        let snapshot = serde_json::to_string(root)?;
        self.db
            .query(format!(
                "DELETE {table}; CREATE {table} SET snapshot = $snapshot, updated_at = $updated_at",
                table = self.table
            ))
            .bind(("snapshot", snapshot))
            .bind(("updated_at", now_millis()))
            .await?
            .check()?;
        Ok(())
    }
}

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

/// Where snapshots go.
pub enum Store {
    /// Nothing is kept across restarts.
    Memory,
    Json(JsonStore),
    Surreal(SurrealStore<Db>),
}

impl Store {
    pub async fn load(&self) -> Result<Option<Node>> {
        match self {
            Store::Memory => Ok(None),
            Store::Json(store) => store.load().await,
            Store::Surreal(store) => store.load().await,
        }
    }

    pub async fn save(&self, root: &Node) -> Result<()> {
        match self {
            Store::Memory => Ok(()),
            Store::Json(store) => store.save(root).await,
            Store::Surreal(store) => store.save(root).await,
        }
    }

    /// The saved tree, or seed content when there is none or it cannot be
    /// used. Never fails.
    pub async fn load_or_seed(&self) -> FileSystem {
        let restored = self
            .load()
            .await
            .and_then(|root| root.map(FileSystem::from_snapshot).transpose());
        match restored {
            Ok(Some(fs)) => {
                info!("restored filesystem from saved state");
                fs
            }
            Ok(None) => {
                info!("no saved state, starting from seed content");
                FileSystem::seed()
            }
            Err(e) => {
                warn!(error = %e, "saved state unusable, starting from seed content");
                FileSystem::seed()
            }
        }
    }
}

/// Fire-and-forget snapshot writer.
///
/// Snapshots are handed to a single background task and written in order;
/// when several queue up, only the newest is written. Dropping every
/// `Persister` lets the task drain and finish.
#[derive(Debug, Clone)]
pub struct Persister {
    tx: mpsc::UnboundedSender<Node>,
}

impl Persister {
    pub fn spawn(store: Store) -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::unbounded_channel::<Node>();
        let handle = tokio::spawn(async move {
            while let Some(snapshot) = rx.recv().await {
                let snapshot = newest(&mut rx, snapshot);
                match store.save(&snapshot).await {
                    Ok(()) => debug!("snapshot persisted"),
                    Err(e) => warn!(error = %e, "failed to persist snapshot"),
                }
            }
        });
        (Self { tx }, handle)
    }

    pub fn submit(&self, snapshot: Node) {
        if self.tx.send(snapshot).is_err() {
            warn!("persister has stopped, snapshot dropped");
        }
    }
}

/// Skip past everything already queued behind `snapshot`.
fn newest(rx: &mut mpsc::UnboundedReceiver<Node>, mut snapshot: Node) -> Node {
    while let Ok(newer) = rx.try_recv() {
        snapshot = newer;
    }
    snapshot
}
