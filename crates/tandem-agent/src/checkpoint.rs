use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use chrono::Utc;
use futures::future::BoxFuture;
use rusqlite::{params, Connection};

use tandem_core::error::{Result, TandemError};
use tandem_core::state::AgentState;
use tandem_core::types::ThreadId;

/// Persists conversation state between node invocations.
///
/// Latest-wins per thread: a thread has at most one live snapshot. The graph
/// runtime saves after every successful node; nodes never touch this.
pub trait Checkpointer: Send + Sync + 'static {
    /// Save (replacing) the snapshot for a thread.
    fn save(&self, thread: &ThreadId, state: &AgentState) -> BoxFuture<'_, Result<()>>;

    /// Load the latest snapshot for a thread.
    fn load_latest(&self, thread: &ThreadId) -> BoxFuture<'_, Result<Option<AgentState>>>;

    /// Delete a thread's snapshot. Returns how many were removed.
    fn delete(&self, thread: &ThreadId) -> BoxFuture<'_, Result<usize>>;
}

/// In-memory checkpointer. The default for compiled workflows; snapshots
/// live only as long as the process.
pub struct MemorySaver {
    threads: tokio::sync::Mutex<HashMap<String, AgentState>>,
}

impl MemorySaver {
    pub fn new() -> Self {
        Self {
            threads: tokio::sync::Mutex::new(HashMap::new()),
        }
    }
}

impl Default for MemorySaver {
    fn default() -> Self {
        Self::new()
    }
}

impl Checkpointer for MemorySaver {
    fn save(&self, thread: &ThreadId, state: &AgentState) -> BoxFuture<'_, Result<()>> {
        let thread = thread.0.clone();
        let state = state.clone();
        Box::pin(async move {
            self.threads.lock().await.insert(thread, state);
            Ok(())
        })
    }

    fn load_latest(&self, thread: &ThreadId) -> BoxFuture<'_, Result<Option<AgentState>>> {
        let thread = thread.0.clone();
        Box::pin(async move { Ok(self.threads.lock().await.get(&thread).cloned()) })
    }

    fn delete(&self, thread: &ThreadId) -> BoxFuture<'_, Result<usize>> {
        let thread = thread.0.clone();
        Box::pin(async move {
            Ok(self.threads.lock().await.remove(&thread).map_or(0, |_| 1))
        })
    }
}

/// Durable checkpointer backed by SQLite.
pub struct SqliteSaver {
    conn: Mutex<Connection>,
}

impl SqliteSaver {
    /// Open or create the checkpoint database.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)
            .map_err(|e| TandemError::Checkpoint(format!("failed to open database: {}", e)))?;

        conn.execute_batch(
            "PRAGMA journal_mode=WAL;
             PRAGMA synchronous=NORMAL;

             CREATE TABLE IF NOT EXISTS checkpoints (
                 id INTEGER PRIMARY KEY AUTOINCREMENT,
                 thread_id TEXT NOT NULL,
                 state_json TEXT NOT NULL,
                 updated_at TEXT NOT NULL
             );

             CREATE INDEX IF NOT EXISTS idx_cp_thread
                 ON checkpoints(thread_id, id DESC);",
        )
        .map_err(|e| TandemError::Checkpoint(format!("failed to initialize schema: {}", e)))?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| TandemError::Checkpoint(e.to_string()))
    }
}

impl Checkpointer for SqliteSaver {
    fn save(&self, thread: &ThreadId, state: &AgentState) -> BoxFuture<'_, Result<()>> {
        let thread = thread.0.clone();
        let state = state.clone();
        Box::pin(async move {
            let state_json = serde_json::to_string(&state)?;
            let conn = self.lock()?;

            // Keep only the latest snapshot per thread
            conn.execute(
                "DELETE FROM checkpoints WHERE thread_id = ?1",
                params![thread],
            )
            .map_err(|e| TandemError::Checkpoint(format!("failed to clean old snapshot: {}", e)))?;

            conn.execute(
                "INSERT INTO checkpoints (thread_id, state_json, updated_at)
                 VALUES (?1, ?2, ?3)",
                params![thread, state_json, Utc::now().to_rfc3339()],
            )
            .map_err(|e| TandemError::Checkpoint(format!("failed to save snapshot: {}", e)))?;

            Ok(())
        })
    }

    fn load_latest(&self, thread: &ThreadId) -> BoxFuture<'_, Result<Option<AgentState>>> {
        let thread = thread.0.clone();
        Box::pin(async move {
            let conn = self.lock()?;
            let mut stmt = conn
                .prepare(
                    "SELECT state_json FROM checkpoints
                     WHERE thread_id = ?1
                     ORDER BY id DESC
                     LIMIT 1",
                )
                .map_err(|e| TandemError::Checkpoint(format!("failed to prepare query: {}", e)))?;

            let json: Option<String> = stmt
                .query_row(params![thread], |row| row.get(0))
                .ok();

            match json {
                Some(json) => Ok(Some(serde_json::from_str(&json)?)),
                None => Ok(None),
            }
        })
    }

    fn delete(&self, thread: &ThreadId) -> BoxFuture<'_, Result<usize>> {
        let thread = thread.0.clone();
        Box::pin(async move {
            let conn = self.lock()?;
            let deleted = conn
                .execute(
                    "DELETE FROM checkpoints WHERE thread_id = ?1",
                    params![thread],
                )
                .map_err(|e| TandemError::Checkpoint(format!("failed to delete snapshot: {}", e)))?;
            Ok(deleted)
        })
    }
}
