use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use rusqlite::{Connection, OptionalExtension};
use std::sync::{Mutex, MutexGuard};

use super::IdempotencyStore;
use crate::social::types::PostResponse;

/// SQLite-backed store, so replays survive a restart.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create the store at `path`. Use `":memory:"` for tests.
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open idempotency database {path}"))?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS idempotency (
                key        TEXT PRIMARY KEY,
                response   TEXT NOT NULL,
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            )",
        )
        .context("failed to create idempotency table")?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn in_memory() -> Result<Self> {
        Self::open(":memory:")
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("idempotency database lock poisoned"))
    }
}

fn select(conn: &Connection, key: &str) -> Result<Option<PostResponse>> {
    let json: Option<String> = conn
        .query_row(
            "SELECT response FROM idempotency WHERE key = ?1",
            [key],
            |row| row.get(0),
        )
        .optional()?;
    json.map(|j| serde_json::from_str(&j).context("corrupt stored response"))
        .transpose()
}

#[async_trait]
impl IdempotencyStore for SqliteStore {
    async fn get(&self, key: &str) -> Result<Option<PostResponse>> {
        let conn = self.conn()?;
        select(&conn, key)
    }

    async fn insert_if_absent(&self, key: &str, response: PostResponse) -> Result<PostResponse> {
        let json = serde_json::to_string(&response)?;
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO idempotency (key, response) VALUES (?1, ?2)
             ON CONFLICT(key) DO NOTHING",
            [key, &json],
        )?;
        select(&conn, key)?.ok_or_else(|| anyhow!("response for {key} vanished after insert"))
    }

    async fn len(&self) -> Result<usize> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM idempotency", [], |row| row.get(0))?;
        Ok(usize::try_from(count)?)
    }
}
