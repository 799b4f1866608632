use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::Connection;

use crate::dlog;
use crate::types::Workout;

/// Storage key the serialized workout sequence lives under.
pub const WORKOUTS_KEY: &str = "workouts";

/// Opaque key-value blob storage that outlives the session.
pub trait BlobStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn put(&mut self, key: &str, value: &str) -> Result<()>;
    fn delete(&mut self, key: &str) -> Result<()>;
}

/// Blob store over a single `kv` table in a SQLite file.
pub struct SqliteBlobStore {
    conn: Connection,
}

impl SqliteBlobStore {
    pub fn open(path: &Path) -> Result<Self> {
        let display = path.display();
        let conn =
            Connection::open(path).with_context(|| format!("Opening store DB: {display}"))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS kv (key TEXT PRIMARY KEY, value TEXT NOT NULL)",
            [],
        )
        .context("Ensuring kv schema")?;

        Ok(Self { conn })
    }
}

impl BlobStore for SqliteBlobStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let mut rows = stmt.query([key])?;
        match rows.next()? {
            Some(row) => Ok(Some(row.get(0)?)),
            None => Ok(None),
        }
    }

    fn put(&mut self, key: &str, value: &str) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO kv (key, value) VALUES (?1, ?2)
                 ON CONFLICT (key) DO UPDATE SET value = excluded.value",
                [key, value],
            )
            .context("Writing blob")?;
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", [key])
            .context("Deleting blob")?;
        Ok(())
    }
}

/// In-memory store; sessions built on it do not survive the process.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: HashMap<String, String>,
    writes: u64,
}

impl MemoryBlobStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `put` calls so far, for checking write-on-mutation
    /// behavior.
    #[must_use]
    pub const fn writes(&self) -> u64 {
        self.writes
    }
}

impl BlobStore for MemoryBlobStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.blobs.get(key).cloned())
    }

    fn put(&mut self, key: &str, value: &str) -> Result<()> {
        self.writes += 1;
        self.blobs.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<()> {
        self.blobs.remove(key);
        Ok(())
    }
}

/// Serialize the whole ordered sequence, overwriting any prior blob.
pub fn save<B: BlobStore>(blob: &mut B, workouts: &[Workout]) -> Result<()> {
    let json = serde_json::to_string(workouts).context("Serializing workouts")?;
    blob.put(WORKOUTS_KEY, &json)?;
    dlog!("saved_workouts count={}", workouts.len());
    Ok(())
}

/// Read the stored sequence back into full typed workouts. An absent key,
/// an unreadable backend, or a malformed blob all load as the empty
/// sequence; reads never fail the caller.
pub fn load<B: BlobStore>(blob: &B) -> Vec<Workout> {
    let raw = match blob.get(WORKOUTS_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            tracing::warn!(err = %e, "could not read stored workouts; starting empty");
            return Vec::new();
        }
    };

    match serde_json::from_str(&raw) {
        Ok(workouts) => workouts,
        Err(e) => {
            tracing::warn!(err = %e, "stored workouts are malformed; starting empty");
            Vec::new()
        }
    }
}

/// Drop the stored sequence entirely. A session has to be restarted to
/// observe the empty state.
pub fn reset<B: BlobStore>(blob: &mut B) -> Result<()> {
    blob.delete(WORKOUTS_KEY).context("Deleting stored workouts")
}
