use rusqlite::{Connection, OptionalExtension};
use std::path::Path;

pub const IDENTITY_KEY: &str = "lasustech_user";
pub const LEDGER_KEY: &str = "lasustech_attendance";

/// Named-key persistence port. Values are opaque JSON text; callers own the
/// encoding and overwrite the whole value on every save.
pub trait KvStore {
    fn load(&self, key: &str) -> anyhow::Result<Option<String>>;
    fn save(&mut self, key: &str, value: &str) -> anyhow::Result<()>;
}

pub struct SqliteStore {
    conn: Connection,
}

pub fn open_store(workspace: &Path) -> anyhow::Result<SqliteStore> {
    std::fs::create_dir_all(workspace)?;
    let db_path = workspace.join("attendance.sqlite3");
    let conn = Connection::open(db_path)?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS kv_store(
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )",
        [],
    )?;

    Ok(SqliteStore { conn })
}

impl KvStore for SqliteStore {
    fn load(&self, key: &str) -> anyhow::Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv_store WHERE key = ?", [key], |r| {
                r.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    fn save(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        self.conn.execute(
            "INSERT INTO kv_store(key, value) VALUES(?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            (key, value),
        )?;
        Ok(())
    }
}

/// In-memory port used as the unit-test fake.
#[cfg(test)]
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: std::collections::HashMap<String, String>,
}

#[cfg(test)]
impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
impl KvStore for MemoryStore {
    fn load(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn save(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
