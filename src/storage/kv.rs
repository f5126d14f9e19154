use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{JotterError, Result};

const JOTTER_DIR: &str = ".jotter";
const KV_DB: &str = "jotter.db";

/// The persistence substrate: named string slots, one writer per process.
pub trait KvStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn put(&self, key: &str, value: &str) -> Result<()>;
}

/// Durable key-value store over a single-table SQLite database in
/// `.jotter/jotter.db`.
pub struct SqliteKv {
    conn: Connection,
    #[allow(dead_code)]
    path: PathBuf,
}

impl SqliteKv {
    /// Initialize a new notebook under `root`
    pub fn init(root: &Path) -> Result<Self> {
        let jotter_dir = root.join(JOTTER_DIR);

        if jotter_dir.exists() {
            return Err(JotterError::AlreadyInitialized);
        }

        fs::create_dir_all(&jotter_dir)?;
        Self::open_db(jotter_dir.join(KV_DB))
    }

    /// Open an existing notebook under `root`
    pub fn open(root: &Path) -> Result<Self> {
        let path = root.join(JOTTER_DIR).join(KV_DB);

        if !path.exists() {
            return Err(JotterError::NotInitialized);
        }

        Self::open_db(path)
    }

    fn open_db(path: PathBuf) -> Result<Self> {
        let conn = Connection::open(&path)?;

        let kv = Self { conn, path };
        kv.init_schema()?;
        Ok(kv)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS slots (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )?;
        Ok(())
    }
}

impl KvStore for SqliteKv {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM slots WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO slots (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }
}

/// In-memory store for tests and for running without a notebook on disk.
#[derive(Debug, Default)]
pub struct MemoryKv {
    slots: RefCell<HashMap<String, String>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryKv {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.slots.borrow().get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        self.slots
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_creates_notebook() {
        let tmp = TempDir::new().unwrap();
        let kv = SqliteKv::init(tmp.path()).unwrap();
        assert!(tmp.path().join(".jotter/jotter.db").exists());
        assert_eq!(kv.get("NOTES").unwrap(), None);
    }

    #[test]
    fn test_init_twice_fails() {
        let tmp = TempDir::new().unwrap();
        SqliteKv::init(tmp.path()).unwrap();
        assert!(matches!(
            SqliteKv::init(tmp.path()),
            Err(JotterError::AlreadyInitialized)
        ));
    }

    #[test]
    fn test_open_without_init_fails() {
        let tmp = TempDir::new().unwrap();
        assert!(matches!(
            SqliteKv::open(tmp.path()),
            Err(JotterError::NotInitialized)
        ));
    }

    #[test]
    fn test_put_survives_reopen() {
        let tmp = TempDir::new().unwrap();
        {
            let kv = SqliteKv::init(tmp.path()).unwrap();
            kv.put("NOTES", "[]").unwrap();
            kv.put("NOTES", "[1]").unwrap();
        }
        let kv = SqliteKv::open(tmp.path()).unwrap();
        assert_eq!(kv.get("NOTES").unwrap().as_deref(), Some("[1]"));
    }

    #[test]
    fn test_memory_kv_roundtrip() {
        let kv = MemoryKv::new();
        assert_eq!(kv.get("TAGS").unwrap(), None);
        kv.put("TAGS", "[]").unwrap();
        assert_eq!(kv.get("TAGS").unwrap().as_deref(), Some("[]"));
    }
}
