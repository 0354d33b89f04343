// SQLite-backed key-value storage

use super::KeyValueStorage;
use crate::error::{Error, Result};
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OptionalExtension};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Key-value storage in a single SQLite table
pub struct SqliteStorage {
    db: Connection,
}

impl SqliteStorage {
    /// Open or create a database file at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let db = Connection::open(path)?;
        let storage = Self { db };
        storage.create_schema()?;

        debug!(path = ?path, "Opened SQLite storage");
        Ok(storage)
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self> {
        let storage = Self {
            db: Connection::open_in_memory()?,
        };
        storage.create_schema()?;
        Ok(storage)
    }

    /// Get a reference to the SQLite database connection
    pub fn db(&self) -> &Connection {
        &self.db
    }

    fn create_schema(&self) -> Result<()> {
        self.db.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY NOT NULL,
                value TEXT NOT NULL
            );
            "#,
        )?;
        Ok(())
    }
}

impl KeyValueStorage for SqliteStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        // Read raw bytes so undecodable text is reported as corruption, not an I/O failure
        let raw = self
            .db
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| {
                Ok(match row.get_ref(0)? {
                    ValueRef::Text(bytes) | ValueRef::Blob(bytes) => Some(bytes.to_vec()),
                    _ => None,
                })
            })
            .optional()?;

        let corrupt = |reason: String| Error::Corrupt {
            key: key.to_string(),
            reason,
        };

        match raw {
            None => Ok(None),
            Some(None) => Err(corrupt("value is not text".to_string())),
            Some(Some(bytes)) => String::from_utf8(bytes)
                .map(Some)
                .map_err(|e| corrupt(e.to_string())),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.db.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            rusqlite::params![key, value],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_in_memory_get_set() {
        let mut storage = SqliteStorage::open_in_memory().unwrap();
        assert_eq!(storage.get("todos").unwrap(), None);

        storage.set("todos", "[]").unwrap();
        assert_eq!(storage.get("todos").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_set_replaces_value() {
        let mut storage = SqliteStorage::open_in_memory().unwrap();
        storage.set("todos", "first").unwrap();
        storage.set("todos", "second").unwrap();
        assert_eq!(storage.get("todos").unwrap().as_deref(), Some("second"));

        let count: i64 = storage
            .db()
            .query_row("SELECT COUNT(*) FROM kv", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_non_utf8_value_is_corrupt() {
        let storage = SqliteStorage::open_in_memory().unwrap();
        storage
            .db()
            .execute(
                "INSERT INTO kv (key, value) VALUES ('todos', CAST(x'fffe' AS TEXT))",
                [],
            )
            .unwrap();

        let err = storage.get("todos").unwrap_err();
        assert!(matches!(err, Error::Corrupt { ref key, .. } if key == "todos"));
    }

    #[test]
    fn test_values_survive_reopen() {
        let temp = TempDir::new().unwrap();
        let db_path = temp.path().join("nested/dir/todostore.db");

        {
            let mut storage = SqliteStorage::open(&db_path).unwrap();
            storage.set("todos", r#"[{"text":"a"}]"#).unwrap();
        }

        let storage = SqliteStorage::open(&db_path).unwrap();
        assert_eq!(storage.get("todos").unwrap().as_deref(), Some(r#"[{"text":"a"}]"#));
    }
}
