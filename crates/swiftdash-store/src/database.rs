//! SQLite handle for the durable slots.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use rusqlite::Connection;
use tracing::info;

use crate::error::{Result, StoreError};
use crate::migrations;

const DB_FILE: &str = "swiftdash.db";

/// An open, migrated database. Not `Sync`; callers share it behind a lock.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database in the platform data directory, creating it if
    /// needed (for example `~/.local/share/swiftdash/swiftdash.db` on Linux).
    pub fn new() -> Result<Self> {
        Self::open_at(&Self::default_path()?)
    }

    pub fn default_path() -> Result<PathBuf> {
        ProjectDirs::from("com", "swiftdash", "swiftdash")
            .map(|dirs| dirs.data_dir().join(DB_FILE))
            .ok_or(StoreError::NoDataDir)
    }

    /// Open the database at `path`. Missing parent directories are created.
    pub fn open_at(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        info!(path = %path.display(), "Opening slot database");

        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.busy_timeout(Duration::from_secs(5))?;
        Self::prepare(conn)
    }

    /// A private database that disappears with the handle.
    pub fn open_in_memory() -> Result<Self> {
        Self::prepare(Connection::open_in_memory()?)
    }

    fn prepare(conn: Connection) -> Result<Self> {
        migrations::run_migrations(&conn)?;
        Ok(Self { conn })
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// File backing the database; `None` in memory.
    pub fn path(&self) -> Option<PathBuf> {
        self.conn
            .path()
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state").join(DB_FILE);

        let db = Database::open_at(&path).unwrap();
        assert!(path.exists());
        assert!(db.path().is_some());
    }

    #[test]
    fn test_in_memory_has_no_path() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.path().is_none());
    }

    #[test]
    fn test_default_path_names_the_file() {
        if let Ok(path) = Database::default_path() {
            assert_eq!(path.file_name().and_then(|f| f.to_str()), Some(DB_FILE));
        }
    }
}
