//! Named durable slots.
//!
//! A slot is a single key holding one serialized value. Writing replaces the
//! previous value; there is no versioning or history.

use chrono::Utc;
use rusqlite::{params, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::database::Database;
use crate::error::Result;

impl Database {
    pub fn read_slot(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn()
            .query_row(
                "SELECT value FROM slots WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    pub fn write_slot(&self, key: &str, value: &str) -> Result<()> {
        self.conn().execute(
            "INSERT OR REPLACE INTO slots (key, value, updated_at) VALUES (?1, ?2, ?3)",
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        tracing::debug!(key, "slot written");
        Ok(())
    }

    /// Remove a slot. Returns whether a value was present.
    pub fn remove_slot(&self, key: &str) -> Result<bool> {
        let affected = self
            .conn()
            .execute("DELETE FROM slots WHERE key = ?1", params![key])?;
        tracing::debug!(key, removed = affected > 0, "slot cleared");
        Ok(affected > 0)
    }

    pub fn write_slot_json<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string(value)?;
        self.write_slot(key, &json)
    }

    /// Read and decode a JSON slot. A present but undecodable value is an
    /// error; callers decide whether to discard it.
    pub fn read_slot_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.read_slot(key)? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;
    use crate::StoreError;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Probe {
        name: String,
        count: u32,
    }

    #[test]
    fn missing_slot_reads_none() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.read_slot("absent").unwrap(), None);
    }

    #[test]
    fn write_replaces_previous_value() {
        let db = Database::open_in_memory().unwrap();
        db.write_slot("k", "one").unwrap();
        db.write_slot("k", "two").unwrap();
        assert_eq!(db.read_slot("k").unwrap().as_deref(), Some("two"));
    }

    #[test]
    fn remove_reports_presence() {
        let db = Database::open_in_memory().unwrap();
        db.write_slot("k", "v").unwrap();
        assert!(db.remove_slot("k").unwrap());
        assert!(!db.remove_slot("k").unwrap());
        assert_eq!(db.read_slot("k").unwrap(), None);
    }

    #[test]
    fn json_slot_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slots.db");
        let probe = Probe {
            name: "admin".into(),
            count: 3,
        };

        {
            let db = Database::open_at(&path).unwrap();
            db.write_slot_json("probe", &probe).unwrap();
        }

        let db = Database::open_at(&path).unwrap();
        let back: Option<Probe> = db.read_slot_json("probe").unwrap();
        assert_eq!(back, Some(probe));
    }

    #[test]
    fn corrupt_json_is_an_error() {
        let db = Database::open_in_memory().unwrap();
        db.write_slot("probe", "{not json").unwrap();
        let result: Result<Option<Probe>> = db.read_slot_json("probe");
        assert!(matches!(result, Err(StoreError::Json(_))));
    }
}
