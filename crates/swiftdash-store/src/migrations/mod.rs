//! Schema versioning.
//!
//! The schema version lives in SQLite's `user_version` pragma. Each step in
//! [`STEPS`] above the stored version is applied in order and the pragma is
//! advanced after it, so reopening a database is a no-op.

pub mod v001_initial;

use rusqlite::Connection;
use tracing::{debug, info};

use crate::error::{Result, StoreError};

type Step = fn(&Connection) -> rusqlite::Result<()>;

const STEPS: &[(u32, &str, Step)] = &[(1, "initial slots table", v001_initial::up)];

/// Highest version in [`STEPS`].
pub const CURRENT_VERSION: u32 = 1;

pub fn run_migrations(conn: &Connection) -> Result<()> {
    let stored: u32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    debug!(stored, latest = CURRENT_VERSION, "Schema version");

    for &(version, label, step) in STEPS.iter().filter(|(v, _, _)| *v > stored) {
        info!(version, label, "Applying migration");
        step(conn).map_err(|e| StoreError::Migration {
            version,
            reason: e.to_string(),
        })?;
        conn.pragma_update(None, "user_version", version)?;
    }
    Ok(())
}
