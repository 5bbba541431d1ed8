pub mod blogs;
pub mod contacts;
pub mod funds;
pub mod migrations;
pub mod requests;
pub mod users;

use std::path::Path;
use std::str::FromStr;
use std::sync::Mutex;

use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use rusqlite::types::Type;
use tracing::{info, warn};

/// Handle to the document store. One SQLite connection behind a mutex;
/// callers on the async runtime are expected to reach it through
/// `spawn_blocking`.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        // WAL mode for concurrent reads
        conn.pragma_update(None, "journal_mode", "WAL")?;

        migrations::run(&conn)?;

        info!("Database opened at {}", path.display());
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Fresh private database, used by tests and local experiments.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        migrations::run(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.conn.lock().map_err(|e| anyhow::anyhow!("DB lock poisoned: {}", e))?;
        f(&conn)
    }
}

/// Outcome of a single-document update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Changed {
    /// Documents that matched the filter.
    pub matched: usize,
    /// Documents whose stored value actually changed.
    pub modified: usize,
}

pub(crate) fn now() -> DateTime<Utc> {
    Utc::now()
}

pub(crate) fn timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339()
}

/// Read an RFC 3339 column. Corrupt values are logged and mapped to the epoch
/// rather than failing the whole listing.
pub(crate) fn parse_timestamp(raw: &str, id: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|e| {
            warn!("Corrupt timestamp '{}' on document '{}': {}", raw, id, e);
            DateTime::default()
        })
}

/// Read a text column holding a wire enum value.
pub(crate) fn enum_column<T>(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: String = row.get(idx)?;
    raw.parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
