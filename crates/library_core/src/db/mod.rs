//! SQLite storage bootstrap, schema migrations and write scoping.
//!
//! # Responsibility
//! - Open and configure SQLite connections for the library store.
//! - Apply schema migrations in deterministic order.
//! - Provide savepoint scoping for multi-statement repository writes.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - Repositories must not read/write data before migrations succeed.
//! - A savepoint scope either releases all of its statements or none.

use log::warn;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub(crate) mod functions;
pub mod migrations;
mod open;

pub use functions::register_functions;
pub use open::{open_configured, open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Storage-level failure surfaced unchanged to repository callers.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Runs `body` inside a named SAVEPOINT on `conn`.
///
/// Savepoints nest, so this works both on a bare connection and inside a
/// transaction owned by the caller. When `body` or the final `RELEASE`
/// fails, the savepoint is rolled back and released before the error is
/// returned.
pub(crate) fn with_savepoint<T, E, F>(conn: &Connection, name: &str, body: F) -> Result<T, E>
where
    E: From<rusqlite::Error>,
    F: FnOnce() -> Result<T, E>,
{
    conn.execute_batch(&format!("SAVEPOINT {name};"))?;
    let outcome = body().and_then(|value| {
        conn.execute_batch(&format!("RELEASE {name};"))?;
        Ok(value)
    });
    if outcome.is_err() {
        rollback_savepoint(conn, name);
    }
    outcome
}

fn rollback_savepoint(conn: &Connection, name: &str) {
    if let Err(rollback_err) = conn.execute_batch(&format!("ROLLBACK TO {name}; RELEASE {name};"))
    {
        warn!(
            "event=savepoint_rollback module=db status=error savepoint={} error={}",
            name, rollback_err
        );
    }
}
