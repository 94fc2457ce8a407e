//! Repository contracts and SQLite implementations.
//!
//! # Responsibility
//! - Define the shared CRUD contract every entity repository implements.
//! - Keep SQL details and ordering rules inside the persistence boundary.
//! - Map storage failures to one error type without recovery or retry.
//!
//! # Invariants
//! - Write paths call `validate()` before any SQL mutation.
//! - Read paths reject invalid persisted state instead of masking it.
//! - "Not found" on lookup is `Ok(None)`, never an error.
//! - Unknown foreign ids in query parameters yield empty results.

use crate::db::migrations::latest_version;
use crate::db::{register_functions, DbError};
use crate::model::ModelValidationError;
use rusqlite::{params, Connection};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod author_repo;
pub mod book_repo;
pub mod borrow_repo;
pub mod librarian_repo;
pub mod user_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Error returned by every repository operation.
#[derive(Debug)]
pub enum RepoError {
    /// Entity failed its own invariants; nothing was written.
    Validation(ModelValidationError),
    /// Connectivity, constraint or rollback failure from the store.
    Persistence(DbError),
    /// Delete/update target was never saved or is already removed.
    NotPersisted {
        entity: &'static str,
        id: Option<String>,
    },
    /// A stored row cannot be decoded into a valid entity.
    InvalidData(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Persistence(err) => write!(f, "{err}"),
            Self::NotPersisted { entity, id: Some(id) } => {
                write!(f, "{entity} {id} is not persisted")
            }
            Self::NotPersisted { entity, id: None } => {
                write!(f, "{entity} has no identity; it was never saved")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "repository requires column `{column}` in table `{table}`"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Persistence(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ModelValidationError> for RepoError {
    fn from(value: ModelValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Persistence(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Persistence(DbError::Sqlite(value))
    }
}

/// Shared persistence contract keyed by identity type `K` for entity `E`.
pub trait CrudRepository<K, E> {
    /// Inserts `entity`, or updates it when it already carries an identity.
    /// Returns the stored entity with its identity filled in.
    fn save(&self, entity: E) -> RepoResult<E>;
    /// Looks up by primary key; `Ok(None)` when absent.
    fn get(&self, id: &K) -> RepoResult<Option<E>>;
    /// Removes `entity`; `RepoError::NotPersisted` if it is not stored.
    fn delete(&self, entity: &E) -> RepoResult<()>;
    /// Every stored entity, ordered by its display key.
    fn all(&self) -> RepoResult<Vec<E>>;
}

/// Table plus the columns a repository reads or writes.
pub(crate) type TableSpec = (&'static str, &'static [&'static str]);

/// Verifies `conn` is migrated and has the expected shape, then registers
/// the SQL functions repository queries rely on.
pub(crate) fn ensure_connection_ready(conn: &Connection, tables: &[TableSpec]) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for &(table, columns) in tables {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
        for &column in columns {
            if !table_has_column(conn, table, column)? {
                return Err(RepoError::MissingRequiredColumn { table, column });
            }
        }
    }

    register_functions(conn)?;
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Builds a case-insensitive `LIKE` pattern matching `term` anywhere.
///
/// `%`, `_` and `\` in the term match literally; queries must declare
/// `ESCAPE '\'`. An empty term matches every non-null value.
pub(crate) fn contains_pattern(term: &str) -> String {
    let folded = crate::db::functions::fold_case(term);
    let mut pattern = String::with_capacity(folded.len() + 2);
    pattern.push('%');
    for ch in folded.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

/// Many-to-many join table seen from one side.
pub(crate) struct LinkTable {
    pub table: &'static str,
    pub owner_column: &'static str,
    pub target_column: &'static str,
}

/// Replaces every link of `owner` with `targets`.
///
/// Callers run this inside a savepoint together with the owner row write.
pub(crate) fn replace_links(
    conn: &Connection,
    link: &LinkTable,
    owner: i64,
    targets: &BTreeSet<i64>,
) -> RepoResult<()> {
    conn.execute(
        &format!("DELETE FROM {} WHERE {} = ?1;", link.table, link.owner_column),
        [owner],
    )?;
    let mut insert = conn.prepare(&format!(
        "INSERT INTO {} ({}, {}) VALUES (?1, ?2);",
        link.table, link.owner_column, link.target_column
    ))?;
    for target in targets {
        insert.execute(params![owner, target])?;
    }
    Ok(())
}

pub(crate) fn load_links(
    conn: &Connection,
    link: &LinkTable,
    owner: i64,
) -> RepoResult<BTreeSet<i64>> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {} FROM {} WHERE {} = ?1;",
        link.target_column, link.table, link.owner_column
    ))?;
    let mut rows = stmt.query([owner])?;
    let mut targets = BTreeSet::new();
    while let Some(row) = rows.next()? {
        targets.insert(row.get::<_, i64>(0)?);
    }
    Ok(targets)
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

pub(crate) fn int_to_bool(value: i64, column: &str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean value `{other}` in {column}"
        ))),
    }
}
