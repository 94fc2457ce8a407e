//! Librarian repository contract and SQLite implementation.
//!
//! # Invariants
//! - `all()` is ordered by `last_name, first_name, id`.
//! - Activity ranking orders by processed borrow count descending, then by
//!   librarian id ascending so equal counts rank deterministically.
//! - Librarians without any borrow never appear in activity rankings.

use super::{ensure_connection_ready, CrudRepository, RepoError, RepoResult, TableSpec};
use crate::model::librarian::{Librarian, LibrarianId};
use log::{debug, trace};
use rusqlite::{params, Connection, Params};

const LIBRARIAN_SELECT_SQL: &str = "SELECT l.id, l.first_name, l.last_name FROM librarians l";

const LIBRARIAN_TABLES: &[TableSpec] = &[
    ("librarians", &["id", "first_name", "last_name"]),
    ("borrows", &["id", "librarian_id"]),
];

/// Size of the ranking returned by `top3_working_librarians`.
pub const TOP_WORKING_LIBRARIANS: u32 = 3;

pub trait LibrarianRepository: CrudRepository<LibrarianId, Librarian> {
    /// The three librarians who processed the most borrows.
    fn top3_working_librarians(&self) -> RepoResult<Vec<Librarian>> {
        self.top_working_librarians(TOP_WORKING_LIBRARIANS)
    }

    /// Up to `limit` librarians ranked by processed borrow count.
    fn top_working_librarians(&self, limit: u32) -> RepoResult<Vec<Librarian>>;
}

/// SQLite-backed librarian repository.
pub struct SqliteLibrarianRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteLibrarianRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, LIBRARIAN_TABLES)?;
        Ok(Self { conn })
    }

    fn query_librarians<P: Params>(&self, sql: &str, params: P) -> RepoResult<Vec<Librarian>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params)?;
        let mut librarians = Vec::new();
        while let Some(row) = rows.next()? {
            let librarian = Librarian {
                id: row.get("id")?,
                first_name: row.get("first_name")?,
                last_name: row.get("last_name")?,
            };
            librarian.validate()?;
            librarians.push(librarian);
        }
        trace!(
            "event=librarian_query module=repo status=ok result_count={}",
            librarians.len()
        );
        Ok(librarians)
    }
}

impl CrudRepository<LibrarianId, Librarian> for SqliteLibrarianRepository<'_> {
    fn save(&self, librarian: Librarian) -> RepoResult<Librarian> {
        librarian.validate()?;
        self.conn.execute(
            "INSERT INTO librarians (id, first_name, last_name) VALUES (?1, ?2, ?3)
             ON CONFLICT (id) DO UPDATE SET
                first_name = excluded.first_name,
                last_name = excluded.last_name;",
            params![librarian.id, librarian.first_name, librarian.last_name],
        )?;
        debug!(
            "event=librarian_save module=repo status=ok librarian_id={}",
            librarian.id
        );
        Ok(librarian)
    }

    fn get(&self, id: &LibrarianId) -> RepoResult<Option<Librarian>> {
        Ok(self
            .query_librarians(&format!("{LIBRARIAN_SELECT_SQL} WHERE l.id = ?1;"), [id])?
            .into_iter()
            .next())
    }

    fn delete(&self, librarian: &Librarian) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM librarians WHERE id = ?1;", [&librarian.id])?;
        if changed == 0 {
            return Err(RepoError::NotPersisted {
                entity: "librarian",
                id: Some(librarian.id.clone()),
            });
        }
        debug!(
            "event=librarian_delete module=repo status=ok librarian_id={}",
            librarian.id
        );
        Ok(())
    }

    fn all(&self) -> RepoResult<Vec<Librarian>> {
        self.query_librarians(
            &format!(
                "{LIBRARIAN_SELECT_SQL} ORDER BY l.last_name ASC, l.first_name ASC, l.id ASC;"
            ),
            [],
        )
    }
}

impl LibrarianRepository for SqliteLibrarianRepository<'_> {
    fn top_working_librarians(&self, limit: u32) -> RepoResult<Vec<Librarian>> {
        self.query_librarians(
            &format!(
                "{LIBRARIAN_SELECT_SQL}
                 INNER JOIN borrows b ON b.librarian_id = l.id
                 GROUP BY l.id, l.first_name, l.last_name
                 ORDER BY COUNT(b.id) DESC, l.id ASC
                 LIMIT ?1;"
            ),
            [i64::from(limit)],
        )
    }
}
