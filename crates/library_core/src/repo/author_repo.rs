//! Author repository contract and SQLite implementation.
//!
//! # Invariants
//! - Listing and search results are ordered by `full_name ASC, id ASC`.
//! - Saving an author replaces the author's side of `book_authors`.

use super::{
    contains_pattern, ensure_connection_ready, load_links, replace_links, CrudRepository,
    LinkTable, RepoError, RepoResult, TableSpec,
};
use crate::db::with_savepoint;
use crate::model::author::{Author, AuthorId};
use log::{debug, trace};
use rusqlite::{params, Connection, Params, Row};

const AUTHOR_SELECT_SQL: &str = "SELECT id, full_name FROM authors";

const AUTHOR_TABLES: &[TableSpec] = &[
    ("authors", &["id", "full_name"]),
    ("book_authors", &["book_id", "author_id"]),
];

const AUTHOR_BOOK_LINKS: LinkTable = LinkTable {
    table: "book_authors",
    owner_column: "author_id",
    target_column: "book_id",
};

/// Author persistence plus name search and co-authorship checks.
pub trait AuthorRepository: CrudRepository<AuthorId, Author> {
    /// Authors whose full name contains `name_part`, ignoring case.
    fn search_by_name(&self, name_part: &str) -> RepoResult<Vec<Author>>;

    /// Whether the author wrote at least one book that has more than one
    /// author. Unknown ids answer `false`.
    fn check_author_by_id_having_co_authored_books(&self, author_id: AuthorId)
        -> RepoResult<bool>;
}

/// SQLite-backed author repository.
pub struct SqliteAuthorRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAuthorRepository<'conn> {
    /// Creates the repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, AUTHOR_TABLES)?;
        Ok(Self { conn })
    }

    fn query_authors<P: Params>(&self, clause: &str, params: P) -> RepoResult<Vec<Author>> {
        let mut stmt = self.conn.prepare(&format!("{AUTHOR_SELECT_SQL} {clause}"))?;
        let mut rows = stmt.query(params)?;
        let mut authors = Vec::new();
        while let Some(row) = rows.next()? {
            authors.push(self.parse_author_row(row)?);
        }
        Ok(authors)
    }

    fn parse_author_row(&self, row: &Row<'_>) -> RepoResult<Author> {
        let id: AuthorId = row.get("id")?;
        let author = Author {
            id: Some(id),
            full_name: row.get("full_name")?,
            book_ids: load_links(self.conn, &AUTHOR_BOOK_LINKS, id)?,
        };
        author.validate()?;
        Ok(author)
    }
}

impl CrudRepository<AuthorId, Author> for SqliteAuthorRepository<'_> {
    fn save(&self, mut author: Author) -> RepoResult<Author> {
        author.validate()?;

        let id = with_savepoint(self.conn, "author_save", || -> RepoResult<AuthorId> {
            let id = match author.id {
                Some(id) => {
                    self.conn.execute(
                        "INSERT INTO authors (id, full_name) VALUES (?1, ?2)
                         ON CONFLICT (id) DO UPDATE SET full_name = excluded.full_name;",
                        params![id, author.full_name],
                    )?;
                    id
                }
                None => {
                    self.conn.execute(
                        "INSERT INTO authors (full_name) VALUES (?1);",
                        [author.full_name.as_str()],
                    )?;
                    self.conn.last_insert_rowid()
                }
            };
            replace_links(self.conn, &AUTHOR_BOOK_LINKS, id, &author.book_ids)?;
            Ok(id)
        })?;

        author.id = Some(id);
        debug!(
            "event=author_save module=repo status=ok author_id={} book_count={}",
            id,
            author.book_ids.len()
        );
        Ok(author)
    }

    fn get(&self, id: &AuthorId) -> RepoResult<Option<Author>> {
        Ok(self.query_authors("WHERE id = ?1;", [id])?.into_iter().next())
    }

    fn delete(&self, author: &Author) -> RepoResult<()> {
        let not_persisted = || RepoError::NotPersisted {
            entity: "author",
            id: author.id.map(|id| id.to_string()),
        };
        let id = author.id.ok_or_else(not_persisted)?;

        let changed = self
            .conn
            .execute("DELETE FROM authors WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(not_persisted());
        }

        debug!("event=author_delete module=repo status=ok author_id={id}");
        Ok(())
    }

    fn all(&self) -> RepoResult<Vec<Author>> {
        self.query_authors("ORDER BY full_name ASC, id ASC;", [])
    }
}

impl AuthorRepository for SqliteAuthorRepository<'_> {
    fn search_by_name(&self, name_part: &str) -> RepoResult<Vec<Author>> {
        let authors = self.query_authors(
            "WHERE fold_case(full_name) LIKE ?1 ESCAPE '\\'
             ORDER BY full_name ASC, id ASC;",
            [contains_pattern(name_part)],
        )?;
        trace!(
            "event=author_search module=repo status=ok result_count={}",
            authors.len()
        );
        Ok(authors)
    }

    fn check_author_by_id_having_co_authored_books(
        &self,
        author_id: AuthorId,
    ) -> RepoResult<bool> {
        let co_authored: i64 = self.conn.query_row(
            "SELECT COUNT(b.id)
             FROM books b
             WHERE b.id IN (
                    SELECT ba.book_id FROM book_authors ba WHERE ba.author_id = ?1
                )
               AND (
                    SELECT COUNT(*) FROM book_authors co WHERE co.book_id = b.id
                ) > 1;",
            [author_id],
            |row| row.get(0),
        )?;
        trace!(
            "event=author_co_authored module=repo status=ok author_id={} result_count={}",
            author_id,
            co_authored
        );
        Ok(co_authored > 0)
    }
}
