//! Book repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist books together with the book's side of `book_authors`.
//! - Answer title, author-name and author-count filters.
//!
//! # Invariants
//! - Every listing is ordered by `title ASC, id ASC`.
//! - A book appears at most once per result, even when several of its
//!   authors match a filter.

use super::{
    contains_pattern, ensure_connection_ready, load_links, replace_links, CrudRepository,
    LinkTable, RepoError, RepoResult, TableSpec,
};
use crate::db::with_savepoint;
use crate::model::author::AuthorId;
use crate::model::book::{Book, BookId};
use log::{debug, trace};
use rusqlite::{params, Connection, Params, Row};

const BOOK_SELECT_SQL: &str = "SELECT
    books.id,
    books.title,
    books.isbn,
    books.publisher,
    books.year
FROM books";

const BOOK_ORDER_SQL: &str = "ORDER BY books.title ASC, books.id ASC";

const BOOK_TABLES: &[TableSpec] = &[
    ("books", &["id", "title", "isbn", "publisher", "year"]),
    ("authors", &["id", "full_name"]),
    ("book_authors", &["book_id", "author_id"]),
];

const BOOK_AUTHOR_LINKS: LinkTable = LinkTable {
    table: "book_authors",
    owner_column: "book_id",
    target_column: "author_id",
};

/// Book persistence plus catalogue filters.
pub trait BookRepository: CrudRepository<BookId, Book> {
    /// Books whose title contains `title_part`, ignoring case.
    fn find_by_containing_title(&self, title_part: &str) -> RepoResult<Vec<Book>>;

    /// Books written by `author_id` whose title contains `title_part`.
    fn find_by_author_id_and_containing_title(
        &self,
        author_id: AuthorId,
        title_part: &str,
    ) -> RepoResult<Vec<Book>>;

    /// Books with at least one author whose name contains `name_part`.
    fn find_books_by_author_containing_name(&self, name_part: &str) -> RepoResult<Vec<Book>>;

    /// Books with strictly more than `count` authors.
    fn find_books_having_author_count_greater_than(&self, count: i64) -> RepoResult<Vec<Book>>;
}

/// SQLite-backed book repository.
pub struct SqliteBookRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteBookRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, BOOK_TABLES)?;
        Ok(Self { conn })
    }

    fn query_books<P: Params>(&self, clause: &str, params: P) -> RepoResult<Vec<Book>> {
        let mut stmt = self.conn.prepare(&format!("{BOOK_SELECT_SQL} {clause}"))?;
        let mut rows = stmt.query(params)?;
        let mut books = Vec::new();
        while let Some(row) = rows.next()? {
            books.push(self.parse_book_row(row)?);
        }
        trace!(
            "event=book_query module=repo status=ok result_count={}",
            books.len()
        );
        Ok(books)
    }

    fn parse_book_row(&self, row: &Row<'_>) -> RepoResult<Book> {
        let id: BookId = row.get("id")?;
        let book = Book {
            id: Some(id),
            title: row.get("title")?,
            isbn: row.get("isbn")?,
            publisher: row.get("publisher")?,
            year: row.get("year")?,
            author_ids: load_links(self.conn, &BOOK_AUTHOR_LINKS, id)?,
        };
        book.validate()?;
        Ok(book)
    }
}

impl CrudRepository<BookId, Book> for SqliteBookRepository<'_> {
    fn save(&self, mut book: Book) -> RepoResult<Book> {
        book.validate()?;

        let id = with_savepoint(self.conn, "book_save", || -> RepoResult<BookId> {
            let id = match book.id {
                Some(id) => {
                    self.conn.execute(
                        "INSERT INTO books (id, title, isbn, publisher, year)
                         VALUES (?1, ?2, ?3, ?4, ?5)
                         ON CONFLICT (id) DO UPDATE SET
                            title = excluded.title,
                            isbn = excluded.isbn,
                            publisher = excluded.publisher,
                            year = excluded.year;",
                        params![id, book.title, book.isbn, book.publisher, book.year],
                    )?;
                    id
                }
                None => {
                    self.conn.execute(
                        "INSERT INTO books (title, isbn, publisher, year)
                         VALUES (?1, ?2, ?3, ?4);",
                        params![book.title, book.isbn, book.publisher, book.year],
                    )?;
                    self.conn.last_insert_rowid()
                }
            };
            replace_links(self.conn, &BOOK_AUTHOR_LINKS, id, &book.author_ids)?;
            Ok(id)
        })?;

        book.id = Some(id);
        debug!(
            "event=book_save module=repo status=ok book_id={} author_count={}",
            id,
            book.author_ids.len()
        );
        Ok(book)
    }

    fn get(&self, id: &BookId) -> RepoResult<Option<Book>> {
        Ok(self
            .query_books("WHERE books.id = ?1;", [id])?
            .into_iter()
            .next())
    }

    fn delete(&self, book: &Book) -> RepoResult<()> {
        let not_persisted = || RepoError::NotPersisted {
            entity: "book",
            id: book.id.map(|id| id.to_string()),
        };
        let id = book.id.ok_or_else(not_persisted)?;

        let changed = self.conn.execute("DELETE FROM books WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(not_persisted());
        }

        debug!("event=book_delete module=repo status=ok book_id={id}");
        Ok(())
    }

    fn all(&self) -> RepoResult<Vec<Book>> {
        self.query_books(&format!("{BOOK_ORDER_SQL};"), [])
    }
}

impl BookRepository for SqliteBookRepository<'_> {
    fn find_by_containing_title(&self, title_part: &str) -> RepoResult<Vec<Book>> {
        self.query_books(
            &format!("WHERE fold_case(books.title) LIKE ?1 ESCAPE '\\' {BOOK_ORDER_SQL};"),
            [contains_pattern(title_part)],
        )
    }

    fn find_by_author_id_and_containing_title(
        &self,
        author_id: AuthorId,
        title_part: &str,
    ) -> RepoResult<Vec<Book>> {
        self.query_books(
            &format!(
                "INNER JOIN book_authors ba ON ba.book_id = books.id
                 WHERE ba.author_id = ?1
                   AND fold_case(books.title) LIKE ?2 ESCAPE '\\'
                 {BOOK_ORDER_SQL};"
            ),
            params![author_id, contains_pattern(title_part)],
        )
    }

    fn find_books_by_author_containing_name(&self, name_part: &str) -> RepoResult<Vec<Book>> {
        self.query_books(
            &format!(
                "WHERE EXISTS (
                    SELECT 1
                    FROM book_authors ba
                    INNER JOIN authors a ON a.id = ba.author_id
                    WHERE ba.book_id = books.id
                      AND fold_case(a.full_name) LIKE ?1 ESCAPE '\\'
                 )
                 {BOOK_ORDER_SQL};"
            ),
            [contains_pattern(name_part)],
        )
    }

    fn find_books_having_author_count_greater_than(&self, count: i64) -> RepoResult<Vec<Book>> {
        self.query_books(
            &format!(
                "WHERE (
                    SELECT COUNT(*) FROM book_authors ba WHERE ba.book_id = books.id
                 ) > ?1
                 {BOOK_ORDER_SQL};"
            ),
            [count],
        )
    }
}
