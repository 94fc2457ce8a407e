//! Borrow repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist borrows with their book set (`borrow_books`).
//! - Answer in-progress, overdue and due-soon circulation queries.
//!
//! # Invariants
//! - Late: `finished = 0 AND requested_return_at < now`.
//! - Due within N days: `finished = 0 AND requested_return_at BETWEEN now
//!   AND now + N days` (both bounds inclusive), disjoint from late.
//! - Circulation listings are ordered by `requested_return_at ASC, id ASC`.
//! - Book counts count books, not borrow rows; a borrow without books
//!   contributes zero.

use super::{
    bool_to_int, ensure_connection_ready, int_to_bool, load_links, replace_links,
    CrudRepository, LinkTable, RepoError, RepoResult, TableSpec,
};
use crate::db::with_savepoint;
use crate::model::borrow::{due_horizon, Borrow, BorrowId};
use crate::model::now_epoch_ms;
use crate::model::user::UserId;
use log::{debug, trace};
use rusqlite::{params, Connection, Params, Row};

const BORROW_SELECT_SQL: &str = "SELECT
    id,
    user_id,
    librarian_id,
    start_at,
    requested_return_at,
    finished
FROM borrows";

const CIRCULATION_ORDER_SQL: &str = "ORDER BY requested_return_at ASC, id ASC";

const BORROW_TABLES: &[TableSpec] = &[
    (
        "borrows",
        &[
            "id",
            "user_id",
            "librarian_id",
            "start_at",
            "requested_return_at",
            "finished",
        ],
    ),
    ("borrow_books", &["borrow_id", "book_id"]),
];

const BORROW_BOOK_LINKS: LinkTable = LinkTable {
    table: "borrow_books",
    owner_column: "borrow_id",
    target_column: "book_id",
};

pub trait BorrowRepository: CrudRepository<BorrowId, Borrow> {
    /// Unfinished borrows of `user_id`.
    fn find_in_progress_by_user(&self, user_id: UserId) -> RepoResult<Vec<Borrow>>;

    /// Distinct books currently held by `user_id` across unfinished borrows.
    fn count_current_borrowed_books_by_user(&self, user_id: UserId) -> RepoResult<i64>;

    /// Books ever borrowed by `user_id`, finished or not.
    fn count_borrowed_books_by_user(&self, user_id: UserId) -> RepoResult<i64>;

    /// Unfinished borrows past their requested return as of `now`.
    fn find_all_late_borrows_at(&self, now: i64) -> RepoResult<Vec<Borrow>>;

    /// Unfinished borrows due between `now` and `now + days`.
    fn find_all_borrows_due_within_at(&self, now: i64, days: i64) -> RepoResult<Vec<Borrow>>;

    /// `find_all_late_borrows_at` against the wall clock.
    fn find_all_late_borrows(&self) -> RepoResult<Vec<Borrow>> {
        self.find_all_late_borrows_at(now_epoch_ms())
    }

    /// `find_all_borrows_due_within_at` against the wall clock.
    fn find_all_borrows_due_within(&self, days: i64) -> RepoResult<Vec<Borrow>> {
        self.find_all_borrows_due_within_at(now_epoch_ms(), days)
    }
}

pub struct SqliteBorrowRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteBorrowRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, BORROW_TABLES)?;
        Ok(Self { conn })
    }

    fn query_borrows<P: Params>(&self, clause: &str, params: P) -> RepoResult<Vec<Borrow>> {
        let mut stmt = self.conn.prepare(&format!("{BORROW_SELECT_SQL} {clause}"))?;
        let mut rows = stmt.query(params)?;
        let mut borrows = Vec::new();
        while let Some(row) = rows.next()? {
            borrows.push(self.parse_borrow_row(row)?);
        }
        trace!(
            "event=borrow_query module=repo status=ok result_count={}",
            borrows.len()
        );
        Ok(borrows)
    }

    fn parse_borrow_row(&self, row: &Row<'_>) -> RepoResult<Borrow> {
        let id: BorrowId = row.get("id")?;
        let borrow = Borrow {
            id: Some(id),
            user_id: row.get("user_id")?,
            librarian_id: row.get("librarian_id")?,
            book_ids: load_links(self.conn, &BORROW_BOOK_LINKS, id)?,
            start: row.get("start_at")?,
            requested_return: row.get("requested_return_at")?,
            finished: int_to_bool(row.get("finished")?, "borrows.finished")?,
        };
        borrow.validate()?;
        Ok(borrow)
    }

    fn count_books(&self, extra_filter: &str, user_id: UserId, distinct: bool) -> RepoResult<i64> {
        let counted = if distinct {
            "COUNT(DISTINCT bb.book_id)"
        } else {
            "COUNT(bb.book_id)"
        };
        let count: i64 = self.conn.query_row(
            &format!(
                "SELECT {counted}
                 FROM borrows b
                 INNER JOIN borrow_books bb ON bb.borrow_id = b.id
                 WHERE b.user_id = ?1 {extra_filter};"
            ),
            [user_id],
            |row| row.get(0),
        )?;
        trace!(
            "event=borrow_book_count module=repo status=ok user_id={} distinct={} result_count={}",
            user_id,
            distinct,
            count
        );
        Ok(count)
    }
}

impl CrudRepository<BorrowId, Borrow> for SqliteBorrowRepository<'_> {
    fn save(&self, mut borrow: Borrow) -> RepoResult<Borrow> {
        borrow.validate()?;

        let id = with_savepoint(self.conn, "borrow_save", || -> RepoResult<BorrowId> {
            let id = match borrow.id {
                Some(id) => {
                    self.conn.execute(
                        "INSERT INTO borrows (
                            id,
                            user_id,
                            librarian_id,
                            start_at,
                            requested_return_at,
                            finished
                         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                         ON CONFLICT (id) DO UPDATE SET
                            user_id = excluded.user_id,
                            librarian_id = excluded.librarian_id,
                            start_at = excluded.start_at,
                            requested_return_at = excluded.requested_return_at,
                            finished = excluded.finished;",
                        params![
                            id,
                            borrow.user_id,
                            borrow.librarian_id,
                            borrow.start,
                            borrow.requested_return,
                            bool_to_int(borrow.finished),
                        ],
                    )?;
                    id
                }
                None => {
                    self.conn.execute(
                        "INSERT INTO borrows (
                            user_id,
                            librarian_id,
                            start_at,
                            requested_return_at,
                            finished
                         ) VALUES (?1, ?2, ?3, ?4, ?5);",
                        params![
                            borrow.user_id,
                            borrow.librarian_id,
                            borrow.start,
                            borrow.requested_return,
                            bool_to_int(borrow.finished),
                        ],
                    )?;
                    self.conn.last_insert_rowid()
                }
            };
            replace_links(self.conn, &BORROW_BOOK_LINKS, id, &borrow.book_ids)?;
            Ok(id)
        })?;

        borrow.id = Some(id);
        debug!(
            "event=borrow_save module=repo status=ok borrow_id={} user_id={} librarian_id={} book_count={} finished={}",
            id,
            borrow.user_id,
            borrow.librarian_id,
            borrow.book_ids.len(),
            borrow.finished
        );
        Ok(borrow)
    }

    fn get(&self, id: &BorrowId) -> RepoResult<Option<Borrow>> {
        Ok(self.query_borrows("WHERE id = ?1;", [id])?.into_iter().next())
    }

    fn delete(&self, borrow: &Borrow) -> RepoResult<()> {
        let not_persisted = || RepoError::NotPersisted {
            entity: "borrow",
            id: borrow.id.map(|id| id.to_string()),
        };
        let id = borrow.id.ok_or_else(not_persisted)?;

        let changed = self
            .conn
            .execute("DELETE FROM borrows WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(not_persisted());
        }
        debug!("event=borrow_delete module=repo status=ok borrow_id={id}");
        Ok(())
    }

    fn all(&self) -> RepoResult<Vec<Borrow>> {
        self.query_borrows("ORDER BY start_at ASC, id ASC;", [])
    }
}

impl BorrowRepository for SqliteBorrowRepository<'_> {
    fn find_in_progress_by_user(&self, user_id: UserId) -> RepoResult<Vec<Borrow>> {
        self.query_borrows(
            &format!("WHERE user_id = ?1 AND finished = 0 {CIRCULATION_ORDER_SQL};"),
            [user_id],
        )
    }

    fn count_current_borrowed_books_by_user(&self, user_id: UserId) -> RepoResult<i64> {
        self.count_books("AND b.finished = 0", user_id, true)
    }

    fn count_borrowed_books_by_user(&self, user_id: UserId) -> RepoResult<i64> {
        self.count_books("", user_id, false)
    }

    fn find_all_late_borrows_at(&self, now: i64) -> RepoResult<Vec<Borrow>> {
        self.query_borrows(
            &format!("WHERE finished = 0 AND requested_return_at < ?1 {CIRCULATION_ORDER_SQL};"),
            [now],
        )
    }

    fn find_all_borrows_due_within_at(&self, now: i64, days: i64) -> RepoResult<Vec<Borrow>> {
        self.query_borrows(
            &format!(
                "WHERE finished = 0
                   AND requested_return_at BETWEEN ?1 AND ?2
                 {CIRCULATION_ORDER_SQL};"
            ),
            [now, due_horizon(now, days)],
        )
    }
}
