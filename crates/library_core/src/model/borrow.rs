//! Borrow record and its temporal rules.
//!
//! # Responsibility
//! - Tie one user, one librarian and a set of books to a loan period.
//! - Define "in progress", "late" and "due within N days" as pure
//!   predicates; repository SQL applies the same boundaries.
//!
//! # Invariants
//! - `requested_return >= start`.
//! - A borrow is in progress while `finished == false`.
//! - Late: in progress and `requested_return < now`.
//! - Due within `days`: in progress and
//!   `now <= requested_return <= now + days * DAY_MS`.

use super::book::BookId;
use super::librarian::LibrarianId;
use super::user::UserId;
use super::{ModelValidationError, DAY_MS};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub type BorrowId = i64;

/// Default loan length used by `Borrow::starting_at`.
pub const DEFAULT_LOAN_DAYS: i64 = 14;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Borrow {
    pub id: Option<BorrowId>,
    pub user_id: UserId,
    pub librarian_id: LibrarianId,
    pub book_ids: BTreeSet<BookId>,
    /// Epoch ms when the loan started.
    pub start: i64,
    /// Epoch ms the books are due back.
    pub requested_return: i64,
    pub finished: bool,
}

impl Borrow {
    /// Opens an unsaved loan at `start`, due `DEFAULT_LOAN_DAYS` later.
    pub fn starting_at(
        user_id: UserId,
        librarian_id: impl Into<LibrarianId>,
        book_ids: impl IntoIterator<Item = BookId>,
        start: i64,
    ) -> Self {
        Self {
            id: None,
            user_id,
            librarian_id: librarian_id.into(),
            book_ids: book_ids.into_iter().collect(),
            start,
            requested_return: start.saturating_add(DEFAULT_LOAN_DAYS * DAY_MS),
            finished: false,
        }
    }

    pub fn is_in_progress(&self) -> bool {
        !self.finished
    }

    pub fn is_late_at(&self, now: i64) -> bool {
        self.is_in_progress() && self.requested_return < now
    }

    pub fn is_due_within_at(&self, now: i64, days: i64) -> bool {
        self.is_in_progress()
            && self.requested_return >= now
            && self.requested_return <= due_horizon(now, days)
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        super::require_text("borrow", "librarian_id", &self.librarian_id)?;
        if self.requested_return < self.start {
            return Err(ModelValidationError::ReturnBeforeStart {
                start: self.start,
                requested_return: self.requested_return,
            });
        }
        Ok(())
    }
}

/// Upper bound (inclusive) of the "due within `days`" window.
pub(crate) fn due_horizon(now: i64, days: i64) -> i64 {
    now.saturating_add(days.saturating_mul(DAY_MS))
}

#[cfg(test)]
mod tests {
    use super::{Borrow, DEFAULT_LOAN_DAYS};
    use crate::model::{ModelValidationError, DAY_MS};

    const NOW: i64 = 1_700_000_000_000;

    fn due_in(days: i64) -> Borrow {
        let mut borrow = Borrow::starting_at(1, "LIB-1", [1], NOW - 30 * DAY_MS);
        borrow.requested_return = NOW + days * DAY_MS;
        borrow
    }

    #[test]
    fn starting_at_uses_default_loan_length() {
        let borrow = Borrow::starting_at(1, "LIB-1", [3, 1, 3], NOW);
        assert_eq!(borrow.requested_return - borrow.start, DEFAULT_LOAN_DAYS * DAY_MS);
        assert_eq!(borrow.book_ids.len(), 2);
        assert!(borrow.is_in_progress());
    }

    #[test]
    fn late_and_due_windows_do_not_overlap() {
        let overdue = due_in(-1);
        assert!(overdue.is_late_at(NOW));
        assert!(!overdue.is_due_within_at(NOW, 12));

        let soon = due_in(5);
        assert!(!soon.is_late_at(NOW));
        assert!(soon.is_due_within_at(NOW, 12));
        assert!(!due_in(15).is_due_within_at(NOW, 12));
    }

    #[test]
    fn due_window_includes_both_bounds() {
        let mut exactly_now = due_in(0);
        exactly_now.requested_return = NOW;
        assert!(exactly_now.is_due_within_at(NOW, 0));
        assert!(!exactly_now.is_late_at(NOW));
        assert!(due_in(12).is_due_within_at(NOW, 12));
    }

    #[test]
    fn finished_borrows_are_never_late_or_due() {
        let mut returned = due_in(-3);
        returned.finished = true;
        assert!(!returned.is_late_at(NOW));
        assert!(!returned.is_due_within_at(NOW - 10 * DAY_MS, 30));
    }

    #[test]
    fn return_before_start_is_rejected() {
        let mut borrow = Borrow::starting_at(1, "LIB-1", Vec::<i64>::new(), NOW);
        borrow.requested_return = NOW - 1;
        assert!(matches!(
            borrow.validate(),
            Err(ModelValidationError::ReturnBeforeStart { .. })
        ));
    }
}
