//! Author record.
//!
//! # Invariants
//! - `full_name` is never blank.
//! - `book_ids` mirrors the author's side of the `book_authors` join table.

use super::book::BookId;
use super::{require_text, ModelValidationError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Surrogate numeric author identity.
pub type AuthorId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    /// Assigned by the store on first save.
    pub id: Option<AuthorId>,
    pub full_name: String,
    /// Books this author wrote, shared with `Book::author_ids`.
    pub book_ids: BTreeSet<BookId>,
}

impl Author {
    /// Creates an unsaved author with no books.
    pub fn new(full_name: impl Into<String>) -> Self {
        Self {
            id: None,
            full_name: full_name.into(),
            book_ids: BTreeSet::new(),
        }
    }

    /// Links a book on the author's side. Returns `false` if already linked.
    pub fn add_book(&mut self, book_id: BookId) -> bool {
        self.book_ids.insert(book_id)
    }

    pub fn remove_book(&mut self, book_id: BookId) -> bool {
        self.book_ids.remove(&book_id)
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        require_text("author", "full_name", &self.full_name)
    }
}

#[cfg(test)]
mod tests {
    use super::Author;
    use crate::model::ModelValidationError;

    #[test]
    fn blank_full_name_is_rejected() {
        let author = Author::new("   ");
        assert_eq!(
            author.validate(),
            Err(ModelValidationError::BlankField {
                entity: "author",
                field: "full_name"
            })
        );
    }

    #[test]
    fn add_book_is_set_semantics() {
        let mut author = Author::new("Ursula K. Le Guin");
        assert!(author.add_book(4));
        assert!(!author.add_book(4));
        assert_eq!(author.book_ids.len(), 1);
    }
}
