//! Book record.
//!
//! # Invariants
//! - `title` is never blank.
//! - `author_ids` mirrors the book's side of the `book_authors` join table.
//!   At least one author is expected but not enforced here.

use super::author::AuthorId;
use super::{require_text, ModelValidationError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Surrogate numeric book identity.
pub type BookId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: Option<BookId>,
    pub title: String,
    pub isbn: Option<String>,
    pub publisher: Option<String>,
    pub year: Option<i32>,
    pub author_ids: BTreeSet<AuthorId>,
}

impl Book {
    /// Creates an unsaved book with only a title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            isbn: None,
            publisher: None,
            year: None,
            author_ids: BTreeSet::new(),
        }
    }

    pub fn add_author(&mut self, author_id: AuthorId) -> bool {
        self.author_ids.insert(author_id)
    }

    pub fn remove_author(&mut self, author_id: AuthorId) -> bool {
        self.author_ids.remove(&author_id)
    }

    /// Whether more than one author shares this book.
    pub fn is_co_authored(&self) -> bool {
        self.author_ids.len() > 1
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        require_text("book", "title", &self.title)
    }
}
