//! Librarian record keyed by employee code.
//!
//! # Invariants
//! - `id` is a caller-chosen natural key and is never blank.
//! - Borrows reference librarians; a librarian holds no borrow list itself.

use super::{require_text, ModelValidationError};
use serde::{Deserialize, Serialize};

/// Employee code, e.g. `"LIB-0042"`.
pub type LibrarianId = String;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Librarian {
    pub id: LibrarianId,
    pub first_name: String,
    pub last_name: String,
}

impl Librarian {
    pub fn new(
        id: impl Into<LibrarianId>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        require_text("librarian", "id", &self.id)?;
        require_text("librarian", "first_name", &self.first_name)?;
        require_text("librarian", "last_name", &self.last_name)
    }
}
