//! Borrower record.

use super::{require_text, ModelValidationError};
use serde::{Deserialize, Serialize};

pub type UserId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Option<UserId>,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
}

impl User {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            id: None,
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: None,
        }
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        require_text("user", "first_name", &self.first_name)?;
        require_text("user", "last_name", &self.last_name)
    }
}
