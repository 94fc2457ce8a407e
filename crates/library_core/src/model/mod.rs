//! Library domain model: catalogue and circulation records.
//!
//! # Responsibility
//! - Define the plain records persisted by the repositories.
//! - Own field-level invariants through `validate()`.
//!
//! # Invariants
//! - Numeric identities are `None` until first persisted.
//! - Relationship sets hold foreign identities only, never nested records.
//! - Timestamps are Unix epoch milliseconds.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};

pub mod author;
pub mod book;
pub mod borrow;
pub mod librarian;
pub mod user;

/// Milliseconds in one calendar day (no DST adjustment).
pub const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// Field-level invariant violation on a domain record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelValidationError {
    /// A required text field is empty or whitespace only.
    BlankField {
        entity: &'static str,
        field: &'static str,
    },
    /// `requested_return` is earlier than `start`.
    ReturnBeforeStart { start: i64, requested_return: i64 },
}

impl Display for ModelValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankField { entity, field } => {
                write!(f, "{entity}.{field} cannot be blank")
            }
            Self::ReturnBeforeStart {
                start,
                requested_return,
            } => write!(
                f,
                "requested return {requested_return} precedes borrow start {start}"
            ),
        }
    }
}

impl Error for ModelValidationError {}

pub(crate) fn require_text(
    entity: &'static str,
    field: &'static str,
    value: &str,
) -> Result<(), ModelValidationError> {
    if value.trim().is_empty() {
        return Err(ModelValidationError::BlankField { entity, field });
    }
    Ok(())
}

/// Current wall-clock time in epoch milliseconds.
///
/// A clock set before 1970 reads as the epoch.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| {
            i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX)
        })
}
