//! Persistence layer for the library-management application.
//! Repositories for authors, books, users, librarians and borrows over SQLite.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;

pub use config::{ConfigError, DatabaseConfig, DatabaseLocation, LibraryConfig, LoggingConfig};
pub use db::{open_configured, open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::author::{Author, AuthorId};
pub use model::book::{Book, BookId};
pub use model::borrow::{Borrow, BorrowId};
pub use model::librarian::{Librarian, LibrarianId};
pub use model::user::{User, UserId};
pub use model::{now_epoch_ms, ModelValidationError, DAY_MS};
pub use repo::author_repo::{AuthorRepository, SqliteAuthorRepository};
pub use repo::book_repo::{BookRepository, SqliteBookRepository};
pub use repo::borrow_repo::{BorrowRepository, SqliteBorrowRepository};
pub use repo::librarian_repo::{LibrarianRepository, SqliteLibrarianRepository};
pub use repo::user_repo::{SqliteUserRepository, UserRepository};
pub use repo::{CrudRepository, RepoError, RepoResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
