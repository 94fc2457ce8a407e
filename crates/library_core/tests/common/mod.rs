//! Fixture builders shared by repository integration tests.
#![allow(dead_code)]

use library_core::{
    Author, AuthorId, Book, BookId, Borrow, CrudRepository, Librarian, SqliteAuthorRepository,
    SqliteBookRepository, SqliteBorrowRepository, SqliteLibrarianRepository,
    SqliteUserRepository, User, DAY_MS,
};
use rusqlite::Connection;

/// Fixed reference instant (2023-11-14T22:13:20Z) for clock-parameterized queries.
pub const NOW: i64 = 1_700_000_000_000;

pub fn days(count: i64) -> i64 {
    count * DAY_MS
}

pub fn save_author(conn: &Connection, full_name: &str) -> Author {
    SqliteAuthorRepository::try_new(conn)
        .unwrap()
        .save(Author::new(full_name))
        .unwrap()
}

pub fn save_book(conn: &Connection, title: &str, authors: &[AuthorId]) -> Book {
    let mut book = Book::new(title);
    book.author_ids.extend(authors.iter().copied());
    SqliteBookRepository::try_new(conn)
        .unwrap()
        .save(book)
        .unwrap()
}

pub fn save_user(conn: &Connection, first_name: &str, last_name: &str) -> User {
    SqliteUserRepository::try_new(conn)
        .unwrap()
        .save(User::new(first_name, last_name))
        .unwrap()
}

pub fn save_librarian(conn: &Connection, code: &str) -> Librarian {
    SqliteLibrarianRepository::try_new(conn)
        .unwrap()
        .save(Librarian::new(code, "Jo", format!("Staff {code}")))
        .unwrap()
}

/// Saves an unfinished borrow starting at `start` and due at `requested_return`.
pub fn save_borrow(
    conn: &Connection,
    user: &User,
    librarian: &Librarian,
    books: &[BookId],
    start: i64,
    requested_return: i64,
) -> Borrow {
    let mut borrow = Borrow::starting_at(
        user.id.unwrap(),
        librarian.id.clone(),
        books.iter().copied(),
        start,
    );
    borrow.requested_return = requested_return;
    SqliteBorrowRepository::try_new(conn)
        .unwrap()
        .save(borrow)
        .unwrap()
}

pub fn book_ids(books: &[&Book]) -> Vec<BookId> {
    books.iter().map(|book| book.id.unwrap()).collect()
}

pub fn titles(books: &[Book]) -> Vec<&str> {
    books.iter().map(|book| book.title.as_str()).collect()
}
