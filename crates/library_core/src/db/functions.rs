//! Application-defined SQL functions.
//!
//! SQLite's built-in `LOWER` only folds ASCII, so name/title searches use
//! `fold_case`, which lowercases with full Unicode rules and matches the
//! folding applied to search terms on the Rust side.

use rusqlite::functions::FunctionFlags;
use rusqlite::Connection;

/// SQL name of the Unicode lowercase function.
pub(crate) const FOLD_CASE_FN: &str = "fold_case";

/// Registers all application SQL functions on `conn`.
///
/// Safe to call more than once; later registrations replace earlier ones.
pub fn register_functions(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        FOLD_CASE_FN,
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let value = ctx.get::<Option<String>>(0)?;
            Ok(value.map(|text| fold_case(&text)))
        },
    )
}

/// Case folding shared by SQL and Rust callers.
pub(crate) fn fold_case(value: &str) -> String {
    value.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::register_functions;
    use rusqlite::Connection;

    #[test]
    fn fold_case_lowercases_non_ascii_text() {
        let conn = Connection::open_in_memory().unwrap();
        register_functions(&conn).unwrap();

        let folded: String = conn
            .query_row("SELECT fold_case('ÉMILE Zola');", [], |row| row.get(0))
            .unwrap();
        assert_eq!(folded, "émile zola");
    }

    #[test]
    fn fold_case_passes_null_through() {
        let conn = Connection::open_in_memory().unwrap();
        register_functions(&conn).unwrap();

        let folded: Option<String> = conn
            .query_row("SELECT fold_case(NULL);", [], |row| row.get(0))
            .unwrap();
        assert_eq!(folded, None);
    }
}
