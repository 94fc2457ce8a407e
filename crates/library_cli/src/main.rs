//! CLI smoke entry point.
//!
//! Opens a throwaway in-memory store and reports crate and schema versions,
//! verifying `library_core` links and migrates independently of any host app.

use library_core::db::migrations::current_version;
use library_core::{init_logging, open_db_in_memory, LoggingConfig};
use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(err) = init_logging(&LoggingConfig::default()) {
        eprintln!("library_cli logging error={err}");
        return ExitCode::FAILURE;
    }

    match open_db_in_memory().and_then(|conn| current_version(&conn)) {
        Ok(schema_version) => {
            println!("library_core version={}", library_core::core_version());
            println!("library_core schema_version={schema_version}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("event=cli_smoke module=cli status=error error={err}");
            eprintln!("library_cli error={err}");
            ExitCode::FAILURE
        }
    }
}
