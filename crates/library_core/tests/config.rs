use library_core::db::migrations::{current_version, latest_version};
use library_core::{open_configured, ConfigError, DatabaseConfig, DatabaseLocation, LibraryConfig};
use std::path::PathBuf;

#[test]
fn empty_document_yields_defaults() {
    let config: LibraryConfig = serde_json::from_str("{}").unwrap();

    assert_eq!(config, LibraryConfig::default());
    assert_eq!(config.database.location, DatabaseLocation::Memory);
    assert!(config.validate().is_ok());
}

#[test]
fn file_location_is_tagged_by_kind() {
    let config: LibraryConfig = serde_json::from_str(
        r#"{
            "database": {
                "location": { "kind": "file", "path": "/var/lib/library/library.sqlite3" },
                "busy_timeout_ms": 250
            },
            "logging": { "level": "debug" }
        }"#,
    )
    .unwrap();

    assert_eq!(
        config.database.location,
        DatabaseLocation::File {
            path: PathBuf::from("/var/lib/library/library.sqlite3")
        }
    );
    assert_eq!(config.database.busy_timeout_ms, 250);
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.log_dir, None);
}

#[test]
fn unknown_location_kind_is_a_parse_error() {
    let parsed = serde_json::from_str::<DatabaseConfig>(r#"{ "location": { "kind": "cloud" } }"#);
    assert!(parsed.is_err());
}

#[test]
fn validate_reports_first_rejected_value() {
    let mut config = LibraryConfig::default();
    config.database.busy_timeout_ms = 0;
    config.logging.level = "loud".to_string();
    assert_eq!(config.validate(), Err(ConfigError::ZeroBusyTimeout));

    config.database.busy_timeout_ms = 1;
    assert_eq!(
        config.validate(),
        Err(ConfigError::UnsupportedLogLevel("loud".to_string()))
    );
}

#[test]
fn configured_memory_database_is_migrated() {
    let conn = open_configured(&DatabaseConfig::default()).unwrap();
    assert_eq!(current_version(&conn).unwrap(), latest_version());
}

#[test]
fn configured_file_database_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let config = DatabaseConfig {
        location: DatabaseLocation::File {
            path: dir.path().join("library.sqlite3"),
        },
        ..DatabaseConfig::default()
    };

    let first = open_configured(&config).unwrap();
    let version = current_version(&first).unwrap();
    drop(first);

    let reopened = open_configured(&config).unwrap();
    assert_eq!(current_version(&reopened).unwrap(), version);
}
