//! Config error-message, defaulting, and init integration tests.

use std::fs;
use std::path::PathBuf;

use rstest::rstest;
use stockroom_core::{config, ConfigError};
use tempfile::TempDir;

#[test]
fn init_writes_default_database_path() {
    let home = TempDir::new().expect("tempdir");
    let cfg = config::init_at(home.path(), None).expect("init");
    assert_eq!(cfg.database, home.path().join(".stockroom").join("stockroom.db"));
    assert_eq!(cfg.log_filter, "info");
    assert!(config::config_path_at(home.path()).exists());
}

#[test]
fn init_is_idempotent() {
    let home = TempDir::new().expect("tempdir");
    let first = config::init_at(home.path(), Some(PathBuf::from("/tmp/a.db"))).expect("init");
    let second = config::init_at(home.path(), Some(PathBuf::from("/tmp/b.db"))).expect("init");
    assert_eq!(first, second, "second init must not overwrite the first");
}

#[cfg(unix)]
#[test]
fn config_file_is_private() {
    use std::os::unix::fs::PermissionsExt;
    let home = TempDir::new().expect("tempdir");
    config::init_at(home.path(), None).expect("init");
    let mode = fs::metadata(config::config_path_at(home.path()))
        .expect("metadata")
        .permissions()
        .mode()
        & 0o777;
    assert_eq!(mode, 0o600);
}

#[rstest]
#[case::comment_lines("# connection settings\ndatabase: /data/inv.db\n", "/data/inv.db", "info")]
#[case::explicit_filter("database: inv.db\nlog_filter: stockroom_sync=debug\n", "inv.db", "stockroom_sync=debug")]
fn load_parses_yaml(#[case] yaml: &str, #[case] database: &str, #[case] filter: &str) {
    let home = TempDir::new().expect("tempdir");
    let dir = config::root_at(home.path());
    fs::create_dir_all(&dir).expect("mkdir");
    fs::write(config::config_path_at(home.path()), yaml).expect("write");

    let cfg = config::load_at(home.path()).expect("load");
    assert_eq!(cfg.database, PathBuf::from(database));
    assert_eq!(cfg.log_filter, filter);
}

#[test]
fn load_corrupt_yaml_returns_parse_error_with_path() {
    let home = TempDir::new().expect("tempdir");
    fs::create_dir_all(config::root_at(home.path())).expect("mkdir");
    fs::write(config::config_path_at(home.path()), b"- just\n- a list\n").expect("write");

    let err = config::load_at(home.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }), "got: {err}");
    assert!(err.to_string().contains("config.yaml"));
}
