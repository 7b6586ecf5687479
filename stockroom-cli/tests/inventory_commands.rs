use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use predicates::str::contains;
use serde_json::Value;
use tempfile::TempDir;

fn stockroom_cmd(home: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("stockroom"));
    cmd.env("HOME", home)
        .env("USERPROFILE", home)
        .env("RUST_LOG", "warn");
    cmd
}

fn run_ok(home: &Path, args: &[&str]) {
    stockroom_cmd(home).args(args).assert().success();
}

fn init(home: &TempDir) {
    run_ok(home.path(), &["init"]);
}

fn list_json(home: &Path) -> Value {
    let output = stockroom_cmd(home)
        .args(["list", "--json"])
        .output()
        .expect("run stockroom list --json");
    assert!(
        output.status.success(),
        "list failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("list output is JSON")
}

#[test]
fn init_creates_config_and_database() {
    let home = TempDir::new().expect("home");
    stockroom_cmd(home.path())
        .arg("init")
        .assert()
        .success()
        .stdout(contains("Initialized stockroom"));

    assert!(home.path().join(".stockroom/config.yaml").exists());
    assert!(home.path().join(".stockroom/stockroom.db").exists());
}

#[test]
fn commands_before_init_point_at_init() {
    let home = TempDir::new().expect("home");
    stockroom_cmd(home.path())
        .arg("list")
        .assert()
        .failure()
        .stderr(contains("stockroom init"));
}

#[test]
fn add_group_and_record_then_list() {
    let home = TempDir::new().expect("home");
    init(&home);
    run_ok(home.path(), &["group", "add", "Tools", "-d", "hand tools"]);
    run_ok(home.path(), &["record", "add", "Tools", "Hammer", "--quantity", "5"]);

    stockroom_cmd(home.path())
        .arg("list")
        .assert()
        .success()
        .stdout(contains("Tools"))
        .stdout(contains("000005   Hammer"));

    let json = list_json(home.path());
    assert_eq!(json[0]["name"], "Tools");
    assert_eq!(json[0]["records"][0]["quantity"], 5);
    assert!(json[0]["records"][0]["id"].is_i64());
}

#[test]
fn dry_run_previews_and_writes_nothing() {
    let home = TempDir::new().expect("home");
    init(&home);

    stockroom_cmd(home.path())
        .args(["group", "add", "Paint", "--dry-run"])
        .assert()
        .success()
        .stdout(contains("[dry-run]"))
        .stdout(contains("groups.insert"))
        .stdout(contains("(new) Paint"));

    assert_eq!(list_json(home.path()), serde_json::json!([]));
}

#[test]
fn blank_names_are_rejected() {
    let home = TempDir::new().expect("home");
    init(&home);
    stockroom_cmd(home.path())
        .args(["group", "add", "   "])
        .assert()
        .failure()
        .stderr(contains("must not be blank"));
    assert_eq!(list_json(home.path()), serde_json::json!([]));
}

#[test]
fn duplicate_group_names_need_an_id() {
    let home = TempDir::new().expect("home");
    init(&home);
    run_ok(home.path(), &["group", "add", "Bin"]);
    run_ok(home.path(), &["group", "add", "Bin"]);

    stockroom_cmd(home.path())
        .args(["record", "add", "Bin", "Screw", "-q", "100"])
        .assert()
        .failure()
        .stderr(contains("2 groups are named 'Bin'"));

    let json = list_json(home.path());
    let second = json[1]["id"].as_i64().expect("id").to_string();
    run_ok(home.path(), &["record", "add", &second, "Screw", "-q", "100"]);
    let json = list_json(home.path());
    assert_eq!(json[1]["records"][0]["name"], "Screw");
}

#[test]
fn edit_moves_record_between_groups() {
    let home = TempDir::new().expect("home");
    init(&home);
    run_ok(home.path(), &["group", "add", "Shed"]);
    run_ok(home.path(), &["group", "add", "Garage"]);
    run_ok(home.path(), &["record", "add", "Shed", "Saw", "-q", "1"]);

    let json = list_json(home.path());
    let id = json[0]["records"][0]["id"].as_i64().expect("id").to_string();
    run_ok(
        home.path(),
        &["record", "edit", &id, "--group", "Garage", "--quantity", "2"],
    );

    let json = list_json(home.path());
    assert_eq!(json[0]["records"], serde_json::json!([]));
    assert_eq!(json[1]["records"][0]["name"], "Saw");
    assert_eq!(json[1]["records"][0]["quantity"], 2);
    assert_eq!(json[1]["records"][0]["id"].as_i64().map(|i| i.to_string()), Some(id));
}

#[test]
fn deleting_a_group_removes_its_records() {
    let home = TempDir::new().expect("home");
    init(&home);
    run_ok(home.path(), &["group", "add", "Garden"]);
    run_ok(home.path(), &["record", "add", "Garden", "Rake", "-q", "1"]);
    let id = list_json(home.path())[0]["records"][0]["id"]
        .as_i64()
        .expect("id")
        .to_string();

    stockroom_cmd(home.path())
        .args(["group", "delete", "Garden", "--dry-run"])
        .assert()
        .success()
        .stdout(contains("groups.delete"))
        .stdout(contains("records.delete"));

    run_ok(home.path(), &["group", "delete", "Garden"]);
    assert_eq!(list_json(home.path()), serde_json::json!([]));
    stockroom_cmd(home.path())
        .args(["show", &id])
        .assert()
        .failure()
        .stderr(contains("no record with id").and(contains(id.as_str())));
}
