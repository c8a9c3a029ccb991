//! Integration tests for the bwsm CLI.
//!
//! These tests run the binary end-to-end using `assert_cmd`, against a
//! file-backed local store inside a temp directory, so no network access
//! is needed.

use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;

const ORG: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

/// Helper: a bwsm command with provider configuration in the environment.
fn bwsm(dir: &TempDir) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("bwsm").expect("binary should exist");
    cmd.current_dir(dir.path())
        .env("BW_API_URL", "https://api.example.test")
        .env("BW_IDENTITY_API_URL", "https://identity.example.test")
        .env("BW_ACCESS_TOKEN", "0.client.secret:key")
        .env("BW_ORGANIZATION_ID", ORG)
        .env("BWSM_LOCAL_STORE", "store.json")
        .env("BWSM_STATE_FILE", "state.json")
        .env_remove("BWSM_LOG");
    cmd
}

fn recorded_value(dir: &TempDir, name: &str) -> String {
    let state: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("state.json")).unwrap())
            .unwrap();
    state["resources"][name]["value"].as_str().unwrap().to_string()
}

#[test]
fn help_lists_subcommands() {
    let dir = TempDir::new().unwrap();
    bwsm(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("plan"))
        .stdout(predicate::str::contains("apply"))
        .stdout(predicate::str::contains("destroy"))
        .stdout(predicate::str::contains("import"))
        .stdout(predicate::str::contains("projects"));
}

#[test]
fn no_args_shows_usage() {
    let dir = TempDir::new().unwrap();
    bwsm(&dir)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn secret_lifecycle() {
    let dir = TempDir::new().unwrap();

    bwsm(&dir)
        .args(["plan", "db", "--key", "DB_PASSWORD"])
        .assert()
        .success()
        .stdout(predicate::str::contains("will be created"))
        .stdout(predicate::str::contains("(known after apply)"));

    bwsm(&dir)
        .args(["apply", "db", "--key", "DB_PASSWORD"])
        .assert()
        .success()
        .stdout(predicate::str::contains("value generated"));
    dir.child("state.json").assert(predicate::path::exists());
    dir.child("store.json").assert(predicate::path::exists());
    let value = recorded_value(&dir, "db");
    assert_eq!(value.len(), 64);

    bwsm(&dir)
        .args(["plan", "db", "--key", "DB_PASSWORD"])
        .assert()
        .success()
        .stdout(predicate::str::contains("no changes"));

    bwsm(&dir)
        .args(["show", "db"])
        .assert()
        .success()
        .stdout(predicate::str::contains("DB_PASSWORD"))
        .stdout(predicate::str::contains(value.as_str()).not());

    bwsm(&dir)
        .args(["show", "db", "--show-value"])
        .assert()
        .success()
        .stdout(predicate::str::contains(value.as_str()));

    bwsm(&dir)
        .args(["destroy", "db", "--force"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Destroyed"));

    bwsm(&dir)
        .args(["show", "db"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not managed"));
}

#[test]
fn destroy_of_secret_deleted_elsewhere_clears_state() {
    let dir = TempDir::new().unwrap();
    bwsm(&dir)
        .args(["apply", "db", "--key", "DB_PASSWORD"])
        .assert()
        .success();

    // An empty store file stands in for a deletion made outside bwsm.
    std::fs::write(dir.path().join("store.json"), "{}").unwrap();

    bwsm(&dir)
        .args(["destroy", "db", "--force"])
        .assert()
        .success()
        .stderr(predicate::str::contains("no longer exists"));

    bwsm(&dir)
        .args(["show", "db"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not managed"));
}

#[test]
fn changing_the_generator_regenerates_the_value() {
    let dir = TempDir::new().unwrap();
    bwsm(&dir)
        .args(["apply", "token", "--key", "TOKEN"])
        .assert()
        .success();
    let before = recorded_value(&dir, "token");

    bwsm(&dir)
        .args(["apply", "token", "--key", "TOKEN", "--min-uppercase", "4"])
        .assert()
        .success()
        .stdout(predicate::str::contains("min_uppercase"));
    let after = recorded_value(&dir, "token");

    assert_ne!(before, after);
    assert!(after.chars().filter(char::is_ascii_uppercase).count() >= 4);
}

#[test]
fn value_from_stdin_is_stored_verbatim() {
    let dir = TempDir::new().unwrap();
    bwsm(&dir)
        .args(["apply", "api", "--key", "API_KEY", "--value", "-"])
        .write_stdin("abc123\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("value set explicitly"));
    assert_eq!(recorded_value(&dir, "api"), "abc123");
}

#[test]
fn import_adopts_existing_secret() {
    let dir = TempDir::new().unwrap();
    bwsm(&dir)
        .args(["apply", "first", "--key", "SHARED", "--value", "-"])
        .write_stdin("kept")
        .assert()
        .success();

    let state: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("state.json")).unwrap())
            .unwrap();
    let id = state["resources"]["first"]["id"].as_str().unwrap().to_string();

    bwsm(&dir)
        .args(["import", "second", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 'SHARED'"));
    assert_eq!(recorded_value(&dir, "second"), "kept");

    bwsm(&dir)
        .args(["import", "second", &id])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already managed"));

    bwsm(&dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("first"))
        .stdout(predicate::str::contains("second"));
}

#[test]
fn import_rejects_malformed_id() {
    let dir = TempDir::new().unwrap();
    bwsm(&dir)
        .args(["import", "x", "not-a-uuid"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a valid UUID"));
}

#[test]
fn project_commands_round_trip() {
    let dir = TempDir::new().unwrap();
    bwsm(&dir)
        .args(["project", "create", "backend"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created project 'backend'"));

    bwsm(&dir)
        .arg("projects")
        .assert()
        .success()
        .stdout(predicate::str::contains("backend"));
}

#[test]
fn missing_configuration_names_every_variable() {
    let dir = TempDir::new().unwrap();
    bwsm(&dir)
        .env_remove("BW_ACCESS_TOKEN")
        .env("BW_ORGANIZATION_ID", "not-a-uuid")
        .arg("secrets")
        .assert()
        .failure()
        .stderr(predicate::str::contains("BW_ACCESS_TOKEN"))
        .stderr(predicate::str::contains("not-a-uuid"));
}

#[test]
fn generate_respects_length() {
    let dir = TempDir::new().unwrap();
    bwsm(&dir)
        .args(["generate", "--length", "20", "--special", "true"])
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^\S{20}\n$").unwrap());
}

#[test]
fn generate_rejects_impossible_length() {
    let dir = TempDir::new().unwrap();
    bwsm(&dir)
        .args(["generate", "--length", "3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("length (3)"));
}

#[test]
fn generate_rejects_oversized_length() {
    let dir = TempDir::new().unwrap();
    bwsm(&dir)
        .args(["generate", "--length", "4294967295"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("at most 128"));
}

#[test]
fn schema_is_json() {
    let dir = TempDir::new().unwrap();
    let output = bwsm(&dir).arg("schema").assert().success().get_output().stdout.clone();
    let schema: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(
        schema["resources"]["bitwarden-sm_secret"]["attributes"]["value"]["sensitive"],
        true
    );
}

#[test]
fn completions_for_bash() {
    let dir = TempDir::new().unwrap();
    bwsm(&dir)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("bwsm"));
}
