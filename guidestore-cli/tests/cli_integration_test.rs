//! Integration tests for the guidestore binary

use serde_json::Value;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Helper to run guidestore against an isolated config root
fn run_guidestore(config_root: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_guidestore"))
        .arg("--config-root")
        .arg(config_root)
        .args(args)
        .env_remove("GUIDESTORE_HOME")
        .output()
        .expect("Failed to run guidestore")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

#[test]
fn test_import_json_counts_and_show() {
    let temp_dir = TempDir::new().unwrap();
    let config_root = temp_dir.path().join("config");
    let docs = temp_dir.path().join("docs");
    fs::create_dir_all(&docs).unwrap();
    fs::write(
        docs.join("01 - API Overview.md"),
        "# API Overview\n\nShort description text.",
    )
    .unwrap();
    fs::write(docs.join("notes.txt"), "ignored").unwrap();

    let output = run_guidestore(&config_root, &["import", docs.to_str().unwrap(), "--json"]);
    assert!(
        output.status.success(),
        "import failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let counts: Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(counts["imported"], 1);
    assert_eq!(counts["skipped"], 0);
    assert_eq!(counts["failed"], 0);

    let again = run_guidestore(&config_root, &["import", docs.to_str().unwrap(), "--json"]);
    let counts: Value = serde_json::from_str(&stdout(&again)).unwrap();
    assert_eq!(counts["skipped"], 1);

    let show = run_guidestore(&config_root, &["show", "custom", "api_overview"]);
    assert!(show.status.success());
    assert!(stdout(&show).starts_with("# API Overview\n"));

    let read = run_guidestore(&config_root, &["read", "custom://guides"]);
    assert!(stdout(&read).contains("`custom://guides/api_overview`"));
}

#[test]
fn test_unknown_namespace_fails_with_valid_list() {
    let temp_dir = TempDir::new().unwrap();
    let output = run_guidestore(temp_dir.path(), &["index", "django"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unknown namespace 'django'"));
    assert!(stderr.contains("rails, turbo, stimulus, kamal, custom"));
}

#[test]
fn test_namespaces_table() {
    let temp_dir = TempDir::new().unwrap();
    let output = run_guidestore(temp_dir.path(), &["namespaces"]);

    assert!(output.status.success());
    let table = stdout(&output);
    for name in ["rails", "turbo", "stimulus", "kamal", "custom"] {
        assert!(table.contains(name), "{name} missing from table");
    }
    assert!(table.contains("local import"));
}

#[test]
fn test_import_into_remote_namespace_fails() {
    let temp_dir = TempDir::new().unwrap();
    let source = temp_dir.path().join("guide.md");
    fs::write(&source, "# Guide").unwrap();

    let output = run_guidestore(
        temp_dir.path(),
        &["import", source.to_str().unwrap(), "--namespace", "rails"],
    );
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("does not accept local imports"));
}
