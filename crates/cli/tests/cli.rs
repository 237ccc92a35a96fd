//! End-to-end tests of the `stackforge` binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

fn demo(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../demos")
        .join(name)
}

fn stackforge() -> Command {
    let mut cmd = Command::cargo_bin("stackforge").unwrap();
    cmd.env_remove("RUST_LOG")
        .env_remove("STACKFORGE_SEED_COUNT")
        .arg("--no-color");
    cmd
}

const BROKEN: &str = r#"{
    "project": { "name": "broken" },
    "models": [
        { "name": "Post", "fields": [{ "name": "title", "type": "string" }] }
    ],
    "relationships": [
        { "type": "one-to-many", "sourceModel": "Post", "targetModel": "Ghost" }
    ]
}"#;

#[test]
fn test_help_lists_commands() {
    stackforge()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("lower"))
        .stdout(predicate::str::contains("validate"))
        .stdout(predicate::str::contains("info"));
}

#[test]
fn test_lower_to_stdout() {
    let output = stackforge()
        .args(["lower", "-o", "-", "--compact"])
        .arg(demo("blog.json"))
        .output()
        .unwrap();
    assert!(output.status.success());

    let ir: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(ir["schemaVersion"], 1);
    assert_eq!(ir["project"]["name"], "blog");
    assert!(ir["generatedAt"].is_string());

    let models: Vec<&str> = ir["models"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["name"].as_str().unwrap())
        .collect();
    assert_eq!(models, vec!["User", "Post", "Tag", "Comment", "UserFollowTag"]);
    assert!(ir["seedPlan"].is_object());
}

#[test]
fn test_lower_writes_default_path() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("shop.toml");
    std::fs::copy(demo("shop.toml"), &config).unwrap();

    stackforge()
        .arg("lower")
        .arg(&config)
        .assert()
        .success()
        .stderr(predicate::str::contains("Lowering Complete"));

    let written = std::fs::read_to_string(dir.path().join("shop.ir.json")).unwrap();
    let ir: serde_json::Value = serde_json::from_str(&written).unwrap();
    assert_eq!(ir["database"]["engine"], "postgresql");
}

#[test]
fn test_lower_rejected_exits_with_one() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("broken.json");
    std::fs::write(&config, BROKEN).unwrap();

    stackforge()
        .arg("lower")
        .arg(&config)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unknown-model-reference"))
        .stderr(predicate::str::contains("Ghost"));
    assert!(!dir.path().join("broken.ir.json").exists());
}

#[test]
fn test_lower_missing_file_exits_with_two() {
    stackforge()
        .args(["lower", "does-not-exist.json"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Configuration not found"));
}

#[test]
fn test_seed_flags() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("notes.json");
    std::fs::write(
        &config,
        r#"{
            "project": { "name": "notes" },
            "models": [{ "name": "Note", "fields": [{ "name": "body", "type": "string" }] }]
        }"#,
    )
    .unwrap();

    let output = stackforge()
        .args(["lower", "-o", "-", "--seed", "--seed-count", "7"])
        .arg(&config)
        .output()
        .unwrap();
    let ir: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(ir["seedPlan"]["plans"][0]["count"], 7);
}

#[test]
fn test_validate_directory() {
    let dir = TempDir::new().unwrap();
    std::fs::copy(demo("blog.json"), dir.path().join("blog.json")).unwrap();
    std::fs::write(dir.path().join("broken.json"), BROKEN).unwrap();

    stackforge()
        .arg("validate")
        .arg(dir.path())
        .assert()
        .code(1)
        .stdout(predicate::str::contains("✓"))
        .stdout(predicate::str::contains("✗"))
        .stdout(predicate::str::contains("2 checked, 1 failed"));
}

#[test]
fn test_validate_json_report() {
    let output = stackforge()
        .args(["validate", "--json"])
        .arg(demo("blog.json"))
        .output()
        .unwrap();
    assert!(output.status.success());

    let reports: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(reports[0]["ok"], true);
    let codes: Vec<&str> = reports[0]["diagnostics"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["code"].as_str().unwrap())
        .collect();
    assert!(codes.contains(&"naming-violation"));
}

#[test]
fn test_info() {
    stackforge()
        .arg("info")
        .arg(demo("shop.toml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Payment"))
        .stdout(predicate::str::contains("Seeding order"))
        .stdout(predicate::str::contains("Customer → Product → Payment → Order"));
}
