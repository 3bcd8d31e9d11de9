use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn csvarena_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("csvarena"))
}

fn fixture(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

const PEOPLE: &str = "name,age,active\nann,31,true\nbob,,FALSE\ncid,45,true\n";

// ============================================================================
// PROJECT INITIALIZATION TESTS
// ============================================================================

#[test]
fn test_init_creates_config_file() {
    let temp_dir = TempDir::new().unwrap();

    csvarena_cmd()
        .current_dir(&temp_dir)
        .arg("--init")
        .assert()
        .success()
        .stdout(predicate::str::contains("csvarena.yaml"));

    let config = fs::read_to_string(temp_dir.path().join("csvarena.yaml")).unwrap();
    assert!(config.contains("raggedRows"));
    assert!(config.contains("regionCapacity"));
}

#[test]
fn test_init_refuses_to_overwrite() {
    let temp_dir = TempDir::new().unwrap();
    fixture(&temp_dir, "csvarena.yaml", "raggedRows: reject\n");

    csvarena_cmd()
        .current_dir(&temp_dir)
        .arg("--init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

// ============================================================================
// OUTPUT TESTS
// ============================================================================

#[test]
fn test_no_input_file() {
    let temp_dir = TempDir::new().unwrap();
    csvarena_cmd()
        .current_dir(&temp_dir)
        .assert()
        .failure()
        .stderr(predicate::str::contains("No input file"));
}

#[test]
fn test_prints_table() {
    let temp_dir = TempDir::new().unwrap();
    let input = fixture(&temp_dir, "people.csv", PEOPLE);

    csvarena_cmd()
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("name (String)"))
        .stdout(predicate::str::contains("age (Integer)"))
        .stdout(predicate::str::contains("cid"));
}

#[test]
fn test_schema_json() {
    let temp_dir = TempDir::new().unwrap();
    let input = fixture(&temp_dir, "people.csv", PEOPLE);

    let output = csvarena_cmd()
        .arg(&input)
        .arg("--schema")
        .arg("--json")
        .output()
        .unwrap();
    assert!(output.status.success());

    let schema: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(schema["rows"], 3);
    assert_eq!(schema["columns"][1]["name"], "age");
    assert_eq!(schema["columns"][2]["type"], "Boolean");
}

#[test]
fn test_stats_text() {
    let temp_dir = TempDir::new().unwrap();
    let input = fixture(&temp_dir, "people.csv", PEOPLE);

    csvarena_cmd()
        .arg(&input)
        .args(["--stats", "age"])
        .assert()
        .success()
        .stdout(predicate::str::contains("mean:    38.0000"))
        .stdout(predicate::str::contains("missing: 1"));
}

#[test]
fn test_stats_unknown_column() {
    let temp_dir = TempDir::new().unwrap();
    let input = fixture(&temp_dir, "people.csv", PEOPLE);

    csvarena_cmd()
        .arg(&input)
        .args(["--stats", "height"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("column not found: height"));
}

#[test]
fn test_row_json() {
    let temp_dir = TempDir::new().unwrap();
    let input = fixture(&temp_dir, "people.csv", PEOPLE);

    let output = csvarena_cmd()
        .arg(&input)
        .args(["--row", "1", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let row: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(row["name"], "bob");
    assert!(row["age"].is_null());
    assert_eq!(row["active"], false);
}

#[test]
fn test_row_out_of_bounds() {
    let temp_dir = TempDir::new().unwrap();
    let input = fixture(&temp_dir, "people.csv", PEOPLE);

    csvarena_cmd()
        .arg(&input)
        .args(["--row", "10"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("out of bounds"));
}

#[test]
fn test_drop_missing_and_output() {
    let temp_dir = TempDir::new().unwrap();
    let input = fixture(&temp_dir, "people.csv", PEOPLE);
    let output = temp_dir.path().join("clean.csv");

    csvarena_cmd()
        .arg(&input)
        .arg("--drop-missing")
        .arg("--output")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 2 rows"));

    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "name,age,active\nann,31,true\ncid,45,true\n"
    );
}

// ============================================================================
// CONFIGURATION TESTS
// ============================================================================

#[test]
fn test_strict_flag_rejects_ragged_rows() {
    let temp_dir = TempDir::new().unwrap();
    let input = fixture(&temp_dir, "ragged.csv", "a,b\n1,2\n3\n");

    csvarena_cmd()
        .arg(&input)
        .arg("--strict")
        .assert()
        .failure()
        .stderr(predicate::str::contains("line 3: expected 2 fields, found 1"));
}

#[test]
fn test_ragged_rows_padded_by_default() {
    let temp_dir = TempDir::new().unwrap();
    let input = fixture(&temp_dir, "ragged.csv", "a,b\n1,2\n3\n");

    csvarena_cmd()
        .arg(&input)
        .assert()
        .success()
        .stderr(predicate::str::contains("missing cells left empty"));
}

#[test]
fn test_config_file_in_working_directory() {
    let temp_dir = TempDir::new().unwrap();
    fixture(&temp_dir, "csvarena.yaml", "raggedRows: reject\n");
    fixture(&temp_dir, "ragged.csv", "a,b\n1\n");

    csvarena_cmd()
        .current_dir(&temp_dir)
        .arg("ragged.csv")
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected 2 fields"));
}

#[test]
fn test_explicit_json_config() {
    let temp_dir = TempDir::new().unwrap();
    let config = fixture(&temp_dir, "settings.json", r#"{"regionCapacity": 64}"#);
    let input = fixture(&temp_dir, "people.csv", PEOPLE);

    csvarena_cmd()
        .arg(&input)
        .arg("--config")
        .arg(&config)
        .arg("--schema")
        .assert()
        .success()
        .stdout(predicate::str::contains("3 rows"));
}

#[test]
fn test_invalid_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let config = fixture(&temp_dir, "bad.yaml", "raggedRows: maybe\n");
    let input = fixture(&temp_dir, "people.csv", PEOPLE);

    csvarena_cmd()
        .arg(&input)
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load config file"));
}

#[test]
fn test_zero_region_capacity_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let input = fixture(&temp_dir, "people.csv", PEOPLE);

    csvarena_cmd()
        .arg(&input)
        .args(["--region-capacity", "0"])
        .assert()
        .failure();
}

#[test]
fn test_empty_file_fails() {
    let temp_dir = TempDir::new().unwrap();
    let input = fixture(&temp_dir, "empty.csv", "");

    csvarena_cmd()
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("CSV empty"));
}
