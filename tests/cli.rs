use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

#[test]
fn schema_lists_fields_by_category() {
    let mut cmd = cargo_bin_cmd!("formgen");
    cmd.arg("schema");

    let output_pred = predicate::str::contains("cat1")
        .and(predicate::str::contains("key5"))
        .and(predicate::str::contains("float_matrix"))
        .and(predicate::str::contains("required"));

    cmd.assert().success().stdout(output_pred);
}

#[test]
fn generate_then_load_shows_form_text() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("form.json");

    let mut cmd = cargo_bin_cmd!("formgen");
    cmd.arg("generate")
        .arg(&path)
        .args(["--set", "key1=12"])
        .args(["--set", "key6=1, 2, ,4"])
        .args(["--set", "key5=1,2\n\n3,4"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Wrote 3 field(s)"));

    let written = fs::read_to_string(&path).unwrap();
    assert!(written.contains("\"key6\": [\n    1,\n    2,\n    null,\n    4\n  ]"));

    let mut cmd = cargo_bin_cmd!("formgen");
    cmd.arg("load").arg(&path);
    cmd.assert().success().stdout(
        predicate::str::contains("key1 (integer): 12")
            .and(predicate::str::contains("key6 (int_vector): 1, 2, , 4"))
            .and(predicate::str::contains("    1.0, 2.0\n    3.0, 4.0")),
    );
}

#[test]
fn invalid_value_is_reported_but_not_fatal() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("form.json");

    let mut cmd = cargo_bin_cmd!("formgen");
    cmd.arg("generate")
        .arg(&path)
        .args(["--set", "key1=3"])
        .args(["--set", "key2=abc"]);
    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Skipped 'key2'"));

    assert!(!fs::read_to_string(&path).unwrap().contains("key2"));
}

#[test]
fn annotated_generate_requires_required_fields() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("form.json");

    let mut cmd = cargo_bin_cmd!("formgen");
    cmd.arg("--annotated")
        .arg("generate")
        .arg(&path)
        .args(["--set", "key2=1.5"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("missing required fields: key1"));

    assert!(!path.exists());
}

#[test]
fn load_rejects_malformed_documents() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "{ not json").unwrap();

    let mut cmd = cargo_bin_cmd!("formgen");
    cmd.arg("load").arg(&path);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("malformed document"));
}

#[test]
fn load_can_edit_and_rewrite() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in.json");
    let output = dir.path().join("out.json");
    fs::write(&input, r#"{"key1": 1, "key8": ["a", "b"]}"#).unwrap();

    let mut cmd = cargo_bin_cmd!("formgen");
    cmd.arg("load")
        .arg(&input)
        .args(["--set", "key1=2"])
        .arg("--output")
        .arg(&output);
    cmd.assert().success();

    let rewritten: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(rewritten, serde_json::json!({"key1": 2, "key8": ["a", "b"]}));
}

#[test]
fn unknown_field_is_rejected() {
    let dir = TempDir::new().unwrap();
    let mut cmd = cargo_bin_cmd!("formgen");
    cmd.arg("generate")
        .arg(dir.path().join("x.json"))
        .args(["--set", "nope=1"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("unknown field 'nope'"));
}
