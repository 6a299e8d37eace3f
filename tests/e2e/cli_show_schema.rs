//! End-to-end tests for `gazette-digest show` and `gazette-digest schema`.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

fn workspace_root() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .and_then(Path::parent)
        .map(Path::to_path_buf)
        .unwrap_or_else(|| manifest_dir.to_path_buf())
}

fn fixture(name: &str) -> PathBuf {
    workspace_root()
        .join("tests")
        .join("fixtures")
        .join("documents")
        .join(name)
}

fn run_cli(args: &[&str]) -> std::io::Result<Output> {
    Command::new(env!("CARGO_BIN_EXE_gazette-digest"))
        .env_remove("RUST_LOG")
        .args(args)
        .output()
}

fn run_cli_with_stdin(args: &[&str], input: &str) -> std::io::Result<Output> {
    let mut child = Command::new(env!("CARGO_BIN_EXE_gazette-digest"))
        .env_remove("RUST_LOG")
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;
    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(input.as_bytes())?;
    }
    child.wait_with_output()
}

#[test]
fn show_json_matches_between_runs() -> Result<(), Box<dyn std::error::Error>> {
    let path = fixture("all_parameters_example.yaml");
    let path = path.to_str().ok_or("fixture path should be utf-8")?;
    let first = run_cli(&["--output", "json", "show", path])?;
    let second = run_cli(&["--output", "json", "show", path])?;
    assert!(first.status.success());
    assert_eq!(first.stdout, second.stdout);

    let value: serde_json::Value = serde_json::from_slice(&first.stdout)?;
    assert_eq!(value["id"], "all_parameters_example");
    assert_eq!(value["searches"][0]["dateWindow"], "MONTH");
    assert_eq!(value["report"]["attachCsv"], true);
    Ok(())
}

#[test]
fn show_yaml_round_trips_through_the_resolver() -> Result<(), Box<dyn std::error::Error>> {
    let path = fixture("basic_example.yaml");
    let path = path.to_str().ok_or("fixture path should be utf-8")?;
    let output = run_cli(&["show", path])?;
    assert!(output.status.success());

    let rendered: serde_json::Value = serde_yaml_ng::from_slice(&output.stdout)?;
    assert_eq!(rendered["id"], "basic_example");
    assert_eq!(rendered["tags"], serde_json::json!(["dou", "generated_dag"]));
    Ok(())
}

#[test]
fn show_reads_stdin_with_identity() -> Result<(), Box<dyn std::error::Error>> {
    let document = r#"{"search": {"terms": ["pregão"]}, "report": {"emails": "a@b.org", "subject": "S"}}"#;
    let output = run_cli_with_stdin(
        &["--output", "json", "show", "--identity", "pregao", "--format", "json"],
        document,
    )?;
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let value: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(value["id"], "pregao");
    assert_eq!(value["description"], "Gazette digest pregao");
    assert_eq!(value["report"]["emails"], serde_json::json!(["a@b.org"]));
    Ok(())
}

#[test]
fn show_invalid_document_prints_error_payload() -> Result<(), Box<dyn std::error::Error>> {
    let path = fixture("invalid_identity_mismatch.yaml");
    let path = path.to_str().ok_or("fixture path should be utf-8")?;
    let output = run_cli(&["--json", "show", path])?;
    assert_eq!(output.status.code(), Some(2));

    let value: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(value["status"], "error");
    assert_eq!(value["error"]["code"], "ERR_CONFIG_VALIDATION_FAILED");
    assert_eq!(value["error"]["issues"][0]["kind"], "IdentityMismatch");
    Ok(())
}

#[test]
fn show_missing_file_with_identity_prints_error_payload() -> Result<(), Box<dyn std::error::Error>> {
    let path = fixture("no_such_document.yaml");
    let path = path.to_str().ok_or("fixture path should be utf-8")?;
    let output = run_cli(&["--json", "show", path, "--identity", "x"])?;
    assert_eq!(output.status.code(), Some(3));

    let value: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(value["status"], "error");
    assert_eq!(value["error"]["code"], "ERR_CONFIG_DOCUMENT_NOT_FOUND");
    Ok(())
}

#[test]
fn schema_is_valid_json() -> Result<(), Box<dyn std::error::Error>> {
    let output = run_cli(&["schema"])?;
    assert!(output.status.success());

    let schema: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(schema["title"], "CanonicalConfig");
    Ok(())
}
