//! End-to-end tests for `gazette-digest check`.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn workspace_root() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .and_then(Path::parent)
        .map(Path::to_path_buf)
        .unwrap_or_else(|| manifest_dir.to_path_buf())
}

fn fixture(name: &str) -> String {
    workspace_root()
        .join("tests")
        .join("fixtures")
        .join("documents")
        .join(name)
        .display()
        .to_string()
}

fn check(args: &[&str], documents: &[&str]) -> std::io::Result<Output> {
    let paths: Vec<String> = documents.iter().map(|name| fixture(name)).collect();
    Command::new(env!("CARGO_BIN_EXE_gazette-digest"))
        .env_remove("RUST_LOG")
        .args(args)
        .arg("check")
        .args(&paths)
        .output()
}

#[test]
fn every_valid_fixture_passes() -> Result<(), Box<dyn std::error::Error>> {
    let documents = [
        "basic_example.yaml",
        "all_parameters_example.yaml",
        "terms_from_db_example.yaml",
        "terms_from_variable_example.yaml",
        "multiple_searchs_example.yaml",
        "inlabs_example.yaml",
        "department_example.yaml",
        "markdown_docs_example.yaml",
        "header_and_footer_example.yaml",
        "qd_list_territory_id_example.yaml",
        "webhooks_example.json",
    ];
    let output = check(&["--output", "json"], &documents)?;
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let value: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(value["status"], "ok");
    assert_eq!(value["summary"]["valid"], documents.len());
    assert_eq!(value["documents"][4]["searchCount"], 3);
    Ok(())
}

#[test]
fn invalid_document_lists_every_issue() -> Result<(), Box<dyn std::error::Error>> {
    let output = check(&["--json"], &["invalid_many_problems.yaml"])?;
    assert_eq!(output.status.code(), Some(2));

    let value: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    let issues = value["documents"][0]["error"]["issues"]
        .as_array()
        .ok_or("issues should be a list")?;
    let paths: Vec<&str> = issues
        .iter()
        .filter_map(|issue| issue["fieldPath"].as_str())
        .collect();
    assert_eq!(
        paths,
        vec![
            "search[0].date",
            "search[1].terms",
            "search[1].sources[1]",
            "search[2].terms.from_db_select.conn_id",
            "search[2].field",
            "report.emails",
            "report.slack_webhook",
        ]
    );
    Ok(())
}

#[test]
fn text_output_is_stable_across_runs() -> Result<(), Box<dyn std::error::Error>> {
    let documents = ["basic_example.yaml", "invalid_syntax.yaml"];
    let first = check(&[], &documents)?;
    let second = check(&[], &documents)?;

    assert_eq!(first.stdout, second.stdout);
    assert_eq!(first.status.code(), Some(2));
    let stdout = String::from_utf8(first.stdout)?;
    assert!(stdout.contains("ERR_CONFIG_INVALID_YAML"));
    assert!(stdout.ends_with("checked: 2, valid: 1, invalid: 1\n"));
    Ok(())
}

#[test]
fn missing_file_exits_with_io_status() -> std::io::Result<()> {
    let output = check(&[], &["no_such_document.yaml"])?;
    assert_eq!(output.status.code(), Some(3));
    Ok(())
}
