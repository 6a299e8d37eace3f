//! Check command handler: resolve many documents and aggregate the outcome.

use crate::CliOutput;
use crate::error::{CliError, ExitCode};
use crate::format::{OutputMode, envelope_exit_code, envelope_json, envelope_text, pretty_json};
use gazette_digest_config::{ValidatedConfig, resolve_paths};
use gazette_digest_shared::ErrorEnvelope;
use std::path::PathBuf;

type Outcome = (PathBuf, Result<ValidatedConfig, ErrorEnvelope>);

/// Run the check command.
pub fn run_check(paths: &[PathBuf], mode: OutputMode) -> Result<CliOutput, CliError> {
    if paths.is_empty() {
        return Err(CliError::InvalidInput(
            "check needs at least one document path".to_owned(),
        ));
    }

    let outcomes = resolve_paths(paths);
    let exit_code = outcomes
        .iter()
        .filter_map(|(_, result)| result.as_ref().err())
        .fold(ExitCode::Ok, |worst, error| worst.worst(envelope_exit_code(error)));

    let invalid = outcomes.iter().filter(|(_, result)| result.is_err()).count();
    let stdout = if mode.is_json() {
        format_check_json(&outcomes, invalid)?
    } else {
        format_check_text(&outcomes, invalid)
    };

    let stderr = if invalid > 0 {
        format!("{invalid} of {} documents failed to resolve\n", outcomes.len())
    } else {
        String::new()
    };

    Ok(CliOutput {
        stdout,
        stderr,
        exit_code,
    })
}

fn format_check_text(outcomes: &[Outcome], invalid: usize) -> String {
    let status = if invalid == 0 { "ok" } else { "error" };
    let mut output = format!("status: {status}\n");
    for (path, result) in outcomes {
        match result {
            Ok(config) => output.push_str(&format!(
                "ok     {} ({}, {} search blocks)\n",
                path.display(),
                config.id,
                config.searches.len()
            )),
            Err(error) => {
                output.push_str(&format!("error  {}\n", path.display()));
                for line in envelope_text(error).lines() {
                    output.push_str(&format!("  {line}\n"));
                }
            },
        }
    }
    output.push_str(&format!(
        "checked: {}, valid: {}, invalid: {invalid}\n",
        outcomes.len(),
        outcomes.len() - invalid
    ));
    output
}

fn format_check_json(outcomes: &[Outcome], invalid: usize) -> Result<String, CliError> {
    let documents: Vec<serde_json::Value> = outcomes
        .iter()
        .map(|(path, result)| match result {
            Ok(config) => serde_json::json!({
                "path": path.display().to_string(),
                "status": "ok",
                "id": config.id,
                "searchCount": config.searches.len(),
            }),
            Err(error) => serde_json::json!({
                "path": path.display().to_string(),
                "status": "error",
                "error": envelope_json(error),
            }),
        })
        .collect();

    let payload = serde_json::json!({
        "status": if invalid == 0 { "ok" } else { "error" },
        "summary": {
            "total": outcomes.len(),
            "valid": outcomes.len() - invalid,
            "invalid": invalid,
        },
        "documents": documents,
    });
    Ok(pretty_json(&payload)?)
}
