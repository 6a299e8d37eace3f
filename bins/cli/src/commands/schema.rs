//! Schema command handler.

use crate::CliOutput;
use crate::error::{CliError, ExitCode};
use gazette_digest_config::canonical_config_schema_json;

/// Print the JSON Schema of the canonical config. The schema is JSON in every output mode.
pub fn run_schema() -> Result<CliOutput, CliError> {
    let stdout = canonical_config_schema_json()?;
    Ok(CliOutput {
        stdout,
        stderr: String::new(),
        exit_code: ExitCode::Ok,
    })
}
