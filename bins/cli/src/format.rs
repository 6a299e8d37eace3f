//! Output format helpers for CLI commands.

use crate::error::ExitCode;
use clap::{Args, ValueEnum};
use gazette_digest_shared::{ErrorEnvelope, ErrorKind};
use serde_json::Value;

/// Output format choices for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-friendly text output.
    Text,
    /// Machine-friendly JSON output.
    Json,
    /// YAML output (`show` renders the config itself; other commands fall back to text).
    Yaml,
}

/// Output-related CLI flags.
#[derive(Debug, Args)]
pub struct OutputArgs {
    /// Output format for command responses.
    #[arg(long, global = true, value_enum)]
    pub output: Option<OutputFormat>,
    /// Emit machine-readable JSON output (shorthand for `--output json`).
    #[arg(long, global = true)]
    pub json: bool,
}

/// Output mode derived from CLI flags.
#[derive(Debug, Clone, Copy)]
pub struct OutputMode {
    pub format: OutputFormat,
}

impl OutputMode {
    /// Build output mode from CLI flags.
    #[must_use]
    pub const fn from_args(args: &OutputArgs) -> Self {
        let format = match (args.output, args.json) {
            (Some(value), _) => value,
            (None, true) => OutputFormat::Json,
            (None, false) => OutputFormat::Text,
        };
        Self { format }
    }

    /// Returns true when JSON output is requested.
    #[must_use]
    pub const fn is_json(self) -> bool {
        matches!(self.format, OutputFormat::Json)
    }
}

/// Exit code for a failed document.
#[must_use]
pub fn envelope_exit_code(error: &ErrorEnvelope) -> ExitCode {
    match error.kind {
        ErrorKind::Invariant | ErrorKind::Unexpected => ExitCode::Internal,
        ErrorKind::Expected => match error.code.code() {
            "document_not_found" | "document_permission_denied" | "document_io" => ExitCode::Io,
            _ => ExitCode::InvalidInput,
        },
    }
}

/// Issues attached to an envelope, parsed back into JSON.
#[must_use]
pub fn envelope_issues(error: &ErrorEnvelope) -> Vec<Value> {
    error
        .metadata
        .get("issues")
        .and_then(|raw| serde_json::from_str::<Vec<Value>>(raw).ok())
        .unwrap_or_default()
}

/// JSON object describing an envelope.
#[must_use]
pub fn envelope_json(error: &ErrorEnvelope) -> Value {
    let metadata: serde_json::Map<String, Value> = error
        .metadata
        .iter()
        .filter(|(key, _)| key.as_str() != "issues")
        .map(|(key, value)| (key.clone(), Value::String(value.clone())))
        .collect();
    serde_json::json!({
        "code": error.code.to_screaming(),
        "kind": error.kind.to_string().to_ascii_uppercase(),
        "message": error.message,
        "metadata": metadata,
        "issues": envelope_issues(error),
    })
}

/// Text block describing an envelope, one issue per line.
#[must_use]
pub fn envelope_text(error: &ErrorEnvelope) -> String {
    let mut output = format!(
        "code: {}\nmessage: {}\n",
        error.code.to_screaming(),
        error.message
    );
    if let Some(path) = error.metadata.get("path") {
        output.push_str(&format!("path: {path}\n"));
    }
    for issue in envelope_issues(error) {
        let field = issue["fieldPath"].as_str().unwrap_or("$");
        let kind = issue["kind"].as_str().unwrap_or("SchemaError");
        let message = issue["message"].as_str().unwrap_or_default();
        output.push_str(&format!("  {field} [{kind}]: {message}\n"));
    }
    output
}

/// Pretty JSON with trailing newline; serialization failure is an internal error.
pub fn pretty_json(value: &Value) -> Result<String, serde_json::Error> {
    let mut output = serde_json::to_string_pretty(value)?;
    output.push('\n');
    Ok(output)
}
