//! CLI binary entrypoint.

mod commands;
mod error;
mod format;

use clap::{Parser, Subcommand};
use commands::show::InputFormat;
use commands::{ShowCommandInput, run_check, run_info, run_schema, run_show};
use error::{CliError, ExitCode};
use format::{OutputArgs, OutputMode, envelope_exit_code, envelope_json, envelope_text};
use gazette_digest_shared::ErrorEnvelope;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "gazette-digest",
    version,
    about = "Validate and resolve gazette digest job documents",
    long_about = None
)]
struct Cli {
    #[command(flatten)]
    output: OutputArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Show build and version details.
    Info,
    /// Resolve one or more documents and report every problem found.
    Check {
        /// Document paths (`.yaml`, `.yml` or `.json`).
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Print the canonical config of one document.
    Show {
        /// Document path; omit or pass `-` to read stdin.
        path: Option<PathBuf>,
        /// Identity to resolve under (required for stdin).
        #[arg(long)]
        identity: Option<String>,
        /// Input format (defaults to the file extension, or YAML for stdin).
        #[arg(long, value_enum)]
        format: Option<InputFormat>,
    },
    /// Print the JSON Schema of the canonical config.
    Schema,
}

pub(crate) struct CliOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: ExitCode,
}

fn main() -> std::process::ExitCode {
    init_tracing();
    let cli = Cli::parse();
    let mode = OutputMode::from_args(&cli.output);

    match run(&cli.command, mode) {
        Ok(output) => match write_output(&output) {
            Ok(()) => std::process::ExitCode::from(output.exit_code.as_u8()),
            Err(error) => exit_with_error(&error),
        },
        Err(error) => exit_with_error(&error),
    }
}

/// Logs go to stderr so stdout stays machine-readable. `RUST_LOG` overrides the warn default.
fn init_tracing() {
    let filter = EnvFilter::builder()
        .with_default_directive(Level::WARN.into())
        .from_env_lossy();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn exit_with_error(error: &CliError) -> std::process::ExitCode {
    let _ = writeln!(io::stderr(), "error: {error}");
    std::process::ExitCode::from(error.exit_code().as_u8())
}

fn run(command: &Commands, mode: OutputMode) -> Result<CliOutput, CliError> {
    let result = match command {
        Commands::Info => run_info(mode),
        Commands::Check { paths } => run_check(paths, mode),
        Commands::Show {
            path,
            identity,
            format,
        } => {
            let input = ShowCommandInput {
                path: path.as_deref(),
                identity: identity.as_deref(),
                format: *format,
            };
            run_show(&input, &mut io::stdin().lock(), mode)
        },
        Commands::Schema => run_schema(),
    };

    match result {
        Err(CliError::Envelope(error)) => Ok(format_error_output(mode, &error)),
        other => other,
    }
}

pub(crate) fn format_error_output(mode: OutputMode, error: &ErrorEnvelope) -> CliOutput {
    let exit_code = envelope_exit_code(error);
    if mode.is_json() {
        let payload = serde_json::json!({
            "status": "error",
            "error": envelope_json(error),
        });

        // This is a CLI boundary, so JSON serialization errors are internal.
        let stdout = format::pretty_json(&payload).unwrap_or_else(|_| {
            "{\"status\":\"error\",\"error\":{\"code\":\"ERR_CORE_INTERNAL\",\"message\":\"internal error\",\"kind\":\"INVARIANT\"}}\n".to_owned()
        });
        CliOutput {
            stdout,
            stderr: String::new(),
            exit_code,
        }
    } else {
        CliOutput {
            stdout: String::new(),
            stderr: format!("status: error\n{}", envelope_text(error)),
            exit_code,
        }
    }
}

fn write_output(output: &CliOutput) -> Result<(), CliError> {
    let mut stdout = io::stdout();
    stdout.write_all(output.stdout.as_bytes())?;
    stdout.flush()?;

    if !output.stderr.is_empty() {
        let mut stderr = io::stderr();
        stderr.write_all(output.stderr.as_bytes())?;
        stderr.flush()?;
    }

    Ok(())
}
