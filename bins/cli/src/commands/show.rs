//! Show command handler: print the canonical config of one document.

use crate::CliOutput;
use crate::error::{CliError, ExitCode};
use crate::format::OutputMode;
use clap::ValueEnum;
use gazette_digest_config::{
    DocumentFormat, ValidatedConfig, parse_document_bytes, parse_document_path,
    read_document_file, to_pretty_json, to_yaml,
};
use gazette_digest_domain::DocumentId;
use gazette_digest_shared::ErrorEnvelope;
use std::io::Read;
use std::path::Path;

/// Input format override for `show`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InputFormat {
    /// YAML document.
    Yaml,
    /// JSON document.
    Json,
}

impl From<InputFormat> for DocumentFormat {
    fn from(value: InputFormat) -> Self {
        match value {
            InputFormat::Yaml => Self::Yaml,
            InputFormat::Json => Self::Json,
        }
    }
}

/// Inputs for the show command.
#[derive(Debug)]
pub struct ShowCommandInput<'a> {
    /// Document path; `None` or `-` reads stdin.
    pub path: Option<&'a Path>,
    /// Identity to resolve under, replacing the file stem.
    pub identity: Option<&'a str>,
    /// Input format, replacing the extension-based choice.
    pub format: Option<InputFormat>,
}

/// Run the show command. JSON mode prints the canonical JSON; text and YAML modes print YAML.
pub fn run_show(
    input: &ShowCommandInput<'_>,
    stdin: &mut dyn Read,
    mode: OutputMode,
) -> Result<CliOutput, CliError> {
    let config = load(input, stdin)?;
    let stdout = if mode.is_json() {
        to_pretty_json(&config)?
    } else {
        to_yaml(&config)?
    };

    Ok(CliOutput {
        stdout,
        stderr: String::new(),
        exit_code: ExitCode::Ok,
    })
}

fn load(input: &ShowCommandInput<'_>, stdin: &mut dyn Read) -> Result<ValidatedConfig, CliError> {
    let file = input.path.filter(|path| *path != Path::new("-"));
    match (file, input.identity) {
        (Some(path), None) if input.format.is_none() => Ok(parse_document_path(path)?),
        (Some(path), identity) => {
            let format = match input.format {
                Some(format) => format.into(),
                None => DocumentFormat::from_path(path)?,
            };
            let identity = match identity {
                Some(value) => DocumentId::parse(value).map_err(ErrorEnvelope::from)?,
                None => DocumentId::from_path(path).map_err(ErrorEnvelope::from)?,
            };
            let bytes = read_document_file(path)?;
            parse_document_bytes(&bytes, format, &identity)
                .map_err(|error| CliError::from(error.with_metadata("path", path.display().to_string())))
        },
        (None, None) => Err(CliError::InvalidInput(
            "reading a document from stdin needs --identity".to_owned(),
        )),
        (None, Some(identity)) => {
            let identity = DocumentId::parse(identity).map_err(ErrorEnvelope::from)?;
            let mut bytes = Vec::new();
            stdin.read_to_end(&mut bytes)?;
            let format = input.format.map_or(DocumentFormat::Yaml, DocumentFormat::from);
            Ok(parse_document_bytes(&bytes, format, &identity)?)
        },
    }
}
