//! Document loading: bytes or files in, validated configs out.
//!
//! The loader owns everything outside resolution proper: reading files,
//! picking the format from the extension, parsing YAML/JSON into the untyped
//! tree, and deriving the identity hint from the file stem. Every failure is
//! surfaced as a typed `ErrorEnvelope`.

use crate::{CanonicalConfig, DocumentResolver};
use gazette_digest_domain::DocumentId;
use gazette_digest_shared::{ErrorClass, ErrorCode, ErrorEnvelope, Result, Validated};
use rayon::prelude::*;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Canonical config that passed resolution.
pub type ValidatedConfig = Validated<CanonicalConfig>;

/// Serialization format of a raw document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// YAML (the historical authoring format).
    Yaml,
    /// JSON.
    Json,
}

impl DocumentFormat {
    /// Pick the format from a file extension; no extension means YAML.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|value| value.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            None | Some("yaml" | "yml") => Ok(Self::Yaml),
            Some("json") => Ok(Self::Json),
            Some(other) => Err(ErrorEnvelope::expected(
                ErrorCode::config("unsupported_format"),
                "unsupported document format; use .yaml, .yml or .json",
            )
            .with_metadata("extension", other.to_owned())
            .with_metadata("path", path.to_string_lossy().to_string())),
        }
    }
}

/// Load, parse and resolve the document at `path`.
///
/// The identity hint is the file stem: `basic_example.yaml` must either omit
/// `id` or declare `id: basic_example`.
pub fn parse_document_path(path: &Path) -> Result<ValidatedConfig> {
    parse_document_path_with(&DocumentResolver::default(), path)
}

/// [`parse_document_path`] with an explicit resolver.
pub fn parse_document_path_with(
    resolver: &DocumentResolver,
    path: &Path,
) -> Result<ValidatedConfig> {
    let identity = identity_from_path(path)?;
    let format = DocumentFormat::from_path(path)?;
    let bytes = read_document_file(path)?;
    tracing::debug!(path = %path.display(), ?format, "loaded document");

    parse_document_bytes_with(resolver, &bytes, format, &identity)
        .map_err(|error| error.with_metadata("path", path.to_string_lossy().to_string()))
}

/// Parse and resolve raw document bytes under the given identity.
pub fn parse_document_bytes(
    bytes: &[u8],
    format: DocumentFormat,
    identity_hint: &DocumentId,
) -> Result<ValidatedConfig> {
    parse_document_bytes_with(&DocumentResolver::default(), bytes, format, identity_hint)
}

/// [`parse_document_bytes`] with an explicit resolver.
pub fn parse_document_bytes_with(
    resolver: &DocumentResolver,
    bytes: &[u8],
    format: DocumentFormat,
    identity_hint: &DocumentId,
) -> Result<ValidatedConfig> {
    let raw = parse_raw_document(bytes, format)?;
    let config = resolver
        .resolve(&raw, identity_hint)
        .map_err(|error| ErrorEnvelope::from(error).with_metadata("document", identity_hint.as_str()))?;
    Ok(Validated::new(config))
}

/// Resolve many documents in parallel; results keep the input order.
pub fn resolve_paths(paths: &[PathBuf]) -> Vec<(PathBuf, Result<ValidatedConfig>)> {
    let resolver = DocumentResolver::default();
    paths
        .par_iter()
        .map(|path| (path.clone(), parse_document_path_with(&resolver, path)))
        .collect()
}

/// Parse bytes into the untyped document tree.
pub fn parse_raw_document(bytes: &[u8], format: DocumentFormat) -> Result<Value> {
    match format {
        DocumentFormat::Yaml => serde_yaml_ng::from_slice(bytes).map_err(|error| {
            let envelope = ErrorEnvelope::expected(
                ErrorCode::config("invalid_yaml"),
                format!("invalid document YAML: {error}"),
            );
            match error.location() {
                Some(location) => envelope
                    .with_metadata("line", location.line().to_string())
                    .with_metadata("column", location.column().to_string()),
                None => envelope,
            }
        }),
        DocumentFormat::Json => serde_json::from_slice(bytes).map_err(|error| {
            ErrorEnvelope::expected(
                ErrorCode::config("invalid_json"),
                format!("invalid document JSON: {error}"),
            )
            .with_metadata("line", error.line().to_string())
            .with_metadata("column", error.column().to_string())
        }),
    }
}

/// Serialize the config as deterministic pretty JSON (with trailing newline).
pub fn to_pretty_json(config: &CanonicalConfig) -> Result<String> {
    let mut output = serde_json::to_string_pretty(config).map_err(|error| {
        ErrorEnvelope::unexpected(
            ErrorCode::internal(),
            format!("failed to serialize config: {error}"),
            ErrorClass::NonRetriable,
        )
    })?;
    output.push('\n');
    Ok(output)
}

/// Serialize the config as YAML.
pub fn to_yaml(config: &CanonicalConfig) -> Result<String> {
    serde_yaml_ng::to_string(config).map_err(|error| {
        ErrorEnvelope::unexpected(
            ErrorCode::config("serialize_yaml"),
            format!("failed to serialize config YAML: {error}"),
            ErrorClass::NonRetriable,
        )
    })
}

fn identity_from_path(path: &Path) -> Result<DocumentId> {
    DocumentId::from_path(path).map_err(|error| {
        ErrorEnvelope::expected(
            ErrorCode::config("invalid_identity"),
            format!("cannot derive the document identity: {error}"),
        )
        .with_metadata("path", path.to_string_lossy().to_string())
    })
}

/// Read a document file, mapping I/O failures to `document_not_found`,
/// `document_permission_denied` or `document_io` with `path` metadata.
pub fn read_document_file(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|error| {
        let code = match error.kind() {
            std::io::ErrorKind::NotFound => ErrorCode::config("document_not_found"),
            std::io::ErrorKind::PermissionDenied => {
                ErrorCode::config("document_permission_denied")
            },
            _ => ErrorCode::config("document_io"),
        };

        ErrorEnvelope::expected(code, format!("failed to read document: {error}"))
            .with_metadata("path", path.to_string_lossy().to_string())
    })
}
