//! Document identity derived from where a document was loaded from.

use gazette_digest_shared::{ErrorCode, ErrorEnvelope};
use schemars::JsonSchema;
use serde::Serialize;
use std::fmt;
use std::path::Path;

/// Identity validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    /// Identifier is empty after trimming.
    Empty {
        /// Length of the raw input before trimming.
        input_length: usize,
    },
    /// Identifier contains characters outside `[A-Za-z0-9_.-]`.
    InvalidCharacters {
        /// Trimmed identifier that failed validation.
        input: String,
    },
    /// The path has no usable file stem.
    NoFileStem {
        /// Path the identity was derived from.
        path: String,
    },
}

impl IdentityError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::Empty { .. } | Self::InvalidCharacters { .. } => {
                ErrorCode::new("domain", "invalid_document_id")
            },
            Self::NoFileStem { .. } => ErrorCode::new("domain", "invalid_document_path"),
        }
    }
}

impl fmt::Display for IdentityError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { .. } => formatter.write_str("document id must be non-empty"),
            Self::InvalidCharacters { input } => write!(
                formatter,
                "document id {input:?} must match /^[A-Za-z0-9_.-]+$/"
            ),
            Self::NoFileStem { path } => {
                write!(formatter, "cannot derive a document id from path {path:?}")
            },
        }
    }
}

impl std::error::Error for IdentityError {}

impl From<IdentityError> for ErrorEnvelope {
    fn from(error: IdentityError) -> Self {
        let envelope = Self::expected(error.error_code(), error.to_string());
        match error {
            IdentityError::Empty { input_length } => {
                envelope.with_metadata("input_length", input_length.to_string())
            },
            IdentityError::InvalidCharacters { input } => envelope.with_metadata("input", input),
            IdentityError::NoFileStem { path } => envelope.with_metadata("path", path),
        }
    }
}

/// Stable identifier of a document (and of the job generated from it).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, JsonSchema)]
#[serde(transparent)]
pub struct DocumentId(Box<str>);

impl DocumentId {
    /// Parse a `DocumentId` from user input.
    pub fn parse(input: impl AsRef<str>) -> Result<Self, IdentityError> {
        let raw = input.as_ref();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(IdentityError::Empty {
                input_length: raw.len(),
            });
        }
        if !trimmed
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '_' | '-' | '.'))
        {
            return Err(IdentityError::InvalidCharacters {
                input: trimmed.to_owned(),
            });
        }

        Ok(Self(trimmed.to_owned().into_boxed_str()))
    }

    /// Derive the identity from a document path (its file stem).
    ///
    /// `yamls/examples/basic_example.yaml` becomes `basic_example`.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, IdentityError> {
        let path = path.as_ref();
        let stem = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .ok_or_else(|| IdentityError::NoFileStem {
                path: path.display().to_string(),
            })?;
        Self::parse(stem)
    }

    /// Access the underlying string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for DocumentId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn document_id_is_trimmed() -> Result<(), Box<dyn Error>> {
        assert_eq!(DocumentId::parse("  basic_example ")?.as_str(), "basic_example");
        Ok(())
    }

    #[test]
    fn document_id_rejects_blank_and_spaces() {
        assert_eq!(
            DocumentId::parse("   ").err(),
            Some(IdentityError::Empty { input_length: 3 })
        );
        assert!(matches!(
            DocumentId::parse("two words"),
            Err(IdentityError::InvalidCharacters { .. })
        ));
    }

    #[test]
    fn identity_comes_from_the_file_stem() -> Result<(), Box<dyn Error>> {
        let id = DocumentId::from_path("dags/examples_and_tests/inlabs_example.yaml")?;
        assert_eq!(id.as_str(), "inlabs_example");

        let error = DocumentId::from_path("/").err();
        assert!(matches!(error, Some(IdentityError::NoFileStem { .. })));
        Ok(())
    }
}
