//! Validation issues, the accumulated report, and the resolver error type.

use gazette_digest_domain::VocabularyError;
use gazette_digest_shared::{ErrorCode, ErrorEnvelope};
use serde::Serialize;
use std::fmt;

/// Location of a field inside a document, rendered as `search[1].sources[0]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FieldPath(String);

impl FieldPath {
    /// The document root.
    #[must_use]
    pub const fn root() -> Self {
        Self(String::new())
    }

    /// Path of a mapping key below this path.
    #[must_use]
    pub fn key(&self, name: &str) -> Self {
        if self.is_root() {
            Self(name.to_owned())
        } else {
            Self(format!("{}.{name}", self.0))
        }
    }

    /// Path of a sequence element below this path.
    #[must_use]
    pub fn index(&self, index: usize) -> Self {
        Self(format!("{}[{index}]", self.0))
    }

    /// Returns true for the document root.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            formatter.write_str("$")
        } else {
            formatter.write_str(&self.0)
        }
    }
}

impl Serialize for FieldPath {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

/// Category of a validation issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum IssueKind {
    /// Wrong type or malformed value.
    SchemaError,
    /// Key not recognized at its level.
    UnknownField,
    /// Closed-vocabulary value not recognized.
    UnknownEnumValue,
    /// A field and its alias were both supplied.
    ConflictingAlias,
    /// Derived terms name no strategy.
    MissingDerivationStrategy,
    /// Derived terms name more than one strategy, or mix with literals.
    AmbiguousDerivationStrategy,
    /// A storage-query strategy lacks a required sub-field.
    IncompleteDerivationSpec,
    /// The document defines no search block.
    NoSearchDefined,
    /// Declared identity differs from the identity of the source location.
    IdentityMismatch,
    /// A required field is absent or null.
    MissingRequiredField,
}

impl IssueKind {
    /// Stable label used in text output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SchemaError => "SchemaError",
            Self::UnknownField => "UnknownField",
            Self::UnknownEnumValue => "UnknownEnumValue",
            Self::ConflictingAlias => "ConflictingAlias",
            Self::MissingDerivationStrategy => "MissingDerivationStrategy",
            Self::AmbiguousDerivationStrategy => "AmbiguousDerivationStrategy",
            Self::IncompleteDerivationSpec => "IncompleteDerivationSpec",
            Self::NoSearchDefined => "NoSearchDefined",
            Self::IdentityMismatch => "IdentityMismatch",
            Self::MissingRequiredField => "MissingRequiredField",
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// One problem found in a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    /// Where the problem is.
    pub field_path: FieldPath,
    /// What kind of problem it is.
    pub kind: IssueKind,
    /// Human-readable explanation.
    pub message: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{} [{}]: {}", self.field_path, self.kind, self.message)
    }
}

/// Ordered collection of issues (document order, then field order).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationReport {
    issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// Report holding a single issue.
    #[must_use]
    pub fn single(field_path: FieldPath, kind: IssueKind, message: impl Into<String>) -> Self {
        Self {
            issues: vec![ValidationIssue {
                field_path,
                kind,
                message: message.into(),
            }],
        }
    }

    /// Issues in report order.
    #[must_use]
    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    /// Number of issues.
    #[must_use]
    pub fn len(&self) -> usize {
        self.issues.len()
    }

    /// Returns true when no issue was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Compact JSON rendering, as attached to error envelopes.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| String::from("[]"))
    }
}

impl IntoIterator for ValidationReport {
    type Item = ValidationIssue;
    type IntoIter = std::vec::IntoIter<ValidationIssue>;

    fn into_iter(self) -> Self::IntoIter {
        self.issues.into_iter()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (position, issue) in self.issues.iter().enumerate() {
            if position > 0 {
                formatter.write_str("\n")?;
            }
            write!(formatter, "{issue}")?;
        }
        Ok(())
    }
}

/// Issue sink threaded through the block resolvers.
///
/// A registry defect is not a user issue: the first one seen is kept aside
/// and turns the whole resolution into [`ResolveError::RegistryDefect`].
#[derive(Debug, Default)]
pub struct Diagnostics {
    report: ValidationReport,
    defect: Option<VocabularyError>,
}

impl Diagnostics {
    /// Empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an issue.
    pub fn push(&mut self, field_path: FieldPath, kind: IssueKind, message: impl Into<String>) {
        self.report.issues.push(ValidationIssue {
            field_path,
            kind,
            message: message.into(),
        });
    }

    /// Record a vocabulary lookup failure at `field_path`.
    pub fn vocabulary(&mut self, field_path: FieldPath, error: VocabularyError) {
        if error.is_defect() {
            if self.defect.is_none() {
                self.defect = Some(error);
            }
        } else {
            self.push(field_path, IssueKind::UnknownEnumValue, error.to_string());
        }
    }

    /// Append everything another sink collected, keeping its order.
    pub fn absorb(&mut self, other: Self) {
        self.report.issues.extend(other.report.issues);
        if self.defect.is_none() {
            self.defect = other.defect;
        }
    }

    /// Number of issues recorded so far.
    #[must_use]
    pub fn issue_count(&self) -> usize {
        self.report.len()
    }

    /// Returns true when nothing went wrong.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.report.is_empty() && self.defect.is_none()
    }

    /// Hand `value` back only when the sink stayed clean.
    pub fn finish<T>(self, value: Option<T>) -> Result<T, ResolveError> {
        if let Some(defect) = self.defect {
            return Err(ResolveError::RegistryDefect(defect));
        }
        match value {
            Some(value) if self.report.is_empty() => Ok(value),
            _ => Err(ResolveError::Invalid(self.report)),
        }
    }
}

/// Why a document could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// The document has authoring mistakes.
    Invalid(ValidationReport),
    /// A vocabulary table is inconsistent (engine bug).
    RegistryDefect(VocabularyError),
}

impl ResolveError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::Invalid(_) => ErrorCode::config("validation_failed"),
            Self::RegistryDefect(_) => ErrorCode::config("vocabulary_table_defect"),
        }
    }

    /// The issue report, when the failure is a user error.
    #[must_use]
    pub const fn report(&self) -> Option<&ValidationReport> {
        match self {
            Self::Invalid(report) => Some(report),
            Self::RegistryDefect(_) => None,
        }
    }
}

impl fmt::Display for ResolveError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invalid(report) => {
                write!(formatter, "document is invalid ({} issue", report.len())?;
                if report.len() != 1 {
                    formatter.write_str("s")?;
                }
                formatter.write_str(")")
            },
            Self::RegistryDefect(defect) => write!(formatter, "{defect}"),
        }
    }
}

impl std::error::Error for ResolveError {}

impl From<ResolveError> for ErrorEnvelope {
    fn from(error: ResolveError) -> Self {
        let code = error.error_code();
        let message = error.to_string();
        match error {
            ResolveError::Invalid(report) => Self::expected(code, message)
                .with_metadata("issue_count", report.len().to_string())
                .with_metadata("issues", report.to_json()),
            ResolveError::RegistryDefect(defect) => {
                let category = match &defect {
                    VocabularyError::UnknownValue { category, .. }
                    | VocabularyError::TableDefect { category, .. } => category.as_str(),
                };
                Self::invariant(code, message).with_metadata("category", category)
            },
        }
    }
}
