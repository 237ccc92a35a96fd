//! Structured diagnostics for Stackforge
//!
//! Lowering never stops at the first problem. Every check pushes a
//! [`Diagnostic`] (a `{path, code, message}` triple plus severity) into a
//! [`Diagnostics`] sink, and the caller decides at the end of a phase whether
//! the collected errors abort the run.

use crate::error::{LowerError, LowerResult};
use serde::{Deserialize, Serialize};

// ============================================================================
// Severity
// ============================================================================

/// How serious a diagnostic is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Severity {
    /// Aborts lowering once the current phase completes
    Error,
    /// Reported to the caller, lowering continues
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

// ============================================================================
// DiagnosticCode
// ============================================================================

/// Machine-readable diagnostic codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticCode {
    // Structure
    SchemaError,
    EmptyModel,

    // Naming
    NamingViolation,
    ReservedName,
    DuplicateModelName,
    DuplicateFieldName,
    NameDisambiguated,

    // Fields
    UnsupportedFieldType,
    AmbiguousPattern,
    InvalidDefault,

    // References
    UnknownModelReference,
    SelfReference,
    IgnoredAttributes,
    DuplicateJoinModel,
    UnknownAuthModel,

    // Seeding
    SeedCycle,
}

impl DiagnosticCode {
    /// Stable kebab-case identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticCode::SchemaError => "schema-error",
            DiagnosticCode::EmptyModel => "empty-model",
            DiagnosticCode::NamingViolation => "naming-violation",
            DiagnosticCode::ReservedName => "reserved-name",
            DiagnosticCode::DuplicateModelName => "duplicate-model-name",
            DiagnosticCode::DuplicateFieldName => "duplicate-field-name",
            DiagnosticCode::NameDisambiguated => "name-disambiguated",
            DiagnosticCode::UnsupportedFieldType => "unsupported-field-type",
            DiagnosticCode::AmbiguousPattern => "ambiguous-pattern",
            DiagnosticCode::InvalidDefault => "invalid-default",
            DiagnosticCode::UnknownModelReference => "unknown-model-reference",
            DiagnosticCode::SelfReference => "self-reference",
            DiagnosticCode::IgnoredAttributes => "ignored-attributes",
            DiagnosticCode::DuplicateJoinModel => "duplicate-join-model",
            DiagnosticCode::UnknownAuthModel => "unknown-auth-model",
            DiagnosticCode::SeedCycle => "seed-cycle",
        }
    }
}

impl std::fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Diagnostic
// ============================================================================

/// One reported problem
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Location of the problem (e.g. `models.User.fields.email`)
    pub path: String,

    /// Error code for programmatic handling
    pub code: DiagnosticCode,

    /// Human-readable message
    pub message: String,

    /// Whether this aborts lowering
    pub severity: Severity,

    /// Suggested fix, usually the rewritten name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl Diagnostic {
    /// Create an error diagnostic
    pub fn error(code: DiagnosticCode, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            code,
            message: message.into(),
            severity: Severity::Error,
            suggestion: None,
        }
    }

    /// Create a warning diagnostic
    pub fn warning(
        code: DiagnosticCode,
        path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            code,
            message: message.into(),
            severity: Severity::Warning,
            suggestion: None,
        }
    }

    /// Attach a suggested fix
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Check if this is an error
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.severity {
            Severity::Error => write!(f, "[{}] {} ({})", self.path, self.message, self.code)?,
            Severity::Warning => write!(
                f,
                "[{}] Warning: {} ({})",
                self.path, self.message, self.code
            )?,
        }
        if let Some(suggestion) = &self.suggestion {
            write!(f, " - suggestion: {}", suggestion)?;
        }
        Ok(())
    }
}

// ============================================================================
// Diagnostics
// ============================================================================

/// Ordered collection of diagnostics gathered during a lowering phase
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a diagnostic
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.entries.push(diagnostic);
    }

    /// Push an error
    pub fn error(
        &mut self,
        code: DiagnosticCode,
        path: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.push(Diagnostic::error(code, path, message));
    }

    /// Push a warning
    pub fn warning(
        &mut self,
        code: DiagnosticCode,
        path: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.push(Diagnostic::warning(code, path, message));
    }

    /// Append every diagnostic of another collection
    pub fn merge(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }

    /// Check if any error was recorded
    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(Diagnostic::is_error)
    }

    /// Check if any warning was recorded
    pub fn has_warnings(&self) -> bool {
        self.entries.iter().any(|d| !d.is_error())
    }

    /// All errors, in recording order
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(|d| d.is_error())
    }

    /// All warnings, in recording order
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(|d| !d.is_error())
    }

    /// Every diagnostic with the given code
    pub fn with_code(&self, code: DiagnosticCode) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(move |d| d.code == code)
    }

    /// Iterate over all diagnostics
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consume into the underlying list
    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }

    /// Fail with [`LowerError::Rejected`] if any error was recorded,
    /// otherwise hand the (warning-only) collection back.
    pub fn into_result(self) -> LowerResult<Diagnostics> {
        if self.has_errors() {
            Err(LowerError::Rejected(self.entries))
        } else {
            Ok(self)
        }
    }
}

impl From<Vec<Diagnostic>> for Diagnostics {
    fn from(entries: Vec<Diagnostic>) -> Self {
        Self { entries }
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl Extend<Diagnostic> for Diagnostics {
    fn extend<T: IntoIterator<Item = Diagnostic>>(&mut self, iter: T) {
        self.entries.extend(iter);
    }
}

// ============================================================================
// Tests
// ============================================================================
