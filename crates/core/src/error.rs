//! Error types for Stackforge
//!
//! This module provides unified error handling across the lowering pipeline,
//! including aggregated validation failures, IO errors and configuration
//! parsing errors.

use crate::diagnostics::{Diagnostic, DiagnosticCode};
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for Stackforge
#[derive(Debug, Error)]
pub enum LowerError {
    // ========================================================================
    // Lowering Errors
    // ========================================================================
    /// Lowering was rejected; carries every collected diagnostic
    #[error("Lowering rejected: {}", summarize(.0))]
    Rejected(Vec<Diagnostic>),

    /// A required top-level section is missing or malformed
    #[error("Schema error: {0}")]
    Schema(String),

    /// A declared field type is not supported
    #[error("Unsupported field type '{declared}' for '{model}.{field}'")]
    UnsupportedFieldType {
        model: String,
        field: String,
        declared: String,
    },

    /// A relationship or reference field points at a missing model
    #[error("Unknown model reference: '{0}'")]
    UnknownModelReference(String),

    /// A name breaks the naming rules
    #[error("Naming violation at '{path}': {message}")]
    NamingViolation { path: String, message: String },

    /// Duplicate model name
    #[error("Duplicate model name: '{0}' already exists")]
    DuplicateModel(String),

    /// Duplicate field name
    #[error("Duplicate field name: '{field}' already exists in model '{model}'")]
    DuplicateField { model: String, field: String },

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration file not found
    #[error("Configuration not found at path: {0}")]
    ConfigNotFound(PathBuf),

    /// Configuration file has an extension we cannot parse
    #[error("Unsupported configuration format: {0}")]
    UnsupportedFormat(PathBuf),

    /// Schema version mismatch
    #[error("Schema version mismatch: supported up to {expected}, found {found}")]
    SchemaVersionMismatch { expected: u32, found: u32 },

    // ========================================================================
    // IO Errors
    // ========================================================================
    /// File IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File read error
    #[error("Failed to read file '{path}': {message}")]
    FileRead { path: PathBuf, message: String },

    /// File write error
    #[error("Failed to write file '{path}': {message}")]
    FileWrite { path: PathBuf, message: String },

    // ========================================================================
    // Serialization Errors
    // ========================================================================
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    // ========================================================================
    // Generic Errors
    // ========================================================================
    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),

    /// Generic error with context
    #[error("{context}: {message}")]
    WithContext { context: String, message: String },
}

impl LowerError {
    /// Create a schema error
    pub fn schema(msg: impl Into<String>) -> Self {
        LowerError::Schema(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        LowerError::Internal(msg.into())
    }

    /// Create an error with context
    pub fn with_context(context: impl Into<String>, msg: impl Into<String>) -> Self {
        LowerError::WithContext {
            context: context.into(),
            message: msg.into(),
        }
    }

    /// Diagnostics carried by a rejected run (empty for other variants)
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            LowerError::Rejected(diagnostics) => diagnostics,
            _ => &[],
        }
    }

    /// The diagnostic code matching this error, if it has one
    pub fn code(&self) -> Option<DiagnosticCode> {
        match self {
            LowerError::Schema(_) | LowerError::SchemaVersionMismatch { .. } => {
                Some(DiagnosticCode::SchemaError)
            }
            LowerError::UnsupportedFieldType { .. } => Some(DiagnosticCode::UnsupportedFieldType),
            LowerError::UnknownModelReference(_) => Some(DiagnosticCode::UnknownModelReference),
            LowerError::NamingViolation { .. } => Some(DiagnosticCode::NamingViolation),
            LowerError::DuplicateModel(_) => Some(DiagnosticCode::DuplicateModelName),
            LowerError::DuplicateField { .. } => Some(DiagnosticCode::DuplicateFieldName),
            _ => None,
        }
    }

    /// Convert into a single error diagnostic at `path`
    pub fn into_diagnostic(self, path: impl Into<String>) -> Diagnostic {
        let code = self.code().unwrap_or(DiagnosticCode::SchemaError);
        Diagnostic::error(code, path, self.to_string())
    }

    /// Check if this error is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            LowerError::Rejected(_)
                | LowerError::Schema(_)
                | LowerError::UnsupportedFieldType { .. }
                | LowerError::UnknownModelReference(_)
                | LowerError::NamingViolation { .. }
                | LowerError::DuplicateModel(_)
                | LowerError::DuplicateField { .. }
        )
    }

    /// Check if this error is an IO error
    pub fn is_io(&self) -> bool {
        matches!(
            self,
            LowerError::Io(_)
                | LowerError::FileRead { .. }
                | LowerError::FileWrite { .. }
                | LowerError::ConfigNotFound(_)
        )
    }
}

fn summarize(diagnostics: &[Diagnostic]) -> String {
    let errors: Vec<String> = diagnostics
        .iter()
        .filter(|d| d.is_error())
        .map(|d| d.to_string())
        .collect();
    format!("{} error(s): {}", errors.len(), errors.join("; "))
}

/// Result type alias using LowerError
pub type LowerResult<T> = Result<T, LowerError>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn with_context<C: Into<String>>(self, context: C) -> LowerResult<T>;
}

impl<T, E: Into<LowerError>> ResultExt<T> for Result<T, E> {
    fn with_context<C: Into<String>>(self, context: C) -> LowerResult<T> {
        self.map_err(|e| {
            let err: LowerError = e.into();
            LowerError::WithContext {
                context: context.into(),
                message: err.to_string(),
            }
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
