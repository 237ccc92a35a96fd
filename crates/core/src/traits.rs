//! Core traits for Stackforge
//!
//! Descriptors produced by lowering implement [`Validatable`] so the
//! assembler can re-check the IR invariants before handing the document to
//! a renderer.

use crate::diagnostics::Diagnostics;
use crate::error::LowerResult;

// ============================================================================
// Validatable Trait
// ============================================================================

/// Trait for types that can check their own invariants
///
/// Implementations push every violation into a [`Diagnostics`] collection
/// instead of stopping at the first one.
///
/// # Example
///
/// ```rust,ignore
/// use stackforge_core::{Diagnostics, DiagnosticCode, Validatable};
///
/// struct Tag {
///     name: String,
/// }
///
/// impl Validatable for Tag {
///     fn validate_into(&self, path: &str, diagnostics: &mut Diagnostics) {
///         if self.name.is_empty() {
///             diagnostics.error(DiagnosticCode::SchemaError, path, "Tag name cannot be empty");
///         }
///     }
/// }
/// ```
pub trait Validatable {
    /// Push every violation found at `path` into `diagnostics`
    fn validate_into(&self, path: &str, diagnostics: &mut Diagnostics);

    /// Collect violations into a fresh collection
    fn validate(&self, path: &str) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();
        self.validate_into(path, &mut diagnostics);
        diagnostics
    }

    /// Check if the object is valid without returning details
    fn is_valid(&self) -> bool {
        !self.validate("").has_errors()
    }

    /// Fail with every collected error
    fn validate_result(&self, path: &str) -> LowerResult<()> {
        self.validate(path).into_result().map(|_| ())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::DiagnosticCode;

    struct Named(&'static str);

    impl Validatable for Named {
        fn validate_into(&self, path: &str, diagnostics: &mut Diagnostics) {
            if self.0.is_empty() {
                diagnostics.error(DiagnosticCode::SchemaError, path, "Name cannot be empty");
            }
            if self.0.starts_with('_') {
                diagnostics.warning(DiagnosticCode::NamingViolation, path, "Leading underscore");
            }
        }
    }

    #[test]
    fn test_valid() {
        assert!(Named("User").is_valid());
        assert!(Named("User").validate_result("models.User").is_ok());
    }

    #[test]
    fn test_warning_only_is_still_valid() {
        assert!(Named("_User").is_valid());
        assert_eq!(Named("_User").validate("x").len(), 1);
    }

    #[test]
    fn test_invalid() {
        assert!(!Named("").is_valid());
        let err = Named("").validate_result("models[0]").unwrap_err();
        assert_eq!(err.diagnostics()[0].path, "models[0]");
    }
}
