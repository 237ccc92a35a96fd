//! # Stackforge Core
//!
//! Core types, naming rules, diagnostics and error handling for Stackforge.
//!
//! This crate provides the foundational building blocks used by the IR and
//! lowering crates:
//!
//! - **Types**: field types, storage engines, relationship kinds, sensitivity
//!   tiers and validator tags
//! - **Naming**: case conversion and pluralization
//! - **Diagnostics**: `{path, code, message}` reports gathered across a run
//! - **Errors**: unified error handling with `LowerError` and `LowerResult`
//!

pub mod diagnostics;
pub mod error;
pub mod naming;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use diagnostics::{Diagnostic, DiagnosticCode, Diagnostics, Severity};
pub use error::{LowerError, LowerResult, ResultExt};
pub use traits::Validatable;
pub use types::{
    FieldType, RelationKind, RelationshipId, Sensitivity, StorageEngine, ValidatorTag,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
