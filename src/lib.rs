//! # Stackforge
//!
//! Lowers a declarative description of a backend project (models, fields,
//! relationships, auth and feature toggles) into a fully-resolved,
//! internally-consistent intermediate representation that a separate
//! renderer turns into source files.
//!
//! ## Crates
//!
//! - [`base`]: errors, diagnostics, closed type enums, naming rules
//! - [`ir`]: raw configuration types and the lowered IR
//! - [`lowering`]: the lowering pipeline
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stackforge::prelude::*;
//!
//! let config = stackforge::ir::load_config("demos/blog.json")?;
//! let lowered = lower_with(&config, LowerOptions::new().with_seed(true))?;
//!
//! for model in &lowered.ir.models {
//!     println!("{} -> {}", model.name, model.route_path);
//! }
//! ```

pub use stackforge_core as base;
pub use stackforge_ir as ir;
pub use stackforge_lower as lowering;

pub use stackforge_core::{Diagnostic, DiagnosticCode, Diagnostics, LowerError, LowerResult};
pub use stackforge_ir::{ProjectConfig, ProjectIr, load_config, save_ir};
pub use stackforge_lower::{LowerOptions, LoweredProject, Lowerer, lower_with};

/// Lower a configuration with default options
pub fn lower_config(config: &ProjectConfig) -> LowerResult<LoweredProject> {
    stackforge_lower::lower(config)
}

/// Everything needed to build configurations and lower them
pub mod prelude {
    pub use stackforge_core::{
        Diagnostic, DiagnosticCode, Diagnostics, FieldType, LowerError, LowerResult,
        RelationKind, Sensitivity, StorageEngine,
    };
    pub use stackforge_ir::{
        AuthConfig, FeatureToggles, ModelDescriptor, ProjectConfig, ProjectIr, RawField,
        RawModel, RawRelationship,
    };
    pub use stackforge_lower::prelude::*;
}
