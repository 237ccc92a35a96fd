//! # Stackforge Lower
//!
//! Lowering of declarative project configurations into the Stackforge IR.
//!
//! ## Stages
//!
//! - **Names**: model and field names are checked and case-fixed, reserved
//!   names rejected or disambiguated
//! - **Fields**: types parsed, constraints resolved (explicit, suggested or
//!   heuristic), validators and examples attached
//! - **Models**: derived names, route paths and access policies
//! - **Relationships**: planned first (descriptors, reference fields, join
//!   models), then applied to the lowered models
//! - **Seeding**: dependency-ordered plan with per-field value generators
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stackforge_lower::{LowerOptions, Lowerer};
//! use stackforge_ir::load_config;
//!
//! let config = load_config("stackforge.json")?;
//! let lowered = Lowerer::new(LowerOptions::new().with_seed(true)).lower(&config)?;
//!
//! println!("{}", lowered.summary());
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod assembler;
pub mod context;
pub mod field;
pub mod heuristics;
pub mod model;
pub mod policy;
pub mod relationships;
pub mod seed;
pub mod suggest;

// ============================================================================
// Re-exports
// ============================================================================

pub use assembler::{LoweredProject, Lowerer, LoweringSummary, summarize};
pub use context::LoweringContext;
pub use heuristics::FieldKind;
pub use policy::{field_sensitivity, infer_policy, model_sensitivity};
pub use relationships::{Injected, RelationshipPlan, apply_injections};
pub use seed::plan_seeding;
pub use suggest::{
    HeuristicSuggestions, StaticSuggestions, Suggestion, SuggestionRequest, SuggestionSource,
};

use stackforge_core::LowerResult;
use stackforge_ir::ProjectConfig;
use std::sync::Arc;

// ============================================================================
// LowerOptions
// ============================================================================

/// Options tuning a lowering run
///
/// Every override is optional; unset ones fall back to the configuration's
/// own `features` section.
#[derive(Clone, Default)]
pub struct LowerOptions {
    /// Force seeding on or off
    pub seed: Option<bool>,

    /// Records per model in the seeding plan
    pub seed_count: Option<usize>,

    /// Route prefix used instead of `features.apiPrefix`
    pub api_prefix: Option<String>,

    /// Consulted for fields without explicit constraints, before heuristics
    pub suggestions: Option<Arc<dyn SuggestionSource>>,
}

impl LowerOptions {
    /// Create default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Turn seeding on or off
    pub fn with_seed(mut self, seed: bool) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the number of records per model
    pub fn with_seed_count(mut self, count: usize) -> Self {
        self.seed_count = Some(count);
        self
    }

    /// Override the API prefix
    pub fn with_api_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.api_prefix = Some(prefix.into());
        self
    }

    /// Set the suggestion source
    pub fn with_suggestions(mut self, source: Arc<dyn SuggestionSource>) -> Self {
        self.suggestions = Some(source);
        self
    }
}

impl std::fmt::Debug for LowerOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LowerOptions")
            .field("seed", &self.seed)
            .field("seed_count", &self.seed_count)
            .field("api_prefix", &self.api_prefix)
            .field("suggestions", &self.suggestions.as_ref().map(|s| s.name()))
            .finish()
    }
}

// ============================================================================
// Convenience functions
// ============================================================================

/// Lower a configuration with default options
pub fn lower(config: &ProjectConfig) -> LowerResult<LoweredProject> {
    Lowerer::with_defaults().lower(config)
}

/// Lower a configuration with the given options
pub fn lower_with(config: &ProjectConfig, options: LowerOptions) -> LowerResult<LoweredProject> {
    Lowerer::new(options).lower(config)
}

// ============================================================================
// Prelude
// ============================================================================

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        LowerOptions, LoweredProject, Lowerer, LoweringSummary, StaticSuggestions, Suggestion,
        SuggestionSource, lower, lower_with,
    };
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use stackforge_ir::{RawField, RawModel};

    #[test]
    fn test_options_default() {
        let options = LowerOptions::default();
        assert!(options.seed.is_none());
        assert!(options.seed_count.is_none());
        assert!(options.api_prefix.is_none());
        assert!(options.suggestions.is_none());
    }

    #[test]
    fn test_options_builder() {
        let options = LowerOptions::new()
            .with_seed(true)
            .with_seed_count(25)
            .with_api_prefix("/v1")
            .with_suggestions(Arc::new(StaticSuggestions::new()));

        assert_eq!(options.seed, Some(true));
        assert_eq!(options.seed_count, Some(25));
        assert_eq!(options.api_prefix.as_deref(), Some("/v1"));
        assert!(format!("{:?}", options).contains("static"));
    }

    #[test]
    fn test_lower_convenience() {
        let config = ProjectConfig::new("notes")
            .with_model(RawModel::new("Note").with_field(RawField::new("body", "string")));
        let lowered = lower(&config).unwrap();
        assert_eq!(lowered.ir.models.len(), 1);

        let seeded = lower_with(&config, LowerOptions::new().with_seed(true)).unwrap();
        assert_eq!(seeded.ir.seed_plan.unwrap().order(), vec!["Note"]);
    }
}
