//! # Stackforge IR (Intermediate Representation)
//!
//! This crate holds both ends of lowering: the declarative configuration a
//! project is described with, and the fully-resolved IR handed to renderers.
//!
//! ## Core Concepts
//!
//! - **ProjectConfig**: raw declarations (models, fields, relationships, toggles)
//! - **ModelDescriptor**: a lowered model with derived names and access policy
//! - **FieldDescriptor**: a lowered field with types, constraints and validators
//! - **RelationshipDescriptor**: a resolved relationship and where its field landed
//! - **SeedingPlan**: dependency-ordered synthetic data plan
//! - **ProjectIr**: the root document
//!

// Module declarations
pub mod config;
pub mod field;
pub mod model;
pub mod project;
pub mod relationship;
pub mod relationship_helpers;
pub mod seed;
pub mod serialization;
pub mod validation;

// Re-export commonly used types at crate root
pub use config::{
    AuthConfig, AuthStrategy, DatabaseConfig, DeploymentConfig, FeatureToggles, ProjectConfig,
    ProjectMeta, RawField, RawModel, RawRelationship,
};
pub use field::{
    ConstraintSource, Constraints, DefaultValue, FieldDescriptor, RESERVED_FIELD_NAMES,
    is_auto_managed_field, is_reserved_field_name,
};
pub use model::{
    AccessPolicy, CrudOperation, DtoNames, ModelDescriptor, RESERVED_MODEL_NAMES,
    RESERVED_MODEL_PREFIX, is_reserved_model_name,
};
pub use project::ProjectIr;
pub use relationship::{
    FieldInjection, RelationshipDescriptor, SkipReason, SkippedInjection, relationship_id,
};
pub use relationship_helpers::{
    create_reference_field, default_field_name, has_reference_to, inverse_name, join_model_name,
    reference_field_name, relationship_name,
};
pub use seed::{
    Arity, FieldStrategy, RelationshipBinding, SeedPlan, SeedingPlan, ValueGenerator,
};
pub use serialization::{
    ConfigFormat, config_from_json_str, config_from_toml_str, ir_to_string, load_config,
    parse_config, save_ir,
};
pub use validation::{ValidationRule, Validator};

// Re-export core types that are commonly used with IR
pub use stackforge_core::{
    Diagnostic, DiagnosticCode, Diagnostics, FieldType, LowerError, LowerResult, RelationKind,
    RelationshipId, Sensitivity, StorageEngine, Validatable, ValidatorTag,
};

/// Current schema version of configurations and IR documents
pub const SCHEMA_VERSION: u32 = 1;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Prelude Module
// ============================================================================

/// Convenient re-exports for common usage
pub mod prelude {
    pub use crate::{
        // Re-exported from core
        Diagnostics,
        FieldType,
        LowerError,
        LowerResult,
        RelationKind,
        StorageEngine,
        // Configuration
        ProjectConfig,
        RawField,
        RawModel,
        RawRelationship,
        // Lowered IR
        FieldDescriptor,
        ModelDescriptor,
        ProjectIr,
        RelationshipDescriptor,
        SeedingPlan,
    };
}

// ============================================================================
// Tests
// ============================================================================
