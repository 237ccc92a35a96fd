//! Structural validation of project configurations
//!
//! These rules check the shape of a [`ProjectConfig`] before lowering
//! starts: required sections, obviously broken declarations and the schema
//! version. Semantic checks (naming, references, join synthesis) belong to
//! lowering itself.

use crate::config::ProjectConfig;
use stackforge_core::{Diagnostic, DiagnosticCode, Diagnostics, LowerError, LowerResult};

/// Longest accepted project name
pub const MAX_PROJECT_NAME_LEN: usize = 100;

// ============================================================================
// ValidationRule Trait
// ============================================================================

/// Trait for validation rules
pub trait ValidationRule: Send + Sync {
    /// Get the rule name
    fn name(&self) -> &'static str;

    /// Get the rule description
    fn description(&self) -> &'static str;

    /// Check a configuration, pushing every finding into `diagnostics`
    fn check(&self, config: &ProjectConfig, diagnostics: &mut Diagnostics);
}

// ============================================================================
// Validator
// ============================================================================

/// Configuration validator that runs multiple validation rules
#[derive(Default)]
pub struct Validator {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl Validator {
    /// Create a new validator
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Create a validator with default rules
    pub fn with_default_rules() -> Self {
        let mut validator = Self::new();
        validator.add_rule(Box::new(ProjectMetaRule));
        validator.add_rule(Box::new(ModelsPresentRule));
        validator.add_rule(Box::new(RelationshipSourceRule));
        validator.add_rule(Box::new(SchemaVersionRule));
        validator
    }

    /// Add a validation rule
    pub fn add_rule(&mut self, rule: Box<dyn ValidationRule>) {
        self.rules.push(rule);
    }

    /// Names of the registered rules
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Validate a configuration with all rules
    pub fn validate(&self, config: &ProjectConfig) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();
        for rule in &self.rules {
            rule.check(config, &mut diagnostics);
        }
        diagnostics
    }

    /// Validate and fail on any error
    pub fn validate_result(&self, config: &ProjectConfig) -> LowerResult<Diagnostics> {
        self.validate(config).into_result()
    }
}

// ============================================================================
// Built-in Validation Rules
// ============================================================================

/// Rule: project name present and not too long
pub struct ProjectMetaRule;

impl ValidationRule for ProjectMetaRule {
    fn name(&self) -> &'static str {
        "project_meta"
    }

    fn description(&self) -> &'static str {
        "Validates project metadata"
    }

    fn check(&self, config: &ProjectConfig, diagnostics: &mut Diagnostics) {
        let name = config.project.name.trim();
        if name.is_empty() {
            diagnostics.error(
                DiagnosticCode::SchemaError,
                "project.name",
                "Project name is required",
            );
        } else if name.chars().count() > MAX_PROJECT_NAME_LEN {
            diagnostics.push(
                Diagnostic::error(
                    DiagnosticCode::SchemaError,
                    "project.name",
                    format!(
                        "Project name is too long (max {} characters)",
                        MAX_PROJECT_NAME_LEN
                    ),
                )
                .with_suggestion("Use a shorter project name"),
            );
        }
    }
}

/// Rule: at least one model, every model has fields
pub struct ModelsPresentRule;

impl ValidationRule for ModelsPresentRule {
    fn name(&self) -> &'static str {
        "models_present"
    }

    fn description(&self) -> &'static str {
        "Validates that the project declares models with fields"
    }

    fn check(&self, config: &ProjectConfig, diagnostics: &mut Diagnostics) {
        if config.models.is_empty() {
            diagnostics.error(
                DiagnosticCode::SchemaError,
                "models",
                "At least one model is required",
            );
            return;
        }

        for (index, model) in config.models.iter().enumerate() {
            if model.fields.is_empty() {
                diagnostics.warning(
                    DiagnosticCode::EmptyModel,
                    format!("models[{}]", index),
                    format!("Model '{}' has no fields", model.name),
                );
            }
            for (field_index, field) in model.fields.iter().enumerate() {
                if field.field_type.trim().is_empty() {
                    diagnostics.error(
                        DiagnosticCode::SchemaError,
                        format!("models[{}].fields[{}]", index, field_index),
                        format!("Field '{}' has no type", field.name),
                    );
                }
            }
        }
    }
}

/// Rule: project-level relationships name their source
pub struct RelationshipSourceRule;

impl ValidationRule for RelationshipSourceRule {
    fn name(&self) -> &'static str {
        "relationship_source"
    }

    fn description(&self) -> &'static str {
        "Validates that project-level relationships declare a source model"
    }

    fn check(&self, config: &ProjectConfig, diagnostics: &mut Diagnostics) {
        for (index, relationship) in config.relationships.iter().enumerate() {
            let missing = relationship
                .source
                .as_deref()
                .map(|s| s.trim().is_empty())
                .unwrap_or(true);
            if missing {
                diagnostics.error(
                    DiagnosticCode::SchemaError,
                    format!("relationships[{}].source", index),
                    "Project-level relationships must declare a source model",
                );
            }
            if relationship.target.trim().is_empty() {
                diagnostics.error(
                    DiagnosticCode::SchemaError,
                    format!("relationships[{}].target", index),
                    "Relationship target model is required",
                );
            }
        }
    }
}

/// Rule: the document is not newer than this build understands
pub struct SchemaVersionRule;

impl ValidationRule for SchemaVersionRule {
    fn name(&self) -> &'static str {
        "schema_version"
    }

    fn description(&self) -> &'static str {
        "Validates the declared schema version"
    }

    fn check(&self, config: &ProjectConfig, diagnostics: &mut Diagnostics) {
        if let Some(found) = config.schema_version {
            if found > crate::SCHEMA_VERSION {
                let err = LowerError::SchemaVersionMismatch {
                    expected: crate::SCHEMA_VERSION,
                    found,
                };
                diagnostics.push(err.into_diagnostic("schemaVersion"));
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
