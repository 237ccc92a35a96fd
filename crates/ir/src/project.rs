//! The assembled IR document
//!
//! [`ProjectIr`] is the single document handed to renderers: lowered models
//! and relationships, the optional seeding plan, and the pass-through
//! auth/features/deployment sections with defaults applied.

use crate::config::{AuthConfig, DatabaseConfig, DeploymentConfig, FeatureToggles, ProjectMeta};
use crate::model::ModelDescriptor;
use crate::relationship::RelationshipDescriptor;
use crate::seed::SeedingPlan;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stackforge_core::{DiagnosticCode, Diagnostics, Validatable};
use std::collections::HashSet;

// ============================================================================
// ProjectIr
// ============================================================================

/// Root of the lowered representation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectIr {
    /// Schema version of this document
    pub schema_version: u32,

    /// Project metadata
    pub project: ProjectMeta,

    /// Storage engine settings
    pub database: DatabaseConfig,

    /// Lowered models: declared ones first, synthesized join models after
    pub models: Vec<ModelDescriptor>,

    /// Resolved relationships, in normalization order
    pub relationships: Vec<RelationshipDescriptor>,

    /// Seeding plan, when seeding is enabled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed_plan: Option<SeedingPlan>,

    pub auth: AuthConfig,
    pub features: FeatureToggles,
    pub deployment: DeploymentConfig,

    /// When the document was produced; stamped by callers, never by lowering
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<DateTime<Utc>>,
}

impl ProjectIr {
    /// Create an empty document
    pub fn new(project: ProjectMeta) -> Self {
        Self {
            schema_version: crate::SCHEMA_VERSION,
            project,
            database: DatabaseConfig::default(),
            models: Vec::new(),
            relationships: Vec::new(),
            seed_plan: None,
            auth: AuthConfig::default(),
            features: FeatureToggles::default(),
            deployment: DeploymentConfig::default(),
            generated_at: None,
        }
    }

    /// Stamp the generation time
    pub fn with_generated_at(mut self, at: DateTime<Utc>) -> Self {
        self.generated_at = Some(at);
        self
    }

    // ========================================================================
    // Model queries
    // ========================================================================

    /// Get a model by name
    pub fn model(&self, name: &str) -> Option<&ModelDescriptor> {
        self.models.iter().find(|m| m.name == name)
    }

    /// Check if a model exists
    pub fn has_model(&self, name: &str) -> bool {
        self.models.iter().any(|m| m.name == name)
    }

    /// Number of models, join models included
    pub fn model_count(&self) -> usize {
        self.models.len()
    }

    /// Models that were declared
    pub fn declared_models(&self) -> impl Iterator<Item = &ModelDescriptor> {
        self.models.iter().filter(|m| !m.synthesized)
    }

    /// Join models created by relationship resolution
    pub fn synthesized_models(&self) -> impl Iterator<Item = &ModelDescriptor> {
        self.models.iter().filter(|m| m.synthesized)
    }

    // ========================================================================
    // Relationship queries
    // ========================================================================

    /// Get a relationship by name
    pub fn relationship(&self, name: &str) -> Option<&RelationshipDescriptor> {
        self.relationships.iter().find(|r| r.name == name)
    }

    /// Relationships involving a model
    pub fn relationships_for_model(&self, model: &str) -> Vec<&RelationshipDescriptor> {
        self.relationships
            .iter()
            .filter(|r| r.involves(model))
            .collect()
    }

    /// Number of relationships
    pub fn relationship_count(&self) -> usize {
        self.relationships.len()
    }

    /// Total number of fields across all models
    pub fn field_count(&self) -> usize {
        self.models.iter().map(|m| m.fields.len()).sum()
    }
}

impl Validatable for ProjectIr {
    fn validate_into(&self, path: &str, diagnostics: &mut Diagnostics) {
        let prefix = if path.is_empty() {
            String::new()
        } else {
            format!("{}.", path)
        };

        let mut names: HashSet<String> = HashSet::new();
        for model in &self.models {
            let model_path = format!("{}models.{}", prefix, model.name);
            if !names.insert(model.name.to_lowercase()) {
                diagnostics.error(
                    DiagnosticCode::DuplicateModelName,
                    &model_path,
                    format!("Duplicate model name: '{}' already exists", model.name),
                );
            }
            model.validate_into(&model_path, diagnostics);

            for field in model.reference_fields() {
                if let Some(target) = &field.referenced_model {
                    if !self.has_model(target) {
                        diagnostics.error(
                            DiagnosticCode::UnknownModelReference,
                            format!("{}.fields.{}", model_path, field.name),
                            format!("Unknown model reference: '{}'", target),
                        );
                    }
                }
            }
        }

        for (index, relationship) in self.relationships.iter().enumerate() {
            let rel_path = format!("{}relationships[{}]", prefix, index);
            for endpoint in [&relationship.source_model, &relationship.target_model] {
                if !self.has_model(endpoint) {
                    diagnostics.error(
                        DiagnosticCode::UnknownModelReference,
                        &rel_path,
                        format!("Unknown model reference: '{}'", endpoint),
                    );
                }
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
