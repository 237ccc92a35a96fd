//! Lowering context
//!
//! Built once after model names have been checked. Holds the engine, the
//! API prefix, the auth section and the name index every later stage
//! resolves model references through: first by final name, then by the name
//! as declared.

use crate::suggest::SuggestionSource;
use stackforge_core::StorageEngine;
use stackforge_ir::{AuthConfig, ProjectConfig};
use std::collections::HashMap;

// ============================================================================
// Name records
// ============================================================================

/// A checked model name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelName {
    /// Index into `ProjectConfig::models`
    pub index: usize,
    /// Name as declared
    pub declared: String,
    /// Final PascalCase name
    pub name: String,
    /// Checked field names, declaration order
    pub fields: Vec<FieldName>,
}

impl ModelName {
    pub fn was_rewritten(&self) -> bool {
        self.declared != self.name
    }
}

/// A checked field name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldName {
    /// Index into `RawModel::fields`
    pub index: usize,
    pub declared: String,
    pub name: String,
}

// ============================================================================
// LoweringContext
// ============================================================================

/// Shared, read-only state of one lowering run
pub struct LoweringContext<'a> {
    pub config: &'a ProjectConfig,
    pub engine: StorageEngine,
    pub api_prefix: String,
    pub auth: &'a AuthConfig,
    suggestions: Option<&'a dyn SuggestionSource>,
    models: Vec<ModelName>,
    by_name: HashMap<String, usize>,
    by_declared: HashMap<String, usize>,
}

impl<'a> LoweringContext<'a> {
    /// Index checked model names
    pub fn new(config: &'a ProjectConfig, models: Vec<ModelName>, api_prefix: String) -> Self {
        let mut by_name = HashMap::new();
        let mut by_declared = HashMap::new();
        for (position, model) in models.iter().enumerate() {
            by_name.entry(model.name.clone()).or_insert(position);
            by_declared.entry(model.declared.clone()).or_insert(position);
        }

        Self {
            config,
            engine: config.database.engine,
            api_prefix,
            auth: &config.auth,
            suggestions: None,
            models,
            by_name,
            by_declared,
        }
    }

    /// Consult `source` for fields without explicit constraints
    pub fn with_suggestions(mut self, source: &'a dyn SuggestionSource) -> Self {
        self.suggestions = Some(source);
        self
    }

    pub fn suggestions(&self) -> Option<&'a dyn SuggestionSource> {
        self.suggestions
    }

    /// Checked model names, declaration order
    pub fn models(&self) -> &[ModelName] {
        &self.models
    }

    /// Resolve a reference to a final model name
    pub fn resolve(&self, reference: &str) -> Option<&str> {
        let reference = reference.trim();
        self.by_name
            .get(reference)
            .or_else(|| self.by_declared.get(reference))
            .map(|&position| self.models[position].name.as_str())
    }

    /// Check if a final name is taken, ignoring case
    pub fn is_declared(&self, name: &str) -> bool {
        self.models.iter().any(|m| m.name.eq_ignore_ascii_case(name))
    }

    /// Position of a model in declaration order
    pub fn declaration_index(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }
}

// ============================================================================
// Diagnostic paths
// ============================================================================

/// `models.User`, or `models[3]` for a model without a usable name
pub fn model_path(index: usize, name: &str) -> String {
    if name.trim().is_empty() {
        format!("models[{}]", index)
    } else {
        format!("models.{}", name.trim())
    }
}

/// `models.User.fields.email`
pub fn field_path(model_path: &str, index: usize, name: &str) -> String {
    if name.trim().is_empty() {
        format!("{}.fields[{}]", model_path, index)
    } else {
        format!("{}.fields.{}", model_path, name.trim())
    }
}
