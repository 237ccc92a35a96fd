//! Resolved relationships between models
//!
//! A [`RelationshipDescriptor`] is the resolved form of a relationship
//! declaration. Resolution also produces [`FieldInjection`] instructions,
//! which say which reference field lands on which model; applying them is a
//! separate step that may skip instructions ([`SkippedInjection`]).

use crate::field::FieldDescriptor;
use serde::{Deserialize, Serialize};
use stackforge_core::{RelationKind, RelationshipId};
use uuid::Uuid;

// ============================================================================
// RelationshipDescriptor
// ============================================================================

/// A resolved relationship
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipDescriptor {
    /// Name-based id, stable across runs for the same declaration
    pub id: RelationshipId,

    /// Human-readable name (e.g., "UserPosts")
    pub name: String,

    pub kind: RelationKind,
    pub source_model: String,
    pub target_model: String,

    /// Field holding the relation on the source side
    pub field_name: String,

    /// Name of the relation seen from the target
    pub inverse_name: String,

    /// Declared join model name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub through: Option<String>,

    /// Lowered join attributes (many-to-many only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<FieldDescriptor>,

    /// Join model carrying the attributes, when one was synthesized
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join_model: Option<String>,

    /// Model that received the reference field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub injected_into: Option<String>,

    /// Name of the reference field that was injected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub injected_field: Option<String>,

    #[serde(default)]
    pub self_referential: bool,
}

impl RelationshipDescriptor {
    /// Create a descriptor; the id is derived from kind, endpoints and field name
    pub fn new(
        kind: RelationKind,
        source_model: impl Into<String>,
        target_model: impl Into<String>,
        field_name: impl Into<String>,
    ) -> Self {
        let source_model = source_model.into();
        let target_model = target_model.into();
        let field_name = field_name.into();

        Self {
            id: relationship_id(kind, &source_model, &target_model, &field_name),
            name: crate::relationship_helpers::relationship_name(&source_model, &target_model),
            inverse_name: crate::relationship_helpers::inverse_name(kind, &source_model),
            self_referential: source_model == target_model,
            kind,
            source_model,
            target_model,
            field_name,
            through: None,
            attributes: Vec::new(),
            join_model: None,
            injected_into: None,
            injected_field: None,
        }
    }

    /// Set the join model
    pub fn with_join_model(mut self, join_model: impl Into<String>) -> Self {
        self.join_model = Some(join_model.into());
        self
    }

    /// Record where the reference field landed
    pub fn injected(mut self, model: impl Into<String>, field: impl Into<String>) -> Self {
        self.injected_into = Some(model.into());
        self.injected_field = Some(field.into());
        self
    }

    /// Check if this relationship involves a model
    pub fn involves(&self, model: &str) -> bool {
        self.source_model == model || self.target_model == model
    }

    /// Get the other model in the relationship
    pub fn other_model(&self, model: &str) -> Option<&str> {
        if self.source_model == model {
            Some(&self.target_model)
        } else if self.target_model == model {
            Some(&self.source_model)
        } else {
            None
        }
    }

    /// One-line summary, e.g. `User 1 ───< * Post (posts)`
    pub fn summary(&self) -> String {
        format!(
            "{} {} {} ({})",
            self.source_model,
            self.kind.arrow_symbol(),
            self.target_model,
            self.field_name
        )
    }
}

/// Deterministic id of a relationship
pub fn relationship_id(
    kind: RelationKind,
    source: &str,
    target: &str,
    field_name: &str,
) -> RelationshipId {
    let key = format!("stackforge:{}:{}:{}:{}", kind.as_str(), source, target, field_name);
    Uuid::new_v5(&Uuid::NAMESPACE_OID, key.as_bytes())
}

// ============================================================================
// Field injection
// ============================================================================

/// Instruction to add a reference field to a model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldInjection {
    /// Relationship the field comes from
    pub relationship_id: RelationshipId,

    /// Model receiving the field
    pub model: String,

    /// Field to add
    pub field: FieldDescriptor,
}

impl FieldInjection {
    pub fn new(relationship_id: RelationshipId, model: impl Into<String>, field: FieldDescriptor) -> Self {
        Self {
            relationship_id,
            model: model.into(),
            field,
        }
    }
}

/// Injection that was not applied
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedInjection {
    pub relationship_id: RelationshipId,
    pub model: String,
    pub field_name: String,
    pub reason: SkipReason,
}

/// Why an injection was skipped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkipReason {
    /// The model already has a field with that name
    FieldExists,
    /// The model is not part of the lowered set
    UnknownModel,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::FieldExists => write!(f, "field already exists"),
            SkipReason::UnknownModel => write!(f, "unknown model"),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_derives_names() {
        let rel = RelationshipDescriptor::new(RelationKind::OneToMany, "User", "Post", "posts");
        assert_eq!(rel.name, "UserPosts");
        assert_eq!(rel.inverse_name, "user");
        assert!(!rel.self_referential);
        assert!(rel.involves("Post"));
        assert_eq!(rel.other_model("User"), Some("Post"));
        assert_eq!(rel.other_model("Tag"), None);
    }

    #[test]
    fn test_id_is_deterministic() {
        let a = RelationshipDescriptor::new(RelationKind::ManyToMany, "Post", "Tag", "tags");
        let b = RelationshipDescriptor::new(RelationKind::ManyToMany, "Post", "Tag", "tags");
        let c = RelationshipDescriptor::new(RelationKind::OneToMany, "Post", "Tag", "tags");
        assert_eq!(a.id, b.id);
        assert_ne!(a.id, c.id);
        assert_eq!(a.id.get_version_num(), 5);
    }

    #[test]
    fn test_self_referential() {
        let rel = RelationshipDescriptor::new(RelationKind::ManyToOne, "Employee", "Employee", "manager");
        assert!(rel.self_referential);
        assert_eq!(rel.inverse_name, "employees");
    }

    #[test]
    fn test_summary() {
        let rel = RelationshipDescriptor::new(RelationKind::OneToMany, "User", "Post", "posts");
        assert_eq!(rel.summary(), "User 1 ───< * Post (posts)");
    }
}
