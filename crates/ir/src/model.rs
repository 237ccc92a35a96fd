//! Lowered model descriptors
//!
//! A [`ModelDescriptor`] carries everything a renderer needs to emit one
//! resource: its canonical name and every derived spelling, route path,
//! DTO names, lowered fields and the inferred access policy.

use crate::field::FieldDescriptor;
use serde::{Deserialize, Serialize};
use stackforge_core::naming::{
    is_pascal_case, pluralize, to_camel_case, to_kebab_case, to_snake_case,
};
use stackforge_core::{DiagnosticCode, Diagnostics, Sensitivity, Validatable};
use std::collections::HashSet;

/// Model names that shadow built-in types of common runtimes and ORMs
pub const RESERVED_MODEL_NAMES: &[&str] = &[
    "Document",
    "Model",
    "Schema",
    "Query",
    "Error",
    "Object",
    "Array",
    "String",
    "Number",
    "Boolean",
    "Date",
    "Promise",
    "Function",
    "Map",
    "Set",
    "Symbol",
    "Buffer",
    "Aggregate",
    "Connection",
    "Types",
];

/// Prefix applied to model names that shadow built-in types
pub const RESERVED_MODEL_PREFIX: &str = "App";

/// Check if a model name is reserved
pub fn is_reserved_model_name(name: &str) -> bool {
    RESERVED_MODEL_NAMES.contains(&name)
}

// ============================================================================
// ModelDescriptor
// ============================================================================

/// A lowered model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelDescriptor {
    /// PascalCase name, unique across the project
    pub name: String,

    /// Name as declared, when lowering rewrote it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_name: Option<String>,

    pub camel_name: String,
    pub kebab_name: String,
    pub snake_name: String,
    pub plural_pascal: String,
    pub plural_camel: String,
    pub plural_kebab: String,

    /// snake_case plural storage name
    pub collection_name: String,

    /// Route path, e.g. `/api/blog-posts`
    pub route_path: String,

    /// Lowered fields, declaration order, injected fields last
    pub fields: Vec<FieldDescriptor>,

    /// Whether `createdAt`/`updatedAt` are managed automatically
    pub timestamps: bool,

    pub dtos: DtoNames,

    pub access_policy: AccessPolicy,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// True for join models created by relationship resolution
    #[serde(default)]
    pub synthesized: bool,
}

impl ModelDescriptor {
    /// Create a model, deriving every name from `name`
    pub fn new(name: impl Into<String>, api_prefix: &str) -> Self {
        let name = name.into();
        let plural = pluralize(&name);
        let plural_kebab = to_kebab_case(&plural);

        Self {
            camel_name: to_camel_case(&name),
            kebab_name: to_kebab_case(&name),
            snake_name: to_snake_case(&name),
            plural_camel: to_camel_case(&plural),
            collection_name: to_snake_case(&plural),
            route_path: route_path(api_prefix, &plural_kebab),
            plural_kebab,
            plural_pascal: plural,
            dtos: DtoNames::for_model(&name),
            name,
            original_name: None,
            fields: Vec::new(),
            timestamps: true,
            access_policy: AccessPolicy::unrestricted(),
            description: None,
            synthesized: false,
        }
    }

    // ========================================================================
    // Builder methods
    // ========================================================================

    /// Record the declared name when it differs from the final one
    pub fn with_original_name(mut self, original: impl Into<String>) -> Self {
        let original = original.into();
        if original != self.name {
            self.original_name = Some(original);
        }
        self
    }

    /// Add a field
    pub fn with_field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// Set whether timestamps are managed
    pub fn with_timestamps(mut self, timestamps: bool) -> Self {
        self.timestamps = timestamps;
        self
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Mark as a synthesized join model
    pub fn synthesized(mut self) -> Self {
        self.synthesized = true;
        self
    }

    // ========================================================================
    // Field queries
    // ========================================================================

    /// Get a field by name
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Check if a field with this name exists
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name == name)
    }

    /// Field names, in order
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    /// Fields that point at another model
    pub fn reference_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|f| f.is_reference)
    }

    /// Models this one references, excluding itself, first occurrence order
    pub fn dependencies(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.reference_fields()
            .filter_map(|f| f.referenced_model.as_deref())
            .filter(|target| *target != self.name)
            .filter(|target| seen.insert(*target))
            .collect()
    }

    /// Check if any field references `model`
    pub fn references(&self, model: &str) -> bool {
        self.reference_fields()
            .any(|f| f.referenced_model.as_deref() == Some(model))
    }

    /// Fields flagged as sensitive
    pub fn sensitive_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|f| f.sensitive)
    }
}

impl Validatable for ModelDescriptor {
    fn validate_into(&self, path: &str, diagnostics: &mut Diagnostics) {
        if !is_pascal_case(&self.name) {
            diagnostics.error(
                DiagnosticCode::NamingViolation,
                path,
                format!("Model name '{}' is not PascalCase", self.name),
            );
        }

        if is_reserved_model_name(&self.name) {
            diagnostics.error(
                DiagnosticCode::ReservedName,
                path,
                format!("Model name '{}' is reserved", self.name),
            );
        }

        let mut seen: HashSet<&str> = HashSet::new();
        for field in &self.fields {
            let field_path = format!("{}.fields.{}", path, field.name);
            if !seen.insert(field.name.as_str()) {
                diagnostics.error(
                    DiagnosticCode::DuplicateFieldName,
                    &field_path,
                    format!(
                        "Duplicate field name: '{}' already exists in model '{}'",
                        field.name, self.name
                    ),
                );
            }
            if self.timestamps && crate::field::TIMESTAMP_FIELD_NAMES.contains(&field.name.as_str())
            {
                diagnostics.error(
                    DiagnosticCode::ReservedName,
                    &field_path,
                    format!("Field '{}' is managed by timestamps", field.name),
                );
            }
            field.validate_into(&field_path, diagnostics);
        }
    }
}

fn route_path(api_prefix: &str, segment: &str) -> String {
    let prefix = api_prefix.trim_end_matches('/');
    if prefix.is_empty() {
        format!("/{}", segment)
    } else if prefix.starts_with('/') {
        format!("{}/{}", prefix, segment)
    } else {
        format!("/{}/{}", prefix, segment)
    }
}

// ============================================================================
// DtoNames
// ============================================================================

/// Names of the create/update/output transfer objects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DtoNames {
    pub create: String,
    pub update: String,
    pub response: String,
}

impl DtoNames {
    /// Derive the DTO names of a model
    pub fn for_model(name: &str) -> Self {
        Self {
            create: format!("Create{}Dto", name),
            update: format!("Update{}Dto", name),
            response: format!("{}ResponseDto", name),
        }
    }
}

// ============================================================================
// Access policy
// ============================================================================

/// CRUD operations covered by an access policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrudOperation {
    Create,
    Read,
    Update,
    Delete,
}

impl CrudOperation {
    /// Get a user-friendly display name
    pub fn display_name(&self) -> &'static str {
        match self {
            CrudOperation::Create => "Create",
            CrudOperation::Read => "Read",
            CrudOperation::Update => "Update",
            CrudOperation::Delete => "Delete",
        }
    }

    /// Get all operations
    pub fn all() -> &'static [CrudOperation] {
        &[
            CrudOperation::Create,
            CrudOperation::Read,
            CrudOperation::Update,
            CrudOperation::Delete,
        ]
    }
}

impl std::fmt::Display for CrudOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Roles allowed to perform each write operation.
///
/// An empty role list means the operation is not role-restricted. Read has
/// no list: it is never restricted by lowering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessPolicy {
    pub sensitivity: Sensitivity,
    pub create: Vec<String>,
    pub update: Vec<String>,
    pub delete: Vec<String>,

    /// Signals that raised the sensitivity, e.g. `field:creditCardNumber`
    #[serde(default)]
    pub reasons: Vec<String>,
}

impl AccessPolicy {
    /// Policy without any role restriction
    pub fn unrestricted() -> Self {
        Self::default()
    }

    /// Roles allowed to perform `operation`; empty when unrestricted
    pub fn roles_for(&self, operation: CrudOperation) -> &[String] {
        match operation {
            CrudOperation::Create => &self.create,
            CrudOperation::Read => &[],
            CrudOperation::Update => &self.update,
            CrudOperation::Delete => &self.delete,
        }
    }

    /// Whether `operation` needs one of a set of roles
    pub fn is_restricted(&self, operation: CrudOperation) -> bool {
        !self.roles_for(operation).is_empty()
    }

    /// Whether `role` may perform `operation`
    pub fn allows(&self, role: &str, operation: CrudOperation) -> bool {
        let roles = self.roles_for(operation);
        roles.is_empty() || roles.iter().any(|r| r == role)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldDescriptor;
    use pretty_assertions::assert_eq;
    use stackforge_core::{FieldType, StorageEngine};

    fn field(name: &str) -> FieldDescriptor {
        FieldDescriptor::new(name, FieldType::String, StorageEngine::MongoDb)
    }

    #[test]
    fn test_derived_names() {
        let model = ModelDescriptor::new("BlogPost", "/api");
        assert_eq!(model.camel_name, "blogPost");
        assert_eq!(model.kebab_name, "blog-post");
        assert_eq!(model.snake_name, "blog_post");
        assert_eq!(model.plural_pascal, "BlogPosts");
        assert_eq!(model.plural_camel, "blogPosts");
        assert_eq!(model.plural_kebab, "blog-posts");
        assert_eq!(model.collection_name, "blog_posts");
        assert_eq!(model.route_path, "/api/blog-posts");
        assert_eq!(model.dtos.create, "CreateBlogPostDto");
        assert_eq!(model.dtos.update, "UpdateBlogPostDto");
        assert_eq!(model.dtos.response, "BlogPostResponseDto");
    }

    #[test]
    fn test_irregular_plural_names() {
        let model = ModelDescriptor::new("Person", "/api/");
        assert_eq!(model.plural_pascal, "People");
        assert_eq!(model.collection_name, "people");
        assert_eq!(model.route_path, "/api/people");

        let model = ModelDescriptor::new("Category", "");
        assert_eq!(model.route_path, "/categories");

        let model = ModelDescriptor::new("Class", "v1");
        assert_eq!(model.route_path, "/v1/classes");
    }

    #[test]
    fn test_original_name_only_when_rewritten() {
        let model = ModelDescriptor::new("User", "/api").with_original_name("User");
        assert_eq!(model.original_name, None);

        let model = ModelDescriptor::new("BlogPost", "/api").with_original_name("blog_post");
        assert_eq!(model.original_name.as_deref(), Some("blog_post"));
    }

    #[test]
    fn test_dependencies_skip_self_and_duplicates() {
        let model = ModelDescriptor::new("Comment", "/api")
            .with_field(field("body"))
            .with_field(FieldDescriptor::reference(
                "authorId",
                "User",
                false,
                StorageEngine::MongoDb,
            ))
            .with_field(FieldDescriptor::reference(
                "editorId",
                "User",
                false,
                StorageEngine::MongoDb,
            ))
            .with_field(FieldDescriptor::reference(
                "parentId",
                "Comment",
                false,
                StorageEngine::MongoDb,
            ));

        assert_eq!(model.dependencies(), vec!["User"]);
        assert!(model.references("Comment"));
        assert_eq!(model.reference_fields().count(), 3);
    }

    #[test]
    fn test_validate_model() {
        let model = ModelDescriptor::new("User", "/api").with_field(field("email"));
        assert!(model.is_valid());

        let model = ModelDescriptor::new("User", "/api")
            .with_field(field("email"))
            .with_field(field("email"));
        let diagnostics = model.validate("models.User");
        assert_eq!(
            diagnostics
                .with_code(DiagnosticCode::DuplicateFieldName)
                .count(),
            1
        );

        let model = ModelDescriptor::new("Document", "/api");
        assert!(!model.is_valid());

        let model = ModelDescriptor::new("Audit", "/api").with_field(field("createdAt"));
        assert!(!model.is_valid());
        let model = model.with_timestamps(false);
        assert!(model.is_valid());
    }

    #[test]
    fn test_access_policy() {
        let open = AccessPolicy::unrestricted();
        for op in CrudOperation::all() {
            assert!(!open.is_restricted(*op));
            assert!(open.allows("guest", *op));
        }

        let locked = AccessPolicy {
            sensitivity: Sensitivity::High,
            create: vec!["admin".to_string()],
            update: vec!["admin".to_string()],
            delete: vec!["admin".to_string()],
            reasons: vec!["field:password".to_string()],
        };
        assert!(locked.is_restricted(CrudOperation::Delete));
        assert!(!locked.is_restricted(CrudOperation::Read));
        assert!(locked.allows("admin", CrudOperation::Create));
        assert!(!locked.allows("user", CrudOperation::Create));
        assert!(locked.allows("user", CrudOperation::Read));
    }
}
