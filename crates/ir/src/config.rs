//! Declarative project configuration
//!
//! These are the raw, unlowered declarations a user (or the configuration
//! UI) writes. Every section has defaults so a minimal document only needs
//! a project name and one model:
//!
//! ```json
//! {
//!   "project": { "name": "blog" },
//!   "models": [{ "name": "User", "fields": [{ "name": "email", "type": "string" }] }]
//! }
//! ```
//!
//! Keys are camelCase in both JSON and TOML.

use serde::{Deserialize, Serialize};
use stackforge_core::{RelationKind, StorageEngine};

// ============================================================================
// ProjectConfig
// ============================================================================

/// Root of a declarative project description
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectConfig {
    /// Project metadata
    pub project: ProjectMeta,

    /// Storage engine settings
    pub database: DatabaseConfig,

    /// Data models, in declaration order
    pub models: Vec<RawModel>,

    /// Project-level relationship declarations
    pub relationships: Vec<RawRelationship>,

    /// Authentication settings
    pub auth: AuthConfig,

    /// Feature toggles
    pub features: FeatureToggles,

    /// Deployment settings
    pub deployment: DeploymentConfig,

    /// Schema version the document was written against
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<u32>,
}

impl ProjectConfig {
    /// Create an empty configuration with the given project name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            project: ProjectMeta::new(name),
            ..Default::default()
        }
    }

    /// Add a model
    pub fn with_model(mut self, model: RawModel) -> Self {
        self.models.push(model);
        self
    }

    /// Add a project-level relationship
    pub fn with_relationship(mut self, relationship: RawRelationship) -> Self {
        self.relationships.push(relationship);
        self
    }

    /// Set the storage engine
    pub fn with_engine(mut self, engine: StorageEngine) -> Self {
        self.database.engine = engine;
        self
    }

    /// Find a declared model by its declared name
    pub fn model(&self, name: &str) -> Option<&RawModel> {
        self.models.iter().find(|m| m.name == name)
    }

    /// Total number of relationship declarations, inline ones included
    pub fn relationship_count(&self) -> usize {
        self.relationships.len()
            + self
                .models
                .iter()
                .map(|m| m.relationships.len())
                .sum::<usize>()
    }
}

// ============================================================================
// ProjectMeta
// ============================================================================

/// Project metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectMeta {
    /// Project name
    pub name: String,

    /// Project description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Project author
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    /// Project version
    pub version: String,
}

impl ProjectMeta {
    /// Create new metadata with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the author
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }
}

impl Default for ProjectMeta {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: None,
            author: None,
            version: "0.1.0".to_string(),
        }
    }
}

// ============================================================================
// DatabaseConfig
// ============================================================================

/// Storage engine choice
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DatabaseConfig {
    /// Target engine
    pub engine: StorageEngine,

    /// Database name; defaults to the snake_case project name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl DatabaseConfig {
    /// Settings for a specific engine
    pub fn for_engine(engine: StorageEngine) -> Self {
        Self { engine, name: None }
    }
}

// ============================================================================
// RawModel
// ============================================================================

/// A model as declared
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawModel {
    /// Declared name; rewritten to PascalCase during lowering if needed
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Field declarations, in order
    #[serde(default)]
    pub fields: Vec<RawField>,

    /// Whether `createdAt`/`updatedAt` are managed automatically
    #[serde(default = "default_true")]
    pub timestamps: bool,

    /// Inline relationship declarations; `source` defaults to this model
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub relationships: Vec<RawRelationship>,
}

impl RawModel {
    /// Create a model declaration with timestamps on
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            fields: Vec::new(),
            timestamps: true,
            relationships: Vec::new(),
        }
    }

    /// Add a field
    pub fn with_field(mut self, field: RawField) -> Self {
        self.fields.push(field);
        self
    }

    /// Add an inline relationship
    pub fn with_relationship(mut self, relationship: RawRelationship) -> Self {
        self.relationships.push(relationship);
        self
    }

    /// Turn automatic timestamps off
    pub fn without_timestamps(mut self) -> Self {
        self.timestamps = false;
        self
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

// ============================================================================
// RawField
// ============================================================================

/// A field as declared
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawField {
    pub name: String,

    /// Declared type name, parsed case-insensitively during lowering
    #[serde(rename = "type")]
    pub field_type: String,

    #[serde(default)]
    pub required: bool,

    #[serde(default)]
    pub unique: bool,

    #[serde(default)]
    pub indexed: bool,

    /// Literal default value, type-checked during lowering
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    /// Allowed values for `enum` fields
    #[serde(default, alias = "values", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,

    /// Referenced model for `reference`/`reference-array` fields
    #[serde(default, rename = "ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl RawField {
    /// Create a field declaration
    pub fn new(name: impl Into<String>, field_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: field_type.into(),
            ..Default::default()
        }
    }

    /// Mark as required
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Mark as unique
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Set a default value
    pub fn with_default(mut self, value: serde_json::Value) -> Self {
        self.default = Some(value);
        self
    }

    /// Set length bounds
    pub fn with_length(mut self, min: Option<usize>, max: Option<usize>) -> Self {
        self.min_length = min;
        self.max_length = max;
        self
    }

    /// Set numeric bounds
    pub fn with_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    /// Set a regex pattern
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    /// Set enum values
    pub fn with_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enum_values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// Point a reference field at a model
    pub fn references(mut self, model: impl Into<String>) -> Self {
        self.reference = Some(model.into());
        self
    }

    /// Whether any explicit length/range/pattern constraint is declared
    pub fn has_explicit_constraints(&self) -> bool {
        self.min_length.is_some()
            || self.max_length.is_some()
            || self.min.is_some()
            || self.max.is_some()
            || self.pattern.is_some()
    }
}

// ============================================================================
// RawRelationship
// ============================================================================

/// A relationship as declared
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRelationship {
    /// Relationship kind
    #[serde(rename = "type", alias = "kind")]
    pub kind: RelationKind,

    /// Source model; inferred from the owning model for inline declarations
    #[serde(default, alias = "sourceModel", skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// Target model
    #[serde(alias = "targetModel")]
    pub target: String,

    /// Name of the field that holds the reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_name: Option<String>,

    /// Name of the injected field for one-to-many relationships
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_key: Option<String>,

    /// Name of the join model for many-to-many relationships with attributes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub through: Option<String>,

    /// Extra columns carried on the join model
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<RawField>,
}

impl RawRelationship {
    /// Create a relationship declaration
    pub fn new(kind: RelationKind, source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            kind,
            source: Some(source.into()),
            target: target.into(),
            field_name: None,
            foreign_key: None,
            through: None,
            attributes: Vec::new(),
        }
    }

    /// Create an inline declaration whose source is the owning model
    pub fn inline(kind: RelationKind, target: impl Into<String>) -> Self {
        Self {
            source: None,
            ..Self::new(kind, "", target)
        }
    }

    /// Set the field name
    pub fn with_field_name(mut self, name: impl Into<String>) -> Self {
        self.field_name = Some(name.into());
        self
    }

    /// Set the one-to-many foreign key name
    pub fn with_foreign_key(mut self, name: impl Into<String>) -> Self {
        self.foreign_key = Some(name.into());
        self
    }

    /// Set the join model name
    pub fn through(mut self, name: impl Into<String>) -> Self {
        self.through = Some(name.into());
        self
    }

    /// Add a join attribute
    pub fn with_attribute(mut self, attribute: RawField) -> Self {
        self.attributes.push(attribute);
        self
    }
}

// ============================================================================
// AuthConfig
// ============================================================================

/// Authentication settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuthConfig {
    /// Whether authentication is enabled
    pub enabled: bool,

    /// Authentication strategy
    pub strategy: AuthStrategy,

    /// Model that stores user accounts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_model: Option<String>,

    /// Role allowed to perform every restricted operation
    pub admin_role: String,

    /// Role allowed to create and update medium-sensitivity models
    pub manager_role: String,

    /// Role assigned to new accounts
    pub default_role: String,

    /// Token expiration time in hours
    pub token_expiry_hours: u32,
}

impl AuthConfig {
    /// Create config with JWT authentication
    pub fn jwt() -> Self {
        Self::default()
    }

    /// Create config with no authentication
    pub fn none() -> Self {
        Self {
            enabled: false,
            strategy: AuthStrategy::None,
            ..Default::default()
        }
    }

    /// Set the user model
    pub fn with_user_model(mut self, model: impl Into<String>) -> Self {
        self.user_model = Some(model.into());
        self
    }

    /// Override the admin and manager role names
    pub fn with_roles(mut self, admin: impl Into<String>, manager: impl Into<String>) -> Self {
        self.admin_role = admin.into();
        self.manager_role = manager.into();
        self
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            strategy: AuthStrategy::Jwt,
            user_model: None,
            admin_role: "admin".to_string(),
            manager_role: "manager".to_string(),
            default_role: "user".to_string(),
            token_expiry_hours: 24,
        }
    }
}

// ============================================================================
// AuthStrategy
// ============================================================================

/// Authentication strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum AuthStrategy {
    /// No authentication
    None,
    /// JWT token-based authentication
    #[default]
    Jwt,
    /// Session-based authentication
    Session,
    /// API Key authentication
    ApiKey,
}

impl AuthStrategy {
    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            AuthStrategy::None => "None",
            AuthStrategy::Jwt => "JWT",
            AuthStrategy::Session => "Session",
            AuthStrategy::ApiKey => "API Key",
        }
    }

    /// Get all strategies
    pub fn all() -> &'static [AuthStrategy] {
        &[
            AuthStrategy::None,
            AuthStrategy::Jwt,
            AuthStrategy::Session,
            AuthStrategy::ApiKey,
        ]
    }
}

impl std::fmt::Display for AuthStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// FeatureToggles
// ============================================================================

/// Optional features of the generated backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FeatureToggles {
    /// Plan synthetic seed data
    pub seeding: bool,

    /// Records to plan per model
    pub seed_count: usize,

    /// Prefix of every route path
    pub api_prefix: String,

    /// Enable OpenAPI documentation
    pub openapi: bool,

    /// Enable CORS
    pub cors: bool,

    /// Paginate list endpoints
    pub pagination: bool,

    /// Mark records deleted instead of removing them
    pub soft_delete: bool,
}

impl Default for FeatureToggles {
    fn default() -> Self {
        Self {
            seeding: false,
            seed_count: 10,
            api_prefix: "/api".to_string(),
            openapi: true,
            cors: true,
            pagination: true,
            soft_delete: false,
        }
    }
}

// ============================================================================
// DeploymentConfig
// ============================================================================

/// Deployment settings passed through to renderers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeploymentConfig {
    /// Emit container files
    pub docker: bool,

    /// Emit a CI workflow
    pub ci: bool,

    /// Server bind host
    pub host: String,

    /// Server port
    pub port: u16,
}

impl Default for DeploymentConfig {
    fn default() -> Self {
        Self {
            docker: false,
            ci: false,
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

fn default_true() -> bool {
    true
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_minimal_json_gets_defaults() {
        let json = r#"{
            "project": { "name": "blog" },
            "models": [{ "name": "User", "fields": [{ "name": "email", "type": "string" }] }]
        }"#;
        let config: ProjectConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.project.name, "blog");
        assert_eq!(config.project.version, "0.1.0");
        assert_eq!(config.database.engine, StorageEngine::MongoDb);
        assert!(config.models[0].timestamps);
        assert_eq!(config.features.seed_count, 10);
        assert_eq!(config.features.api_prefix, "/api");
        assert_eq!(config.auth.admin_role, "admin");
        assert_eq!(config.deployment.port, 8080);
        assert_eq!(config.schema_version, None);
    }

    #[test]
    fn test_relationship_aliases() {
        let json = r#"{
            "type": "many-to-many",
            "sourceModel": "Post",
            "targetModel": "Tag",
            "fieldName": "tags"
        }"#;
        let rel: RawRelationship = serde_json::from_str(json).unwrap();
        assert_eq!(rel.kind, RelationKind::ManyToMany);
        assert_eq!(rel.source.as_deref(), Some("Post"));
        assert_eq!(rel.target, "Tag");
        assert_eq!(rel.field_name.as_deref(), Some("tags"));
        assert!(rel.attributes.is_empty());
    }

    #[test]
    fn test_field_keys() {
        let json = r#"{
            "name": "status",
            "type": "enum",
            "values": ["draft", "published"],
            "default": "draft"
        }"#;
        let field: RawField = serde_json::from_str(json).unwrap();
        assert_eq!(field.field_type, "enum");
        assert_eq!(
            field.enum_values,
            Some(vec!["draft".to_string(), "published".to_string()])
        );
        assert_eq!(field.default, Some(serde_json::json!("draft")));
        assert!(!field.has_explicit_constraints());

        let field: RawField =
            serde_json::from_str(r#"{ "name": "author", "type": "reference", "ref": "User" }"#)
                .unwrap();
        assert_eq!(field.reference.as_deref(), Some("User"));
    }

    #[test]
    fn test_toml_config() {
        let toml_src = r#"
            [project]
            name = "shop"

            [database]
            engine = "postgres"

            [[models]]
            name = "Product"
            timestamps = false

            [[models.fields]]
            name = "price"
            type = "number"
            min = 0.0

            [[models.relationships]]
            type = "many-to-one"
            target = "Category"
        "#;
        let config: ProjectConfig = toml::from_str(toml_src).unwrap();
        assert_eq!(config.database.engine, StorageEngine::PostgreSql);
        let product = config.model("Product").unwrap();
        assert!(!product.timestamps);
        assert_eq!(product.fields[0].min, Some(0.0));
        assert!(product.fields[0].has_explicit_constraints());
        assert_eq!(product.relationships[0].source, None);
        assert_eq!(config.relationship_count(), 1);
    }

    #[test]
    fn test_builders() {
        let config = ProjectConfig::new("blog")
            .with_engine(StorageEngine::Sqlite)
            .with_model(
                RawModel::new("Post")
                    .with_field(RawField::new("title", "string").required())
                    .with_relationship(RawRelationship::inline(RelationKind::ManyToOne, "User")),
            )
            .with_relationship(RawRelationship::new(
                RelationKind::OneToMany,
                "User",
                "Comment",
            ));

        assert_eq!(config.models.len(), 1);
        assert_eq!(config.relationship_count(), 2);
        assert!(config.models[0].fields[0].required);
    }

    #[test]
    fn test_auth_defaults() {
        let auth = AuthConfig::default();
        assert!(auth.enabled);
        assert_eq!(auth.strategy, AuthStrategy::Jwt);
        assert_eq!(auth.manager_role, "manager");

        let auth = AuthConfig::none();
        assert!(!auth.enabled);
        assert_eq!(auth.strategy.display_name(), "None");
    }
}
