//! Lowered field descriptors
//!
//! A [`FieldDescriptor`] is the fully-resolved form of a field declaration:
//! its declared type mapped to a target and storage type, constraints with
//! their provenance, semantic validator tags and reference metadata.

use serde::{Deserialize, Serialize};
use stackforge_core::naming::is_camel_case;
use stackforge_core::{
    DiagnosticCode, Diagnostics, FieldType, RelationshipId, StorageEngine, Validatable,
    ValidatorTag,
};

/// Field names that collide with ORM or runtime internals
pub const RESERVED_FIELD_NAMES: &[&str] = &[
    "id",
    "_id",
    "__v",
    "__proto__",
    "constructor",
    "prototype",
    "schema",
    "collection",
    "db",
    "modelName",
    "base",
    "isNew",
    "errors",
    "init",
    "save",
    "remove",
    "populate",
    "toJSON",
    "toObject",
];

/// Field names managed automatically when timestamps are on
pub const TIMESTAMP_FIELD_NAMES: &[&str] = &["createdAt", "updatedAt"];

/// Check if a field name is reserved
pub fn is_reserved_field_name(name: &str, timestamps: bool) -> bool {
    RESERVED_FIELD_NAMES.contains(&name) || (timestamps && TIMESTAMP_FIELD_NAMES.contains(&name))
}

/// Check if a field is filled in by the storage layer rather than by callers
pub fn is_auto_managed_field(name: &str) -> bool {
    matches!(name, "id" | "_id" | "createdAt" | "updatedAt")
}

// ============================================================================
// FieldDescriptor
// ============================================================================

/// A lowered field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    /// camelCase identifier, unique within its model
    pub name: String,

    /// Declared type
    pub declared_type: FieldType,

    /// Language-neutral type handed to renderers
    pub target_type: String,

    /// Engine-specific storage type
    pub storage_type: String,

    pub required: bool,
    pub unique: bool,
    pub indexed: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<DefaultValue>,

    #[serde(default)]
    pub constraints: Constraints,

    /// Where the constraints came from
    #[serde(default)]
    pub constraint_source: ConstraintSource,

    /// Ordered semantic validators
    #[serde(default)]
    pub validators: Vec<ValidatorTag>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Name matches the sensitive field vocabulary
    #[serde(default)]
    pub sensitive: bool,

    #[serde(default)]
    pub is_reference: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referenced_model: Option<String>,

    /// Relationship that injected this field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub injected_by: Option<RelationshipId>,
}

impl FieldDescriptor {
    /// Create a field of the given type for an engine
    pub fn new(name: impl Into<String>, declared_type: FieldType, engine: StorageEngine) -> Self {
        Self {
            name: name.into(),
            declared_type,
            target_type: declared_type.target_type().to_string(),
            storage_type: declared_type.storage_type(engine).to_string(),
            required: false,
            unique: false,
            indexed: false,
            default_value: None,
            constraints: Constraints::default(),
            constraint_source: ConstraintSource::None,
            validators: Vec::new(),
            example: None,
            description: None,
            sensitive: false,
            is_reference: declared_type.is_reference(),
            referenced_model: None,
            injected_by: None,
        }
    }

    /// Create a reference (or reference-array) field pointing at `model`
    pub fn reference(
        name: impl Into<String>,
        model: impl Into<String>,
        array: bool,
        engine: StorageEngine,
    ) -> Self {
        let declared_type = if array {
            FieldType::ReferenceArray
        } else {
            FieldType::Reference
        };
        let mut field = Self::new(name, declared_type, engine);
        field.referenced_model = Some(model.into());
        field.indexed = !array;
        field
    }

    // ========================================================================
    // Builder methods
    // ========================================================================

    /// Mark the field as required
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Mark the field as unique
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self.indexed = true; // Unique fields are always indexed
        self
    }

    /// Set a default value
    pub fn with_default(mut self, default: DefaultValue) -> Self {
        self.default_value = Some(default);
        self
    }

    /// Append a validator
    pub fn with_validator(mut self, validator: ValidatorTag) -> Self {
        self.validators.push(validator);
        self
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Record the relationship that injected this field
    pub fn injected_by(mut self, relationship: RelationshipId) -> Self {
        self.injected_by = Some(relationship);
        self
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Whether the field holds a list of references
    pub fn is_reference_array(&self) -> bool {
        self.declared_type == FieldType::ReferenceArray
    }

    /// Whether a validator with the given tag is attached
    pub fn has_validator(&self, tag: &str) -> bool {
        self.validators.iter().any(|v| v.tag() == tag)
    }

    /// Whether this field was added by relationship resolution
    pub fn is_injected(&self) -> bool {
        self.injected_by.is_some()
    }
}

impl Validatable for FieldDescriptor {
    fn validate_into(&self, path: &str, diagnostics: &mut Diagnostics) {
        if !is_camel_case(&self.name) {
            diagnostics.error(
                DiagnosticCode::NamingViolation,
                path,
                format!("Field name '{}' is not camelCase", self.name),
            );
        }

        if RESERVED_FIELD_NAMES.contains(&self.name.as_str()) {
            diagnostics.error(
                DiagnosticCode::ReservedName,
                path,
                format!("Field name '{}' is reserved", self.name),
            );
        }

        if self.is_reference != self.declared_type.is_reference() {
            diagnostics.error(
                DiagnosticCode::SchemaError,
                path,
                format!(
                    "Field '{}' reference flag disagrees with its type '{}'",
                    self.name, self.declared_type
                ),
            );
        }

        if self.is_reference && self.referenced_model.is_none() {
            diagnostics.error(
                DiagnosticCode::UnknownModelReference,
                path,
                format!("Reference field '{}' does not name a model", self.name),
            );
        }
    }
}

// ============================================================================
// Constraints
// ============================================================================

/// Value constraints of a field
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Constraints {
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

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
}

impl Constraints {
    /// Create empty constraints
    pub fn new() -> Self {
        Self::default()
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

    /// Constraints that only allow the given values
    pub fn one_of(values: Vec<String>) -> Self {
        Self {
            enum_values: Some(values),
            ..Default::default()
        }
    }

    /// Check if no constraint is set
    pub fn is_empty(&self) -> bool {
        self.min_length.is_none()
            && self.max_length.is_none()
            && self.min.is_none()
            && self.max.is_none()
            && self.pattern.is_none()
            && self.enum_values.is_none()
    }

    /// Clamp a numeric range to these bounds
    pub fn clamp_range(&self, low: f64, high: f64) -> (f64, f64) {
        let low = self.min.map_or(low, |min| low.max(min));
        let high = self.max.map_or(high, |max| high.min(max));
        if low > high { (low, low) } else { (low, high) }
    }

    /// Validator tags expressing these constraints
    pub fn to_validators(&self) -> Vec<ValidatorTag> {
        let mut validators = Vec::new();
        if let Some(values) = &self.enum_values {
            validators.push(ValidatorTag::IsIn(values.clone()));
            return validators;
        }
        if let Some(n) = self.min_length {
            validators.push(ValidatorTag::MinLength(n));
        }
        if let Some(n) = self.max_length {
            validators.push(ValidatorTag::MaxLength(n));
        }
        if let Some(n) = self.min {
            validators.push(ValidatorTag::Min(n));
        }
        if let Some(n) = self.max {
            validators.push(ValidatorTag::Max(n));
        }
        if let Some(pattern) = &self.pattern {
            validators.push(ValidatorTag::Matches(pattern.clone()));
        }
        validators
    }
}

/// Provenance of a field's constraints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConstraintSource {
    /// Declared in the configuration
    Explicit,
    /// Supplied by a suggestion source
    Suggested,
    /// Built-in smart defaults
    Heuristic,
    /// Derived from enum values
    Enum,
    /// No constraints
    #[default]
    None,
}

impl ConstraintSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConstraintSource::Explicit => "explicit",
            ConstraintSource::Suggested => "suggested",
            ConstraintSource::Heuristic => "heuristic",
            ConstraintSource::Enum => "enum",
            ConstraintSource::None => "none",
        }
    }
}

impl std::fmt::Display for ConstraintSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// DefaultValue
// ============================================================================

/// Type-checked default values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "kebab-case")]
pub enum DefaultValue {
    /// Null value
    Null,
    /// Boolean value
    Bool(bool),
    /// Numeric value
    Number(f64),
    /// String value (also enum members)
    String(String),
    /// Current timestamp
    Now,
    /// ISO-8601 date or datetime literal
    Date(String),
    /// List of strings
    StringList(Vec<String>),
    /// Empty array
    EmptyArray,
    /// JSON literal
    Json(serde_json::Value),
}

impl DefaultValue {
    /// Render the default as a JSON literal; `Now` renders as `"now"`
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value;
        match self {
            DefaultValue::Null => Value::Null,
            DefaultValue::Bool(v) => Value::Bool(*v),
            DefaultValue::Number(v) => serde_json::Number::from_f64(*v)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            DefaultValue::String(v) | DefaultValue::Date(v) => Value::String(v.clone()),
            DefaultValue::Now => Value::String("now".to_string()),
            DefaultValue::StringList(items) => {
                Value::Array(items.iter().cloned().map(Value::String).collect())
            }
            DefaultValue::EmptyArray => Value::Array(Vec::new()),
            DefaultValue::Json(v) => v.clone(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
