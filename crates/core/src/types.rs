//! Core types used throughout Stackforge
//!
//! This module contains the closed vocabularies that lowering matches on:
//! declared field types, storage engines, relationship kinds, sensitivity
//! tiers and semantic validator tags.

use serde::{Deserialize, Serialize};

// ============================================================================
// Unique Identifiers
// ============================================================================

/// Type alias for relationship identifiers (name-based UUID v5)
pub type RelationshipId = uuid::Uuid;

// ============================================================================
// Field Types
// ============================================================================

/// Field types a model declaration may use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldType {
    /// Short text
    String,
    /// Integer or floating point number
    Number,
    /// Boolean true/false
    Boolean,
    /// Calendar date without time
    Date,
    /// Date and time with timezone
    #[serde(rename = "datetime")]
    DateTime,
    /// List of strings
    StringArray,
    /// Free-form JSON object
    Json,
    /// List of JSON objects
    JsonArray,
    /// Reference to one record of another model
    Reference,
    /// References to many records of another model
    ReferenceArray,
    /// One value out of a fixed set
    Enum,
}

impl FieldType {
    /// Parse a declared type name (case-insensitive, common aliases accepted)
    pub fn parse(declared: &str) -> Option<FieldType> {
        let normalized = declared.trim().to_ascii_lowercase();
        let field_type = match normalized.as_str() {
            "string" | "str" | "text" => FieldType::String,
            "number" | "int" | "integer" | "float" | "double" | "decimal" => FieldType::Number,
            "boolean" | "bool" => FieldType::Boolean,
            "date" => FieldType::Date,
            "datetime" | "date-time" | "timestamp" => FieldType::DateTime,
            "string[]" | "string-array" | "[string]" | "array" => FieldType::StringArray,
            "json" | "object" | "mixed" => FieldType::Json,
            "json[]" | "json-array" | "[json]" | "[object]" => FieldType::JsonArray,
            "reference" | "ref" | "objectid" => FieldType::Reference,
            "reference[]" | "reference-array" | "[reference]" | "[objectid]" => {
                FieldType::ReferenceArray
            }
            "enum" => FieldType::Enum,
            _ => return None,
        };
        Some(field_type)
    }

    /// Canonical kebab-case name
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::Date => "date",
            FieldType::DateTime => "datetime",
            FieldType::StringArray => "string-array",
            FieldType::Json => "json",
            FieldType::JsonArray => "json-array",
            FieldType::Reference => "reference",
            FieldType::ReferenceArray => "reference-array",
            FieldType::Enum => "enum",
        }
    }

    /// Language-neutral target type handed to renderers
    pub fn target_type(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::Date => "date",
            FieldType::DateTime => "datetime",
            FieldType::StringArray => "list<string>",
            FieldType::Json => "object",
            FieldType::JsonArray => "list<object>",
            FieldType::Reference => "ref",
            FieldType::ReferenceArray => "list<ref>",
            FieldType::Enum => "enum",
        }
    }

    /// Storage type for a specific engine
    pub fn storage_type(&self, engine: StorageEngine) -> &'static str {
        match engine {
            StorageEngine::MongoDb => self.to_mongo_type(),
            StorageEngine::PostgreSql => self.to_postgres_type(),
            StorageEngine::MySql => self.to_mysql_type(),
            StorageEngine::Sqlite => self.to_sqlite_type(),
        }
    }

    /// Convert to a Mongoose schema type
    pub fn to_mongo_type(&self) -> &'static str {
        match self {
            FieldType::String | FieldType::Enum => "String",
            FieldType::Number => "Number",
            FieldType::Boolean => "Boolean",
            FieldType::Date | FieldType::DateTime => "Date",
            FieldType::StringArray => "[String]",
            FieldType::Json => "Mixed",
            FieldType::JsonArray => "[Mixed]",
            FieldType::Reference => "ObjectId",
            FieldType::ReferenceArray => "[ObjectId]",
        }
    }

    /// Convert to PostgreSQL type
    pub fn to_postgres_type(&self) -> &'static str {
        match self {
            FieldType::String => "VARCHAR(255)",
            FieldType::Number => "DOUBLE PRECISION",
            FieldType::Boolean => "BOOLEAN",
            FieldType::Date => "DATE",
            FieldType::DateTime => "TIMESTAMP WITH TIME ZONE",
            FieldType::StringArray => "TEXT[]",
            FieldType::Json | FieldType::JsonArray => "JSONB",
            FieldType::Reference => "UUID",
            FieldType::ReferenceArray => "UUID[]",
            FieldType::Enum => "VARCHAR(50)",
        }
    }

    /// Convert to MySQL type
    pub fn to_mysql_type(&self) -> &'static str {
        match self {
            FieldType::String => "VARCHAR(255)",
            FieldType::Number => "DOUBLE",
            FieldType::Boolean => "TINYINT(1)",
            FieldType::Date => "DATE",
            FieldType::DateTime => "DATETIME",
            FieldType::StringArray
            | FieldType::Json
            | FieldType::JsonArray
            | FieldType::ReferenceArray => "JSON",
            FieldType::Reference => "CHAR(36)",
            FieldType::Enum => "VARCHAR(50)",
        }
    }

    /// Convert to SQLite type
    pub fn to_sqlite_type(&self) -> &'static str {
        match self {
            FieldType::Number => "REAL",
            FieldType::Boolean => "INTEGER",
            _ => "TEXT", // JSON, dates and ids are stored as text
        }
    }

    /// Check if this type points at another model
    pub fn is_reference(&self) -> bool {
        matches!(self, FieldType::Reference | FieldType::ReferenceArray)
    }

    /// Check if values of this type are lists
    pub fn is_array(&self) -> bool {
        matches!(
            self,
            FieldType::StringArray | FieldType::JsonArray | FieldType::ReferenceArray
        )
    }

    /// Get all field types
    pub fn all() -> &'static [FieldType] {
        &[
            FieldType::String,
            FieldType::Number,
            FieldType::Boolean,
            FieldType::Date,
            FieldType::DateTime,
            FieldType::StringArray,
            FieldType::Json,
            FieldType::JsonArray,
            FieldType::Reference,
            FieldType::ReferenceArray,
            FieldType::Enum,
        ]
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Storage Engines
// ============================================================================

/// Supported storage engines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageEngine {
    #[default]
    #[serde(alias = "mongo")]
    MongoDb,
    #[serde(alias = "postgres")]
    PostgreSql,
    MySql,
    Sqlite,
}

impl StorageEngine {
    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            StorageEngine::MongoDb => "MongoDB",
            StorageEngine::PostgreSql => "PostgreSQL",
            StorageEngine::MySql => "MySQL",
            StorageEngine::Sqlite => "SQLite",
        }
    }

    /// Get default port
    pub fn default_port(&self) -> u16 {
        match self {
            StorageEngine::MongoDb => 27017,
            StorageEngine::PostgreSql => 5432,
            StorageEngine::MySql => 3306,
            StorageEngine::Sqlite => 0, // SQLite doesn't use ports
        }
    }

    /// Name of the identifier column/property the engine manages
    pub fn id_field(&self) -> &'static str {
        match self {
            StorageEngine::MongoDb => "_id",
            _ => "id",
        }
    }

    /// Whether the engine is a document store
    pub fn is_document_store(&self) -> bool {
        matches!(self, StorageEngine::MongoDb)
    }

    /// Get all storage engines
    pub fn all() -> &'static [StorageEngine] {
        &[
            StorageEngine::MongoDb,
            StorageEngine::PostgreSql,
            StorageEngine::MySql,
            StorageEngine::Sqlite,
        ]
    }
}

impl std::fmt::Display for StorageEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// Relationship Kinds
// ============================================================================

/// Model relationship kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RelationKind {
    /// One record relates to exactly one other record
    OneToOne,
    /// One record relates to many others (e.g., User has many Posts)
    OneToMany,
    /// Many records relate to one (inverse of OneToMany)
    ManyToOne,
    /// Many records relate to many others
    ManyToMany,
}

impl RelationKind {
    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            RelationKind::OneToOne => "One to One",
            RelationKind::OneToMany => "One to Many",
            RelationKind::ManyToOne => "Many to One",
            RelationKind::ManyToMany => "Many to Many",
        }
    }

    /// Stable kebab-case identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationKind::OneToOne => "one-to-one",
            RelationKind::OneToMany => "one-to-many",
            RelationKind::ManyToOne => "many-to-one",
            RelationKind::ManyToMany => "many-to-many",
        }
    }

    /// Get arrow symbol for textual summaries
    pub fn arrow_symbol(&self) -> &'static str {
        match self {
            RelationKind::OneToOne => "1 ─── 1",
            RelationKind::OneToMany => "1 ───< *",
            RelationKind::ManyToOne => "* >─── 1",
            RelationKind::ManyToMany => "* >──< *",
        }
    }

    /// Get the inverse relationship kind
    pub fn inverse(&self) -> Self {
        match self {
            RelationKind::OneToOne => RelationKind::OneToOne,
            RelationKind::OneToMany => RelationKind::ManyToOne,
            RelationKind::ManyToOne => RelationKind::OneToMany,
            RelationKind::ManyToMany => RelationKind::ManyToMany,
        }
    }

    /// Whether the source side holds a collection of targets
    pub fn is_to_many(&self) -> bool {
        matches!(self, RelationKind::OneToMany | RelationKind::ManyToMany)
    }
}

impl std::fmt::Display for RelationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// Sensitivity
// ============================================================================

/// Sensitivity tier of a model; drives its default access policy
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Sensitivity {
    #[default]
    Low,
    Medium,
    High,
}

impl Sensitivity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sensitivity::Low => "low",
            Sensitivity::Medium => "medium",
            Sensitivity::High => "high",
        }
    }
}

impl std::fmt::Display for Sensitivity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Validator Tags
// ============================================================================

/// Semantic validator attached to a lowered field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tag", content = "value", rename_all = "kebab-case")]
pub enum ValidatorTag {
    /// Field must have a value
    Required,
    IsString,
    IsNumber,
    IsInt,
    IsBoolean,
    IsIso8601Date,
    IsArray,
    IsObject,
    /// Valid identifier of a referenced record
    IsReferenceId,
    IsEmail,
    IsUrl,
    IsPhone,
    IsSlug,
    IsHexColor,
    IsStrongPassword,
    /// Value must be in a list
    IsIn(Vec<String>),
    /// Minimum string length
    MinLength(usize),
    /// Maximum string length
    MaxLength(usize),
    /// Minimum numeric value
    Min(f64),
    /// Maximum numeric value
    Max(f64),
    /// Regex pattern validation
    Matches(String),
    /// Apply the inner validator to every array element
    Each(Box<ValidatorTag>),
}

impl ValidatorTag {
    /// Stable kebab-case tag
    pub fn tag(&self) -> &'static str {
        match self {
            ValidatorTag::Required => "required",
            ValidatorTag::IsString => "is-string",
            ValidatorTag::IsNumber => "is-number",
            ValidatorTag::IsInt => "is-int",
            ValidatorTag::IsBoolean => "is-boolean",
            ValidatorTag::IsIso8601Date => "is-iso8601-date",
            ValidatorTag::IsArray => "is-array",
            ValidatorTag::IsObject => "is-object",
            ValidatorTag::IsReferenceId => "is-reference-id",
            ValidatorTag::IsEmail => "is-email",
            ValidatorTag::IsUrl => "is-url",
            ValidatorTag::IsPhone => "is-phone",
            ValidatorTag::IsSlug => "is-slug",
            ValidatorTag::IsHexColor => "is-hex-color",
            ValidatorTag::IsStrongPassword => "is-strong-password",
            ValidatorTag::IsIn(_) => "is-in",
            ValidatorTag::MinLength(_) => "min-length",
            ValidatorTag::MaxLength(_) => "max-length",
            ValidatorTag::Min(_) => "min",
            ValidatorTag::Max(_) => "max",
            ValidatorTag::Matches(_) => "matches",
            ValidatorTag::Each(_) => "each",
        }
    }

    /// Get a user-friendly error message
    pub fn error_message(&self) -> String {
        match self {
            ValidatorTag::Required => "This field is required".to_string(),
            ValidatorTag::IsString => "Must be a string".to_string(),
            ValidatorTag::IsNumber => "Must be a number".to_string(),
            ValidatorTag::IsInt => "Must be a whole number".to_string(),
            ValidatorTag::IsBoolean => "Must be true or false".to_string(),
            ValidatorTag::IsIso8601Date => "Must be an ISO-8601 date".to_string(),
            ValidatorTag::IsArray => "Must be a list".to_string(),
            ValidatorTag::IsObject => "Must be an object".to_string(),
            ValidatorTag::IsReferenceId => "Must be a valid record identifier".to_string(),
            ValidatorTag::IsEmail => "Must be a valid email address".to_string(),
            ValidatorTag::IsUrl => "Must be a valid URL".to_string(),
            ValidatorTag::IsPhone => "Must be a valid phone number".to_string(),
            ValidatorTag::IsSlug => "Must be lowercase words separated by hyphens".to_string(),
            ValidatorTag::IsHexColor => "Must be a hex color such as #3366ff".to_string(),
            ValidatorTag::IsStrongPassword => {
                "Must mix upper and lower case letters, digits and symbols".to_string()
            }
            ValidatorTag::IsIn(values) => format!("Must be one of: {}", values.join(", ")),
            ValidatorTag::MinLength(n) => format!("Minimum length is {} characters", n),
            ValidatorTag::MaxLength(n) => format!("Maximum length is {} characters", n),
            ValidatorTag::Min(n) => format!("Minimum value is {}", n),
            ValidatorTag::Max(n) => format!("Maximum value is {}", n),
            ValidatorTag::Matches(regex) => format!("Must match pattern {}", regex),
            ValidatorTag::Each(inner) => format!("Every item: {}", inner.error_message()),
        }
    }
}

impl std::fmt::Display for ValidatorTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidatorTag::IsIn(values) => write!(f, "is-in({:?})", values),
            ValidatorTag::MinLength(n) => write!(f, "min-length({})", n),
            ValidatorTag::MaxLength(n) => write!(f, "max-length({})", n),
            ValidatorTag::Min(n) => write!(f, "min({})", n),
            ValidatorTag::Max(n) => write!(f, "max({})", n),
            ValidatorTag::Matches(regex) => write!(f, "matches({})", regex),
            ValidatorTag::Each(inner) => write!(f, "each({})", inner),
            other => write!(f, "{}", other.tag()),
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
    fn test_field_type_parse_aliases() {
        assert_eq!(FieldType::parse("String"), Some(FieldType::String));
        assert_eq!(FieldType::parse("text"), Some(FieldType::String));
        assert_eq!(FieldType::parse(" Integer "), Some(FieldType::Number));
        assert_eq!(FieldType::parse("bool"), Some(FieldType::Boolean));
        assert_eq!(FieldType::parse("timestamp"), Some(FieldType::DateTime));
        assert_eq!(FieldType::parse("string[]"), Some(FieldType::StringArray));
        assert_eq!(FieldType::parse("ObjectId"), Some(FieldType::Reference));
        assert_eq!(
            FieldType::parse("reference-array"),
            Some(FieldType::ReferenceArray)
        );
        assert_eq!(FieldType::parse("blob"), None);
        assert_eq!(FieldType::parse(""), None);
    }

    #[test]
    fn test_field_type_parse_round_trips_canonical_names() {
        for field_type in FieldType::all() {
            assert_eq!(FieldType::parse(field_type.as_str()), Some(*field_type));
        }
    }

    #[test]
    fn test_field_type_serde_names() {
        assert_eq!(
            serde_json::to_string(&FieldType::DateTime).unwrap(),
            "\"datetime\""
        );
        assert_eq!(
            serde_json::to_string(&FieldType::ReferenceArray).unwrap(),
            "\"reference-array\""
        );
    }

    #[test]
    fn test_field_type_storage_mapping() {
        assert_eq!(FieldType::Reference.storage_type(StorageEngine::MongoDb), "ObjectId");
        assert_eq!(FieldType::Json.storage_type(StorageEngine::PostgreSql), "JSONB");
        assert_eq!(FieldType::Boolean.storage_type(StorageEngine::MySql), "TINYINT(1)");
        assert_eq!(FieldType::DateTime.storage_type(StorageEngine::Sqlite), "TEXT");
    }

    #[test]
    fn test_field_type_predicates() {
        assert!(FieldType::Reference.is_reference());
        assert!(FieldType::ReferenceArray.is_reference());
        assert!(FieldType::ReferenceArray.is_array());
        assert!(!FieldType::String.is_reference());
        assert!(!FieldType::Json.is_array());
    }

    #[test]
    fn test_storage_engine() {
        assert_eq!(StorageEngine::default(), StorageEngine::MongoDb);
        assert_eq!(StorageEngine::MongoDb.id_field(), "_id");
        assert_eq!(StorageEngine::PostgreSql.id_field(), "id");
        assert_eq!(StorageEngine::PostgreSql.default_port(), 5432);
        let parsed: StorageEngine = serde_json::from_str("\"postgres\"").unwrap();
        assert_eq!(parsed, StorageEngine::PostgreSql);
    }

    #[test]
    fn test_relation_kind() {
        assert_eq!(RelationKind::OneToOne.display_name(), "One to One");
        assert_eq!(RelationKind::OneToMany.arrow_symbol(), "1 ───< *");
        assert_eq!(RelationKind::OneToMany.inverse(), RelationKind::ManyToOne);
        let parsed: RelationKind = serde_json::from_str("\"many-to-many\"").unwrap();
        assert_eq!(parsed, RelationKind::ManyToMany);
    }

    #[test]
    fn test_sensitivity_ordering() {
        assert!(Sensitivity::High > Sensitivity::Medium);
        assert!(Sensitivity::Medium > Sensitivity::Low);
        assert_eq!(Sensitivity::Low.max(Sensitivity::High), Sensitivity::High);
    }

    #[test]
    fn test_validator_tags() {
        assert_eq!(ValidatorTag::IsIso8601Date.tag(), "is-iso8601-date");
        assert_eq!(ValidatorTag::MinLength(3).to_string(), "min-length(3)");
        assert_eq!(
            ValidatorTag::Each(Box::new(ValidatorTag::IsString)).to_string(),
            "each(is-string)"
        );
        assert_eq!(
            ValidatorTag::IsEmail.error_message(),
            "Must be a valid email address"
        );
    }

    #[test]
    fn test_validator_tag_serde_shape() {
        let json = serde_json::to_value(ValidatorTag::MaxLength(255)).unwrap();
        assert_eq!(json["tag"], "max-length");
        assert_eq!(json["value"], 255);

        let json = serde_json::to_value(ValidatorTag::IsEmail).unwrap();
        assert_eq!(json["tag"], "is-email");
    }
}
