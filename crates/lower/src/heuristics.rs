//! Smart defaults by field name
//!
//! Fields are classified by a lowercase substring match on their name. A
//! classification supplies canonical constraints, a semantic validator, a
//! description, an example value and the generator the seeding planner uses.
//! Only `string` and `number` fields are classified; every other type has
//! fixed validators and generators.

use serde_json::{Value, json};
use stackforge_core::naming::to_title_case;
use stackforge_core::{FieldType, ValidatorTag};
use stackforge_ir::{Constraints, ValueGenerator};

/// Pattern enforced on slugs
pub const SLUG_PATTERN: &str = "^[a-z0-9]+(?:-[a-z0-9]+)*$";

/// Pattern enforced on hex colors
pub const HEX_COLOR_PATTERN: &str = "^#[0-9a-fA-F]{6}$";

// ============================================================================
// FieldKind
// ============================================================================

/// Semantic classification of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    // Strings
    Email,
    Url,
    Phone,
    PersonName,
    Title,
    LongText,
    Password,
    Slug,
    Address,
    Color,

    // Numbers
    Percent,
    Price,
    Quantity,
    Rating,
    Age,

    /// No classification matched
    Generic,
}

/// Ordered vocabularies; the first match wins.
const STRING_KINDS: &[(&[&str], FieldKind)] = &[
    (&["email"], FieldKind::Email),
    (&["url", "website", "link"], FieldKind::Url),
    (&["phone", "mobile"], FieldKind::Phone),
    (&["password"], FieldKind::Password),
    (&["slug"], FieldKind::Slug),
    (&["name"], FieldKind::PersonName),
    (&["title"], FieldKind::Title),
    (&["description", "content", "body"], FieldKind::LongText),
    (&["address"], FieldKind::Address),
    (&["color", "colour"], FieldKind::Color),
];

// `percentage` contains `age` and `pageCount` contains `age`, so the
// broader number kinds are matched first.
const NUMBER_KINDS: &[(&[&str], FieldKind)] = &[
    (&["percent", "rate"], FieldKind::Percent),
    (&["price", "cost", "amount"], FieldKind::Price),
    (&["quantity", "count", "stock"], FieldKind::Quantity),
    (&["rating", "score"], FieldKind::Rating),
    (&["age"], FieldKind::Age),
];

impl FieldKind {
    /// Classify a field by name and type
    pub fn classify(name: &str, field_type: FieldType) -> FieldKind {
        let table = match field_type {
            FieldType::String => STRING_KINDS,
            FieldType::Number => NUMBER_KINDS,
            _ => return FieldKind::Generic,
        };
        let lower = name.to_lowercase();
        table
            .iter()
            .find(|(needles, _)| needles.iter().any(|n| lower.contains(n)))
            .map(|(_, kind)| *kind)
            .unwrap_or(FieldKind::Generic)
    }

    /// Whether a classification matched
    pub fn is_generic(&self) -> bool {
        *self == FieldKind::Generic
    }

    /// Canonical constraints
    pub fn constraints(&self) -> Constraints {
        match self {
            FieldKind::Email => Constraints::new().with_length(None, Some(254)),
            FieldKind::Url => Constraints::new().with_length(None, Some(2048)),
            FieldKind::Phone => Constraints::new().with_length(Some(7), Some(20)),
            FieldKind::PersonName => Constraints::new().with_length(Some(2), Some(100)),
            FieldKind::Title => Constraints::new().with_length(Some(3), Some(200)),
            FieldKind::LongText => Constraints::new().with_length(None, Some(5000)),
            FieldKind::Password => Constraints::new().with_length(Some(8), Some(128)),
            FieldKind::Slug => Constraints::new()
                .with_length(Some(3), Some(100))
                .with_pattern(SLUG_PATTERN),
            FieldKind::Address => Constraints::new().with_length(Some(5), Some(200)),
            FieldKind::Color => Constraints::new().with_pattern(HEX_COLOR_PATTERN),
            FieldKind::Percent => Constraints::new().with_range(Some(0.0), Some(100.0)),
            FieldKind::Price => Constraints::new().with_range(Some(0.0), None),
            FieldKind::Quantity => Constraints::new().with_range(Some(0.0), None),
            FieldKind::Rating => Constraints::new().with_range(Some(0.0), Some(5.0)),
            FieldKind::Age => Constraints::new().with_range(Some(0.0), Some(150.0)),
            FieldKind::Generic => Constraints::new(),
        }
    }

    /// Semantic validator tag
    pub fn validator(&self) -> Option<ValidatorTag> {
        match self {
            FieldKind::Email => Some(ValidatorTag::IsEmail),
            FieldKind::Url => Some(ValidatorTag::IsUrl),
            FieldKind::Phone => Some(ValidatorTag::IsPhone),
            FieldKind::Password => Some(ValidatorTag::IsStrongPassword),
            FieldKind::Slug => Some(ValidatorTag::IsSlug),
            FieldKind::Color => Some(ValidatorTag::IsHexColor),
            FieldKind::Quantity | FieldKind::Age => Some(ValidatorTag::IsInt),
            _ => None,
        }
    }

    /// Human-readable description of a field of this kind
    pub fn description(&self, field_name: &str) -> String {
        let label = to_title_case(field_name);
        match self {
            FieldKind::Email => format!("{} (email address)", label),
            FieldKind::Url => format!("{} (absolute URL)", label),
            FieldKind::Phone => format!("{} (phone number)", label),
            FieldKind::PersonName => format!("{} (display name)", label),
            FieldKind::Title => format!("{} (short title)", label),
            FieldKind::LongText => format!("{} (long-form text)", label),
            FieldKind::Password => format!("{} (stored hashed, never returned)", label),
            FieldKind::Slug => format!("{} (URL-safe identifier)", label),
            FieldKind::Address => format!("{} (postal address)", label),
            FieldKind::Color => format!("{} (hex color)", label),
            FieldKind::Percent => format!("{} (percentage, 0-100)", label),
            FieldKind::Price => format!("{} (monetary amount)", label),
            FieldKind::Quantity => format!("{} (whole number, not negative)", label),
            FieldKind::Rating => format!("{} (rating, 0-5)", label),
            FieldKind::Age => format!("{} (age in years)", label),
            FieldKind::Generic => label,
        }
    }

    /// Example value
    pub fn example(&self) -> Option<Value> {
        let value = match self {
            FieldKind::Email => json!("jane.doe@example.com"),
            FieldKind::Url => json!("https://example.com"),
            FieldKind::Phone => json!("+1-555-0100"),
            FieldKind::PersonName => json!("Jane Doe"),
            FieldKind::Title => json!("Getting started"),
            FieldKind::LongText => json!("A short paragraph of text."),
            FieldKind::Password => json!("S3cure!Passw0rd"),
            FieldKind::Slug => json!("getting-started"),
            FieldKind::Address => json!("221B Baker Street"),
            FieldKind::Color => json!("#3366ff"),
            FieldKind::Percent => json!(50),
            FieldKind::Price => json!(19.99),
            FieldKind::Quantity => json!(10),
            FieldKind::Rating => json!(4),
            FieldKind::Age => json!(30),
            FieldKind::Generic => return None,
        };
        Some(value)
    }

    /// Seed generator before clamping to the field's constraints
    pub fn generator(&self) -> Option<ValueGenerator> {
        let generator = match self {
            FieldKind::Email => ValueGenerator::Email,
            FieldKind::Url => ValueGenerator::Url,
            FieldKind::Phone => ValueGenerator::Phone,
            FieldKind::PersonName => ValueGenerator::PersonName,
            FieldKind::Title => ValueGenerator::Words { min: 3, max: 6 },
            FieldKind::LongText => ValueGenerator::Paragraph { sentences: 3 },
            FieldKind::Password => ValueGenerator::Password,
            FieldKind::Slug => ValueGenerator::Slug,
            FieldKind::Address => ValueGenerator::StreetAddress,
            FieldKind::Color => ValueGenerator::HexColor,
            FieldKind::Percent => ValueGenerator::IntRange { min: 0, max: 100 },
            FieldKind::Price => ValueGenerator::DecimalRange {
                min: 1.0,
                max: 1000.0,
                decimals: 2,
            },
            FieldKind::Quantity => ValueGenerator::IntRange { min: 0, max: 500 },
            FieldKind::Rating => ValueGenerator::IntRange { min: 1, max: 5 },
            FieldKind::Age => ValueGenerator::IntRange { min: 18, max: 90 },
            FieldKind::Generic => return None,
        };
        Some(generator)
    }
}

// ============================================================================
// Fixed validators
// ============================================================================

/// Validators implied by the declared type alone
pub fn type_validators(field_type: FieldType) -> Vec<ValidatorTag> {
    match field_type {
        FieldType::String => vec![ValidatorTag::IsString],
        FieldType::Number => vec![ValidatorTag::IsNumber],
        FieldType::Boolean => vec![ValidatorTag::IsBoolean],
        FieldType::Date | FieldType::DateTime => vec![ValidatorTag::IsIso8601Date],
        FieldType::StringArray => vec![
            ValidatorTag::IsArray,
            ValidatorTag::Each(Box::new(ValidatorTag::IsString)),
        ],
        FieldType::Json => vec![ValidatorTag::IsObject],
        FieldType::JsonArray => vec![
            ValidatorTag::IsArray,
            ValidatorTag::Each(Box::new(ValidatorTag::IsObject)),
        ],
        FieldType::Reference => vec![ValidatorTag::IsReferenceId],
        FieldType::ReferenceArray => vec![
            ValidatorTag::IsArray,
            ValidatorTag::Each(Box::new(ValidatorTag::IsReferenceId)),
        ],
        // Membership comes from the enum values
        FieldType::Enum => Vec::new(),
    }
}
