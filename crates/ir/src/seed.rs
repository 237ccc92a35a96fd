//! Seeding plans
//!
//! A [`SeedingPlan`] says in which order models can be populated with
//! synthetic records and how every field of each record is generated.
//! Generators are data; [`ValueGenerator::expression`] renders a compact,
//! renderer-neutral expression such as `int(18..=90)` or
//! `template(user{index}@example.com)`.

use serde::{Deserialize, Serialize};

// ============================================================================
// SeedingPlan
// ============================================================================

/// Population plan for the whole project
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedingPlan {
    /// One plan per model, in population order
    pub plans: Vec<SeedPlan>,

    /// Groups of models whose back-references were deferred to break a cycle
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cycles: Vec<Vec<String>>,
}

impl SeedingPlan {
    /// Model names in population order
    pub fn order(&self) -> Vec<&str> {
        self.plans.iter().map(|p| p.model.as_str()).collect()
    }

    /// Plan for a model
    pub fn plan_for(&self, model: &str) -> Option<&SeedPlan> {
        self.plans.iter().find(|p| p.model == model)
    }

    /// Whether any binding must be filled in a second pass
    pub fn has_deferred(&self) -> bool {
        self.plans
            .iter()
            .flat_map(|p| &p.relationship_bindings)
            .any(|b| b.deferred)
    }

    /// Total records planned
    pub fn total_records(&self) -> usize {
        self.plans.iter().map(|p| p.count).sum()
    }
}

// ============================================================================
// SeedPlan
// ============================================================================

/// Population plan for one model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedPlan {
    pub model: String,

    /// Position in the population order, starting at 0
    pub order: usize,

    /// Records to create
    pub count: usize,

    pub field_strategies: Vec<FieldStrategy>,

    pub relationship_bindings: Vec<RelationshipBinding>,
}

impl SeedPlan {
    /// Create an empty plan
    pub fn new(model: impl Into<String>, order: usize, count: usize) -> Self {
        Self {
            model: model.into(),
            order,
            count,
            field_strategies: Vec::new(),
            relationship_bindings: Vec::new(),
        }
    }

    /// Strategy for a field
    pub fn strategy_for(&self, field: &str) -> Option<&FieldStrategy> {
        self.field_strategies.iter().find(|s| s.field == field)
    }

    /// Binding for a reference field
    pub fn binding_for(&self, field: &str) -> Option<&RelationshipBinding> {
        self.relationship_bindings.iter().find(|b| b.field == field)
    }
}

/// How one field is generated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldStrategy {
    pub field: String,
    pub generator: ValueGenerator,

    /// Rendered form of `generator`
    pub expression: String,
}

impl FieldStrategy {
    pub fn new(field: impl Into<String>, generator: ValueGenerator) -> Self {
        let expression = generator.expression();
        Self {
            field: field.into(),
            generator,
            expression,
        }
    }
}

/// Link from a reference field to already-seeded records
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipBinding {
    pub field: String,
    pub target_model: String,
    pub arity: Arity,

    /// Filled in a second pass, after the target has been seeded
    #[serde(default)]
    pub deferred: bool,
}

/// How many records a binding points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arity {
    One,
    Array,
}

// ============================================================================
// ValueGenerator
// ============================================================================

/// Value-generation rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ValueGenerator {
    /// Fill `{index}` with the record index
    Template { template: String },
    /// Integer counter starting at `start`
    Counter { start: i64 },
    /// Uniform integer in `[min, max]`
    IntRange { min: i64, max: i64 },
    /// Uniform decimal in `[min, max]`
    DecimalRange { min: f64, max: f64, decimals: u32 },
    /// Random boolean
    Boolean,
    /// Date within the last `days_back` days
    RecentDate { days_back: u32 },
    /// Cycle through fixed values by record index
    Cycle { values: Vec<String> },
    /// Random words
    Words { min: usize, max: usize },
    /// Random sentences
    Paragraph { sentences: usize },
    PersonName,
    Email,
    Url,
    Phone,
    StreetAddress,
    HexColor,
    /// Password that satisfies the strong-password validator
    Password,
    /// Slug of random words
    Slug,
    /// List of `count` random words
    WordList { count: usize },
    /// Empty JSON object
    EmptyObject,
    /// Empty list of JSON objects
    EmptyList,
}

impl ValueGenerator {
    /// Index-templated generator, e.g. `title{index}`
    pub fn indexed(prefix: &str) -> Self {
        ValueGenerator::Template {
            template: format!("{}{{index}}", prefix),
        }
    }

    /// Whether the generator yields a distinct value per record index
    pub fn is_unique_per_index(&self) -> bool {
        match self {
            ValueGenerator::Template { template } => template.contains("{index}"),
            ValueGenerator::Counter { .. } => true,
            _ => false,
        }
    }

    /// Render as a compact expression
    pub fn expression(&self) -> String {
        match self {
            ValueGenerator::Template { template } => format!("template({})", template),
            ValueGenerator::Counter { start } => format!("counter({})", start),
            ValueGenerator::IntRange { min, max } => format!("int({}..={})", min, max),
            ValueGenerator::DecimalRange { min, max, decimals } => {
                format!("decimal({}..={}, {})", min, max, decimals)
            }
            ValueGenerator::Boolean => "bool()".to_string(),
            ValueGenerator::RecentDate { days_back } => format!("date.recent({})", days_back),
            ValueGenerator::Cycle { values } => format!("cycle({})", values.join("|")),
            ValueGenerator::Words { min, max } => format!("words({}..={})", min, max),
            ValueGenerator::Paragraph { sentences } => format!("paragraph({})", sentences),
            ValueGenerator::PersonName => "person.name()".to_string(),
            ValueGenerator::Email => "internet.email()".to_string(),
            ValueGenerator::Url => "internet.url()".to_string(),
            ValueGenerator::Phone => "phone.number()".to_string(),
            ValueGenerator::StreetAddress => "address.street()".to_string(),
            ValueGenerator::HexColor => "color.hex()".to_string(),
            ValueGenerator::Password => "internet.password(12)".to_string(),
            ValueGenerator::Slug => "lorem.slug()".to_string(),
            ValueGenerator::WordList { count } => format!("list(words(1..=1), {})", count),
            ValueGenerator::EmptyObject => "{}".to_string(),
            ValueGenerator::EmptyList => "[]".to_string(),
        }
    }
}

impl std::fmt::Display for ValueGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.expression())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expressions() {
        assert_eq!(
            ValueGenerator::IntRange { min: 18, max: 90 }.expression(),
            "int(18..=90)"
        );
        assert_eq!(ValueGenerator::indexed("title").expression(), "template(title{index})");
        assert_eq!(
            ValueGenerator::Cycle {
                values: vec!["draft".to_string(), "published".to_string()]
            }
            .expression(),
            "cycle(draft|published)"
        );
        assert_eq!(ValueGenerator::Email.to_string(), "internet.email()");
    }

    #[test]
    fn test_unique_per_index() {
        assert!(ValueGenerator::indexed("sku").is_unique_per_index());
        assert!(ValueGenerator::Counter { start: 1 }.is_unique_per_index());
        assert!(!ValueGenerator::Email.is_unique_per_index());
    }

    #[test]
    fn test_field_strategy_renders_expression() {
        let strategy = FieldStrategy::new("active", ValueGenerator::Boolean);
        assert_eq!(strategy.expression, "bool()");
    }

    #[test]
    fn test_plan_queries() {
        let mut post = SeedPlan::new("Post", 1, 10);
        post.relationship_bindings.push(RelationshipBinding {
            field: "userId".to_string(),
            target_model: "User".to_string(),
            arity: Arity::One,
            deferred: false,
        });
        let plan = SeedingPlan {
            plans: vec![SeedPlan::new("User", 0, 10), post],
            cycles: Vec::new(),
        };

        assert_eq!(plan.order(), vec!["User", "Post"]);
        assert_eq!(plan.total_records(), 20);
        assert!(!plan.has_deferred());
        assert_eq!(
            plan.plan_for("Post").and_then(|p| p.binding_for("userId")).map(|b| b.arity),
            Some(Arity::One)
        );
    }

    #[test]
    fn test_generator_serde_shape() {
        let json = serde_json::to_value(ValueGenerator::IntRange { min: 1, max: 5 }).unwrap();
        assert_eq!(json["kind"], "int-range");
        assert_eq!(json["min"], 1);
    }
}
