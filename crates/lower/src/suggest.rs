//! Field suggestion sources
//!
//! Field lowering asks a [`SuggestionSource`] for constraints, an example and
//! a description whenever a field declares no explicit constraints. Sources
//! are synchronous; anything that fetches hints remotely does so before
//! lowering starts and hands the results over as [`StaticSuggestions`].

use crate::heuristics::FieldKind;
use serde::{Deserialize, Serialize};
use stackforge_core::{FieldType, LowerError, LowerResult, ValidatorTag};
use stackforge_ir::Constraints;
use std::collections::HashMap;

// ============================================================================
// Request / Suggestion
// ============================================================================

/// What a source is asked about
#[derive(Debug, Clone, PartialEq)]
pub struct SuggestionRequest {
    pub field_name: String,
    pub field_type: FieldType,
    pub model_name: String,
    /// Names of the other fields of the model
    pub sibling_fields: Vec<String>,
}

impl SuggestionRequest {
    pub fn new(
        model_name: impl Into<String>,
        field_name: impl Into<String>,
        field_type: FieldType,
    ) -> Self {
        Self {
            field_name: field_name.into(),
            field_type,
            model_name: model_name.into(),
            sibling_fields: Vec::new(),
        }
    }

    pub fn with_siblings(mut self, siblings: Vec<String>) -> Self {
        self.sibling_fields = siblings;
        self
    }

    /// `Model.field` key used by [`StaticSuggestions`]
    pub fn key(&self) -> String {
        format!("{}.{}", self.model_name, self.field_name)
    }
}

/// Hints for one field
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Suggestion {
    pub constraints: Constraints,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<serde_json::Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Semantic validators to attach besides the constraint validators
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub validators: Vec<ValidatorTag>,
}

impl Suggestion {
    pub fn new(constraints: Constraints) -> Self {
        Self {
            constraints,
            ..Default::default()
        }
    }

    pub fn with_example(mut self, example: serde_json::Value) -> Self {
        self.example = Some(example);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

// ============================================================================
// SuggestionSource
// ============================================================================

/// Supplies field hints during lowering
pub trait SuggestionSource: Send + Sync {
    /// Hints for a field, or `None` to decline
    fn suggest(&self, request: &SuggestionRequest) -> Option<Suggestion>;

    /// Short name used in logs
    fn name(&self) -> &'static str {
        "custom"
    }
}

/// Built-in smart defaults keyed on the field name
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicSuggestions;

impl SuggestionSource for HeuristicSuggestions {
    fn suggest(&self, request: &SuggestionRequest) -> Option<Suggestion> {
        let kind = FieldKind::classify(&request.field_name, request.field_type);
        if kind.is_generic() {
            return None;
        }
        Some(Suggestion {
            constraints: kind.constraints(),
            example: kind.example(),
            description: Some(kind.description(&request.field_name)),
            validators: kind.validator().into_iter().collect(),
        })
    }

    fn name(&self) -> &'static str {
        "heuristic"
    }
}

/// Precomputed hints keyed by `Model.field`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StaticSuggestions {
    hints: HashMap<String, Suggestion>,
}

impl StaticSuggestions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a hint for `model.field`
    pub fn with_hint(mut self, model: &str, field: &str, suggestion: Suggestion) -> Self {
        self.hints.insert(format!("{}.{}", model, field), suggestion);
        self
    }

    /// Parse a JSON object of `"Model.field": Suggestion` entries
    pub fn from_json_str(json: &str) -> LowerResult<Self> {
        let hints: HashMap<String, Suggestion> = serde_json::from_str(json)?;
        if let Some(key) = hints.keys().find(|k| !k.contains('.')) {
            return Err(LowerError::schema(format!(
                "Suggestion key '{}' must have the form Model.field",
                key
            )));
        }
        Ok(Self { hints })
    }

    pub fn len(&self) -> usize {
        self.hints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hints.is_empty()
    }
}

impl SuggestionSource for StaticSuggestions {
    fn suggest(&self, request: &SuggestionRequest) -> Option<Suggestion> {
        self.hints.get(&request.key()).cloned()
    }

    fn name(&self) -> &'static str {
        "static"
    }
}
