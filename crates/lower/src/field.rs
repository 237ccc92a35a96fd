//! Field lowering
//!
//! Turns one [`RawField`] into a [`FieldDescriptor`]. Problems are pushed
//! into the caller's [`Diagnostics`]; a fatal one makes [`lower_field`]
//! return `None` so the model keeps lowering and every error is reported.
//!
//! Constraint precedence:
//!
//! 1. enum values collapse everything to a membership check
//! 2. any explicit `minLength`/`maxLength`/`min`/`max`/`pattern` wins as a set
//! 3. the configured suggestion source
//! 4. the built-in name heuristics

use crate::context::LoweringContext;
use crate::heuristics::{FieldKind, type_validators};
use crate::policy;
use crate::suggest::{HeuristicSuggestions, Suggestion, SuggestionRequest, SuggestionSource};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use serde_json::{Value, json};
use stackforge_core::naming::to_title_case;
use stackforge_core::{
    Diagnostic, DiagnosticCode, Diagnostics, FieldType, LowerError, Sensitivity, ValidatorTag,
};
use stackforge_ir::{ConstraintSource, Constraints, DefaultValue, FieldDescriptor, RawField};

/// Where a field is being lowered
#[derive(Debug, Clone, Copy)]
pub struct FieldSite<'s> {
    /// Final name of the owning model (or join model)
    pub model: &'s str,
    /// Final field name
    pub name: &'s str,
    /// Diagnostic path
    pub path: &'s str,
    /// Other field names of the model
    pub siblings: &'s [String],
}

/// Lower one field declaration
pub fn lower_field(
    ctx: &LoweringContext<'_>,
    site: FieldSite<'_>,
    raw: &RawField,
    diagnostics: &mut Diagnostics,
) -> Option<FieldDescriptor> {
    let Some(field_type) = FieldType::parse(&raw.field_type) else {
        let err = LowerError::UnsupportedFieldType {
            model: site.model.to_string(),
            field: site.name.to_string(),
            declared: raw.field_type.clone(),
        };
        diagnostics.push(
            err.into_diagnostic(site.path)
                .with_suggestion(supported_types_hint()),
        );
        return None;
    };

    let mut field = FieldDescriptor::new(site.name, field_type, ctx.engine);
    field.required = raw.required;
    if raw.unique {
        field = field.unique();
    }
    field.indexed |= raw.indexed;
    field.description = raw.description.clone();
    field.sensitive = policy::field_sensitivity(site.name) == Sensitivity::High;

    if field_type.is_reference() {
        let target = resolve_reference(ctx, site, raw, diagnostics)?;
        field.referenced_model = Some(target);
        field.indexed |= field_type == FieldType::Reference;
    }

    let enum_values = enum_values(site, field_type, raw, diagnostics)?;
    let kind = FieldKind::classify(site.name, field_type);
    let mut semantic: Vec<ValidatorTag> = Vec::new();
    let mut example: Option<Value> = None;
    let mut description: Option<String> = None;

    if let Some(values) = &enum_values {
        field.constraints = Constraints::one_of(values.clone());
        field.constraint_source = ConstraintSource::Enum;
        example = values.first().map(|v| json!(v));
    } else if raw.has_explicit_constraints() {
        field.constraints = Constraints {
            min_length: raw.min_length,
            max_length: raw.max_length,
            min: raw.min,
            max: raw.max,
            pattern: raw.pattern.clone(),
            enum_values: None,
        };
        field.constraint_source = ConstraintSource::Explicit;
        semantic.extend(kind.validator());
        example = kind.example();
        if !kind.is_generic() {
            description = Some(kind.description(site.name));
        }
    } else if !field_type.is_reference() {
        let request = SuggestionRequest::new(site.model, site.name, field_type)
            .with_siblings(site.siblings.to_vec());
        let (suggestion, source) = match ctx.suggestions().and_then(|s| s.suggest(&request)) {
            Some(suggestion) => (Some(suggestion), ConstraintSource::Suggested),
            None => (
                HeuristicSuggestions.suggest(&request),
                ConstraintSource::Heuristic,
            ),
        };
        if let Some(Suggestion {
            constraints,
            example: suggested_example,
            description: suggested_description,
            validators,
        }) = suggestion
        {
            if !constraints.is_empty() {
                field.constraints = constraints;
                field.constraint_source = source;
            }
            semantic = validators;
            example = suggested_example;
            description = suggested_description;
        }
    }

    check_constraints(site, &mut field, diagnostics)?;

    if let Some(value) = &raw.default {
        match lower_default(value, field_type, enum_values.as_deref()) {
            Ok(default) => field.default_value = Some(default),
            Err(reason) => diagnostics.push(
                Diagnostic::warning(
                    DiagnosticCode::InvalidDefault,
                    site.path,
                    format!(
                        "Default value {} of field '{}' was dropped: {}",
                        value, site.name, reason
                    ),
                )
                .with_suggestion(format!("Use a {} value", field_type)),
            ),
        }
    }

    let mut validators = Vec::new();
    if field.required {
        validators.push(ValidatorTag::Required);
    }
    validators.extend(type_validators(field_type));
    for tag in semantic {
        if !validators.contains(&tag) {
            validators.push(tag);
        }
    }
    validators.extend(field.constraints.to_validators());
    field.validators = validators;

    field.example = example.or_else(|| fallback_example(site.name, field_type));
    if field.description.is_none() {
        field.description = description;
    }

    Some(field)
}

fn supported_types_hint() -> String {
    let names: Vec<&str> = FieldType::all().iter().map(|t| t.as_str()).collect();
    format!("Use one of: {}", names.join(", "))
}

fn resolve_reference(
    ctx: &LoweringContext<'_>,
    site: FieldSite<'_>,
    raw: &RawField,
    diagnostics: &mut Diagnostics,
) -> Option<String> {
    let declared = raw
        .reference
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty());
    let Some(declared) = declared else {
        diagnostics.error(
            DiagnosticCode::SchemaError,
            site.path,
            format!(
                "Reference field '{}' must name the model it references in 'ref'",
                site.name
            ),
        );
        return None;
    };

    match ctx.resolve(declared) {
        Some(target) => Some(target.to_string()),
        None => {
            diagnostics.push(
                LowerError::UnknownModelReference(declared.to_string()).into_diagnostic(site.path),
            );
            None
        }
    }
}

/// Cleaned enum values; `Some(None)` when the field has none
fn enum_values(
    site: FieldSite<'_>,
    field_type: FieldType,
    raw: &RawField,
    diagnostics: &mut Diagnostics,
) -> Option<Option<Vec<String>>> {
    let mut values: Vec<String> = Vec::new();
    for value in raw.enum_values.iter().flatten() {
        let value = value.trim();
        if !value.is_empty() && !values.iter().any(|v| v == value) {
            values.push(value.to_string());
        }
    }

    match field_type {
        FieldType::Enum if values.is_empty() => {
            diagnostics.push(
                LowerError::schema(format!("Enum field '{}' declares no values", site.name))
                    .into_diagnostic(site.path)
                    .with_suggestion("Add a non-empty 'values' list"),
            );
            None
        }
        FieldType::Enum | FieldType::String if !values.is_empty() => Some(Some(values)),
        _ => {
            if !values.is_empty() {
                diagnostics.warning(
                    DiagnosticCode::SchemaError,
                    site.path,
                    format!(
                        "Values of field '{}' were ignored: only string and enum fields accept them",
                        site.name
                    ),
                );
            }
            Some(None)
        }
    }
}

/// Compile the pattern and check the bounds
fn check_constraints(
    site: FieldSite<'_>,
    field: &mut FieldDescriptor,
    diagnostics: &mut Diagnostics,
) -> Option<()> {
    if let Some(pattern) = field.constraints.pattern.clone() {
        if let Err(e) = Regex::new(&pattern) {
            diagnostics.warning(
                DiagnosticCode::AmbiguousPattern,
                site.path,
                format!(
                    "Pattern '{}' of field '{}' does not compile and was dropped: {}",
                    pattern, site.name, e
                ),
            );
            field.constraints.pattern = None;
            if field.constraints.is_empty() {
                field.constraint_source = ConstraintSource::None;
            }
        }
    }

    let c = &field.constraints;
    if let (Some(min), Some(max)) = (c.min_length, c.max_length) {
        if min > max {
            diagnostics.error(
                DiagnosticCode::SchemaError,
                site.path,
                format!(
                    "Field '{}' has minLength {} greater than maxLength {}",
                    site.name, min, max
                ),
            );
            return None;
        }
    }
    if let (Some(min), Some(max)) = (c.min, c.max) {
        if min > max {
            diagnostics.error(
                DiagnosticCode::SchemaError,
                site.path,
                format!(
                    "Field '{}' has min {} greater than max {}",
                    site.name, min, max
                ),
            );
            return None;
        }
    }
    Some(())
}

// ============================================================================
// Defaults
// ============================================================================

/// Type-check a declared default
pub fn lower_default(
    value: &Value,
    field_type: FieldType,
    enum_values: Option<&[String]>,
) -> Result<DefaultValue, String> {
    let default = match (field_type, value) {
        (_, Value::Null) => DefaultValue::Null,
        (FieldType::String | FieldType::Enum, Value::String(s)) => {
            if let Some(values) = enum_values {
                if !values.iter().any(|v| v == s) {
                    return Err(format!("'{}' is not one of {}", s, values.join(", ")));
                }
            }
            DefaultValue::String(s.clone())
        }
        (FieldType::Number, Value::Number(n)) => n
            .as_f64()
            .map(DefaultValue::Number)
            .ok_or_else(|| format!("{} is out of range", n))?,
        (FieldType::Boolean, Value::Bool(b)) => DefaultValue::Bool(*b),
        (FieldType::Date | FieldType::DateTime, Value::String(s)) => {
            if s.trim().eq_ignore_ascii_case("now") {
                DefaultValue::Now
            } else if is_iso8601(s.trim()) {
                DefaultValue::Date(s.trim().to_string())
            } else {
                return Err(format!("'{}' is neither 'now' nor an ISO-8601 date", s));
            }
        }
        (FieldType::StringArray, Value::Array(items)) => {
            let strings: Option<Vec<String>> = items
                .iter()
                .map(|item| item.as_str().map(str::to_string))
                .collect();
            match strings {
                Some(list) if list.is_empty() => DefaultValue::EmptyArray,
                Some(list) => DefaultValue::StringList(list),
                None => return Err("every element must be a string".to_string()),
            }
        }
        (FieldType::JsonArray | FieldType::ReferenceArray, Value::Array(items))
            if items.is_empty() =>
        {
            DefaultValue::EmptyArray
        }
        (FieldType::JsonArray, Value::Array(_)) | (FieldType::Json, Value::Object(_)) => {
            DefaultValue::Json(value.clone())
        }
        _ => return Err(format!("expected a {} value", field_type)),
    };
    Ok(default)
}

/// `now`-free ISO-8601 date or datetime
pub fn is_iso8601(s: &str) -> bool {
    DateTime::parse_from_rfc3339(s).is_ok()
        || NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").is_ok()
        || NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
        || NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}

fn fallback_example(name: &str, field_type: FieldType) -> Option<Value> {
    let example = match field_type {
        FieldType::String => json!(format!("Sample {}", to_title_case(name).to_lowercase())),
        FieldType::Number => json!(42),
        FieldType::Boolean => json!(true),
        FieldType::Date => json!("2025-01-15"),
        FieldType::DateTime => json!("2025-01-15T09:30:00Z"),
        FieldType::StringArray => json!(["alpha", "beta"]),
        FieldType::Json => json!({}),
        FieldType::JsonArray => json!([]),
        FieldType::Reference | FieldType::ReferenceArray | FieldType::Enum => return None,
    };
    Some(example)
}

// ============================================================================
// Tests
// ============================================================================
