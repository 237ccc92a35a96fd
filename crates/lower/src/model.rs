//! Model lowering
//!
//! Two steps. [`check_names`] validates every model and field name of the
//! configuration up front, applying auto-fixes and reporting all problems
//! at once. [`lower_model`] then lowers the fields of one model, derives its
//! names and infers its access policy.

use crate::context::{FieldName, LoweringContext, ModelName, field_path, model_path};
use crate::field::{FieldSite, lower_field};
use crate::policy::infer_policy;
use stackforge_core::naming::{is_camel_case, is_pascal_case, to_camel_case, to_pascal_case};
use stackforge_core::{Diagnostic, DiagnosticCode, Diagnostics, LowerError};
use stackforge_ir::{
    ModelDescriptor, ProjectConfig, RESERVED_MODEL_PREFIX, RawField, RawModel,
    is_reserved_field_name, is_reserved_model_name,
};
use std::collections::HashMap;

// ============================================================================
// Name checks
// ============================================================================

/// Check and fix every model and field name
///
/// Models whose name cannot be fixed are left out of the result; their
/// errors are in `diagnostics`.
pub fn check_names(config: &ProjectConfig, diagnostics: &mut Diagnostics) -> Vec<ModelName> {
    let mut names = Vec::new();
    let mut seen: HashMap<String, String> = HashMap::new();

    for (index, raw) in config.models.iter().enumerate() {
        let path = model_path(index, &raw.name);
        let Some(name) = fix_model_name(&raw.name, &path, diagnostics) else {
            continue;
        };

        if let Some(first) = seen.get(&name.to_lowercase()) {
            diagnostics.push(
                LowerError::DuplicateModel(name.clone())
                    .into_diagnostic(&path)
                    .with_suggestion(format!("Rename '{}' or merge it into '{}'", raw.name, first)),
            );
            continue;
        }
        seen.insert(name.to_lowercase(), raw.name.clone());

        let fields = check_field_names(&name, raw, &path, diagnostics);
        names.push(ModelName {
            index,
            declared: raw.name.trim().to_string(),
            name,
            fields,
        });
    }
    names
}

/// PascalCase name of a model, after auto-fixes
fn fix_model_name(declared: &str, path: &str, diagnostics: &mut Diagnostics) -> Option<String> {
    let trimmed = declared.trim();
    let mut name = trimmed.to_string();

    if !is_pascal_case(&name) {
        let fixed = to_pascal_case(&name);
        if !is_pascal_case(&fixed) {
            let err = LowerError::NamingViolation {
                path: path.to_string(),
                message: format!(
                    "Model name '{}' cannot be turned into a PascalCase identifier",
                    declared
                ),
            };
            diagnostics.push(
                err.into_diagnostic(path)
                    .with_suggestion("Start the name with a letter"),
            );
            return None;
        }
        diagnostics.push(
            Diagnostic::warning(
                DiagnosticCode::NamingViolation,
                path,
                format!("Model name '{}' is not PascalCase", declared),
            )
            .with_suggestion(fixed.clone()),
        );
        name = fixed;
    }

    if is_reserved_model_name(&name) {
        let prefixed = format!("{}{}", RESERVED_MODEL_PREFIX, name);
        diagnostics.push(
            Diagnostic::warning(
                DiagnosticCode::NameDisambiguated,
                path,
                format!(
                    "Model name '{}' shadows a built-in type and was renamed to '{}'",
                    name, prefixed
                ),
            )
            .with_suggestion(prefixed.clone()),
        );
        name = prefixed;
    }

    Some(name)
}

/// Check the field names of one model
fn check_field_names(
    model: &str,
    raw: &RawModel,
    model_path: &str,
    diagnostics: &mut Diagnostics,
) -> Vec<FieldName> {
    let mut fields = Vec::new();
    let mut seen: HashMap<String, String> = HashMap::new();

    for (index, field) in raw.fields.iter().enumerate() {
        let path = field_path(model_path, index, &field.name);
        let Some(name) = fix_field_name(&field.name, raw.timestamps, &path, diagnostics) else {
            continue;
        };

        if let Some(first) = seen.get(&name) {
            diagnostics.push(
                LowerError::DuplicateField {
                    model: model.to_string(),
                    field: name.clone(),
                }
                .into_diagnostic(&path)
                .with_suggestion(format!("Rename '{}' or remove '{}'", field.name, first)),
            );
            continue;
        }
        seen.insert(name.clone(), field.name.clone());

        fields.push(FieldName {
            index,
            declared: field.name.trim().to_string(),
            name,
        });
    }
    fields
}

/// camelCase name of a field, after auto-fixes
pub fn fix_field_name(
    declared: &str,
    timestamps: bool,
    path: &str,
    diagnostics: &mut Diagnostics,
) -> Option<String> {
    let trimmed = declared.trim();
    let reserved = |name: &str| is_reserved_field_name(name, timestamps);

    if reserved(trimmed) {
        diagnostics.push(reserved_field(trimmed, timestamps, path));
        return None;
    }
    if is_camel_case(trimmed) {
        return Some(trimmed.to_string());
    }

    let fixed = to_camel_case(trimmed);
    if !is_camel_case(&fixed) {
        let err = LowerError::NamingViolation {
            path: path.to_string(),
            message: format!(
                "Field name '{}' cannot be turned into a camelCase identifier",
                declared
            ),
        };
        diagnostics.push(
            err.into_diagnostic(path)
                .with_suggestion("Start the name with a letter"),
        );
        return None;
    }
    if reserved(&fixed) {
        diagnostics.push(reserved_field(&fixed, timestamps, path));
        return None;
    }

    diagnostics.push(
        Diagnostic::warning(
            DiagnosticCode::NamingViolation,
            path,
            format!("Field name '{}' is not camelCase", declared),
        )
        .with_suggestion(fixed.clone()),
    );
    Some(fixed)
}

fn reserved_field(name: &str, timestamps: bool, path: &str) -> Diagnostic {
    let message = if timestamps && matches!(name, "createdAt" | "updatedAt") {
        format!(
            "Field name '{}' is managed automatically when timestamps are on",
            name
        )
    } else {
        format!("Field name '{}' is reserved", name)
    };
    Diagnostic::error(DiagnosticCode::ReservedName, path, message)
}

// ============================================================================
// Model lowering
// ============================================================================

/// Lower one declared model
///
/// Returns `None` when any field failed to lower; the errors are in
/// `diagnostics`.
pub fn lower_model(
    ctx: &LoweringContext<'_>,
    names: &ModelName,
    raw: &RawModel,
    diagnostics: &mut Diagnostics,
) -> Option<ModelDescriptor> {
    let path = model_path(names.index, &names.name);
    let siblings: Vec<String> = names.fields.iter().map(|f| f.name.clone()).collect();

    let mut model = ModelDescriptor::new(&names.name, &ctx.api_prefix)
        .with_original_name(&names.declared)
        .with_timestamps(raw.timestamps);
    model.description = raw.description.clone();

    let mut failed = false;
    for field_name in &names.fields {
        let Some(raw_field) = raw.fields.get(field_name.index) else {
            continue;
        };
        let field_path = field_path(&path, field_name.index, &field_name.name);
        let others: Vec<String> = siblings
            .iter()
            .filter(|s| **s != field_name.name)
            .cloned()
            .collect();
        let site = FieldSite {
            model: &names.name,
            name: &field_name.name,
            path: &field_path,
            siblings: &others,
        };
        match lower_field(ctx, site, raw_field, diagnostics) {
            Some(field) => model.fields.push(field),
            None => failed = true,
        }
    }

    if failed {
        return None;
    }
    model.access_policy = infer_policy(&model, ctx.auth);
    tracing::debug!(
        model = %model.name,
        fields = model.fields.len(),
        sensitivity = %model.access_policy.sensitivity,
        "lowered model"
    );
    Some(model)
}

/// Lower a list of raw fields as the fields of a synthesized model
pub fn lower_attribute_fields(
    ctx: &LoweringContext<'_>,
    model: &str,
    attributes: &[RawField],
    path: &str,
    diagnostics: &mut Diagnostics,
) -> Option<Vec<stackforge_ir::FieldDescriptor>> {
    let mut names: Vec<(usize, String)> = Vec::new();
    for (index, attribute) in attributes.iter().enumerate() {
        let attribute_path = format!("{}.attributes[{}]", path, index);
        if let Some(name) = fix_field_name(&attribute.name, true, &attribute_path, diagnostics) {
            if names.iter().any(|(_, n)| *n == name) {
                diagnostics.push(
                    LowerError::DuplicateField {
                        model: model.to_string(),
                        field: name,
                    }
                    .into_diagnostic(&attribute_path),
                );
                continue;
            }
            names.push((index, name));
        }
    }

    let all: Vec<String> = names.iter().map(|(_, n)| n.clone()).collect();
    let mut fields = Vec::new();
    let mut failed = names.len() != attributes.len();
    for (index, name) in &names {
        let attribute_path = format!("{}.attributes[{}]", path, index);
        let others: Vec<String> = all.iter().filter(|n| *n != name).cloned().collect();
        let site = FieldSite {
            model,
            name,
            path: &attribute_path,
            siblings: &others,
        };
        match lower_field(ctx, site, &attributes[*index], diagnostics) {
            Some(field) => fields.push(field),
            None => failed = true,
        }
    }

    if failed { None } else { Some(fields) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use stackforge_core::Sensitivity;
    use stackforge_ir::RawField;

    fn run(config: &ProjectConfig) -> (Vec<ModelName>, Diagnostics) {
        let mut diagnostics = Diagnostics::new();
        let names = check_names(config, &mut diagnostics);
        (names, diagnostics)
    }

    #[test]
    fn test_model_name_is_fixed_with_warning() {
        let config = ProjectConfig::new("blog").with_model(RawModel::new("blog_post"));
        let (names, diagnostics) = run(&config);

        assert_eq!(names[0].name, "BlogPost");
        assert!(names[0].was_rewritten());
        let warning = diagnostics.warnings().next().unwrap();
        assert_eq!(warning.code, DiagnosticCode::NamingViolation);
        assert_eq!(warning.suggestion.as_deref(), Some("BlogPost"));
        assert!(!diagnostics.has_errors());
    }

    #[test]
    fn test_unfixable_model_name_is_fatal() {
        let config = ProjectConfig::new("blog")
            .with_model(RawModel::new("2fa"))
            .with_model(RawModel::new("  "));
        let (names, diagnostics) = run(&config);
        assert!(names.is_empty());
        assert_eq!(diagnostics.errors().count(), 2);
        assert!(diagnostics.errors().any(|d| d.path == "models[1]"));
    }

    #[test]
    fn test_reserved_model_name_is_prefixed() {
        let config = ProjectConfig::new("docs").with_model(RawModel::new("Document"));
        let (names, diagnostics) = run(&config);
        assert_eq!(names[0].name, "AppDocument");
        assert_eq!(
            diagnostics.warnings().next().map(|d| d.code),
            Some(DiagnosticCode::NameDisambiguated)
        );
    }

    #[test]
    fn test_duplicate_after_fix_is_fatal() {
        let config = ProjectConfig::new("blog")
            .with_model(RawModel::new("BlogPost"))
            .with_model(RawModel::new("blog_post"));
        let (names, diagnostics) = run(&config);
        assert_eq!(names.len(), 1);
        assert_eq!(
            diagnostics.errors().next().map(|d| d.code),
            Some(DiagnosticCode::DuplicateModelName)
        );
    }

    #[test]
    fn test_field_name_checks() {
        let model = RawModel::new("User")
            .with_field(RawField::new("first_name", "string"))
            .with_field(RawField::new("firstName", "string"))
            .with_field(RawField::new("_id", "string"))
            .with_field(RawField::new("createdAt", "date"));
        let config = ProjectConfig::new("app").with_model(model);
        let (names, diagnostics) = run(&config);

        let fields: Vec<&str> = names[0].fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(fields, vec!["firstName"]);
        let codes: Vec<DiagnosticCode> = diagnostics.iter().map(|d| d.code).collect();
        assert_eq!(
            codes,
            vec![
                DiagnosticCode::NamingViolation,
                DiagnosticCode::DuplicateFieldName,
                DiagnosticCode::ReservedName,
                DiagnosticCode::ReservedName,
            ]
        );
    }

    #[test]
    fn test_timestamp_names_allowed_without_timestamps() {
        let model = RawModel::new("Event")
            .without_timestamps()
            .with_field(RawField::new("createdAt", "datetime"));
        let config = ProjectConfig::new("app").with_model(model);
        let (names, diagnostics) = run(&config);
        assert_eq!(names[0].fields.len(), 1);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_lower_model() {
        let model = RawModel::new("Employee")
            .with_description("Staff member")
            .with_field(RawField::new("fullName", "string").required())
            .with_field(RawField::new("salary", "number"));
        let config = ProjectConfig::new("hr").with_model(model);
        let (names, mut diagnostics) = run(&config);
        let ctx = LoweringContext::new(&config, names, "/api/v1".to_string());

        let lowered =
            lower_model(&ctx, &ctx.models()[0], &config.models[0], &mut diagnostics).unwrap();
        assert_eq!(lowered.route_path, "/api/v1/employees");
        assert_eq!(lowered.field_names(), vec!["fullName", "salary"]);
        assert_eq!(lowered.description.as_deref(), Some("Staff member"));
        assert_eq!(lowered.original_name, None);
        assert_eq!(lowered.access_policy.sensitivity, Sensitivity::High);
        assert!(lowered.field("salary").unwrap().sensitive);
    }

    #[test]
    fn test_failed_field_fails_model() {
        let model = RawModel::new("Post").with_field(RawField::new("authorId", "reference"));
        let config = ProjectConfig::new("blog").with_model(model);
        let (names, mut diagnostics) = run(&config);
        let ctx = LoweringContext::new(&config, names, "/api".to_string());
        assert!(lower_model(&ctx, &ctx.models()[0], &config.models[0], &mut diagnostics).is_none());
        assert!(diagnostics.has_errors());
    }
}
