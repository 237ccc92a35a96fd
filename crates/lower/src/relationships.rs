//! Relationship resolution
//!
//! Resolution runs in two explicit phases:
//!
//! 1. [`plan`] walks the normalized declarations in order, validates both
//!    endpoints, lowers join attributes, synthesizes join models and emits
//!    one [`FieldInjection`] per relationship that needs a reference field.
//! 2. [`apply_injections`] adds those fields to a model list and returns the
//!    new list. An injection whose field name is already taken on the
//!    receiving model is skipped, so applying the same plan twice (or two
//!    identical declarations) never duplicates a field.

use crate::context::LoweringContext;
use crate::model::{fix_field_name, lower_attribute_fields};
use crate::policy::infer_policy;
use stackforge_core::naming::to_pascal_case;
use stackforge_core::{Diagnostic, DiagnosticCode, Diagnostics, LowerError, RelationKind};
use stackforge_ir::{
    AuthConfig, FieldInjection, ModelDescriptor, ProjectConfig, RawRelationship,
    RelationshipDescriptor, SkipReason, SkippedInjection, create_reference_field,
    default_field_name, join_model_name, reference_field_name,
};
use std::collections::HashSet;

// ============================================================================
// Normalization
// ============================================================================

/// A relationship declaration with its source filled in
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRelationship {
    /// Diagnostic path of the declaration
    pub path: String,
    /// Source model as written (or the owning model for inline declarations)
    pub source: String,
    pub declaration: RawRelationship,
}

/// Project-level declarations first, then inline ones in model order
pub fn normalize(config: &ProjectConfig) -> Vec<NormalizedRelationship> {
    let top_level = config
        .relationships
        .iter()
        .enumerate()
        .map(|(index, declaration)| NormalizedRelationship {
            path: format!("relationships[{}]", index),
            source: declaration.source.clone().unwrap_or_default(),
            declaration: declaration.clone(),
        });

    let inline = config.models.iter().flat_map(|model| {
        model
            .relationships
            .iter()
            .enumerate()
            .map(move |(index, declaration)| NormalizedRelationship {
                path: format!("models.{}.relationships[{}]", model.name.trim(), index),
                source: declaration
                    .source
                    .clone()
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or_else(|| model.name.clone()),
                declaration: declaration.clone(),
            })
    });

    top_level.chain(inline).collect()
}

// ============================================================================
// Plan
// ============================================================================

/// Output of the planning phase
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RelationshipPlan {
    /// Resolved relationships, normalization order
    pub relationships: Vec<RelationshipDescriptor>,
    /// Reference fields to add, in the same order
    pub injections: Vec<FieldInjection>,
    /// Synthesized join models
    pub join_models: Vec<ModelDescriptor>,
}

impl RelationshipPlan {
    pub fn is_empty(&self) -> bool {
        self.relationships.is_empty()
    }
}

/// Plan every relationship of the configuration
pub fn plan(
    ctx: &LoweringContext<'_>,
    declarations: &[NormalizedRelationship],
    diagnostics: &mut Diagnostics,
) -> RelationshipPlan {
    let mut plan = RelationshipPlan::default();
    let mut seen_ids = HashSet::new();

    for declaration in declarations {
        let Some(relationship) = plan_one(ctx, declaration, &mut plan, diagnostics) else {
            continue;
        };
        if !seen_ids.insert(relationship.id) {
            tracing::debug!(
                relationship = %relationship.name,
                path = %declaration.path,
                "duplicate relationship declaration, first one kept"
            );
            continue;
        }
        plan.relationships.push(relationship);
    }
    plan
}

fn plan_one(
    ctx: &LoweringContext<'_>,
    normalized: &NormalizedRelationship,
    plan: &mut RelationshipPlan,
    diagnostics: &mut Diagnostics,
) -> Option<RelationshipDescriptor> {
    let path = normalized.path.as_str();
    let raw = &normalized.declaration;

    let source = resolve_endpoint(ctx, &normalized.source, &format!("{}.source", path), diagnostics);
    let target = resolve_endpoint(ctx, &raw.target, &format!("{}.target", path), diagnostics);
    let (source, target) = (source?, target?);

    let field_name = match raw.field_name.as_deref().filter(|n| !n.trim().is_empty()) {
        Some(name) => fix_field_name(name, true, &format!("{}.fieldName", path), diagnostics)?,
        None => default_field_name(raw.kind, &target),
    };

    let mut relationship = RelationshipDescriptor::new(raw.kind, &source, &target, &field_name);
    relationship.through = raw.through.clone().filter(|t| !t.trim().is_empty());

    if relationship.self_referential {
        diagnostics.warning(
            DiagnosticCode::SelfReference,
            path,
            format!("Model '{}' references itself through '{}'", source, field_name),
        );
    }

    if !raw.attributes.is_empty() && raw.kind != RelationKind::ManyToMany {
        diagnostics.push(
            Diagnostic::warning(
                DiagnosticCode::IgnoredAttributes,
                path,
                format!(
                    "Attributes are only supported on many-to-many relationships; {} attribute(s) of '{}' were ignored",
                    raw.attributes.len(),
                    relationship.name
                ),
            )
            .with_suggestion("Move the attributes onto one of the models"),
        );
    }

    if raw.kind == RelationKind::ManyToMany && !raw.attributes.is_empty() {
        let join = join_model_name(&source, &target, relationship.through.as_deref());
        if let Some(through) = relationship.through.as_deref() {
            let plain = to_pascal_case(through.trim());
            if plain != join {
                diagnostics.push(
                    Diagnostic::warning(
                        DiagnosticCode::NameDisambiguated,
                        format!("{}.through", path),
                        format!(
                            "Join model name '{}' shadows a built-in type and was renamed to '{}'",
                            plain, join
                        ),
                    )
                    .with_suggestion(join.clone()),
                );
            }
        }
        if ctx.is_declared(&join) {
            diagnostics.push(
                LowerError::DuplicateModel(join.clone())
                    .into_diagnostic(path)
                    .with_suggestion("Pick a different 'through' name"),
            );
            return None;
        }

        let attributes = lower_attribute_fields(ctx, &join, &raw.attributes, path, diagnostics)?;
        relationship.attributes = attributes.clone();

        if plan.join_models.iter().any(|m| m.name == join) {
            diagnostics.warning(
                DiagnosticCode::DuplicateJoinModel,
                path,
                format!("Join model '{}' was already synthesized; keeping the first", join),
            );
        } else {
            let mut model = ModelDescriptor::new(&join, &ctx.api_prefix)
                .synthesized()
                .with_description(format!("Join model between {} and {}", source, target));
            model.fields = attributes;
            model.access_policy = infer_policy(&model, ctx.auth);
            tracing::debug!(join_model = %join, "synthesized join model");
            plan.join_models.push(model);
        }
        return Some(relationship.with_join_model(join));
    }

    let (receiver, name, points_at) = match raw.kind {
        RelationKind::OneToMany => {
            let name = match raw.foreign_key.as_deref().filter(|k| !k.trim().is_empty()) {
                Some(key) => {
                    fix_field_name(key, true, &format!("{}.foreignKey", path), diagnostics)?
                }
                None => reference_field_name(&source),
            };
            (target.clone(), name, source.clone())
        }
        RelationKind::ManyToOne | RelationKind::OneToOne | RelationKind::ManyToMany => {
            (source.clone(), field_name.clone(), target.clone())
        }
    };

    let field = create_reference_field(raw.kind, &name, &points_at, relationship.id, ctx.engine);
    plan.injections
        .push(FieldInjection::new(relationship.id, &receiver, field));
    Some(relationship.injected(receiver, name))
}

fn resolve_endpoint(
    ctx: &LoweringContext<'_>,
    reference: &str,
    path: &str,
    diagnostics: &mut Diagnostics,
) -> Option<String> {
    match ctx.resolve(reference) {
        Some(name) => Some(name.to_string()),
        None => {
            diagnostics.push(
                LowerError::UnknownModelReference(reference.trim().to_string())
                    .into_diagnostic(path),
            );
            None
        }
    }
}

// ============================================================================
// Apply
// ============================================================================

/// Models after injection, plus the injections that were not applied
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Injected {
    pub models: Vec<ModelDescriptor>,
    pub skipped: Vec<SkippedInjection>,
}

/// Add planned reference fields to `models`
///
/// Access policies of every model are re-inferred afterwards since injected
/// field names count as sensitivity signals too.
pub fn apply_injections(
    models: Vec<ModelDescriptor>,
    injections: &[FieldInjection],
    auth: &AuthConfig,
) -> Injected {
    let mut models = models;
    let mut skipped = Vec::new();

    for injection in injections {
        let field_name = injection.field.name.clone();
        let Some(model) = models.iter_mut().find(|m| m.name == injection.model) else {
            skipped.push(SkippedInjection {
                relationship_id: injection.relationship_id,
                model: injection.model.clone(),
                field_name,
                reason: SkipReason::UnknownModel,
            });
            continue;
        };

        if model.has_field(&field_name) {
            tracing::debug!(
                model = %model.name,
                field = %field_name,
                "field already present, injection skipped"
            );
            skipped.push(SkippedInjection {
                relationship_id: injection.relationship_id,
                model: injection.model.clone(),
                field_name,
                reason: SkipReason::FieldExists,
            });
            continue;
        }
        model.fields.push(injection.field.clone());
    }

    for model in &mut models {
        model.access_policy = infer_policy(model, auth);
    }

    Injected { models, skipped }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{check_names, lower_model};
    use pretty_assertions::assert_eq;
    use stackforge_core::FieldType;
    use stackforge_ir::{DefaultValue, RawField, RawModel};

    struct Resolved {
        models: Vec<ModelDescriptor>,
        plan: RelationshipPlan,
        diagnostics: Diagnostics,
    }

    fn resolve(config: &ProjectConfig) -> Resolved {
        let mut diagnostics = Diagnostics::new();
        let names = check_names(config, &mut diagnostics);
        let ctx = LoweringContext::new(config, names, "/api".to_string());
        let models: Vec<ModelDescriptor> = ctx
            .models()
            .iter()
            .filter_map(|n| lower_model(&ctx, n, &config.models[n.index], &mut diagnostics))
            .collect();
        let declarations = normalize(config);
        let plan = plan(&ctx, &declarations, &mut diagnostics);
        Resolved {
            models,
            plan,
            diagnostics,
        }
    }

    fn blog() -> ProjectConfig {
        ProjectConfig::new("blog")
            .with_model(RawModel::new("User").with_field(RawField::new("email", "string")))
            .with_model(RawModel::new("Post").with_field(RawField::new("title", "string")))
            .with_model(RawModel::new("Tag").with_field(RawField::new("label", "string")))
    }

    #[test]
    fn test_normalization_order() {
        let config = ProjectConfig::new("app")
            .with_model(
                RawModel::new("Post")
                    .with_relationship(RawRelationship::inline(RelationKind::ManyToMany, "Tag")),
            )
            .with_relationship(RawRelationship::new(RelationKind::OneToMany, "User", "Post"));
        let normalized = normalize(&config);

        assert_eq!(normalized.len(), 2);
        assert_eq!(normalized[0].path, "relationships[0]");
        assert_eq!(normalized[0].source, "User");
        assert_eq!(normalized[1].path, "models.Post.relationships[0]");
        assert_eq!(normalized[1].source, "Post");
    }

    #[test]
    fn test_one_to_many_injects_into_target() {
        let config =
            blog().with_relationship(RawRelationship::new(RelationKind::OneToMany, "User", "Post"));
        let resolved = resolve(&config);
        let plan = &resolved.plan;

        assert_eq!(plan.injections.len(), 1);
        assert_eq!(plan.injections[0].model, "Post");
        assert_eq!(plan.injections[0].field.name, "userId");
        assert!(plan.injections[0].field.required);

        let relationship = &plan.relationships[0];
        assert_eq!(relationship.name, "UserPosts");
        assert_eq!(relationship.field_name, "posts");
        assert_eq!(relationship.inverse_name, "user");
        assert_eq!(relationship.injected_into.as_deref(), Some("Post"));
        assert_eq!(relationship.injected_field.as_deref(), Some("userId"));
    }

    #[test]
    fn test_foreign_key_override() {
        let config = blog().with_relationship(
            RawRelationship::new(RelationKind::OneToMany, "User", "Post")
                .with_foreign_key("author_id"),
        );
        let resolved = resolve(&config);
        assert_eq!(resolved.plan.injections[0].field.name, "authorId");
        assert_eq!(
            resolved
                .diagnostics
                .with_code(DiagnosticCode::NamingViolation)
                .count(),
            1
        );
    }

    #[test]
    fn test_reserved_foreign_key_is_rejected_at_declaration() {
        let config = blog().with_relationship(
            RawRelationship::new(RelationKind::OneToMany, "User", "Post").with_foreign_key("db"),
        );
        let resolved = resolve(&config);

        assert!(resolved.plan.injections.is_empty());
        let error = resolved.diagnostics.errors().next().unwrap();
        assert_eq!(error.code, DiagnosticCode::ReservedName);
        assert_eq!(error.path, "relationships[0].foreignKey");
    }

    #[test]
    fn test_field_placement_by_kind() {
        let config = blog()
            .with_relationship(RawRelationship::new(RelationKind::ManyToOne, "Post", "User"))
            .with_relationship(
                RawRelationship::new(RelationKind::OneToOne, "User", "Tag")
                    .with_field_name("favoriteTag"),
            )
            .with_relationship(RawRelationship::new(RelationKind::ManyToMany, "Post", "Tag"));
        let plan = resolve(&config).plan;

        let placed: Vec<(&str, &str)> = plan
            .injections
            .iter()
            .map(|i| (i.model.as_str(), i.field.name.as_str()))
            .collect();
        assert_eq!(
            placed,
            vec![("Post", "user"), ("User", "favoriteTag"), ("Post", "tags")]
        );
        assert!(plan.injections[1].field.unique);
        assert_eq!(plan.injections[2].field.declared_type, FieldType::ReferenceArray);
        assert_eq!(
            plan.injections[2].field.default_value,
            Some(DefaultValue::EmptyArray)
        );
    }

    #[test]
    fn test_unknown_target_names_the_model() {
        let config =
            blog().with_relationship(RawRelationship::new(RelationKind::OneToMany, "User", "Ghost"));
        let resolved = resolve(&config);

        assert!(resolved.plan.is_empty());
        let error = resolved.diagnostics.errors().next().unwrap();
        assert_eq!(error.code, DiagnosticCode::UnknownModelReference);
        assert_eq!(error.path, "relationships[0].target");
        assert!(error.message.contains("Ghost"));
    }

    #[test]
    fn test_resolves_declared_names() {
        let config = ProjectConfig::new("blog")
            .with_model(RawModel::new("blog_post"))
            .with_model(RawModel::new("Comment"))
            .with_relationship(RawRelationship::new(
                RelationKind::OneToMany,
                "blog_post",
                "Comment",
            ));
        let plan = resolve(&config).plan;
        assert_eq!(plan.relationships[0].source_model, "BlogPost");
        assert_eq!(plan.injections[0].field.name, "blogPostId");
    }

    #[test]
    fn test_join_model_synthesis() {
        let follow = RawRelationship::new(RelationKind::ManyToMany, "User", "Tag")
            .through("UserFollowTag")
            .with_field_name("followedTags")
            .with_attribute(RawField::new("followedAt", "datetime").with_default(serde_json::json!("now")));
        let config = blog().with_relationship(follow.clone()).with_relationship(
            follow.with_field_name("mutedTags"),
        );
        let resolved = resolve(&config);
        let plan = &resolved.plan;

        assert_eq!(plan.join_models.len(), 1);
        let join = &plan.join_models[0];
        assert_eq!(join.name, "UserFollowTag");
        assert!(join.synthesized);
        assert_eq!(join.field_names(), vec!["followedAt"]);
        assert_eq!(join.fields, plan.relationships[0].attributes);
        assert!(plan.injections.is_empty());
        assert_eq!(plan.relationships[0].join_model.as_deref(), Some("UserFollowTag"));
        assert_eq!(
            resolved
                .diagnostics
                .with_code(DiagnosticCode::DuplicateJoinModel)
                .count(),
            1
        );
    }

    #[test]
    fn test_join_model_clashing_with_declared_model() {
        let config = blog()
            .with_model(RawModel::new("PostTag"))
            .with_relationship(
                RawRelationship::new(RelationKind::ManyToMany, "Post", "Tag")
                    .with_attribute(RawField::new("position", "number")),
            );
        let resolved = resolve(&config);
        assert!(resolved.plan.join_models.is_empty());
        assert_eq!(
            resolved.diagnostics.errors().next().map(|d| d.code),
            Some(DiagnosticCode::DuplicateModelName)
        );
    }

    #[test]
    fn test_reserved_join_model_name_is_prefixed() {
        let config = blog().with_relationship(
            RawRelationship::new(RelationKind::ManyToMany, "Post", "Tag")
                .through("Schema")
                .with_attribute(RawField::new("position", "number")),
        );
        let resolved = resolve(&config);

        assert!(!resolved.diagnostics.has_errors());
        assert_eq!(resolved.plan.join_models[0].name, "AppSchema");
        assert_eq!(resolved.plan.relationships[0].join_model.as_deref(), Some("AppSchema"));
        let warning = resolved
            .diagnostics
            .with_code(DiagnosticCode::NameDisambiguated)
            .next()
            .unwrap();
        assert_eq!(warning.path, "relationships[0].through");
    }

    #[test]
    fn test_ignored_attributes_and_self_reference() {
        let config = blog().with_relationship(
            RawRelationship::new(RelationKind::ManyToOne, "User", "User")
                .with_field_name("mentor")
                .with_attribute(RawField::new("since", "date")),
        );
        let resolved = resolve(&config);
        let codes: Vec<DiagnosticCode> = resolved.diagnostics.warnings().map(|d| d.code).collect();
        assert!(codes.contains(&DiagnosticCode::SelfReference));
        assert!(codes.contains(&DiagnosticCode::IgnoredAttributes));
        assert!(resolved.plan.relationships[0].self_referential);
        assert_eq!(resolved.plan.injections[0].field.name, "mentor");
    }

    #[test]
    fn test_apply_without_relationships_is_noop() {
        let resolved = resolve(&blog());
        let before = resolved.models.clone();
        let injected = apply_injections(resolved.models, &[], &AuthConfig::default());
        assert_eq!(injected.models, before);
        assert!(injected.skipped.is_empty());
    }

    #[test]
    fn test_apply_is_idempotent() {
        let config =
            blog().with_relationship(RawRelationship::new(RelationKind::OneToMany, "User", "Post"));
        let resolved = resolve(&config);
        let twice: Vec<FieldInjection> = resolved
            .plan
            .injections
            .iter()
            .chain(resolved.plan.injections.iter())
            .cloned()
            .collect();

        let injected = apply_injections(resolved.models, &twice, &AuthConfig::default());
        let post = injected.models.iter().find(|m| m.name == "Post").unwrap();
        assert_eq!(post.field_names(), vec!["title", "userId"]);
        assert_eq!(injected.skipped.len(), 1);
        assert_eq!(injected.skipped[0].reason, SkipReason::FieldExists);

        let again = apply_injections(injected.models.clone(), &twice, &AuthConfig::default());
        assert_eq!(again.models, injected.models);
    }

    #[test]
    fn test_apply_to_unknown_model_is_skipped() {
        let resolved = resolve(&blog());
        let field = create_reference_field(
            RelationKind::ManyToOne,
            "owner",
            "User",
            ghost_id(),
            stackforge_core::StorageEngine::MongoDb,
        );
        let injection = FieldInjection::new(ghost_id(), "Ghost", field);
        let injected = apply_injections(resolved.models, &[injection], &AuthConfig::default());
        assert_eq!(injected.skipped[0].reason, SkipReason::UnknownModel);
    }

    fn ghost_id() -> stackforge_core::RelationshipId {
        stackforge_ir::relationship_id(RelationKind::ManyToOne, "Ghost", "User", "owner")
    }
}
