//! End-to-end lowering properties

use pretty_assertions::assert_eq;
use stackforge::base::naming::pluralize;
use stackforge::ir::{DefaultValue, SkipReason};
use stackforge::prelude::*;
use stackforge::{load_config, lower_config, save_ir};
use std::path::PathBuf;

fn demo(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("demos").join(name)
}

fn string_field(name: &str) -> RawField {
    RawField::new(name, "string")
}

fn user_post_tag() -> ProjectConfig {
    ProjectConfig::new("blog")
        .with_model(
            RawModel::new("User")
                .with_field(string_field("email").required().unique())
                .with_field(string_field("name")),
        )
        .with_model(RawModel::new("Post").with_field(string_field("title").required()))
        .with_model(RawModel::new("Tag").with_field(string_field("label")))
}

fn field_names(ir: &ProjectIr, model: &str) -> Vec<String> {
    ir.model(model)
        .map(|m| m.fields.iter().map(|f| f.name.clone()).collect())
        .unwrap_or_default()
}

#[test]
fn test_pluralize_table() {
    let table = [
        ("User", "Users"),
        ("Category", "Categories"),
        ("Class", "Classes"),
        ("Leaf", "Leaves"),
        ("Person", "People"),
    ];
    for (singular, plural) in table {
        assert_eq!(pluralize(singular), plural, "pluralize({})", singular);
    }
}

#[test]
fn test_no_relationships_leaves_fields_alone() {
    let lowered = lower_config(&user_post_tag()).unwrap();

    assert!(lowered.ir.relationships.is_empty());
    assert!(lowered.skipped.is_empty());
    assert_eq!(field_names(&lowered.ir, "User"), vec!["email", "name"]);
    assert_eq!(field_names(&lowered.ir, "Post"), vec!["title"]);
    assert_eq!(field_names(&lowered.ir, "Tag"), vec!["label"]);
}

#[test]
fn test_duplicate_one_to_many_injects_one_field() {
    let config = user_post_tag()
        .with_relationship(RawRelationship::new(RelationKind::OneToMany, "User", "Post"))
        .with_relationship(RawRelationship::new(RelationKind::OneToMany, "User", "Post"));
    let lowered = lower_config(&config).unwrap();

    assert_eq!(field_names(&lowered.ir, "Post"), vec!["title", "userId"]);
    assert_eq!(lowered.ir.relationships.len(), 1);
    assert_eq!(lowered.skipped.len(), 1);
    assert_eq!(lowered.skipped[0].reason, SkipReason::FieldExists);
}

#[test]
fn test_join_model_is_independent_of_declaration_order() {
    let follow = RawRelationship::new(RelationKind::ManyToMany, "User", "Tag")
        .through("UserFollowTag")
        .with_attribute(RawField::new("followedAt", "datetime").required())
        .with_attribute(RawField::new("muted", "boolean"));

    let forward = user_post_tag().with_relationship(follow.clone());
    let mut backward = forward.clone();
    backward.models.reverse();

    let forward = lower_config(&forward).unwrap();
    let backward = lower_config(&backward).unwrap();

    for lowered in [&forward, &backward] {
        let joins: Vec<&ModelDescriptor> = lowered.ir.synthesized_models().collect();
        assert_eq!(joins.len(), 1);
        assert_eq!(joins[0].name, "UserFollowTag");
        assert_eq!(field_names(&lowered.ir, "UserFollowTag"), vec!["followedAt", "muted"]);
        assert_eq!(field_names(&lowered.ir, "User"), vec!["email", "name"]);
    }
    assert_eq!(
        forward.ir.model("UserFollowTag"),
        backward.ir.model("UserFollowTag")
    );
}

#[test]
fn test_unknown_target_names_the_model() {
    let config = user_post_tag()
        .with_relationship(RawRelationship::new(RelationKind::OneToMany, "User", "Ghost"));
    let err = lower_config(&config).unwrap_err();

    let unknown: Vec<&Diagnostic> = err
        .diagnostics()
        .iter()
        .filter(|d| d.code == DiagnosticCode::UnknownModelReference)
        .collect();
    assert_eq!(unknown.len(), 1);
    assert!(unknown[0].message.contains("Ghost"));
    assert_eq!(unknown[0].path, "relationships[0].target");
}

#[test]
fn test_user_post_tag_injection() {
    let config = user_post_tag()
        .with_relationship(RawRelationship::new(RelationKind::OneToMany, "User", "Post"))
        .with_relationship(
            RawRelationship::new(RelationKind::ManyToMany, "Post", "Tag").with_field_name("tags"),
        );
    let lowered = lower_config(&config).unwrap();
    let ir = &lowered.ir;

    assert_eq!(field_names(ir, "Post"), vec!["title", "userId", "tags"]);
    assert_eq!(field_names(ir, "User"), vec!["email", "name"]);
    assert_eq!(field_names(ir, "Tag"), vec!["label"]);

    let post = ir.model("Post").unwrap();
    let user_id = post.field("userId").unwrap();
    assert_eq!(user_id.declared_type, FieldType::Reference);
    assert_eq!(user_id.referenced_model.as_deref(), Some("User"));
    assert!(user_id.required);

    let tags = post.field("tags").unwrap();
    assert_eq!(tags.declared_type, FieldType::ReferenceArray);
    assert_eq!(tags.referenced_model.as_deref(), Some("Tag"));
    assert!(!tags.required);
    assert_eq!(tags.default_value, Some(DefaultValue::EmptyArray));
}

#[test]
fn test_credit_card_transaction_is_admin_only() {
    let config = ProjectConfig::new("bank").with_model(
        RawModel::new("transaction")
            .with_field(RawField::new("amount", "number").required())
            .with_field(string_field("creditCardNumber")),
    );
    let lowered = lower_config(&config).unwrap();
    let transaction = lowered.ir.model("Transaction").unwrap();
    let policy = &transaction.access_policy;

    assert_eq!(policy.sensitivity, Sensitivity::High);
    assert_eq!(policy.create, vec!["admin"]);
    assert_eq!(policy.update, vec!["admin"]);
    assert_eq!(policy.delete, vec!["admin"]);
    assert_eq!(transaction.original_name.as_deref(), Some("transaction"));
    assert_eq!(
        lowered
            .diagnostics
            .with_code(DiagnosticCode::NamingViolation)
            .count(),
        1
    );
}

#[test]
fn test_chain_seeds_in_dependency_order() {
    let config = ProjectConfig::new("chain")
        .with_model(RawModel::new("C").with_field(RawField::new("b", "reference").references("B")))
        .with_model(RawModel::new("B").with_field(RawField::new("a", "reference").references("A")))
        .with_model(RawModel::new("A").with_field(string_field("label")));
    let lowered = lower_with(&config, LowerOptions::new().with_seed(true)).unwrap();
    let plan = lowered.ir.seed_plan.unwrap();

    assert_eq!(plan.order(), vec!["A", "B", "C"]);
    assert!(!plan.has_deferred());
}

#[test]
fn test_demo_configs_lower() {
    let blog = load_config(demo("blog.json")).unwrap();
    let lowered = lower_config(&blog).unwrap();
    let ir = &lowered.ir;

    assert_eq!(ir.model_count(), 5);
    assert_eq!(ir.auth.user_model.as_deref(), Some("User"));
    assert_eq!(ir.model("Post").unwrap().route_path, "/api/v1/posts");
    assert!(ir.model("UserFollowTag").unwrap().synthesized);

    let plan = ir.seed_plan.as_ref().unwrap();
    assert_eq!(plan.order(), vec!["User", "Tag", "Post", "Comment", "UserFollowTag"]);
    assert_eq!(plan.plans[0].count, 20);

    let shop = load_config(demo("shop.toml")).unwrap();
    let lowered = lower_config(&shop).unwrap();
    let payment = lowered.ir.model("Payment").unwrap();
    assert_eq!(payment.access_policy.sensitivity, Sensitivity::High);
    let order = lowered.ir.model("Order").unwrap();
    assert_eq!(
        order.field_names(),
        vec!["status", "total", "customerId", "products", "payment"]
    );
}

#[test]
fn test_save_ir() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("out/blog.ir.json");
    let lowered = lower_config(&user_post_tag()).unwrap();

    save_ir(&lowered.ir, &path, true).unwrap();
    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(written["project"]["name"], "blog");
    assert_eq!(written["models"].as_array().unwrap().len(), 3);
}

#[test]
fn test_reserved_through_name_lowers() {
    let config = user_post_tag().with_relationship(
        RawRelationship::new(RelationKind::ManyToMany, "Post", "Tag")
            .through("schema")
            .with_attribute(RawField::new("position", "number")),
    );
    let lowered = lower_config(&config).unwrap();

    let join = lowered.ir.model("AppSchema").unwrap();
    assert!(join.synthesized);
    assert!(lowered.ir.model("Schema").is_none());
    assert_eq!(
        lowered
            .diagnostics
            .with_code(DiagnosticCode::NameDisambiguated)
            .count(),
        1
    );
}
