//! Relationship Helper Functions
//!
//! Naming rules for relationships and the reference fields they inject.
//!
//! ## Where the reference field goes
//!
//! - **One-to-Many**: required reference on the "many" side (the target)
//! - **Many-to-One**: required reference on the source
//! - **One-to-One**: required, unique reference on the source
//! - **Many-to-Many**: optional reference array on the source, or a join
//!   model when the relationship carries attributes

use crate::field::{DefaultValue, FieldDescriptor};
use crate::model::{ModelDescriptor, RESERVED_MODEL_PREFIX, is_reserved_model_name};
use stackforge_core::naming::{pluralize, to_camel_case, to_pascal_case};
use stackforge_core::{RelationKind, RelationshipId, StorageEngine, ValidatorTag};

// ============================================================================
// Name generation
// ============================================================================

/// Generate a reference field name from a model name
///
/// # Examples
///
/// - "User" -> "userId"
/// - "BlogPost" -> "blogPostId"
pub fn reference_field_name(model_name: &str) -> String {
    format!("{}Id", to_camel_case(model_name))
}

/// Default source-side field name of a relationship
///
/// Single-valued kinds use the camelCase target name, the others its plural.
///
/// # Examples
///
/// - (ManyToOne, "User") -> "user"
/// - (ManyToMany, "Tag") -> "tags"
pub fn default_field_name(kind: RelationKind, target: &str) -> String {
    let camel = to_camel_case(target);
    match kind {
        RelationKind::ManyToOne | RelationKind::OneToOne => camel,
        RelationKind::OneToMany | RelationKind::ManyToMany => pluralize(&camel),
    }
}

/// Name of the relation as seen from the target
///
/// # Examples
///
/// - (OneToMany, "User") -> "user"   (each Post has one user)
/// - (ManyToOne, "Post") -> "posts"  (each User has many posts)
pub fn inverse_name(kind: RelationKind, source: &str) -> String {
    default_field_name(kind.inverse(), source)
}

/// Generate a relationship name from two model names
///
/// # Examples
///
/// - ("User", "Post") -> "UserPosts"
/// - ("Author", "Person") -> "AuthorPeople"
pub fn relationship_name(source: &str, target: &str) -> String {
    format!("{}{}", source, pluralize(&to_pascal_case(target)))
}

/// Name of the join model of a many-to-many relationship
///
/// # Examples
///
/// - ("User", "Tag", Some("user_follow_tag")) -> "UserFollowTag"
/// - ("Student", "Course", None) -> "StudentCourse"
/// - ("Post", "Tag", Some("schema")) -> "AppSchema"
pub fn join_model_name(source: &str, target: &str, through: Option<&str>) -> String {
    let name = match through {
        Some(name) if !name.trim().is_empty() => to_pascal_case(name),
        _ => format!("{}{}", source, target),
    };
    if is_reserved_model_name(&name) {
        format!("{}{}", RESERVED_MODEL_PREFIX, name)
    } else {
        name
    }
}

// ============================================================================
// Reference field creation
// ============================================================================

/// Create the reference field a relationship injects
///
/// `target` is the model the field points at, not the model receiving it.
pub fn create_reference_field(
    kind: RelationKind,
    name: &str,
    target: &str,
    relationship: RelationshipId,
    engine: StorageEngine,
) -> FieldDescriptor {
    let mut field = match kind {
        RelationKind::ManyToMany => {
            let mut field = FieldDescriptor::reference(name, target, true, engine)
                .with_default(DefaultValue::EmptyArray);
            field.validators = vec![
                ValidatorTag::IsArray,
                ValidatorTag::Each(Box::new(ValidatorTag::IsReferenceId)),
            ];
            field
        }
        RelationKind::OneToOne => FieldDescriptor::reference(name, target, false, engine)
            .required()
            .unique()
            .with_validator(ValidatorTag::Required)
            .with_validator(ValidatorTag::IsReferenceId),
        RelationKind::OneToMany | RelationKind::ManyToOne => {
            FieldDescriptor::reference(name, target, false, engine)
                .required()
                .with_validator(ValidatorTag::Required)
                .with_validator(ValidatorTag::IsReferenceId)
        }
    };
    field.description = Some(format!("Reference to {}", target));
    field.injected_by = Some(relationship);
    field
}

/// Check if a model already has a reference field pointing at `target`
pub fn has_reference_to(model: &ModelDescriptor, target: &str) -> bool {
    model.references(target)
}

/// Get the first reference field of `model` pointing at `target`
pub fn reference_field_to<'a>(
    model: &'a ModelDescriptor,
    target: &str,
) -> Option<&'a FieldDescriptor> {
    model
        .reference_fields()
        .find(|f| f.referenced_model.as_deref() == Some(target))
}

// ============================================================================
// Tests
// ============================================================================
