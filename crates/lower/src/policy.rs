//! Access policy inference
//!
//! A model's sensitivity is the highest tier any signal raises it to:
//! its name matching a sensitive-entity vocabulary, or one of its field
//! names matching a sensitive-field vocabulary. The tier then decides which
//! roles may create, update and delete records. Reads are never restricted
//! here.

use stackforge_core::Sensitivity;
use stackforge_ir::{AccessPolicy, AuthConfig, ModelDescriptor};

/// Field name substrings that make a model highly sensitive
pub const HIGH_SENSITIVITY_FIELDS: &[&str] =
    &["password", "ssn", "salary", "secret", "token", "credit"];

/// Personal-contact field name substrings
pub const MEDIUM_SENSITIVITY_FIELDS: &[&str] = &["email", "phone", "address", "birth"];

/// Model name substrings for records that move money or hold credentials
pub const HIGH_SENSITIVITY_MODELS: &[&str] = &[
    "payment",
    "payroll",
    "invoice",
    "billing",
    "credential",
    "secret",
    "wallet",
    "bank",
    "salary",
    "apikey",
];

/// Model name substrings for records about people
pub const MEDIUM_SENSITIVITY_MODELS: &[&str] = &[
    "customer",
    "employee",
    "patient",
    "profile",
    "contact",
    "member",
    "account",
];

fn matches_any(name: &str, vocabulary: &[&str]) -> bool {
    let lower = name.to_lowercase();
    vocabulary.iter().any(|needle| lower.contains(needle))
}

/// Sensitivity signalled by a field name alone
pub fn field_sensitivity(name: &str) -> Sensitivity {
    if matches_any(name, HIGH_SENSITIVITY_FIELDS) {
        Sensitivity::High
    } else if matches_any(name, MEDIUM_SENSITIVITY_FIELDS) {
        Sensitivity::Medium
    } else {
        Sensitivity::Low
    }
}

/// Sensitivity signalled by a model name alone
pub fn model_sensitivity(name: &str) -> Sensitivity {
    if matches_any(name, HIGH_SENSITIVITY_MODELS) {
        Sensitivity::High
    } else if matches_any(name, MEDIUM_SENSITIVITY_MODELS) {
        Sensitivity::Medium
    } else {
        Sensitivity::Low
    }
}

/// Infer the access policy of a lowered model
///
/// Role names come from `auth`. With auth disabled the sensitivity and its
/// reasons are still recorded but no role list is filled in.
pub fn infer_policy(model: &ModelDescriptor, auth: &AuthConfig) -> AccessPolicy {
    let mut sensitivity = Sensitivity::Low;
    let mut reasons = Vec::new();

    let tier = model_sensitivity(&model.name);
    if tier > Sensitivity::Low {
        reasons.push(format!("model:{}", model.name));
        sensitivity = sensitivity.max(tier);
    }
    for field in &model.fields {
        let tier = field_sensitivity(&field.name);
        if tier > Sensitivity::Low {
            reasons.push(format!("field:{}", field.name));
            sensitivity = sensitivity.max(tier);
        }
    }

    let mut policy = AccessPolicy {
        sensitivity,
        reasons,
        ..AccessPolicy::unrestricted()
    };
    if !auth.enabled {
        return policy;
    }

    let admin = vec![auth.admin_role.clone()];
    match sensitivity {
        Sensitivity::High => {
            policy.create = admin.clone();
            policy.update = admin.clone();
            policy.delete = admin;
        }
        Sensitivity::Medium => {
            let staff = vec![auth.admin_role.clone(), auth.manager_role.clone()];
            policy.create = staff.clone();
            policy.update = staff;
            policy.delete = admin;
        }
        Sensitivity::Low => {}
    }
    policy
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use stackforge_core::{FieldType, StorageEngine};
    use stackforge_ir::{CrudOperation, FieldDescriptor};

    fn model(name: &str, fields: &[&str]) -> ModelDescriptor {
        fields.iter().fold(ModelDescriptor::new(name, "/api"), |m, f| {
            m.with_field(FieldDescriptor::new(*f, FieldType::String, StorageEngine::MongoDb))
        })
    }

    #[test]
    fn test_field_tiers() {
        assert_eq!(field_sensitivity("passwordHash"), Sensitivity::High);
        assert_eq!(field_sensitivity("creditCardNumber"), Sensitivity::High);
        assert_eq!(field_sensitivity("homeAddress"), Sensitivity::Medium);
        assert_eq!(field_sensitivity("dateOfBirth"), Sensitivity::Medium);
        assert_eq!(field_sensitivity("title"), Sensitivity::Low);
    }

    #[test]
    fn test_credit_card_makes_model_admin_only() {
        let policy = infer_policy(
            &model("Transaction", &["amount", "creditCardNumber"]),
            &AuthConfig::default(),
        );
        assert_eq!(policy.sensitivity, Sensitivity::High);
        assert_eq!(policy.create, vec!["admin"]);
        assert_eq!(policy.update, vec!["admin"]);
        assert_eq!(policy.delete, vec!["admin"]);
        assert!(!policy.is_restricted(CrudOperation::Read));
        assert_eq!(policy.reasons, vec!["field:creditCardNumber"]);
    }

    #[test]
    fn test_medium_tier_roles() {
        let auth = AuthConfig::default().with_roles("root", "staff");
        let policy = infer_policy(&model("Subscriber", &["email"]), &auth);
        assert_eq!(policy.sensitivity, Sensitivity::Medium);
        assert_eq!(policy.create, vec!["root", "staff"]);
        assert_eq!(policy.update, vec!["root", "staff"]);
        assert_eq!(policy.delete, vec!["root"]);
        assert!(policy.allows("staff", CrudOperation::Update));
        assert!(!policy.allows("staff", CrudOperation::Delete));
    }

    #[test]
    fn test_tier_is_the_maximum_signal() {
        let policy = infer_policy(&model("Customer", &["apiToken"]), &AuthConfig::default());
        assert_eq!(policy.sensitivity, Sensitivity::High);
        assert_eq!(policy.reasons, vec!["model:Customer", "field:apiToken"]);
    }

    #[test]
    fn test_low_tier_is_unrestricted() {
        let policy = infer_policy(&model("Tag", &["label"]), &AuthConfig::default());
        assert_eq!(policy, AccessPolicy::unrestricted());
    }

    #[test]
    fn test_auth_disabled_records_reasons_only() {
        let policy = infer_policy(&model("Payment", &["amount"]), &AuthConfig::none());
        assert_eq!(policy.sensitivity, Sensitivity::High);
        assert!(policy.create.is_empty());
        assert_eq!(policy.reasons, vec!["model:Payment"]);
    }
}
