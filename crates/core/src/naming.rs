//! Naming normalizer
//!
//! Pure case-conversion and English pluralization helpers used by every
//! lowering stage. Case conversion delegates to `heck`; pluralization is a
//! small ordered rule set applied to the last word of a compound name, so
//! `BlogPost` becomes `BlogPosts` and `sales-person` becomes `sales-people`.
//!
//! `singularize` is a best-effort inverse. It is lossy for ambiguous words
//! (`leaves` → `leaf`, but `knives` → `knif`), and `pluralize(singularize(w))`
//! is not guaranteed to return `w`.

use heck::{ToKebabCase, ToLowerCamelCase, ToPascalCase, ToSnakeCase, ToTitleCase};

// ============================================================================
// Case conversion
// ============================================================================

/// Convert to PascalCase (`blog_post` → `BlogPost`)
pub fn to_pascal_case(s: &str) -> String {
    s.to_pascal_case()
}

/// Convert to camelCase (`BlogPost` → `blogPost`)
pub fn to_camel_case(s: &str) -> String {
    s.to_lower_camel_case()
}

/// Convert to kebab-case (`BlogPost` → `blog-post`)
pub fn to_kebab_case(s: &str) -> String {
    s.to_kebab_case()
}

/// Convert to snake_case (`BlogPost` → `blog_post`)
pub fn to_snake_case(s: &str) -> String {
    s.to_snake_case()
}

/// Convert to Title Case (`firstName` → `First Name`)
pub fn to_title_case(s: &str) -> String {
    s.to_title_case()
}

/// `^[A-Z][a-zA-Z0-9]*$`
pub fn is_pascal_case(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) if first.is_ascii_uppercase() => chars.all(|c| c.is_ascii_alphanumeric()),
        _ => false,
    }
}

/// `^[a-z][a-zA-Z0-9]*$`
pub fn is_camel_case(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) if first.is_ascii_lowercase() => chars.all(|c| c.is_ascii_alphanumeric()),
        _ => false,
    }
}

/// Capitalize the first letter of a string
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}

// ============================================================================
// Pluralization
// ============================================================================

/// Irregular singular → plural pairs, checked before any suffix rule.
/// Uncountables map to themselves and a few `f` words opt out of `ves`.
const IRREGULAR: &[(&str, &str)] = &[
    ("person", "people"),
    ("child", "children"),
    ("man", "men"),
    ("woman", "women"),
    ("tooth", "teeth"),
    ("foot", "feet"),
    ("mouse", "mice"),
    ("goose", "geese"),
    ("ox", "oxen"),
    ("quiz", "quizzes"),
    ("movie", "movies"),
    ("cookie", "cookies"),
    ("criterion", "criteria"),
    ("roof", "roofs"),
    ("chief", "chiefs"),
    ("chef", "chefs"),
    ("belief", "beliefs"),
    ("proof", "proofs"),
    ("safe", "safes"),
    ("cafe", "cafes"),
    ("sheep", "sheep"),
    ("fish", "fish"),
    ("deer", "deer"),
    ("series", "series"),
    ("species", "species"),
    ("news", "news"),
    ("data", "data"),
    ("information", "information"),
    ("equipment", "equipment"),
    ("metadata", "metadata"),
];

/// Pluralize the last word of `word`, preserving the casing of its first letter
pub fn pluralize(word: &str) -> String {
    if word.is_empty() {
        return String::new();
    }

    let (head, tail) = split_last_word(word);
    let lower = tail.to_ascii_lowercase();

    // 1. Irregular table
    if let Some((_, plural)) = IRREGULAR.iter().find(|(singular, _)| *singular == lower) {
        return format!("{}{}", head, match_case(tail, plural));
    }

    // Suffix rules only touch ASCII endings; anything else just gets an `s`
    if !tail.is_ascii() {
        return format!("{}s", word);
    }

    // 2. Consonant + y
    if lower.ends_with('y') && lower.len() >= 2 {
        let before = lower.as_bytes()[lower.len() - 2] as char;
        if !is_vowel(before) {
            return format!("{}ies", &word[..word.len() - 1]);
        }
    }

    // 3. Sibilants (s, ss, sh, ch, x, z)
    if lower.ends_with('s')
        || lower.ends_with("sh")
        || lower.ends_with("ch")
        || lower.ends_with('x')
        || lower.ends_with('z')
    {
        return format!("{}es", word);
    }

    // 4. f / fe
    if lower.ends_with("fe") {
        return format!("{}ves", &word[..word.len() - 2]);
    }
    if lower.ends_with('f') {
        return format!("{}ves", &word[..word.len() - 1]);
    }

    // 5. Default
    format!("{}s", word)
}

/// Best-effort inverse of [`pluralize`]
pub fn singularize(word: &str) -> String {
    if word.is_empty() {
        return String::new();
    }

    let (head, tail) = split_last_word(word);
    let lower = tail.to_ascii_lowercase();

    if let Some((singular, _)) = IRREGULAR.iter().find(|(_, plural)| *plural == lower) {
        return format!("{}{}", head, match_case(tail, singular));
    }

    if !tail.is_ascii() {
        return word.to_string();
    }

    if lower.ends_with("ies") && lower.len() > 3 {
        return format!("{}y", &word[..word.len() - 3]);
    }
    if lower.ends_with("ves") && lower.len() > 3 {
        return format!("{}f", &word[..word.len() - 3]);
    }
    if lower.ends_with("sses")
        || lower.ends_with("shes")
        || lower.ends_with("ches")
        || lower.ends_with("xes")
        || lower.ends_with("zes")
    {
        return word[..word.len() - 2].to_string();
    }
    if lower.ends_with("ss") || lower.ends_with("us") || lower.ends_with("is") {
        return word.to_string();
    }
    if lower.ends_with('s') && lower.len() > 1 {
        return word[..word.len() - 1].to_string();
    }

    word.to_string()
}

/// Split a compound identifier into everything before its last word and
/// the last word itself. Boundaries are `-`, `_`, spaces and lower→upper
/// transitions.
fn split_last_word(word: &str) -> (&str, &str) {
    let mut boundary = 0;
    let mut prev: Option<char> = None;

    for (i, c) in word.char_indices() {
        match prev {
            Some(p) if p == '-' || p == '_' || p == ' ' => boundary = i,
            Some(p) if c.is_uppercase() && (p.is_lowercase() || p.is_ascii_digit()) => {
                boundary = i
            }
            _ => {}
        }
        prev = Some(c);
    }

    word.split_at(boundary)
}

/// Re-apply the first-letter casing of `original` to `replacement`
fn match_case(original: &str, replacement: &str) -> String {
    let upper = original
        .chars()
        .next()
        .map(|c| c.is_uppercase())
        .unwrap_or(false);
    if upper {
        capitalize(replacement)
    } else {
        replacement.to_string()
    }
}

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u')
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_pluralize_reference_table() {
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
    fn test_pluralize_preserves_lowercase_input() {
        assert_eq!(pluralize("user"), "users");
        assert_eq!(pluralize("person"), "people");
        assert_eq!(pluralize("category"), "categories");
    }

    #[test]
    fn test_pluralize_rules() {
        assert_eq!(pluralize("child"), "children");
        assert_eq!(pluralize("tooth"), "teeth");
        assert_eq!(pluralize("mouse"), "mice");
        assert_eq!(pluralize("key"), "keys");
        assert_eq!(pluralize("box"), "boxes");
        assert_eq!(pluralize("bus"), "buses");
        assert_eq!(pluralize("brush"), "brushes");
        assert_eq!(pluralize("match"), "matches");
        assert_eq!(pluralize("buzz"), "buzzes");
        assert_eq!(pluralize("knife"), "knives");
        assert_eq!(pluralize("roof"), "roofs");
        assert_eq!(pluralize("sheep"), "sheep");
        assert_eq!(pluralize("post"), "posts");
        assert_eq!(pluralize(""), "");
    }

    #[test]
    fn test_pluralize_compound_names() {
        assert_eq!(pluralize("BlogPost"), "BlogPosts");
        assert_eq!(pluralize("blogPost"), "blogPosts");
        assert_eq!(pluralize("SalesPerson"), "SalesPeople");
        assert_eq!(pluralize("sales-person"), "sales-people");
        assert_eq!(pluralize("ProductCategory"), "ProductCategories");
        assert_eq!(pluralize("order_item"), "order_items");
    }

    #[test]
    fn test_singularize() {
        assert_eq!(singularize("Users"), "User");
        assert_eq!(singularize("Categories"), "Category");
        assert_eq!(singularize("Classes"), "Class");
        assert_eq!(singularize("Leaves"), "Leaf");
        assert_eq!(singularize("People"), "Person");
        assert_eq!(singularize("boxes"), "box");
        assert_eq!(singularize("status"), "status");
        assert_eq!(singularize("BlogPosts"), "BlogPost");
    }

    #[test]
    fn test_singularize_is_lossy_for_ambiguous_words() {
        // `knives` follows the f→ves inverse, not the fe→ves one
        assert_eq!(singularize("knives"), "knif");
    }

    #[test]
    fn test_case_conversion() {
        assert_eq!(to_pascal_case("blog_post"), "BlogPost");
        assert_eq!(to_pascal_case("transaction"), "Transaction");
        assert_eq!(to_camel_case("BlogPost"), "blogPost");
        assert_eq!(to_camel_case("first_name"), "firstName");
        assert_eq!(to_kebab_case("BlogPost"), "blog-post");
        assert_eq!(to_snake_case("BlogPost"), "blog_post");
        assert_eq!(to_title_case("firstName"), "First Name");
    }

    #[test]
    fn test_case_predicates() {
        assert!(is_pascal_case("User"));
        assert!(is_pascal_case("UserFollowTag2"));
        assert!(!is_pascal_case("user"));
        assert!(!is_pascal_case("User_Tag"));
        assert!(!is_pascal_case(""));

        assert!(is_camel_case("email"));
        assert!(is_camel_case("creditCardNumber"));
        assert!(!is_camel_case("Email"));
        assert!(!is_camel_case("first_name"));
        assert!(!is_camel_case("_id"));
        assert!(!is_camel_case("2fa"));
    }

    #[test]
    fn test_split_last_word() {
        assert_eq!(split_last_word("BlogPost"), ("Blog", "Post"));
        assert_eq!(split_last_word("blog-post"), ("blog-", "post"));
        assert_eq!(split_last_word("user"), ("", "user"));
        assert_eq!(split_last_word("APIKey"), ("", "APIKey"));
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("user"), "User");
        assert_eq!(capitalize(""), "");
    }
}
