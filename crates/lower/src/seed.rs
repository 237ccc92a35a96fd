//! Seeding planner
//!
//! Orders models so every record is created after the records it
//! references, then picks a value generator per field.
//!
//! Ordering is Kahn's algorithm over the reference graph, taking the
//! earliest-declared ready model at every step so the result is stable.
//! When no model is ready the remaining models hold at least one cycle: the
//! earliest-declared model on a cycle is emitted anyway and its references
//! to models not seeded yet are marked `deferred`, to be filled in a second
//! pass. Models that merely depend on a cycle wait for it.
//! Self references are always deferred. Join models are planned after the
//! declared models.

use crate::heuristics::FieldKind;
use stackforge_core::naming::{to_camel_case, to_kebab_case};
use stackforge_core::{Diagnostic, DiagnosticCode, Diagnostics, FieldType};
use stackforge_ir::{
    Arity, Constraints, FieldDescriptor, FieldStrategy, ModelDescriptor, RelationshipBinding,
    SeedPlan, SeedingPlan, ValueGenerator, is_auto_managed_field,
};
use std::collections::HashSet;

/// Days back from today covered by generated dates
pub const RECENT_DATE_DAYS: u32 = 365;

/// Plan seeding for lowered models
pub fn plan_seeding(
    models: &[ModelDescriptor],
    count: usize,
    diagnostics: &mut Diagnostics,
) -> SeedingPlan {
    let declared: Vec<&ModelDescriptor> = models.iter().filter(|m| !m.synthesized).collect();
    let joins: Vec<&ModelDescriptor> = models.iter().filter(|m| m.synthesized).collect();

    let (mut order, cycles) = dependency_order(&declared);
    for cycle in &cycles {
        diagnostics.push(
            Diagnostic::warning(
                DiagnosticCode::SeedCycle,
                format!("models.{}", cycle[0]),
                format!(
                    "Models {} reference each other; references from '{}' are filled in a second pass",
                    cycle.join(", "),
                    cycle[0]
                ),
            )
            .with_suggestion("Make one side of the cycle optional"),
        );
    }
    order.extend(joins);

    let mut seeded: HashSet<&str> = HashSet::new();
    let mut plans = Vec::with_capacity(order.len());
    for (position, model) in order.iter().enumerate() {
        plans.push(plan_model(model, position, count, &seeded));
        seeded.insert(model.name.as_str());
    }

    tracing::debug!(
        models = plans.len(),
        cycles = cycles.len(),
        "seeding plan ready"
    );
    SeedingPlan { plans, cycles }
}

// ============================================================================
// Ordering
// ============================================================================

/// Kahn's algorithm with declaration-order tie-breaking and cycle breaking
fn dependency_order<'m>(
    models: &[&'m ModelDescriptor],
) -> (Vec<&'m ModelDescriptor>, Vec<Vec<String>>) {
    let n = models.len();
    let index_of = |name: &str| models.iter().position(|m| m.name == name);

    // deps[i]: models i references, excluding itself
    let deps: Vec<Vec<usize>> = models
        .iter()
        .map(|m| {
            m.dependencies()
                .into_iter()
                .filter_map(|name| index_of(name))
                .collect()
        })
        .collect();

    let mut in_degree: Vec<usize> = deps.iter().map(Vec::len).collect();
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); n];
    for (i, targets) in deps.iter().enumerate() {
        for &t in targets {
            dependents[t].push(i);
        }
    }

    let mut done = vec![false; n];
    let mut sorted: Vec<usize> = Vec::with_capacity(n);
    let mut cycles: Vec<Vec<String>> = Vec::new();
    let mut broken = vec![false; n];

    while sorted.len() < n {
        let next = match (0..n).find(|&i| !done[i] && in_degree[i] == 0) {
            Some(ready) => ready,
            None => {
                // Everything left waits on something, so some remaining model
                // lies on a cycle: break at the earliest one that does
                let forced = (0..n)
                    .find(|&i| !done[i] && reachable(i, &deps, &done)[i])
                    .or_else(|| (0..n).find(|&i| !done[i]))
                    .unwrap_or(0);
                let group = cycle_group(forced, &deps, &done);
                if group.len() > 1 && !group.iter().any(|&i| broken[i]) {
                    for &i in &group {
                        broken[i] = true;
                    }
                    cycles.push(group.iter().map(|&i| models[i].name.clone()).collect());
                }
                forced
            }
        };

        done[next] = true;
        sorted.push(next);
        for &dependent in &dependents[next] {
            in_degree[dependent] = in_degree[dependent].saturating_sub(1);
        }
    }

    (sorted.into_iter().map(|i| models[i]).collect(), cycles)
}

/// Remaining models on a cycle through `start`, declaration order
fn cycle_group(start: usize, deps: &[Vec<usize>], done: &[bool]) -> Vec<usize> {
    let n = deps.len();
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); n];
    for (i, targets) in deps.iter().enumerate() {
        for &t in targets {
            dependents[t].push(i);
        }
    }

    let forward = reachable(start, deps, done);
    let backward = reachable(start, &dependents, done);
    (0..n)
        .filter(|&i| i == start || (forward[i] && backward[i]))
        .collect()
}

fn reachable(start: usize, edges: &[Vec<usize>], done: &[bool]) -> Vec<bool> {
    let mut seen = vec![false; edges.len()];
    let mut stack = vec![start];
    while let Some(node) = stack.pop() {
        for &next in &edges[node] {
            if !done[next] && !seen[next] {
                seen[next] = true;
                stack.push(next);
            }
        }
    }
    seen
}

// ============================================================================
// Per-model plans
// ============================================================================

fn plan_model(
    model: &ModelDescriptor,
    order: usize,
    count: usize,
    seeded: &HashSet<&str>,
) -> SeedPlan {
    let mut plan = SeedPlan::new(&model.name, order, count);

    for field in &model.fields {
        if field.is_reference {
            let Some(target) = field.referenced_model.as_deref() else {
                continue;
            };
            plan.relationship_bindings.push(RelationshipBinding {
                field: field.name.clone(),
                target_model: target.to_string(),
                arity: if field.is_reference_array() {
                    Arity::Array
                } else {
                    Arity::One
                },
                deferred: target == model.name || !seeded.contains(target),
            });
            continue;
        }
        if is_auto_managed_field(&field.name) {
            continue;
        }
        plan.field_strategies
            .push(FieldStrategy::new(&field.name, generator_for(model, field)));
    }
    plan
}

/// Value generator of a non-reference field
pub fn generator_for(model: &ModelDescriptor, field: &FieldDescriptor) -> ValueGenerator {
    if let Some(values) = &field.constraints.enum_values {
        return ValueGenerator::Cycle {
            values: values.clone(),
        };
    }

    let kind = FieldKind::classify(&field.name, field.declared_type);
    if field.unique {
        if let Some(generator) = unique_generator(model, field, kind) {
            return generator;
        }
    }

    match field.declared_type {
        FieldType::Boolean => ValueGenerator::Boolean,
        FieldType::Date | FieldType::DateTime => ValueGenerator::RecentDate {
            days_back: RECENT_DATE_DAYS,
        },
        FieldType::StringArray => ValueGenerator::WordList { count: 3 },
        FieldType::Json => ValueGenerator::EmptyObject,
        FieldType::JsonArray => ValueGenerator::EmptyList,
        FieldType::Number => {
            let generator = kind
                .generator()
                .unwrap_or(ValueGenerator::IntRange { min: 0, max: 1000 });
            clamp(generator, &field.constraints)
        }
        FieldType::String | FieldType::Enum => kind
            .generator()
            .unwrap_or_else(|| ValueGenerator::indexed(&format!("{} ", field.name))),
        // References are bound, not generated
        FieldType::Reference | FieldType::ReferenceArray => ValueGenerator::EmptyList,
    }
}

/// Index-templated generator for unique fields
fn unique_generator(
    model: &ModelDescriptor,
    field: &FieldDescriptor,
    kind: FieldKind,
) -> Option<ValueGenerator> {
    let template = |t: String| ValueGenerator::Template { template: t };
    let generator = match (field.declared_type, kind) {
        (FieldType::Number, _) => ValueGenerator::Counter {
            start: field.constraints.min.map_or(1, |min| min.ceil() as i64),
        },
        (FieldType::String, FieldKind::Email) => {
            template(format!("{}{{index}}@example.com", to_camel_case(&model.name).to_lowercase()))
        }
        (FieldType::String, FieldKind::Url) => template(format!(
            "https://example.com/{}/{{index}}",
            model.plural_kebab
        )),
        (FieldType::String, FieldKind::Phone) => template("+1-555-{index}".to_string()),
        (FieldType::String, FieldKind::Slug) => {
            template(format!("{}-{{index}}", to_kebab_case(&field.name)))
        }
        (FieldType::String, _) => ValueGenerator::indexed(&format!("{}-", field.name)),
        _ => return None,
    };
    Some(generator)
}

/// Narrow a numeric generator to the field's bounds
fn clamp(generator: ValueGenerator, constraints: &Constraints) -> ValueGenerator {
    match generator {
        ValueGenerator::IntRange { min, max } => {
            let (low, high) = constraints.clamp_range(min as f64, max as f64);
            let low = low.ceil() as i64;
            let high = (high.floor() as i64).max(low);
            ValueGenerator::IntRange {
                min: low,
                max: high,
            }
        }
        ValueGenerator::DecimalRange { min, max, decimals } => {
            let (min, max) = constraints.clamp_range(min, max);
            ValueGenerator::DecimalRange { min, max, decimals }
        }
        other => other,
    }
}

// ============================================================================
// Tests
// ============================================================================
