//! # Project Assembler
//!
//! The [`Lowerer`] is the top-level entry point of lowering. It takes a
//! [`ProjectConfig`] and [`LowerOptions`], runs every stage and returns one
//! [`ProjectIr`] document together with the warnings collected on the way.
//!
//! ## Pipeline
//!
//! ```text
//! ProjectConfig + LowerOptions
//!         │
//!         ├──► Validator::with_default_rules()   structural checks
//!         ├──► model::check_names()               case fixes, reserved names
//!         │        (reject on error)
//!         ├──► model::lower_model()               fields, policies
//!         │        (reject on error)
//!         ├──► relationships::plan()              descriptors, injections, joins
//!         │        (reject on error)
//!         ├──► relationships::apply_injections()
//!         ├──► seed::plan_seeding()               when seeding is on
//!         │
//!         ▼
//!   LoweredProject { ir, diagnostics, skipped }
//! ```
//!
//! Every stage reports into the same [`Diagnostics`]; a stage that recorded
//! an error stops the run with [`LowerError::Rejected`] carrying all of them.

use crate::LowerOptions;
use crate::context::LoweringContext;
use crate::model::{check_names, lower_model};
use crate::relationships::{Injected, apply_injections, normalize, plan};
use crate::seed::plan_seeding;
use stackforge_core::{
    Diagnostic, DiagnosticCode, Diagnostics, LowerError, LowerResult, Validatable,
};
use stackforge_ir::{ModelDescriptor, ProjectConfig, ProjectIr, SkippedInjection, Validator};

// ============================================================================
// Lowerer
// ============================================================================

/// Lowers project configurations into IR documents
///
/// Stateless aside from its options; one `Lowerer` can lower any number of
/// configurations, from any number of threads.
#[derive(Debug, Clone, Default)]
pub struct Lowerer {
    options: LowerOptions,
}

impl Lowerer {
    /// Create a lowerer with the given options
    pub fn new(options: LowerOptions) -> Self {
        Self { options }
    }

    /// Create a lowerer with default options
    pub fn with_defaults() -> Self {
        Self::new(LowerOptions::default())
    }

    /// Get the current options
    pub fn options(&self) -> &LowerOptions {
        &self.options
    }

    /// Lower a configuration
    ///
    /// # Errors
    ///
    /// Returns [`LowerError::Rejected`] with every error diagnostic when the
    /// configuration is structurally invalid, names cannot be fixed, a field
    /// fails to lower, or a relationship cannot be resolved.
    pub fn lower(&self, config: &ProjectConfig) -> LowerResult<LoweredProject> {
        // ── 1. Structure and names ───────────────────────────────────────
        let mut diagnostics = Validator::with_default_rules().validate(config);
        let names = check_names(config, &mut diagnostics);
        let mut diagnostics = diagnostics.into_result()?;

        // ── 2. Context ───────────────────────────────────────────────────
        let api_prefix = self
            .options
            .api_prefix
            .clone()
            .unwrap_or_else(|| config.features.api_prefix.clone());
        let mut ctx = LoweringContext::new(config, names, api_prefix.clone());
        if let Some(source) = &self.options.suggestions {
            ctx = ctx.with_suggestions(source.as_ref());
        }

        // ── 3. Models ────────────────────────────────────────────────────
        let mut models: Vec<ModelDescriptor> = Vec::with_capacity(ctx.models().len());
        for names in ctx.models() {
            let Some(raw) = config.models.get(names.index) else {
                continue;
            };
            if let Some(model) = lower_model(&ctx, names, raw, &mut diagnostics) {
                models.push(model);
            }
        }

        // ── 4. Relationships ─────────────────────────────────────────────
        // Planning reads only the name tables, so field and relationship
        // errors are reported together
        let declarations = normalize(config);
        let plan = plan(&ctx, &declarations, &mut diagnostics);
        let mut diagnostics = diagnostics.into_result()?;

        let Injected {
            models: mut lowered,
            skipped,
        } = apply_injections(models, &plan.injections, &config.auth);
        lowered.extend(plan.join_models);

        // ── 5. Auth user model ───────────────────────────────────────────
        let mut auth = config.auth.clone();
        if let Some(user_model) = config.auth.user_model.as_deref() {
            match ctx.resolve(user_model) {
                Some(name) => auth.user_model = Some(name.to_string()),
                None if config.auth.enabled => diagnostics.push(
                    Diagnostic::warning(
                        DiagnosticCode::UnknownAuthModel,
                        "auth.userModel",
                        format!("Auth user model '{}' is not declared", user_model),
                    )
                    .with_suggestion("Declare the model or remove auth.userModel"),
                ),
                None => {}
            }
        }

        // ── 6. Seeding ───────────────────────────────────────────────────
        let seeding = self.options.seed.unwrap_or(config.features.seeding);
        let seed_count = self.options.seed_count.unwrap_or(config.features.seed_count);
        let seed_plan = seeding.then(|| plan_seeding(&lowered, seed_count, &mut diagnostics));

        // ── 7. Assemble ──────────────────────────────────────────────────
        let mut features = config.features.clone();
        features.api_prefix = api_prefix;
        features.seeding = seeding;
        features.seed_count = seed_count;

        let mut ir = ProjectIr::new(config.project.clone());
        ir.database = config.database.clone();
        ir.models = lowered;
        ir.relationships = plan.relationships;
        ir.seed_plan = seed_plan;
        ir.auth = auth;
        ir.features = features;
        ir.deployment = config.deployment.clone();

        let check = ir.validate("");
        if check.has_errors() {
            tracing::warn!(
                errors = check.errors().count(),
                "lowered document failed its own consistency check"
            );
            return Err(LowerError::Rejected(check.into_vec()));
        }
        diagnostics.merge(check);

        for warning in diagnostics.warnings() {
            tracing::warn!("Lowering warning: {}", warning);
        }
        let lowered = LoweredProject {
            ir,
            diagnostics,
            skipped,
        };
        tracing::info!(
            project = %lowered.ir.project.name,
            models = lowered.ir.models.len(),
            relationships = lowered.ir.relationships.len(),
            warnings = lowered.diagnostics.len(),
            "lowering complete"
        );
        Ok(lowered)
    }
}

// ============================================================================
// LoweredProject
// ============================================================================

/// Result of a successful lowering run
#[derive(Debug, Clone, PartialEq)]
pub struct LoweredProject {
    /// The assembled document
    pub ir: ProjectIr,

    /// Warnings collected along the way (never errors)
    pub diagnostics: Diagnostics,

    /// Reference-field injections that were not applied
    pub skipped: Vec<SkippedInjection>,
}

impl LoweredProject {
    /// Summarize the run
    pub fn summary(&self) -> LoweringSummary {
        LoweringSummary::from_lowered(self)
    }
}

// ============================================================================
// LoweringSummary: human-readable report
// ============================================================================

/// A human-readable summary of a lowering run
#[derive(Debug, Clone, PartialEq)]
pub struct LoweringSummary {
    pub project_name: String,
    pub declared_models: usize,
    pub join_models: usize,
    pub fields: usize,
    pub relationships: usize,
    pub restricted_models: usize,
    /// Models in the seeding plan, zero when seeding is off
    pub seeded_models: usize,
    pub seed_cycles: usize,
    pub skipped_injections: usize,
    pub warning_count: usize,
}

impl LoweringSummary {
    /// Build a summary from a lowered project
    pub fn from_lowered(lowered: &LoweredProject) -> Self {
        let ir = &lowered.ir;
        Self {
            project_name: ir.project.name.clone(),
            declared_models: ir.declared_models().count(),
            join_models: ir.synthesized_models().count(),
            fields: ir.field_count(),
            relationships: ir.relationship_count(),
            restricted_models: ir
                .models
                .iter()
                .filter(|m| !m.access_policy.create.is_empty())
                .count(),
            seeded_models: ir.seed_plan.as_ref().map_or(0, |p| p.plans.len()),
            seed_cycles: ir.seed_plan.as_ref().map_or(0, |p| p.cycles.len()),
            skipped_injections: lowered.skipped.len(),
            warning_count: lowered.diagnostics.warnings().count(),
        }
    }

    /// Format the summary as a human-readable string
    pub fn display(&self) -> String {
        let mut out = String::with_capacity(512);

        out.push_str("╔══════════════════════════════════════════════════╗\n");
        out.push_str("║         Lowering Complete                        ║\n");
        out.push_str("╠══════════════════════════════════════════════════╣\n");
        out.push_str(&format!("║  Project:     {:<35}║\n", self.project_name));
        out.push_str(&format!("║  Models:      {:<35}║\n", self.declared_models));
        out.push_str(&format!("║    Join:      {:<35}║\n", self.join_models));
        out.push_str(&format!("║    Guarded:   {:<35}║\n", self.restricted_models));
        out.push_str(&format!("║  Fields:      {:<35}║\n", self.fields));
        out.push_str(&format!("║  Relations:   {:<35}║\n", self.relationships));
        out.push_str(&format!("║    Skipped:   {:<35}║\n", self.skipped_injections));
        if self.seeded_models > 0 {
            let seeding = format!("{} models, {} cycles", self.seeded_models, self.seed_cycles);
            out.push_str(&format!("║  Seeding:     {:<35}║\n", seeding));
        }
        out.push_str(&format!("║  Warnings:    {:<35}║\n", self.warning_count));
        out.push_str("╚══════════════════════════════════════════════════╝\n");

        out
    }
}

impl std::fmt::Display for LoweringSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

/// Produce a [`LoweringSummary`] from a [`LoweredProject`]
pub fn summarize(lowered: &LoweredProject) -> LoweringSummary {
    LoweringSummary::from_lowered(lowered)
}

// ============================================================================
// Tests
// ============================================================================
