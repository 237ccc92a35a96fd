//! Terminal and JSON rendering of diagnostics and lowered projects

use colored::Colorize;
use serde::Serialize;
use stackforge_core::{Diagnostic, Severity};
use stackforge_lower::LoweredProject;
use std::path::Path;

// ============================================================================
// Diagnostics
// ============================================================================

/// Render one diagnostic, `error[code]: message` style
pub fn format_diagnostic(diagnostic: &Diagnostic) -> String {
    let label = match diagnostic.severity {
        Severity::Error => format!("error[{}]", diagnostic.code).red().bold(),
        Severity::Warning => format!("warning[{}]", diagnostic.code).yellow().bold(),
    };
    let mut out = format!(
        "{}: {}\n  {} {}",
        label,
        diagnostic.message,
        "-->".blue(),
        diagnostic.path
    );
    if let Some(suggestion) = &diagnostic.suggestion {
        out.push_str(&format!("\n  {} {}", "help:".cyan(), suggestion));
    }
    out
}

/// Print diagnostics to stderr
pub fn print_diagnostics<'d>(diagnostics: impl IntoIterator<Item = &'d Diagnostic>) {
    for diagnostic in diagnostics {
        eprintln!("{}", format_diagnostic(diagnostic));
    }
}

// ============================================================================
// Validation report
// ============================================================================

/// Outcome of checking one configuration file
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileReport {
    pub path: String,
    pub ok: bool,
    pub diagnostics: Vec<Diagnostic>,
    /// Set when the file could not be read or parsed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileReport {
    pub fn lowered(path: &Path, diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            path: path.display().to_string(),
            ok: true,
            diagnostics,
            error: None,
        }
    }

    pub fn rejected(path: &Path, diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            path: path.display().to_string(),
            ok: false,
            diagnostics,
            error: None,
        }
    }

    pub fn failed(path: &Path, error: impl Into<String>) -> Self {
        Self {
            path: path.display().to_string(),
            ok: false,
            diagnostics: Vec::new(),
            error: Some(error.into()),
        }
    }

    /// One status line followed by the file's diagnostics
    pub fn render(&self) -> String {
        let warnings = self
            .diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count();
        let mut out = if self.ok {
            let status = format!("{} {}", "✓".green().bold(), self.path);
            if warnings > 0 {
                format!("{} ({} warnings)", status, warnings)
            } else {
                status
            }
        } else {
            format!("{} {}", "✗".red().bold(), self.path)
        };

        if let Some(error) = &self.error {
            out.push_str(&format!("\n  {} {}", "error:".red().bold(), error));
        }
        for diagnostic in &self.diagnostics {
            for line in format_diagnostic(diagnostic).lines() {
                out.push_str("\n  ");
                out.push_str(line);
            }
        }
        out
    }
}

// ============================================================================
// Project info
// ============================================================================

/// Render the `info` view of a lowered project
pub fn render_info(lowered: &LoweredProject) -> String {
    let ir = &lowered.ir;
    let mut out = String::with_capacity(1024);

    out.push_str(&lowered.summary().display());
    out.push('\n');

    out.push_str(&format!("{}\n", "Models".bold().underline()));
    for model in &ir.models {
        let mut line = format!(
            "  {:<24} {:>3} fields  {:<28} {}",
            model.name,
            model.fields.len(),
            model.route_path,
            model.access_policy.sensitivity
        );
        if model.synthesized {
            line.push_str(&format!(" {}", "(join)".dimmed()));
        }
        if let Some(original) = model.original_name.as_deref().filter(|o| *o != model.name) {
            line.push_str(&format!(" {}", format!("(declared as {})", original).dimmed()));
        }
        out.push_str(&line);
        out.push('\n');
    }

    if !ir.relationships.is_empty() {
        out.push_str(&format!("\n{}\n", "Relationships".bold().underline()));
        for relationship in &ir.relationships {
            out.push_str(&format!("  {}\n", relationship.summary()));
        }
    }

    if let Some(plan) = &ir.seed_plan {
        out.push_str(&format!("\n{}\n", "Seeding order".bold().underline()));
        out.push_str(&format!("  {}\n", plan.order().join(" → ")));
        for cycle in &plan.cycles {
            out.push_str(&format!(
                "  {} {}\n",
                "cycle:".yellow(),
                cycle.join(" ↔ ")
            ));
        }
    }

    out
}

// ============================================================================
// Tests
// ============================================================================
