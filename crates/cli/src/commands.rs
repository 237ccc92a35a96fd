//! Command implementations

use crate::ExitCode;
use crate::report::{FileReport, print_diagnostics, render_info};
use anyhow::Context;
use chrono::Utc;
use colored::Colorize;
use stackforge_core::LowerError;
use stackforge_ir::serialization::{default_ir_path, is_config_file};
use stackforge_ir::{ConfigFormat, ProjectConfig, ir_to_string, parse_config};
use stackforge_lower::{LowerOptions, LoweredProject, StaticSuggestions, lower_with};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

/// Output path meaning stdout
const STDOUT: &str = "-";

// ============================================================================
// Loading
// ============================================================================

/// Read and parse a configuration file
pub async fn read_config(path: &Path) -> Result<ProjectConfig, LowerError> {
    if !tokio::fs::try_exists(path).await.unwrap_or(false) {
        return Err(LowerError::ConfigNotFound(path.to_path_buf()));
    }
    let format = ConfigFormat::from_path(path)
        .ok_or_else(|| LowerError::UnsupportedFormat(path.to_path_buf()))?;

    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| LowerError::FileRead {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    parse_config(&text, format).map_err(|e| match e {
        LowerError::Json(_) | LowerError::Toml(_) => LowerError::FileRead {
            path: path.to_path_buf(),
            message: format!("Invalid {} configuration: {}", format, e),
        },
        other => other,
    })
}

async fn read_suggestions(path: &Path) -> anyhow::Result<StaticSuggestions> {
    let json = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read suggestions from {}", path.display()))?;
    let hints = StaticSuggestions::from_json_str(&json)
        .with_context(|| format!("invalid suggestions file {}", path.display()))?;
    tracing::debug!(hints = hints.len(), path = %path.display(), "loaded suggestions");
    Ok(hints)
}

/// Print a lowering failure and pick the exit code for it
fn report_failure(error: LowerError) -> ExitCode {
    match error {
        LowerError::Rejected(diagnostics) => {
            print_diagnostics(&diagnostics);
            let errors = diagnostics.iter().filter(|d| d.is_error()).count();
            eprintln!(
                "{} lowering rejected with {} error{}",
                "error:".red().bold(),
                errors,
                if errors == 1 { "" } else { "s" }
            );
            ExitCode::REJECTED
        }
        other => {
            eprintln!("{} {}", "error:".red().bold(), other);
            if other.is_io() {
                ExitCode::IO_ERROR
            } else {
                ExitCode::REJECTED
            }
        }
    }
}

// ============================================================================
// lower
// ============================================================================

/// Arguments of the `lower` command
#[derive(Debug, Clone, Default)]
pub struct LowerArgs {
    pub config: PathBuf,
    pub output: Option<PathBuf>,
    pub seed: bool,
    pub seed_count: Option<usize>,
    pub suggestions: Option<PathBuf>,
    pub api_prefix: Option<String>,
    pub pretty: bool,
}

impl LowerArgs {
    /// Lowering options selected by the flags
    pub async fn options(&self) -> anyhow::Result<LowerOptions> {
        let mut options = LowerOptions::new();
        if self.seed {
            options = options.with_seed(true);
        }
        if let Some(count) = self.seed_count {
            options = options.with_seed_count(count);
        }
        if let Some(prefix) = &self.api_prefix {
            options = options.with_api_prefix(prefix.clone());
        }
        if let Some(path) = &self.suggestions {
            options = options.with_suggestions(Arc::new(read_suggestions(path).await?));
        }
        Ok(options)
    }

    /// Where the IR goes; `None` for stdout
    pub fn output_path(&self) -> Option<PathBuf> {
        match &self.output {
            Some(path) if path.as_os_str() == STDOUT => None,
            Some(path) => Some(path.clone()),
            None => Some(default_ir_path(&self.config)),
        }
    }
}

/// Lower a configuration and write the IR document
pub async fn lower(args: LowerArgs) -> anyhow::Result<ExitCode> {
    let config = match read_config(&args.config).await {
        Ok(config) => config,
        Err(e) => return Ok(report_failure(e)),
    };
    let options = args.options().await?;

    let lowered = match lower_with(&config, options) {
        Ok(lowered) => lowered,
        Err(e) => return Ok(report_failure(e)),
    };
    print_diagnostics(lowered.diagnostics.iter());

    let ir = lowered.ir.clone().with_generated_at(Utc::now());
    let json = ir_to_string(&ir, args.pretty)?;

    match args.output_path() {
        None => println!("{}", json),
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            tokio::fs::write(&path, json)
                .await
                .with_context(|| format!("failed to write {}", path.display()))?;

            eprint!("{}", lowered.summary().display());
            eprintln!("{} Wrote {}", "✓".green().bold(), path.display());
        }
    }

    tracing::info!(
        project = %ir.project.name,
        config = %args.config.display(),
        "IR written"
    );
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// validate
// ============================================================================

/// Configuration files under `root`, sorted
///
/// IR documents (`*.ir.json`) and hidden or `target` directories are skipped.
pub fn collect_configs(root: &Path) -> Vec<PathBuf> {
    if root.is_file() {
        return vec![root.to_path_buf()];
    }

    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_entry(|entry| {
            let name = entry.file_name().to_string_lossy();
            entry.depth() == 0 || !(name.starts_with('.') || name == "target")
        })
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.into_path())
        .filter(|path| is_config_file(path))
        .filter(|path| {
            !path
                .file_name()
                .map(|n| n.to_string_lossy().ends_with(".ir.json"))
                .unwrap_or(false)
        })
        .collect();
    files.sort();
    files
}

/// Lower one file and report the outcome
async fn check_file(path: &Path) -> FileReport {
    let config = match read_config(path).await {
        Ok(config) => config,
        Err(e) => return FileReport::failed(path, e.to_string()),
    };
    match lower_with(&config, LowerOptions::new()) {
        Ok(lowered) => FileReport::lowered(path, lowered.diagnostics.into_vec()),
        Err(LowerError::Rejected(diagnostics)) => FileReport::rejected(path, diagnostics),
        Err(e) => FileReport::failed(path, e.to_string()),
    }
}

/// Validate a configuration file or every configuration under a directory
pub async fn validate(path: &Path, json: bool) -> anyhow::Result<ExitCode> {
    let root = path.to_path_buf();
    let files = tokio::task::spawn_blocking(move || collect_configs(&root))
        .await
        .context("directory scan failed")?;

    if files.is_empty() {
        eprintln!(
            "{} no configuration files found under {}",
            "error:".red().bold(),
            path.display()
        );
        return Ok(ExitCode::IO_ERROR);
    }

    let mut reports = Vec::with_capacity(files.len());
    for file in &files {
        reports.push(check_file(file).await);
    }
    let failed = reports.iter().filter(|r| !r.ok).count();

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for report in &reports {
            println!("{}", report.render());
        }
        let status = format!(
            "{} checked, {} failed",
            files.len(),
            failed
        );
        if failed == 0 {
            println!("\n{}", status.green().bold());
        } else {
            println!("\n{}", status.red().bold());
        }
    }

    tracing::info!(files = files.len(), failed, "validation complete");
    Ok(if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::REJECTED
    })
}

// ============================================================================
// info
// ============================================================================

/// Show what a configuration lowers to
pub async fn info(path: &Path) -> anyhow::Result<ExitCode> {
    let config = match read_config(path).await {
        Ok(config) => config,
        Err(e) => return Ok(report_failure(e)),
    };
    let lowered: LoweredProject = match lower_with(&config, LowerOptions::new()) {
        Ok(lowered) => lowered,
        Err(e) => return Ok(report_failure(e)),
    };

    print_diagnostics(lowered.diagnostics.iter());
    print!("{}", render_info(&lowered));
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// Tests
// ============================================================================
