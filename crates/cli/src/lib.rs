//! # Stackforge CLI
//!
//! Command-line interface for Stackforge.
//!
//! ## Commands
//!
//! - `lower` - Lower a configuration and write the IR document
//! - `validate` - Check one configuration or every configuration under a directory
//! - `info` - Display what a configuration lowers to
//!
//! Command functions return `anyhow::Result<ExitCode>`; only `main` exits
//! the process.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod commands;
pub mod report;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// CLI version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Exit codes
// ============================================================================

/// Exit code of a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    /// Lowering rejected or validation failed
    pub const REJECTED: ExitCode = ExitCode(1);
    /// Files could not be read or written
    pub const IO_ERROR: ExitCode = ExitCode(2);
}

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Lower declarative backend project configurations into a validated IR
#[derive(Parser, Debug)]
#[command(name = "stackforge")]
#[command(version = VERSION)]
#[command(about = "Lower declarative backend project configurations into a validated IR", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Lower a configuration into an IR document
    Lower {
        /// Configuration file (.json or .toml)
        #[arg(value_name = "CONFIG")]
        config: PathBuf,

        /// Output file; `-` writes to stdout (default: <config>.ir.json)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Include a seeding plan regardless of features.seeding
        #[arg(long)]
        seed: bool,

        /// Records per model in the seeding plan
        #[arg(long, value_name = "N", env = "STACKFORGE_SEED_COUNT")]
        seed_count: Option<usize>,

        /// JSON file of precomputed field hints keyed by Model.field
        #[arg(long, value_name = "FILE")]
        suggestions: Option<PathBuf>,

        /// Override features.apiPrefix
        #[arg(long, value_name = "PREFIX")]
        api_prefix: Option<String>,

        /// Write compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Validate configurations without writing anything
    Validate {
        /// Configuration file or directory to scan
        #[arg(value_name = "PATH", default_value = ".")]
        path: PathBuf,

        /// Print diagnostics as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show what a configuration lowers to
    Info {
        /// Configuration file (.json or .toml)
        #[arg(value_name = "CONFIG")]
        config: PathBuf,
    },
}

// ============================================================================
// Entry points
// ============================================================================

/// Log filter for the given verbosity flags
///
/// `RUST_LOG` wins when set.
pub fn log_filter(verbose: u8, quiet: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = match (quiet, verbose) {
            (true, _) => "error",
            (false, 0) => "warn",
            (false, 1) => "debug",
            (false, _) => "trace",
        };
        EnvFilter::new(level)
    })
}

/// Install the tracing subscriber; logs go to stderr
pub fn init_tracing(verbose: u8, quiet: bool) {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(verbose, quiet))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Run a parsed command line
pub async fn execute(cli: Cli) -> anyhow::Result<ExitCode> {
    if cli.no_color {
        colored::control::set_override(false);
    }

    match cli.command {
        Command::Lower {
            config,
            output,
            seed,
            seed_count,
            suggestions,
            api_prefix,
            compact,
        } => {
            let args = commands::LowerArgs {
                config,
                output,
                seed,
                seed_count,
                suggestions,
                api_prefix,
                pretty: !compact,
            };
            commands::lower(args).await
        }
        Command::Validate { path, json } => commands::validate(&path, json).await,
        Command::Info { config } => commands::info(&config).await,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_lower() {
        let cli = Cli::try_parse_from([
            "stackforge",
            "lower",
            "blog.json",
            "-o",
            "-",
            "--seed",
            "--seed-count",
            "3",
            "--compact",
        ])
        .unwrap();

        match cli.command {
            Command::Lower {
                config,
                output,
                seed,
                seed_count,
                compact,
                ..
            } => {
                assert_eq!(config, PathBuf::from("blog.json"));
                assert_eq!(output, Some(PathBuf::from("-")));
                assert!(seed);
                assert_eq!(seed_count, Some(3));
                assert!(compact);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_validate_defaults_to_cwd() {
        let cli = Cli::try_parse_from(["stackforge", "validate"]).unwrap();
        match cli.command {
            Command::Validate { path, json } => {
                assert_eq!(path, PathBuf::from("."));
                assert!(!json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_verbose_and_quiet_conflict() {
        assert!(Cli::try_parse_from(["stackforge", "-v", "-q", "info", "a.json"]).is_err());
    }

    #[test]
    fn test_verbosity_counts() {
        let cli = Cli::try_parse_from(["stackforge", "info", "a.json", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }
}
