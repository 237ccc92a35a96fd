//! Loading configurations and writing IR documents
//!
//! Configurations are JSON or TOML, picked by file extension. IR documents
//! are always JSON, pretty-printed or compact.

use crate::{ProjectConfig, ProjectIr};
use serde::{Deserialize, Serialize};
use stackforge_core::{LowerError, LowerResult};
use std::path::{Path, PathBuf};

// ============================================================================
// Config format
// ============================================================================

/// Supported configuration formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigFormat {
    Json,
    Toml,
}

impl ConfigFormat {
    /// Detect the format from a file extension
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(ConfigFormat::Json),
            "toml" => Some(ConfigFormat::Toml),
            _ => None,
        }
    }

    /// File extension without the dot
    pub fn extension(&self) -> &'static str {
        match self {
            ConfigFormat::Json => "json",
            ConfigFormat::Toml => "toml",
        }
    }
}

impl std::fmt::Display for ConfigFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigFormat::Json => write!(f, "JSON"),
            ConfigFormat::Toml => write!(f, "TOML"),
        }
    }
}

// ============================================================================
// Load Functions
// ============================================================================

/// Parse a configuration from text
pub fn parse_config(text: &str, format: ConfigFormat) -> LowerResult<ProjectConfig> {
    match format {
        ConfigFormat::Json => config_from_json_str(text),
        ConfigFormat::Toml => config_from_toml_str(text),
    }
}

/// Parse a JSON configuration
pub fn config_from_json_str(json: &str) -> LowerResult<ProjectConfig> {
    Ok(serde_json::from_str(json)?)
}

/// Parse a TOML configuration
pub fn config_from_toml_str(text: &str) -> LowerResult<ProjectConfig> {
    Ok(toml::from_str(text)?)
}

/// Load a configuration file
///
/// # Example
///
/// ```rust,ignore
/// use stackforge_ir::load_config;
///
/// let config = load_config("blog.json")?;
/// println!("Loaded project: {}", config.project.name);
/// ```
pub fn load_config(path: impl AsRef<Path>) -> LowerResult<ProjectConfig> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(LowerError::ConfigNotFound(path.to_path_buf()));
    }

    let format = ConfigFormat::from_path(path)
        .ok_or_else(|| LowerError::UnsupportedFormat(path.to_path_buf()))?;

    let text = std::fs::read_to_string(path).map_err(|e| LowerError::FileRead {
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

/// Check if a path looks like a configuration file
pub fn is_config_file(path: impl AsRef<Path>) -> bool {
    let path = path.as_ref();
    path.is_file() && ConfigFormat::from_path(path).is_some()
}

// ============================================================================
// Save Functions
// ============================================================================

/// Serialize an IR document to JSON
pub fn ir_to_string(ir: &ProjectIr, pretty: bool) -> LowerResult<String> {
    let json = if pretty {
        serde_json::to_string_pretty(ir)?
    } else {
        serde_json::to_string(ir)?
    };
    Ok(json)
}

/// Parse an IR document
pub fn ir_from_str(json: &str) -> LowerResult<ProjectIr> {
    Ok(serde_json::from_str(json)?)
}

/// Write an IR document to a file, creating parent directories
pub fn save_ir(ir: &ProjectIr, path: impl AsRef<Path>, pretty: bool) -> LowerResult<()> {
    let path = path.as_ref();
    let json = ir_to_string(ir, pretty)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| LowerError::FileWrite {
                path: parent.to_path_buf(),
                message: e.to_string(),
            })?;
        }
    }

    std::fs::write(path, json).map_err(|e| LowerError::FileWrite {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load an IR document from a file
pub fn load_ir(path: impl AsRef<Path>) -> LowerResult<ProjectIr> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path).map_err(|e| LowerError::FileRead {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    ir_from_str(&json)
}

/// Default output path of the IR for a configuration file
///
/// `configs/blog.toml` becomes `configs/blog.ir.json`.
pub fn default_ir_path(config_path: impl AsRef<Path>) -> PathBuf {
    let config_path = config_path.as_ref();
    let stem = config_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("project");
    config_path.with_file_name(format!("{}.ir.json", stem))
}

// ============================================================================
// Tests
// ============================================================================
