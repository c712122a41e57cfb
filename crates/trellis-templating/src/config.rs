//! Configuration for building an [`Environment`](crate::Environment) from files
//! and environment variables.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::template::EngineSettings;

/// Environment variable names.
pub mod vars {
    pub const TEMPLATES_ROOT: &str = "TRELLIS_TEMPLATES_ROOT";
    pub const TEMPLATES_BASE: &str = "TRELLIS_TEMPLATES_BASE";
    pub const TEMPLATES_CACHE: &str = "TRELLIS_TEMPLATES_CACHE";
    pub const TEMPLATES_STRICT: &str = "TRELLIS_TEMPLATES_STRICT";
}

/// Config loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read config: {source}")]
    ReadError {
        #[from]
        source: std::io::Error,
    },

    #[error("invalid YAML at line {}: {message}", .line.map(|l| l.to_string()).unwrap_or_else(|| "unknown".to_string()))]
    ParseError { line: Option<usize>, message: String },

    #[error("validation error: {message}")]
    ValidationError { message: String },
}

/// Template environment configuration, usually `trellis.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplatingConfig {
    /// Directory templates are loaded from.
    pub root: PathBuf,
    /// Filename of the layout every template inherits from.
    pub base: String,
    /// Keep compiled templates for the life of the process.
    pub cache: bool,
    /// Treat missing fields as render errors.
    pub strict_mode: bool,
    /// HTML-escape expression output.
    pub escape_html: bool,
}

impl Default for TemplatingConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("templates"),
            base: "base.html".to_string(),
            cache: true,
            strict_mode: false,
            escape_html: true,
        }
    }
}

impl TemplatingConfig {
    /// Load configuration from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_yaml(&contents)?;
        Ok(config)
    }

    /// Parse and validate configuration from YAML text.
    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(contents).map_err(|e| ConfigError::ParseError {
            line: e.location().map(|l| l.line()),
            message: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Defaults overridden by environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Override fields from `TRELLIS_TEMPLATES_*` variables that are set.
    pub fn apply_env(&mut self) {
        if let Ok(root) = std::env::var(vars::TEMPLATES_ROOT) {
            self.root = PathBuf::from(root);
        }

        if let Ok(base) = std::env::var(vars::TEMPLATES_BASE) {
            self.base = base;
        }

        if let Some(cache) = env_bool(vars::TEMPLATES_CACHE) {
            self.cache = cache;
        }

        if let Some(strict) = env_bool(vars::TEMPLATES_STRICT) {
            self.strict_mode = strict;
        }
    }

    /// Check configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                message: "base must name a template file".to_string(),
            });
        }

        Ok(())
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            strict_mode: self.strict_mode,
            escape_html: self.escape_html,
        }
    }
}

fn env_bool(var: &str) -> Option<bool> {
    std::env::var(var)
        .ok()
        .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
}
