//! CLI error handling.

use std::path::PathBuf;
use std::process::ExitCode;

use thiserror::Error;
use trellis_templating::{ConfigError, TemplateError};

/// Application exit codes
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    Success = 0,
    GeneralError = 1,
    ConfigError = 2,
    IoError = 3,
    TemplateError = 4,
}

impl From<Exit> for ExitCode {
    fn from(exit: Exit) -> Self {
        ExitCode::from(exit as u8)
    }
}

/// CLI error type
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("invalid data file {}: {source}", .path.display())]
    Data {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{failed} of {total} templates failed to compile")]
    CheckFailed { failed: usize, total: usize },
}

impl CliError {
    pub fn exit_code(&self) -> Exit {
        match self {
            Self::Config(_) => Exit::ConfigError,
            Self::Template(err) if matches!(err.root_cause(), TemplateError::NoLoader) => {
                Exit::ConfigError
            }
            Self::Template(_) | Self::CheckFailed { .. } => Exit::TemplateError,
            Self::Data { .. } => Exit::GeneralError,
            Self::Io { .. } => Exit::IoError,
        }
    }
}
