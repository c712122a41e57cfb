//! Error types for template loading and rendering.

use std::io;
use std::path::PathBuf;
use std::string::FromUtf8Error;

use thiserror::Error;

/// Errors produced by a [`Loader`](crate::Loader).
#[derive(Debug, Error)]
pub enum LoadError {
    /// The requested template does not exist in the source.
    #[error("template not found: {0}")]
    NotFound(String),

    /// The source exists but could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Any other failure reported by a custom source.
    #[error("{0}")]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl LoadError {
    /// Wrap an arbitrary error from a custom source.
    pub fn other(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Other(err.into())
    }
}

/// The main error type for template operations.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// No loader was configured on the environment.
    #[error("no loader configured")]
    NoLoader,

    /// The loader could not produce the template source.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// The template source is not valid UTF-8.
    #[error("template {name} is not valid UTF-8: {source}")]
    Encoding {
        name: String,
        #[source]
        source: FromUtf8Error,
    },

    /// The template source failed to parse.
    #[error("{name}: {source}")]
    Parse {
        name: String,
        #[source]
        source: Box<handlebars::TemplateError>,
    },

    /// The template parsed but failed while executing.
    #[error("{name}: {source}")]
    Render {
        name: String,
        #[source]
        source: Box<handlebars::RenderError>,
    },

    /// The base layout could not be obtained while compiling a child.
    #[error("base template {base} unavailable: {source}")]
    BaseUnavailable {
        base: String,
        #[source]
        source: Box<TemplateError>,
    },

    /// Writing rendered output failed.
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

impl TemplateError {
    /// Walk through `BaseUnavailable` wrappers to the error that caused them.
    pub fn root_cause(&self) -> &TemplateError {
        match self {
            Self::BaseUnavailable { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Whether the failure came from a missing template source.
    pub fn is_not_found(&self) -> bool {
        matches!(self.root_cause(), Self::Load(LoadError::NotFound(_)))
    }
}

/// Result type alias using [`TemplateError`].
pub type Result<T> = std::result::Result<T, TemplateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_error_display_is_transparent() {
        let err = TemplateError::from(LoadError::NotFound("index.html".into()));
        assert_eq!(err.to_string(), "template not found: index.html");
    }

    #[test]
    fn test_root_cause_unwraps_base_chain() {
        let err = TemplateError::BaseUnavailable {
            base: "base.html".into(),
            source: Box::new(TemplateError::from(LoadError::NotFound("base.html".into()))),
        };

        assert!(err.is_not_found());
        assert!(matches!(err.root_cause(), TemplateError::Load(_)));
        assert!(err.to_string().contains("base.html"));
    }

    #[test]
    fn test_other_wraps_custom_errors() {
        let err = LoadError::other("asset bundle offline");
        assert_eq!(err.to_string(), "asset bundle offline");
        assert!(!TemplateError::from(err).is_not_found());
    }
}
