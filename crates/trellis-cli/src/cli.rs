//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};
use trellis_templating::{Environment, Options, TemplatingConfig};

use crate::commands::{CheckCommand, RenderCommand};
use crate::error::CliError;

/// Trellis - render layout-based Handlebars templates
#[derive(Debug, Parser)]
#[command(name = "trellis", version, about, long_about = None, propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Log output format (pretty, compact, json)
    #[arg(long, global = true, env = "TRELLIS_LOG_FORMAT", default_value = "pretty")]
    pub log_format: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Render a template to stdout
    Render(RenderCommand),
    /// Compile templates and report failures
    Check(CheckCommand),
}

impl Cli {
    pub fn execute(self) -> Result<(), CliError> {
        match self.command {
            Commands::Render(cmd) => cmd.execute(),
            Commands::Check(cmd) => cmd.execute(),
        }
    }
}

/// Options shared by commands that build a template environment.
#[derive(Debug, Clone, Args)]
pub struct EnvironmentArgs {
    /// Path to a trellis.yaml configuration file
    #[arg(short, long, env = "TRELLIS_CONFIG", value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Directory templates are loaded from
    #[arg(short, long, value_hint = ValueHint::DirPath)]
    pub root: Option<PathBuf>,

    /// Filename of the base layout
    #[arg(short, long)]
    pub base: Option<String>,

    /// Compile every template afresh
    #[arg(long)]
    pub no_cache: bool,

    /// Fail on missing fields
    #[arg(long)]
    pub strict: bool,

    /// Do not HTML-escape expression output
    #[arg(long)]
    pub raw: bool,
}

impl EnvironmentArgs {
    /// Configuration from file or environment, with flags applied on top.
    pub fn config(&self) -> Result<TemplatingConfig, CliError> {
        let mut config = match &self.config {
            Some(path) => {
                let mut config = TemplatingConfig::load(path)?;
                config.apply_env();
                config
            }
            None => TemplatingConfig::from_env()?,
        };

        if let Some(root) = &self.root {
            config.root = root.clone();
        }
        if let Some(base) = &self.base {
            config.base = base.clone();
        }
        if self.no_cache {
            config.cache = false;
        }
        if self.strict {
            config.strict_mode = true;
        }
        if self.raw {
            config.escape_html = false;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn environment(&self) -> Result<Environment, CliError> {
        let config = self.config()?;
        tracing::debug!(root = %config.root.display(), base = %config.base, cache = config.cache, "Building template environment");
        Ok(Environment::new(Options::from_config(&config)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::parse_from([
            "trellis", "render", "index.html", "--root", "site", "--base", "layout.hbs",
            "--no-cache", "--strict", "--raw",
        ]);
        let Commands::Render(cmd) = cli.command else {
            panic!("expected render");
        };

        let config = cmd.env.config().unwrap();
        assert_eq!(config.root, PathBuf::from("site"));
        assert_eq!(config.base, "layout.hbs");
        assert!(!config.cache);
        assert!(config.strict_mode);
        assert!(!config.escape_html);
    }

    #[test]
    fn test_check_accepts_many_templates() {
        let cli = Cli::parse_from(["trellis", "-vv", "check", "a.html", "b.html"]);
        assert_eq!(cli.verbose, 2);
        let Commands::Check(cmd) = cli.command else {
            panic!("expected check");
        };
        assert_eq!(cmd.templates, vec!["a.html", "b.html"]);
    }
}
