//! `trellis check`

use clap::Args;
use tracing::{error, info};
use trellis_templating::Environment;

use crate::cli::EnvironmentArgs;
use crate::error::CliError;

#[derive(Debug, Args)]
pub struct CheckCommand {
    /// Template filenames, relative to the template root
    #[arg(required = true)]
    pub templates: Vec<String>,

    #[command(flatten)]
    pub env: EnvironmentArgs,
}

impl CheckCommand {
    pub fn execute(&self) -> Result<(), CliError> {
        let env = self.env.environment()?;
        let failed = check(&env, &self.templates);

        for (name, err) in &failed {
            println!("FAIL {name}: {err}");
        }
        println!("{} ok, {} failed", self.templates.len() - failed.len(), failed.len());

        if failed.is_empty() {
            Ok(())
        } else {
            Err(CliError::CheckFailed {
                failed: failed.len(),
                total: self.templates.len(),
            })
        }
    }
}

/// Compile each template, returning the ones that failed with their errors.
pub(crate) fn check<'a>(env: &Environment, templates: &'a [String]) -> Vec<(&'a str, String)> {
    templates
        .iter()
        .filter_map(|name| match env.load_template(name) {
            Ok(template) => {
                info!(template = %name, parts = ?template.template_names(), "Template compiled");
                None
            }
            Err(err) => {
                error!(template = %name, error = %err, "Template failed to compile");
                Some((name.as_str(), err.to_string()))
            }
        })
        .collect()
}
