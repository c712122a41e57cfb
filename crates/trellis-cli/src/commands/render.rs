//! `trellis render`

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Args, ValueHint};
use serde_json::Value;
use trellis_common_log::template_span;
use trellis_templating::Environment;

use crate::cli::EnvironmentArgs;
use crate::error::CliError;

#[derive(Debug, Args)]
pub struct RenderCommand {
    /// Template filename, relative to the template root
    pub template: String,

    /// JSON file with the data to render
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub data: Option<PathBuf>,

    #[command(flatten)]
    pub env: EnvironmentArgs,
}

impl RenderCommand {
    pub fn execute(&self) -> Result<(), CliError> {
        let data = match &self.data {
            Some(path) => read_data(path)?,
            None => Value::Null,
        };
        let env = self.env.environment()?;

        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        render(&env, &mut out, &self.template, &data)?;
        out.flush().map_err(|source| CliError::Io {
            path: PathBuf::from("<stdout>"),
            source,
        })
    }
}

/// Render `template` into `out`. Failures leave the error text in `out`.
pub(crate) fn render<W: Write>(
    env: &Environment,
    out: &mut W,
    template: &str,
    data: &Value,
) -> Result<(), CliError> {
    let _span = template_span(template).entered();
    env.render(out, template, data)?;
    Ok(())
}

fn read_data(path: &Path) -> Result<Value, CliError> {
    let contents = std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| CliError::Data {
        path: path.to_path_buf(),
        source,
    })
}
