//! CLI-side configuration: the shared config file plus flag overrides.
//!
//! Core never sees these types; it receives pre-built runtime configs.

use std::path::PathBuf;

use clap::ValueEnum;
use labfleet_config::Config;
use labfleet_core::{ControllerConfig, Project};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Path of the config file in effect (`--config` or the platform default).
pub fn effective_path(global: &GlobalOpts) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(labfleet_config::config_path)
}

/// Load the layered config and apply `--controller` / `--project`.
pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    let mut cfg = labfleet_config::load_config(Some(&effective_path(global)))?;
    apply_overrides(&mut cfg, global);
    Ok(cfg)
}

fn apply_overrides(cfg: &mut Config, global: &GlobalOpts) {
    if let Some(ref url) = global.controller {
        cfg.controller.url.clone_from(url);
    }
    if let Some(ref project) = global.project {
        cfg.controller.project_id.clone_from(project);
    }
}

/// Fill `--output` and `--color` from the `[defaults]` section when the
/// flags were not given.
pub fn resolve_display(global: &mut GlobalOpts, cfg: &Config) -> Result<(), CliError> {
    if global.output.is_none() {
        global.output = Some(parse_default("defaults.output", &cfg.defaults.output, global)?);
    }
    if global.color.is_none() {
        global.color = Some(parse_default("defaults.color", &cfg.defaults.color, global)?);
    }
    Ok(())
}

fn parse_default<T: ValueEnum>(field: &str, value: &str, global: &GlobalOpts) -> Result<T, CliError> {
    T::from_str(value, true).map_err(|reason| CliError::Config {
        field: field.into(),
        reason,
        path: effective_path(global).display().to_string(),
    })
}

/// Build the client and fetch the project's current nodes and links.
pub async fn connect(cfg: &Config) -> Result<Project, CliError> {
    let controller: ControllerConfig = cfg.controller_config()?;
    tracing::debug!(url = %controller.url, project = %controller.project_id, "connecting");
    let client = controller.client()?;
    Ok(Project::fetch(client).await?)
}
