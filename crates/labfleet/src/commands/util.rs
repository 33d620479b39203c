//! Shared helpers for command handlers.

use std::io::IsTerminal;

use labfleet_config::Config;
use labfleet_core::{BatchReport, TeraRenderer};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, action: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))
}

/// Router config renderer: the configured template file, or the built-in one.
pub fn router_renderer(cfg: &Config) -> Result<TeraRenderer, CliError> {
    let lab = cfg.lab_settings()?;
    let renderer = match cfg.provision.router_template {
        Some(ref path) => TeraRenderer::from_file(path, &lab)?,
        None => TeraRenderer::builtin_router(&lab)?,
    };
    Ok(renderer)
}

/// Print a batch summary plus one line per failed device; a batch with
/// failures becomes `PartialFailure`.
pub fn finish_batch(operation: &str, report: &BatchReport, global: &GlobalOpts) -> Result<(), CliError> {
    let color = output::color_enabled(global);
    for failure in &report.failed {
        eprintln!("  ✗ {failure}");
        if let Some(body) = failure.error.response_body() {
            eprintln!("    response: {body}");
        }
    }
    let summary = format!("{operation}: {}", report.summary());
    output::print_output(
        &output::paint_summary(&summary, !report.is_success(), color),
        global.quiet,
    );

    if report.is_success() {
        Ok(())
    } else {
        Err(CliError::PartialFailure {
            operation: operation.into(),
            failed: report.failed.len(),
            total: report.failed.len() + report.succeeded.len(),
        })
    }
}
