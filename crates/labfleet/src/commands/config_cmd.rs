//! Config subcommand handlers.

use dialoguer::{Confirm, Input, Password};

use labfleet_config::Config;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::config;
use crate::error::CliError;
use crate::output;

const MASK: &str = "********";

// ── Helpers ─────────────────────────────────────────────────────────

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

/// Copy of `cfg` with secrets replaced for display.
fn redacted(cfg: &Config) -> Config {
    let mut shown = cfg.clone();
    if shown.controller.password.is_some() {
        shown.controller.password = Some(MASK.into());
    }
    if !shown.lab.password.is_empty() {
        shown.lab.password = MASK.into();
    }
    shown
}

fn to_toml(cfg: &Config) -> Result<String, CliError> {
    toml::to_string_pretty(cfg).map_err(|e| CliError::Internal(format!("TOML output failed: {e}")))
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: &ConfigArgs, global: &mut GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            output::print_output(&config::effective_path(global).display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = config::load(global)?;
            config::resolve_display(global, &cfg)?;
            let cfg = redacted(&cfg);
            let out = match output::format(global) {
                OutputFormat::Table | OutputFormat::Plain => to_toml(&cfg)?,
                format => output::render_single(format, &cfg, |_| String::new())?,
            };
            output::print_output(out.trim_end(), global.quiet);
            Ok(())
        }

        ConfigCommand::Init => init(global),
    }
}

/// Interactive wizard writing the essentials to the config file.
fn init(global: &GlobalOpts) -> Result<(), CliError> {
    let path = config::effective_path(global);
    eprintln!("labfleet configuration wizard");
    eprintln!("   Config path: {}\n", path.display());

    if path.exists()
        && !Confirm::new()
            .with_prompt("A config file already exists. Overwrite it?")
            .default(false)
            .interact()
            .map_err(prompt_err)?
    {
        return Ok(());
    }

    // Start from whatever is already in effect so env values survive.
    let mut cfg = config::load(global).unwrap_or_default();

    cfg.controller.url = Input::new()
        .with_prompt("Controller API URL")
        .default(cfg.controller.url.clone())
        .interact_text()
        .map_err(prompt_err)?;

    cfg.controller.project_id = Input::new()
        .with_prompt("Project ID")
        .with_initial_text(cfg.controller.project_id.clone())
        .interact_text()
        .map_err(prompt_err)?;

    cfg.controller.template_id = Input::new()
        .with_prompt("Router template ID")
        .with_initial_text(cfg.controller.template_id.clone())
        .interact_text()
        .map_err(prompt_err)?;

    cfg.fleet.first_device = Input::new()
        .with_prompt("First device number")
        .default(cfg.fleet.first_device)
        .interact_text()
        .map_err(prompt_err)?;

    cfg.fleet.last_device = Input::new()
        .with_prompt("Last device number")
        .default(cfg.fleet.last_device)
        .interact_text()
        .map_err(prompt_err)?;

    cfg.lab.username = Input::new()
        .with_prompt("Device login username")
        .default(cfg.lab.username.clone())
        .interact_text()
        .map_err(prompt_err)?;

    let password = Password::new()
        .with_prompt("Device login password (empty keeps the current one)")
        .allow_empty_password(true)
        .interact()
        .map_err(prompt_err)?;
    if !password.is_empty() {
        cfg.lab.password = password;
    }

    // Validate before writing anything.
    cfg.controller_config()?;
    cfg.devices()?;

    labfleet_config::save_config(&cfg, &path)?;
    eprintln!("\n   ✓ Saved to {}", path.display());
    Ok(())
}
