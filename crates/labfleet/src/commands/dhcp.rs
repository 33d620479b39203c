//! `labfleet dhcp`: render dhcpd.conf for the fleet.

use labfleet_config::Config;
use labfleet_core::dhcp::{render_dhcp_config, write_dhcp_config};

use crate::cli::{DhcpArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

pub fn handle(cfg: &Config, args: &DhcpArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let devices = cfg.devices()?;
    let lab = cfg.lab_settings()?;
    let template = cfg
        .provision
        .dhcp_template
        .as_deref()
        .map(std::fs::read_to_string)
        .transpose()?;

    let rendered = render_dhcp_config(&devices, &lab, template.as_deref())?;
    match args.file {
        Some(ref path) => {
            write_dhcp_config(path, &rendered)?;
            output::print_output(
                &format!("{} leases written to {}", devices.len(), path.display()),
                global.quiet,
            );
        }
        None => output::print_output(rendered.trim_end(), global.quiet),
    }
    Ok(())
}
