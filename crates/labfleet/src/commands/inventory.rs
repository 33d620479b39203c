//! `labfleet inventory`: Ansible and Nornir inventories for the fleet.

use labfleet_config::Config;
use labfleet_core::inventory::{AnsibleInventory, NornirInventory};

use crate::cli::{GlobalOpts, InventoryArgs};
use crate::error::CliError;
use crate::output;

pub fn handle(cfg: &Config, args: &InventoryArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let devices = cfg.devices()?;
    let lab = cfg.lab_settings()?;
    let options = cfg.inventory_options(args.stress);

    if args.ansible_dir.is_none() && args.nornir_dir.is_none() {
        // No target directory: print the Ansible tree.
        let yaml = AnsibleInventory::from_devices(&devices, &lab, &options).to_yaml()?;
        output::print_output(yaml.trim_end(), global.quiet);
        return Ok(());
    }

    if let Some(ref dir) = args.ansible_dir {
        let host_vars = AnsibleInventory::from_devices(&devices, &lab, &options).write_to_dir(dir)?;
        output::print_output(
            &format!(
                "ansible: {} hosts written to {} ({host_vars} host_vars files)",
                devices.len(),
                dir.display()
            ),
            global.quiet,
        );
    }
    if let Some(ref dir) = args.nornir_dir {
        let host_vars = NornirInventory::from_devices(&devices, &lab, &options).write_to_dir(dir)?;
        output::print_output(
            &format!(
                "nornir: {} hosts written to {} ({host_vars} host_vars files)",
                devices.len(),
                dir.display()
            ),
            global.quiet,
        );
    }
    Ok(())
}
