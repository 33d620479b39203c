// Nornir SimpleInventory: hosts.yaml, groups.yaml and defaults.yaml.

use std::path::Path;

use indexmap::IndexMap;
use secrecy::ExposeSecret;
use serde::Serialize;

use super::{HostVars, InventoryOptions, write_host_vars, write_yaml};
use crate::config::LabSettings;
use crate::device::Device;
use crate::error::CoreError;

/// A host, group or defaults entry. Empty fields are omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NornirEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<String>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub data: HostVars,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NornirInventory {
    pub hosts: IndexMap<String, NornirEntry>,
    /// Switch groups, each parented to its core-router group.
    pub groups: IndexMap<String, NornirEntry>,
    pub defaults: NornirEntry,
    /// Per-host variables written to `host_vars/` (stress mode).
    pub host_vars: IndexMap<String, HostVars>,
}

impl NornirInventory {
    pub fn from_devices(devices: &[Device], lab: &LabSettings, options: &InventoryOptions) -> Self {
        let mut inventory = Self {
            defaults: NornirEntry {
                username: Some(lab.username.clone()),
                password: Some(lab.password.expose_secret().to_owned()),
                platform: Some(options.nornir_platform.clone()),
                ..NornirEntry::default()
            },
            ..Self::default()
        };

        let host_vars = options.host_vars();
        for device in devices {
            let switch = device.connected_switch();
            let core = device.connected_core_router();

            inventory.hosts.insert(
                device.name(),
                NornirEntry {
                    hostname: Some(device.host()),
                    groups: vec![switch.clone()],
                    ..NornirEntry::default()
                },
            );
            inventory.groups.entry(core.clone()).or_default();
            inventory.groups.entry(switch).or_insert_with(|| NornirEntry {
                groups: vec![core],
                ..NornirEntry::default()
            });
            if let Some(vars) = &host_vars {
                inventory.host_vars.insert(device.name(), vars.clone());
            }
        }
        inventory
    }

    /// Write the three inventory files plus any `host_vars/`. Returns the
    /// number of host_vars files.
    pub fn write_to_dir(&self, dir: &Path) -> Result<usize, CoreError> {
        write_yaml(&dir.join("hosts.yaml"), &self.hosts)?;
        write_yaml(&dir.join("groups.yaml"), &self.groups)?;
        write_yaml(&dir.join("defaults.yaml"), &self.defaults)?;
        write_host_vars(dir, &self.host_vars)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::device::{FleetLayout, ManagementScheme, fleet};

    fn inventory(stress: bool) -> NornirInventory {
        let layout = FleetLayout::new(2, 2).unwrap();
        let devices = fleet(1..=5, layout, &ManagementScheme::default()).unwrap();
        let options = InventoryOptions {
            stress,
            ..InventoryOptions::default()
        };
        NornirInventory::from_devices(&devices, &LabSettings::default(), &options)
    }

    #[test]
    fn hosts_point_at_switch_groups() {
        let inv = inventory(false);
        assert_eq!(inv.hosts["3"].hostname.as_deref(), Some("10.15.2.1"));
        assert_eq!(inv.hosts["3"].groups, vec!["Switch2".to_owned()]);
        assert_eq!(inv.groups["Switch3"].groups, vec!["CORE2".to_owned()]);
        assert!(inv.groups["CORE1"].groups.is_empty());
        assert_eq!(inv.defaults.platform.as_deref(), Some("ios"));
    }

    #[test]
    fn files_are_written() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nornir").join("inventory");
        assert_eq!(inventory(false).write_to_dir(&target).unwrap(), 0);

        for file in ["hosts.yaml", "groups.yaml", "defaults.yaml"] {
            assert!(target.join(file).exists(), "{file}");
        }
        let defaults = std::fs::read_to_string(target.join("defaults.yaml")).unwrap();
        assert!(defaults.contains("username: cisco"));
        assert!(!defaults.contains("groups"));
    }

    #[test]
    fn stress_mode_writes_host_vars() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(inventory(true).write_to_dir(dir.path()).unwrap(), 5);
        assert!(dir.path().join("host_vars").join("5.yaml").exists());
    }
}
