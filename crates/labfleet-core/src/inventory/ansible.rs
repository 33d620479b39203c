// Ansible YAML inventory: `all` -> `CORE{n}` -> `Switch{m}` -> hosts.

use std::path::Path;

use indexmap::IndexMap;
use secrecy::ExposeSecret;
use serde::Serialize;

use super::{HostVars, InventoryOptions, write_host_vars, write_yaml};
use crate::config::LabSettings;
use crate::device::Device;
use crate::error::CoreError;

/// A host entry in `hosts.yaml`. Per-host variables go to `host_vars/`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryHost {
    pub ansible_host: String,
    #[serde(skip)]
    pub host_vars: Option<HostVars>,
}

/// A named group: child hosts, child groups and group variables. Names are
/// unique within a group.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InventoryGroup {
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub hosts: IndexMap<String, InventoryHost>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub children: IndexMap<String, InventoryGroup>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub vars: HostVars,
}

impl InventoryGroup {
    /// Child group `name`, created if missing.
    pub fn child(&mut self, name: &str) -> &mut InventoryGroup {
        self.children.entry(name.to_owned()).or_default()
    }

    pub fn add_host(&mut self, name: impl Into<String>, host: InventoryHost) {
        self.hosts.insert(name.into(), host);
    }

    pub fn add_vars(&mut self, vars: impl IntoIterator<Item = (String, serde_yaml::Value)>) {
        self.vars.extend(vars);
    }

    /// Fold another tree into this one. Same-named groups merge
    /// recursively; hosts and vars from `other` win on conflict.
    pub fn merge(&mut self, other: InventoryGroup) {
        self.hosts.extend(other.hosts);
        self.vars.extend(other.vars);
        for (name, group) in other.children {
            self.child(&name).merge(group);
        }
    }

    /// Every host in this subtree, depth first.
    pub fn all_hosts(&self) -> Vec<(&String, &InventoryHost)> {
        let mut hosts: Vec<_> = self.hosts.iter().collect();
        for group in self.children.values() {
            hosts.extend(group.all_hosts());
        }
        hosts
    }
}

/// Inventory rooted at the synthetic `all` group.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnsibleInventory {
    pub root: InventoryGroup,
}

impl AnsibleInventory {
    pub fn from_devices(devices: &[Device], lab: &LabSettings, options: &InventoryOptions) -> Self {
        let mut root = InventoryGroup::default();
        root.add_vars([
            ("ansible_user".to_owned(), lab.username.clone().into()),
            (
                "ansible_password".to_owned(),
                lab.password.expose_secret().to_owned().into(),
            ),
            (
                "ansible_connection".to_owned(),
                options.ansible_connection.clone().into(),
            ),
            (
                "ansible_network_os".to_owned(),
                options.ansible_network_os.clone().into(),
            ),
        ]);

        let host_vars = options.host_vars();
        for device in devices {
            root.child(&device.connected_core_router())
                .child(&device.connected_switch())
                .add_host(
                    device.name(),
                    InventoryHost {
                        ansible_host: device.host(),
                        host_vars: host_vars.clone(),
                    },
                );
        }
        Self { root }
    }

    /// Merge several inventories under one `all` root.
    pub fn merged(inventories: impl IntoIterator<Item = AnsibleInventory>) -> Self {
        let mut merged = Self::default();
        for inventory in inventories {
            merged.root.merge(inventory.root);
        }
        merged
    }

    /// `hosts.yaml` contents.
    pub fn to_yaml(&self) -> Result<String, CoreError> {
        serde_yaml::to_string(&self.document()).map_err(|e| CoreError::Serialization {
            what: "ansible inventory".into(),
            message: e.to_string(),
        })
    }

    /// Write `hosts.yaml` and, for hosts that carry variables,
    /// `host_vars/{name}.yaml`. Returns the number of host_vars files.
    pub fn write_to_dir(&self, dir: &Path) -> Result<usize, CoreError> {
        write_yaml(&dir.join("hosts.yaml"), &self.document())?;
        write_host_vars(
            dir,
            self.root
                .all_hosts()
                .into_iter()
                .filter_map(|(name, host)| host.host_vars.as_ref().map(|vars| (name, vars))),
        )
    }

    fn document(&self) -> IndexMap<&'static str, &InventoryGroup> {
        IndexMap::from([("all", &self.root)])
    }
}
