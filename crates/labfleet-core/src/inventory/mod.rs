// ── Configuration-management inventories ──
//
// Build-then-serialize passes over the device set: nothing here talks to
// the controller, and every run rebuilds the files from scratch.

pub mod ansible;
pub mod nornir;

use std::path::Path;

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::CoreError;

pub use ansible::{AnsibleInventory, InventoryGroup, InventoryHost};
pub use nornir::{NornirEntry, NornirInventory};

/// Free-form per-host variables, in insertion order.
pub type HostVars = IndexMap<String, serde_yaml::Value>;

/// Number of synthetic values attached per host in stress mode.
pub const STRESS_VALUES_PER_HOST: usize = 1000;

/// Platform values written into the inventories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryOptions {
    pub ansible_connection: String,
    pub ansible_network_os: String,
    pub nornir_platform: String,
    /// Attach a large synthetic `random` variable to every host.
    pub stress: bool,
}

impl Default for InventoryOptions {
    fn default() -> Self {
        Self {
            ansible_connection: "network_cli".into(),
            ansible_network_os: "ios".into(),
            nornir_platform: "ios".into(),
            stress: false,
        }
    }
}

impl InventoryOptions {
    pub(crate) fn host_vars(&self) -> Option<HostVars> {
        self.stress.then(stress_vars)
    }
}

/// `{"random": [<1000 uuid strings>]}`
pub fn stress_vars() -> HostVars {
    let values = (0..STRESS_VALUES_PER_HOST)
        .map(|_| serde_yaml::Value::String(uuid::Uuid::new_v4().to_string()))
        .collect();
    let mut vars = HostVars::new();
    vars.insert("random".into(), serde_yaml::Value::Sequence(values));
    vars
}

/// Serialize `value` as YAML into `path`, creating parent directories.
pub(crate) fn write_yaml<T: Serialize>(path: &Path, value: &T) -> Result<(), CoreError> {
    let text = serde_yaml::to_string(value).map_err(|e| CoreError::Serialization {
        what: path.display().to_string(),
        message: e.to_string(),
    })?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| CoreError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(path, text).map_err(|source| CoreError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Write one `host_vars/{name}.yaml` per entry.
pub(crate) fn write_host_vars<'a>(
    dir: &Path,
    hosts: impl IntoIterator<Item = (&'a String, &'a HostVars)>,
) -> Result<usize, CoreError> {
    let mut written = 0;
    for (name, vars) in hosts {
        write_yaml(&dir.join("host_vars").join(format!("{name}.yaml")), vars)?;
        written += 1;
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stress_vars_hold_unique_uuids() {
        let vars = stress_vars();
        let Some(serde_yaml::Value::Sequence(values)) = vars.get("random") else {
            panic!("missing random list");
        };
        assert_eq!(values.len(), STRESS_VALUES_PER_HOST);
        let unique: std::collections::HashSet<_> = values.iter().filter_map(|v| v.as_str()).collect();
        assert_eq!(unique.len(), STRESS_VALUES_PER_HOST);
    }

    #[test]
    fn stress_is_opt_in() {
        assert!(InventoryOptions::default().host_vars().is_none());
        let opts = InventoryOptions {
            stress: true,
            ..InventoryOptions::default()
        };
        assert!(opts.host_vars().is_some());
    }
}
