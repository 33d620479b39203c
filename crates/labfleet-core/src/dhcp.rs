// ── DHCP server configuration ──
//
// Devices are grouped by management network (sorted by network address)
// and rendered into a dhcpd.conf with one subnet per network and one host
// entry per device.

use std::collections::BTreeMap;
use std::net::Ipv4Addr;
use std::path::Path;

use serde::Serialize;
use tera::Context;

use crate::config::LabSettings;
use crate::device::Device;
use crate::error::CoreError;
use crate::render::{self, DHCP_TEMPLATE, DeviceVars, LabVars};

/// One management network and the devices living in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkGroup {
    pub network: String,
    pub prefix_len: u8,
    pub netmask: String,
    pub broadcast: String,
    pub gateway: String,
    pub devices: Vec<DeviceVars>,
}

/// Group devices by management network, lowest network first.
pub fn group_by_network(devices: &[Device]) -> Vec<NetworkGroup> {
    let mut by_network: BTreeMap<(Ipv4Addr, u8), Vec<&Device>> = BTreeMap::new();
    for device in devices {
        let mgmt = device.management();
        by_network
            .entry((mgmt.network_address(), mgmt.prefix_len()))
            .or_default()
            .push(device);
    }

    by_network
        .into_iter()
        .filter_map(|((network, prefix_len), members)| {
            let mgmt = members.first()?.management();
            Some(NetworkGroup {
                network: network.to_string(),
                prefix_len,
                netmask: mgmt.netmask().to_string(),
                broadcast: mgmt.broadcast_address().to_string(),
                gateway: mgmt.last_host().to_string(),
                devices: members.into_iter().map(DeviceVars::from).collect(),
            })
        })
        .collect()
}

/// Render dhcpd.conf for `devices`. `template` replaces the built-in one.
pub fn render_dhcp_config(
    devices: &[Device],
    lab: &LabSettings,
    template: Option<&str>,
) -> Result<String, CoreError> {
    let name = "dhcpd.conf";
    let tera = render::compile(name, template.unwrap_or(DHCP_TEMPLATE))?;

    let mut context = Context::new();
    context.insert("lab", &LabVars::from(lab));
    context.insert("networks", &group_by_network(devices));
    context.insert(
        "devices",
        &devices.iter().map(DeviceVars::from).collect::<Vec<_>>(),
    );
    render::render(&tera, name, &context)
}

/// Write the rendered config, creating parent directories.
pub fn write_dhcp_config(path: &Path, contents: &str) -> Result<(), CoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| CoreError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(path, contents).map_err(|source| CoreError::Io {
        path: path.to_path_buf(),
        source,
    })
}
