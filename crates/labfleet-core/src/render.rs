// ── Device configuration rendering ──
//
// The provisioning engine only needs "device in, config text out"; that
// seam is the `ConfigRenderer` trait. `TeraRenderer` is the stock
// implementation backed by a Tera template with `device` and `lab` in
// its context.

use std::error::Error as _;
use std::path::Path;

use secrecy::ExposeSecret;
use serde::Serialize;
use tera::{Context, Tera};

use crate::config::LabSettings;
use crate::device::Device;
use crate::error::CoreError;

/// Built-in IOS router startup configuration.
pub const ROUTER_TEMPLATE: &str = include_str!("../templates/router.cfg.tera");

/// Built-in ISC dhcpd configuration.
pub const DHCP_TEMPLATE: &str = include_str!("../templates/dhcpd.conf.tera");

/// Turns a device into its startup configuration text.
pub trait ConfigRenderer: Send + Sync {
    fn render(&self, device: &Device) -> Result<String, CoreError>;
}

impl<F> ConfigRenderer for F
where
    F: Fn(&Device) -> Result<String, CoreError> + Send + Sync,
{
    fn render(&self, device: &Device) -> Result<String, CoreError> {
        self(device)
    }
}

// ── Template context ─────────────────────────────────────────────────

/// Everything a template can know about one device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceVars {
    pub name: String,
    pub hostname: String,
    pub host: String,
    pub seq: u32,
    pub group: u32,
    pub seq_in_group: u32,
    pub switch: String,
    pub core_router: String,
    pub mgmt_ip: String,
    /// Address with prefix length, e.g. `10.15.1.1/24`.
    pub mgmt_interface: String,
    pub prefix_len: u8,
    pub network_address: String,
    pub netmask: String,
    pub broadcast: String,
    pub default_gateway: String,
}

impl From<&Device> for DeviceVars {
    fn from(device: &Device) -> Self {
        let mgmt = device.management();
        Self {
            name: device.name(),
            hostname: device.hostname().to_owned(),
            host: device.host(),
            seq: device.sequence_number(),
            group: device.group_number(),
            seq_in_group: device.sequence_in_group(),
            switch: device.connected_switch(),
            core_router: device.connected_core_router(),
            mgmt_ip: mgmt.address().to_string(),
            mgmt_interface: mgmt.to_string(),
            prefix_len: mgmt.prefix_len(),
            network_address: mgmt.network_address().to_string(),
            netmask: mgmt.netmask().to_string(),
            broadcast: mgmt.broadcast_address().to_string(),
            default_gateway: device.default_gateway().to_string(),
        }
    }
}

/// Lab-wide template values. Carries the device password in clear text
/// and has no `Debug` impl.
#[derive(Clone, Serialize)]
pub struct LabVars {
    pub domain_name: String,
    pub dns_servers: Vec<String>,
    pub external_network: String,
    pub external_netmask: String,
    pub username: String,
    pub password: String,
}

impl From<&LabSettings> for LabVars {
    fn from(lab: &LabSettings) -> Self {
        Self {
            domain_name: lab.domain_name.clone(),
            dns_servers: lab.dns_servers.iter().map(ToString::to_string).collect(),
            external_network: lab.external_network.to_string(),
            external_netmask: lab.external_netmask.to_string(),
            username: lab.username.clone(),
            password: lab.password.expose_secret().to_owned(),
        }
    }
}

// ── Tera renderer ────────────────────────────────────────────────────

/// A `ConfigRenderer` backed by one Tera template.
pub struct TeraRenderer {
    tera: Tera,
    name: String,
    lab: LabVars,
}

impl TeraRenderer {
    /// The built-in router template.
    pub fn builtin_router(lab: &LabSettings) -> Result<Self, CoreError> {
        Self::from_source("router.cfg", ROUTER_TEMPLATE, lab)
    }

    /// A template loaded from disk.
    pub fn from_file(path: &Path, lab: &LabSettings) -> Result<Self, CoreError> {
        let source = std::fs::read_to_string(path).map_err(|source| CoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path
            .file_name()
            .map_or_else(|| "custom".to_owned(), |n| n.to_string_lossy().into_owned());
        Self::from_source(&name, &source, lab)
    }

    /// A template given as a string.
    pub fn from_source(name: &str, source: &str, lab: &LabSettings) -> Result<Self, CoreError> {
        Ok(Self {
            tera: compile(name, source)?,
            name: name.to_owned(),
            lab: LabVars::from(lab),
        })
    }
}

impl ConfigRenderer for TeraRenderer {
    fn render(&self, device: &Device) -> Result<String, CoreError> {
        let mut context = Context::new();
        context.insert("device", &DeviceVars::from(device));
        context.insert("lab", &self.lab);
        render(&self.tera, &self.name, &context)
    }
}

// ── Shared helpers ───────────────────────────────────────────────────

pub(crate) fn compile(name: &str, source: &str) -> Result<Tera, CoreError> {
    let mut tera = Tera::default();
    tera.add_raw_template(name, source)
        .map_err(|e| CoreError::Render {
            template: name.to_owned(),
            message: describe(&e),
        })?;
    Ok(tera)
}

pub(crate) fn render(tera: &Tera, name: &str, context: &Context) -> Result<String, CoreError> {
    tera.render(name, context).map_err(|e| CoreError::Render {
        template: name.to_owned(),
        message: describe(&e),
    })
}

/// Flatten a Tera error and its cause chain into one line.
fn describe(err: &tera::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
