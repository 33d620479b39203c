//! Shared configuration for the labfleet CLI.
//!
//! TOML file + `LABFLEET_*` environment layering, the
//! `ALWAYS_UPDATE_ROUTER_CFG` flag, and translation into the runtime types
//! of `labfleet_core`. The CLI adds flag-aware overrides on top.

use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use labfleet_api::{BasicAuth, RetryPolicy, TransportConfig};
use labfleet_core::inventory::InventoryOptions;
use labfleet_core::{
    ControllerConfig, CoreError, Device, FleetLayout, GridLayout, LabSettings, ManagementScheme,
    PostDelay, ProvisionOptions,
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable forcing configuration pushes to existing routers.
pub const ALWAYS_UPDATE_ENV: &str = "ALWAYS_UPDATE_ROUTER_CFG";

/// Prefix of environment overrides (`LABFLEET_CONTROLLER__URL`, ...).
pub const ENV_PREFIX: &str = "LABFLEET_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Validation {
        field: field.into(),
        reason: reason.into(),
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub defaults: Defaults,
    pub controller: ControllerSection,
    pub fleet: FleetSection,
    pub provision: ProvisionSection,
    pub lab: LabSection,
}

/// Fallbacks for the CLI's `--output` and `--color` flags.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Defaults {
    /// Output format: table, json, json-compact, yaml or plain.
    pub output: String,
    /// Color mode: auto, always or never.
    pub color: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: "table".into(),
            color: "auto".into(),
        }
    }
}

/// The controller project to drive.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ControllerSection {
    /// API root, e.g. `http://192.168.1.10:3080/v2`.
    pub url: String,
    pub project_id: String,
    /// Template routers are instantiated from.
    pub template_id: String,
    pub max_connections: usize,
    /// Request timeout (seconds).
    pub timeout: u64,
    /// HTTP basic auth for controllers with authentication enabled.
    pub username: Option<String>,
    pub password: Option<String>,
    pub retry_attempts: u32,
    pub retry_delay_secs: u64,
    pub retry_multiplier: u32,
}

impl Default for ControllerSection {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:3080/v2".into(),
            project_id: String::new(),
            template_id: String::new(),
            max_connections: labfleet_api::DEFAULT_MAX_CONNECTIONS,
            timeout: 30,
            username: None,
            password: None,
            retry_attempts: 5,
            retry_delay_secs: 3,
            retry_multiplier: 2,
        }
    }
}

/// Device range, grouping and addressing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct FleetSection {
    pub first_device: u32,
    pub last_device: u32,
    pub devices_per_switch: u32,
    pub switches_per_core_router: u32,
    pub devices_per_row: u32,
    pub pixels_between_devices: i32,
    pub mgmt_first_octet: u8,
    pub mgmt_second_octet: u8,
    pub mgmt_prefix_len: u8,
}

impl Default for FleetSection {
    fn default() -> Self {
        Self {
            first_device: 1,
            last_device: 500,
            devices_per_switch: 50,
            switches_per_core_router: 100,
            devices_per_row: 10,
            pixels_between_devices: 85,
            mgmt_first_octet: 10,
            mgmt_second_octet: 15,
            mgmt_prefix_len: 24,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ProvisionSection {
    pub always_reconfigure: bool,
    /// Concurrent start calls during a staggered start.
    pub stagger_pool_size: usize,
    /// Upper bound of the random pause after each start (seconds).
    pub max_jitter_secs: u64,
    /// Router template file replacing the built-in one.
    pub router_template: Option<PathBuf>,
    /// dhcpd.conf template file replacing the built-in one.
    pub dhcp_template: Option<PathBuf>,
}

impl Default for ProvisionSection {
    fn default() -> Self {
        Self {
            always_reconfigure: false,
            stagger_pool_size: 25,
            max_jitter_secs: 30,
            router_template: None,
            dhcp_template: None,
        }
    }
}

/// Lab-wide values used by templates and inventories.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LabSection {
    pub domain_name: String,
    pub dns_servers: Vec<String>,
    pub external_network: String,
    pub external_netmask: String,
    pub username: String,
    pub password: String,
    pub ansible_connection: String,
    pub ansible_network_os: String,
    pub nornir_platform: String,
}

impl Default for LabSection {
    fn default() -> Self {
        Self {
            domain_name: "lab.local".into(),
            dns_servers: vec!["192.168.122.1".into()],
            external_network: "192.168.122.0".into(),
            external_netmask: "255.255.255.0".into(),
            username: "cisco".into(),
            password: "cisco".into(),
            ansible_connection: "network_cli".into(),
            ansible_network_os: "ios".into(),
            nornir_platform: "ios".into(),
        }
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("dev", "labfleet", "labfleet").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("labfleet");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Defaults, then the TOML file, then `LABFLEET_*` variables (nested keys
/// separated by `__`).
pub fn figment(path: &Path) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
}

/// Load the full config from `path` (or the default location) plus the
/// environment, then apply `ALWAYS_UPDATE_ROUTER_CFG`.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = path.map_or_else(config_path, Path::to_path_buf);
    let mut config: Config = figment(&path).extract()?;
    config.apply_env_flags(|name| std::env::var(name).ok());
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`.
pub fn save_config(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Environment flags ───────────────────────────────────────────────

/// `yes`, `true`, `y` and `1` (any case) are true; anything else is false.
pub fn parse_flag(value: Option<&str>) -> bool {
    value.is_some_and(|v| {
        matches!(
            v.trim().to_ascii_lowercase().as_str(),
            "yes" | "true" | "y" | "1"
        )
    })
}

impl Config {
    /// Apply flag variables looked up through `lookup`.
    pub fn apply_env_flags(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if parse_flag(lookup(ALWAYS_UPDATE_ENV).as_deref()) {
            self.provision.always_reconfigure = true;
        }
    }

    // ── Translation into runtime types ──────────────────────────────

    /// Connection settings for the configured project.
    pub fn controller_config(&self) -> Result<ControllerConfig, ConfigError> {
        let c = &self.controller;
        let url: url::Url = c
            .url
            .parse()
            .map_err(|_| invalid("controller.url", format!("invalid URL: {}", c.url)))?;
        if c.project_id.trim().is_empty() {
            return Err(invalid("controller.project_id", "not set"));
        }
        if c.retry_attempts == 0 {
            return Err(invalid("controller.retry_attempts", "must be at least 1"));
        }

        let basic_auth = match (&c.username, &c.password) {
            (Some(username), password) => Some(BasicAuth {
                username: username.clone(),
                password: SecretString::from(password.clone().unwrap_or_default()),
            }),
            (None, Some(_)) => {
                return Err(invalid("controller.username", "password given without username"));
            }
            (None, None) => None,
        };

        Ok(ControllerConfig {
            url,
            project_id: c.project_id.clone(),
            transport: TransportConfig {
                timeout: Duration::from_secs(c.timeout),
                max_connections: c.max_connections,
                basic_auth,
            },
            retry: RetryPolicy {
                max_attempts: c.retry_attempts,
                initial_delay: Duration::from_secs(c.retry_delay_secs),
                multiplier: c.retry_multiplier,
            },
        })
    }

    pub fn fleet_layout(&self) -> Result<FleetLayout, ConfigError> {
        Ok(FleetLayout::new(
            self.fleet.devices_per_switch,
            self.fleet.switches_per_core_router,
        )?)
    }

    pub fn grid_layout(&self) -> Result<GridLayout, ConfigError> {
        Ok(GridLayout::new(
            self.fleet.devices_per_row,
            self.fleet.pixels_between_devices,
        )?)
    }

    pub fn management_scheme(&self) -> ManagementScheme {
        ManagementScheme {
            first_octet: self.fleet.mgmt_first_octet,
            second_octet: self.fleet.mgmt_second_octet,
            prefix_len: self.fleet.mgmt_prefix_len,
        }
    }

    /// The dense device set `first_device..=last_device`.
    pub fn devices(&self) -> Result<Vec<Device>, ConfigError> {
        let (first, last) = (self.fleet.first_device, self.fleet.last_device);
        if first > last {
            return Err(invalid(
                "fleet.first_device",
                format!("{first} is after last_device {last}"),
            ));
        }
        Ok(labfleet_core::fleet(
            first..=last,
            self.fleet_layout()?,
            &self.management_scheme(),
        )?)
    }

    pub fn provision_options(&self) -> Result<ProvisionOptions, ConfigError> {
        if self.controller.template_id.trim().is_empty() {
            return Err(invalid("controller.template_id", "not set"));
        }
        Ok(ProvisionOptions {
            template_id: self.controller.template_id.clone(),
            always_reconfigure: self.provision.always_reconfigure,
            grid: self.grid_layout()?,
        })
    }

    pub fn post_delay(&self) -> PostDelay {
        PostDelay::jitter_secs(self.provision.max_jitter_secs)
    }

    pub fn lab_settings(&self) -> Result<LabSettings, ConfigError> {
        let lab = &self.lab;
        let dns_servers = lab
            .dns_servers
            .iter()
            .map(|s| parse_ip("lab.dns_servers", s))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(LabSettings {
            domain_name: lab.domain_name.clone(),
            dns_servers,
            external_network: parse_ip("lab.external_network", &lab.external_network)?,
            external_netmask: parse_ip("lab.external_netmask", &lab.external_netmask)?,
            username: lab.username.clone(),
            password: SecretString::from(lab.password.clone()),
        })
    }

    pub fn inventory_options(&self, stress: bool) -> InventoryOptions {
        InventoryOptions {
            ansible_connection: self.lab.ansible_connection.clone(),
            ansible_network_os: self.lab.ansible_network_os.clone(),
            nornir_platform: self.lab.nornir_platform.clone(),
            stress,
        }
    }
}

fn parse_ip(field: &str, value: &str) -> Result<Ipv4Addr, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| invalid(field, format!("'{value}' is not an IPv4 address")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn configured() -> Config {
        let mut cfg = Config::default();
        cfg.controller.project_id = "1cd5351d".into();
        cfg.controller.template_id = "c1d1eb22".into();
        cfg
    }

    #[test]
    fn flag_values() {
        for truthy in ["yes", "TRUE", "y", "1", " Yes "] {
            assert!(parse_flag(Some(truthy)), "{truthy}");
        }
        for falsy in ["no", "0", "", "enabled"] {
            assert!(!parse_flag(Some(falsy)), "{falsy}");
        }
        assert!(!parse_flag(None));
    }

    #[test]
    fn always_update_flag_forces_reconfigure() {
        let mut cfg = configured();
        cfg.apply_env_flags(|name| (name == ALWAYS_UPDATE_ENV).then(|| "yes".to_owned()));
        assert!(cfg.provision.always_reconfigure);

        let mut cfg = configured();
        cfg.apply_env_flags(|_| None);
        assert!(!cfg.provision.always_reconfigure);
    }

    #[test]
    fn toml_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[controller]
url = "http://10.0.0.5:3080/v2"
project_id = "abc"
template_id = "tmpl"

[fleet]
last_device = 120
devices_per_switch = 40
"#,
        )
        .unwrap();

        let cfg: Config = figment(&path).extract().unwrap();
        assert_eq!(cfg.controller.project_id, "abc");
        assert_eq!(cfg.fleet.last_device, 120);
        assert_eq!(cfg.fleet.devices_per_row, 10);
        assert_eq!(cfg.provision.stagger_pool_size, 25);

        let devices = cfg.devices().unwrap();
        assert_eq!(devices.len(), 120);
        assert_eq!(devices[40].connected_switch(), "Switch2");
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg: Config = figment(&dir.path().join("absent.toml")).extract().unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn save_then_load_keeps_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let cfg = configured();
        save_config(&cfg, &path).unwrap();

        let loaded: Config = figment(&path).extract().unwrap();
        assert_eq!(loaded.controller.template_id, "c1d1eb22");
    }

    #[test]
    fn controller_config_requires_project() {
        let err = Config::default().controller_config().unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "controller.project_id"));

        let cc = configured().controller_config().unwrap();
        assert_eq!(cc.project_id, "1cd5351d");
        assert_eq!(cc.transport.max_connections, 15);
        assert_eq!(cc.retry.max_attempts, 5);
        assert!(cc.transport.basic_auth.is_none());
    }

    #[test]
    fn basic_auth_needs_username() {
        let mut cfg = configured();
        cfg.controller.password = Some("secret".into());
        assert!(cfg.controller_config().is_err());

        cfg.controller.username = Some("admin".into());
        let cc = cfg.controller_config().unwrap();
        assert_eq!(cc.transport.basic_auth.unwrap().username, "admin");
    }

    #[test]
    fn reversed_range_is_rejected() {
        let mut cfg = configured();
        cfg.fleet.first_device = 10;
        cfg.fleet.last_device = 9;
        assert!(cfg.devices().is_err());
    }

    #[test]
    fn zero_first_device_is_a_core_error() {
        let mut cfg = configured();
        cfg.fleet.first_device = 0;
        cfg.fleet.last_device = 3;
        assert!(matches!(
            cfg.devices().unwrap_err(),
            ConfigError::Core(CoreError::InvalidSequenceNumber { value: 0 })
        ));
    }

    #[test]
    fn lab_settings_parse_addresses() {
        let mut cfg = configured();
        let lab = cfg.lab_settings().unwrap();
        assert_eq!(lab.dns_servers, vec![Ipv4Addr::new(192, 168, 122, 1)]);

        cfg.lab.external_netmask = "255.255.255.999".into();
        assert!(cfg.lab_settings().is_err());
    }

    #[test]
    fn jitter_zero_disables_delay() {
        let mut cfg = configured();
        assert_eq!(cfg.post_delay(), PostDelay::UpTo(Duration::from_secs(30)));
        cfg.provision.max_jitter_secs = 0;
        assert_eq!(cfg.post_delay(), PostDelay::None);
    }
}
