// ── Runtime configuration ──
//
// These types describe *which* controller project to drive and the lab-wide
// values templates need. They never touch disk: the CLI loads a config file,
// builds these and hands them in.

use std::net::Ipv4Addr;

use labfleet_api::{ProjectClient, RetryPolicy, TransportConfig};
use secrecy::SecretString;
use url::Url;

use crate::error::CoreError;

/// Connection settings for a single controller project.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// API root, e.g. `http://127.0.0.1:3080/v2`.
    pub url: Url,
    /// Project to operate on.
    pub project_id: String,
    /// Timeout, connection cap and basic auth.
    pub transport: TransportConfig,
    pub retry: RetryPolicy,
}

impl ControllerConfig {
    pub fn new(url: Url, project_id: impl Into<String>) -> Self {
        Self {
            url,
            project_id: project_id.into(),
            transport: TransportConfig::default(),
            retry: RetryPolicy::default(),
        }
    }

    /// Build the project-scoped HTTP client.
    pub fn client(&self) -> Result<ProjectClient, CoreError> {
        if self.project_id.trim().is_empty() {
            return Err(CoreError::Config {
                message: "controller project id is empty".into(),
            });
        }
        let client = ProjectClient::new(self.url.clone(), self.project_id.clone(), &self.transport)?
            .with_retry(self.retry);
        Ok(client)
    }
}

/// Lab-wide values exposed to configuration templates.
#[derive(Debug, Clone)]
pub struct LabSettings {
    pub domain_name: String,
    pub dns_servers: Vec<Ipv4Addr>,
    /// Network the DHCP server itself sits on.
    pub external_network: Ipv4Addr,
    pub external_netmask: Ipv4Addr,
    /// Login created on every router and used by inventories.
    pub username: String,
    pub password: SecretString,
}

impl Default for LabSettings {
    fn default() -> Self {
        Self {
            domain_name: "lab.local".into(),
            dns_servers: vec![Ipv4Addr::new(8, 8, 8, 8), Ipv4Addr::new(8, 8, 4, 4)],
            external_network: Ipv4Addr::new(192, 168, 122, 0),
            external_netmask: Ipv4Addr::new(255, 255, 255, 0),
            username: "cisco".into(),
            password: SecretString::from("cisco"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn empty_project_id_is_a_config_error() {
        let cfg = ControllerConfig::new(Url::parse("http://127.0.0.1:3080/v2").unwrap(), " ");
        let err = cfg.client().unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn client_is_scoped_to_project() {
        let cfg = ControllerConfig::new(Url::parse("http://127.0.0.1:3080/v2").unwrap(), "abc");
        let client = cfg.client().unwrap();
        assert_eq!(client.project_id(), "abc");
    }
}
