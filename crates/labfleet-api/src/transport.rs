// Shared transport configuration for building the controller HTTP client.
//
// Timeout, connection cap and optional basic-auth credentials live here so
// the project client only deals with URL construction and status handling.

use std::time::Duration;

use secrecy::SecretString;

/// Default cap on in-flight requests to a single controller.
///
/// The controller degrades badly when hundreds of node operations arrive at
/// once; 15 concurrent requests keeps it responsive while still allowing
/// bulk operations to fan out.
pub const DEFAULT_MAX_CONNECTIONS: usize = 15;

/// Username/password pair for controllers running with HTTP auth enabled.
#[derive(Debug, Clone)]
pub struct BasicAuth {
    pub username: String,
    pub password: SecretString,
}

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Per-request timeout.
    pub timeout: Duration,
    /// Maximum number of requests in flight at any time.
    pub max_connections: usize,
    /// Optional HTTP basic auth.
    pub basic_auth: Option<BasicAuth>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            basic_auth: None,
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    ///
    /// Idle keep-alive connections are capped at `max_connections` so the
    /// pool never holds more sockets than the limiter lets through.
    pub fn build_client(&self) -> Result<reqwest::Client, crate::error::Error> {
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .pool_max_idle_per_host(self.max_connections)
            .user_agent(concat!("labfleet/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(client)
    }

    /// Effective connection cap (never zero).
    pub fn connection_cap(&self) -> usize {
        self.max_connections.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_cap_matches_documented_constant() {
        let config = TransportConfig::default();
        assert_eq!(config.connection_cap(), DEFAULT_MAX_CONNECTIONS);
        assert!(config.basic_auth.is_none());
    }

    #[test]
    fn zero_cap_is_clamped() {
        let config = TransportConfig {
            max_connections: 0,
            ..TransportConfig::default()
        };
        assert_eq!(config.connection_cap(), 1);
    }
}
