// ── Core error types ──
//
// Domain errors from labfleet-core. Callers never see reqwest errors or
// JSON parse failures directly: the `From<labfleet_api::Error>` impl folds
// transport failures into `RemoteUnavailable` and non-2xx answers into
// `RemoteRejected`.

use std::path::PathBuf;

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Remote controller ────────────────────────────────────────────
    #[error("Controller unreachable: {reason}")]
    RemoteUnavailable { reason: String },

    #[error("Controller rejected request (HTTP {status}): {body}")]
    RemoteRejected { status: u16, body: String },

    #[error("Controller returned unexpected data: {message}")]
    Decode { message: String },

    // ── Topology ─────────────────────────────────────────────────────
    #[error("Switch '{name}' not found in project")]
    SwitchNotFound { name: String },

    #[error("Node '{name}' not found in project")]
    NodeNotFound { name: String },

    #[error("Node {id} was renamed to '{actual}', expected '{expected}'")]
    RenameMismatch {
        id: String,
        expected: String,
        actual: String,
    },

    // ── Addressing / configuration ───────────────────────────────────
    #[error("Invalid device sequence number {value} (must be >= 1)")]
    InvalidSequenceNumber { value: u32 },

    #[error("Device {sequence_number} cannot be addressed: {reason}")]
    AddressOverflow { sequence_number: u32, reason: String },

    #[error("Invalid layout setting {field}: {reason}")]
    InvalidLayout { field: &'static str, reason: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Rendering / output ───────────────────────────────────────────
    #[error("Failed to render template '{template}': {message}")]
    Render { template: String, message: String },

    #[error("Failed to serialize {what}: {message}")]
    Serialization { what: String, message: String },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Response body of a controller rejection, for diagnostics.
    pub fn response_body(&self) -> Option<&str> {
        match self {
            Self::RemoteRejected { body, .. } => Some(body),
            _ => None,
        }
    }

    /// `true` for errors that describe a broken configuration rather than
    /// a transient or per-device condition.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::InvalidSequenceNumber { .. }
                | Self::AddressOverflow { .. }
                | Self::InvalidLayout { .. }
                | Self::Config { .. }
        )
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<labfleet_api::Error> for CoreError {
    fn from(err: labfleet_api::Error) -> Self {
        match err {
            labfleet_api::Error::Transport(e) => CoreError::RemoteUnavailable {
                reason: match e.url() {
                    Some(url) => format!("{url}: {e}"),
                    None => e.to_string(),
                },
            },
            labfleet_api::Error::LimiterClosed => CoreError::RemoteUnavailable {
                reason: "connection limiter closed".into(),
            },
            labfleet_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid controller URL: {e}"),
            },
            labfleet_api::Error::Api { status, body } => CoreError::RemoteRejected { status, body },
            labfleet_api::Error::Body { status, source } => CoreError::RemoteUnavailable {
                reason: format!("response body of HTTP {status} could not be read: {source}"),
            },
            labfleet_api::Error::Deserialization { message, body: _ } => CoreError::Decode { message },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_rejection_keeps_status_and_body() {
        let err: CoreError = labfleet_api::Error::Api {
            status: 409,
            body: "duplicate".into(),
        }
        .into();
        assert!(matches!(err, CoreError::RemoteRejected { status: 409, .. }));
        assert_eq!(err.response_body(), Some("duplicate"));
    }

    #[test]
    fn addressing_errors_are_configuration_errors() {
        assert!(CoreError::InvalidSequenceNumber { value: 0 }.is_configuration());
        assert!(!CoreError::SwitchNotFound { name: "Switch1".into() }.is_configuration());
    }
}
