use thiserror::Error;

/// Top-level error type for the `labfleet-api` crate.
///
/// Covers every failure mode of a project-scoped controller call:
/// transport, URL construction, non-2xx answers, and payload decoding.
/// `labfleet-core` maps these into `RemoteUnavailable` / `RemoteRejected`.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The connection limiter was shut down while a request was waiting.
    #[error("Connection limiter closed")]
    LimiterClosed,

    // ── Controller ──────────────────────────────────────────────────
    /// The controller answered with a non-2xx status. The body is kept
    /// verbatim for diagnostics.
    #[error("Controller rejected request (HTTP {status}): {body}")]
    Api { status: u16, body: String },

    /// The controller answered but the response body could not be read.
    /// A mutation may already have been applied.
    #[error("Failed to read response body (HTTP {status}): {source}")]
    Body { status: u16, source: reqwest::Error },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this error never reached a controller decision
    /// (connection refused, timeout, reset).
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::LimiterClosed)
    }

    /// Returns `true` if the call may be repeated.
    ///
    /// Transport failures are always eligible. A controller rejection is
    /// eligible only for idempotent reads, and only when the status hints at
    /// a transient condition (5xx, 408, 429). A body lost after the status
    /// line is retried for reads only.
    pub fn is_retryable(&self, idempotent: bool) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Body { .. } => idempotent,
            Self::Api { status, .. } => {
                idempotent && (*status >= 500 || *status == 408 || *status == 429)
            }
            _ => false,
        }
    }

    /// HTTP status of a controller rejection, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } | Self::Body { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
