//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use labfleet_config::ConfigError;
use labfleet_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const PARTIAL_FAILURE: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const CONFIG: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the controller: {reason}")]
    #[diagnostic(
        code(labfleet::connection_failed),
        help(
            "Check that the controller is running and that controller.url points at its API root.\n\
             Try: labfleet --controller http://HOST:3080/v2 nodes"
        )
    )]
    ConnectionFailed { reason: String },

    #[error("Controller rejected the request (HTTP {status})")]
    #[diagnostic(code(labfleet::rejected), help("Response body: {body}"))]
    Rejected { status: u16, body: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(labfleet::not_found),
        help("Run: labfleet {list_command} to see what the project holds")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── Batches ──────────────────────────────────────────────────────
    #[error("{operation}: {failed} of {total} failed")]
    #[diagnostic(
        code(labfleet::partial_failure),
        help("Successful items were applied. Re-run to retry the failed ones (use -v for details).")
    )]
    PartialFailure {
        operation: String,
        failed: usize,
        total: usize,
    },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(labfleet::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Invalid configuration: {field}: {reason}")]
    #[diagnostic(
        code(labfleet::config),
        help(
            "Set it in {path}, with LABFLEET_* environment variables, or run: labfleet config init"
        )
    )]
    Config {
        field: String,
        reason: String,
        path: String,
    },

    #[error("Configuration could not be loaded: {message}")]
    #[diagnostic(code(labfleet::config_load))]
    ConfigLoad { message: String },

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(labfleet::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Internal ────────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    #[diagnostic(code(labfleet::internal))]
    Internal(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::PartialFailure { .. } => exit_code::PARTIAL_FAILURE,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            Self::Config { .. } | Self::ConfigLoad { .. } => exit_code::CONFIG,
            Self::Rejected { .. } | Self::Io(_) | Self::Internal(_) => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        if err.is_configuration() {
            return CliError::Config {
                field: "fleet".into(),
                reason: err.to_string(),
                path: labfleet_config::config_path().display().to_string(),
            };
        }
        match err {
            CoreError::RemoteUnavailable { reason } => CliError::ConnectionFailed { reason },

            CoreError::RemoteRejected { status, body } => CliError::Rejected { status, body },

            CoreError::SwitchNotFound { name } => CliError::NotFound {
                resource_type: "switch".into(),
                identifier: name,
                list_command: "nodes".into(),
            },

            CoreError::NodeNotFound { name } => CliError::NotFound {
                resource_type: "node".into(),
                identifier: name,
                list_command: "nodes".into(),
            },

            CoreError::Io { source, .. } => CliError::Io(source),

            other => CliError::Internal(other.to_string()),
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        let path = labfleet_config::config_path().display().to_string();
        match err {
            ConfigError::Validation { field, reason } => CliError::Config {
                field,
                reason,
                path,
            },
            ConfigError::Core(core) => core.into(),
            ConfigError::Io(e) => CliError::Io(e),
            other => CliError::ConfigLoad {
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_failures_exit_with_connection_code() {
        let err: CliError = CoreError::RemoteUnavailable {
            reason: "connection refused".into(),
        }
        .into();
        assert_eq!(err.exit_code(), exit_code::CONNECTION);
    }

    #[test]
    fn missing_switch_is_not_found() {
        let err: CliError = CoreError::SwitchNotFound {
            name: "Switch3".into(),
        }
        .into();
        assert_eq!(err.exit_code(), exit_code::NOT_FOUND);
        assert!(err.to_string().contains("Switch3"));
    }

    #[test]
    fn addressing_errors_are_configuration_errors() {
        let err: CliError = CoreError::InvalidSequenceNumber { value: 0 }.into();
        assert_eq!(err.exit_code(), exit_code::CONFIG);
    }

    #[test]
    fn config_validation_keeps_field() {
        let err: CliError = ConfigError::Validation {
            field: "controller.project_id".into(),
            reason: "not set".into(),
        }
        .into();
        assert_eq!(err.exit_code(), exit_code::CONFIG);
        assert!(err.to_string().contains("controller.project_id"));
    }
}
