//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` variants into user-facing errors with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use heytech_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not connect to controller at {addr}: {reason}")]
    #[diagnostic(
        code(heytech::connection_failed),
        help(
            "Check that the controller is powered and reachable on the LAN.\n\
             Address: {addr}\n\
             Only one client can talk to the controller at a time."
        )
    )]
    ConnectionFailed { addr: String, reason: String },

    #[error("{message}")]
    #[diagnostic(
        code(heytech::connection_lost),
        help("The controller dropped the connection. Retry the command, or run with -vv.")
    )]
    ConnectionLost { message: String },

    #[error("Device did not answer: {message}")]
    #[diagnostic(
        code(heytech::no_answer),
        help("Increase the wait with --timeout, or retry with -vv to see the exchanged lines.")
    )]
    NoAnswer { message: String },

    // ── Resources ────────────────────────────────────────────────────

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(heytech::not_found),
        help("Run: heytech {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(heytech::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("No controller host configured")]
    #[diagnostic(
        code(heytech::no_host),
        help(
            "Pass --host, set HEYTECH_HOST, or add a profile with:\n\
             heytech config set host <address>\n\
             Config file: {path}"
        )
    )]
    NoHost { path: String },

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(heytech::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: heytech --profile {name} config set host <address>"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error(transparent)]
    #[diagnostic(code(heytech::config))]
    Config(Box<figment::Error>),

    #[error("Could not write configuration: {0}")]
    #[diagnostic(code(heytech::config_write))]
    ConfigWrite(#[from] toml::ser::Error),

    // ── Safety ───────────────────────────────────────────────────────

    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(heytech::confirmation_required),
        help("Re-run with --yes (-y) to confirm.")
    )]
    ConfirmationRequired { action: String },

    // ── Engine ───────────────────────────────────────────────────────

    #[error("The engine was stopped before the command completed")]
    #[diagnostic(code(heytech::stopped))]
    Stopped,

    // ── IO / Serialization ────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Could not render output: {0}")]
    #[diagnostic(code(heytech::render))]
    Render(String),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::ConnectionLost { .. } => exit_code::CONNECTION,
            Self::NoAnswer { .. } => exit_code::TIMEOUT,
            Self::NotFound { .. } | Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } | Self::NoHost { .. } | Self::ConfirmationRequired { .. } => {
                exit_code::USAGE
            }
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Connection { addr, reason } => CliError::ConnectionFailed { addr, reason },

            err @ (CoreError::ConnectionLost { .. } | CoreError::Transport { .. }) => {
                CliError::ConnectionLost {
                    message: err.to_string(),
                }
            }

            CoreError::Communication { message } => CliError::NoAnswer { message },

            CoreError::Validation { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },

            CoreError::NotFound {
                entity_type,
                identifier,
            } => CliError::NotFound {
                list_command: format!("{entity_type}s list"),
                resource_type: entity_type,
                identifier,
            },

            CoreError::Stopped => CliError::Stopped,
        }
    }
}
