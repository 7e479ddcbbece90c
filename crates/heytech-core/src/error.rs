// ── Core error types ──
//
// User-facing errors from heytech-core. Consumers never see raw socket
// errors; the `From<heytech_api::Error>` impl translates transport-layer
// failures. Frame decode problems never show up here at all.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    /// Socket-level failure. Retried internally before it surfaces.
    #[error("Cannot connect to device at {addr}: {reason}")]
    Connection { addr: String, reason: String },

    /// An open connection failed with a reset or broken pipe.
    #[error("Connection to device lost: {reason}")]
    ConnectionLost { reason: String },

    /// A socket failure that another attempt will not fix.
    #[error("Write to device failed: {reason}")]
    Transport { reason: String },

    /// The device could not be reached or did not deliver the expected
    /// data within the retry/wait budget.
    #[error("Error communicating with Heytech device: {message}")]
    Communication { message: String },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Validation failed: {message}")]
    Validation { message: String },

    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: String,
        identifier: String,
    },

    /// The engine was stopped; no further commands are accepted.
    #[error("Engine stopped")]
    Stopped,
}

impl CoreError {
    pub(crate) fn communication(message: impl Into<String>) -> Self {
        Self::Communication {
            message: message.into(),
        }
    }

    /// Returns `true` for errors a later attempt may not hit again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Connection { .. } | Self::ConnectionLost { .. } | Self::Communication { .. }
        )
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<heytech_api::Error> for CoreError {
    fn from(err: heytech_api::Error) -> Self {
        let transient = err.is_transient();
        match err {
            heytech_api::Error::Io(e) if transient => CoreError::ConnectionLost {
                reason: e.to_string(),
            },
            heytech_api::Error::Io(e) => CoreError::Transport {
                reason: e.to_string(),
            },
            e @ heytech_api::Error::LineTooLong { .. } => CoreError::Transport {
                reason: e.to_string(),
            },
            heytech_api::Error::ConnectTimeout { addr, timeout_ms } => CoreError::Connection {
                addr,
                reason: format!("connect timed out after {timeout_ms}ms"),
            },
            heytech_api::Error::NotConnected => {
                CoreError::communication("writer is not available")
            }
            heytech_api::Error::InvalidAction { action, reason } => CoreError::Validation {
                message: format!("invalid action '{action}': {reason}"),
            },
        }
    }
}
