use std::io;

use thiserror::Error;

/// Top-level error type for the `heytech-api` crate.
///
/// Covers the socket and encoding failure modes. Decode failures have their
/// own type ([`DecodeError`](crate::protocol::DecodeError)) because they are
/// never propagated past the line router.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// Socket-level failure (refused, reset, broken pipe, ...).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// TCP connect did not complete in time.
    #[error("Connection to {addr} timed out after {timeout_ms}ms")]
    ConnectTimeout { addr: String, timeout_ms: u64 },

    /// A write was attempted without a live socket.
    #[error("Not connected to device")]
    NotConnected,

    /// The device sent more than `limit` bytes without a line terminator.
    #[error("Received line exceeds {limit} bytes")]
    LineTooLong { limit: usize },

    // ── Encoding ────────────────────────────────────────────────────
    /// The action string cannot be turned into a device verb.
    #[error("Invalid action '{action}': {reason}")]
    InvalidAction { action: String, reason: String },
}

impl Error {
    /// Returns `true` if the error is a socket hiccup worth a
    /// disconnect-and-retry cycle.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Io(e) => matches!(
                e.kind(),
                io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
                    | io::ErrorKind::BrokenPipe
                    | io::ErrorKind::UnexpectedEof
                    | io::ErrorKind::TimedOut
                    | io::ErrorKind::NotConnected
            ),
            Self::ConnectTimeout { .. } | Self::NotConnected => true,
            Self::LineTooLong { .. } | Self::InvalidAction { .. } => false,
        }
    }
}
