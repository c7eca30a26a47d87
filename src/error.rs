//! Error types for astwire.

use thiserror::Error;

/// Main error type for all astwire operations.
#[derive(Debug, Error)]
pub enum AstwireError {
    /// I/O error during socket operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Protocol error (malformed header line, oversized body, etc.).
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Initial connection to the peer failed.
    ///
    /// The bridge cannot proceed without its one connection, so this is
    /// always fatal. Carries the target so the operator can see where
    /// the connect was aimed.
    #[error("failed to connect to peer at {host}:{port}")]
    Connect {
        /// Loopback host the connect targeted.
        host: std::net::IpAddr,
        /// Port supplied at process start.
        port: u16,
        /// Underlying socket error.
        #[source]
        source: std::io::Error,
    },

    /// Encoder recursion depth guard tripped.
    ///
    /// Indicates a cyclic or pathologically deep tree. Hard invariant:
    /// never converted into a wire-level error envelope.
    #[error("tree encoding exceeded maximum depth {max_depth}")]
    DepthExceeded {
        /// The configured bound that was reached.
        max_depth: usize,
    },
}

impl AstwireError {
    /// Whether this error must terminate the bridge rather than be
    /// reported to the peer as an `<errored>` envelope.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            AstwireError::DepthExceeded { .. } | AstwireError::Connect { .. }
        )
    }
}

/// Result type alias using AstwireError.
pub type Result<T> = std::result::Result<T, AstwireError>;

/// Render an error and its source chain as a multi-line trace.
///
/// Used by the dispatcher to fill the `error` field of an `<errored>`
/// envelope with something a human on the peer side can act on.
pub fn error_trace(err: &(dyn std::error::Error + 'static)) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        out.push_str("\ncaused by: ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}
