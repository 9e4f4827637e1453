// ── Core error types ──
//
// Domain errors from taskdeck-core. The `From<taskdeck_api::Error>` impl
// folds transport-layer failures into the three network-facing variants;
// everything above the backend seam propagates them unchanged.

use thiserror::Error;

/// Unified error type for the core crate.
///
/// `Clone` so a failure can be stored in published state (e.g. a failed
/// enrichment batch) and handed to every subscriber.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    // ── Network errors ───────────────────────────────────────────────
    /// No response: connection refused, DNS failure, timeout.
    #[error("Network error: {reason}")]
    Network { reason: String },

    #[error("Request timed out: {reason}")]
    Timeout { reason: String },

    /// Non-2xx response.
    #[error("Server error (HTTP {status}): {message}")]
    Server { status: u16, message: String },

    /// A 2xx response whose body could not be decoded.
    #[error("Malformed response: {message}")]
    Parse { message: String },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Enrichment already in progress for {parent}")]
    EnrichmentInProgress { parent: String },

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    // ── Local errors ─────────────────────────────────────────────────
    #[error("Could not read document: {message}")]
    Io { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// HTTP status for server errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns `true` if the error came from the remote exchange
    /// (as opposed to a local guard or validation).
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Self::Network { .. }
                | Self::Timeout { .. }
                | Self::Server { .. }
                | Self::Parse { .. }
        )
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<taskdeck_api::Error> for CoreError {
    fn from(err: taskdeck_api::Error) -> Self {
        match err {
            taskdeck_api::Error::Transport(e) if e.is_timeout() => CoreError::Timeout {
                reason: e.to_string(),
            },
            taskdeck_api::Error::Transport(e) => match e.status() {
                Some(status) => CoreError::Server {
                    status: status.as_u16(),
                    message: e.to_string(),
                },
                None => CoreError::Network {
                    reason: e.to_string(),
                },
            },
            taskdeck_api::Error::Server { status, message } => {
                CoreError::Server { status, message }
            }
            taskdeck_api::Error::Deserialization { message, body: _ } => {
                CoreError::Parse { message }
            }
            taskdeck_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            taskdeck_api::Error::Client(message) => CoreError::Config { message },
            taskdeck_api::Error::Io(e) => CoreError::Io {
                message: e.to_string(),
            },
        }
    }
}
