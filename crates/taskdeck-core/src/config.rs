// ── Runtime client configuration ──
//
// Describes *where* the backend lives and how hard to push it.
// Never touches disk: the CLI builds a `ClientConfig` and hands it in.

use std::time::Duration;

use taskdeck_api::TransportConfig;
use url::Url;

use crate::error::CoreError;

pub const DEFAULT_SERVER: &str = "http://localhost:8000/";
pub const DEFAULT_MAX_CONCURRENT_ENRICHMENTS: usize = 5;

/// Configuration for talking to a single backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend base URL (e.g., `http://localhost:8000`).
    pub server: Url,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Upper bound on simultaneous enrichment calls across all parents.
    pub max_concurrent_enrichments: usize,
    /// Accept any TLS certificate.
    pub accept_invalid_certs: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server: Url::parse(DEFAULT_SERVER).expect("default server URL is valid"),
            timeout: Duration::from_secs(30),
            max_concurrent_enrichments: DEFAULT_MAX_CONCURRENT_ENRICHMENTS,
            accept_invalid_certs: false,
        }
    }
}

impl ClientConfig {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.max_concurrent_enrichments == 0 {
            return Err(CoreError::Config {
                message: "max_concurrent_enrichments must be at least 1".into(),
            });
        }
        if self.timeout.is_zero() {
            return Err(CoreError::Config {
                message: "timeout must be greater than zero".into(),
            });
        }
        if !matches!(self.server.scheme(), "http" | "https") {
            return Err(CoreError::Config {
                message: format!("unsupported server scheme: {}", self.server.scheme()),
            });
        }
        Ok(())
    }

    pub(crate) fn transport(&self) -> TransportConfig {
        TransportConfig {
            accept_invalid_certs: self.accept_invalid_certs,
            ..TransportConfig::default()
        }
        .with_timeout(self.timeout)
    }
}
