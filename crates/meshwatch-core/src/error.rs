// ── Core error types ──
//
// User-facing errors from meshwatch-core. Consumers never see HTTP status
// codes or JSON parse failures directly: the `From<meshwatch_api::Error>`
// impl translates transport-layer errors into domain variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to controller at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Network not found: {identifier}")]
    NetworkNotFound { identifier: String },

    #[error("No network data available")]
    NoData,

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Storage errors ───────────────────────────────────────────────
    #[error("Event store error: {message}")]
    Store { message: String },

    #[error("Event store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Event store encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<meshwatch_api::Error> for CoreError {
    fn from(err: meshwatch_api::Error) -> Self {
        match err {
            meshwatch_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            meshwatch_api::Error::MissingToken { network_id } => CoreError::AuthenticationFailed {
                message: format!("no API token configured for network {network_id}"),
            },
            meshwatch_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            meshwatch_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            meshwatch_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            meshwatch_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            meshwatch_api::Error::Api { status, message } => {
                if status == 404 {
                    CoreError::NetworkNotFound {
                        identifier: message,
                    }
                } else {
                    CoreError::Api {
                        message,
                        status: Some(status),
                    }
                }
            }
            meshwatch_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Store {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_token_is_an_auth_failure() {
        let err = CoreError::from(meshwatch_api::Error::MissingToken {
            network_id: "net-1".into(),
        });
        assert!(matches!(err, CoreError::AuthenticationFailed { .. }));
        assert!(err.to_string().contains("net-1"));
    }

    #[test]
    fn api_status_is_preserved() {
        let err = CoreError::from(meshwatch_api::Error::Api {
            status: 503,
            message: "busy".into(),
        });
        assert!(matches!(err, CoreError::Api { status: Some(503), .. }));

        let err = CoreError::from(meshwatch_api::Error::Api {
            status: 404,
            message: "network.not_found".into(),
        });
        assert!(matches!(err, CoreError::NetworkNotFound { .. }));
    }
}
