// ── Core error types ──
//
// User-facing errors from dealdrop-core. Consumers never see HTTP status
// codes or JSON parse failures directly: the `From<dealdrop_api::Error>`
// impl translates transport-layer errors into domain variants.

use std::path::PathBuf;

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Identity ─────────────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Not signed in")]
    NotSignedIn,

    #[error("Permission denied: {message}")]
    PermissionDenied { message: String },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: String,
        identifier: String,
    },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    // ── Client state ─────────────────────────────────────────────────
    #[error("Client state would be {attempted_bytes} bytes, over the {limit_bytes}-byte quota")]
    StorageQuota {
        limit_bytes: usize,
        attempted_bytes: usize,
    },

    #[error("Cannot access state file {path}: {source}")]
    StateIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("State file {path} is unreadable: {message}")]
    StateFormat { path: PathBuf, message: String },

    // ── Payments ─────────────────────────────────────────────────────
    #[error("Payment error: {message}")]
    Payment { message: String },

    /// A saga step failed transiently; the checkout can be resumed.
    #[error("Checkout {key} stopped at {stage}: {message}")]
    CheckoutIncomplete {
        key: String,
        stage: String,
        message: String,
    },

    /// The checkout reached a terminal failure and cannot be resumed.
    #[error("Checkout {key} failed: {reason}")]
    CheckoutFailed { key: String, reason: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("{feature} is not configured ({hint})")]
    NotConfigured { feature: String, hint: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Whether retrying the same call later could succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::ConnectionFailed { .. } | Self::Timeout { .. } => true,
            Self::Api {
                status: Some(status),
                ..
            } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    pub(crate) fn not_found(entity_type: &str, identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            identifier: identifier.into(),
        }
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            message: message.into(),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<dealdrop_api::Error> for CoreError {
    fn from(err: dealdrop_api::Error) -> Self {
        match err {
            dealdrop_api::Error::Unauthorized { message } => {
                CoreError::AuthenticationFailed { message }
            }
            dealdrop_api::Error::Forbidden { message } => CoreError::PermissionDenied { message },
            dealdrop_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map(|u| u.to_string())
                            .unwrap_or_else(|| "<unknown>".into()),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            dealdrop_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            dealdrop_api::Error::InvalidPathSegment { segment } => CoreError::ValidationFailed {
                message: format!("{segment:?} is not a valid id"),
            },
            dealdrop_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            dealdrop_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            dealdrop_api::Error::Api { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            dealdrop_api::Error::NotFound { path } => CoreError::NotFound {
                entity_type: "Resource".into(),
                identifier: path,
            },
            dealdrop_api::Error::Payment { message } => CoreError::Payment { message },
            dealdrop_api::Error::Email { status, message } => CoreError::Api {
                message: format!("email delivery failed: {message}"),
                status: Some(status),
            },
            dealdrop_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}
