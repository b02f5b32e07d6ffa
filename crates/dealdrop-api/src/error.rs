use thiserror::Error;

/// Top-level error type for the `dealdrop-api` crate.
///
/// Covers every failure mode across the three remote surfaces:
/// the marketplace backend, Paystack, and Resend. `dealdrop-core`
/// maps these into domain diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Backend rejected the bearer token (401).
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    /// Caller is authenticated but lacks the role for this call (403).
    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// An id that cannot stand as a single path segment.
    #[error("Invalid path segment: {segment:?}")]
    InvalidPathSegment { segment: String },

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// TLS setup or HTTP client construction failed.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Backend ─────────────────────────────────────────────────────
    /// Non-success response from the marketplace backend.
    ///
    /// The backend has no error-code taxonomy; `message` comes from the
    /// `message` field of the JSON body when present.
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// 404 from the backend.
    #[error("Not found: {path}")]
    NotFound { path: String },

    // ── Payment provider ────────────────────────────────────────────
    /// Paystack answered with `status: false` or a non-success HTTP code.
    #[error("Payment provider error: {message}")]
    Payment { message: String },

    // ── Email provider ──────────────────────────────────────────────
    /// Resend refused the message.
    #[error("Email provider error (HTTP {status}): {message}")]
    Email { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if the session token was rejected and signing in
    /// again might resolve it.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout { .. } => true,
            Self::Api { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. } | Self::Api { status: 404, .. } => true,
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            _ => false,
        }
    }

    /// HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } | Self::Email { status, .. } => Some(*status),
            Self::Unauthorized { .. } => Some(401),
            Self::Forbidden { .. } => Some(403),
            Self::NotFound { .. } => Some(404),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
