//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use dealdrop_config::ConfigError;
use dealdrop_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach {url}")]
    #[diagnostic(
        code(dealdrop::connection_failed),
        help(
            "Check that the backend is running and the api_url is right.\n\
             Reason: {reason}"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(dealdrop::timeout),
        help("Increase the timeout with --timeout or check backend responsiveness.")
    )]
    Timeout { seconds: u64 },

    // ── Identity ─────────────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(dealdrop::auth_failed),
        help("Your session may have expired. Run: dealdrop login <email>")
    )]
    AuthFailed { message: String },

    #[error("You are not signed in")]
    #[diagnostic(
        code(dealdrop::not_signed_in),
        help("Run: dealdrop login <email>, then dealdrop verify <token>")
    )]
    NotSignedIn,

    #[error("Permission denied: {message}")]
    #[diagnostic(code(dealdrop::permission_denied))]
    PermissionDenied { message: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(dealdrop::not_found),
        help("Run: dealdrop {list_command}")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── Backend & providers ──────────────────────────────────────────
    #[error("API error: {message}")]
    #[diagnostic(code(dealdrop::api_error))]
    ApiError { status: Option<u16>, message: String },

    #[error("Payment error: {message}")]
    #[diagnostic(code(dealdrop::payment))]
    Payment { message: String },

    #[error("Checkout {key} stopped at {stage}: {message}")]
    #[diagnostic(
        code(dealdrop::checkout_incomplete),
        help("Nothing was lost. Continue with: dealdrop checkout resume {key}")
    )]
    CheckoutIncomplete {
        key: String,
        stage: String,
        message: String,
    },

    #[error("Checkout {key} failed: {reason}")]
    #[diagnostic(code(dealdrop::checkout_failed))]
    CheckoutFailed { key: String, reason: String },

    // ── Local state ──────────────────────────────────────────────────
    #[error("Client state is full ({attempted_bytes} of {limit_bytes} bytes)")]
    #[diagnostic(
        code(dealdrop::storage_quota),
        help("Remove staged uploads with: dealdrop vendor draft clear")
    )]
    StorageQuota {
        limit_bytes: usize,
        attempted_bytes: usize,
    },

    #[error("Client state error: {message}")]
    #[diagnostic(code(dealdrop::state))]
    State { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(dealdrop::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("{feature} is not configured")]
    #[diagnostic(code(dealdrop::not_configured), help("{hint}"))]
    NotConfigured { feature: String, hint: String },

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(dealdrop::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: dealdrop config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No backend configured")]
    #[diagnostic(
        code(dealdrop::no_config),
        help(
            "Create a profile with: dealdrop config init\n\
             or pass --api-url. Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(dealdrop::config))]
    Config(ConfigError),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("'{action}' requires confirmation")]
    #[diagnostic(
        code(dealdrop::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    #[error("{0}")]
    #[diagnostic(code(dealdrop::internal))]
    Internal(String),

    // ── IO ───────────────────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::AuthFailed { .. } | Self::NotSignedIn => exit_code::AUTH,
            Self::PermissionDenied { .. } => exit_code::PERMISSION,
            Self::NotFound { .. } | Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::CheckoutIncomplete { .. } | Self::ApiError { status: Some(409), .. } => {
                exit_code::CONFLICT
            }
            Self::Validation { .. }
            | Self::StorageQuota { .. }
            | Self::NotConfigured { .. }
            | Self::NoConfig { .. }
            | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

fn list_command_for(entity_type: &str) -> String {
    match entity_type {
        "Deal" | "Group deal" => "deals list".into(),
        "Vendor" => "moderate --help".into(),
        "Vendor plan" => "vendor plans".into(),
        "Comment" => "comments show <deal>".into(),
        "Checkout" => "checkout list".into(),
        "Cart item" => "cart list".into(),
        _ => "--help".into(),
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => Self::ConnectionFailed { url, reason },
            CoreError::Timeout { timeout_secs } => Self::Timeout {
                seconds: timeout_secs,
            },
            CoreError::AuthenticationFailed { message } => Self::AuthFailed { message },
            CoreError::NotSignedIn => Self::NotSignedIn,
            CoreError::PermissionDenied { message } => Self::PermissionDenied { message },
            CoreError::NotFound {
                entity_type,
                identifier,
            } => Self::NotFound {
                list_command: list_command_for(&entity_type),
                resource_type: entity_type,
                identifier,
            },
            CoreError::ValidationFailed { message } => Self::Validation {
                field: "input".into(),
                reason: message,
            },
            CoreError::StorageQuota {
                limit_bytes,
                attempted_bytes,
            } => Self::StorageQuota {
                limit_bytes,
                attempted_bytes,
            },
            err @ (CoreError::StateIo { .. } | CoreError::StateFormat { .. }) => Self::State {
                message: err.to_string(),
            },
            CoreError::Payment { message } => Self::Payment { message },
            CoreError::CheckoutIncomplete {
                key,
                stage,
                message,
            } => Self::CheckoutIncomplete {
                key,
                stage,
                message,
            },
            CoreError::CheckoutFailed { key, reason } => Self::CheckoutFailed { key, reason },
            CoreError::NotConfigured { feature, hint } => Self::NotConfigured { feature, hint },
            CoreError::Config { message } => Self::Validation {
                field: "config".into(),
                reason: message,
            },
            CoreError::Api { message, status } => Self::ApiError { status, message },
            CoreError::Internal(message) => Self::Internal(message),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            other => Self::Config(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_map_to_exit_codes() {
        let cases = [
            (CoreError::NotSignedIn, exit_code::AUTH),
            (
                CoreError::PermissionDenied {
                    message: "nope".into(),
                },
                exit_code::PERMISSION,
            ),
            (
                CoreError::NotFound {
                    entity_type: "Deal".into(),
                    identifier: "d1".into(),
                },
                exit_code::NOT_FOUND,
            ),
            (
                CoreError::CheckoutIncomplete {
                    key: "k".into(),
                    stage: "payment-verified".into(),
                    message: "busy".into(),
                },
                exit_code::CONFLICT,
            ),
            (
                CoreError::ConnectionFailed {
                    url: "http://x".into(),
                    reason: "refused".into(),
                },
                exit_code::CONNECTION,
            ),
            (CoreError::Timeout { timeout_secs: 5 }, exit_code::TIMEOUT),
            (
                CoreError::ValidationFailed {
                    message: "bad".into(),
                },
                exit_code::USAGE,
            ),
        ];
        for (core, code) in cases {
            assert_eq!(CliError::from(core).exit_code(), code);
        }
    }

    #[test]
    fn not_found_suggests_list_command() {
        let err = CliError::from(CoreError::NotFound {
            entity_type: "Deal".into(),
            identifier: "d9".into(),
        });
        match err {
            CliError::NotFound { list_command, .. } => assert_eq!(list_command, "deals list"),
            other => panic!("unexpected {other:?}"),
        }
    }
}
