// ── Runtime market configuration ──
//
// These types describe how to reach the marketplace backend and its two
// providers. They carry credentials and tuning but never read config
// files: the CLI builds a `MarketConfig` and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use crate::query::DEFAULT_PAGE_SIZE;

pub use dealdrop_api::paystack::PAYSTACK_API_URL;
pub use dealdrop_api::resend::RESEND_API_URL;

/// Currency used when a profile does not name one.
pub const DEFAULT_CURRENCY: &str = "NGN";

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (local development backends).
    DangerAcceptInvalid,
}

impl From<&TlsVerification> for dealdrop_api::TlsMode {
    fn from(tls: &TlsVerification) -> Self {
        match tls {
            TlsVerification::SystemDefaults => Self::System,
            TlsVerification::CustomCa(path) => Self::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => Self::DangerAcceptInvalid,
        }
    }
}

/// Paystack settings. Checkout is unavailable without them.
#[derive(Debug, Clone)]
pub struct PaymentsConfig {
    pub base_url: Url,
    pub secret_key: SecretString,
    /// ISO currency code sent with each transaction, e.g. `NGN`.
    pub currency: String,
    /// Where Paystack sends the payer after authorization.
    pub callback_url: Option<String>,
}

/// Resend settings. Moderation emails are skipped without them.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub base_url: Url,
    pub api_key: SecretString,
    /// Sender address, e.g. `Deals <noreply@example.com>`.
    pub from: String,
}

/// Everything a `Market` needs to run.
#[derive(Debug, Clone)]
pub struct MarketConfig {
    /// Backend root, e.g. `https://api.example.com/api`.
    pub api_url: Url,
    pub tls: TlsVerification,
    pub timeout: Duration,
    /// Deals per grid page.
    pub page_size: usize,
    /// Client state file. `None` keeps state in memory only.
    pub state_path: Option<PathBuf>,
    pub payments: Option<PaymentsConfig>,
    pub email: Option<EmailConfig>,
}

impl MarketConfig {
    /// Config with defaults for everything but the backend URL.
    pub fn new(api_url: Url) -> Self {
        Self {
            api_url,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            page_size: DEFAULT_PAGE_SIZE,
            state_path: None,
            payments: None,
            email: None,
        }
    }

    pub(crate) fn transport(&self) -> dealdrop_api::TransportConfig {
        dealdrop_api::TransportConfig {
            tls: (&self.tls).into(),
            timeout: self.timeout,
        }
    }
}
