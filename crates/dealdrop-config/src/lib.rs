//! Shared configuration for the dealdrop CLI.
//!
//! TOML profiles, secret resolution (env + keyring + plaintext), and
//! translation to `dealdrop_core::MarketConfig`. The CLI adds
//! `GlobalOpts`-aware overrides on top.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use url::Url;

use dealdrop_core::{
    DEFAULT_CURRENCY, DEFAULT_PAGE_SIZE, EmailConfig, MarketConfig, PAYSTACK_API_URL,
    PaymentsConfig, RESEND_API_URL, TlsVerification,
};

/// Keyring service name under which secrets are stored.
pub const KEYRING_SERVICE: &str = "dealdrop";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named backend profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,

    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            insecure: false,
            timeout: default_timeout(),
            page_size: default_page_size(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

/// A named marketplace profile.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Backend API root (e.g., "https://api.example.com/api").
    pub api_url: String,

    /// Path to custom CA certificate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insecure: Option<bool>,

    /// Override timeout (seconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    /// Deals per page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<usize>,

    /// Client state file. Defaults to `<data dir>/<profile>-state.json`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_file: Option<PathBuf>,

    // ── Payments ──
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paystack_url: Option<String>,

    /// Paystack secret key (plaintext; prefer keyring or env var).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paystack_secret: Option<String>,

    /// Environment variable name containing the Paystack secret key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paystack_secret_env: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,

    // ── Email ──
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resend_url: Option<String>,

    /// Resend API key (plaintext; prefer keyring or env var).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resend_api_key: Option<String>,

    /// Environment variable name containing the Resend API key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resend_api_key_env: Option<String>,

    /// Sender for moderation emails, e.g. "Deals <noreply@example.com>".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_from: Option<String>,
}

impl Profile {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            ..Self::default()
        }
    }
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "dealdrop", "dealdrop")
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback(".config").join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Default client state file for a profile.
pub fn default_state_path(profile_name: &str) -> PathBuf {
    let file = format!("{profile_name}-state.json");
    project_dirs().map_or_else(
        || dirs_fallback(".local/share").join(&file),
        |dirs| dirs.data_dir().join(&file),
    )
}

fn dirs_fallback(base: &str) -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(base);
    p.push("dealdrop");
    p
}

// ── Loading & saving ────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file. `DEALDROP_` env vars override file values;
/// nested keys use a double underscore (`DEALDROP_DEFAULTS__TIMEOUT`).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("DEALDROP_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file is missing or unreadable.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Secrets ─────────────────────────────────────────────────────────

/// The provider credentials a profile can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretKind {
    PaystackSecret,
    ResendApiKey,
}

impl SecretKind {
    pub const ALL: [Self; 2] = [Self::PaystackSecret, Self::ResendApiKey];

    pub fn slug(self) -> &'static str {
        match self {
            Self::PaystackSecret => "paystack-secret",
            Self::ResendApiKey => "resend-api-key",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|k| k.slug() == raw || k.slug().replace('-', "_") == raw)
    }

    fn keyring_user(self, profile_name: &str) -> String {
        format!("{profile_name}/{}", self.slug())
    }

    fn env_name(self, profile: &Profile) -> Option<&str> {
        match self {
            Self::PaystackSecret => profile.paystack_secret_env.as_deref(),
            Self::ResendApiKey => profile.resend_api_key_env.as_deref(),
        }
    }

    fn plaintext(self, profile: &Profile) -> Option<&str> {
        match self {
            Self::PaystackSecret => profile.paystack_secret.as_deref(),
            Self::ResendApiKey => profile.resend_api_key.as_deref(),
        }
    }
}

/// Resolve a secret: env var named by the profile, then the system
/// keyring, then plaintext in the config. `None` when none is set.
pub fn resolve_secret(
    profile: &Profile,
    profile_name: &str,
    kind: SecretKind,
) -> Option<SecretString> {
    // 1. Profile's *_env → env var lookup
    if let Some(env_name) = kind.env_name(profile) {
        if let Ok(val) = std::env::var(env_name) {
            return Some(SecretString::from(val));
        }
        debug!(env_name, secret = kind.slug(), "env var not set");
    }

    // 2. System keyring
    if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, &kind.keyring_user(profile_name)) {
        if let Ok(secret) = entry.get_password() {
            return Some(SecretString::from(secret));
        }
    }

    // 3. Plaintext in config
    kind.plaintext(profile)
        .map(|s| SecretString::from(s.to_owned()))
}

/// Store a secret in the system keyring for a profile.
pub fn store_secret(profile_name: &str, kind: SecretKind, value: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation {
            field: kind.slug().into(),
            reason: "value cannot be empty".into(),
        });
    }
    let entry = keyring::Entry::new(KEYRING_SERVICE, &kind.keyring_user(profile_name))?;
    entry.set_password(value)?;
    Ok(())
}

// ── Profile → MarketConfig ──────────────────────────────────────────

fn parse_url(field: &str, raw: &str) -> Result<Url, ConfigError> {
    raw.parse().map_err(|_| ConfigError::Validation {
        field: field.into(),
        reason: format!("invalid URL: {raw}"),
    })
}

/// Build a `MarketConfig` from a profile and the global defaults, with
/// no command-line overrides.
///
/// Payments are enabled only when a Paystack secret resolves, and email
/// only when a Resend key resolves.
pub fn profile_to_market_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<MarketConfig, ConfigError> {
    let mut config = MarketConfig::new(parse_url("api_url", &profile.api_url)?);

    config.tls = if profile.insecure.unwrap_or(defaults.insecure) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    config.timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));
    config.page_size = profile
        .page_size
        .filter(|n| *n > 0)
        .unwrap_or(defaults.page_size);
    config.state_path = Some(
        profile
            .state_file
            .clone()
            .unwrap_or_else(|| default_state_path(profile_name)),
    );

    if let Some(secret_key) = resolve_secret(profile, profile_name, SecretKind::PaystackSecret) {
        config.payments = Some(PaymentsConfig {
            base_url: parse_url(
                "paystack_url",
                profile.paystack_url.as_deref().unwrap_or(PAYSTACK_API_URL),
            )?,
            secret_key,
            currency: profile
                .currency
                .clone()
                .unwrap_or_else(|| DEFAULT_CURRENCY.into()),
            callback_url: profile.callback_url.clone(),
        });
    }

    if let Some(api_key) = resolve_secret(profile, profile_name, SecretKind::ResendApiKey) {
        let from = profile
            .email_from
            .clone()
            .ok_or_else(|| ConfigError::Validation {
                field: "email_from".into(),
                reason: "required when a Resend API key is configured".into(),
            })?;
        config.email = Some(EmailConfig {
            base_url: parse_url(
                "resend_url",
                profile.resend_url.as_deref().unwrap_or(RESEND_API_URL),
            )?,
            api_key,
            from,
        });
    }

    Ok(config)
}
