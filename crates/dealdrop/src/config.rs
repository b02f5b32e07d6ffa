//! CLI configuration, a thin wrapper around `dealdrop_config`.
//!
//! Re-exports the shared types and adds resolution that respects the
//! `GlobalOpts` overrides (--api-url, --insecure, --timeout).

use std::time::Duration;

use dealdrop_core::{MarketConfig, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use dealdrop_config::{
    Config, Defaults, Profile, SecretKind, config_path, default_state_path, load_config_or_default,
    profile_to_market_config, save_config, store_secret,
};

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

fn parse_api_url(raw: &str) -> Result<url::Url, CliError> {
    raw.parse().map_err(|_| CliError::Validation {
        field: "api_url".into(),
        reason: format!("invalid URL: {raw}"),
    })
}

/// Build a `MarketConfig` from the config file, the active profile, and
/// CLI overrides. Flags win over profile values.
pub fn build_market_config(global: &GlobalOpts) -> Result<MarketConfig, CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    let mut config = if let Some(profile) = cfg.profiles.get(&profile_name) {
        profile_to_market_config(profile, &profile_name, &cfg.defaults)?
    } else if let Some(raw) = global.api_url.as_deref() {
        // No profile: run against the URL alone, without payments or email.
        let mut config = MarketConfig::new(parse_api_url(raw)?);
        config.timeout = Duration::from_secs(cfg.defaults.timeout);
        config.page_size = cfg.defaults.page_size;
        config.state_path = Some(default_state_path(&profile_name));
        config
    } else if global.profile.is_some() {
        let mut available: Vec<&str> = cfg.profiles.keys().map(String::as_str).collect();
        available.sort_unstable();
        return Err(CliError::ProfileNotFound {
            name: profile_name,
            available: if available.is_empty() {
                "(none)".into()
            } else {
                available.join(", ")
            },
        });
    } else {
        return Err(CliError::NoConfig {
            path: config_path().display().to_string(),
        });
    };

    if let Some(raw) = global.api_url.as_deref() {
        config.api_url = parse_api_url(raw)?;
    }
    if global.insecure {
        config.tls = TlsVerification::DangerAcceptInvalid;
    }
    if let Some(secs) = global.timeout {
        config.timeout = Duration::from_secs(secs);
    }
    Ok(config)
}
