//! Config subcommand handlers.

use std::collections::HashMap;

use dialoguer::{Input, Password, Select};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Defaults, Profile, SecretKind};
use crate::error::CliError;
use crate::output;

const MASK: &str = "****";

const SETTABLE_KEYS: &str = "api_url, ca_cert, insecure, timeout, page_size, state_file, \
     paystack_url, paystack_secret_env, currency, callback_url, resend_url, \
     resend_api_key_env, email_from";

// ── Helpers ─────────────────────────────────────────────────────────

/// Copy of the config with plaintext secrets masked, for structured
/// output.
fn redacted(cfg: &Config) -> Config {
    let profiles = cfg
        .profiles
        .iter()
        .map(|(name, p)| {
            let mut p = p.clone();
            p.paystack_secret = p.paystack_secret.as_ref().map(|_| MASK.into());
            p.resend_api_key = p.resend_api_key.as_ref().map(|_| MASK.into());
            (name.clone(), p)
        })
        .collect();
    Config {
        default_profile: cfg.default_profile.clone(),
        defaults: Defaults {
            output: cfg.defaults.output.clone(),
            color: cfg.defaults.color.clone(),
            insecure: cfg.defaults.insecure,
            timeout: cfg.defaults.timeout,
            page_size: cfg.defaults.page_size,
        },
        profiles,
    }
}

/// Format config as TOML-like text, masking sensitive fields.
fn format_config_redacted(cfg: &Config) -> String {
    use std::fmt::Write;
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);
    let _ = writeln!(out, "insecure = {}", cfg.defaults.insecure);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);
    let _ = writeln!(out, "page_size = {}", cfg.defaults.page_size);

    let mut names: Vec<_> = cfg.profiles.keys().collect();
    names.sort();
    for name in names {
        let p = &cfg.profiles[name];
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(out, "api_url = \"{}\"", p.api_url);
        let strings = [
            ("paystack_url", p.paystack_url.as_deref()),
            ("paystack_secret_env", p.paystack_secret_env.as_deref()),
            ("currency", p.currency.as_deref()),
            ("callback_url", p.callback_url.as_deref()),
            ("resend_url", p.resend_url.as_deref()),
            ("resend_api_key_env", p.resend_api_key_env.as_deref()),
            ("email_from", p.email_from.as_deref()),
        ];
        for (key, value) in strings {
            if let Some(value) = value {
                let _ = writeln!(out, "{key} = \"{value}\"");
            }
        }
        if p.paystack_secret.is_some() {
            let _ = writeln!(out, "paystack_secret = \"{MASK}\"");
        }
        if p.resend_api_key.is_some() {
            let _ = writeln!(out, "resend_api_key = \"{MASK}\"");
        }
        if let Some(ref ca) = p.ca_cert {
            let _ = writeln!(out, "ca_cert = \"{}\"", ca.display());
        }
        if let Some(ref state) = p.state_file {
            let _ = writeln!(out, "state_file = \"{}\"", state.display());
        }
        if let Some(insecure) = p.insecure {
            let _ = writeln!(out, "insecure = {insecure}");
        }
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
        if let Some(page_size) = p.page_size {
            let _ = writeln!(out, "page_size = {page_size}");
        }
    }

    out
}

fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn profile_not_found(name: String, cfg: &Config) -> CliError {
    let mut available: Vec<_> = cfg.profiles.keys().cloned().collect();
    available.sort();
    CliError::ProfileNotFound {
        name,
        available: if available.is_empty() {
            "(none)".into()
        } else {
            available.join(", ")
        },
    }
}

fn parse_kind(raw: &str) -> Result<SecretKind, CliError> {
    SecretKind::parse(raw).ok_or_else(|| CliError::Validation {
        field: "kind".into(),
        reason: format!(
            "expected one of: {}",
            SecretKind::ALL.map(SecretKind::slug).join(", ")
        ),
    })
}

/// Ask for an optional secret and where to keep it.
///
/// Returns `Some(secret)` for plaintext storage, `None` when skipped or
/// stored in the keyring.
fn prompt_secret(
    profile_name: &str,
    kind: SecretKind,
    prompt: &str,
) -> Result<Option<String>, CliError> {
    let secret = Password::new()
        .with_prompt(format!("{prompt} (leave empty to skip)"))
        .allow_empty_password(true)
        .interact()
        .map_err(prompt_err)?;
    if secret.is_empty() {
        return Ok(None);
    }

    let choices = &[
        "Store in system keyring (recommended)",
        "Save to config file (plaintext)",
    ];
    let selection = Select::new()
        .with_prompt(format!("Where to store the {}?", kind.slug()))
        .items(choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    if selection == 0 {
        config::store_secret(profile_name, kind, &secret)?;
        eprintln!("   {} stored in system keyring", kind.slug());
        Ok(None)
    } else {
        Ok(Some(secret))
    }
}

fn set_key(profile: &mut Profile, key: &str, value: String) -> Result<(), CliError> {
    let number = |field: &str, value: &str| -> Result<u64, CliError> {
        value.parse().map_err(|_| CliError::Validation {
            field: field.into(),
            reason: "must be a whole number".into(),
        })
    };

    match key.replace('-', "_").as_str() {
        "api_url" => profile.api_url = value,
        "ca_cert" => profile.ca_cert = Some(value.into()),
        "insecure" => {
            profile.insecure = Some(value.parse().map_err(|_| CliError::Validation {
                field: "insecure".into(),
                reason: "must be 'true' or 'false'".into(),
            })?);
        }
        "timeout" => profile.timeout = Some(number("timeout", &value)?),
        "page_size" => {
            let size = usize::try_from(number("page_size", &value)?).unwrap_or(usize::MAX);
            profile.page_size = Some(size);
        }
        "state_file" => profile.state_file = Some(value.into()),
        "paystack_url" => profile.paystack_url = Some(value),
        "paystack_secret_env" => profile.paystack_secret_env = Some(value),
        "currency" => profile.currency = Some(value.to_ascii_uppercase()),
        "callback_url" => profile.callback_url = Some(value),
        "resend_url" => profile.resend_url = Some(value),
        "resend_api_key_env" => profile.resend_api_key_env = Some(value),
        "email_from" => profile.email_from = Some(value),
        other => {
            return Err(CliError::Validation {
                field: other.into(),
                reason: format!("unknown config key '{other}'. Valid keys: {SETTABLE_KEYS}"),
            });
        }
    }
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init => {
            let config_path = config::config_path();
            eprintln!("dealdrop configuration wizard");
            eprintln!("   Config path: {}\n", config_path.display());

            let profile_name: String = Input::new()
                .with_prompt("Profile name")
                .default("default".into())
                .interact_text()
                .map_err(prompt_err)?;

            let api_url: String = Input::new()
                .with_prompt("Backend API URL")
                .default("http://localhost:5000/api".into())
                .interact_text()
                .map_err(prompt_err)?;

            let mut profile = Profile::new(api_url);

            profile.paystack_secret =
                prompt_secret(&profile_name, SecretKind::PaystackSecret, "Paystack secret key")?;
            let currency: String = Input::new()
                .with_prompt("Currency")
                .default(dealdrop_core::DEFAULT_CURRENCY.into())
                .interact_text()
                .map_err(prompt_err)?;
            profile.currency = Some(currency.to_ascii_uppercase());

            profile.resend_api_key =
                prompt_secret(&profile_name, SecretKind::ResendApiKey, "Resend API key")?;
            let email_from: String = Input::new()
                .with_prompt("Sender address for notices (leave empty to skip)")
                .allow_empty(true)
                .interact_text()
                .map_err(prompt_err)?;
            profile.email_from = Some(email_from).filter(|s| !s.trim().is_empty());

            let mut cfg = config::load_config_or_default();
            if cfg.profiles.is_empty() {
                cfg = Config {
                    default_profile: Some(profile_name.clone()),
                    defaults: Defaults::default(),
                    profiles: HashMap::new(),
                };
            }
            cfg.profiles.insert(profile_name.clone(), profile);
            config::save_config(&cfg)?;

            eprintln!("\nConfiguration written to {}", config_path.display());
            eprintln!("  Profile: {profile_name}");
            eprintln!("\n  Try it: dealdrop deals list");
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = config::load_config_or_default();
            let shown = redacted(&cfg);
            let out = output::render_single(&global.output, &shown, format_config_redacted, |_| {
                "config".into()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Set { key, value } => {
            let mut cfg = config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);
            let profile = cfg.profiles.entry(profile_name.clone()).or_default();
            set_key(profile, &key, value)?;
            config::save_config(&cfg)?;
            output::notice(global, format!("Set {key} on profile '{profile_name}'"));
            Ok(())
        }

        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            let default = cfg.default_profile.as_deref().unwrap_or("default");
            if cfg.profiles.is_empty() {
                output::notice(global, "No profiles configured. Run: dealdrop config init");
            } else {
                let mut names: Vec<_> = cfg.profiles.keys().collect();
                names.sort();
                let lines: Vec<String> = names
                    .into_iter()
                    .map(|name| {
                        let marker = if name == default { " *" } else { "" };
                        format!("{name}{marker}")
                    })
                    .collect();
                output::print_output(&lines.join("\n"), global.quiet);
            }
            Ok(())
        }

        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default();
            if !cfg.profiles.contains_key(&name) {
                return Err(profile_not_found(name, &cfg));
            }
            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            output::notice(global, format!("Default profile set to '{name}'"));
            Ok(())
        }

        ConfigCommand::SetSecret { kind } => {
            let kind = parse_kind(&kind)?;
            let cfg = config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);
            if !cfg.profiles.contains_key(&profile_name) {
                return Err(profile_not_found(profile_name, &cfg));
            }

            let secret = Password::new()
                .with_prompt(kind.slug())
                .interact()
                .map_err(prompt_err)?;
            config::store_secret(&profile_name, kind, &secret)?;
            output::notice(
                global,
                format!(
                    "{} stored in system keyring for profile '{profile_name}'",
                    kind.slug()
                ),
            );
            Ok(())
        }
    }
}
