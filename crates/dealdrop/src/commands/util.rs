//! Shared helpers for command handlers.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
///
/// Without a terminal the prompt cannot be answered, so `--yes` is
/// required.
pub fn confirm(message: &str, action: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::IsTerminal::is_terminal(&std::io::stdin()) {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Parse a checkout key as printed by `checkout start`.
pub fn parse_checkout_key(raw: &str) -> Result<Uuid, CliError> {
    raw.trim().parse().map_err(|_| CliError::Validation {
        field: "key".into(),
        reason: format!("'{raw}' is not a checkout key (expected a UUID)"),
    })
}

/// Relative age for table cells, e.g. "3h ago" or "in 2days".
pub fn relative(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let delta = now.signed_duration_since(at);
    let (secs, future) = match u64::try_from(delta.num_seconds()) {
        Ok(secs) => (secs, false),
        Err(_) => (delta.num_seconds().unsigned_abs(), true),
    };
    // Round to minutes so humantime prints a single unit pair.
    let rounded = std::time::Duration::from_secs(if secs >= 60 { secs - secs % 60 } else { secs });
    let text = humantime::format_duration(rounded).to_string();
    let text = text.split(' ').next().unwrap_or("0s").to_owned();
    if future {
        format!("in {text}")
    } else {
        format!("{text} ago")
    }
}

pub fn or_dash(value: Option<&str>) -> &str {
    value.filter(|v| !v.is_empty()).unwrap_or("-")
}
