//! Checkout handlers: start payment, resume the saga, inspect records.

use std::time::Duration;

use chrono::Utc;
use indicatif::{ProgressBar, ProgressStyle};
use tabled::Tabled;

use dealdrop_core::{Checkout, CheckoutStage, Market, Purchase};

use crate::cli::{CheckoutArgs, CheckoutCommand, GlobalOpts};
use crate::error::CliError;
use crate::output::{self, Tint};

use super::util;

const POLL_INTERVAL: Duration = Duration::from_secs(3);
const POLL_LIMIT: Duration = Duration::from_secs(600);

#[derive(Tabled)]
struct CheckoutRow {
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Purchase")]
    purchase: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Stage")]
    stage: String,
    #[tabled(rename = "Attempts")]
    attempts: u32,
    #[tabled(rename = "Updated")]
    updated: String,
}

impl From<&Checkout> for CheckoutRow {
    fn from(c: &Checkout) -> Self {
        Self {
            key: c.key.to_string(),
            purchase: c.purchase.describe(),
            amount: format!("{} {}", output::money(c.purchase.amount()), c.currency),
            stage: c.stage.name().to_owned(),
            attempts: c.attempts,
            updated: util::relative(c.updated_at, Utc::now()),
        }
    }
}

fn detail(c: &Checkout, global: &GlobalOpts) -> String {
    let stage = match &c.stage {
        CheckoutStage::Completed => output::tint(global, "completed", Tint::Good),
        CheckoutStage::Failed { at, reason } => {
            output::tint(global, format!("failed at {at}: {reason}"), Tint::Bad)
        }
        other => other.name().to_owned(),
    };
    let mut lines = vec![
        format!("Key:       {}", c.key),
        format!("Reference: {}", c.reference),
        format!("Purchase:  {}", c.purchase.describe()),
        format!(
            "Amount:    {} {} ({} minor units)",
            output::money(c.purchase.amount()),
            c.currency,
            c.amount_minor
        ),
        format!("Stage:     {stage}"),
        format!("Attempts:  {}", c.attempts),
        format!("Started:   {}", c.created_at.format("%Y-%m-%d %H:%M:%S UTC")),
    ];
    if let Some(url) = c.authorization_url() {
        lines.push(format!("Pay at:    {url}"));
    }
    if let Some(err) = &c.last_error {
        lines.push(format!(
            "Last error: {}",
            output::tint(global, err, Tint::Muted)
        ));
    }
    lines.join("\n")
}

fn print_checkout(c: &Checkout, global: &GlobalOpts) {
    let out = output::render_single(&global.output, c, |c| detail(c, global), |c| {
        c.key.to_string()
    });
    output::print_output(&out, global.quiet);
}

/// Start payment for `purchase` and print where to pay.
pub(crate) async fn begin(
    market: &Market,
    purchase: Purchase,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let checkout = market.start_checkout(purchase).await?;
    print_checkout(&checkout, global);
    output::notice(
        global,
        format!(
            "Complete payment in your browser, then run: dealdrop checkout resume {} --wait",
            checkout.key
        ),
    );
    Ok(())
}

/// Resume until the checkout leaves `Initialized` or the poll limit runs
/// out.
async fn wait_for_payment(
    market: &Market,
    key: &uuid::Uuid,
    global: &GlobalOpts,
) -> Result<Checkout, CliError> {
    let spinner = if global.quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template("{spinner} {msg} [{elapsed}]")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.enable_steady_tick(Duration::from_millis(120));
        pb
    };
    spinner.set_message("waiting for payment");

    let started = std::time::Instant::now();
    let result = loop {
        match market.resume_checkout(key).await {
            Ok(c) if matches!(c.stage, CheckoutStage::Initialized { .. }) => {
                if started.elapsed() >= POLL_LIMIT {
                    break Ok(c);
                }
                tokio::time::sleep(POLL_INTERVAL).await;
            }
            other => break other.map_err(CliError::from),
        }
    };
    spinner.finish_and_clear();
    result
}

pub async fn handle(
    market: &Market,
    args: CheckoutArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        CheckoutCommand::Start => {
            let purchase = market.cart_purchase()?;
            begin(market, purchase, global).await
        }

        CheckoutCommand::Resume { key, wait } => {
            let key = util::parse_checkout_key(&key)?;
            let checkout = if wait {
                wait_for_payment(market, &key, global).await?
            } else {
                market.resume_checkout(&key).await?
            };
            print_checkout(&checkout, global);
            if matches!(checkout.stage, CheckoutStage::Initialized { .. }) {
                output::notice(global, "Payment not confirmed yet; try again shortly");
            }
            Ok(())
        }

        CheckoutCommand::Status { key } => {
            let parsed = util::parse_checkout_key(&key)?;
            let checkout = market.checkout(&parsed).ok_or_else(|| CliError::NotFound {
                resource_type: "Checkout".into(),
                identifier: key,
                list_command: "checkout list".into(),
            })?;
            print_checkout(&checkout, global);
            Ok(())
        }

        CheckoutCommand::List => {
            let checkouts = market.checkouts();
            let out = output::render_list(
                &global.output,
                &checkouts,
                |c| CheckoutRow::from(c),
                |c| c.key.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        CheckoutCommand::Clear { key: Some(key) } => {
            let key = util::parse_checkout_key(&key)?;
            market.forget_checkout(&key)?;
            output::notice(global, format!("Forgot checkout {key}"));
            Ok(())
        }

        CheckoutCommand::Clear { key: None } => {
            let removed = market.clear_finished_checkouts()?;
            output::notice(global, format!("Cleared {removed} finished checkout(s)"));
            Ok(())
        }
    }
}
