//! Group deal handlers.

use chrono::Utc;

use dealdrop_core::{DealId, GroupDeal, Market};

use crate::cli::{GlobalOpts, GroupArgs, GroupCommand};
use crate::error::CliError;
use crate::output::{self, Tint};

use super::{checkout, util};

fn detail(g: &GroupDeal, global: &GlobalOpts) -> String {
    let now = Utc::now();
    let remaining = if g.is_full() {
        output::tint(global, "full", Tint::Bad)
    } else {
        output::tint(global, format!("{} open", g.remaining()), Tint::Good)
    };
    let mut lines = vec![
        format!("Deal:       {}", g.deal_id),
        format!("Slots:      {} of {} taken ({remaining})", g.reserved(), g.total_slots),
        format!(
            "Slot price: {}",
            g.slot_price.map_or_else(|| "deal price".into(), output::money)
        ),
    ];
    for slot in &g.slots {
        let when = slot
            .reserved_at
            .map(|at| util::relative(at, now))
            .unwrap_or_default();
        lines.push(format!("  - {} {when}", slot.user_id));
    }
    lines.join("\n")
}

pub async fn handle(market: &Market, args: GroupArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        GroupCommand::Show { deal } => {
            let group = market.group_deal(&DealId::new(deal)).await?;
            let out = output::render_single(&global.output, &group, |g| detail(g, global), |g| {
                g.remaining().to_string()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        GroupCommand::Join { deal } => {
            let purchase = market.slot_purchase(&DealId::new(deal)).await?;
            checkout::begin(market, purchase, global).await
        }
    }
}
