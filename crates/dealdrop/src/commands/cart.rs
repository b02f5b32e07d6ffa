//! Cart handlers. The cart lives in the client store only; nothing here
//! talks to the backend except to price newly added deals.

use serde::Serialize;
use tabled::Tabled;

use dealdrop_core::{CartItem, DealId, Market};

use crate::cli::{CartArgs, CartCommand, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct CartRow {
    #[tabled(rename = "Deal")]
    deal: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Qty")]
    quantity: u32,
    #[tabled(rename = "Unit")]
    unit: String,
    #[tabled(rename = "Line")]
    line: String,
}

impl From<&CartItem> for CartRow {
    fn from(i: &CartItem) -> Self {
        Self {
            deal: i.deal_id.to_string(),
            title: i.title.clone(),
            quantity: i.quantity,
            unit: output::money(i.unit_price),
            line: output::money(i.line_total()),
        }
    }
}

#[derive(Serialize)]
struct CartView {
    items: Vec<CartItem>,
    total: f64,
}

fn show(market: &Market, global: &GlobalOpts) {
    let view = CartView {
        items: market.store().cart(),
        total: market.store().cart_total(),
    };
    let out = match global.output {
        OutputFormat::Table | OutputFormat::Plain => output::render_list(
            &global.output,
            &view.items,
            |i| CartRow::from(i),
            |i| format!("{} {}", i.deal_id, i.quantity),
        ),
        _ => output::render_single(&global.output, &view, |_| String::new(), |_| String::new()),
    };
    output::print_output(&out, global.quiet);
    if matches!(global.output, OutputFormat::Table) {
        if view.items.is_empty() {
            output::notice(global, "Cart is empty");
        } else {
            output::notice(global, format!("Total: {}", output::money(view.total)));
        }
    }
}

pub async fn handle(market: &Market, args: CartArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        CartCommand::List => {
            show(market, global);
            Ok(())
        }

        CartCommand::Add { deal, quantity } => {
            let item = market.add_to_cart(&DealId::new(deal), quantity).await?;
            output::notice(
                global,
                format!(
                    "{} x {} in cart ({} each)",
                    item.quantity,
                    item.title,
                    output::money(item.unit_price)
                ),
            );
            Ok(())
        }

        CartCommand::Set { deal, quantity } => {
            market.store().set_quantity(&DealId::new(deal), quantity)?;
            show(market, global);
            Ok(())
        }

        CartCommand::Remove { deal } => {
            let removed = market.store().remove_from_cart(&DealId::new(deal))?;
            output::notice(global, format!("Removed {} from cart", removed.title));
            Ok(())
        }

        CartCommand::Clear => {
            market.store().clear_cart()?;
            output::notice(global, "Cart cleared");
            Ok(())
        }
    }
}
