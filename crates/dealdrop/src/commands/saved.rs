//! Saved deal handlers.

use dealdrop_core::Market;

use crate::cli::{GlobalOpts, SavedArgs, SavedCommand};
use crate::error::CliError;
use crate::output;

use super::deals::DealRow;

pub async fn handle(market: &Market, args: SavedArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        SavedCommand::List => {
            let deals = market.saved_deals().await?;
            let out = output::render_list(
                &global.output,
                &deals,
                |d| DealRow::from(d),
                |d| d.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
