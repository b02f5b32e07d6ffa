//! Command dispatch: bridges CLI args -> `Market` operations -> output.

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod comments;
pub mod config_cmd;
pub mod deals;
pub mod group;
pub mod moderate;
pub mod saved;
pub mod util;
pub mod vendor;

use dealdrop_core::Market;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a backend-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, market: &Market, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Deals(args) => deals::handle(market, args, global).await,
        Command::Saved(args) => saved::handle(market, args, global).await,
        Command::Cart(args) => cart::handle(market, args, global).await,
        Command::Checkout(args) => checkout::handle(market, args, global).await,
        Command::Vendor(args) => vendor::handle(market, args, global).await,
        Command::Group(args) => group::handle(market, args, global).await,
        Command::Comments(args) => comments::handle(market, args, global).await,
        Command::Moderate(args) => moderate::handle(market, args, global).await,
        Command::Login { email } => auth::login(market, &email, global).await,
        Command::Verify { token } => auth::verify(market, &token, global).await,
        Command::Logout => auth::logout(market, global),
        Command::Whoami => auth::whoami(market, global),
        Command::Config(_) | Command::Completions(_) => Err(CliError::Internal(
            "config and completions are handled before dispatch".into(),
        )),
    }
}
