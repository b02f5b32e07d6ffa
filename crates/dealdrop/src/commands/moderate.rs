//! Administrator moderation handlers.

use dealdrop_core::{CommentId, DealId, Market, Moderated, VendorId};

use crate::cli::{GlobalOpts, ModerateArgs, ModerateCommand};
use crate::error::CliError;
use crate::output;

use super::util;

fn report<T>(global: &GlobalOpts, what: &str, moderated: &Moderated<T>) {
    let tail = if moderated.notified {
        "vendor notified by email"
    } else {
        "vendor not notified"
    };
    output::notice(global, format!("{what} ({tail})"));
}

pub async fn handle(
    market: &Market,
    args: ModerateArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        ModerateCommand::Approve { deal } => {
            let done = market.approve_deal(&DealId::new(deal)).await?;
            report(global, &format!("Approved deal {}", done.item.id), &done);
            Ok(())
        }

        ModerateCommand::Reject { deal, reason } => {
            if !util::confirm(
                &format!("Reject deal '{deal}'?"),
                "moderate reject",
                global.yes,
            )? {
                return Ok(());
            }
            let done = market.reject_deal(&DealId::new(deal), reason).await?;
            report(global, &format!("Rejected deal {}", done.item.id), &done);
            Ok(())
        }

        ModerateCommand::Suspend { vendor, reason } => {
            if !util::confirm(
                &format!("Suspend vendor '{vendor}'? Their deals stop selling."),
                "moderate suspend",
                global.yes,
            )? {
                return Ok(());
            }
            let done = market.suspend_vendor(&VendorId::new(vendor), reason).await?;
            report(
                global,
                &format!("Suspended {} ({})", done.item.business_name, done.item.id),
                &done,
            );
            Ok(())
        }

        ModerateCommand::Reinstate { vendor } => {
            let done = market.reinstate_vendor(&VendorId::new(vendor)).await?;
            report(
                global,
                &format!("Reinstated {} ({})", done.item.business_name, done.item.id),
                &done,
            );
            Ok(())
        }

        ModerateCommand::DeleteComment { comment } => {
            if !util::confirm(
                &format!("Delete comment '{comment}'? This is destructive."),
                "moderate delete-comment",
                global.yes,
            )? {
                return Ok(());
            }
            let id = CommentId::new(comment);
            market.delete_comment(&id).await?;
            output::notice(global, format!("Deleted comment {id}"));
            Ok(())
        }
    }
}
