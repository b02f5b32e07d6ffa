//! Vendor onboarding and plan handlers.

use tabled::Tabled;

use dealdrop_core::{Market, Vendor, VendorDraft, VendorId, VendorPlan};

use crate::cli::{DraftArgs, DraftCommand, GlobalOpts, VendorArgs, VendorCommand};
use crate::error::CliError;
use crate::output::{self, Tint};

use super::{checkout, util};

#[derive(Tabled)]
struct PlanRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Days")]
    days: String,
    #[tabled(rename = "Max deals")]
    max_deals: String,
    #[tabled(rename = "Features")]
    features: String,
}

impl From<&VendorPlan> for PlanRow {
    fn from(p: &VendorPlan) -> Self {
        Self {
            id: p.id.clone(),
            name: p.name.clone(),
            price: output::money(p.price),
            days: p.duration_days.map(|d| d.to_string()).unwrap_or_default(),
            max_deals: p.max_deals.map(|d| d.to_string()).unwrap_or_default(),
            features: p.features.join(", "),
        }
    }
}

fn vendor_detail(v: &Vendor) -> String {
    [
        format!("ID:          {}", v.id),
        format!("Business:    {}", v.business_name),
        format!("Email:       {}", v.email),
        format!("Phone:       {}", util::or_dash(v.phone.as_deref())),
        format!("Category:    {}", util::or_dash(v.category.as_deref())),
        format!("Status:      {}", v.status),
        format!("Plan:        {}", util::or_dash(v.plan_id.as_deref())),
    ]
    .join("\n")
}

fn draft_detail(d: &VendorDraft, global: &GlobalOpts) -> String {
    let mut lines = vec![
        format!("Step:        {}", d.step),
        format!("Business:    {}", util::or_dash(d.business_name.as_deref())),
        format!("Email:       {}", util::or_dash(d.email.as_deref())),
        format!("Phone:       {}", util::or_dash(d.phone.as_deref())),
        format!("Category:    {}", util::or_dash(d.category.as_deref())),
        format!("Description: {}", util::or_dash(d.description.as_deref())),
        format!("Plan:        {}", util::or_dash(d.plan_id.as_deref())),
        format!("Documents:   {}", d.uploads.len()),
    ];
    for upload in &d.uploads {
        lines.push(format!("  - {} ({})", upload.file_name, upload.content_type));
    }
    let missing = d.missing_fields();
    if !missing.is_empty() {
        lines.push(output::tint(
            global,
            format!("Missing:     {}", missing.join(", ")),
            Tint::Bad,
        ));
    }
    lines.join("\n")
}

fn print_draft(draft: &VendorDraft, global: &GlobalOpts) {
    let out = output::render_single(&global.output, draft, |d| draft_detail(d, global), |d| {
        d.step.to_string()
    });
    output::print_output(&out, global.quiet);
}

fn handle_draft(market: &Market, args: DraftArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        DraftCommand::Show => {
            match market.store().vendor_draft() {
                Some(draft) => print_draft(&draft, global),
                None => output::notice(global, "No vendor application in progress"),
            }
            Ok(())
        }

        DraftCommand::Set {
            business_name,
            email,
            phone,
            category,
            description,
        } => {
            let draft = market.store().update_draft(|d| {
                if business_name.is_some() {
                    d.business_name = business_name;
                }
                if email.is_some() {
                    d.email = email;
                }
                if phone.is_some() {
                    d.phone = phone;
                }
                if category.is_some() {
                    d.category = category;
                }
                if description.is_some() {
                    d.description = description;
                }
            })?;
            print_draft(&draft, global);
            Ok(())
        }

        DraftCommand::Next => {
            let draft = market.store().advance_draft()?;
            output::notice(global, format!("Now at step: {}", draft.step));
            Ok(())
        }

        DraftCommand::Clear => {
            if !util::confirm("Discard the vendor application?", "vendor draft clear", global.yes)?
            {
                return Ok(());
            }
            market.store().clear_draft()?;
            output::notice(global, "Vendor application discarded");
            Ok(())
        }
    }
}

pub async fn handle(market: &Market, args: VendorArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        VendorCommand::Plans => {
            let plans = market.vendor_plans().await?;
            let out = output::render_list(
                &global.output,
                &plans,
                |p| PlanRow::from(p),
                |p| p.id.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        VendorCommand::Get { vendor } => {
            let vendor = market.vendor(&VendorId::new(vendor)).await?;
            let out = output::render_single(&global.output, &vendor, vendor_detail, |v| {
                v.id.to_string()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        VendorCommand::Draft(args) => handle_draft(market, args, global),

        VendorCommand::Upload { path } => {
            let draft = market.stage_upload(&path)?;
            output::notice(
                global,
                format!(
                    "Staged {} ({} documents on the application)",
                    path.display(),
                    draft.uploads.len()
                ),
            );
            Ok(())
        }

        VendorCommand::Subscribe { plan } => {
            let purchase = market.subscription_purchase(&plan).await?;
            checkout::begin(market, purchase, global).await
        }
    }
}
