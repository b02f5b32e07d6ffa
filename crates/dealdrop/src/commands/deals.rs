//! Deal browsing and engagement handlers.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tabled::Tabled;

use dealdrop_core::{
    Coupon, Deal, DealId, DealStatus, FilterCriteria, FilterInput, Market, Page, VoteDirection,
};

use crate::cli::{DealsArgs, DealsCommand, DealsListArgs, GlobalOpts, OutputFormat, VoteArg};
use crate::error::CliError;
use crate::output::{self, Tint};

use super::util;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
pub(crate) struct DealRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Was")]
    original: String,
    #[tabled(rename = "Off")]
    discount: String,
    #[tabled(rename = "Likes")]
    likes: usize,
    #[tabled(rename = "Expires")]
    expires: String,
}

impl From<&Arc<Deal>> for DealRow {
    fn from(d: &Arc<Deal>) -> Self {
        let now = Utc::now();
        Self {
            id: d.id.to_string(),
            title: d.title.clone(),
            category: util::or_dash(d.category.as_deref()).to_owned(),
            price: d.price().map(output::money).unwrap_or_default(),
            original: d.original_price.map(output::money).unwrap_or_default(),
            discount: d
                .effective_discount()
                .map(|p| format!("{p:.0}%"))
                .unwrap_or_default(),
            likes: d.like_count(),
            expires: d
                .expires_at
                .map(|at| util::relative(at, now))
                .unwrap_or_default(),
        }
    }
}

#[derive(Tabled)]
struct CouponRow {
    #[tabled(rename = "Code")]
    code: String,
    #[tabled(rename = "Deal")]
    deal: String,
    #[tabled(rename = "Off")]
    discount: String,
    #[tabled(rename = "Description")]
    description: String,
}

impl From<&Coupon> for CouponRow {
    fn from(c: &Coupon) -> Self {
        Self {
            code: c.code.clone(),
            deal: c.deal_id.as_ref().map(ToString::to_string).unwrap_or_default(),
            discount: c
                .discount_percentage
                .map(|p| format!("{p:.0}%"))
                .unwrap_or_default(),
            description: c.description.clone().unwrap_or_default(),
        }
    }
}

fn detail(d: &Arc<Deal>, global: &GlobalOpts) -> String {
    let now = Utc::now();
    let mut lines = vec![
        format!("ID:          {}", d.id),
        format!("Title:       {}", d.title),
        format!("Status:      {}", d.status),
        format!("Category:    {}", util::or_dash(d.category.as_deref())),
        format!("Brand:       {}", util::or_dash(d.brand.as_deref())),
        format!("Platform:    {}", util::or_dash(d.platform.as_deref())),
        format!(
            "Price:       {}",
            d.price().map_or_else(|| "-".into(), output::money)
        ),
        format!(
            "Was:         {}",
            d.original_price.map_or_else(|| "-".into(), output::money)
        ),
        format!(
            "Discount:    {}",
            d.effective_discount()
                .map_or_else(|| "-".into(), |p| format!("{p:.0}%"))
        ),
        format!("Likes:       {}", d.like_count()),
    ];
    if let Some(at) = d.expires_at {
        let when = util::relative(at, now);
        let shown = if d.is_expired(now) {
            output::tint(global, format!("expired {when}"), Tint::Bad)
        } else {
            output::tint(global, when, Tint::Good)
        };
        lines.push(format!("Expires:     {shown}"));
    }
    if let Some(vendor) = &d.vendor_id {
        lines.push(format!("Vendor:      {vendor}"));
    }
    if !d.description.is_empty() {
        lines.push(String::new());
        lines.push(d.description.clone());
    }
    lines.join("\n")
}

// ── Filter input ────────────────────────────────────────────────────

fn criteria(args: &DealsListArgs) -> FilterCriteria {
    let input = FilterInput {
        search: args.search.clone(),
        category: args.category.clone(),
        sort_by: Some(args.sort.clone()),
        min_price: args.min_price.clone(),
        max_price: args.max_price.clone(),
        min_discount: args.min_discount.clone(),
        max_discount: args.max_discount.clone(),
        saved_only: args.saved_only,
        hide_expired: args.hide_expired,
    };
    FilterCriteria::from(&input)
}

fn parse_status(raw: &str) -> Result<DealStatus, CliError> {
    raw.parse().map_err(|_| CliError::Validation {
        field: "status".into(),
        reason: format!("expected pending, active, rejected, or expired, got '{raw}'"),
    })
}

/// Page metadata plus items for structured output.
#[derive(Serialize)]
struct PageView<'a> {
    page: usize,
    per_page: usize,
    total_items: usize,
    total_pages: usize,
    items: &'a [Arc<Deal>],
}

impl<'a> From<&'a Page<Arc<Deal>>> for PageView<'a> {
    fn from(p: &'a Page<Arc<Deal>>) -> Self {
        Self {
            page: p.page,
            per_page: p.per_page,
            total_items: p.total_items,
            total_pages: p.total_pages,
            items: &p.items,
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(market: &Market, args: DealsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        DealsCommand::List(list) => {
            if let Some(raw) = list.status.as_deref() {
                market.refresh_deals(Some(parse_status(raw)?)).await?;
            }
            let page = market.browse(&criteria(&list), list.page).await?;
            let out = match global.output {
                OutputFormat::Json
                | OutputFormat::JsonCompact
                | OutputFormat::Yaml => output::render_single(
                    &global.output,
                    &PageView::from(&page),
                    |_| String::new(),
                    |_| String::new(),
                ),
                _ => output::render_list(&global.output, &page.items, |d| DealRow::from(d), |d| {
                    d.id.to_string()
                }),
            };
            output::print_output(&out, global.quiet);
            if matches!(global.output, OutputFormat::Table) {
                output::notice(
                    global,
                    format!(
                        "page {} of {} ({} deals)",
                        page.page,
                        page.total_pages.max(1),
                        page.total_items
                    ),
                );
            }
            Ok(())
        }

        DealsCommand::Get { deal } => {
            let deal = market.deal(&DealId::new(deal)).await?;
            let out = output::render_single(
                &global.output,
                &deal,
                |d| detail(d, global),
                |d| d.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DealsCommand::Save { deal } => {
            let id = DealId::new(deal);
            let state = market.toggle_save(&id)?;
            output::notice(global, format!("Deal {id} is now {state}"));
            Ok(())
        }

        DealsCommand::Like { deal } => {
            let id = DealId::new(deal);
            let outcome = market.toggle_like(&id).await?;
            let verb = if outcome.liked { "Liked" } else { "Unliked" };
            output::notice(global, format!("{verb} {id} ({} likes)", outcome.likes));
            Ok(())
        }

        DealsCommand::Vote { deal, direction } => {
            let id = DealId::new(deal);
            let direction = match direction {
                VoteArg::Up => VoteDirection::Up,
                VoteArg::Down => VoteDirection::Down,
            };
            let outcome = market.vote(&id, direction).await?;
            let out = output::render_single(
                &global.output,
                &outcome,
                |o| format!("Voted {} on {id}, score is now {}", o.direction, o.score),
                |o| o.score.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DealsCommand::Coupons { deal } => {
            let deal = deal.map(DealId::new);
            let coupons = market.coupons(deal.as_ref()).await?;
            let out = output::render_list(&global.output, &coupons, |c| CouponRow::from(c), |c| {
                c.code.clone()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dealdrop_core::SortBy;

    fn args() -> DealsListArgs {
        DealsListArgs {
            search: Some("  shoes ".into()),
            category: Some("All".into()),
            sort: "price-low".into(),
            min_price: Some("abc".into()),
            max_price: Some(" 50 ".into()),
            min_discount: None,
            max_discount: Some(String::new()),
            saved_only: true,
            hide_expired: false,
            page: 1,
            status: None,
        }
    }

    #[test]
    fn list_args_become_criteria() {
        let c = criteria(&args());
        assert_eq!(c.search_term(), Some("shoes"));
        assert_eq!(c.category, None);
        assert_eq!(c.sort_by, SortBy::PriceLow);
        assert_eq!(c.price_range.min, None);
        assert_eq!(c.price_range.max, Some(50.0));
        assert!(!c.discount_range.is_active());
        assert!(c.show_saved_only);
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert!(parse_status("archived").is_err());
        assert_eq!(parse_status("Pending").ok(), Some(DealStatus::Pending));
    }
}
