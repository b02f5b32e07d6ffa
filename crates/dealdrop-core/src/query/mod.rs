// ── Deals grid query pipeline ──
//
// Toolbar input → `FilterCriteria` → filter → stable sort → paginate.

mod criteria;
mod page;
mod pipeline;

pub use criteria::{ALL_CATEGORIES, FilterCriteria, FilterInput, FilterToolbar, Range, SortBy};
pub use page::{DEFAULT_PAGE_SIZE, Page, paginate};
pub use pipeline::{FilterContext, apply, compare, matches};

use std::borrow::Borrow;

use crate::model::Deal;

/// Run the whole grid pipeline and return one page.
pub fn browse<D>(
    deals: &[D],
    criteria: &FilterCriteria,
    ctx: &FilterContext<'_>,
    page: usize,
    per_page: usize,
) -> Page<D>
where
    D: Borrow<Deal> + Clone,
{
    paginate(apply(deals, criteria, ctx), page, per_page)
}
