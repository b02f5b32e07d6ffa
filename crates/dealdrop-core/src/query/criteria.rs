// ── Filter criteria and the toolbar that produces them ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Category value meaning "no category filter".
pub const ALL_CATEGORIES: &str = "all";

/// The seven grid orderings.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
    EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum SortBy {
    #[default]
    Newest,
    Oldest,
    DiscountHigh,
    DiscountLow,
    PriceLow,
    PriceHigh,
    Popularity,
}

impl SortBy {
    /// Parse a raw sort key; unknown keys fall back to `Newest`.
    pub fn coerce(raw: &str) -> Self {
        raw.trim().parse().unwrap_or_default()
    }
}

/// Inclusive numeric range. A missing bound is unbounded on that side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Range {
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }

    /// Build a range from raw text bounds. Blank or non-numeric bounds
    /// are absent.
    pub fn coerce(min: Option<&str>, max: Option<&str>) -> Self {
        Self {
            min: min.and_then(coerce_number),
            max: max.and_then(coerce_number),
        }
    }

    pub fn is_active(&self) -> bool {
        self.min.is_some() || self.max.is_some()
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min.is_none_or(|min| value >= min) && self.max.is_none_or(|max| value <= max)
    }
}

fn coerce_number(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    raw.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Complete filter state for the deals grid. Transient; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub search: String,
    /// Exact category, or `None` for all categories.
    pub category: Option<String>,
    pub sort_by: SortBy,
    pub price_range: Range,
    pub discount_range: Range,
    pub show_saved_only: bool,
    pub hide_expired: bool,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            search: String::new(),
            category: None,
            sort_by: SortBy::Newest,
            price_range: Range::default(),
            discount_range: Range::default(),
            show_saved_only: false,
            hide_expired: false,
        }
    }
}

impl FilterCriteria {
    /// Restore every field to its default.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Search text with surrounding whitespace removed; `None` if blank.
    pub fn search_term(&self) -> Option<&str> {
        Some(self.search.trim()).filter(|s| !s.is_empty())
    }
}

/// Raw, string-typed toolbar input, as typed into a form or passed on the
/// command line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterInput {
    pub search: Option<String>,
    pub category: Option<String>,
    pub sort_by: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub min_discount: Option<String>,
    pub max_discount: Option<String>,
    pub saved_only: bool,
    pub hide_expired: bool,
}

impl From<&FilterInput> for FilterCriteria {
    fn from(input: &FilterInput) -> Self {
        let category = input
            .category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case(ALL_CATEGORIES))
            .map(str::to_owned);

        Self {
            search: input.search.clone().unwrap_or_default(),
            category,
            sort_by: input.sort_by.as_deref().map(SortBy::coerce).unwrap_or_default(),
            price_range: Range::coerce(input.min_price.as_deref(), input.max_price.as_deref()),
            discount_range: Range::coerce(
                input.min_discount.as_deref(),
                input.max_discount.as_deref(),
            ),
            show_saved_only: input.saved_only,
            hide_expired: input.hide_expired,
        }
    }
}

/// Holds the current criteria and reports the complete value to a
/// listener after every change.
pub struct FilterToolbar {
    criteria: FilterCriteria,
    on_change: Box<dyn FnMut(&FilterCriteria) + Send>,
}

impl FilterToolbar {
    pub fn new(on_change: impl FnMut(&FilterCriteria) + Send + 'static) -> Self {
        Self {
            criteria: FilterCriteria::default(),
            on_change: Box::new(on_change),
        }
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    /// Apply an edit and emit the resulting criteria.
    pub fn update(&mut self, edit: impl FnOnce(&mut FilterCriteria)) {
        edit(&mut self.criteria);
        (self.on_change)(&self.criteria);
    }

    /// Replace the criteria from raw input and emit it.
    pub fn apply_input(&mut self, input: &FilterInput) {
        self.update(|c| *c = FilterCriteria::from(input));
    }

    /// Reset to defaults and emit.
    pub fn clear(&mut self) {
        self.update(FilterCriteria::reset);
    }
}

impl std::fmt::Debug for FilterToolbar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterToolbar")
            .field("criteria", &self.criteria)
            .finish_non_exhaustive()
    }
}
