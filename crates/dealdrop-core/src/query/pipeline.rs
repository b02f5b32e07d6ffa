// ── Filter and sort predicates for the deals grid ──
//
// Pure functions over a deal slice. Nothing here touches the network or
// the client store directly: saved-state comes in through `FilterContext`.

use std::borrow::Borrow;
use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use indexmap::IndexSet;

use super::criteria::{FilterCriteria, SortBy};
use crate::model::{Deal, DealId};

/// Outside state the predicates consult.
#[derive(Debug, Clone, Copy)]
pub struct FilterContext<'a> {
    /// The client store's saved set. `None` means nothing is saved.
    pub saved: Option<&'a IndexSet<DealId>>,
    /// Reference time for the expiry predicate.
    pub now: DateTime<Utc>,
}

impl<'a> FilterContext<'a> {
    pub fn new(saved: Option<&'a IndexSet<DealId>>, now: DateTime<Utc>) -> Self {
        Self { saved, now }
    }

    fn is_saved(&self, id: &DealId) -> bool {
        self.saved.is_some_and(|s| s.contains(id))
    }
}

/// Whether a single deal satisfies every active predicate.
pub fn matches(deal: &Deal, criteria: &FilterCriteria, ctx: &FilterContext<'_>) -> bool {
    if let Some(term) = criteria.search_term() {
        if !matches_search(deal, term) {
            return false;
        }
    }

    if criteria.discount_range.is_active() {
        match deal.computed_discount() {
            Some(discount) if criteria.discount_range.contains(discount) => {}
            _ => return false,
        }
    }

    if let Some(category) = &criteria.category {
        if deal.category.as_deref() != Some(category.as_str()) {
            return false;
        }
    }

    if criteria.price_range.is_active() {
        match deal.discounted_price {
            Some(price) if criteria.price_range.contains(price) => {}
            _ => return false,
        }
    }

    if criteria.show_saved_only && !ctx.is_saved(&deal.id) {
        return false;
    }

    if criteria.hide_expired && deal.is_expired(ctx.now) {
        return false;
    }

    true
}

fn matches_search(deal: &Deal, term: &str) -> bool {
    let needle = term.to_lowercase();
    let hit = |field: &str| field.to_lowercase().contains(&needle);

    hit(&deal.title)
        || hit(&deal.description)
        || deal.brand.as_deref().is_some_and(hit)
        || deal.platform.as_deref().is_some_and(hit)
}

/// Filter then sort. The sort is stable, so ties keep their input order.
pub fn apply<D>(deals: &[D], criteria: &FilterCriteria, ctx: &FilterContext<'_>) -> Vec<D>
where
    D: Borrow<Deal> + Clone,
{
    let mut out: Vec<D> = deals
        .iter()
        .filter(|d| matches(<D as Borrow<Deal>>::borrow(d), criteria, ctx))
        .cloned()
        .collect();
    out.sort_by(|a, b| {
        compare(
            <D as Borrow<Deal>>::borrow(a),
            <D as Borrow<Deal>>::borrow(b),
            criteria.sort_by,
        )
    });
    out
}

/// Ordering for one sort key. Deals missing the key go last in either
/// direction.
pub fn compare(a: &Deal, b: &Deal, sort_by: SortBy) -> Ordering {
    match sort_by {
        SortBy::Newest => missing_last(a.created_at, b.created_at, |x, y| y.cmp(x)),
        SortBy::Oldest => missing_last(a.created_at, b.created_at, |x, y| x.cmp(y)),
        SortBy::DiscountHigh => missing_last(a.effective_discount(), b.effective_discount(), |x, y| {
            y.total_cmp(x)
        }),
        SortBy::DiscountLow => missing_last(a.effective_discount(), b.effective_discount(), |x, y| {
            x.total_cmp(y)
        }),
        SortBy::PriceLow => {
            missing_last(a.discounted_price, b.discounted_price, |x, y| x.total_cmp(y))
        }
        SortBy::PriceHigh => {
            missing_last(a.discounted_price, b.discounted_price, |x, y| y.total_cmp(x))
        }
        SortBy::Popularity => b.like_count().cmp(&a.like_count()),
    }
}

fn missing_last<T>(a: Option<T>, b: Option<T>, cmp: impl Fn(&T, &T) -> Ordering) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => cmp(&x, &y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::UserId;
    use crate::query::criteria::{FilterInput, Range};

    fn deal(id: &str, price: Option<f64>) -> Deal {
        let mut d = Deal::new(id, id);
        d.discounted_price = price;
        d
    }

    fn ids(deals: &[Deal]) -> Vec<&str> {
        deals.iter().map(|d| d.id.as_str()).collect()
    }

    fn ctx() -> FilterContext<'static> {
        FilterContext::new(None, Utc::now())
    }

    #[test]
    fn price_low_orders_cheapest_first() {
        let deals = vec![deal("A", Some(10.0)), deal("B", Some(5.0))];
        let criteria = FilterCriteria {
            sort_by: SortBy::PriceLow,
            ..FilterCriteria::default()
        };
        assert_eq!(ids(&apply(&deals, &criteria, &ctx())), vec!["B", "A"]);
    }

    #[test]
    fn min_price_from_text_input_filters() {
        let deals = vec![deal("A", Some(10.0)), deal("B", Some(5.0))];
        let input = FilterInput {
            min_price: Some("6".into()),
            ..FilterInput::default()
        };
        let criteria = FilterCriteria::from(&input);
        assert_eq!(ids(&apply(&deals, &criteria, &ctx())), vec!["A"]);
    }

    #[test]
    fn search_is_case_insensitive_across_fields() {
        let mut a = deal("a", None);
        a.brand = Some("Nike".into());
        let mut b = deal("b", None);
        b.platform = Some("Jumia".into());
        let mut c = deal("c", None);
        c.description = "Running SHOES".into();
        let deals = vec![a, b, c];

        let mut criteria = FilterCriteria {
            search: "nike".into(),
            ..FilterCriteria::default()
        };
        assert_eq!(ids(&apply(&deals, &criteria, &ctx())), vec!["a"]);
        criteria.search = "jUmIa".into();
        assert_eq!(ids(&apply(&deals, &criteria, &ctx())), vec!["b"]);
        criteria.search = "shoes".into();
        assert_eq!(ids(&apply(&deals, &criteria, &ctx())), vec!["c"]);
        criteria.search = "   ".into();
        assert_eq!(apply(&deals, &criteria, &ctx()).len(), 3);
    }

    #[test]
    fn discount_filter_excludes_unpriced_deals() {
        let mut half = deal("half", Some(50.0));
        half.original_price = Some(100.0);
        let mut advertised = deal("advertised", Some(50.0));
        advertised.discount_percentage = Some(50.0);
        let deals = vec![half, advertised];

        let criteria = FilterCriteria {
            discount_range: Range::new(Some(40.0), None),
            ..FilterCriteria::default()
        };
        assert_eq!(ids(&apply(&deals, &criteria, &ctx())), vec!["half"]);
    }

    #[test]
    fn price_filter_is_inclusive_and_drops_missing_prices() {
        let deals = vec![deal("a", Some(5.0)), deal("b", Some(10.0)), deal("c", None)];
        let criteria = FilterCriteria {
            price_range: Range::new(Some(5.0), Some(10.0)),
            ..FilterCriteria::default()
        };
        assert_eq!(ids(&apply(&deals, &criteria, &ctx())), vec!["a", "b"]);
    }

    #[test]
    fn category_is_exact() {
        let mut a = deal("a", None);
        a.category = Some("fashion".into());
        let mut b = deal("b", None);
        b.category = Some("fashion-kids".into());
        let criteria = FilterCriteria {
            category: Some("fashion".into()),
            ..FilterCriteria::default()
        };
        assert_eq!(ids(&apply(&[a, b], &criteria, &ctx())), vec!["a"]);
    }

    #[test]
    fn saved_only_reads_the_saved_set() {
        let deals = vec![deal("a", None), deal("b", None)];
        let saved: IndexSet<DealId> = [DealId::new("b")].into_iter().collect();
        let criteria = FilterCriteria {
            show_saved_only: true,
            ..FilterCriteria::default()
        };
        let with_saved = FilterContext::new(Some(&saved), Utc::now());
        assert_eq!(ids(&apply(&deals, &criteria, &with_saved)), vec!["b"]);
        assert!(apply(&deals, &criteria, &ctx()).is_empty());
    }

    #[test]
    fn hide_expired_uses_reference_time() {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).single().expect("date");
        let mut old = deal("old", None);
        old.expires_at = Some(now - Duration::days(1));
        let mut fresh = deal("fresh", None);
        fresh.expires_at = Some(now + Duration::days(1));
        let forever = deal("forever", None);

        let criteria = FilterCriteria {
            hide_expired: true,
            ..FilterCriteria::default()
        };
        let ctx = FilterContext::new(None, now);
        assert_eq!(
            ids(&apply(&[old, fresh, forever], &criteria, &ctx)),
            vec!["fresh", "forever"]
        );
    }

    #[test]
    fn sorting_is_stable_and_puts_missing_keys_last() {
        let deals = vec![
            deal("none", None),
            deal("x", Some(5.0)),
            deal("y", Some(5.0)),
            deal("z", Some(1.0)),
        ];
        let mut criteria = FilterCriteria {
            sort_by: SortBy::PriceLow,
            ..FilterCriteria::default()
        };
        assert_eq!(
            ids(&apply(&deals, &criteria, &ctx())),
            vec!["z", "x", "y", "none"]
        );
        criteria.sort_by = SortBy::PriceHigh;
        assert_eq!(
            ids(&apply(&deals, &criteria, &ctx())),
            vec!["x", "y", "z", "none"]
        );
    }

    #[test]
    fn discount_sorts_fall_back_to_advertised_and_keep_ties_in_order() {
        let discounted = |id: &str, original: f64, price: f64| {
            let mut d = deal(id, Some(price));
            d.original_price = Some(original);
            d
        };
        let mut advertised = deal("adv", Some(10.0));
        advertised.discount_percentage = Some(70.0);

        let deals = vec![
            deal("none", Some(3.0)),
            discounted("a", 100.0, 50.0),
            advertised,
            discounted("b", 200.0, 100.0),
            discounted("c", 100.0, 80.0),
        ];
        let mut criteria = FilterCriteria {
            sort_by: SortBy::DiscountHigh,
            ..FilterCriteria::default()
        };
        assert_eq!(
            ids(&apply(&deals, &criteria, &ctx())),
            vec!["adv", "a", "b", "c", "none"]
        );

        criteria.sort_by = SortBy::DiscountLow;
        assert_eq!(
            ids(&apply(&deals, &criteria, &ctx())),
            vec!["c", "a", "b", "adv", "none"]
        );
    }

    #[test]
    fn newest_first_by_default() {
        let base = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).single().expect("date");
        let mut first = deal("first", None);
        first.created_at = Some(base);
        let mut second = deal("second", None);
        second.created_at = Some(base + Duration::hours(1));
        let undated = deal("undated", None);

        let deals = vec![undated, first, second];
        let out = apply(&deals, &FilterCriteria::default(), &ctx());
        assert_eq!(ids(&out), vec!["second", "first", "undated"]);

        let criteria = FilterCriteria {
            sort_by: SortBy::Oldest,
            ..FilterCriteria::default()
        };
        assert_eq!(
            ids(&apply(&deals, &criteria, &ctx())),
            vec!["first", "second", "undated"]
        );
    }

    #[test]
    fn popularity_counts_likes() {
        let mut liked = deal("liked", None);
        liked.likes = vec![UserId::new("u1"), UserId::new("u2")];
        let mut once = deal("once", None);
        once.likes = vec![UserId::new("u1")];
        let criteria = FilterCriteria {
            sort_by: SortBy::Popularity,
            ..FilterCriteria::default()
        };
        let out = apply(&[deal("zero", None), once, liked], &criteria, &ctx());
        assert_eq!(ids(&out), vec!["liked", "once", "zero"]);
    }

    #[test]
    fn every_result_satisfies_the_criteria() {
        let mut deals = Vec::new();
        for i in 0..30_u32 {
            let mut d = deal(&format!("d{i}"), Some(f64::from(i)));
            d.original_price = Some(f64::from(i) * 2.0);
            d.category = Some(if i % 2 == 0 { "even" } else { "odd" }.into());
            deals.push(d);
        }
        let criteria = FilterCriteria {
            category: Some("even".into()),
            price_range: Range::new(Some(4.0), Some(20.0)),
            ..FilterCriteria::default()
        };
        let out = apply(&deals, &criteria, &ctx());
        assert!(!out.is_empty());
        for d in &out {
            assert!(matches(d, &criteria, &ctx()));
            assert!(deals.contains(d));
        }
    }
}
