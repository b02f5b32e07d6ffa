// ── Deal domain type ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use super::{DealId, UserId, VendorId};

/// Moderation status of a deal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum DealStatus {
    #[default]
    Pending,
    Active,
    Rejected,
    Expired,
}

/// A vendor-submitted discounted product listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deal {
    pub id: DealId,
    pub title: String,
    pub description: String,
    pub category: Option<String>,
    pub original_price: Option<f64>,
    pub discounted_price: Option<f64>,
    /// Discount as advertised by the vendor; may disagree with the prices.
    pub discount_percentage: Option<f64>,
    pub images: Vec<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub brand: Option<String>,
    pub platform: Option<String>,
    pub status: DealStatus,
    pub likes: Vec<UserId>,
    pub vendor_id: Option<VendorId>,
}

impl Deal {
    /// Minimal deal with only an id and title set.
    pub fn new(id: impl Into<DealId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            category: None,
            original_price: None,
            discounted_price: None,
            discount_percentage: None,
            images: Vec::new(),
            created_at: None,
            expires_at: None,
            brand: None,
            platform: None,
            status: DealStatus::Active,
            likes: Vec::new(),
            vendor_id: None,
        }
    }

    /// Discount derived from the two prices, rounded half-up to a whole
    /// percent. `None` when either price is missing or the original price
    /// is not positive.
    pub fn computed_discount(&self) -> Option<f64> {
        let original = self.original_price?;
        let discounted = self.discounted_price?;
        if original <= 0.0 {
            return None;
        }
        Some(((original - discounted) / original * 100.0 + 0.5).floor())
    }

    /// Computed discount, falling back to the advertised one.
    pub fn effective_discount(&self) -> Option<f64> {
        self.computed_discount().or(self.discount_percentage)
    }

    /// Client-side expiry check; deals without an expiry never expire.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }

    pub fn is_liked_by(&self, user: &UserId) -> bool {
        self.likes.contains(user)
    }

    pub fn like_count(&self) -> usize {
        self.likes.len()
    }

    /// Price a buyer pays: the discounted price, else the original.
    pub fn price(&self) -> Option<f64> {
        self.discounted_price.or(self.original_price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn priced(original: Option<f64>, discounted: Option<f64>) -> Deal {
        let mut deal = Deal::new("d", "t");
        deal.original_price = original;
        deal.discounted_price = discounted;
        deal
    }

    #[test]
    fn discount_rounds_half_up() {
        // 12.5% off
        assert_eq!(priced(Some(80.0), Some(70.0)).computed_discount(), Some(13.0));
        // 33.33% off
        assert_eq!(priced(Some(30.0), Some(20.0)).computed_discount(), Some(33.0));
    }

    #[test]
    fn discount_needs_both_prices() {
        assert_eq!(priced(None, Some(10.0)).computed_discount(), None);
        assert_eq!(priced(Some(10.0), None).computed_discount(), None);
        assert_eq!(priced(Some(0.0), Some(0.0)).computed_discount(), None);
    }

    #[test]
    fn effective_discount_falls_back_to_advertised() {
        let mut deal = priced(None, Some(10.0));
        deal.discount_percentage = Some(40.0);
        assert_eq!(deal.effective_discount(), Some(40.0));
    }

    #[test]
    fn expiry_is_inclusive_of_now() {
        let now = Utc::now();
        let mut deal = Deal::new("d", "t");
        assert!(!deal.is_expired(now));
        deal.expires_at = Some(now);
        assert!(deal.is_expired(now));
        deal.expires_at = Some(now + Duration::hours(1));
        assert!(!deal.is_expired(now));
    }

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!("ACTIVE".parse::<DealStatus>().ok(), Some(DealStatus::Active));
        assert_eq!(DealStatus::Rejected.to_string(), "rejected");
    }
}
