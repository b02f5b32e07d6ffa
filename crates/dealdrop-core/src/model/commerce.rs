// ── Cart, coupons, orders, and group deals ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{DealId, UserId};

/// One cart line. Replaces the `cart` local-storage key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub deal_id: DealId,
    pub title: String,
    pub quantity: u32,
    /// Unit price captured when the item was added, in major units.
    pub unit_price: f64,
    pub added_at: DateTime<Utc>,
}

impl CartItem {
    pub fn line_total(&self) -> f64 {
        self.unit_price * f64::from(self.quantity)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coupon {
    pub id: String,
    pub code: String,
    pub description: Option<String>,
    pub deal_id: Option<DealId>,
    pub discount_percentage: Option<f64>,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub total: Option<f64>,
    pub payment_reference: Option<String>,
}

/// A reserved unit in a group deal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    pub user_id: UserId,
    pub payment_reference: Option<String>,
    pub reserved_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupDeal {
    pub deal_id: DealId,
    pub total_slots: u32,
    /// Price of one slot in major units.
    pub slot_price: Option<f64>,
    pub slots: Vec<Slot>,
}

impl GroupDeal {
    pub fn reserved(&self) -> usize {
        self.slots.len()
    }

    pub fn remaining(&self) -> usize {
        usize::try_from(self.total_slots)
            .unwrap_or(usize::MAX)
            .saturating_sub(self.slots.len())
    }

    pub fn is_full(&self) -> bool {
        self.remaining() == 0
    }

    pub fn has_member(&self, user: &UserId) -> bool {
        self.slots.iter().any(|s| &s.user_id == user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remaining_slots_never_underflow() {
        let slot = Slot {
            user_id: UserId::new("u1"),
            payment_reference: None,
            reserved_at: None,
        };
        let group = GroupDeal {
            deal_id: DealId::new("d1"),
            total_slots: 1,
            slot_price: Some(5.0),
            slots: vec![slot.clone(), slot],
        };
        assert_eq!(group.remaining(), 0);
        assert!(group.is_full());
        assert!(group.has_member(&UserId::new("u1")));
    }
}
