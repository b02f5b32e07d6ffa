// ── Typed client state ──
//
// The single document that replaces the browser's ad hoc local-storage
// keys (`user`, `cart`, `savedDeals`, `vendorData`, `vendorUploads`).

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::checkout::Checkout;
use crate::model::{CartItem, DealId, Session, VendorDraft};

/// Schema version written to every state file.
pub const STATE_VERSION: u32 = 1;

/// Ceiling on the serialized vendor draft, staged uploads included
/// (4.5 MiB).
pub const STORAGE_QUOTA_BYTES: usize = 4_718_592;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientState {
    pub version: u32,
    #[serde(default)]
    pub session: Option<Session>,
    /// Cart lines in insertion order.
    #[serde(default)]
    pub cart: IndexMap<DealId, CartItem>,
    /// Saved deals in the order they were saved.
    #[serde(default)]
    pub saved: IndexSet<DealId>,
    #[serde(default)]
    pub vendor_draft: Option<VendorDraft>,
    /// Pending and finished checkouts keyed by idempotency key.
    #[serde(default)]
    pub checkouts: IndexMap<Uuid, Checkout>,
}

impl Default for ClientState {
    fn default() -> Self {
        Self {
            version: STATE_VERSION,
            session: None,
            cart: IndexMap::new(),
            saved: IndexSet::new(),
            vendor_draft: None,
            checkouts: IndexMap::new(),
        }
    }
}

impl ClientState {
    /// Cart total in major units.
    pub fn cart_total(&self) -> f64 {
        self.cart.values().map(CartItem::line_total).sum()
    }

    pub fn is_saved(&self, id: &DealId) -> bool {
        self.saved.contains(id)
    }
}
