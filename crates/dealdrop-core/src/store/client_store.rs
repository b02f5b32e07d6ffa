// ── Client store ──
//
// One source of truth for everything the client keeps between runs.
// Every mutation clones the current document, applies the change, persists
// it, and only then publishes the new snapshot. A failed write leaves both
// the file and the published state untouched.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::Utc;
use indexmap::IndexSet;
use tokio::sync::watch;
use tracing::{debug, info};
use uuid::Uuid;

use super::persist;
use super::state::{ClientState, STORAGE_QUOTA_BYTES};
use crate::checkout::Checkout;
use crate::engagement::SaveState;
use crate::error::CoreError;
use crate::model::{CartItem, Deal, DealId, Session, StagedUpload, VendorDraft};
use crate::stream::Subscription;

pub struct ClientStore {
    path: Option<PathBuf>,
    state: watch::Sender<Arc<ClientState>>,
}

impl ClientStore {
    /// Open the store backed by `path`, loading existing state.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, CoreError> {
        let path = path.into();
        let state = persist::load(&path)?;
        debug!(path = %path.display(), "client store opened");
        Ok(Self::with_state(Some(path), state))
    }

    /// A store that never touches disk.
    pub fn in_memory() -> Self {
        Self::with_state(None, ClientState::default())
    }

    fn with_state(path: Option<PathBuf>, state: ClientState) -> Self {
        let (tx, _) = watch::channel(Arc::new(state));
        Self { path, state: tx }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Current snapshot (cheap `Arc` clone).
    pub fn snapshot(&self) -> Arc<ClientState> {
        Arc::clone(&self.state.borrow())
    }

    /// Subscribe to every published change.
    pub fn subscribe(&self) -> Subscription<ClientState> {
        Subscription::new(self.state.subscribe())
    }

    /// Apply `change` to a copy of the state, persist, then publish.
    fn mutate<R>(
        &self,
        change: impl FnOnce(&mut ClientState) -> Result<R, CoreError>,
    ) -> Result<R, CoreError> {
        let mut outcome = None;
        self.state.send_if_modified(|current| {
            let mut next = ClientState::clone(current);
            let result = change(&mut next).and_then(|value| {
                if let Some(path) = &self.path {
                    persist::save(path, &persist::encode(&next)?)?;
                }
                Ok(value)
            });
            let committed = result.is_ok();
            if committed {
                *current = Arc::new(next);
            }
            outcome = Some(result);
            committed
        });
        outcome.unwrap_or_else(|| Err(CoreError::Internal("state update did not run".into())))
    }

    // ── Session ──────────────────────────────────────────────────────

    pub fn session(&self) -> Option<Session> {
        self.snapshot().session.clone()
    }

    pub fn set_session(&self, session: Session) -> Result<(), CoreError> {
        info!(user = %session.user_id, "session stored");
        self.mutate(|s| {
            s.session = Some(session);
            Ok(())
        })
    }

    pub fn clear_session(&self) -> Result<(), CoreError> {
        self.mutate(|s| {
            s.session = None;
            Ok(())
        })
    }

    // ── Saved deals ──────────────────────────────────────────────────

    pub fn saved(&self) -> IndexSet<DealId> {
        self.snapshot().saved.clone()
    }

    pub fn is_saved(&self, id: &DealId) -> bool {
        self.snapshot().is_saved(id)
    }

    /// Flip a deal between saved and unsaved; returns the new state.
    pub fn toggle_saved(&self, id: &DealId) -> Result<SaveState, CoreError> {
        self.mutate(|s| {
            if s.saved.shift_remove(id) {
                Ok(SaveState::Unsaved)
            } else {
                s.saved.insert(id.clone());
                Ok(SaveState::Saved)
            }
        })
    }

    // ── Cart ─────────────────────────────────────────────────────────

    pub fn cart(&self) -> Vec<CartItem> {
        self.snapshot().cart.values().cloned().collect()
    }

    pub fn cart_total(&self) -> f64 {
        self.snapshot().cart_total()
    }

    /// Add `quantity` of a deal, merging with an existing line.
    pub fn add_to_cart(&self, deal: &Deal, quantity: u32) -> Result<CartItem, CoreError> {
        if quantity == 0 {
            return Err(CoreError::validation("quantity must be at least 1"));
        }
        let unit_price = deal
            .price()
            .ok_or_else(|| CoreError::validation(format!("deal {} has no price", deal.id)))?;

        self.mutate(|s| {
            let line = s.cart.entry(deal.id.clone()).or_insert_with(|| CartItem {
                deal_id: deal.id.clone(),
                title: deal.title.clone(),
                quantity: 0,
                unit_price,
                added_at: Utc::now(),
            });
            line.quantity = line.quantity.saturating_add(quantity);
            line.unit_price = unit_price;
            Ok(line.clone())
        })
    }

    /// Set a line's quantity; zero removes it.
    pub fn set_quantity(&self, id: &DealId, quantity: u32) -> Result<(), CoreError> {
        self.mutate(|s| {
            if quantity == 0 {
                s.cart.shift_remove(id);
                return Ok(());
            }
            let line = s
                .cart
                .get_mut(id)
                .ok_or_else(|| CoreError::not_found("Cart item", id.as_str()))?;
            line.quantity = quantity;
            Ok(())
        })
    }

    /// Take `quantity` units off a line, dropping it once nothing is left.
    /// Returns the units still in the cart; a missing line is 0.
    pub fn deduct_from_cart(&self, id: &DealId, quantity: u32) -> Result<u32, CoreError> {
        self.mutate(|s| {
            let Some(line) = s.cart.get_mut(id) else {
                return Ok(0);
            };
            line.quantity = line.quantity.saturating_sub(quantity);
            let left = line.quantity;
            if left == 0 {
                s.cart.shift_remove(id);
            }
            Ok(left)
        })
    }

    pub fn remove_from_cart(&self, id: &DealId) -> Result<CartItem, CoreError> {
        self.mutate(|s| {
            s.cart
                .shift_remove(id)
                .ok_or_else(|| CoreError::not_found("Cart item", id.as_str()))
        })
    }

    pub fn clear_cart(&self) -> Result<(), CoreError> {
        self.mutate(|s| {
            s.cart.clear();
            Ok(())
        })
    }

    // ── Vendor onboarding draft ──────────────────────────────────────

    pub fn vendor_draft(&self) -> Option<VendorDraft> {
        self.snapshot().vendor_draft.clone()
    }

    /// Edit the draft, creating an empty one first if needed.
    pub fn update_draft(
        &self,
        edit: impl FnOnce(&mut VendorDraft),
    ) -> Result<VendorDraft, CoreError> {
        self.mutate(|s| {
            let draft = s.vendor_draft.get_or_insert_with(VendorDraft::default);
            edit(draft);
            let draft = draft.clone();
            check_quota(&draft)?;
            Ok(draft)
        })
    }

    /// Move the draft to its next onboarding step.
    pub fn advance_draft(&self) -> Result<VendorDraft, CoreError> {
        self.update_draft(|d| d.step = d.step.next())
    }

    pub fn clear_draft(&self) -> Result<(), CoreError> {
        self.mutate(|s| {
            s.vendor_draft = None;
            Ok(())
        })
    }

    /// Stage a document on the draft. Rejected with `StorageQuota` when
    /// the serialized draft would outgrow the quota.
    pub fn stage_upload(
        &self,
        file_name: &str,
        content_type: &str,
        bytes: &[u8],
    ) -> Result<VendorDraft, CoreError> {
        let upload = StagedUpload {
            file_name: file_name.to_owned(),
            content_type: content_type.to_owned(),
            data: BASE64.encode(bytes),
        };
        debug!(file_name, bytes = bytes.len(), "staging upload");
        self.update_draft(|d| d.uploads.push(upload))
    }

    // ── Checkouts ────────────────────────────────────────────────────

    pub fn checkout(&self, key: &Uuid) -> Option<Checkout> {
        self.snapshot().checkouts.get(key).cloned()
    }

    pub fn checkouts(&self) -> Vec<Checkout> {
        self.snapshot().checkouts.values().cloned().collect()
    }

    /// Record a checkout's latest stage.
    pub fn put_checkout(&self, checkout: Checkout) -> Result<(), CoreError> {
        self.mutate(|s| {
            s.checkouts.insert(checkout.key, checkout);
            Ok(())
        })
    }

    pub fn remove_checkout(&self, key: &Uuid) -> Result<Option<Checkout>, CoreError> {
        self.mutate(|s| Ok(s.checkouts.shift_remove(key)))
    }

    /// Drop every completed or failed checkout; returns how many went.
    pub fn prune_checkouts(&self) -> Result<usize, CoreError> {
        self.mutate(|s| {
            let before = s.checkouts.len();
            s.checkouts.retain(|_, c| !c.stage.is_terminal());
            Ok(before - s.checkouts.len())
        })
    }
}

fn check_quota(draft: &VendorDraft) -> Result<(), CoreError> {
    let size = serde_json::to_vec(draft)
        .map_err(|e| CoreError::Internal(format!("cannot serialize vendor draft: {e}")))?
        .len();
    if size > STORAGE_QUOTA_BYTES {
        return Err(CoreError::StorageQuota {
            limit_bytes: STORAGE_QUOTA_BYTES,
            attempted_bytes: size,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::OnboardingStep;

    fn priced(id: &str, price: f64) -> Deal {
        let mut deal = Deal::new(id, id.to_uppercase());
        deal.discounted_price = Some(price);
        deal
    }

    #[test]
    fn toggle_saved_round_trips_and_persists() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("state.json");
        let store = ClientStore::open(&path).expect("open");
        let id = DealId::new("d1");

        assert_eq!(store.toggle_saved(&id).expect("save"), SaveState::Saved);
        assert!(store.is_saved(&id));

        let reopened = ClientStore::open(&path).expect("reopen");
        assert!(reopened.is_saved(&id));

        assert_eq!(reopened.toggle_saved(&id).expect("unsave"), SaveState::Unsaved);
        assert!(!reopened.is_saved(&id));
    }

    #[test]
    fn cart_merges_lines_and_totals() {
        let store = ClientStore::in_memory();
        store.add_to_cart(&priced("a", 10.0), 1).expect("add");
        store.add_to_cart(&priced("b", 2.5), 2).expect("add");
        let merged = store.add_to_cart(&priced("a", 10.0), 2).expect("add");

        assert_eq!(merged.quantity, 3);
        assert!((store.cart_total() - 35.0).abs() < f64::EPSILON);

        store.set_quantity(&DealId::new("b"), 0).expect("remove via zero");
        assert_eq!(store.cart().len(), 1);
        assert!(store.remove_from_cart(&DealId::new("missing")).is_err());
    }

    #[test]
    fn deducting_keeps_units_beyond_the_paid_amount() {
        let store = ClientStore::in_memory();
        store.add_to_cart(&priced("a", 4.0), 5).expect("add");
        store.add_to_cart(&priced("b", 1.0), 1).expect("add");

        assert_eq!(store.deduct_from_cart(&DealId::new("a"), 2).expect("deduct"), 3);
        assert_eq!(store.deduct_from_cart(&DealId::new("b"), 4).expect("deduct"), 0);
        assert_eq!(store.deduct_from_cart(&DealId::new("gone"), 1).expect("deduct"), 0);

        let cart = store.cart();
        assert_eq!(cart.len(), 1);
        assert_eq!(cart[0].quantity, 3);
    }

    #[test]
    fn unpriced_deals_cannot_be_added() {
        let store = ClientStore::in_memory();
        let err = store.add_to_cart(&Deal::new("x", "X"), 1).expect_err("no price");
        assert!(matches!(err, CoreError::ValidationFailed { .. }));
        assert!(store.cart().is_empty());
    }

    #[test]
    fn uploads_over_quota_are_rejected_and_state_is_unchanged() {
        let store = ClientStore::in_memory();
        store
            .stage_upload("small.png", "image/png", &[1, 2, 3])
            .expect("small upload");

        let big = vec![0_u8; STORAGE_QUOTA_BYTES];
        let err = store
            .stage_upload("big.png", "image/png", &big)
            .expect_err("over quota");
        assert!(matches!(err, CoreError::StorageQuota { .. }));

        let draft = store.vendor_draft().expect("draft");
        assert_eq!(draft.uploads.len(), 1);
        assert_eq!(draft.uploads[0].data, "AQID");
    }

    #[test]
    fn draft_advances_through_steps() {
        let store = ClientStore::in_memory();
        store
            .update_draft(|d| d.business_name = Some("Acme".into()))
            .expect("edit");
        let draft = store.advance_draft().expect("advance");
        assert_eq!(draft.step, OnboardingStep::Contact);
        store.clear_draft().expect("clear");
        assert!(store.vendor_draft().is_none());
    }

    #[tokio::test]
    async fn subscribers_see_saved_changes() {
        let store = ClientStore::in_memory();
        let mut sub = store.subscribe();
        store.toggle_saved(&DealId::new("d9")).expect("save");
        let snap = sub.changed().await.expect("store alive");
        assert!(snap.is_saved(&DealId::new("d9")));
    }

    #[test]
    fn failed_writes_do_not_publish() {
        let dir = tempfile::tempdir().expect("tempdir");
        // A directory where the state file should be makes the rename fail.
        let path = dir.path().join("state.json");
        std::fs::create_dir_all(path.join("occupied")).expect("mkdir");
        let store = ClientStore::with_state(Some(path), ClientState::default());

        assert!(store.toggle_saved(&DealId::new("d1")).is_err());
        assert!(!store.is_saved(&DealId::new("d1")));
    }
}
