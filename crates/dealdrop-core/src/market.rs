// ── Market facade ──
//
// The one entry point consumers use. Owns the backend and provider
// clients, the deal catalog, and the client store, and routes every
// user-facing operation through them.

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use dealdrop_api::models::{DealStatusUpdate, NewComment, VendorStatusUpdate};
use dealdrop_api::{MarketClient, PaystackClient, ResendClient};

use crate::comments::CommentTree;
use crate::config::MarketConfig;
use crate::convert::{comment_from_api, flatten_comments};
use crate::engagement::{LikeOutcome, SaveState, VoteDirection, VoteOutcome};
use crate::error::CoreError;
use crate::model::{
    CartItem, Comment, CommentId, Coupon, Deal, DealId, DealStatus, GroupDeal, Session, Vendor,
    VendorDraft, VendorId, VendorPlan, VendorStatus,
};
use crate::notify::{Notice, Notifier};
use crate::query::{self, FilterContext, FilterCriteria, Page};
use crate::store::{ClientStore, DealCatalog, DealSnapshot};
use crate::stream::Subscription;

/// An item changed by a moderation action, and whether the affected
/// vendor was emailed about it.
#[derive(Debug, Clone)]
pub struct Moderated<T> {
    pub item: T,
    pub notified: bool,
}

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<MarketInner>`.
#[derive(Clone)]
pub struct Market {
    inner: Arc<MarketInner>,
}

pub(crate) struct MarketInner {
    pub(crate) config: MarketConfig,
    pub(crate) client: MarketClient,
    pub(crate) payments: Option<PaystackClient>,
    pub(crate) notifier: Notifier,
    pub(crate) catalog: DealCatalog,
    pub(crate) store: ClientStore,
}

impl Market {
    /// Build clients from configuration and open the client store.
    ///
    /// A stored session's token is installed on the backend client.
    pub fn new(config: MarketConfig) -> Result<Self, CoreError> {
        let transport = config.transport();
        let client = MarketClient::new(config.api_url.clone(), &transport)?;

        let payments = config
            .payments
            .as_ref()
            .map(|p| PaystackClient::new(p.base_url.clone(), &p.secret_key, &transport))
            .transpose()?;

        let notifier = match &config.email {
            Some(email) => Notifier::new(
                Some(ResendClient::new(
                    email.base_url.clone(),
                    &email.api_key,
                    &transport,
                )?),
                email.from.clone(),
            ),
            None => Notifier::disabled(),
        };

        let store = match &config.state_path {
            Some(path) => ClientStore::open(path)?,
            None => ClientStore::in_memory(),
        };
        if let Some(session) = store.session() {
            debug!(user = %session.user_id, "restoring stored session");
            client.set_token(Some(session.token));
        }

        Ok(Self {
            inner: Arc::new(MarketInner {
                config,
                client,
                payments,
                notifier,
                catalog: DealCatalog::new(),
                store,
            }),
        })
    }

    pub fn config(&self) -> &MarketConfig {
        &self.inner.config
    }

    /// The persisted client store.
    pub fn store(&self) -> &ClientStore {
        &self.inner.store
    }

    pub(crate) fn inner(&self) -> &MarketInner {
        &self.inner
    }

    // ── Authentication ───────────────────────────────────────────

    /// Ask the backend to email a magic sign-in link.
    pub async fn request_login(&self, email: &str) -> Result<(), CoreError> {
        let email = email.trim();
        if !email.contains('@') {
            return Err(CoreError::validation(format!(
                "'{email}' is not an email address"
            )));
        }
        self.inner.client.request_magic_link(email).await?;
        info!(email, "magic link requested");
        Ok(())
    }

    /// Exchange a magic-link token for a session and store it.
    pub async fn verify_login(&self, token: &str) -> Result<Session, CoreError> {
        let session = Session::from(self.inner.client.verify_magic_link(token.trim()).await?);
        self.inner.store.set_session(session.clone())?;
        self.inner.client.set_token(Some(session.token.clone()));
        info!(user = %session.user_id, role = %session.role, "signed in");
        Ok(session)
    }

    pub fn logout(&self) -> Result<(), CoreError> {
        self.inner.store.clear_session()?;
        self.inner.client.set_token(None);
        info!("signed out");
        Ok(())
    }

    pub fn session(&self) -> Option<Session> {
        self.inner.store.session()
    }

    pub(crate) fn require_session(&self) -> Result<Session, CoreError> {
        self.session().ok_or(CoreError::NotSignedIn)
    }

    fn require_admin(&self) -> Result<Session, CoreError> {
        let session = self.require_session()?;
        if session.is_admin() {
            Ok(session)
        } else {
            Err(CoreError::PermissionDenied {
                message: format!("{} is not an administrator", session.email),
            })
        }
    }

    // ── Deals ────────────────────────────────────────────────────

    /// Re-fetch the deal listing into the catalog.
    pub async fn refresh_deals(&self, status: Option<DealStatus>) -> Result<usize, CoreError> {
        let status = status.map(|s| s.to_string());
        let raw = self.inner.client.list_deals(status.as_deref()).await?;
        let deals: Vec<Deal> = raw.into_iter().map(Deal::from).collect();
        let count = deals.len();
        self.inner.catalog.replace_all(deals);
        debug!(count, "deal catalog refreshed");
        Ok(count)
    }

    pub fn deals_snapshot(&self) -> Arc<DealSnapshot> {
        self.inner.catalog.snapshot()
    }

    /// Subscribe to catalog changes.
    pub fn deals(&self) -> Subscription<DealSnapshot> {
        Subscription::new(self.inner.catalog.subscribe())
    }

    /// Filter, sort, and paginate the catalog. Loads the active listing
    /// first if nothing has been fetched yet.
    pub async fn browse(
        &self,
        criteria: &FilterCriteria,
        page: usize,
    ) -> Result<Page<Arc<Deal>>, CoreError> {
        if self.inner.catalog.is_empty() {
            self.refresh_deals(Some(DealStatus::Active)).await?;
        }
        let deals = self.inner.catalog.snapshot();
        let state = self.inner.store.snapshot();
        let ctx = FilterContext::new(Some(&state.saved), Utc::now());
        Ok(query::browse(
            deals.as_slice(),
            criteria,
            &ctx,
            page,
            self.inner.config.page_size,
        ))
    }

    /// Fetch one deal and refresh its catalog entry.
    pub async fn deal(&self, id: &DealId) -> Result<Arc<Deal>, CoreError> {
        let deal = Deal::from(
            self.inner
                .client
                .get_deal(id.as_str())
                .await
                .map_err(|e| not_found_as(e, "Deal", id.as_str()))?,
        );
        let key = deal.id.clone();
        self.inner.catalog.upsert(deal);
        self.inner
            .catalog
            .get(&key)
            .ok_or_else(|| CoreError::not_found("Deal", id.as_str()))
    }

    /// Catalog entry if present, otherwise fetched.
    async fn cached_deal(&self, id: &DealId) -> Result<Arc<Deal>, CoreError> {
        match self.inner.catalog.get(id) {
            Some(deal) => Ok(deal),
            None => self.deal(id).await,
        }
    }

    /// Flip a deal's saved state in the client store.
    pub fn toggle_save(&self, id: &DealId) -> Result<SaveState, CoreError> {
        let state = self.inner.store.toggle_saved(id)?;
        info!(deal = %id, %state, "save toggled");
        Ok(state)
    }

    /// Saved deals in the order they were saved. Deals the backend no
    /// longer knows are skipped.
    pub async fn saved_deals(&self) -> Result<Vec<Arc<Deal>>, CoreError> {
        let mut out = Vec::new();
        for id in self.inner.store.saved() {
            match self.cached_deal(&id).await {
                Ok(deal) => out.push(deal),
                Err(CoreError::NotFound { .. }) => {
                    debug!(deal = %id, "saved deal no longer exists");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(out)
    }

    /// Toggle the signed-in user's like.
    ///
    /// The catalog is updated optimistically, then reconciled with the
    /// like list the backend returns. On failure the optimistic change is
    /// reverted.
    pub async fn toggle_like(&self, id: &DealId) -> Result<LikeOutcome, CoreError> {
        let session = self.require_session()?;
        let original = self.cached_deal(id).await?;

        let mut optimistic = Deal::clone(&original);
        if optimistic.is_liked_by(&session.user_id) {
            optimistic.likes.retain(|u| u != &session.user_id);
        } else {
            optimistic.likes.push(session.user_id.clone());
        }
        self.inner.catalog.upsert(optimistic.clone());

        match self
            .inner
            .client
            .toggle_like(id.as_str(), session.user_id.as_str())
            .await
        {
            Ok(likes) => {
                let mut reconciled = optimistic;
                reconciled.likes = likes.into_iter().map(Into::into).collect();
                let outcome = LikeOutcome {
                    liked: reconciled.is_liked_by(&session.user_id),
                    likes: reconciled.like_count(),
                };
                self.inner.catalog.upsert(reconciled);
                Ok(outcome)
            }
            Err(e) => {
                warn!(deal = %id, error = %e, "like failed, reverting");
                self.inner.catalog.upsert(Deal::clone(&original));
                Err(e.into())
            }
        }
    }

    pub async fn vote(&self, id: &DealId, direction: VoteDirection) -> Result<VoteOutcome, CoreError> {
        let session = self.require_session()?;
        let score = self
            .inner
            .client
            .vote(id.as_str(), session.user_id.as_str(), direction.as_delta())
            .await
            .map_err(|e| not_found_as(e, "Deal", id.as_str()))?;
        Ok(VoteOutcome { direction, score })
    }

    pub async fn coupons(&self, deal: Option<&DealId>) -> Result<Vec<Coupon>, CoreError> {
        let raw = self
            .inner
            .client
            .list_coupons(deal.map(DealId::as_str))
            .await?;
        Ok(raw.into_iter().map(Coupon::from).collect())
    }

    // ── Cart ─────────────────────────────────────────────────────

    /// Add a deal to the cart at its current price.
    pub async fn add_to_cart(&self, id: &DealId, quantity: u32) -> Result<CartItem, CoreError> {
        let deal = self.cached_deal(id).await?;
        if deal.is_expired(Utc::now()) {
            return Err(CoreError::validation(format!("deal {id} has expired")));
        }
        self.inner.store.add_to_cart(&deal, quantity)
    }

    // ── Vendors ──────────────────────────────────────────────────

    pub async fn vendor_plans(&self) -> Result<Vec<VendorPlan>, CoreError> {
        let raw = self.inner.client.list_vendor_plans().await?;
        Ok(raw.into_iter().map(VendorPlan::from).collect())
    }

    pub async fn vendor(&self, id: &VendorId) -> Result<Vendor, CoreError> {
        let raw = self
            .inner
            .client
            .get_vendor(id.as_str())
            .await
            .map_err(|e| not_found_as(e, "Vendor", id.as_str()))?;
        Ok(Vendor::from(raw))
    }

    /// Read a document from disk and stage it on the onboarding draft.
    pub fn stage_upload(&self, path: &Path) -> Result<VendorDraft, CoreError> {
        let bytes = std::fs::read(path).map_err(|e| {
            CoreError::validation(format!("cannot read {}: {e}", path.display()))
        })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".into());
        self.inner
            .store
            .stage_upload(&file_name, content_type_for(path), &bytes)
    }

    // ── Comments ─────────────────────────────────────────────────

    /// Load a deal's discussion as a tree.
    pub async fn comment_thread(&self, deal: &DealId) -> Result<CommentTree, CoreError> {
        let raw = self
            .inner
            .client
            .list_comments(deal.as_str())
            .await
            .map_err(|e| not_found_as(e, "Deal", deal.as_str()))?;
        Ok(CommentTree::from_comments(flatten_comments(raw)))
    }

    /// Post a comment or reply and insert the server's copy into `thread`.
    pub async fn post_comment(
        &self,
        thread: &mut CommentTree,
        deal: &DealId,
        body: &str,
        parent: Option<&CommentId>,
    ) -> Result<Comment, CoreError> {
        let session = self.require_session()?;
        let body = body.trim();
        if body.is_empty() {
            return Err(CoreError::validation("comment body is empty"));
        }
        if let Some(parent) = parent {
            if thread.get(parent).is_none() {
                return Err(CoreError::not_found("Comment", parent.as_str()));
            }
        }

        let request = NewComment {
            body: body.to_owned(),
            parent_id: parent.map(ToString::to_string),
            author_id: session.user_id.to_string(),
        };
        let created = self
            .inner
            .client
            .post_comment(deal.as_str(), &request)
            .await?;
        let comment = comment_from_api(created, parent.cloned());
        thread.insert(comment.clone())?;
        Ok(comment)
    }

    // ── Group deals ──────────────────────────────────────────────

    pub async fn group_deal(&self, deal: &DealId) -> Result<GroupDeal, CoreError> {
        let raw = self
            .inner
            .client
            .get_group_deal(deal.as_str())
            .await
            .map_err(|e| not_found_as(e, "Group deal", deal.as_str()))?;
        Ok(GroupDeal::from(raw))
    }

    // ── Moderation ───────────────────────────────────────────────

    pub async fn approve_deal(&self, id: &DealId) -> Result<Moderated<Deal>, CoreError> {
        let deal = self.set_deal_status(id, DealStatus::Active, None).await?;
        let notice = Notice::DealApproved {
            title: deal.title.clone(),
        };
        let notified = self.notify_deal_vendor(&deal, &notice).await;
        Ok(Moderated {
            item: deal,
            notified,
        })
    }

    pub async fn reject_deal(
        &self,
        id: &DealId,
        reason: Option<String>,
    ) -> Result<Moderated<Deal>, CoreError> {
        let deal = self
            .set_deal_status(id, DealStatus::Rejected, reason.clone())
            .await?;
        let notice = Notice::DealRejected {
            title: deal.title.clone(),
            reason,
        };
        let notified = self.notify_deal_vendor(&deal, &notice).await;
        Ok(Moderated {
            item: deal,
            notified,
        })
    }

    pub async fn suspend_vendor(
        &self,
        id: &VendorId,
        reason: Option<String>,
    ) -> Result<Moderated<Vendor>, CoreError> {
        let vendor = self
            .set_vendor_status(id, VendorStatus::Suspended, reason.clone())
            .await?;
        let notice = Notice::VendorSuspended {
            business_name: vendor.business_name.clone(),
            reason,
        };
        let notified = self.inner.notifier.send(&vendor.email, &notice).await.is_some();
        Ok(Moderated {
            item: vendor,
            notified,
        })
    }

    pub async fn reinstate_vendor(&self, id: &VendorId) -> Result<Moderated<Vendor>, CoreError> {
        let vendor = self
            .set_vendor_status(id, VendorStatus::Active, None)
            .await?;
        let notice = Notice::VendorReinstated {
            business_name: vendor.business_name.clone(),
        };
        let notified = self.inner.notifier.send(&vendor.email, &notice).await.is_some();
        Ok(Moderated {
            item: vendor,
            notified,
        })
    }

    pub async fn delete_comment(&self, id: &CommentId) -> Result<(), CoreError> {
        self.require_admin()?;
        self.inner
            .client
            .delete_comment(id.as_str())
            .await
            .map_err(|e| not_found_as(e, "Comment", id.as_str()))?;
        info!(comment = %id, "comment deleted");
        Ok(())
    }

    async fn set_deal_status(
        &self,
        id: &DealId,
        status: DealStatus,
        reason: Option<String>,
    ) -> Result<Deal, CoreError> {
        self.require_admin()?;
        let update = DealStatusUpdate {
            status: status.to_string(),
            reason,
        };
        let raw = self
            .inner
            .client
            .set_deal_status(id.as_str(), &update)
            .await
            .map_err(|e| not_found_as(e, "Deal", id.as_str()))?;
        let deal = Deal::from(raw);
        self.inner.catalog.upsert(deal.clone());
        info!(deal = %id, %status, "deal moderated");
        Ok(deal)
    }

    async fn set_vendor_status(
        &self,
        id: &VendorId,
        status: VendorStatus,
        reason: Option<String>,
    ) -> Result<Vendor, CoreError> {
        self.require_admin()?;
        let update = VendorStatusUpdate {
            status: status.to_string(),
            reason,
        };
        let raw = self
            .inner
            .client
            .set_vendor_status(id.as_str(), &update)
            .await
            .map_err(|e| not_found_as(e, "Vendor", id.as_str()))?;
        info!(vendor = %id, %status, "vendor moderated");
        Ok(Vendor::from(raw))
    }

    /// Email the vendor behind a deal. Lookup and delivery failures are
    /// logged only.
    async fn notify_deal_vendor(&self, deal: &Deal, notice: &Notice) -> bool {
        let Some(vendor_id) = &deal.vendor_id else {
            debug!(deal = %deal.id, "deal has no vendor, skipping notice");
            return false;
        };
        match self.vendor(vendor_id).await {
            Ok(vendor) => self.inner.notifier.send(&vendor.email, notice).await.is_some(),
            Err(e) => {
                warn!(vendor = %vendor_id, error = %e, "cannot look up vendor for notice");
                false
            }
        }
    }
}

/// Name the missing entity instead of the raw request path.
fn not_found_as(err: dealdrop_api::Error, entity_type: &str, identifier: &str) -> CoreError {
    if err.is_not_found() {
        CoreError::not_found(entity_type, identifier)
    } else {
        err.into()
    }
}

fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
}
