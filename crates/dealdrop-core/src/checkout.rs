// ── Checkout saga ──
//
// Payment-then-create flows as a resumable state machine:
//
//   Initialized ─verify─▶ PaymentVerified ─create─▶ [VendorCreated ─subscribe─▶]
//   ResourceCreated ─cleanup─▶ Completed
//
// Any stage may end in Failed. Every transition is written to the client
// store before the next remote call, and every resource-creating request
// carries the checkout's idempotency key, so `resume_checkout` can pick up
// after a crash or a failed request without charging or creating twice.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use dealdrop_api::TransactionStatus;
use dealdrop_api::models::{
    NewVendor, OrderItem, OrderRequest, SlotRequest, SubscriptionRequest, UploadPayload,
};
use dealdrop_api::paystack::InitializeRequest;

use crate::error::CoreError;
use crate::market::Market;
use crate::model::{CartItem, DealId, Order, StagedUpload, UserId, VendorDraft};

/// Snapshot of the vendor application taken when payment starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VendorApplication {
    pub business_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub documents: Vec<StagedUpload>,
}

impl VendorApplication {
    fn from_draft(draft: &VendorDraft) -> Result<Self, CoreError> {
        let missing: Vec<&str> = draft
            .missing_fields()
            .into_iter()
            .filter(|f| *f != "plan_id")
            .collect();
        if !missing.is_empty() {
            return Err(CoreError::validation(format!(
                "vendor application is missing: {}",
                missing.join(", ")
            )));
        }
        Ok(Self {
            business_name: draft.business_name.clone().unwrap_or_default(),
            email: draft.email.clone().unwrap_or_default(),
            phone: draft.phone.clone(),
            category: draft.category.clone(),
            description: draft.description.clone(),
            documents: draft.uploads.clone(),
        })
    }
}

/// What is being paid for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Purchase {
    CartOrder {
        items: Vec<CartItem>,
    },
    VendorSubscription {
        plan_id: String,
        plan_name: String,
        price: f64,
        application: VendorApplication,
    },
    GroupSlot {
        deal_id: DealId,
        price: f64,
    },
}

impl Purchase {
    /// Total in major units.
    pub fn amount(&self) -> f64 {
        match self {
            Self::CartOrder { items } => items.iter().map(CartItem::line_total).sum(),
            Self::VendorSubscription { price, .. } | Self::GroupSlot { price, .. } => *price,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::CartOrder { items } => format!("cart order ({} items)", items.len()),
            Self::VendorSubscription { plan_name, .. } => {
                format!("vendor subscription ({plan_name})")
            }
            Self::GroupSlot { deal_id, .. } => format!("group deal slot ({deal_id})"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "kebab-case")]
pub enum CheckoutStage {
    /// Payment started; the payer must visit `authorization_url`.
    Initialized { authorization_url: String },
    PaymentVerified,
    /// Vendor record exists; the plan subscription is still to be made.
    VendorCreated { vendor_id: String },
    ResourceCreated { resource_id: String },
    Completed,
    Failed { at: String, reason: String },
}

impl CheckoutStage {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Initialized { .. } => "initialized",
            Self::PaymentVerified => "payment-verified",
            Self::VendorCreated { .. } => "vendor-created",
            Self::ResourceCreated { .. } => "resource-created",
            Self::Completed => "completed",
            Self::Failed { .. } => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed { .. })
    }
}

/// One payment-backed purchase and how far it has progressed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkout {
    /// Idempotency key; also the store key.
    pub key: Uuid,
    /// Payment provider reference.
    pub reference: String,
    pub user_id: UserId,
    pub email: String,
    pub purchase: Purchase,
    /// Amount charged, in the currency's minor unit.
    pub amount_minor: u64,
    pub currency: String,
    pub stage: CheckoutStage,
    /// Number of resume attempts that hit an error.
    pub attempts: u32,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Checkout {
    pub fn authorization_url(&self) -> Option<&str> {
        match &self.stage {
            CheckoutStage::Initialized { authorization_url } => Some(authorization_url),
            _ => None,
        }
    }

    fn advance(&mut self, stage: CheckoutStage) {
        debug!(key = %self.key, from = self.stage.name(), to = stage.name(), "checkout stage");
        self.stage = stage;
        self.last_error = None;
        self.updated_at = Utc::now();
    }
}

/// Payment reference derived from the idempotency key.
pub fn reference_for(key: &Uuid) -> String {
    format!("dd_{}", key.simple())
}

/// Convert a major-unit amount to minor units (e.g. naira to kobo),
/// rounding to the nearest unit.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::as_conversions
)]
pub fn to_minor_units(amount: f64) -> Result<u64, CoreError> {
    let minor = (amount * 100.0).round();
    if !minor.is_finite() || minor <= 0.0 || minor >= 9.0e15 {
        return Err(CoreError::validation(format!(
            "cannot charge an amount of {amount}"
        )));
    }
    Ok(minor as u64)
}

enum Step {
    Advanced,
    Waiting,
}

impl Market {
    // ── Purchase builders ────────────────────────────────────────

    /// Pay for everything in the cart.
    pub fn cart_purchase(&self) -> Result<Purchase, CoreError> {
        let items = self.store().cart();
        if items.is_empty() {
            return Err(CoreError::validation("cart is empty"));
        }
        Ok(Purchase::CartOrder { items })
    }

    /// Pay for a vendor plan using the onboarding draft as the application.
    pub async fn subscription_purchase(&self, plan_id: &str) -> Result<Purchase, CoreError> {
        let draft = self
            .store()
            .vendor_draft()
            .ok_or_else(|| CoreError::validation("no vendor application in progress"))?;
        let application = VendorApplication::from_draft(&draft)?;

        let plan = self
            .vendor_plans()
            .await?
            .into_iter()
            .find(|p| p.id == plan_id)
            .ok_or_else(|| CoreError::not_found("Vendor plan", plan_id))?;

        self.store().update_draft(|d| d.plan_id = Some(plan.id.clone()))?;

        Ok(Purchase::VendorSubscription {
            plan_id: plan.id,
            plan_name: plan.name,
            price: plan.price,
            application,
        })
    }

    /// Pay for one slot in a group deal.
    pub async fn slot_purchase(&self, deal_id: &DealId) -> Result<Purchase, CoreError> {
        let session = self.require_session()?;
        let group = self.group_deal(deal_id).await?;
        if group.is_full() {
            return Err(CoreError::validation(format!(
                "group deal {deal_id} has no free slots"
            )));
        }
        if group.has_member(&session.user_id) {
            return Err(CoreError::validation(format!(
                "you already hold a slot in {deal_id}"
            )));
        }
        let price = match group.slot_price {
            Some(price) => price,
            None => self
                .deal(deal_id)
                .await?
                .price()
                .ok_or_else(|| CoreError::validation(format!("deal {deal_id} has no price")))?,
        };
        Ok(Purchase::GroupSlot {
            deal_id: deal_id.clone(),
            price,
        })
    }

    // ── Saga ─────────────────────────────────────────────────────

    /// Start payment for a purchase. The returned checkout carries the
    /// URL the payer must visit; call `resume_checkout` afterwards.
    pub async fn start_checkout(&self, purchase: Purchase) -> Result<Checkout, CoreError> {
        let session = self.require_session()?;
        let payments = self.payments()?;
        let config = self
            .config()
            .payments
            .as_ref()
            .ok_or_else(payments_not_configured)?;

        let amount_minor = to_minor_units(purchase.amount())?;
        let key = Uuid::new_v4();
        let reference = reference_for(&key);

        let request = InitializeRequest {
            email: session.email.clone(),
            amount: amount_minor,
            reference: reference.clone(),
            currency: Some(config.currency.clone()),
            callback_url: config.callback_url.clone(),
            metadata: Some(serde_json::json!({
                "idempotencyKey": key.to_string(),
                "purchase": purchase.describe(),
            })),
        };
        let authorization = payments.initialize(&request).await?;

        let now = Utc::now();
        let checkout = Checkout {
            key,
            reference,
            user_id: session.user_id,
            email: session.email,
            purchase,
            amount_minor,
            currency: config.currency.clone(),
            stage: CheckoutStage::Initialized {
                authorization_url: authorization.authorization_url,
            },
            attempts: 0,
            last_error: None,
            created_at: now,
            updated_at: now,
        };
        self.store().put_checkout(checkout.clone())?;
        info!(key = %key, amount_minor, "checkout started");
        Ok(checkout)
    }

    /// Drive a checkout forward from its last recorded stage.
    ///
    /// Returns the checkout unchanged while payment is still pending.
    /// A step that fails leaves the checkout resumable and returns
    /// `CheckoutIncomplete`; a payment that failed or mismatched ends it
    /// with `CheckoutFailed`.
    pub async fn resume_checkout(&self, key: &Uuid) -> Result<Checkout, CoreError> {
        let mut checkout = self
            .checkout(key)
            .ok_or_else(|| CoreError::not_found("Checkout", key.to_string()))?;

        loop {
            if let CheckoutStage::Failed { reason, .. } = &checkout.stage {
                return Err(CoreError::CheckoutFailed {
                    key: key.to_string(),
                    reason: reason.clone(),
                });
            }
            if checkout.stage.is_terminal() {
                return Ok(checkout);
            }

            match self.step(&mut checkout).await {
                Ok(Step::Advanced) => self.store().put_checkout(checkout.clone())?,
                Ok(Step::Waiting) => return Ok(checkout),
                Err(e) => {
                    let stage = checkout.stage.name().to_owned();
                    warn!(key = %key, stage, error = %e, "checkout step failed");
                    checkout.attempts = checkout.attempts.saturating_add(1);
                    checkout.last_error = Some(e.to_string());
                    checkout.updated_at = Utc::now();
                    self.store().put_checkout(checkout)?;
                    return Err(CoreError::CheckoutIncomplete {
                        key: key.to_string(),
                        stage,
                        message: e.to_string(),
                    });
                }
            }
        }
    }

    pub fn checkout(&self, key: &Uuid) -> Option<Checkout> {
        self.store().checkout(key)
    }

    pub fn checkouts(&self) -> Vec<Checkout> {
        self.store().checkouts()
    }

    /// Forget one finished checkout. In-flight checkouts are refused so
    /// they stay resumable.
    pub fn forget_checkout(&self, key: &Uuid) -> Result<Checkout, CoreError> {
        let checkout = self
            .checkout(key)
            .ok_or_else(|| CoreError::not_found("Checkout", key.to_string()))?;
        if !checkout.stage.is_terminal() {
            return Err(CoreError::validation(format!(
                "checkout {key} is still {}; resume it first",
                checkout.stage.name()
            )));
        }
        self.store().remove_checkout(key)?;
        info!(key = %key, "checkout forgotten");
        Ok(checkout)
    }

    /// Forget every completed or failed checkout.
    pub fn clear_finished_checkouts(&self) -> Result<usize, CoreError> {
        let removed = self.store().prune_checkouts()?;
        debug!(removed, "finished checkouts cleared");
        Ok(removed)
    }

    fn payments(&self) -> Result<&dealdrop_api::PaystackClient, CoreError> {
        self.inner()
            .payments
            .as_ref()
            .ok_or_else(payments_not_configured)
    }

    async fn step(&self, checkout: &mut Checkout) -> Result<Step, CoreError> {
        let key = checkout.key.to_string();
        let client = &self.inner().client;

        match checkout.stage.clone() {
            CheckoutStage::Initialized { .. } => {
                let verification = self.payments()?.verify(&checkout.reference).await?;
                match verification.status {
                    TransactionStatus::Success if verification.amount == checkout.amount_minor => {
                        checkout.advance(CheckoutStage::PaymentVerified);
                    }
                    TransactionStatus::Success => {
                        checkout.advance(CheckoutStage::Failed {
                            at: "payment".into(),
                            reason: format!(
                                "paid amount {} does not match expected {}",
                                verification.amount, checkout.amount_minor
                            ),
                        });
                    }
                    TransactionStatus::Failed
                    | TransactionStatus::Abandoned
                    | TransactionStatus::Reversed => {
                        let reason = verification
                            .gateway_response
                            .unwrap_or_else(|| format!("payment {:?}", verification.status));
                        checkout.advance(CheckoutStage::Failed {
                            at: "payment".into(),
                            reason,
                        });
                    }
                    TransactionStatus::Pending
                    | TransactionStatus::Ongoing
                    | TransactionStatus::Unknown => {
                        info!(key = %checkout.key, "payment not completed yet");
                        return Ok(Step::Waiting);
                    }
                }
            }

            CheckoutStage::PaymentVerified => match &checkout.purchase {
                Purchase::CartOrder { items } => {
                    let order = OrderRequest {
                        user_id: checkout.user_id.to_string(),
                        items: items
                            .iter()
                            .map(|i| OrderItem {
                                deal_id: i.deal_id.to_string(),
                                quantity: i.quantity,
                                unit_price: i.unit_price,
                            })
                            .collect(),
                        payment_reference: checkout.reference.clone(),
                    };
                    let created = Order::from(client.create_order(&order, &key).await?);
                    checkout.advance(CheckoutStage::ResourceCreated {
                        resource_id: created.id,
                    });
                }
                Purchase::VendorSubscription { application, .. } => {
                    let vendor = NewVendor {
                        business_name: application.business_name.clone(),
                        email: application.email.clone(),
                        phone: application.phone.clone(),
                        category: application.category.clone(),
                        description: application.description.clone(),
                        documents: application
                            .documents
                            .iter()
                            .map(|d| UploadPayload {
                                file_name: d.file_name.clone(),
                                content_type: d.content_type.clone(),
                                data: d.data.clone(),
                            })
                            .collect(),
                        payment_reference: checkout.reference.clone(),
                    };
                    let created = client.create_vendor(&vendor, &key).await?;
                    checkout.advance(CheckoutStage::VendorCreated {
                        vendor_id: created.id,
                    });
                    // The backend holds the documents now.
                    if let Purchase::VendorSubscription { application, .. } =
                        &mut checkout.purchase
                    {
                        application.documents.clear();
                    }
                }
                Purchase::GroupSlot { deal_id, .. } => {
                    let request = SlotRequest {
                        user_id: checkout.user_id.to_string(),
                        payment_reference: checkout.reference.clone(),
                    };
                    let resource_id = deal_id.to_string();
                    client.reserve_slot(&resource_id, &request, &key).await?;
                    checkout.advance(CheckoutStage::ResourceCreated { resource_id });
                }
            },

            CheckoutStage::VendorCreated { vendor_id } => {
                let Purchase::VendorSubscription { plan_id, .. } = &checkout.purchase else {
                    return Err(CoreError::Internal(format!(
                        "checkout {key} has a vendor but is not a subscription"
                    )));
                };
                let request = SubscriptionRequest {
                    vendor_id,
                    plan_id: plan_id.clone(),
                    payment_reference: checkout.reference.clone(),
                };
                let created = client.create_subscription(&request, &key).await?;
                checkout.advance(CheckoutStage::ResourceCreated {
                    resource_id: created.id,
                });
            }

            CheckoutStage::ResourceCreated { resource_id } => {
                match &checkout.purchase {
                    Purchase::CartOrder { items } => {
                        // Units added after payment started stay in the cart.
                        for item in items {
                            if let Err(e) = self
                                .store()
                                .deduct_from_cart(&item.deal_id, item.quantity)
                            {
                                warn!(deal = %item.deal_id, error = %e, "cannot clear cart line");
                            }
                        }
                    }
                    Purchase::VendorSubscription { .. } => self.store().clear_draft()?,
                    Purchase::GroupSlot { .. } => {}
                }
                info!(key = %checkout.key, resource_id, "checkout completed");
                checkout.advance(CheckoutStage::Completed);
            }

            CheckoutStage::Completed | CheckoutStage::Failed { .. } => return Ok(Step::Waiting),
        }
        Ok(Step::Advanced)
    }
}

fn payments_not_configured() -> CoreError {
    CoreError::NotConfigured {
        feature: "Payments".into(),
        hint: "set paystack_secret in the active profile".into(),
    }
}
