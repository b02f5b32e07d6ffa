// Vendor endpoints: onboarding, plans, subscriptions, and moderation.

use tracing::debug;

use crate::client::MarketClient;
use crate::error::Error;
use crate::models::{
    ApiSubscription, ApiVendor, NewVendor, SubscriptionRequest, VendorPlan, VendorStatusUpdate,
};

impl MarketClient {
    /// `GET /vendors/{id}`
    pub async fn get_vendor(&self, id: &str) -> Result<ApiVendor, Error> {
        self.get_item(&["vendors", id]).await
    }

    /// Create a vendor record after its registration fee was paid.
    ///
    /// `POST /vendors`, carrying the checkout's idempotency key.
    pub async fn create_vendor(
        &self,
        vendor: &NewVendor,
        idempotency_key: &str,
    ) -> Result<ApiVendor, Error> {
        debug!(business = %vendor.business_name, "creating vendor");
        self.post_idempotent(&["vendors"], vendor, idempotency_key).await
    }

    /// Change a vendor's status (admin only): `active`, `suspended`, ...
    ///
    /// `PATCH /vendors/{id}/status`
    pub async fn set_vendor_status(
        &self,
        vendor_id: &str,
        update: &VendorStatusUpdate,
    ) -> Result<ApiVendor, Error> {
        debug!(vendor_id, status = %update.status, "updating vendor status");
        self.patch(&["vendors", vendor_id, "status"], update).await
    }

    /// `GET /vendor-plans`
    pub async fn list_vendor_plans(&self) -> Result<Vec<VendorPlan>, Error> {
        self.get_list(&["vendor-plans"], &[]).await
    }

    /// Attach a paid plan to a vendor.
    ///
    /// `POST /vendor-subscriptions`
    pub async fn create_subscription(
        &self,
        request: &SubscriptionRequest,
        idempotency_key: &str,
    ) -> Result<ApiSubscription, Error> {
        debug!(vendor = %request.vendor_id, plan = %request.plan_id, "creating subscription");
        self.post_idempotent(&["vendor-subscriptions"], request, idempotency_key)
            .await
    }
}
