// Orders and group-deal slots.

use tracing::debug;

use crate::client::MarketClient;
use crate::error::Error;
use crate::models::{ApiGroupDeal, ApiOrder, ApiSlot, OrderRequest, SlotRequest};

impl MarketClient {
    /// Create an order for a paid cart.
    ///
    /// `POST /orders`
    pub async fn create_order(
        &self,
        order: &OrderRequest,
        idempotency_key: &str,
    ) -> Result<ApiOrder, Error> {
        debug!(items = order.items.len(), reference = %order.payment_reference, "creating order");
        self.post_idempotent(&["orders"], order, idempotency_key).await
    }

    /// `GET /group-deals/{deal_id}`
    pub async fn get_group_deal(&self, deal_id: &str) -> Result<ApiGroupDeal, Error> {
        self.get_item(&["group-deals", deal_id]).await
    }

    /// Reserve one paid slot in a group deal.
    ///
    /// `POST /group-deals/{deal_id}/slots`
    pub async fn reserve_slot(
        &self,
        deal_id: &str,
        request: &SlotRequest,
        idempotency_key: &str,
    ) -> Result<ApiSlot, Error> {
        debug!(deal_id, "reserving group-deal slot");
        self.post_idempotent(&["group-deals", deal_id, "slots"], request, idempotency_key)
            .await
    }
}
