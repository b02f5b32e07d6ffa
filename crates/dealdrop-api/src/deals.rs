// Deal endpoints: listing, detail, engagement, and moderation status.

use serde_json::json;
use tracing::debug;

use crate::client::MarketClient;
use crate::error::Error;
use crate::models::{ApiCoupon, ApiDeal, DealStatusUpdate, LikeResponse, VoteResponse};

impl MarketClient {
    /// List deals, optionally restricted to one moderation status.
    ///
    /// `GET /deals[?status=...]`
    pub async fn list_deals(&self, status: Option<&str>) -> Result<Vec<ApiDeal>, Error> {
        debug!(?status, "listing deals");
        match status {
            Some(s) => self.get_list(&["deals"], &[("status", s)]).await,
            None => self.get_list(&["deals"], &[]).await,
        }
    }

    /// `GET /deals/{id}`
    pub async fn get_deal(&self, id: &str) -> Result<ApiDeal, Error> {
        self.get_item(&["deals", id]).await
    }

    /// Toggle the caller's like on a deal.
    ///
    /// `POST /deals/{id}/like` with `{"userId": ...}`. Returns the
    /// authoritative like list after the toggle.
    pub async fn toggle_like(&self, deal_id: &str, user_id: &str) -> Result<Vec<String>, Error> {
        debug!(deal_id, user_id, "toggling like");
        let resp: LikeResponse = self
            .post(&["deals", deal_id, "like"], &json!({ "userId": user_id }))
            .await?;
        Ok(resp.likes)
    }

    /// Cast an up (`1`) or down (`-1`) vote.
    ///
    /// `POST /deals/{id}/vote` with `{"userId": ..., "direction": ...}`
    pub async fn vote(&self, deal_id: &str, user_id: &str, direction: i8) -> Result<i64, Error> {
        debug!(deal_id, direction, "voting");
        let resp: VoteResponse = self
            .post(
                &["deals", deal_id, "vote"],
                &json!({ "userId": user_id, "direction": direction }),
            )
            .await?;
        Ok(resp.score)
    }

    /// Set a deal's moderation status (admin only).
    ///
    /// `PATCH /deals/{id}/status`
    pub async fn set_deal_status(
        &self,
        deal_id: &str,
        update: &DealStatusUpdate,
    ) -> Result<ApiDeal, Error> {
        debug!(deal_id, status = %update.status, "updating deal status");
        self.patch(&["deals", deal_id, "status"], update).await
    }

    /// List coupons, optionally for a single deal.
    ///
    /// `GET /coupons[?dealId=...]`
    pub async fn list_coupons(&self, deal_id: Option<&str>) -> Result<Vec<ApiCoupon>, Error> {
        match deal_id {
            Some(id) => self.get_list(&["coupons"], &[("dealId", id)]).await,
            None => self.get_list(&["coupons"], &[]).await,
        }
    }
}
