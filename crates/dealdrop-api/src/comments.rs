// Vendor discussion comments.

use tracing::debug;

use crate::client::MarketClient;
use crate::error::Error;
use crate::models::{ApiComment, NewComment};

impl MarketClient {
    /// `GET /deals/{id}/comments`
    ///
    /// The backend may return a flat list with `parentId` links, nested
    /// `replies`, or a mix of both.
    pub async fn list_comments(&self, deal_id: &str) -> Result<Vec<ApiComment>, Error> {
        self.get_list(&["deals", deal_id, "comments"], &[]).await
    }

    /// `POST /deals/{id}/comments`
    pub async fn post_comment(
        &self,
        deal_id: &str,
        comment: &NewComment,
    ) -> Result<ApiComment, Error> {
        debug!(deal_id, parent = ?comment.parent_id, "posting comment");
        self.post(&["deals", deal_id, "comments"], comment).await
    }

    /// `DELETE /comments/{id}` (admin or author).
    pub async fn delete_comment(&self, comment_id: &str) -> Result<(), Error> {
        debug!(comment_id, "deleting comment");
        self.delete(&["comments", comment_id]).await
    }
}
