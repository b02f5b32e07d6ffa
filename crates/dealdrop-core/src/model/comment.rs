use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CommentId, UserId};

/// A single discussion comment. Nesting lives in `CommentTree`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub parent_id: Option<CommentId>,
    pub author_id: Option<UserId>,
    pub author_name: Option<String>,
    pub body: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl Comment {
    pub fn new(id: impl Into<CommentId>, parent_id: Option<CommentId>, body: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            parent_id,
            author_id: None,
            author_name: None,
            body: body.into(),
            created_at: None,
        }
    }
}
