//! Request comments. Append-only; never edited or deleted from this client.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub repair_request_id: i64,
    pub user_name: Option<String>,
    pub comment: String,
    pub created_at: String,
}

/// Payload for `POST /repair-requests/:id/comments`.
#[derive(Debug, Clone, Serialize)]
pub struct NewComment {
    pub comment: String,
}
