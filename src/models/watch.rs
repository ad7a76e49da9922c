use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One recorded viewing of a content item by a user.
///
/// The same user/content pair may appear any number of times.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct WatchEdge {
    pub user_id: i64,
    pub content_id: i64,
    pub rating: Option<f64>,
    pub watched_at: DateTime<Utc>,
}
