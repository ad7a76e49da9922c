use async_trait::async_trait;

use crate::{
    error::AppResult,
    models::{Content, NewContent, NewUser, User, WatchEdge},
};

/// Storage for users, content and watch history.
///
/// Listing operations return content in insertion (id) order so that callers
/// sorting by rating keep insertion order among equal ratings.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Repository: Send + Sync {
    /// Inserts a user. Fails with `Conflict` when the username or email is taken.
    async fn create_user(&self, user: NewUser) -> AppResult<User>;

    async fn find_user(&self, user_id: i64) -> AppResult<Option<User>>;

    async fn create_content(&self, content: NewContent) -> AppResult<Content>;

    async fn find_content(&self, content_id: i64) -> AppResult<Option<Content>>;

    /// All content, id order
    async fn list_content(&self) -> AppResult<Vec<Content>>;

    async fn count_content(&self) -> AppResult<i64>;

    /// Content whose id is in `ids`, id order. Unknown ids are ignored.
    async fn content_by_ids(&self, ids: &[i64]) -> AppResult<Vec<Content>>;

    /// Highest rated content first, ties by id
    async fn top_rated(&self, limit: usize) -> AppResult<Vec<Content>>;

    /// Appends a watch edge. Both ids must exist.
    async fn record_watch(
        &self,
        user_id: i64,
        content_id: i64,
        rating: Option<f64>,
    ) -> AppResult<WatchEdge>;

    /// Watch edges for a user in the order they were recorded
    async fn watch_history(&self, user_id: i64) -> AppResult<Vec<WatchEdge>>;
}
