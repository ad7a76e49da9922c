use chrono::Utc;
use tokio::sync::RwLock;

use crate::{
    error::{AppError, AppResult},
    models::{Content, NewContent, NewUser, User, WatchEdge},
};

use super::Repository;

/// Process-local repository used by tests and database-less runs.
///
/// Ids are assigned sequentially from 1, matching a fresh `BIGSERIAL`.
#[derive(Default)]
pub struct InMemoryRepository {
    inner: RwLock<Tables>,
}

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    content: Vec<Content>,
    watches: Vec<WatchEdge>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl Repository for InMemoryRepository {
    async fn create_user(&self, user: NewUser) -> AppResult<User> {
        let mut tables = self.inner.write().await;

        if tables
            .users
            .iter()
            .any(|u| u.username == user.username || u.email == user.email)
        {
            return Err(AppError::Conflict(
                "username or email already registered".to_string(),
            ));
        }

        let created = User {
            id: tables.users.len() as i64 + 1,
            username: user.username,
            email: user.email,
            hashed_password: user.hashed_password,
            created_at: Utc::now(),
        };
        tables.users.push(created.clone());
        Ok(created)
    }

    async fn find_user(&self, user_id: i64) -> AppResult<Option<User>> {
        let tables = self.inner.read().await;
        Ok(tables.users.iter().find(|u| u.id == user_id).cloned())
    }

    async fn create_content(&self, content: NewContent) -> AppResult<Content> {
        let mut tables = self.inner.write().await;
        let created = Content {
            id: tables.content.len() as i64 + 1,
            title: content.title,
            description: content.description,
            content_type: content.content_type,
            genre: content.genre,
            release_year: content.release_year,
            rating: content.rating,
            created_at: Utc::now(),
        };
        tables.content.push(created.clone());
        Ok(created)
    }

    async fn find_content(&self, content_id: i64) -> AppResult<Option<Content>> {
        let tables = self.inner.read().await;
        Ok(tables.content.iter().find(|c| c.id == content_id).cloned())
    }

    async fn list_content(&self) -> AppResult<Vec<Content>> {
        Ok(self.inner.read().await.content.clone())
    }

    async fn count_content(&self) -> AppResult<i64> {
        Ok(self.inner.read().await.content.len() as i64)
    }

    async fn content_by_ids(&self, ids: &[i64]) -> AppResult<Vec<Content>> {
        let tables = self.inner.read().await;
        Ok(tables
            .content
            .iter()
            .filter(|c| ids.contains(&c.id))
            .cloned()
            .collect())
    }

    async fn top_rated(&self, limit: usize) -> AppResult<Vec<Content>> {
        let mut content = self.inner.read().await.content.clone();
        // sort_by is stable, so equal ratings stay in id order
        content.sort_by(|a, b| b.rating.total_cmp(&a.rating));
        content.truncate(limit);
        Ok(content)
    }

    async fn record_watch(
        &self,
        user_id: i64,
        content_id: i64,
        rating: Option<f64>,
    ) -> AppResult<WatchEdge> {
        let mut tables = self.inner.write().await;

        let user_exists = tables.users.iter().any(|u| u.id == user_id);
        let content_exists = tables.content.iter().any(|c| c.id == content_id);
        if !user_exists || !content_exists {
            return Err(AppError::NotFound("User or content not found".to_string()));
        }

        let edge = WatchEdge {
            user_id,
            content_id,
            rating,
            watched_at: Utc::now(),
        };
        tables.watches.push(edge.clone());
        Ok(edge)
    }

    async fn watch_history(&self, user_id: i64) -> AppResult<Vec<WatchEdge>> {
        let tables = self.inner.read().await;
        Ok(tables
            .watches
            .iter()
            .filter(|w| w.user_id == user_id)
            .cloned()
            .collect())
    }
}
