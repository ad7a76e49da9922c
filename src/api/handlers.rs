use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{AppError, AppResult};
use crate::middleware::RequestId;
use crate::models::{Content, ContentType, NewContent, NewUser, User};

use super::AppState;

// Request/Response types

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ContentResponse {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub content_type: ContentType,
    pub genre: String,
    pub release_year: i32,
    pub rating: f64,
}

impl From<Content> for ContentResponse {
    fn from(content: Content) -> Self {
        Self {
            id: content.id,
            title: content.title,
            description: content.description,
            content_type: content.content_type,
            genre: content.genre,
            release_year: content.release_year,
            rating: content.rating,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct WatchedResponse {
    pub content: ContentResponse,
    pub rating: Option<f64>,
    pub watched_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct WatchQuery {
    pub rating: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct RecommendationQuery {
    pub limit: Option<usize>,
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Create a new user
pub async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<NewUser>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    request.validate()?;
    let user = state.repo.create_user(request).await?;
    tracing::info!(user_id = user.id, username = %user.username, "User created");
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// Get a user by id
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> AppResult<Json<UserResponse>> {
    let user = state
        .repo
        .find_user(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {user_id} not found")))?;
    Ok(Json(UserResponse::from(user)))
}

/// Create a new content item
pub async fn create_content(
    State(state): State<AppState>,
    Json(request): Json<NewContent>,
) -> AppResult<(StatusCode, Json<ContentResponse>)> {
    request.validate()?;
    let content = state.repo.create_content(request).await?;
    tracing::info!(content_id = content.id, title = %content.title, "Content created");
    Ok((StatusCode::CREATED, Json(ContentResponse::from(content))))
}

/// List the whole catalogue
pub async fn list_content(State(state): State<AppState>) -> AppResult<Json<Vec<ContentResponse>>> {
    let content = state.repo.list_content().await?;
    Ok(Json(content.into_iter().map(ContentResponse::from).collect()))
}

/// Get a content item by id
pub async fn get_content(
    State(state): State<AppState>,
    Path(content_id): Path<i64>,
) -> AppResult<Json<ContentResponse>> {
    let content = state
        .repo
        .find_content(content_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Content {content_id} not found")))?;
    Ok(Json(ContentResponse::from(content)))
}

/// Record that a user watched a content item
pub async fn mark_content_watched(
    State(state): State<AppState>,
    Path((user_id, content_id)): Path<(i64, i64)>,
    Query(query): Query<WatchQuery>,
) -> AppResult<Json<Value>> {
    if query.rating.is_some_and(|r| !r.is_finite()) {
        return Err(AppError::InvalidInput(
            "rating must be a finite number".to_string(),
        ));
    }

    let user = state.repo.find_user(user_id).await?;
    let content = state.repo.find_content(content_id).await?;
    if user.is_none() || content.is_none() {
        return Err(AppError::NotFound("User or content not found".to_string()));
    }

    state
        .repo
        .record_watch(user_id, content_id, query.rating)
        .await?;
    tracing::info!(user_id, content_id, rating = ?query.rating, "Content marked as watched");

    Ok(Json(json!({ "message": "Content marked as watched" })))
}

/// Watch history of a user, oldest first
pub async fn watch_history(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> AppResult<Json<Vec<WatchedResponse>>> {
    if state.repo.find_user(user_id).await?.is_none() {
        return Err(AppError::NotFound(format!("User {user_id} not found")));
    }

    let edges = state.repo.watch_history(user_id).await?;
    let ids: Vec<i64> = edges.iter().map(|e| e.content_id).collect();
    let content = state.repo.content_by_ids(&ids).await?;

    let history = edges
        .into_iter()
        .filter_map(|edge| {
            let item = content.iter().find(|c| c.id == edge.content_id)?;
            Some(WatchedResponse {
                content: ContentResponse::from(item.clone()),
                rating: edge.rating,
                watched_at: edge.watched_at,
            })
        })
        .collect();

    Ok(Json(history))
}

/// Recommendations for a user, best rated first
pub async fn get_recommendations(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(user_id): Path<i64>,
    Query(query): Query<RecommendationQuery>,
) -> AppResult<Json<Vec<ContentResponse>>> {
    let limit = query.limit.unwrap_or(state.default_recommendations);
    if limit == 0 {
        return Err(AppError::InvalidInput(
            "limit must be greater than zero".to_string(),
        ));
    }

    tracing::info!(
        request_id = %request_id,
        user_id,
        limit,
        "Processing recommendation request"
    );

    let items = state
        .recommender
        .recommend(state.repo.as_ref(), user_id, limit)
        .await?;

    tracing::info!(
        request_id = %request_id,
        returned = items.len(),
        "Recommendations generated"
    );

    Ok(Json(items.into_iter().map(ContentResponse::from).collect()))
}
