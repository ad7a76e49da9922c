use sqlx::{
    postgres::{PgExecutor, PgPoolOptions},
    PgPool, Postgres, Transaction,
};
use tokio::sync::Mutex;

use crate::{
    error::{AppError, AppResult},
    models::{Content, NewContent, NewUser, User, WatchEdge},
};

use super::Repository;

/// Creates a PostgreSQL connection pool
///
/// Each request borrows one connection for the duration of its queries.
pub async fn create_pool(database_url: &str, max_connections: u32) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Applies the embedded schema migrations
pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

const CONTENT_COLUMNS: &str =
    "id, title, description, content_type, genre, release_year, rating, created_at";

/// Repository backed by a connection pool
#[derive(Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Starts a transaction exposed through the same `Repository` interface
    pub async fn begin(&self) -> AppResult<PgTransactionRepository> {
        let tx = self.pool.begin().await?;
        Ok(PgTransactionRepository { tx: Mutex::new(tx) })
    }
}

/// Repository whose writes stay invisible until `commit`
pub struct PgTransactionRepository {
    tx: Mutex<Transaction<'static, Postgres>>,
}

impl PgTransactionRepository {
    pub async fn commit(self) -> AppResult<()> {
        self.tx.into_inner().commit().await?;
        Ok(())
    }

    pub async fn rollback(self) -> AppResult<()> {
        self.tx.into_inner().rollback().await?;
        Ok(())
    }
}

fn unique_violation(err: sqlx::Error) -> AppError {
    match err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::Conflict("username or email already registered".to_string())
        }
        other => AppError::Database(other),
    }
}

fn foreign_key_violation(err: sqlx::Error) -> AppError {
    match err {
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
            AppError::NotFound("User or content not found".to_string())
        }
        other => AppError::Database(other),
    }
}

async fn insert_user<'e, E: PgExecutor<'e>>(executor: E, user: NewUser) -> AppResult<User> {
    sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (username, email, hashed_password)
        VALUES ($1, $2, $3)
        RETURNING id, username, email, hashed_password, created_at
        "#,
    )
    .bind(user.username)
    .bind(user.email)
    .bind(user.hashed_password)
    .fetch_one(executor)
    .await
    .map_err(unique_violation)
}

async fn select_user<'e, E: PgExecutor<'e>>(executor: E, user_id: i64) -> AppResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, username, email, hashed_password, created_at FROM users WHERE id = $1",
    )
    .bind(user_id)
    .fetch_optional(executor)
    .await?;
    Ok(user)
}

async fn insert_content<'e, E: PgExecutor<'e>>(
    executor: E,
    content: NewContent,
) -> AppResult<Content> {
    let sql = format!(
        r#"
        INSERT INTO content (title, description, content_type, genre, release_year, rating)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING {CONTENT_COLUMNS}
        "#
    );
    let created = sqlx::query_as::<_, Content>(&sql)
        .bind(content.title)
        .bind(content.description)
        .bind(content.content_type.as_str())
        .bind(content.genre)
        .bind(content.release_year)
        .bind(content.rating)
        .fetch_one(executor)
        .await?;
    Ok(created)
}

async fn select_content<'e, E: PgExecutor<'e>>(
    executor: E,
    content_id: i64,
) -> AppResult<Option<Content>> {
    let sql = format!("SELECT {CONTENT_COLUMNS} FROM content WHERE id = $1");
    let content = sqlx::query_as::<_, Content>(&sql)
        .bind(content_id)
        .fetch_optional(executor)
        .await?;
    Ok(content)
}

async fn select_all_content<'e, E: PgExecutor<'e>>(executor: E) -> AppResult<Vec<Content>> {
    let sql = format!("SELECT {CONTENT_COLUMNS} FROM content ORDER BY id");
    let content = sqlx::query_as::<_, Content>(&sql).fetch_all(executor).await?;
    Ok(content)
}

async fn count_all_content<'e, E: PgExecutor<'e>>(executor: E) -> AppResult<i64> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM content")
        .fetch_one(executor)
        .await?;
    Ok(count)
}

async fn select_content_by_ids<'e, E: PgExecutor<'e>>(
    executor: E,
    ids: &[i64],
) -> AppResult<Vec<Content>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let sql = format!("SELECT {CONTENT_COLUMNS} FROM content WHERE id = ANY($1) ORDER BY id");
    let content = sqlx::query_as::<_, Content>(&sql)
        .bind(ids)
        .fetch_all(executor)
        .await?;
    Ok(content)
}

async fn select_top_rated<'e, E: PgExecutor<'e>>(
    executor: E,
    limit: usize,
) -> AppResult<Vec<Content>> {
    // LIMIT is a BIGINT; anything larger means "all rows"
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    let sql =
        format!("SELECT {CONTENT_COLUMNS} FROM content ORDER BY rating DESC, id ASC LIMIT $1");
    let content = sqlx::query_as::<_, Content>(&sql)
        .bind(limit)
        .fetch_all(executor)
        .await?;
    Ok(content)
}

async fn insert_watch<'e, E: PgExecutor<'e>>(
    executor: E,
    user_id: i64,
    content_id: i64,
    rating: Option<f64>,
) -> AppResult<WatchEdge> {
    sqlx::query_as::<_, WatchEdge>(
        r#"
        INSERT INTO user_content_association (user_id, content_id, rating)
        VALUES ($1, $2, $3)
        RETURNING user_id, content_id, rating, watched_at
        "#,
    )
    .bind(user_id)
    .bind(content_id)
    .bind(rating)
    .fetch_one(executor)
    .await
    .map_err(foreign_key_violation)
}

async fn select_watch_history<'e, E: PgExecutor<'e>>(
    executor: E,
    user_id: i64,
) -> AppResult<Vec<WatchEdge>> {
    let edges = sqlx::query_as::<_, WatchEdge>(
        r#"
        SELECT user_id, content_id, rating, watched_at
        FROM user_content_association
        WHERE user_id = $1
        ORDER BY id
        "#,
    )
    .bind(user_id)
    .fetch_all(executor)
    .await?;
    Ok(edges)
}

#[async_trait::async_trait]
impl Repository for PgRepository {
    async fn create_user(&self, user: NewUser) -> AppResult<User> {
        insert_user(&self.pool, user).await
    }

    async fn find_user(&self, user_id: i64) -> AppResult<Option<User>> {
        select_user(&self.pool, user_id).await
    }

    async fn create_content(&self, content: NewContent) -> AppResult<Content> {
        insert_content(&self.pool, content).await
    }

    async fn find_content(&self, content_id: i64) -> AppResult<Option<Content>> {
        select_content(&self.pool, content_id).await
    }

    async fn list_content(&self) -> AppResult<Vec<Content>> {
        select_all_content(&self.pool).await
    }

    async fn count_content(&self) -> AppResult<i64> {
        count_all_content(&self.pool).await
    }

    async fn content_by_ids(&self, ids: &[i64]) -> AppResult<Vec<Content>> {
        select_content_by_ids(&self.pool, ids).await
    }

    async fn top_rated(&self, limit: usize) -> AppResult<Vec<Content>> {
        select_top_rated(&self.pool, limit).await
    }

    async fn record_watch(
        &self,
        user_id: i64,
        content_id: i64,
        rating: Option<f64>,
    ) -> AppResult<WatchEdge> {
        insert_watch(&self.pool, user_id, content_id, rating).await
    }

    async fn watch_history(&self, user_id: i64) -> AppResult<Vec<WatchEdge>> {
        select_watch_history(&self.pool, user_id).await
    }
}

#[async_trait::async_trait]
impl Repository for PgTransactionRepository {
    async fn create_user(&self, user: NewUser) -> AppResult<User> {
        let mut tx = self.tx.lock().await;
        insert_user(&mut **tx, user).await
    }

    async fn find_user(&self, user_id: i64) -> AppResult<Option<User>> {
        let mut tx = self.tx.lock().await;
        select_user(&mut **tx, user_id).await
    }

    async fn create_content(&self, content: NewContent) -> AppResult<Content> {
        let mut tx = self.tx.lock().await;
        insert_content(&mut **tx, content).await
    }

    async fn find_content(&self, content_id: i64) -> AppResult<Option<Content>> {
        let mut tx = self.tx.lock().await;
        select_content(&mut **tx, content_id).await
    }

    async fn list_content(&self) -> AppResult<Vec<Content>> {
        let mut tx = self.tx.lock().await;
        select_all_content(&mut **tx).await
    }

    async fn count_content(&self) -> AppResult<i64> {
        let mut tx = self.tx.lock().await;
        count_all_content(&mut **tx).await
    }

    async fn content_by_ids(&self, ids: &[i64]) -> AppResult<Vec<Content>> {
        let mut tx = self.tx.lock().await;
        select_content_by_ids(&mut **tx, ids).await
    }

    async fn top_rated(&self, limit: usize) -> AppResult<Vec<Content>> {
        let mut tx = self.tx.lock().await;
        select_top_rated(&mut **tx, limit).await
    }

    async fn record_watch(
        &self,
        user_id: i64,
        content_id: i64,
        rating: Option<f64>,
    ) -> AppResult<WatchEdge> {
        let mut tx = self.tx.lock().await;
        insert_watch(&mut **tx, user_id, content_id, rating).await
    }

    async fn watch_history(&self, user_id: i64) -> AppResult<Vec<WatchEdge>> {
        let mut tx = self.tx.lock().await;
        select_watch_history(&mut **tx, user_id).await
    }
}
