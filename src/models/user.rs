use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// A registered viewer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    /// Credential placeholder, never serialized
    #[serde(skip_serializing, default)]
    pub hashed_password: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields accepted when creating a user
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    /// Only set by the seed tool; the HTTP API has no password handling
    #[serde(skip)]
    pub hashed_password: Option<String>,
}

impl NewUser {
    pub fn new(username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            hashed_password: None,
        }
    }

    pub fn with_password(mut self, hashed_password: impl Into<String>) -> Self {
        self.hashed_password = Some(hashed_password.into());
        self
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.username.trim().is_empty() {
            return Err(AppError::InvalidInput("username must not be empty".to_string()));
        }
        if self.email.trim().is_empty() {
            return Err(AppError::InvalidInput("email must not be empty".to_string()));
        }
        Ok(())
    }
}
