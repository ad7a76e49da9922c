use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Kind of catalogue entry
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Movie,
    Series,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Movie => "movie",
            ContentType::Series => "series",
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown content type: {0}")]
pub struct UnknownContentType(pub String);

impl TryFrom<String> for ContentType {
    type Error = UnknownContentType;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "movie" => Ok(ContentType::Movie),
            "series" => Ok(ContentType::Series),
            _ => Err(UnknownContentType(value)),
        }
    }
}

/// A movie or series stored in the catalogue
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct Content {
    pub id: i64,
    pub title: String,
    pub description: String,
    #[sqlx(try_from = "String")]
    pub content_type: ContentType,
    /// Comma-separated genre tags, e.g. "Action,Sci-Fi"
    pub genre: String,
    pub release_year: i32,
    pub rating: f64,
    pub created_at: DateTime<Utc>,
}

impl Content {
    /// Genre tags exactly as stored, split on commas
    pub fn genres(&self) -> impl Iterator<Item = &str> {
        self.genre.split(',')
    }
}

/// Fields accepted when creating content
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewContent {
    pub title: String,
    pub description: String,
    pub content_type: ContentType,
    pub genre: String,
    pub release_year: i32,
    pub rating: f64,
}

impl NewContent {
    pub fn validate(&self) -> AppResult<()> {
        if self.title.trim().is_empty() {
            return Err(AppError::InvalidInput("title must not be empty".to_string()));
        }
        if !self.rating.is_finite() {
            return Err(AppError::InvalidInput(
                "rating must be a finite number".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inception() -> Content {
        Content {
            id: 2,
            title: "Inception".to_string(),
            description: "Dream-sharing heist".to_string(),
            content_type: ContentType::Movie,
            genre: "Action,Sci-Fi,Thriller".to_string(),
            release_year: 2010,
            rating: 8.8,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_content_type_serialization() {
        assert_eq!(serde_json::to_string(&ContentType::Movie).unwrap(), "\"movie\"");
        assert_eq!(serde_json::to_string(&ContentType::Series).unwrap(), "\"series\"");

        let parsed: ContentType = serde_json::from_str("\"series\"").unwrap();
        assert_eq!(parsed, ContentType::Series);
        assert!(serde_json::from_str::<ContentType>("\"podcast\"").is_err());
    }

    #[test]
    fn test_content_type_from_column() {
        assert_eq!(ContentType::try_from("movie".to_string()).unwrap(), ContentType::Movie);
        let err = ContentType::try_from("Movie".to_string()).unwrap_err();
        assert_eq!(err.to_string(), "unknown content type: Movie");
    }

    #[test]
    fn test_genres_split_without_trimming() {
        let mut content = inception();
        assert_eq!(content.genres().collect::<Vec<_>>(), vec!["Action", "Sci-Fi", "Thriller"]);

        content.genre = "Drama, Crime".to_string();
        assert_eq!(content.genres().collect::<Vec<_>>(), vec!["Drama", " Crime"]);
    }

    #[test]
    fn test_validate_rejects_non_finite_rating() {
        let mut new_content = NewContent {
            title: "Inception".to_string(),
            description: String::new(),
            content_type: ContentType::Movie,
            genre: "Action".to_string(),
            release_year: 2010,
            rating: 8.8,
        };
        assert!(new_content.validate().is_ok());

        new_content.rating = f64::NAN;
        assert!(matches!(new_content.validate(), Err(AppError::InvalidInput(_))));
    }
}
