use crate::{
    error::{AppError, AppResult},
    models::{ContentType, NewContent, NewUser},
};

use super::Repository;

/// What a seeding run inserted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub users: usize,
    pub content: usize,
    pub watches: usize,
}

pub fn sample_users() -> Vec<NewUser> {
    vec![
        NewUser::new("user1", "user1@example.com").with_password("password1"),
        NewUser::new("user2", "user2@example.com").with_password("password2"),
    ]
}

pub fn sample_content() -> Vec<NewContent> {
    let entry = |title: &str,
                 description: &str,
                 content_type: ContentType,
                 genre: &str,
                 release_year: i32,
                 rating: f64| NewContent {
        title: title.to_string(),
        description: description.to_string(),
        content_type,
        genre: genre.to_string(),
        release_year,
        rating,
    };

    vec![
        entry(
            "The Matrix",
            "A computer hacker learns about the true nature of reality",
            ContentType::Movie,
            "Action,Sci-Fi",
            1999,
            8.7,
        ),
        entry(
            "Inception",
            "A thief who steals corporate secrets through dream-sharing technology",
            ContentType::Movie,
            "Action,Sci-Fi,Thriller",
            2010,
            8.8,
        ),
        entry(
            "Breaking Bad",
            "A high school chemistry teacher turned methamphetamine manufacturer",
            ContentType::Series,
            "Drama,Crime,Thriller",
            2008,
            9.5,
        ),
        entry(
            "Stranger Things",
            "When a young boy vanishes, a small town uncovers a mystery",
            ContentType::Series,
            "Drama,Fantasy,Horror",
            2016,
            8.7,
        ),
    ]
}

/// (username, title) pairs recorded as watched
pub const SAMPLE_WATCHES: [(&str, &str); 2] = [("user1", "The Matrix"), ("user1", "Inception")];

/// Inserts the sample catalogue, users and watch history.
///
/// Runs against whatever repository it is given; callers wanting
/// all-or-nothing semantics pass a transactional one.
pub async fn seed(repo: &dyn Repository) -> AppResult<SeedSummary> {
    let mut users = Vec::new();
    for user in sample_users() {
        users.push(repo.create_user(user).await?);
    }

    let mut content = Vec::new();
    for item in sample_content() {
        content.push(repo.create_content(item).await?);
    }

    for (username, title) in SAMPLE_WATCHES {
        let user = users
            .iter()
            .find(|u| u.username == username)
            .ok_or_else(|| AppError::Internal(format!("sample user {username} missing")))?;
        let item = content
            .iter()
            .find(|c| c.title == title)
            .ok_or_else(|| AppError::Internal(format!("sample content {title} missing")))?;
        repo.record_watch(user.id, item.id, None).await?;
    }

    tracing::info!(
        users = users.len(),
        content = content.len(),
        watches = SAMPLE_WATCHES.len(),
        "Sample data inserted"
    );

    Ok(SeedSummary {
        users: users.len(),
        content: content.len(),
        watches: SAMPLE_WATCHES.len(),
    })
}
