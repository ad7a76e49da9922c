use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use serde_json::{json, Value};

use watchlist_api::api::{create_router, AppState, ContentResponse};
use watchlist_api::services::ClusterParams;

fn create_test_server() -> TestServer {
    create_test_server_with(ClusterParams::default())
}

fn create_test_server_with(params: ClusterParams) -> TestServer {
    let state = AppState::in_memory(params);
    let app = create_router(state);
    TestServer::new(app).unwrap()
}

async fn create_user(server: &TestServer, username: &str) -> i64 {
    let response = server
        .post("/users/")
        .json(&json!({
            "username": username,
            "email": format!("{username}@example.com")
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()["id"].as_i64().unwrap()
}

async fn create_content(
    server: &TestServer,
    title: &str,
    content_type: &str,
    genre: &str,
    release_year: i32,
    rating: f64,
) -> i64 {
    let response = server
        .post("/content/")
        .json(&json!({
            "title": title,
            "description": format!("About {title}"),
            "content_type": content_type,
            "genre": genre,
            "release_year": release_year,
            "rating": rating
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()["id"].as_i64().unwrap()
}

/// The Matrix, Inception, Breaking Bad, Stranger Things, in that order
async fn create_catalogue(server: &TestServer) -> Vec<i64> {
    vec![
        create_content(server, "The Matrix", "movie", "Action,Sci-Fi", 1999, 8.7).await,
        create_content(server, "Inception", "movie", "Action,Sci-Fi,Thriller", 2010, 8.8).await,
        create_content(server, "Breaking Bad", "series", "Drama,Crime,Thriller", 2008, 9.5).await,
        create_content(server, "Stranger Things", "series", "Drama,Fantasy,Horror", 2016, 8.7)
            .await,
    ]
}

fn titles(items: &[ContentResponse]) -> Vec<&str> {
    items.iter().map(|c| c.title.as_str()).collect()
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server();
    let response = server.get("/health").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["status"], "healthy");
}

#[tokio::test]
async fn test_create_and_get_user() {
    let server = create_test_server();

    let response = server
        .post("/users/")
        .json(&json!({
            "username": "user1",
            "email": "user1@example.com"
        }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let created: Value = response.json();
    assert_eq!(created["username"], "user1");
    assert_eq!(created["email"], "user1@example.com");
    assert!(created.get("hashed_password").is_none());

    let id = created["id"].as_i64().unwrap();
    let response = server.get(&format!("/users/{id}")).await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["username"], "user1");
}

#[tokio::test]
async fn test_duplicate_username_conflicts() {
    let server = create_test_server();
    create_user(&server, "user1").await;

    let response = server
        .post("/users")
        .json(&json!({
            "username": "user1",
            "email": "someone-else@example.com"
        }))
        .await;
    response.assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_create_content_echoes_record() {
    let server = create_test_server();

    let response = server
        .post("/content/")
        .json(&json!({
            "title": "The Matrix",
            "description": "A computer hacker learns about the true nature of reality",
            "content_type": "movie",
            "genre": "Action,Sci-Fi",
            "release_year": 1999,
            "rating": 8.7
        }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let created: ContentResponse = response.json();
    assert_eq!(created.id, 1);
    assert_eq!(created.title, "The Matrix");
    assert_eq!(created.genre, "Action,Sci-Fi");
    assert_eq!(created.rating, 8.7);

    let response = server.get("/content/1").await;
    response.assert_status_ok();
    assert_eq!(response.json::<ContentResponse>(), created);

    let listed: Vec<ContentResponse> = server.get("/content").await.json();
    assert_eq!(listed.len(), 1);
}

#[tokio::test]
async fn test_unknown_content_is_not_found() {
    let server = create_test_server();
    let response = server.get("/content/7").await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["error"], "Content 7 not found");
}

#[tokio::test]
async fn test_watch_with_missing_ids_is_not_found() {
    let server = create_test_server();
    let user_id = create_user(&server, "user1").await;

    let response = server
        .post(&format!("/users/{user_id}/watch/99"))
        .add_query_param("rating", 4.5)
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["error"], "User or content not found");

    let content_id = create_content(&server, "Inception", "movie", "Action", 2010, 8.8).await;
    let response = server
        .post(&format!("/users/42/watch/{content_id}"))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_watching_twice_records_two_edges() {
    let server = create_test_server();
    let user_id = create_user(&server, "user1").await;
    let content_id = create_content(&server, "Inception", "movie", "Action", 2010, 8.8).await;

    for rating in [4.0, 5.0] {
        let response = server
            .post(&format!("/users/{user_id}/watch/{content_id}"))
            .add_query_param("rating", rating)
            .await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["message"], "Content marked as watched");
    }

    let history: Vec<Value> = server
        .get(&format!("/users/{user_id}/watched"))
        .await
        .json();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0]["content"]["title"], "Inception");
    assert_eq!(history[0]["rating"], 4.0);
    assert_eq!(history[1]["rating"], 5.0);
}

#[tokio::test]
async fn test_new_user_gets_top_rated_content() {
    let server = create_test_server();
    create_catalogue(&server).await;
    let user_id = create_user(&server, "newcomer").await;

    let response = server
        .get(&format!("/users/{user_id}/recommendations"))
        .await;
    response.assert_status_ok();

    let items: Vec<ContentResponse> = response.json();
    assert_eq!(
        titles(&items),
        vec!["Breaking Bad", "Inception", "The Matrix", "Stranger Things"]
    );
}

#[tokio::test]
async fn test_recommendations_respect_limit() {
    let server = create_test_server();
    create_catalogue(&server).await;
    let user_id = create_user(&server, "newcomer").await;

    let items: Vec<ContentResponse> = server
        .get(&format!("/users/{user_id}/recommendations"))
        .add_query_param("limit", 2)
        .await
        .json();
    assert_eq!(titles(&items), vec!["Breaking Bad", "Inception"]);

    let response = server
        .get(&format!("/users/{user_id}/recommendations"))
        .add_query_param("limit", 0)
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_limit_beyond_i64_returns_whole_catalogue() {
    let server = create_test_server();
    create_content(&server, "The Matrix", "movie", "Action,Sci-Fi", 1999, 8.7).await;
    create_content(&server, "Breaking Bad", "series", "Drama,Crime", 2008, 9.5).await;
    let user_id = create_user(&server, "newcomer").await;

    let response = server
        .get(&format!("/users/{user_id}/recommendations"))
        .add_query_param("limit", "9223372036854775808")
        .await;
    response.assert_status_ok();

    let items: Vec<ContentResponse> = response.json();
    assert_eq!(titles(&items), vec!["Breaking Bad", "The Matrix"]);
}

#[tokio::test]
async fn test_recommendations_exclude_watched_content() {
    let server = create_test_server_with(ClusterParams {
        n_clusters: 1,
        seed: 42,
    });
    let ids = create_catalogue(&server).await;
    let user_id = create_user(&server, "user1").await;

    for content_id in &ids[..2] {
        server
            .post(&format!("/users/{user_id}/watch/{content_id}"))
            .await
            .assert_status_ok();
    }

    let items: Vec<ContentResponse> = server
        .get(&format!("/users/{user_id}/recommendations"))
        .await
        .json();

    assert_eq!(titles(&items), vec!["Breaking Bad", "Stranger Things"]);
    assert!(items.iter().all(|c| !ids[..2].contains(&c.id)));
}

#[tokio::test]
async fn test_content_added_later_is_recommended() {
    let server = create_test_server_with(ClusterParams {
        n_clusters: 1,
        seed: 42,
    });
    let ids = create_catalogue(&server).await;
    let user_id = create_user(&server, "user1").await;
    server
        .post(&format!("/users/{user_id}/watch/{}", ids[2]))
        .await
        .assert_status_ok();

    let before: Vec<ContentResponse> = server
        .get(&format!("/users/{user_id}/recommendations"))
        .await
        .json();
    assert_eq!(before.len(), 3);

    create_content(&server, "Arrival", "movie", "Drama,Sci-Fi", 2016, 9.9).await;

    let after: Vec<ContentResponse> = server
        .get(&format!("/users/{user_id}/recommendations"))
        .await
        .json();
    assert_eq!(after.len(), 4);
    assert_eq!(after[0].title, "Arrival");
}

#[tokio::test]
async fn test_recommendations_for_unknown_user_is_not_found() {
    let server = create_test_server();
    let response = server.get("/users/5/recommendations").await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let server = create_test_server();
    let request_id = "3f1c8f5e-8d1b-4e57-9a55-0c1c4a7f2b10";

    let response = server
        .get("/health")
        .add_header(
            HeaderName::from_static("x-request-id"),
            HeaderValue::from_static(request_id),
        )
        .await;
    response.assert_status_ok();
    assert_eq!(response.header("x-request-id"), request_id);
}
