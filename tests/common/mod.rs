//! Test helpers for Web API integration tests.
//!
//! Each test gets its own in-memory database behind a fully layered router.

#![allow(dead_code)]

use std::sync::Arc;

use axum::http::header::AUTHORIZATION;
use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};

use agora::config::ForumConfig;
use agora::web::handlers::AppState;
use agora::web::middleware::{JwtState, LoginRateLimit};
use agora::web::router::create_router;
use agora::Database;

/// Secret used to sign test tokens.
pub const TEST_SECRET: &str = "test-secret-key-for-testing-only";

/// A password that passes validation.
pub const TEST_PASSWORD: &str = "password123";

/// Create a test server with an in-memory database.
pub async fn create_test_server() -> (TestServer, Database) {
    create_test_server_with_login_limit(1000, false).await
}

/// Create a test server with a specific login rate limit.
pub async fn create_test_server_with_login_limit(
    per_minute: u32,
    trust_forwarded_for: bool,
) -> (TestServer, Database) {
    let db = Database::open_in_memory()
        .await
        .expect("Failed to create test database");

    let app_state = Arc::new(AppState::new(
        db.clone(),
        TEST_SECRET,
        900,
        ForumConfig::default(),
    ));
    let jwt_state = Arc::new(JwtState::new(TEST_SECRET));
    let login_limit = Arc::new(LoginRateLimit::new(per_minute, trust_forwarded_for));

    let router = create_router(app_state, jwt_state, login_limit, &[]);
    let server = TestServer::new(router).expect("Failed to create test server");

    (server, db)
}

/// A registered test account.
pub struct TestUser {
    pub id: i64,
    pub token: String,
}

impl TestUser {
    /// Value for the Authorization header.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

/// Register a user named `name` with `name@example.com`.
pub async fn register_user(server: &TestServer, name: &str) -> TestUser {
    let response = server
        .post("/api/auth/register")
        .json(&json!({
            "display_name": name,
            "email": format!("{name}@example.com"),
            "password": TEST_PASSWORD
        }))
        .await;
    response.assert_status(StatusCode::CREATED);

    let body: Value = response.json();
    TestUser {
        id: body["data"]["user"]["id"].as_i64().expect("user id"),
        token: body["data"]["access_token"]
            .as_str()
            .expect("access token")
            .to_string(),
    }
}

/// Create a board and return its id.
pub async fn create_board(
    server: &TestServer,
    user: &TestUser,
    title: &str,
    visibility: &str,
) -> i64 {
    let response = server
        .post("/api/boards")
        .add_header(AUTHORIZATION, user.bearer())
        .json(&json!({ "title": title, "visibility": visibility }))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()["data"]["id"]
        .as_i64()
        .expect("board id")
}

/// Create a thread and return its id.
pub async fn create_thread(
    server: &TestServer,
    user: &TestUser,
    board_id: i64,
    title: &str,
    readonly: bool,
) -> i64 {
    let response = server
        .post(&format!("/api/boards/{board_id}/threads"))
        .add_header(AUTHORIZATION, user.bearer())
        .json(&json!({ "title": title, "content": "opening words", "readonly": readonly }))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()["data"]["id"]
        .as_i64()
        .expect("thread id")
}

/// Create a post and return its id.
pub async fn create_post(
    server: &TestServer,
    user: &TestUser,
    board_id: i64,
    thread_id: i64,
    content: &str,
) -> i64 {
    let response = server
        .post(&format!("/api/boards/{board_id}/threads/{thread_id}/posts"))
        .add_header(AUTHORIZATION, user.bearer())
        .json(&json!({ "content": content }))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()["data"]["id"]
        .as_i64()
        .expect("post id")
}

/// Add `member` to a board with `role`.
pub async fn add_member(
    server: &TestServer,
    owner: &TestUser,
    board_id: i64,
    member: &TestUser,
    role: &str,
) {
    server
        .post(&format!("/api/boards/{board_id}/members"))
        .add_header(AUTHORIZATION, owner.bearer())
        .json(&json!({ "user_id": member.id, "role": role }))
        .await
        .assert_status(StatusCode::CREATED);
}
