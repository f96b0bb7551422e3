//! Router configuration for Web API.

use axum::{
    extract::State,
    middleware,
    routing::{get, patch, post},
    Json, Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};
use utoipa::OpenApi;

use super::dto::HealthResponse;
use super::error::ApiError;
use super::handlers::{
    add_member, create_board, create_comment, create_post, create_roll, create_thread,
    delete_board, delete_comment, delete_post, delete_thread, get_board, get_thread,
    list_boards, list_members, list_posts, list_rolls, list_threads, login, me, register,
    remove_member, update_board, update_comment, update_member, update_post, update_thread,
    AppState,
};
use super::middleware::{
    create_cors_layer, jwt_auth, login_rate_limit, security_headers, JwtState, LoginRateLimit,
};
use super::openapi::ApiDoc;

/// Create the main API router.
pub fn create_router(
    app_state: Arc<AppState>,
    jwt_state: Arc<JwtState>,
    login_limit: Arc<LoginRateLimit>,
    cors_origins: &[String],
) -> Router {
    // Login is the only route behind the per-address limiter.
    let login_routes = Router::new()
        .route("/login", post(login))
        .route_layer(middleware::from_fn(move |req, next| {
            let limit = login_limit.clone();
            login_rate_limit(limit, req, next)
        }));

    let auth_routes = Router::new()
        .route("/register", post(register))
        .route("/me", get(me))
        .merge(login_routes);

    let board_routes = Router::new()
        .route("/", get(list_boards).post(create_board))
        .route(
            "/:board_id",
            get(get_board).patch(update_board).delete(delete_board),
        )
        .route("/:board_id/members", get(list_members).post(add_member))
        .route(
            "/:board_id/members/:user_id",
            patch(update_member).delete(remove_member),
        )
        .route(
            "/:board_id/threads",
            get(list_threads).post(create_thread),
        )
        .route(
            "/:board_id/threads/:thread_id",
            get(get_thread).patch(update_thread).delete(delete_thread),
        )
        .route(
            "/:board_id/threads/:thread_id/posts",
            get(list_posts).post(create_post),
        )
        .route(
            "/:board_id/threads/:thread_id/posts/:post_id",
            patch(update_post).delete(delete_post),
        )
        .route(
            "/:board_id/threads/:thread_id/posts/:post_id/comments",
            post(create_comment),
        )
        .route(
            "/:board_id/threads/:thread_id/posts/:post_id/comments/:comment_id",
            patch(update_comment).delete(delete_comment),
        )
        .route(
            "/:board_id/threads/:thread_id/posts/:post_id/rolls",
            get(list_rolls).post(create_roll),
        );

    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/boards", board_routes)
        .route("/openapi.json", get(openapi_json));

    Router::new()
        .nest("/api", api_routes)
        .route("/health", get(health_check))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins))
                .layer(middleware::from_fn(security_headers))
                .layer(middleware::from_fn(move |req, next| {
                    let state = jwt_state.clone();
                    jwt_auth(state, req, next)
                })),
        )
        .layer(CompressionLayer::new())
        .with_state(app_state)
}

/// GET /health - Liveness check that also pings the database.
async fn health_check(
    State(state): State<Arc<AppState>>,
) -> Result<Json<HealthResponse>, ApiError> {
    sqlx::query("SELECT 1")
        .execute(state.db.pool())
        .await
        .map_err(|e| {
            tracing::error!("Health check failed: {}", e);
            ApiError::internal("Database unavailable")
        })?;

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}

/// GET /api/openapi.json - Machine-readable API description.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
