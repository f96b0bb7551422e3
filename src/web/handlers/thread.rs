//! Thread, post, comment and roll handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::board::{Pagination, ThreadUpdate};
use crate::web::dto::{
    ApiResponse, CommentResponse, ContentRequest, CreateRollRequest, CreateThreadRequest,
    PaginatedResponse, PaginationQuery, PostResponse, RollResponse, ThreadDetailResponse,
    ThreadResponse, UpdateThreadRequest, ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::{AuthUser, OptionalAuthUser};

// ============================================================================
// Threads
// ============================================================================

/// GET /api/boards/:board_id/threads - Threads in a board, newest first.
#[utoipa::path(
    get,
    path = "/api/boards/{board_id}/threads",
    tag = "threads",
    params(
        ("board_id" = i64, Path, description = "Board ID"),
        PaginationQuery
    ),
    responses(
        (status = 200, description = "Threads", body = Vec<ThreadResponse>),
        (status = 404, description = "Board not found")
    )
)]
pub async fn list_threads(
    State(state): State<Arc<AppState>>,
    auth: OptionalAuthUser,
    Path(board_id): Path<i64>,
    Query(query): Query<PaginationQuery>,
) -> Result<Json<PaginatedResponse<ThreadResponse>>, ApiError> {
    let (page, per_page) = query.resolve(state.forum.threads_per_page);
    let (offset, limit) = query.to_offset_limit(state.forum.threads_per_page);

    let result = state
        .service()
        .list_threads(auth.viewer(), board_id, Pagination::new(offset, limit))
        .await?;

    Ok(Json(PaginatedResponse::new(
        result.items.iter().map(ThreadResponse::from).collect(),
        page,
        per_page,
        result.total,
    )))
}

/// POST /api/boards/:board_id/threads - Start a thread.
#[utoipa::path(
    post,
    path = "/api/boards/{board_id}/threads",
    tag = "threads",
    params(("board_id" = i64, Path, description = "Board ID")),
    request_body = CreateThreadRequest,
    responses(
        (status = 201, description = "Thread created", body = ThreadResponse),
        (status = 403, description = "Cannot post on this board"),
        (status = 404, description = "Board not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_thread(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path(board_id): Path<i64>,
    ValidatedJson(req): ValidatedJson<CreateThreadRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ThreadResponse>>), ApiError> {
    let thread = state
        .service()
        .create_thread(
            claims.viewer(),
            board_id,
            &req.title,
            &req.content,
            req.readonly,
        )
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(ThreadResponse::from(&thread))),
    ))
}

/// GET /api/boards/:board_id/threads/:thread_id - Thread with its posts.
#[utoipa::path(
    get,
    path = "/api/boards/{board_id}/threads/{thread_id}",
    tag = "threads",
    params(
        ("board_id" = i64, Path, description = "Board ID"),
        ("thread_id" = i64, Path, description = "Thread ID")
    ),
    responses(
        (status = 200, description = "Thread", body = ThreadDetailResponse),
        (status = 404, description = "Board or thread not found")
    )
)]
pub async fn get_thread(
    State(state): State<Arc<AppState>>,
    auth: OptionalAuthUser,
    Path((board_id, thread_id)): Path<(i64, i64)>,
) -> Result<Json<ApiResponse<ThreadDetailResponse>>, ApiError> {
    let service = state.service();
    let viewer = auth.viewer();
    let thread = service.get_thread(viewer, board_id, thread_id).await?;
    let posts = service.list_posts(viewer, board_id, thread_id).await?;

    Ok(Json(ApiResponse::new(ThreadDetailResponse {
        thread: ThreadResponse::from(&thread),
        posts: posts.iter().map(PostResponse::from).collect(),
    })))
}

/// PATCH /api/boards/:board_id/threads/:thread_id - Edit a thread.
#[utoipa::path(
    patch,
    path = "/api/boards/{board_id}/threads/{thread_id}",
    tag = "threads",
    params(
        ("board_id" = i64, Path, description = "Board ID"),
        ("thread_id" = i64, Path, description = "Thread ID")
    ),
    request_body = UpdateThreadRequest,
    responses(
        (status = 200, description = "Thread updated", body = ThreadResponse),
        (status = 403, description = "Not the author or a board admin"),
        (status = 404, description = "Board or thread not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_thread(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path((board_id, thread_id)): Path<(i64, i64)>,
    ValidatedJson(req): ValidatedJson<UpdateThreadRequest>,
) -> Result<Json<ApiResponse<ThreadResponse>>, ApiError> {
    let update = ThreadUpdate {
        title: req.title.map(|t| t.trim().to_string()),
        content: req.content,
        readonly: req.readonly,
    };

    let thread = state
        .service()
        .update_thread(claims.viewer(), board_id, thread_id, &update)
        .await?;
    Ok(Json(ApiResponse::new(ThreadResponse::from(&thread))))
}

/// DELETE /api/boards/:board_id/threads/:thread_id - Delete a thread.
#[utoipa::path(
    delete,
    path = "/api/boards/{board_id}/threads/{thread_id}",
    tag = "threads",
    params(
        ("board_id" = i64, Path, description = "Board ID"),
        ("thread_id" = i64, Path, description = "Thread ID")
    ),
    responses(
        (status = 204, description = "Thread deleted"),
        (status = 403, description = "Not the author or a board admin"),
        (status = 404, description = "Board or thread not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_thread(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path((board_id, thread_id)): Path<(i64, i64)>,
) -> Result<StatusCode, ApiError> {
    state
        .service()
        .delete_thread(claims.viewer(), board_id, thread_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Posts
// ============================================================================

/// GET /api/boards/:board_id/threads/:thread_id/posts - Posts, oldest first.
#[utoipa::path(
    get,
    path = "/api/boards/{board_id}/threads/{thread_id}/posts",
    tag = "posts",
    params(
        ("board_id" = i64, Path, description = "Board ID"),
        ("thread_id" = i64, Path, description = "Thread ID")
    ),
    responses(
        (status = 200, description = "Posts", body = Vec<PostResponse>),
        (status = 404, description = "Board or thread not found")
    )
)]
pub async fn list_posts(
    State(state): State<Arc<AppState>>,
    auth: OptionalAuthUser,
    Path((board_id, thread_id)): Path<(i64, i64)>,
) -> Result<Json<ApiResponse<Vec<PostResponse>>>, ApiError> {
    let posts = state
        .service()
        .list_posts(auth.viewer(), board_id, thread_id)
        .await?;
    Ok(Json(ApiResponse::new(
        posts.iter().map(PostResponse::from).collect(),
    )))
}

/// POST /api/boards/:board_id/threads/:thread_id/posts - Reply to a thread.
#[utoipa::path(
    post,
    path = "/api/boards/{board_id}/threads/{thread_id}/posts",
    tag = "posts",
    params(
        ("board_id" = i64, Path, description = "Board ID"),
        ("thread_id" = i64, Path, description = "Thread ID")
    ),
    request_body = ContentRequest,
    responses(
        (status = 201, description = "Post created", body = PostResponse),
        (status = 403, description = "Cannot post here, or the thread is read-only"),
        (status = 404, description = "Board or thread not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_post(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path((board_id, thread_id)): Path<(i64, i64)>,
    ValidatedJson(req): ValidatedJson<ContentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<PostResponse>>), ApiError> {
    let post = state
        .service()
        .create_post(claims.viewer(), board_id, thread_id, &req.content)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(PostResponse::from(&post))),
    ))
}

/// PATCH /api/boards/:board_id/threads/:thread_id/posts/:post_id - Edit a post.
#[utoipa::path(
    patch,
    path = "/api/boards/{board_id}/threads/{thread_id}/posts/{post_id}",
    tag = "posts",
    params(
        ("board_id" = i64, Path, description = "Board ID"),
        ("thread_id" = i64, Path, description = "Thread ID"),
        ("post_id" = i64, Path, description = "Post ID")
    ),
    request_body = ContentRequest,
    responses(
        (status = 200, description = "Post updated", body = PostResponse),
        (status = 403, description = "Not the author or a board admin"),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_post(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path((board_id, thread_id, post_id)): Path<(i64, i64, i64)>,
    ValidatedJson(req): ValidatedJson<ContentRequest>,
) -> Result<Json<ApiResponse<PostResponse>>, ApiError> {
    let post = state
        .service()
        .update_post(claims.viewer(), board_id, thread_id, post_id, &req.content)
        .await?;
    Ok(Json(ApiResponse::new(PostResponse::from(&post))))
}

/// DELETE /api/boards/:board_id/threads/:thread_id/posts/:post_id - Delete a post.
#[utoipa::path(
    delete,
    path = "/api/boards/{board_id}/threads/{thread_id}/posts/{post_id}",
    tag = "posts",
    params(
        ("board_id" = i64, Path, description = "Board ID"),
        ("thread_id" = i64, Path, description = "Thread ID"),
        ("post_id" = i64, Path, description = "Post ID")
    ),
    responses(
        (status = 204, description = "Post deleted"),
        (status = 403, description = "Not the author or a board admin"),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_post(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path((board_id, thread_id, post_id)): Path<(i64, i64, i64)>,
) -> Result<StatusCode, ApiError> {
    state
        .service()
        .delete_post(claims.viewer(), board_id, thread_id, post_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Comments
// ============================================================================

/// POST .../posts/:post_id/comments - Comment on a post.
#[utoipa::path(
    post,
    path = "/api/boards/{board_id}/threads/{thread_id}/posts/{post_id}/comments",
    tag = "comments",
    params(
        ("board_id" = i64, Path, description = "Board ID"),
        ("thread_id" = i64, Path, description = "Thread ID"),
        ("post_id" = i64, Path, description = "Post ID")
    ),
    request_body = ContentRequest,
    responses(
        (status = 201, description = "Comment created", body = CommentResponse),
        (status = 403, description = "Cannot comment here, or the thread is read-only"),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_comment(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path((board_id, thread_id, post_id)): Path<(i64, i64, i64)>,
    ValidatedJson(req): ValidatedJson<ContentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CommentResponse>>), ApiError> {
    let comment = state
        .service()
        .create_comment(claims.viewer(), board_id, thread_id, post_id, &req.content)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(CommentResponse::from(&comment))),
    ))
}

/// PATCH .../comments/:comment_id - Edit a comment.
#[utoipa::path(
    patch,
    path = "/api/boards/{board_id}/threads/{thread_id}/posts/{post_id}/comments/{comment_id}",
    tag = "comments",
    params(
        ("board_id" = i64, Path, description = "Board ID"),
        ("thread_id" = i64, Path, description = "Thread ID"),
        ("post_id" = i64, Path, description = "Post ID"),
        ("comment_id" = i64, Path, description = "Comment ID")
    ),
    request_body = ContentRequest,
    responses(
        (status = 200, description = "Comment updated", body = CommentResponse),
        (status = 403, description = "Not the author or a board admin"),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_comment(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path((board_id, thread_id, post_id, comment_id)): Path<(i64, i64, i64, i64)>,
    ValidatedJson(req): ValidatedJson<ContentRequest>,
) -> Result<Json<ApiResponse<CommentResponse>>, ApiError> {
    let comment = state
        .service()
        .update_comment(
            claims.viewer(),
            board_id,
            thread_id,
            post_id,
            comment_id,
            &req.content,
        )
        .await?;
    Ok(Json(ApiResponse::new(CommentResponse::from(&comment))))
}

/// DELETE .../comments/:comment_id - Delete a comment.
#[utoipa::path(
    delete,
    path = "/api/boards/{board_id}/threads/{thread_id}/posts/{post_id}/comments/{comment_id}",
    tag = "comments",
    params(
        ("board_id" = i64, Path, description = "Board ID"),
        ("thread_id" = i64, Path, description = "Thread ID"),
        ("post_id" = i64, Path, description = "Post ID"),
        ("comment_id" = i64, Path, description = "Comment ID")
    ),
    responses(
        (status = 204, description = "Comment deleted"),
        (status = 403, description = "Not the author or a board admin"),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_comment(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path((board_id, thread_id, post_id, comment_id)): Path<(i64, i64, i64, i64)>,
) -> Result<StatusCode, ApiError> {
    state
        .service()
        .delete_comment(claims.viewer(), board_id, thread_id, post_id, comment_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Dice rolls
// ============================================================================

/// GET .../posts/:post_id/rolls - Rolls made on a post.
#[utoipa::path(
    get,
    path = "/api/boards/{board_id}/threads/{thread_id}/posts/{post_id}/rolls",
    tag = "rolls",
    params(
        ("board_id" = i64, Path, description = "Board ID"),
        ("thread_id" = i64, Path, description = "Thread ID"),
        ("post_id" = i64, Path, description = "Post ID")
    ),
    responses(
        (status = 200, description = "Rolls", body = Vec<RollResponse>),
        (status = 404, description = "Not found")
    )
)]
pub async fn list_rolls(
    State(state): State<Arc<AppState>>,
    auth: OptionalAuthUser,
    Path((board_id, thread_id, post_id)): Path<(i64, i64, i64)>,
) -> Result<Json<ApiResponse<Vec<RollResponse>>>, ApiError> {
    let rolls = state
        .service()
        .list_rolls(auth.viewer(), board_id, thread_id, post_id)
        .await?;
    Ok(Json(ApiResponse::new(
        rolls.iter().map(RollResponse::from).collect(),
    )))
}

/// POST .../posts/:post_id/rolls - Roll dice on one's own post.
#[utoipa::path(
    post,
    path = "/api/boards/{board_id}/threads/{thread_id}/posts/{post_id}/rolls",
    tag = "rolls",
    params(
        ("board_id" = i64, Path, description = "Board ID"),
        ("thread_id" = i64, Path, description = "Thread ID"),
        ("post_id" = i64, Path, description = "Post ID")
    ),
    request_body = CreateRollRequest,
    responses(
        (status = 201, description = "Dice rolled", body = RollResponse),
        (status = 403, description = "Not the post author, or the thread is read-only"),
        (status = 404, description = "Not found"),
        (status = 422, description = "Invalid dice expression")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_roll(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path((board_id, thread_id, post_id)): Path<(i64, i64, i64)>,
    ValidatedJson(req): ValidatedJson<CreateRollRequest>,
) -> Result<(StatusCode, Json<ApiResponse<RollResponse>>), ApiError> {
    let (roll, outcome) = state
        .service()
        .create_roll(
            claims.viewer(),
            board_id,
            thread_id,
            post_id,
            &req.roll,
            req.label.as_deref(),
        )
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(RollResponse::with_outcome(&roll, outcome))),
    ))
}
