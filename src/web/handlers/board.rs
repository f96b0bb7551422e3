//! Board and membership handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::board::{BoardUpdate, NewBoard};
use crate::web::dto::{
    AddMemberRequest, ApiResponse, BoardDetailResponse, BoardListQuery, BoardResponse,
    CreateBoardRequest, MemberResponse, UpdateBoardRequest, UpdateMemberRequest, ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::{AuthUser, OptionalAuthUser};

/// Empty strings clear an optional markdown field.
fn clearable(value: Option<String>) -> Option<Option<String>> {
    value.map(|v| if v.trim().is_empty() { None } else { Some(v) })
}

/// GET /api/boards - Boards the viewer may see, newest first.
#[utoipa::path(
    get,
    path = "/api/boards",
    tag = "boards",
    params(BoardListQuery),
    responses((status = 200, description = "Board index", body = Vec<BoardResponse>))
)]
pub async fn list_boards(
    State(state): State<Arc<AppState>>,
    auth: OptionalAuthUser,
    Query(query): Query<BoardListQuery>,
) -> Result<Json<ApiResponse<Vec<BoardResponse>>>, ApiError> {
    let limit = query
        .limit
        .unwrap_or(state.forum.board_index_limit)
        .clamp(1, state.forum.board_index_limit.max(1));

    let boards = state.service().list_boards(auth.viewer(), limit).await?;
    Ok(Json(ApiResponse::new(
        boards.iter().map(BoardResponse::from).collect(),
    )))
}

/// POST /api/boards - Create a board owned by the caller.
#[utoipa::path(
    post,
    path = "/api/boards",
    tag = "boards",
    request_body = CreateBoardRequest,
    responses(
        (status = 201, description = "Board created", body = BoardDetailResponse),
        (status = 401, description = "Unauthorized"),
        (status = 422, description = "Validation failed")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_board(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    ValidatedJson(req): ValidatedJson<CreateBoardRequest>,
) -> Result<(StatusCode, Json<ApiResponse<BoardDetailResponse>>), ApiError> {
    let mut new_board = NewBoard::new(req.title.trim()).with_visibility(req.visibility);
    if let Some(description) = req.description.filter(|d| !d.trim().is_empty()) {
        new_board = new_board.with_description(description);
    }
    if let Some(content) = req.content.filter(|c| !c.trim().is_empty()) {
        new_board = new_board.with_content(content);
    }

    let service = state.service();
    let board = service.create_board(claims.viewer(), &new_board).await?;
    let standing = service.standing(claims.viewer(), board.id).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(BoardDetailResponse::new(&board, standing))),
    ))
}

/// GET /api/boards/:board_id - Board page.
#[utoipa::path(
    get,
    path = "/api/boards/{board_id}",
    tag = "boards",
    params(("board_id" = i64, Path, description = "Board ID")),
    responses(
        (status = 200, description = "Board", body = BoardDetailResponse),
        (status = 404, description = "Board not found")
    )
)]
pub async fn get_board(
    State(state): State<Arc<AppState>>,
    auth: OptionalAuthUser,
    Path(board_id): Path<i64>,
) -> Result<Json<ApiResponse<BoardDetailResponse>>, ApiError> {
    let (board, standing) = state.service().get_board(auth.viewer(), board_id).await?;
    Ok(Json(ApiResponse::new(BoardDetailResponse::new(
        &board, standing,
    ))))
}

/// PATCH /api/boards/:board_id - Edit board settings.
#[utoipa::path(
    patch,
    path = "/api/boards/{board_id}",
    tag = "boards",
    params(("board_id" = i64, Path, description = "Board ID")),
    request_body = UpdateBoardRequest,
    responses(
        (status = 200, description = "Board updated", body = BoardDetailResponse),
        (status = 403, description = "Not a board admin"),
        (status = 404, description = "Board not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_board(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path(board_id): Path<i64>,
    ValidatedJson(req): ValidatedJson<UpdateBoardRequest>,
) -> Result<Json<ApiResponse<BoardDetailResponse>>, ApiError> {
    let update = BoardUpdate {
        title: req.title.map(|t| t.trim().to_string()),
        description: clearable(req.description),
        content: clearable(req.content),
        visibility: req.visibility,
    };

    let service = state.service();
    let board = service
        .update_board(claims.viewer(), board_id, &update)
        .await?;
    let standing = service.standing(claims.viewer(), board_id).await?;

    Ok(Json(ApiResponse::new(BoardDetailResponse::new(
        &board, standing,
    ))))
}

/// DELETE /api/boards/:board_id - Delete a board and everything in it.
#[utoipa::path(
    delete,
    path = "/api/boards/{board_id}",
    tag = "boards",
    params(("board_id" = i64, Path, description = "Board ID")),
    responses(
        (status = 204, description = "Board deleted"),
        (status = 403, description = "Not the board owner"),
        (status = 404, description = "Board not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_board(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path(board_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state
        .service()
        .delete_board(claims.viewer(), board_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/boards/:board_id/members - Board members, owners first.
#[utoipa::path(
    get,
    path = "/api/boards/{board_id}/members",
    tag = "members",
    params(("board_id" = i64, Path, description = "Board ID")),
    responses(
        (status = 200, description = "Members", body = Vec<MemberResponse>),
        (status = 404, description = "Board not found")
    )
)]
pub async fn list_members(
    State(state): State<Arc<AppState>>,
    auth: OptionalAuthUser,
    Path(board_id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<MemberResponse>>>, ApiError> {
    let members = state
        .service()
        .list_members(auth.viewer(), board_id)
        .await?;
    Ok(Json(ApiResponse::new(
        members.iter().map(MemberResponse::from).collect(),
    )))
}

/// POST /api/boards/:board_id/members - Add a member.
#[utoipa::path(
    post,
    path = "/api/boards/{board_id}/members",
    tag = "members",
    params(("board_id" = i64, Path, description = "Board ID")),
    request_body = AddMemberRequest,
    responses(
        (status = 201, description = "Member added", body = MemberResponse),
        (status = 403, description = "Not allowed to manage members"),
        (status = 404, description = "Board or user not found"),
        (status = 409, description = "Already a member")
    ),
    security(("bearer_auth" = []))
)]
pub async fn add_member(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path(board_id): Path<i64>,
    Json(req): Json<AddMemberRequest>,
) -> Result<(StatusCode, Json<ApiResponse<MemberResponse>>), ApiError> {
    let member = state
        .service()
        .add_member(claims.viewer(), board_id, req.user_id, req.role)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(MemberResponse::from(&member))),
    ))
}

/// PATCH /api/boards/:board_id/members/:user_id - Change a member's role.
#[utoipa::path(
    patch,
    path = "/api/boards/{board_id}/members/{user_id}",
    tag = "members",
    params(
        ("board_id" = i64, Path, description = "Board ID"),
        ("user_id" = i64, Path, description = "Member's user ID")
    ),
    request_body = UpdateMemberRequest,
    responses(
        (status = 200, description = "Role changed", body = MemberResponse),
        (status = 403, description = "Not allowed to change this role"),
        (status = 404, description = "Board or membership not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_member(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path((board_id, user_id)): Path<(i64, i64)>,
    Json(req): Json<UpdateMemberRequest>,
) -> Result<Json<ApiResponse<MemberResponse>>, ApiError> {
    let member = state
        .service()
        .set_member_role(claims.viewer(), board_id, user_id, req.role)
        .await?;
    Ok(Json(ApiResponse::new(MemberResponse::from(&member))))
}

/// DELETE /api/boards/:board_id/members/:user_id - Remove a member, or leave.
#[utoipa::path(
    delete,
    path = "/api/boards/{board_id}/members/{user_id}",
    tag = "members",
    params(
        ("board_id" = i64, Path, description = "Board ID"),
        ("user_id" = i64, Path, description = "Member's user ID")
    ),
    responses(
        (status = 204, description = "Member removed"),
        (status = 403, description = "Not allowed to remove this member"),
        (status = 404, description = "Board or membership not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn remove_member(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path((board_id, user_id)): Path<(i64, i64)>,
) -> Result<StatusCode, ApiError> {
    state
        .service()
        .remove_member(claims.viewer(), board_id, user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
