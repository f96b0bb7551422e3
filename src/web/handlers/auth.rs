//! Authentication handlers.
//!
//! Sessions are stateless bearer tokens, so there is no logout endpoint;
//! clients discard the token.

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::auth::{self, AuthSubject, RegistrationRequest};
use crate::db::{User, UserRepository};
use crate::web::dto::{
    ApiResponse, LoginRequest, RegisterRequest, TokenResponse, UserResponse, ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::AuthUser;
use crate::ForumError;

fn token_response(state: &AppState, user: &User) -> Result<TokenResponse, ApiError> {
    let access_token = state.issue_token(&AuthSubject::from(user))?;
    Ok(TokenResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: state.token_expiry,
        user: UserResponse::from(user),
    })
}

/// POST /api/auth/register - Create an account and sign in.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = TokenResponse),
        (status = 409, description = "Display name or email already taken"),
        (status = 422, description = "Validation failed")
    )
)]
pub async fn register(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<TokenResponse>>), ApiError> {
    let mut request = RegistrationRequest::new(req.display_name, req.email, req.password);
    if let Some(confirm) = req.confirm_password {
        request = request.with_confirmation(confirm);
    }

    let user = auth::register(&UserRepository::new(state.db.pool()), request).await?;
    let response = token_response(&state, &user)?;

    Ok((StatusCode::CREATED, Json(ApiResponse::new(response))))
}

/// POST /api/auth/login - Sign in with email and password.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = TokenResponse),
        (status = 401, description = "Invalid email or password"),
        (status = 429, description = "Too many attempts")
    )
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<Json<ApiResponse<TokenResponse>>, ApiError> {
    let repo = UserRepository::new(state.db.pool());
    let (user, _) = auth::authenticate(&repo, &req.email, &req.password)
        .await
        .map_err(|e| match e {
            // Unknown email and wrong password look the same from outside.
            ForumError::NotFound(_) | ForumError::InvalidCredentials => {
                ApiError::unauthorized("Invalid email or password")
            }
            other => ApiError::from(other),
        })?;

    Ok(Json(ApiResponse::new(token_response(&state, &user)?)))
}

/// GET /api/auth/me - The signed-in user.
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "auth",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = []))
)]
pub async fn me(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let user = UserRepository::new(state.db.pool())
        .get_by_id(claims.sub)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Account no longer exists"))?;

    Ok(Json(ApiResponse::new(UserResponse::from(&user))))
}
