//! API handlers.

pub mod auth;
pub mod board;
pub mod thread;

pub use auth::*;
pub use board::*;
pub use thread::*;

use jsonwebtoken::{encode, EncodingKey, Header};

use crate::auth::AuthSubject;
use crate::board::BoardService;
use crate::config::ForumConfig;
use crate::web::error::ApiError;
use crate::web::middleware::JwtClaims;
use crate::Database;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database handle; the pool inside is shared.
    pub db: Database,
    /// JWT encoding key.
    pub encoding_key: EncodingKey,
    /// Session token lifetime in seconds.
    pub token_expiry: u64,
    /// Listing limits.
    pub forum: ForumConfig,
}

impl AppState {
    /// Create a new application state.
    pub fn new(db: Database, jwt_secret: &str, token_expiry: u64, forum: ForumConfig) -> Self {
        Self {
            db,
            encoding_key: EncodingKey::from_secret(jwt_secret.as_bytes()),
            token_expiry,
            forum,
        }
    }

    /// Board service over this state's database.
    pub fn service(&self) -> BoardService<'_> {
        BoardService::new(&self.db)
    }

    /// Sign a session token for a subject.
    pub fn issue_token(&self, subject: &AuthSubject) -> Result<String, ApiError> {
        let claims = JwtClaims::for_subject(subject, self.token_expiry);
        encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to encode JWT: {}", e);
            ApiError::internal("Failed to generate token")
        })
    }
}
