//! OpenAPI document for the HTTP API.

use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

use super::dto::{
    BoardDetailResponse, BoardResponse, CommentResponse, HealthResponse, MemberResponse,
    PaginationMeta, PostResponse, RollResponse, ThreadDetailResponse, ThreadResponse,
    TokenResponse, UserResponse,
};
use super::handlers;

#[derive(OpenApi)]
#[openapi(
    info(title = "Agora API", description = "Discussion boards with threads, posts, comments and dice rolls"),
    paths(
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::me,
        handlers::board::list_boards,
        handlers::board::create_board,
        handlers::board::get_board,
        handlers::board::update_board,
        handlers::board::delete_board,
        handlers::board::list_members,
        handlers::board::add_member,
        handlers::board::update_member,
        handlers::board::remove_member,
        handlers::thread::list_threads,
        handlers::thread::create_thread,
        handlers::thread::get_thread,
        handlers::thread::update_thread,
        handlers::thread::delete_thread,
        handlers::thread::list_posts,
        handlers::thread::create_post,
        handlers::thread::update_post,
        handlers::thread::delete_post,
        handlers::thread::create_comment,
        handlers::thread::update_comment,
        handlers::thread::delete_comment,
        handlers::thread::list_rolls,
        handlers::thread::create_roll,
    ),
    components(schemas(
        UserResponse,
        TokenResponse,
        BoardResponse,
        BoardDetailResponse,
        MemberResponse,
        ThreadResponse,
        ThreadDetailResponse,
        PostResponse,
        CommentResponse,
        RollResponse,
        PaginationMeta,
        HealthResponse,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Registration and sign-in"),
        (name = "boards", description = "Boards"),
        (name = "members", description = "Board membership"),
        (name = "threads", description = "Threads"),
        (name = "posts", description = "Posts"),
        (name = "comments", description = "Comments on posts"),
        (name = "rolls", description = "Dice rolls on posts"),
    )
)]
pub struct ApiDoc;

/// Registers the bearer scheme referenced by `security(("bearer_auth" = []))`.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_routes() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/boards"));
        assert!(doc
            .paths
            .paths
            .contains_key("/api/boards/{board_id}/threads/{thread_id}/posts/{post_id}/rolls"));
    }

    #[test]
    fn test_bearer_scheme_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.unwrap();
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
