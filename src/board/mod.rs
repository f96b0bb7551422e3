//! Board module for Agora.
//!
//! This module provides the forum content tree and its access rules:
//! - Boards with a visibility tier and per-board member roles
//! - Threads, posts, comments and dice roll results
//! - Pure access predicates over (visibility, standing)
//! - A service layer that checks permissions and containment

mod comment_repository;
mod member;
mod member_repository;
pub mod policy;
mod post;
mod post_repository;
mod repository;
mod service;
mod thread;
mod thread_repository;
mod types;

pub use comment_repository::{CommentRepository, RollRepository};
pub use member::{BoardMember, MemberInfo};
pub use member_repository::MemberRepository;
pub use policy::{can_administer, can_list, can_moderate, can_post, can_view, Standing};
pub use post::{Comment, NewComment, NewPost, NewRollResult, Post, RollResult};
pub use post_repository::PostRepository;
pub use repository::BoardRepository;
pub use service::{
    BoardService, PaginatedResult, Pagination, PostView, Viewer, MAX_BODY_LENGTH,
    MAX_LABEL_LENGTH, MAX_TITLE_LENGTH,
};
pub use thread::{NewThread, Thread, ThreadUpdate};
pub use thread_repository::ThreadRepository;
pub use types::{Board, BoardUpdate, MemberRole, NewBoard, Visibility};
