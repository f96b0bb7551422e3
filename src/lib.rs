//! Agora - discussion boards with threads, posts, comments and dice rolls.
//!
//! Boards carry a visibility tier and a per-board membership with roles;
//! every read and write goes through [`board::BoardService`], which applies
//! the access policy before touching the store.

pub mod auth;
pub mod board;
pub mod config;
pub mod datetime;
pub mod db;
pub mod dice;
pub mod error;
pub mod logging;
pub mod markdown;
pub mod web;

pub use auth::{authenticate, hash_password, register, verify_password, AuthSubject};
pub use board::{
    Board, BoardService, Comment, MemberRole, Post, RollResult, Standing, Thread, Viewer,
    Visibility,
};
pub use config::Config;
pub use db::{Database, NewUser, User, UserRepository};
pub use dice::{DiceError, RollOutcome};
pub use error::{ForumError, Result};
