//! Authentication module for Agora.
//!
//! This module provides password hashing, input validation, user
//! registration and login.

mod password;
mod registration;
pub mod validation;

pub use password::{hash_password, verify_password, verify_password_hash, PasswordError};
pub use registration::{authenticate, register, AuthSubject, RegistrationRequest};
pub use validation::ValidationError;
