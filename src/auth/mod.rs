//! Shared-token authentication.

pub mod tokens;

pub use tokens::TokenStore;

/// Cookie carrying the session token set by `/api/login`.
pub const TOKEN_COOKIE: &str = "kj_token";
