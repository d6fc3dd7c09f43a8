//! Encore Auth Core - Access-key authentication and token issuance
//!
//! Core authentication functionality for a listening session: turning a
//! shared access key into a daily-rotating, client-verifiable credential,
//! memoizing the expensive derivation, and minting role-scoped session
//! tokens for admins and friends.

pub mod cache;
pub mod config;
pub mod error;
pub mod key;
pub mod service;
pub mod token;

pub use cache::HashCache;
pub use config::AuthConfig;
pub use error::AuthError;
pub use key::{current_salt, derive_key_hash, normalize_key, salt_at};
pub use service::AuthService;
pub use token::{SessionToken, TokenClaims, TokenIssuer};
