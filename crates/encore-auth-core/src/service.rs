//! Access verification service - ties together key derivation, caching, and
//! token issuance
//!
//! This is the surface the HTTP layer calls: hand it the raw credentials from
//! a join or admin-login request and get back either a signed session token
//! or a typed rejection.

use subtle::ConstantTimeEq;

use crate::{
    cache::HashCache,
    config::AuthConfig,
    key::{current_salt, derive_key_hash, normalize_key},
    token::{SessionToken, TokenClaims, TokenIssuer},
    AuthError,
};

/// Authentication service
///
/// Provides unified interface for:
/// - Friend access verification (shared key → daily hash comparison)
/// - Admin access verification (configured portal password)
/// - Bearer token validation on subsequent requests
pub struct AuthService {
    config: AuthConfig,
    token_issuer: TokenIssuer,
    hash_cache: HashCache,
}

impl AuthService {
    /// Create a new auth service.
    ///
    /// # Errors
    /// Returns [`AuthError::Configuration`] if the token secret is shorter
    /// than 32 bytes.
    pub fn new(config: AuthConfig) -> Result<Self, AuthError> {
        let token_issuer = TokenIssuer::new(
            config.token_secret.as_bytes(),
            config.admin_token_duration,
            config.friend_token_duration,
        )?;

        Ok(Self {
            config,
            token_issuer,
            hash_cache: HashCache::new(),
        })
    }

    // =========================================================================
    // Access Verification
    // =========================================================================

    /// Verify a guest's access key and mint a friend token on success.
    ///
    /// The client submits both the raw key and its own derivation of the
    /// hash; the server recomputes (or fetches the cached) expected hash for
    /// today's salt and requires an exact match. The comparison input is
    /// itself a derivation output rather than a raw secret, so plain
    /// equality is sufficient here. A mismatch reveals nothing about which
    /// stage diverged.
    pub fn verify_friend_access(
        &self,
        raw_key: &str,
        client_hash: &str,
        session_id: &str,
    ) -> Result<SessionToken, AuthError> {
        let normalized = normalize_key(raw_key);
        let salt = current_salt();

        let expected = self
            .hash_cache
            .get_or_compute(&normalized, &salt, derive_key_hash)?;

        if expected != client_hash {
            tracing::debug!(%session_id, "access key hash mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        self.token_issuer.issue_friend_token(session_id)
    }

    /// Verify the admin portal password and mint an admin token on success.
    ///
    /// Compared in constant time against the configured password; no caching
    /// is involved given the low call volume.
    pub fn verify_admin_access(&self, password: &str) -> Result<SessionToken, AuthError> {
        let matches: bool = password
            .as_bytes()
            .ct_eq(self.config.admin_password.as_bytes())
            .into();

        if !matches {
            tracing::debug!("admin password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        self.token_issuer.issue_admin_token()
    }

    // =========================================================================
    // Token Validation
    // =========================================================================

    /// Validate a bearer token from a subsequent request
    pub fn validate_token(&self, token: &str) -> Result<TokenClaims, AuthError> {
        self.token_issuer.validate(token)
    }

    // =========================================================================
    // Diagnostics
    // =========================================================================

    /// Number of memoized key hashes (current plus stale days)
    pub fn cached_hash_count(&self) -> usize {
        self.hash_cache.entry_count()
    }
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("cached_hashes", &self.hash_cache.entry_count())
            .finish_non_exhaustive()
    }
}
