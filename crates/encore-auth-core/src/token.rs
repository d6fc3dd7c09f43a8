//! Signed session tokens with role-scoped lifetimes
//!
//! Tokens are compact `payload.signature` strings: URL-safe base64 of the
//! JSON claims, then URL-safe base64 of an HMAC-SHA256 over that payload.
//! They are self-verifying; the server keeps no record of issued tokens, so
//! expiry is the only revocation and rotating the signing secret invalidates
//! everything outstanding.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::sync::Arc;
use std::time::Duration;
use subtle::ConstantTimeEq;

use crate::AuthError;
use encore_types::Role;

/// Claims carried by a session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Privilege level
    pub role: Role,
    /// Listening session the credential is bound to (friend tokens only;
    /// admin privilege is session-global)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// Issue timestamp (epoch milliseconds)
    pub issued: i64,
    /// Expiration timestamp (epoch milliseconds)
    pub expires: i64,
}

impl TokenClaims {
    fn new(role: Role, session_id: Option<String>, duration: Duration) -> Self {
        let issued = Utc::now().timestamp_millis();
        let expires = issued + duration.as_millis() as i64;
        Self {
            role,
            session_id,
            issued,
            expires,
        }
    }

    /// Check if the claims are past their expiry
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp_millis() > self.expires
    }
}

/// A signed, self-contained bearer credential
#[derive(Debug, Clone)]
pub struct SessionToken {
    token: String,
    claims: TokenClaims,
}

impl SessionToken {
    /// The compact string form, suitable for a response body or bearer header
    pub fn as_str(&self) -> &str {
        &self.token
    }

    /// Consume the token, returning the compact string form
    pub fn into_string(self) -> String {
        self.token
    }

    /// The claims this token was minted with
    pub fn claims(&self) -> &TokenClaims {
        &self.claims
    }
}

impl std::fmt::Display for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.token)
    }
}

/// Pre-validated HMAC signing key.
///
/// Validated once at construction so signing can never fail afterwards.
#[derive(Clone)]
struct SigningKey {
    key_bytes: Arc<[u8]>,
}

impl SigningKey {
    /// Minimum allowed secret length in bytes (256 bits)
    const MIN_SECRET_LENGTH: usize = 32;

    fn new(secret: &[u8]) -> Result<Self, AuthError> {
        if secret.len() < Self::MIN_SECRET_LENGTH {
            return Err(AuthError::Configuration(format!(
                "token secret too short: got {} bytes, need at least {}",
                secret.len(),
                Self::MIN_SECRET_LENGTH
            )));
        }
        Ok(Self {
            key_bytes: Arc::from(secret),
        })
    }

    fn sign(&self, data: &[u8]) -> [u8; 32] {
        let mut mac = Hmac::<Sha256>::new_from_slice(&self.key_bytes)
            .expect("HMAC accepts any validated key length");
        mac.update(data);
        mac.finalize().into_bytes().into()
    }
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKey")
            .field("key_length", &self.key_bytes.len())
            .finish_non_exhaustive()
    }
}

/// Mints and validates session tokens
#[derive(Debug, Clone)]
pub struct TokenIssuer {
    signing_key: SigningKey,
    admin_token_duration: Duration,
    friend_token_duration: Duration,
}

impl TokenIssuer {
    /// Create a new issuer.
    ///
    /// # Errors
    /// Returns [`AuthError::Configuration`] if the secret is shorter than
    /// 32 bytes.
    pub fn new(
        secret: impl AsRef<[u8]>,
        admin_token_duration: Duration,
        friend_token_duration: Duration,
    ) -> Result<Self, AuthError> {
        Ok(Self {
            signing_key: SigningKey::new(secret.as_ref())?,
            admin_token_duration,
            friend_token_duration,
        })
    }

    /// Mint an admin token valid for the configured admin duration
    pub fn issue_admin_token(&self) -> Result<SessionToken, AuthError> {
        self.issue(TokenClaims::new(Role::Admin, None, self.admin_token_duration))
    }

    /// Mint a friend token bound to `session_id`, valid for the configured
    /// friend duration
    pub fn issue_friend_token(&self, session_id: &str) -> Result<SessionToken, AuthError> {
        self.issue(TokenClaims::new(
            Role::Friend,
            Some(session_id.to_string()),
            self.friend_token_duration,
        ))
    }

    fn issue(&self, claims: TokenClaims) -> Result<SessionToken, AuthError> {
        let token = self.sign_claims(&claims)?;
        Ok(SessionToken { token, claims })
    }

    fn sign_claims(&self, claims: &TokenClaims) -> Result<String, AuthError> {
        let claims_json = serde_json::to_vec(claims).map_err(|e| {
            tracing::error!("failed to serialize token claims: {e}");
            AuthError::Internal("failed to serialize token claims".to_string())
        })?;

        let payload_b64 = URL_SAFE_NO_PAD.encode(&claims_json);
        let signature = self.signing_key.sign(payload_b64.as_bytes());
        let sig_b64 = URL_SAFE_NO_PAD.encode(signature);

        Ok(format!("{payload_b64}.{sig_b64}"))
    }

    /// Validate a token string and return its claims.
    ///
    /// Signature failure and expiry are logged distinctly for diagnostics but
    /// both map to unauthorized at the boundary.
    pub fn validate(&self, token: &str) -> Result<TokenClaims, AuthError> {
        // Split signature from payload on the last dot
        let parts: Vec<&str> = token.rsplitn(2, '.').collect();
        if parts.len() != 2 {
            return Err(AuthError::InvalidToken);
        }
        let (sig_b64, payload_b64) = (parts[0], parts[1]);

        let provided_sig = URL_SAFE_NO_PAD
            .decode(sig_b64)
            .map_err(|_| AuthError::InvalidToken)?;
        let expected_sig = self.signing_key.sign(payload_b64.as_bytes());

        if !bool::from(expected_sig.as_slice().ct_eq(provided_sig.as_slice())) {
            tracing::debug!("token signature mismatch");
            return Err(AuthError::InvalidToken);
        }

        let claims_json = URL_SAFE_NO_PAD
            .decode(payload_b64)
            .map_err(|_| AuthError::InvalidToken)?;
        let claims: TokenClaims =
            serde_json::from_slice(&claims_json).map_err(|_| AuthError::InvalidToken)?;

        if claims.is_expired() {
            tracing::debug!(role = %claims.role, "token expired");
            return Err(AuthError::TokenExpired);
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(
            "test-signing-secret-of-sufficient-length".as_bytes(),
            Duration::from_secs(72 * 3600),
            Duration::from_secs(12 * 3600),
        )
        .unwrap()
    }

    #[test]
    fn test_short_secret_rejected() {
        let result = TokenIssuer::new(
            b"short",
            Duration::from_secs(3600),
            Duration::from_secs(3600),
        );
        assert!(matches!(result, Err(AuthError::Configuration(_))));
    }

    #[test]
    fn test_admin_token_roundtrip() {
        let issuer = issuer();
        let token = issuer.issue_admin_token().unwrap();

        let claims = issuer.validate(token.as_str()).unwrap();
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.session_id, None);
        assert_eq!(&claims, token.claims());
    }

    #[test]
    fn test_friend_token_roundtrip_carries_session_id() {
        let issuer = issuer();
        let token = issuer.issue_friend_token("abc").unwrap();

        let claims = issuer.validate(token.as_str()).unwrap();
        assert_eq!(claims.role, Role::Friend);
        assert_eq!(claims.session_id.as_deref(), Some("abc"));
    }

    #[test]
    fn test_expiry_is_issue_time_plus_role_duration() {
        let issuer = issuer();

        let admin = issuer.issue_admin_token().unwrap();
        let friend = issuer.issue_friend_token("abc").unwrap();

        assert_eq!(
            admin.claims().expires - admin.claims().issued,
            72 * 3600 * 1000
        );
        assert_eq!(
            friend.claims().expires - friend.claims().issued,
            12 * 3600 * 1000
        );
    }

    #[test]
    fn test_token_near_expiry_still_validates() {
        let issuer = issuer();
        let now = Utc::now().timestamp_millis();
        let claims = TokenClaims {
            role: Role::Friend,
            session_id: Some("abc".to_string()),
            issued: now - 1000,
            expires: now + 500,
        };

        let token = issuer.sign_claims(&claims).unwrap();
        assert!(issuer.validate(&token).is_ok());
    }

    #[test]
    fn test_expired_token_rejected() {
        let issuer = issuer();
        let now = Utc::now().timestamp_millis();
        let claims = TokenClaims {
            role: Role::Friend,
            session_id: Some("abc".to_string()),
            issued: now - 10_000,
            expires: now - 500,
        };

        let token = issuer.sign_claims(&claims).unwrap();
        assert!(matches!(
            issuer.validate(&token),
            Err(AuthError::TokenExpired)
        ));
    }

    #[test]
    fn test_tampered_signature_rejected() {
        let issuer = issuer();
        let mut token = issuer.issue_admin_token().unwrap().into_string();

        let last = token.pop().unwrap();
        token.push(if last == 'A' { 'B' } else { 'A' });

        assert!(matches!(
            issuer.validate(&token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_payload_swap_with_old_signature_rejected() {
        let issuer = issuer();
        let friend = issuer.issue_friend_token("abc").unwrap().into_string();
        let signature = friend.rsplit('.').next().unwrap().to_string();

        // Re-use the friend signature over admin claims
        let escalated = TokenClaims::new(Role::Admin, None, Duration::from_secs(3600));
        let escalated_b64 = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&escalated).unwrap());
        let forged = format!("{escalated_b64}.{signature}");

        assert!(matches!(
            issuer.validate(&forged),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let signer = issuer();
        let verifier = TokenIssuer::new(
            "a-completely-different-signing-secret!!!".as_bytes(),
            Duration::from_secs(3600),
            Duration::from_secs(3600),
        )
        .unwrap();

        let token = signer.issue_admin_token().unwrap();
        assert!(matches!(
            verifier.validate(token.as_str()),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_malformed_tokens_rejected() {
        let issuer = issuer();

        for token in [
            "",
            "nodots",
            ".signature",
            "payload.",
            "!!!invalid!!!.sig",
        ] {
            assert!(
                matches!(issuer.validate(token), Err(AuthError::InvalidToken)),
                "expected rejection for {token:?}"
            );
        }

        // Valid base64 but not JSON claims
        let not_json = URL_SAFE_NO_PAD.encode(b"not json");
        let signature = URL_SAFE_NO_PAD.encode(issuer.signing_key.sign(not_json.as_bytes()));
        assert!(matches!(
            issuer.validate(&format!("{not_json}.{signature}")),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_claims_wire_form_omits_absent_session_id() {
        let claims = TokenClaims::new(Role::Admin, None, Duration::from_secs(60));
        let json = serde_json::to_string(&claims).unwrap();
        assert!(!json.contains("session_id"));
        assert!(json.contains("\"role\":\"admin\""));
    }
}
