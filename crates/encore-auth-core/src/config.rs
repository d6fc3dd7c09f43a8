//! Configuration types for the auth core

use std::time::Duration;

/// Auth core configuration
///
/// Read once at process start by the surrounding service and handed to
/// [`AuthService::new`](crate::AuthService::new). Durations are role-scoped:
/// admin tokens are long-lived management credentials, friend tokens are
/// meant to expire with the event.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Admin portal password
    pub admin_password: String,
    /// HMAC secret for token signing (must be at least 32 bytes)
    pub token_secret: String,
    /// Admin token duration
    pub admin_token_duration: Duration,
    /// Friend token duration
    pub friend_token_duration: Duration,
}

impl AuthConfig {
    /// Create a new auth config with default token durations
    pub fn new(admin_password: impl Into<String>, token_secret: impl Into<String>) -> Self {
        Self {
            admin_password: admin_password.into(),
            token_secret: token_secret.into(),
            admin_token_duration: Duration::from_secs(72 * 60 * 60), // 3 days
            friend_token_duration: Duration::from_secs(12 * 60 * 60), // 12 hours
        }
    }

    /// Set admin token duration
    pub fn with_admin_token_duration(mut self, duration: Duration) -> Self {
        self.admin_token_duration = duration;
        self
    }

    /// Set friend token duration
    pub fn with_friend_token_duration(mut self, duration: Duration) -> Self {
        self.friend_token_duration = duration;
        self
    }
}
