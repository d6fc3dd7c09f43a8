//! Access-key credential pipeline
//!
//! Turns a human-entered access key into the collision-resistant hash that
//! guests' clients compute independently: canonicalize the raw string, pick
//! up the day-derived salt, run the fixed-parameter derivation. Server and
//! client must agree on every step bit-for-bit, so nothing here is
//! configurable.

use chrono::{DateTime, Datelike, Utc};
use scrypt::scrypt;

use crate::AuthError;

/// Fixed scrypt parameters for access-key derivation
///
/// These must match the client-side implementation exactly. Any drift breaks
/// every verification silently (mismatched hashes, not an error), so the
/// values are pinned here and nowhere else.
pub mod derive_params {
    use scrypt::Params;

    /// CPU/memory cost exponent: N = 2^15 = 32768
    pub const LOG_N: u8 = 15;

    /// Block size
    pub const BLOCK_SIZE: u32 = 8;

    /// Parallelism
    pub const PARALLELISM: u32 = 1;

    /// Output length: 32 bytes (64 hex characters)
    pub const OUTPUT_LENGTH: usize = 32;

    /// Get the pinned scrypt parameters
    pub fn get_params() -> Params {
        Params::new(LOG_N, BLOCK_SIZE, PARALLELISM, OUTPUT_LENGTH)
            .expect("valid scrypt parameters")
    }
}

/// Canonicalize a raw access key before hashing.
///
/// Lower-cases and trims leading/trailing whitespace; internal whitespace and
/// punctuation are preserved. Total over any string (the empty key normalizes
/// to the empty string and simply fails verification later). Idempotent.
pub fn normalize_key(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Current salt: the UTC day-of-month as a decimal string.
///
/// Constant within a UTC calendar day and changes exactly at UTC midnight,
/// which rotates every access-key credential without any server-side state.
/// The value is public and low-entropy; it is a rotation mechanism, not a
/// secrecy mechanism.
pub fn current_salt() -> String {
    salt_at(Utc::now())
}

/// Salt for an explicit instant.
///
/// A verification straddling UTC midnight may be salted with either day
/// depending on which side evaluates first; that race is accepted and
/// surfaces as an ordinary credential mismatch, self-resolving on retry.
pub fn salt_at(at: DateTime<Utc>) -> String {
    at.day().to_string()
}

/// Derive the access-key hash for `(input, salt)`.
///
/// Pure function of its inputs and the pinned [`derive_params`]: repeated
/// calls are byte-identical, so memoization and client-side recomputation
/// both agree with it. The salt is lower-cased before use in case a future
/// salt source is not already lowercase. Returns
/// [`AuthError::HashingFailed`] if the derivation cannot complete; never an
/// empty or zeroed hash.
pub fn derive_key_hash(input: &str, salt: &str) -> Result<String, AuthError> {
    let salt = salt.to_lowercase();
    let mut output = [0u8; derive_params::OUTPUT_LENGTH];

    scrypt(
        input.as_bytes(),
        salt.as_bytes(),
        &derive_params::get_params(),
        &mut output,
    )
    .map_err(|e| {
        tracing::error!("access-key derivation failed: {e}");
        AuthError::HashingFailed
    })?;

    Ok(hex::encode(output))
}
