//! Memoization of derived access-key hashes
//!
//! The derivation is deliberately expensive (tens of milliseconds of CPU and
//! a 32 MiB working set), but within a UTC day every verification of the same
//! key produces the same hash. This cache keeps that cost to roughly one
//! derivation per distinct key per day.

use dashmap::DashMap;

use crate::AuthError;

/// Concurrent cache of derived hashes keyed by `(salt, normalized key)`.
///
/// Owned by the verifier and constructed once at process start; never an
/// ambient global, so tests get a fresh cache each.
///
/// # Concurrency
///
/// Lookups and stores are internally synchronized; callers need no locking.
/// Concurrent misses on the same pair may race the derivation, last writer
/// wins on store. The derivation is pure, so every caller observes the same
/// value and the duplicate cost is bounded and rare.
///
/// # Growth
///
/// Entries are never evicted. Stale prior-day entries persist for the life of
/// the process: a practically small number of distinct keys times at most
/// ~31 day entries each. Accepted trade-off; there is no background sweep.
#[derive(Debug, Default)]
pub struct HashCache {
    entries: DashMap<String, String>,
}

impl HashCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached hash for `(normalized_key, salt)`, computing and
    /// storing it on a miss.
    ///
    /// `compute` is invoked with the same `(normalized_key, salt)` pair, so
    /// the returned value always equals a direct computation regardless of
    /// hit or miss. Errors from `compute` are propagated and nothing is
    /// stored.
    pub fn get_or_compute<F>(
        &self,
        normalized_key: &str,
        salt: &str,
        compute: F,
    ) -> Result<String, AuthError>
    where
        F: FnOnce(&str, &str) -> Result<String, AuthError>,
    {
        let cache_key = Self::cache_key(normalized_key, salt);

        if let Some(hash) = self.entries.get(&cache_key) {
            tracing::trace!("access-key hash cache hit");
            return Ok(hash.value().clone());
        }

        let hash = compute(normalized_key, salt)?;
        self.entries.insert(cache_key, hash.clone());

        Ok(hash)
    }

    /// Number of entries currently held (current plus stale days)
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Cache key for a `(normalized key, salt)` pair.
    ///
    /// Salt first: the salt is 1-2 decimal digits and never contains `:`, so
    /// the first `:` delimits unambiguously and distinct `(key, day)` pairs
    /// can never collide, whatever characters the key contains.
    fn cache_key(normalized_key: &str, salt: &str) -> String {
        format!("{salt}:{normalized_key}")
    }
}
