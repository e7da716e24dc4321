//! Update-authorization token store.
//!
//! Payload mutation is gated by short-lived, single-use tokens. The
//! table is process-local working state: losing it on restart only
//! forces an in-flight update to be re-requested. Entries are keyed by
//! artifact id in a concurrent map so operations on different
//! artifacts never contend; redemption is a single atomic
//! check-and-clear so two near-simultaneous updates bearing the same
//! token cannot both succeed.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use rand::Rng;

/// Length of a generated token secret, in hex characters.
const SECRET_LEN: usize = 48;

/// How often the background sweeper evicts expired tokens.
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
struct IssuedToken {
    secret: String,
    expires_at: Instant,
}

/// In-memory store of live update tokens, at most one per artifact.
pub struct UpdateTokenStore {
    tokens: DashMap<i64, IssuedToken>,
    ttl: Duration,
}

impl UpdateTokenStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            tokens: DashMap::new(),
            ttl,
        }
    }

    /// Token lifetime.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a fresh token for an artifact, invalidating any token
    /// previously issued for it. Caller must have verified the
    /// artifact exists.
    pub fn issue(&self, artifact_id: i64) -> String {
        let secret = generate_secret();
        self.tokens.insert(
            artifact_id,
            IssuedToken {
                secret: secret.clone(),
                expires_at: Instant::now() + self.ttl,
            },
        );
        secret
    }

    /// Redeem a token: valid only if one is currently held for the
    /// artifact, matches exactly, and has not expired. A valid
    /// redemption atomically clears the entry, so a replay of the same
    /// token is rejected. A failed attempt leaves any live token in
    /// place.
    pub fn redeem(&self, artifact_id: i64, presented: &str) -> bool {
        self.tokens
            .remove_if(&artifact_id, |_, held| {
                held.secret == presented && held.expires_at > Instant::now()
            })
            .is_some()
    }

    /// Evict expired entries. Returns the number removed.
    pub fn sweep(&self) -> usize {
        let now = Instant::now();
        let before = self.tokens.len();
        self.tokens.retain(|_, held| held.expires_at > now);
        before - self.tokens.len()
    }

    /// Number of live entries, expired or not.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Spawn the background task that periodically evicts expired tokens.
pub fn spawn_sweeper(store: Arc<UpdateTokenStore>) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(SWEEP_INTERVAL);
        loop {
            ticker.tick().await;
            let evicted = store.sweep();
            if evicted > 0 {
                tracing::debug!(evicted, "Swept expired update tokens");
            }
        }
    });
}

fn generate_secret() -> String {
    const CHARSET: &[u8] = b"0123456789abcdef";
    let mut rng = rand::rng();
    (0..SECRET_LEN)
        .map(|_| {
            let idx = rng.random_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> UpdateTokenStore {
        UpdateTokenStore::new(Duration::from_secs(600))
    }

    #[test]
    fn redeem_is_single_use() {
        let store = store();
        let token = store.issue(1);
        assert!(store.redeem(1, &token));
        assert!(!store.redeem(1, &token));
    }

    #[test]
    fn wrong_token_does_not_consume_the_live_one() {
        let store = store();
        let token = store.issue(1);
        assert!(!store.redeem(1, "nope"));
        assert!(store.redeem(1, &token));
    }

    #[test]
    fn reissue_invalidates_the_previous_token() {
        let store = store();
        let first = store.issue(1);
        let second = store.issue(1);
        assert!(!store.redeem(1, &first));
        assert!(store.redeem(1, &second));
    }

    #[test]
    fn tokens_are_scoped_per_artifact() {
        let store = store();
        let a = store.issue(1);
        let b = store.issue(2);
        assert!(!store.redeem(1, &b));
        assert!(store.redeem(1, &a));
        assert!(store.redeem(2, &b));
    }

    #[test]
    fn expired_token_is_rejected_and_swept() {
        let store = UpdateTokenStore::new(Duration::ZERO);
        let token = store.issue(1);
        assert!(!store.redeem(1, &token));
        assert_eq!(store.sweep(), 1);
        assert!(store.is_empty());
    }

    #[test]
    fn secrets_are_distinct_and_well_formed() {
        let store = store();
        let a = store.issue(1);
        let b = store.issue(2);
        assert_ne!(a, b);
        assert_eq!(a.len(), SECRET_LEN);
        assert!(a.bytes().all(|c| c.is_ascii_hexdigit()));
    }
}
