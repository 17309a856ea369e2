// Fixed-window attempt counter keyed by operation and identity
use chrono::Duration;
use std::sync::Arc;

use crate::clock::Clock;
use crate::error::Result;
use crate::repository::RateLimitStore;

/// One limiter per operation (`login`, `password_reset`).
///
/// The window starts at the first hit and is evaluated lazily: an elapsed
/// window counts as empty even before the next hit replaces it.
pub struct RateLimiter {
    name: &'static str,
    store: Arc<dyn RateLimitStore>,
    clock: Arc<dyn Clock>,
    max_attempts: u32,
    window: Duration,
}

impl RateLimiter {
    pub fn new(
        name: &'static str,
        store: Arc<dyn RateLimitStore>,
        clock: Arc<dyn Clock>,
        max_attempts: u32,
        window: Duration,
    ) -> Self {
        Self {
            name,
            store,
            clock,
            max_attempts,
            window,
        }
    }

    fn key(&self, identity: &str) -> String {
        format!("{}:{}", self.name, identity)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Count one attempt; returns the count in the current window
    pub async fn hit(&self, identity: &str) -> Result<u32> {
        let bucket = self
            .store
            .hit(&self.key(identity), self.window, self.clock.now())
            .await?;
        Ok(bucket.count)
    }

    pub async fn attempts(&self, identity: &str) -> Result<u32> {
        let now = self.clock.now();
        Ok(self
            .store
            .get(&self.key(identity))
            .await?
            .filter(|bucket| bucket.window_open(self.window, now))
            .map_or(0, |bucket| bucket.count))
    }

    pub async fn too_many_attempts(&self, identity: &str, limit: u32) -> Result<bool> {
        Ok(self.attempts(identity).await? >= limit)
    }

    /// `too_many_attempts` against the configured limit
    pub async fn exhausted(&self, identity: &str) -> Result<bool> {
        self.too_many_attempts(identity, self.max_attempts).await
    }

    /// Seconds until the current window closes; 0 when none is open
    pub async fn available_in(&self, identity: &str) -> Result<i64> {
        let now = self.clock.now();
        Ok(self
            .store
            .get(&self.key(identity))
            .await?
            .map_or(0, |bucket| (bucket.window_start + self.window - now).num_seconds().max(0)))
    }

    pub async fn clear(&self, identity: &str) -> Result<()> {
        self.store.clear(&self.key(identity)).await?;
        Ok(())
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("name", &self.name)
            .field("max_attempts", &self.max_attempts)
            .field("window", &self.window)
            .finish_non_exhaustive()
    }
}
