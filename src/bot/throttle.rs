//! Per-user message rate limiting
//!
//! This module provides a cache-based throttle window: a user's first message
//! opens the window, and further messages inside it are suppressed before they
//! reach routing. Suppression is silent apart from a rate-bounded "too fast"
//! notice, so a flooding user is never locked out permanently.

use moka::future::Cache;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Cache tracking the last accepted message time per user
///
/// Presence of a user id in `accepted` means the user is inside the throttle
/// window; entries expire after the configured minimum interval, reopening
/// the window. A second cache keeps the "too fast" notice from being repeated
/// on every suppressed message.
#[derive(Clone)]
pub struct ThrottleCache {
    /// Moka cache storing user_id -> () with TTL equal to the window
    accepted: Cache<i64, ()>,
    /// Users already notified inside the current window
    notified: Cache<i64, ()>,
    /// Window between accepted messages from the same user
    interval: Duration,
    /// Counter for suppressed messages (for logging throttling)
    suppressed_count: Arc<AtomicU64>,
}

impl ThrottleCache {
    /// Creates a new `ThrottleCache`
    ///
    /// # Arguments
    ///
    /// * `interval_secs` - Minimum seconds between accepted messages per user
    /// * `notice_ttl_secs` - Seconds between "too fast" notices to same user
    /// * `max_capacity` - Maximum number of entries in each cache
    #[must_use]
    pub fn new(interval_secs: u64, notice_ttl_secs: u64, max_capacity: u64) -> Self {
        let accepted = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(Duration::from_secs(interval_secs))
            .build();
        let notified = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(Duration::from_secs(notice_ttl_secs))
            .build();

        Self {
            accepted,
            notified,
            interval: Duration::from_secs(interval_secs),
            suppressed_count: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Decides whether a message from `user_id` must be suppressed
    ///
    /// Returns `false` and marks the window open if the user has no accepted
    /// message inside the window yet; returns `true` if the user is still
    /// inside it. Only every 100th suppressed message is logged to keep a
    /// flood from flooding the logs too.
    pub async fn should_suppress(&self, user_id: i64) -> bool {
        if self.accepted.get(&user_id).await.is_none() {
            self.accepted.insert(user_id, ()).await;
            return false;
        }

        let count = self.suppressed_count.fetch_add(1, Ordering::Relaxed) + 1;
        if count.is_multiple_of(100) {
            debug!(
                "⏳ Suppressed {} throttled messages (recent: user {})",
                count, user_id
            );
        }

        true
    }

    /// Checks whether the "too fast" notice should be sent to the user
    ///
    /// Returns `true` at most once per notice interval; pair with
    /// [`Self::mark_notified`] after the notice was actually delivered.
    pub async fn should_notify(&self, user_id: i64) -> bool {
        self.notified.get(&user_id).await.is_none()
    }

    /// Marks that the "too fast" notice was delivered to the user
    pub async fn mark_notified(&self, user_id: i64) {
        self.notified.insert(user_id, ()).await;
    }

    /// Returns the total number of suppressed messages
    #[must_use]
    pub fn suppressed_count(&self) -> u64 {
        self.suppressed_count.load(Ordering::Relaxed)
    }

    /// Returns the configured throttle window
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_first_message_accepted() {
        let cache = ThrottleCache::new(60, 60, 100);

        assert!(!cache.should_suppress(12345).await);
    }

    #[tokio::test]
    async fn test_second_message_within_window_suppressed() {
        let cache = ThrottleCache::new(60, 60, 100);

        assert!(!cache.should_suppress(12345).await);
        assert!(cache.should_suppress(12345).await);
    }

    #[tokio::test]
    async fn test_different_users_independent() {
        let cache = ThrottleCache::new(60, 60, 100);

        assert!(!cache.should_suppress(111).await);
        assert!(cache.should_suppress(111).await);

        // Different user should not be affected
        assert!(!cache.should_suppress(222).await);
    }

    #[tokio::test]
    async fn test_notice_sent_once_per_window() {
        let cache = ThrottleCache::new(60, 60, 100);

        assert!(cache.should_notify(12345).await);
        cache.mark_notified(12345).await;
        assert!(!cache.should_notify(12345).await);
    }

    #[tokio::test]
    async fn test_suppressed_count_increments() {
        let cache = ThrottleCache::new(60, 60, 100);

        cache.should_suppress(12345).await;
        for _ in 0..5 {
            cache.should_suppress(12345).await;
        }

        assert_eq!(cache.suppressed_count(), 5);
    }
}
