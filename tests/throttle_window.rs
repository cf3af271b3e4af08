//! Throttle window behavior over real time: suppression inside the window
//! and re-admission after it expires.

use funfacts_bot::bot::ThrottleCache;
use std::time::Duration;
use tokio::time::sleep;

#[tokio::test]
async fn second_message_within_window_never_reaches_routing() {
    let cache = ThrottleCache::new(60, 60, 100);

    assert!(!cache.should_suppress(1).await);
    assert!(cache.should_suppress(1).await);
    assert_eq!(cache.suppressed_count(), 1);
}

#[tokio::test]
async fn window_expiry_readmits_the_user() {
    let cache = ThrottleCache::new(1, 1, 100);

    assert!(!cache.should_suppress(1).await);
    assert!(cache.should_suppress(1).await);

    sleep(Duration::from_millis(1200)).await;

    // No permanent lockout: once the window expires the user is accepted again
    assert!(!cache.should_suppress(1).await);
}

#[tokio::test]
async fn users_are_throttled_independently() {
    let cache = ThrottleCache::new(60, 60, 100);

    assert!(!cache.should_suppress(1).await);
    assert!(!cache.should_suppress(2).await);
    assert!(cache.should_suppress(1).await);
    assert!(cache.should_suppress(2).await);
}

#[tokio::test]
async fn too_fast_notice_is_bounded_per_window() {
    let cache = ThrottleCache::new(60, 60, 100);

    assert!(!cache.should_suppress(1).await);
    assert!(cache.should_suppress(1).await);

    assert!(cache.should_notify(1).await);
    cache.mark_notified(1).await;

    // Further suppressed messages inside the window stay silent
    assert!(cache.should_suppress(1).await);
    assert!(!cache.should_notify(1).await);
}
