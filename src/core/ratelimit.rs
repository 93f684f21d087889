//! Best-effort in-memory rate limiting for the login endpoint. A fixed
//! window counter per client key, swept by a periodic task. Process-local
//! only; multiple server processes do not share state.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

pub const LOGIN_MAX_ATTEMPTS: u32 = 10;
pub const LOGIN_WINDOW: Duration = Duration::from_secs(60);

pub struct RateLimiter {
    max_per_window: u32,
    window: Duration,
    hits: Arc<Mutex<HashMap<String, (u32, Instant)>>>,
}

impl RateLimiter {
    pub fn new(max_per_window: u32, window: Duration) -> Self {
        Self {
            max_per_window,
            window,
            hits: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Record one attempt for `key`. Returns false once the window is full.
    pub async fn check(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut hits = self.hits.lock().await;
        let entry = hits.entry(key.to_string()).or_insert((0, now));
        if now.duration_since(entry.1) >= self.window {
            *entry = (0, now);
        }
        if entry.0 >= self.max_per_window {
            return false;
        }
        entry.0 += 1;
        true
    }

    pub async fn tracked_keys(&self) -> usize {
        self.hits.lock().await.len()
    }

    /// Drop entries whose window has elapsed.
    pub async fn sweep(&self) {
        let now = Instant::now();
        let window = self.window;
        let mut hits = self.hits.lock().await;
        hits.retain(|_, (_, start)| now.duration_since(*start) < window);
    }

    /// Background sweeper, one pass per window length.
    pub fn spawn_sweeper(self: &Arc<Self>) {
        let limiter = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(limiter.window);
            loop {
                interval.tick().await;
                limiter.sweep().await;
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn admits_up_to_limit_then_rejects() {
        let limiter = RateLimiter::new(3, Duration::from_secs(60));
        for _ in 0..3 {
            assert!(limiter.check("10.0.0.1").await);
        }
        assert!(!limiter.check("10.0.0.1").await);
        // Other keys are unaffected.
        assert!(limiter.check("10.0.0.2").await);
    }

    #[tokio::test]
    async fn window_elapse_resets_the_count() {
        let limiter = RateLimiter::new(1, Duration::from_millis(20));
        assert!(limiter.check("k").await);
        assert!(!limiter.check("k").await);
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(limiter.check("k").await);
    }

    #[tokio::test]
    async fn sweep_drops_stale_entries() {
        let limiter = RateLimiter::new(5, Duration::from_millis(10));
        limiter.check("a").await;
        limiter.check("b").await;
        assert_eq!(limiter.tracked_keys().await, 2);
        tokio::time::sleep(Duration::from_millis(20)).await;
        limiter.sweep().await;
        assert_eq!(limiter.tracked_keys().await, 0);
    }
}
