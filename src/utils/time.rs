// src/utils/time.rs

use async_trait::async_trait;
use chrono::Utc;
use std::time::Duration;

/// Time source for the rate limiter and cache. Production uses the system
/// clock; tests inject a manual clock whose `sleep` advances simulated time.
#[async_trait]
pub trait Clock: Send + Sync {
    /// Current timestamp in milliseconds since Unix epoch.
    fn now_ms(&self) -> u64;

    /// Suspend the calling task for `ms` milliseconds.
    async fn sleep_ms(&self, ms: u64);
}

#[derive(Debug, Clone, Default)]
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        SystemClock
    }
}

#[async_trait]
impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        Utc::now().timestamp_millis().max(0) as u64
    }

    async fn sleep_ms(&self, ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
}
