// src/services/rate_limiter.rs
//
// Dual sliding-window gate bounding the outbound call rate. One instance is
// shared process-wide so the upstream quota is enforced across every
// orchestrator and batch, not per caller.

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::utils::Clock;

/// Window quotas. Defaults match the upstream development-key limits.
#[derive(Debug, Clone)]
pub struct RateLimiterConfig {
    pub short_max_calls: u32,
    pub short_window_ms: u64,
    pub long_max_calls: u32,
    pub long_window_ms: u64,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            short_max_calls: 20,
            short_window_ms: 1_000,
            long_max_calls: 100,
            long_window_ms: 120_000,
        }
    }
}

#[derive(Debug)]
struct RateWindow {
    max_calls: u32,
    window_ms: u64,
    count: u32,
    reset_at_ms: u64,
}

impl RateWindow {
    fn new(max_calls: u32, window_ms: u64) -> Self {
        Self {
            max_calls,
            window_ms,
            count: 0,
            reset_at_ms: 0,
        }
    }

    /// Start a fresh window if the previous one has elapsed.
    fn roll(&mut self, now_ms: u64) {
        if now_ms >= self.reset_at_ms {
            self.count = 0;
            self.reset_at_ms = now_ms + self.window_ms;
        }
    }

    /// How long a caller must wait before this window admits one more call.
    fn wait_ms(&self, now_ms: u64) -> u64 {
        if self.count < self.max_calls {
            0
        } else {
            self.reset_at_ms.saturating_sub(now_ms)
        }
    }

    fn reset_in_ms(&self, now_ms: u64) -> u64 {
        self.reset_at_ms.saturating_sub(now_ms)
    }
}

/// Non-mutating snapshot of both windows.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct WindowStatus {
    pub count: u32,
    pub max_calls: u32,
    pub reset_in_ms: u64,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RateLimiterStatus {
    pub short: WindowStatus,
    pub long: WindowStatus,
}

pub struct RateLimiter {
    clock: Arc<dyn Clock>,
    windows: Mutex<(RateWindow, RateWindow)>,
}

impl RateLimiter {
    pub fn new(config: RateLimiterConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            windows: Mutex::new((
                RateWindow::new(config.short_max_calls, config.short_window_ms),
                RateWindow::new(config.long_max_calls, config.long_window_ms),
            )),
        }
    }

    /// Suspend until dispatching one more call violates neither window, then
    /// record the dispatch.
    ///
    /// The guard is held across the sleep, so the wait → recheck → increment
    /// sequence is atomic with respect to every other caller's suspension
    /// point: nobody can consume the slot this caller wakes up for. Counters
    /// are incremented only after re-rolling the windows against the
    /// post-sleep now, since a reset boundary may have passed while sleeping.
    pub async fn await_availability(&self) {
        let mut windows = self.windows.lock().await;
        loop {
            let now_ms = self.clock.now_ms();
            windows.0.roll(now_ms);
            windows.1.roll(now_ms);

            let wait_ms = windows.0.wait_ms(now_ms).max(windows.1.wait_ms(now_ms));
            if wait_ms == 0 {
                break;
            }
            self.clock.sleep_ms(wait_ms).await;
        }
        windows.0.count += 1;
        windows.1.count += 1;
    }

    /// Clear both windows. Test isolation only, not a hot-path operation.
    pub async fn reset(&self) {
        let mut windows = self.windows.lock().await;
        windows.0.count = 0;
        windows.0.reset_at_ms = 0;
        windows.1.count = 0;
        windows.1.reset_at_ms = 0;
    }

    /// Current counts and millis until each window resets, without mutating.
    pub async fn status(&self) -> RateLimiterStatus {
        let windows = self.windows.lock().await;
        let now_ms = self.clock.now_ms();
        RateLimiterStatus {
            short: WindowStatus {
                count: windows.0.count,
                max_calls: windows.0.max_calls,
                reset_in_ms: windows.0.reset_in_ms(now_ms),
            },
            long: WindowStatus {
                count: windows.1.count,
                max_calls: windows.1.max_calls,
                reset_in_ms: windows.1.reset_in_ms(now_ms),
            },
        }
    }
}
