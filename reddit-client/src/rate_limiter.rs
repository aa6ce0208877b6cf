use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Fixed gap enforced between two consecutive requests
    pub min_interval: Duration,
}

impl RateLimitConfig {
    pub fn reddit_search(min_interval: Duration) -> Self {
        Self { min_interval }
    }
}

#[derive(Debug, Default)]
struct PacerState {
    /// Earliest instant the next request may start.
    next_slot: Option<Instant>,
    requests: u32,
    throttled: u32,
}

/// Fixed-interval pacer. A 429 pushes the next slot out by the advertised
/// wait so no request goes out before the server allows it.
#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimitConfig,
    state: Mutex<PacerState>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            state: Mutex::new(PacerState::default()),
        }
    }

    /// Waits for the next free slot and returns how long that took.
    pub async fn acquire_permit(&self) -> Duration {
        let started = Instant::now();
        // Held across the sleep so concurrent callers queue in order
        let mut state = self.state.lock().await;

        if let Some(slot) = state.next_slot {
            let wait = slot.saturating_duration_since(Instant::now());
            if !wait.is_zero() {
                debug!("Pacing request, waiting {:?}", wait);
                sleep(wait).await;
            }
        }
        state.next_slot = Some(Instant::now() + self.config.min_interval);
        state.requests += 1;

        started.elapsed()
    }

    /// Records a 429 and holds the next request back for `retry_after`.
    pub async fn record_rate_limited(&self, retry_after: Duration) {
        let mut state = self.state.lock().await;
        state.throttled += 1;
        let resume = Instant::now() + retry_after;
        state.next_slot = Some(state.next_slot.map_or(resume, |slot| slot.max(resume)));
    }

    pub async fn status(&self) -> RateLimitStatus {
        let state = self.state.lock().await;
        RateLimitStatus {
            min_interval: self.config.min_interval,
            requests: state.requests,
            throttled: state.throttled,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RateLimitStatus {
    pub min_interval: Duration,
    pub requests: u32,
    pub throttled: u32,
}
