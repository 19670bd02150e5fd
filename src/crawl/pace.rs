// src/crawl/pace.rs
//
// Inter-request pacing. Delays are randomized within ±jitter so the crawl
// has no fixed cadence; a delay of zero is still a valid suspension point.

use std::time::Duration;

use rand::Rng;

/// `base ± jitter` milliseconds, never below zero.
pub fn jittered(base_ms: u64, jitter_ms: u64) -> Duration {
    if jitter_ms == 0 {
        return Duration::from_millis(base_ms);
    }
    let offset = rand::rng().random_range(0..=jitter_ms * 2);
    Duration::from_millis((base_ms + offset).saturating_sub(jitter_ms))
}

/// Uniform delay in `[min, max]` milliseconds (the poller's idle interval).
pub fn between(min_ms: u64, max_ms: u64) -> Duration {
    if min_ms >= max_ms {
        return Duration::from_millis(min_ms);
    }
    Duration::from_millis(rand::rng().random_range(min_ms..=max_ms))
}
