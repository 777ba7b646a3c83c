use common::PacingConfig;
use std::time::Duration;

/// Politeness intervals toward third-party services.
///
/// The feed delay runs after every source fetch, the summary delay
/// between successive per-item summarizations. Both serialize the run
/// on purpose; feed providers and inference APIs rate-limit bursty
/// clients.
#[derive(Debug, Clone, Copy)]
pub struct Pacing {
    feed_delay: Duration,
    summary_delay: Duration,
}

impl Pacing {
    pub fn from_config(config: &PacingConfig) -> Self {
        Self {
            feed_delay: Duration::from_millis(config.feed_delay_ms),
            summary_delay: Duration::from_millis(config.summary_delay_ms),
        }
    }

    /// Zero-delay policy. Call semantics are unchanged, only timing.
    pub fn none() -> Self {
        Self {
            feed_delay: Duration::ZERO,
            summary_delay: Duration::ZERO,
        }
    }

    pub async fn after_feed_fetch(&self) {
        if !self.feed_delay.is_zero() {
            tokio::time::sleep(self.feed_delay).await;
        }
    }

    pub async fn between_summaries(&self) {
        if !self.summary_delay.is_zero() {
            tokio::time::sleep(self.summary_delay).await;
        }
    }
}
