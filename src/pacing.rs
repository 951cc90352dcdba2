// src/pacing.rs
//! Delay policy applied between successive AI requests

use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

#[async_trait]
pub trait Pacer: Send + Sync {
    /// Called before every request except the first of a run
    async fn wait(&self);
}

/// Sleeps a fixed interval to stay under provider rate limits
#[derive(Debug, Clone)]
pub struct FixedIntervalPacer {
    interval: Duration,
}

impl FixedIntervalPacer {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

#[async_trait]
impl Pacer for FixedIntervalPacer {
    async fn wait(&self) {
        if self.interval.is_zero() {
            return;
        }
        debug!("Pacing for {}s before next request", self.interval.as_secs_f32());
        tokio::time::sleep(self.interval).await;
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoPacing;

#[async_trait]
impl Pacer for NoPacing {
    async fn wait(&self) {}
}
