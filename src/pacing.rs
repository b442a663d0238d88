//! Fixed politeness delays between requests

use std::time::Duration;

use async_trait::async_trait;

use crate::config::Settings;
use crate::traits::{Pacer, Pause};

/// Sleeps a constant duration, one for pages and one for detail requests
#[derive(Debug, Clone, Copy)]
pub struct FixedPacer {
    pub page_delay: Duration,
    pub detail_delay: Duration,
}

impl FixedPacer {
    pub fn new(page_delay: Duration, detail_delay: Duration) -> Self {
        Self {
            page_delay,
            detail_delay,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.page_delay, settings.detail_delay)
    }

    fn delay_for(&self, kind: Pause) -> Duration {
        match kind {
            Pause::Page => self.page_delay,
            Pause::Detail => self.detail_delay,
        }
    }
}

#[async_trait]
impl Pacer for FixedPacer {
    async fn pause(&self, kind: Pause) {
        let delay = self.delay_for(kind);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

/// Never waits; for tests and offline fixtures
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPacer;

#[async_trait]
impl Pacer for NoPacer {
    async fn pause(&self, _kind: Pause) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_and_detail_delays_are_independent() {
        let pacer = FixedPacer::new(Duration::from_secs(2), Duration::from_secs(1));
        assert_eq!(pacer.delay_for(Pause::Page), Duration::from_secs(2));
        assert_eq!(pacer.delay_for(Pause::Detail), Duration::from_secs(1));
    }

    #[tokio::test]
    async fn fixed_pacer_sleeps_the_configured_time() {
        let pacer = FixedPacer::new(Duration::from_millis(20), Duration::from_millis(10));
        let start = tokio::time::Instant::now();
        pacer.pause(Pause::Page).await;
        pacer.pause(Pause::Detail).await;
        assert!(start.elapsed() >= Duration::from_millis(30));
    }
}
