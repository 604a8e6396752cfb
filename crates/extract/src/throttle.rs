//! Per-provider request spacing.
//!
//! Each provider gets its own governor limiter with a burst of one, so two
//! consecutive requests to the same provider are at least `min_interval`
//! apart while requests to different providers never wait on each other.
//! The limiters are lock-free and shared through `Arc`, which keeps the
//! spacing intact when several leagues are processed concurrently.

use governor::clock::DefaultClock;
use governor::middleware::NoOpMiddleware;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use nonzero_ext::nonzero;
use sports_etl_core::{ProviderId, ProvidersConfig};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

type GovernorLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>;

/// Minimum-interval throttle keyed by provider.
#[derive(Clone, Default)]
pub struct ProviderThrottle {
    limiters: HashMap<ProviderId, Arc<GovernorLimiter>>,
    intervals: HashMap<ProviderId, Duration>,
}

impl ProviderThrottle {
    /// Creates a throttle with no limits.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a throttle from each provider's configured `min_interval_ms`.
    #[must_use]
    pub fn from_config(providers: &ProvidersConfig) -> Self {
        ProviderId::ALL.iter().fold(Self::new(), |throttle, provider| {
            let interval = Duration::from_millis(providers.get(*provider).min_interval_ms);
            throttle.with_interval(*provider, interval)
        })
    }

    /// Sets the minimum spacing for one provider. A zero interval removes the limit.
    #[must_use]
    pub fn with_interval(mut self, provider: ProviderId, interval: Duration) -> Self {
        match Quota::with_period(interval) {
            Some(quota) => {
                let limiter = RateLimiter::direct(quota.allow_burst(nonzero!(1u32)));
                self.limiters.insert(provider, Arc::new(limiter));
                self.intervals.insert(provider, interval);
            }
            None => {
                self.limiters.remove(&provider);
                self.intervals.remove(&provider);
            }
        }
        self
    }

    /// Configured minimum spacing for a provider.
    #[must_use]
    pub fn interval(&self, provider: ProviderId) -> Duration {
        self.intervals.get(&provider).copied().unwrap_or_default()
    }

    /// Waits until a request to `provider` may be issued.
    pub async fn acquire(&self, provider: ProviderId) {
        if let Some(limiter) = self.limiters.get(&provider) {
            if limiter.check().is_err() {
                tracing::debug!(
                    provider = %provider,
                    interval_ms = self.interval(provider).as_millis() as u64,
                    "Waiting for provider throttle"
                );
                limiter.until_ready().await;
            }
        }
    }
}

impl std::fmt::Debug for ProviderThrottle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderThrottle")
            .field("intervals", &self.intervals)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test]
    async fn test_consecutive_calls_are_spaced() {
        let interval = Duration::from_millis(120);
        let throttle = ProviderThrottle::new().with_interval(ProviderId::FootballData, interval);

        let start = Instant::now();
        for _ in 0..3 {
            throttle.acquire(ProviderId::FootballData).await;
        }
        // first call is free, the next two wait one interval each
        assert!(start.elapsed() >= interval * 2 - Duration::from_millis(5));
    }

    #[tokio::test]
    async fn test_providers_are_not_cross_throttled() {
        let throttle = ProviderThrottle::new()
            .with_interval(ProviderId::FootballData, Duration::from_secs(5))
            .with_interval(ProviderId::ApiFootball, Duration::from_secs(5));

        let start = Instant::now();
        throttle.acquire(ProviderId::FootballData).await;
        throttle.acquire(ProviderId::ApiFootball).await;
        throttle.acquire(ProviderId::TheSportsDb).await;
        throttle.acquire(ProviderId::TheSportsDb).await;
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_shared_throttle_spaces_concurrent_tasks() {
        let interval = Duration::from_millis(100);
        let throttle = ProviderThrottle::new().with_interval(ProviderId::ApiFootball, interval);

        let start = Instant::now();
        let handles: Vec<_> = (0..3)
            .map(|_| {
                let throttle = throttle.clone();
                tokio::spawn(async move { throttle.acquire(ProviderId::ApiFootball).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }
        assert!(start.elapsed() >= interval * 2 - Duration::from_millis(5));
    }

    #[test]
    fn test_from_config_uses_min_interval() {
        let throttle = ProviderThrottle::from_config(&ProvidersConfig::default());
        assert_eq!(throttle.interval(ProviderId::FootballData), Duration::from_millis(6_000));
        assert_eq!(throttle.interval(ProviderId::TheSportsDb), Duration::ZERO);
    }
}
