//! Rate-limited extraction gateway.
//!
//! One [`ExtractionGateway`] serves all providers. Each call waits on the
//! provider's throttle, issues a single GET and turns the outcome into either
//! a [`RawBatch`] or an [`ExtractionFailure`]. Nothing is retried here.

use crate::endpoints::{endpoint_for, AuthScheme};
use crate::error::{ExtractionFailure, FailureKind};
use crate::operation::{FetchParams, Operation};
use crate::raw::RawBatch;
use crate::throttle::ProviderThrottle;
use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::Value;
use sports_etl_core::{ProviderConfig, ProviderId, ProvidersConfig};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// Retry-After assumed when a 429 response carries none.
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

// =============================================================================
// Extractor seam
// =============================================================================

/// Source of raw provider batches.
///
/// The fallback resolver only depends on this trait.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Performs one provider call.
    ///
    /// # Errors
    /// Every failure (transport, status, envelope, configuration) is returned
    /// as an [`ExtractionFailure`] value.
    async fn fetch(
        &self,
        provider: ProviderId,
        operation: Operation,
        params: &FetchParams,
    ) -> Result<RawBatch, ExtractionFailure>;

    /// Whether the provider can be called at all.
    fn is_configured(&self, provider: ProviderId) -> bool;
}

// =============================================================================
// Statistics
// =============================================================================

/// Request counters for one provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProviderCounters {
    pub requests: u64,
    pub failures: u64,
    pub rate_limited: u64,
}

/// Snapshot of the gateway's per-provider counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GatewayStats {
    pub providers: BTreeMap<ProviderId, ProviderCounters>,
}

impl GatewayStats {
    #[must_use]
    pub fn get(&self, provider: ProviderId) -> ProviderCounters {
        self.providers.get(&provider).copied().unwrap_or_default()
    }

    #[must_use]
    pub fn total_requests(&self) -> u64 {
        self.providers.values().map(|c| c.requests).sum()
    }
}

// =============================================================================
// Gateway
// =============================================================================

struct ProviderSlot {
    config: ProviderConfig,
    api_key: Option<SecretString>,
}

/// HTTP gateway to every configured provider.
pub struct ExtractionGateway {
    http: Client,
    slots: BTreeMap<ProviderId, ProviderSlot>,
    throttle: ProviderThrottle,
    stats: Mutex<GatewayStats>,
}

impl std::fmt::Debug for ExtractionGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let urls: BTreeMap<_, _> = self
            .slots
            .iter()
            .map(|(p, s)| (*p, s.config.base_url.as_str()))
            .collect();
        f.debug_struct("ExtractionGateway")
            .field("base_urls", &urls)
            .field("throttle", &self.throttle)
            .finish_non_exhaustive()
    }
}

impl ExtractionGateway {
    /// Creates a gateway for the configured providers.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built.
    pub fn new(providers: &ProvidersConfig) -> anyhow::Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("sports-etl/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build HTTP client: {e}"))?;

        let slots = ProviderId::ALL
            .iter()
            .map(|provider| {
                let config = providers.get(*provider).clone();
                let api_key = config
                    .api_key
                    .as_ref()
                    .filter(|k| !k.trim().is_empty())
                    .map(|k| SecretString::from(k.clone()));
                (*provider, ProviderSlot { config, api_key })
            })
            .collect();

        Ok(Self {
            http,
            slots,
            throttle: ProviderThrottle::from_config(providers),
            stats: Mutex::new(GatewayStats::default()),
        })
    }

    /// Points a provider at another base URL (useful for testing).
    #[must_use]
    pub fn with_base_url(mut self, provider: ProviderId, url: impl Into<String>) -> Self {
        if let Some(slot) = self.slots.get_mut(&provider) {
            slot.config.base_url = url.into();
        }
        self
    }

    /// Replaces the throttle, e.g. to share one across gateways.
    #[must_use]
    pub fn with_throttle(mut self, throttle: ProviderThrottle) -> Self {
        self.throttle = throttle;
        self
    }

    #[must_use]
    pub fn throttle(&self) -> &ProviderThrottle {
        &self.throttle
    }

    /// Current request counters.
    #[must_use]
    pub fn stats(&self) -> GatewayStats {
        self.stats.lock().clone()
    }

    fn record(&self, provider: ProviderId, failure: Option<&FailureKind>) {
        let mut stats = self.stats.lock();
        let counters = stats.providers.entry(provider).or_default();
        counters.requests += 1;
        if let Some(kind) = failure {
            counters.failures += 1;
            if matches!(kind, FailureKind::RateLimited { .. }) {
                counters.rate_limited += 1;
            }
        }
    }

    fn url_for(slot: &ProviderSlot, provider: ProviderId, path_and_query: &str) -> String {
        let base = slot.config.base_url.trim_end_matches('/');
        match endpoint_for(provider).auth() {
            AuthScheme::PathSegment => {
                let key = slot.api_key.as_ref().map_or("", |k| k.expose_secret());
                format!("{base}/{key}{path_and_query}")
            }
            AuthScheme::Header(_) => format!("{base}{path_and_query}"),
        }
    }

    async fn call(
        &self,
        slot: &ProviderSlot,
        provider: ProviderId,
        operation: Operation,
        params: &FetchParams,
    ) -> Result<Vec<Value>, FailureKind> {
        let endpoint = endpoint_for(provider);
        let request = endpoint.request(operation, params)?;
        let url = Self::url_for(slot, provider, &request.path_and_query());

        self.throttle.acquire(provider).await;

        // keys in the path stay out of the logs
        tracing::debug!(provider = %provider, operation = %operation, "GET {}", request.path_and_query());

        let mut builder = self
            .http
            .get(&url)
            .header("Accept", "application/json")
            .timeout(Duration::from_secs(slot.config.timeout_secs));
        if let (AuthScheme::Header(name), Some(key)) = (endpoint.auth(), slot.api_key.as_ref()) {
            builder = builder.header(name, key.expose_secret());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| FailureKind::from_reqwest(&e))?;
        let status = response.status();

        if status.as_u16() == 429 {
            let retry_after_secs = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
            return Err(FailureKind::RateLimited { retry_after_secs });
        }

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = if text.trim().is_empty() {
                status.canonical_reason().unwrap_or("unknown").to_string()
            } else {
                text
            };
            return Err(FailureKind::Http {
                status: status.as_u16(),
                message,
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| FailureKind::Decode(e.to_string()))?;
        let rows = endpoint.extract_rows(operation, params, body)?;

        if rows.is_empty() {
            return Err(FailureKind::EmptyPayload);
        }
        Ok(rows)
    }
}

#[async_trait]
impl Extractor for ExtractionGateway {
    async fn fetch(
        &self,
        provider: ProviderId,
        operation: Operation,
        params: &FetchParams,
    ) -> Result<RawBatch, ExtractionFailure> {
        let slot = match self.slots.get(&provider) {
            Some(slot) if slot.config.is_usable(provider) => slot,
            _ => {
                return Err(ExtractionFailure::new(
                    provider,
                    operation,
                    FailureKind::NotConfigured("provider disabled or missing API key".to_string()),
                ))
            }
        };

        let started = Instant::now();
        match self.call(slot, provider, operation, params).await {
            Ok(rows) => {
                self.record(provider, None);
                tracing::debug!(
                    provider = %provider,
                    operation = %operation,
                    rows = rows.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Extracted batch"
                );
                Ok(RawBatch::new(provider, operation, params.request_id(), rows))
            }
            Err(kind) => {
                // requests that never reached the wire are not counted
                if !matches!(kind, FailureKind::NotConfigured(_) | FailureKind::Unsupported) {
                    self.record(provider, Some(&kind));
                }
                match &kind {
                    FailureKind::RateLimited { retry_after_secs } => tracing::warn!(
                        provider = %provider,
                        operation = %operation,
                        retry_after_secs,
                        "Provider quota exhausted"
                    ),
                    FailureKind::EmptyPayload => tracing::debug!(
                        provider = %provider,
                        operation = %operation,
                        "Provider returned no rows"
                    ),
                    other => tracing::warn!(
                        provider = %provider,
                        operation = %operation,
                        error = %other,
                        "Provider request failed"
                    ),
                }
                Err(ExtractionFailure::new(provider, operation, kind))
            }
        }
    }

    fn is_configured(&self, provider: ProviderId) -> bool {
        self.slots
            .get(&provider)
            .is_some_and(|slot| slot.config.is_usable(provider))
    }
}
