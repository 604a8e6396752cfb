//! Extraction failures.
//!
//! The gateway never raises: every failed call becomes an
//! [`ExtractionFailure`] value that the fallback resolver uses to move on to
//! the next provider.

use crate::operation::Operation;
use sports_etl_core::ProviderId;
use thiserror::Error;

/// Why a provider call produced no usable batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FailureKind {
    /// Non-success HTTP status other than 429.
    #[error("HTTP {status}: {message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body or reason phrase.
        message: String,
    },

    /// Quota exhausted (HTTP 429).
    #[error("quota exhausted, retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds the provider asked us to wait.
        retry_after_secs: u64,
    },

    /// Request timed out.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// Connection or transport error.
    #[error("network error: {0}")]
    Network(String),

    /// Body was not the JSON envelope we expected.
    #[error("malformed payload: {0}")]
    Decode(String),

    /// Well-formed response with no rows.
    #[error("empty payload")]
    EmptyPayload,

    /// Provider disabled, missing a key, or missing an identifier for the request.
    #[error("not configured: {0}")]
    NotConfigured(String),

    /// Provider does not offer this operation.
    #[error("operation not supported")]
    Unsupported,
}

/// A failed gateway call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{provider} {operation} failed: {kind}")]
pub struct ExtractionFailure {
    pub provider: ProviderId,
    pub operation: Operation,
    pub kind: FailureKind,
}

impl ExtractionFailure {
    #[must_use]
    pub fn new(provider: ProviderId, operation: Operation, kind: FailureKind) -> Self {
        Self {
            provider,
            operation,
            kind,
        }
    }

    /// True for quota/throttling rejections.
    #[must_use]
    pub fn is_quota(&self) -> bool {
        matches!(self.kind, FailureKind::RateLimited { .. })
    }

    /// True for failures that may succeed later (timeouts, 5xx, connection errors, quota).
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match &self.kind {
            FailureKind::Timeout(_) | FailureKind::Network(_) | FailureKind::RateLimited { .. } => {
                true
            }
            FailureKind::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

impl FailureKind {
    /// Classifies a transport error from reqwest.
    #[must_use]
    pub fn from_reqwest(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_connect() {
            Self::Network(format!("connection failed: {err}"))
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}
