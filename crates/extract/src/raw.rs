use crate::operation::Operation;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sports_etl_core::ProviderId;

/// Untransformed rows returned by one provider call.
///
/// Rows keep the provider's own field names; the transformer maps them.
#[derive(Debug, Clone, PartialEq)]
pub struct RawBatch {
    pub provider: ProviderId,
    pub operation: Operation,
    /// League or team identifier used in the request.
    pub request_id: String,
    pub rows: Vec<Value>,
    pub extracted_at: DateTime<Utc>,
}

impl RawBatch {
    #[must_use]
    pub fn new(
        provider: ProviderId,
        operation: Operation,
        request_id: impl Into<String>,
        rows: Vec<Value>,
    ) -> Self {
        Self {
            provider,
            operation,
            request_id: request_id.into(),
            rows,
            extracted_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Every row is a JSON object.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        self.rows.iter().all(Value::is_object)
    }
}
