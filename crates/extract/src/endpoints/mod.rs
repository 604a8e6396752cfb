//! Provider bindings.
//!
//! A [`ProviderEndpoint`] knows how one provider spells each [`Operation`]
//! as an HTTP request and where the rows sit in its response envelope. It
//! performs no I/O; the gateway does the calling.

mod api_football;
mod football_data;
mod thesportsdb;

pub use api_football::ApiFootball;
pub use football_data::FootballData;
pub use thesportsdb::TheSportsDb;

use crate::error::FailureKind;
use crate::operation::{FetchParams, Operation};
use serde_json::Value;
use sports_etl_core::ProviderId;

/// How the API key travels with a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    /// The key is the first path segment after the base URL.
    PathSegment,
    /// The key is sent in the named header.
    Header(&'static str),
}

/// A request relative to the provider's base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointRequest {
    pub path: String,
    pub query: Vec<(&'static str, String)>,
}

impl EndpointRequest {
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: Vec::new(),
        }
    }

    #[must_use]
    pub fn param(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.query.push((key, value.into()));
        self
    }

    /// Path plus encoded query string.
    #[must_use]
    pub fn path_and_query(&self) -> String {
        if self.query.is_empty() {
            return self.path.clone();
        }
        let query: Vec<String> = self
            .query
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect();
        format!("{}?{}", self.path, query.join("&"))
    }
}

/// Request building and envelope unwrapping for one provider.
pub trait ProviderEndpoint: Send + Sync {
    fn provider(&self) -> ProviderId;

    fn auth(&self) -> AuthScheme;

    /// Builds the request for an operation.
    ///
    /// # Errors
    /// `Unsupported` when the provider has no such call, `NotConfigured`
    /// when a parameter the call needs is missing.
    fn request(&self, operation: Operation, params: &FetchParams) -> Result<EndpointRequest, FailureKind>;

    /// Pulls the row array out of a decoded response body.
    ///
    /// # Errors
    /// `Decode` when the envelope has an unexpected shape, `RateLimited` when
    /// the provider reports quota exhaustion inside a 200 response.
    fn extract_rows(
        &self,
        operation: Operation,
        params: &FetchParams,
        body: Value,
    ) -> Result<Vec<Value>, FailureKind>;

    /// Team id and name from a search-team row.
    fn team_identity(&self, row: &Value) -> Option<(String, String)>;
}

static THESPORTSDB: TheSportsDb = TheSportsDb;
static FOOTBALL_DATA: FootballData = FootballData;
static API_FOOTBALL: ApiFootball = ApiFootball;

/// The binding for a provider.
#[must_use]
pub fn endpoint_for(provider: ProviderId) -> &'static dyn ProviderEndpoint {
    match provider {
        ProviderId::TheSportsDb => &THESPORTSDB,
        ProviderId::FootballData => &FOOTBALL_DATA,
        ProviderId::ApiFootball => &API_FOOTBALL,
    }
}

/// Picks the best search hit for `name`: an exact (case-insensitive) name
/// match when present, otherwise the first hit.
#[must_use]
pub fn best_search_hit(provider: ProviderId, rows: &[Value], name: &str) -> Option<String> {
    let endpoint = endpoint_for(provider);
    let hits: Vec<(String, String)> = rows.iter().filter_map(|r| endpoint.team_identity(r)).collect();
    let wanted = name.trim().to_lowercase();
    hits.iter()
        .find(|(_, hit)| hit.trim().to_lowercase() == wanted)
        .or_else(|| hits.first())
        .map(|(id, _)| id.clone())
}

fn required<'a>(value: &'a Option<String>, what: &str) -> Result<&'a str, FailureKind> {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| FailureKind::NotConfigured(format!("missing {what}")))
}

/// Rows under `key`; `null` or a missing key means no rows.
fn rows_at(body: &Value, key: &str) -> Result<Vec<Value>, FailureKind> {
    match body.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(rows)) => Ok(rows.clone()),
        Some(other) => Err(FailureKind::Decode(format!(
            "expected array at '{key}', found {}",
            type_name(other)
        ))),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Id as a string whether the provider sends it as a number or a string.
fn id_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_path_and_query_encodes_values() {
        let req = EndpointRequest::new("/searchteams.php").param("t", "Real Madrid");
        assert_eq!(req.path_and_query(), "/searchteams.php?t=Real%20Madrid");
        assert_eq!(EndpointRequest::new("/teams/57").path_and_query(), "/teams/57");
    }

    #[test]
    fn test_best_search_hit_prefers_exact_name() {
        let rows = vec![
            json!({"idTeam": "1", "strTeam": "Arsenal Tula"}),
            json!({"idTeam": "133604", "strTeam": "Arsenal"}),
        ];
        assert_eq!(
            best_search_hit(ProviderId::TheSportsDb, &rows, "arsenal"),
            Some("133604".to_string())
        );
        assert_eq!(
            best_search_hit(ProviderId::TheSportsDb, &rows, "Gunners"),
            Some("1".to_string())
        );
        assert_eq!(best_search_hit(ProviderId::TheSportsDb, &[], "Arsenal"), None);
    }

    #[test]
    fn test_rows_at_rejects_non_arrays() {
        assert!(rows_at(&json!({"table": null}), "table").unwrap().is_empty());
        assert!(rows_at(&json!({}), "table").unwrap().is_empty());
        assert!(matches!(
            rows_at(&json!({"table": "x"}), "table"),
            Err(FailureKind::Decode(_))
        ));
    }

    #[test]
    fn test_id_string_accepts_numbers() {
        assert_eq!(id_string(Some(&json!(57))), Some("57".to_string()));
        assert_eq!(id_string(Some(&json!(" 57 "))), Some("57".to_string()));
        assert_eq!(id_string(Some(&json!(""))), None);
        assert_eq!(id_string(None), None);
    }
}
