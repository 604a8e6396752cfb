//! API-Football v3 (provider C).
//!
//! Key in `x-apisports-key`. Every body is wrapped in `{"errors": ..., "response": [...]}`
//! and quota exhaustion is reported inside a 200 response via `errors`.

use super::{id_string, required, rows_at, AuthScheme, EndpointRequest, ProviderEndpoint};
use crate::error::FailureKind;
use crate::operation::{FetchParams, Operation, StatusFilter};
use serde_json::Value;
use sports_etl_core::ProviderId;

/// Wait suggested when the provider signals quota exhaustion in the body.
const QUOTA_RETRY_SECS: u64 = 60;

#[derive(Debug, Clone, Copy, Default)]
pub struct ApiFootball;

impl ProviderEndpoint for ApiFootball {
    fn provider(&self) -> ProviderId {
        ProviderId::ApiFootball
    }

    fn auth(&self) -> AuthScheme {
        AuthScheme::Header("x-apisports-key")
    }

    fn request(&self, operation: Operation, params: &FetchParams) -> Result<EndpointRequest, FailureKind> {
        let league_scoped = |path: &str| -> Result<EndpointRequest, FailureKind> {
            let mut req = EndpointRequest::new(path).param("league", required(&params.league_id, "league id")?);
            if let Some(season) = params.season {
                req = req.param("season", season.start_year.to_string());
            }
            Ok(req)
        };

        match operation {
            Operation::SearchTeam => Ok(EndpointRequest::new("/teams")
                .param("search", required(&params.team_name, "team name")?)),
            Operation::Standings => league_scoped("/standings"),
            Operation::Teams => league_scoped("/teams"),
            Operation::Matches => {
                let req = league_scoped("/fixtures")?;
                Ok(match params.status {
                    Some(StatusFilter::Scheduled) => req.param("status", "NS"),
                    Some(StatusFilter::Finished) => req.param("status", "FT-AET-PEN"),
                    None => req,
                })
            }
            Operation::Squad => Ok(EndpointRequest::new("/players/squads")
                .param("team", required(&params.team_id, "team id")?)),
        }
    }

    fn extract_rows(
        &self,
        operation: Operation,
        _params: &FetchParams,
        body: Value,
    ) -> Result<Vec<Value>, FailureKind> {
        check_errors(&body)?;
        let response = rows_at(&body, "response")?;

        match operation {
            Operation::Standings => Ok(response
                .first()
                .and_then(|r| r.pointer("/league/standings/0"))
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default()),
            Operation::Squad => {
                let Some(entry) = response.first() else {
                    return Ok(Vec::new());
                };
                let team_id = id_string(entry.pointer("/team/id"));
                let mut rows = rows_at(entry, "players")?;
                if let Some(team_id) = team_id {
                    for row in &mut rows {
                        if let Value::Object(map) = row {
                            map.entry("teamId").or_insert_with(|| Value::String(team_id.clone()));
                        }
                    }
                }
                Ok(rows)
            }
            Operation::SearchTeam | Operation::Teams | Operation::Matches => Ok(response),
        }
    }

    fn team_identity(&self, row: &Value) -> Option<(String, String)> {
        let id = id_string(row.pointer("/team/id"))?;
        let name = row.pointer("/team/name")?.as_str()?.to_string();
        Some((id, name))
    }
}

/// Maps a non-empty `errors` member to a failure.
fn check_errors(body: &Value) -> Result<(), FailureKind> {
    let message = match body.get("errors") {
        Some(Value::Object(map)) if !map.is_empty() => {
            if map.contains_key("requests") || map.contains_key("rateLimit") {
                return Err(FailureKind::RateLimited {
                    retry_after_secs: QUOTA_RETRY_SECS,
                });
            }
            Value::Object(map.clone()).to_string()
        }
        Some(Value::Array(list)) if !list.is_empty() => Value::Array(list.clone()).to_string(),
        _ => return Ok(()),
    };
    Err(FailureKind::Decode(format!("provider reported errors: {message}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sports_etl_core::Season;

    #[test]
    fn test_standings_request() {
        let params = FetchParams::league("39", Season::new(2024));
        let req = ApiFootball.request(Operation::Standings, &params).unwrap();
        assert_eq!(req.path_and_query(), "/standings?league=39&season=2024");
    }

    #[test]
    fn test_standings_envelope() {
        let body = json!({
            "errors": [],
            "response": [{"league": {"id": 39, "standings": [[{"rank": 1}, {"rank": 2}]]}}]
        });
        let rows = ApiFootball
            .extract_rows(Operation::Standings, &FetchParams::default(), body)
            .unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_quota_error_in_body() {
        let body = json!({
            "errors": {"requests": "You have reached the request limit for the day"},
            "response": []
        });
        let err = ApiFootball
            .extract_rows(Operation::Teams, &FetchParams::default(), body)
            .unwrap_err();
        assert!(matches!(err, FailureKind::RateLimited { .. }));
    }

    #[test]
    fn test_token_error_in_body() {
        let body = json!({"errors": {"token": "Missing application key"}, "response": []});
        let err = ApiFootball
            .extract_rows(Operation::Teams, &FetchParams::default(), body)
            .unwrap_err();
        assert!(matches!(err, FailureKind::Decode(_)));
    }

    #[test]
    fn test_squad_envelope() {
        let body = json!({"errors": [], "response": [
            {"team": {"id": 42, "name": "Arsenal"}, "players": [{"id": 1, "name": "B. Saka"}]}
        ]});
        let rows = ApiFootball
            .extract_rows(Operation::Squad, &FetchParams::team("42"), body)
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["teamId"], "42");
    }
}
