//! TheSportsDB v1 (provider A).
//!
//! The API key is a path segment (`/api/v1/json/{key}/...`); the public key
//! `3` works without registration. Empty results come back as `null`.

use super::{id_string, required, rows_at, AuthScheme, EndpointRequest, ProviderEndpoint};
use crate::error::FailureKind;
use crate::operation::{FetchParams, Operation, StatusFilter};
use serde_json::Value;
use sports_etl_core::ProviderId;

#[derive(Debug, Clone, Copy, Default)]
pub struct TheSportsDb;

impl ProviderEndpoint for TheSportsDb {
    fn provider(&self) -> ProviderId {
        ProviderId::TheSportsDb
    }

    fn auth(&self) -> AuthScheme {
        AuthScheme::PathSegment
    }

    fn request(&self, operation: Operation, params: &FetchParams) -> Result<EndpointRequest, FailureKind> {
        let request = match operation {
            Operation::SearchTeam => EndpointRequest::new("/searchteams.php")
                .param("t", required(&params.team_name, "team name")?),
            Operation::Standings => {
                let mut req = EndpointRequest::new("/lookuptable.php")
                    .param("l", required(&params.league_id, "league id")?);
                if let Some(season) = params.season {
                    req = req.param("s", season.to_string());
                }
                req
            }
            Operation::Matches => {
                let league = required(&params.league_id, "league id")?;
                match (params.status, params.season) {
                    (Some(StatusFilter::Scheduled), _) | (_, None) => {
                        EndpointRequest::new("/eventsnextleague.php").param("id", league)
                    }
                    (_, Some(season)) => EndpointRequest::new("/eventsseason.php")
                        .param("id", league)
                        .param("s", season.to_string()),
                }
            }
            Operation::Teams => EndpointRequest::new("/lookup_all_teams.php")
                .param("id", required(&params.league_id, "league id")?),
            Operation::Squad => EndpointRequest::new("/lookup_all_players.php")
                .param("id", required(&params.team_id, "team id")?),
        };
        Ok(request)
    }

    fn extract_rows(
        &self,
        operation: Operation,
        params: &FetchParams,
        body: Value,
    ) -> Result<Vec<Value>, FailureKind> {
        match operation {
            Operation::SearchTeam | Operation::Teams => rows_at(&body, "teams"),
            Operation::Standings => rows_at(&body, "table"),
            Operation::Squad => rows_at(&body, "player"),
            Operation::Matches => {
                let rows = rows_at(&body, "events")?;
                // eventsseason returns the whole season; keep only the requested side
                Ok(match params.status {
                    Some(StatusFilter::Finished) => rows.into_iter().filter(has_score).collect(),
                    Some(StatusFilter::Scheduled) => {
                        rows.into_iter().filter(|r| !has_score(r)).collect()
                    }
                    None => rows,
                })
            }
        }
    }

    fn team_identity(&self, row: &Value) -> Option<(String, String)> {
        let id = id_string(row.get("idTeam"))?;
        let name = row.get("strTeam")?.as_str()?.to_string();
        Some((id, name))
    }
}

fn has_score(row: &Value) -> bool {
    let present = |key: &str| row.get(key).is_some_and(|v| !v.is_null() && v != "");
    present("intHomeScore") && present("intAwayScore")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sports_etl_core::Season;

    #[test]
    fn test_standings_request() {
        let params = FetchParams::league("4328", Season::new(2024));
        let req = TheSportsDb.request(Operation::Standings, &params).unwrap();
        assert_eq!(req.path_and_query(), "/lookuptable.php?l=4328&s=2024-2025");
    }

    #[test]
    fn test_scheduled_matches_use_next_league_events() {
        let params = FetchParams::league("4328", Season::new(2024)).with_status(StatusFilter::Scheduled);
        let req = TheSportsDb.request(Operation::Matches, &params).unwrap();
        assert_eq!(req.path, "/eventsnextleague.php");
    }

    #[test]
    fn test_squad_requires_team_id() {
        let err = TheSportsDb
            .request(Operation::Squad, &FetchParams::default())
            .unwrap_err();
        assert!(matches!(err, FailureKind::NotConfigured(_)));
    }

    #[test]
    fn test_null_table_is_empty() {
        let rows = TheSportsDb
            .extract_rows(Operation::Standings, &FetchParams::default(), json!({"table": null}))
            .unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_finished_filter_keeps_scored_events() {
        let body = json!({"events": [
            {"idEvent": "1", "intHomeScore": "2", "intAwayScore": "1"},
            {"idEvent": "2", "intHomeScore": null, "intAwayScore": null}
        ]});
        let params = FetchParams::league("4328", Season::new(2024)).with_status(StatusFilter::Finished);
        let rows = TheSportsDb.extract_rows(Operation::Matches, &params, body).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["idEvent"], "1");
    }
}
