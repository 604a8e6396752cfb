//! football-data.org v4 (provider B).
//!
//! Token in `X-Auth-Token`; competitions are addressed by code (`PL`, `PD`)
//! and seasons by their starting year. There is no search endpoint, so team
//! search lists `/teams` and filters by name locally.

use super::{id_string, required, rows_at, type_name, AuthScheme, EndpointRequest, ProviderEndpoint};
use crate::error::FailureKind;
use crate::operation::{FetchParams, Operation, StatusFilter};
use serde_json::Value;
use sports_etl_core::ProviderId;

/// Page size for the team listing used by search.
const TEAM_LISTING_LIMIT: u32 = 500;

#[derive(Debug, Clone, Copy, Default)]
pub struct FootballData;

impl ProviderEndpoint for FootballData {
    fn provider(&self) -> ProviderId {
        ProviderId::FootballData
    }

    fn auth(&self) -> AuthScheme {
        AuthScheme::Header("X-Auth-Token")
    }

    fn request(&self, operation: Operation, params: &FetchParams) -> Result<EndpointRequest, FailureKind> {
        let competition = |what: &str| -> Result<EndpointRequest, FailureKind> {
            let code = required(&params.league_id, "competition code")?;
            let mut req = EndpointRequest::new(format!("/competitions/{code}/{what}"));
            if let Some(season) = params.season {
                req = req.param("season", season.start_year.to_string());
            }
            Ok(req)
        };

        match operation {
            Operation::SearchTeam => {
                required(&params.team_name, "team name")?;
                Ok(EndpointRequest::new("/teams").param("limit", TEAM_LISTING_LIMIT.to_string()))
            }
            Operation::Standings => competition("standings"),
            Operation::Teams => competition("teams"),
            Operation::Matches => {
                let req = competition("matches")?;
                Ok(match params.status {
                    Some(StatusFilter::Scheduled) => req.param("status", "SCHEDULED"),
                    Some(StatusFilter::Finished) => req.param("status", "FINISHED"),
                    None => req,
                })
            }
            Operation::Squad => Ok(EndpointRequest::new(format!(
                "/teams/{}",
                required(&params.team_id, "team id")?
            ))),
        }
    }

    fn extract_rows(
        &self,
        operation: Operation,
        params: &FetchParams,
        body: Value,
    ) -> Result<Vec<Value>, FailureKind> {
        match operation {
            Operation::Standings => total_table(&body),
            Operation::Matches => rows_at(&body, "matches"),
            Operation::Teams => rows_at(&body, "teams"),
            Operation::Squad => {
                let team_id = id_string(body.get("id"));
                let mut rows = rows_at(&body, "squad")?;
                // squad entries do not repeat the team id
                if let Some(team_id) = team_id {
                    for row in &mut rows {
                        if let Value::Object(map) = row {
                            map.entry("teamId").or_insert_with(|| Value::String(team_id.clone()));
                        }
                    }
                }
                Ok(rows)
            }
            Operation::SearchTeam => {
                let wanted = required(&params.team_name, "team name")?.trim().to_lowercase();
                let rows = rows_at(&body, "teams")?;
                Ok(rows
                    .into_iter()
                    .filter(|row| {
                        ["name", "shortName", "tla"].iter().any(|key| {
                            row.get(*key)
                                .and_then(Value::as_str)
                                .is_some_and(|v| v.to_lowercase().contains(&wanted))
                        })
                    })
                    .collect())
            }
        }
    }

    fn team_identity(&self, row: &Value) -> Option<(String, String)> {
        let id = id_string(row.get("id"))?;
        let name = row.get("name")?.as_str()?.to_string();
        Some((id, name))
    }
}

/// The `TOTAL` table of a standings response (home/away splits are ignored).
fn total_table(body: &Value) -> Result<Vec<Value>, FailureKind> {
    let groups = rows_at(body, "standings")?;
    let total = groups
        .iter()
        .find(|g| g.get("type").and_then(Value::as_str) == Some("TOTAL"))
        .or_else(|| groups.first());

    match total.and_then(|g| g.get("table")) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(rows)) => Ok(rows.clone()),
        Some(other) => Err(FailureKind::Decode(format!(
            "expected array at 'standings[].table', found {}",
            type_name(other)
        ))),
    }
}
