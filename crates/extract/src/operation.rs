//! Provider operations and their parameters.

use serde::{Deserialize, Serialize};
use sports_etl_core::{DataNeed, Season};
use std::fmt;

/// An upstream call every provider binding understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    SearchTeam,
    Standings,
    Matches,
    Teams,
    Squad,
}

impl Operation {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Operation::SearchTeam => "search_team",
            Operation::Standings => "standings",
            Operation::Matches => "matches",
            Operation::Teams => "teams",
            Operation::Squad => "squad",
        }
    }

    /// The league-scoped operation that serves a data need.
    #[must_use]
    pub const fn for_need(need: DataNeed) -> Self {
        match need {
            DataNeed::Standings => Operation::Standings,
            DataNeed::Matches => Operation::Matches,
            DataNeed::Teams => Operation::Teams,
            DataNeed::Squad => Operation::Squad,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Match status filter for [`Operation::Matches`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
    Scheduled,
    Finished,
}

/// Parameters of a provider call. Which fields matter depends on the operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchParams {
    /// Provider-specific league identifier.
    pub league_id: Option<String>,
    pub season: Option<Season>,
    /// Provider-specific team identifier.
    pub team_id: Option<String>,
    /// Team name for search.
    pub team_name: Option<String>,
    pub status: Option<StatusFilter>,
}

impl FetchParams {
    /// Parameters for a league-scoped call.
    #[must_use]
    pub fn league(league_id: impl Into<String>, season: Season) -> Self {
        Self {
            league_id: Some(league_id.into()),
            season: Some(season),
            ..Default::default()
        }
    }

    /// Parameters for a team-scoped call.
    #[must_use]
    pub fn team(team_id: impl Into<String>) -> Self {
        Self {
            team_id: Some(team_id.into()),
            ..Default::default()
        }
    }

    /// Parameters for a search by team name.
    #[must_use]
    pub fn search(team_name: impl Into<String>) -> Self {
        Self {
            team_name: Some(team_name.into()),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_status(mut self, status: StatusFilter) -> Self {
        self.status = Some(status);
        self
    }

    /// The identifier the request is about, recorded on the raw batch.
    #[must_use]
    pub fn request_id(&self) -> String {
        self.league_id
            .as_deref()
            .or(self.team_id.as_deref())
            .or(self.team_name.as_deref())
            .unwrap_or_default()
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_for_need() {
        assert_eq!(Operation::for_need(DataNeed::Standings), Operation::Standings);
        assert_eq!(Operation::for_need(DataNeed::Squad), Operation::Squad);
    }

    #[test]
    fn test_request_id_prefers_league() {
        let params = FetchParams::league("PL", Season::new(2024));
        assert_eq!(params.request_id(), "PL");
        assert_eq!(FetchParams::team("57").request_id(), "57");
        assert_eq!(FetchParams::search("Arsenal").request_id(), "Arsenal");
        assert_eq!(FetchParams::default().request_id(), "");
    }

    #[test]
    fn test_with_status() {
        let params = FetchParams::league("39", Season::new(2024)).with_status(StatusFilter::Scheduled);
        assert_eq!(params.status, Some(StatusFilter::Scheduled));
        assert_eq!(params.season, Some(Season::new(2024)));
    }
}
