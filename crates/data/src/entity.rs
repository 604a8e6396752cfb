use serde::{Deserialize, Serialize};
use sports_etl_core::{MatchRecord, PlayerRecord, ProviderId, Season, StandingRecord, TeamRecord};
use std::fmt;

/// Kind of dataset the loader writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Standings,
    Matches,
    /// Upcoming fixtures written by quick updates.
    Fixtures,
    Teams,
    Squad,
}

impl EntityKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Standings => "standings",
            EntityKind::Matches => "matches",
            EntityKind::Fixtures => "fixtures",
            EntityKind::Teams => "teams",
            EntityKind::Squad => "squad",
        }
    }

    /// Durable-store collection. Fixtures and results share one.
    #[must_use]
    pub const fn collection(&self) -> &'static str {
        match self {
            EntityKind::Standings => "standings",
            EntityKind::Matches | EntityKind::Fixtures => "matches",
            EntityKind::Teams => "teams",
            EntityKind::Squad => "players",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Context a record needs to build its durable-store key.
#[derive(Debug, Clone, Copy)]
pub struct KeyScope<'a> {
    pub league: &'a str,
    pub season: Option<Season>,
    /// Provider that sourced the batch.
    pub provider: ProviderId,
}

/// A canonical record the loader can persist.
pub trait Loadable: Serialize {
    /// Idempotency key in the durable store.
    fn natural_key(&self, scope: KeyScope<'_>) -> String;
}

impl Loadable for StandingRecord {
    fn natural_key(&self, scope: KeyScope<'_>) -> String {
        match scope.season {
            Some(season) => StandingRecord::natural_key(self, scope.league, season),
            None => format!("{}:{}", scope.league, self.team.id),
        }
    }
}

impl Loadable for MatchRecord {
    fn natural_key(&self, scope: KeyScope<'_>) -> String {
        MatchRecord::natural_key(self, scope.league)
    }
}

// Team and player ids are only unique within a provider.
impl Loadable for TeamRecord {
    fn natural_key(&self, _scope: KeyScope<'_>) -> String {
        format!("{}:{}", self.source, self.id)
    }
}

impl Loadable for PlayerRecord {
    fn natural_key(&self, scope: KeyScope<'_>) -> String {
        format!("{}:{}", scope.provider, PlayerRecord::natural_key(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixtures_share_the_matches_collection() {
        assert_eq!(EntityKind::Fixtures.collection(), EntityKind::Matches.collection());
        assert_eq!(EntityKind::Squad.collection(), "players");
        assert_eq!(EntityKind::Fixtures.to_string(), "fixtures");
    }

    #[test]
    fn test_team_and_player_keys_are_provider_scoped() {
        let team = |source: ProviderId| TeamRecord {
            id: "57".to_string(),
            name: "Arsenal FC".to_string(),
            short_name: "Arsenal".to_string(),
            crest_url: None,
            country: None,
            league: None,
            founded: None,
            stadium: None,
            source,
        };
        let scope = |provider| KeyScope {
            league: "premier_league",
            season: None,
            provider,
        };

        let fd = team(ProviderId::FootballData).natural_key(scope(ProviderId::FootballData));
        let tsdb = team(ProviderId::TheSportsDb).natural_key(scope(ProviderId::TheSportsDb));
        assert_eq!(fd, "football_data:57");
        assert_ne!(fd, tsdb);

        let player = PlayerRecord {
            id: "1".to_string(),
            name: "B. Saka".to_string(),
            team_id: "57".to_string(),
            position: None,
            shirt_number: None,
            nationality: None,
            date_of_birth: None,
        };
        assert_eq!(Loadable::natural_key(&player, scope(ProviderId::ApiFootball)), "api_football:57:1");
    }
}
