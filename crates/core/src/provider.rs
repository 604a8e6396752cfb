//! Upstream provider identities and data needs.
//!
//! Three providers feed the pipeline:
//! - TheSportsDB: no authentication, generous quota, patchy league coverage
//! - football-data.org: token-authenticated, ~10 requests/minute, authoritative
//!   standings for the major competitions
//! - API-Football: key-authenticated, daily quota, better roster coverage

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of an external sports-data provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ProviderId {
    /// TheSportsDB (provider A).
    #[serde(rename = "thesportsdb")]
    TheSportsDb,
    /// football-data.org (provider B).
    #[serde(rename = "football_data")]
    FootballData,
    /// API-Football (provider C).
    #[serde(rename = "api_football")]
    ApiFootball,
}

impl ProviderId {
    /// Every known provider.
    pub const ALL: [ProviderId; 3] = [
        ProviderId::TheSportsDb,
        ProviderId::FootballData,
        ProviderId::ApiFootball,
    ];

    /// Returns the stable string tag used in file metadata and logs.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ProviderId::TheSportsDb => "thesportsdb",
            ProviderId::FootballData => "football_data",
            ProviderId::ApiFootball => "api_football",
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "thesportsdb" | "sportsdb" => Ok(ProviderId::TheSportsDb),
            "football_data" | "football-data" | "footballdata" => Ok(ProviderId::FootballData),
            "api_football" | "api-football" | "apifootball" => Ok(ProviderId::ApiFootball),
            other => Err(UnknownProvider(other.to_string())),
        }
    }
}

/// Error returned when parsing an unrecognised provider tag.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown provider: {0}")]
pub struct UnknownProvider(pub String);

/// A kind of data the pipeline needs from upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataNeed {
    Standings,
    Matches,
    Teams,
    Squad,
}

impl DataNeed {
    /// Default provider priority for this need.
    ///
    /// football-data.org is authoritative for competition tables and fixtures,
    /// TheSportsDB has the broadest team catalogue, API-Football the best squads.
    #[must_use]
    pub const fn default_priority(&self) -> &'static [ProviderId] {
        match self {
            DataNeed::Standings | DataNeed::Matches => &[
                ProviderId::FootballData,
                ProviderId::TheSportsDb,
                ProviderId::ApiFootball,
            ],
            DataNeed::Teams => &[
                ProviderId::TheSportsDb,
                ProviderId::FootballData,
                ProviderId::ApiFootball,
            ],
            DataNeed::Squad => &[
                ProviderId::TheSportsDb,
                ProviderId::ApiFootball,
                ProviderId::FootballData,
            ],
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            DataNeed::Standings => "standings",
            DataNeed::Matches => "matches",
            DataNeed::Teams => "teams",
            DataNeed::Squad => "squad",
        }
    }
}

impl fmt::Display for DataNeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_round_trips_through_str() {
        for provider in ProviderId::ALL {
            assert_eq!(provider.as_str().parse::<ProviderId>().unwrap(), provider);
        }
    }

    #[test]
    fn test_provider_parse_aliases() {
        assert_eq!("football-data".parse::<ProviderId>().unwrap(), ProviderId::FootballData);
        assert_eq!(" API-Football ".parse::<ProviderId>().unwrap(), ProviderId::ApiFootball);
        assert!("espn".parse::<ProviderId>().is_err());
    }

    #[test]
    fn test_provider_serde_matches_tag() {
        let json = serde_json::to_string(&ProviderId::TheSportsDb).unwrap();
        assert_eq!(json, "\"thesportsdb\"");
        let back: ProviderId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ProviderId::TheSportsDb);
    }

    #[test]
    fn test_default_priorities_cover_every_provider() {
        for need in [DataNeed::Standings, DataNeed::Matches, DataNeed::Teams, DataNeed::Squad] {
            let order = need.default_priority();
            assert_eq!(order.len(), 3);
            for provider in ProviderId::ALL {
                assert!(order.contains(&provider));
            }
        }
    }

    #[test]
    fn test_squad_prefers_thesportsdb_then_api_football() {
        assert_eq!(
            DataNeed::Squad.default_priority()[..2],
            [ProviderId::TheSportsDb, ProviderId::ApiFootball]
        );
    }
}
