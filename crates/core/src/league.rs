//! League descriptors and season inference.

use crate::provider::{DataNeed, ProviderId};
use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Season
// =============================================================================

/// A competition season identified by the calendar year it starts in.
///
/// Displays as `"2024-2025"`; [`Season::underscored`] gives the file-name form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Season {
    pub start_year: i32,
}

impl Season {
    #[must_use]
    pub const fn new(start_year: i32) -> Self {
        Self { start_year }
    }

    #[must_use]
    pub const fn end_year(&self) -> i32 {
        self.start_year + 1
    }

    /// `"2024_2025"`, as used in sink file names.
    #[must_use]
    pub fn underscored(&self) -> String {
        format!("{}_{}", self.start_year, self.end_year())
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start_year, self.end_year())
    }
}

/// Error returned when a season string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid season '{0}': expected YYYY, YYYY-YYYY or YYYY_YYYY")]
pub struct InvalidSeason(pub String);

impl FromStr for Season {
    type Err = InvalidSeason;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let invalid = || InvalidSeason(s.to_string());

        let mut parts = trimmed.split(['-', '_', '/']);
        let start: i32 = parts
            .next()
            .and_then(|p| p.parse().ok())
            .ok_or_else(invalid)?;

        match parts.next() {
            None => Ok(Season::new(start)),
            Some(end) => {
                let end: i32 = end.parse().map_err(|_| invalid())?;
                if end != start + 1 || parts.next().is_some() {
                    return Err(invalid());
                }
                Ok(Season::new(start))
            }
        }
    }
}

impl Serialize for Season {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Season {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// League descriptor
// =============================================================================

/// Priority class of a league: tier 1 leagues are refreshed first and most often.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Tier {
    One,
    Two,
    Three,
}

impl TryFrom<u8> for Tier {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Tier::One),
            2 => Ok(Tier::Two),
            3 => Ok(Tier::Three),
            other => Err(format!("tier must be 1, 2 or 3 (got {other})")),
        }
    }
}

impl From<Tier> for u8 {
    fn from(tier: Tier) -> Self {
        match tier {
            Tier::One => 1,
            Tier::Two => 2,
            Tier::Three => 3,
        }
    }
}

/// Per-provider identifiers of a league. Absent means the provider does not carry it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderIds {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thesportsdb: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub football_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_football: Option<String>,
}

impl ProviderIds {
    /// Returns the league's identifier at `provider`, if it has one.
    #[must_use]
    pub fn get(&self, provider: ProviderId) -> Option<&str> {
        match provider {
            ProviderId::TheSportsDb => self.thesportsdb.as_deref(),
            ProviderId::FootballData => self.football_data.as_deref(),
            ProviderId::ApiFootball => self.api_football.as_deref(),
        }
    }
}

/// Static description of a league. Immutable once the registry is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeagueDescriptor {
    /// Internal league code (e.g. "premier_league"), unique within a registry.
    pub code: String,
    pub name: String,
    pub country: String,
    pub continent: String,
    pub tier: Tier,
    #[serde(default)]
    pub provider_ids: ProviderIds,
    /// Month (1-12) in which a new season starts.
    pub season_start_month: u32,
    /// Nominal number of teams in the league.
    pub team_count: u32,
    /// Optional provider order overriding [`DataNeed::default_priority`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_priority: Option<Vec<ProviderId>>,
}

impl LeagueDescriptor {
    /// Season in progress on `date`.
    ///
    /// Before the season-start month the season began the previous year.
    #[must_use]
    pub fn season_at(&self, date: NaiveDate) -> Season {
        if date.month() < self.season_start_month {
            Season::new(date.year() - 1)
        } else {
            Season::new(date.year())
        }
    }

    /// Season in progress today (UTC).
    #[must_use]
    pub fn current_season(&self) -> Season {
        self.season_at(Utc::now().date_naive())
    }

    /// Full provider order for `need`, including providers without an id for this league.
    #[must_use]
    pub fn priority_for(&self, need: DataNeed) -> Vec<ProviderId> {
        match &self.provider_priority {
            Some(custom) => custom.clone(),
            None => need.default_priority().to_vec(),
        }
    }

    /// Providers to try for `need`, in order, restricted to those carrying this league.
    #[must_use]
    pub fn providers_for(&self, need: DataNeed) -> Vec<ProviderId> {
        self.priority_for(need)
            .into_iter()
            .filter(|p| self.provider_ids.get(*p).is_some())
            .collect()
    }
}
