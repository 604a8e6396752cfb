//! Typed per-provider field mapping.
//!
//! An adapter reads one raw provider row into a draft whose fields are all
//! optional; the transformer then validates, fills and scores drafts the
//! same way regardless of where they came from.

use chrono::{NaiveDate, NaiveTime};
use serde_json::Value;
use sports_etl_core::ProviderId;
use std::collections::HashMap;

use crate::providers::{ApiFootballAdapter, FootballDataAdapter, TheSportsDbAdapter};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StandingDraft {
    pub position: Option<i64>,
    pub team_id: Option<String>,
    pub team_name: Option<String>,
    pub crest_url: Option<String>,
    pub played: Option<i64>,
    pub won: Option<i64>,
    pub drawn: Option<i64>,
    pub lost: Option<i64>,
    pub points: Option<i64>,
    pub goals_for: Option<i64>,
    pub goals_against: Option<i64>,
    pub goal_difference: Option<i64>,
    pub form: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchDraft {
    pub id: Option<String>,
    pub date: Option<NaiveDate>,
    pub kickoff: Option<NaiveTime>,
    pub round: Option<String>,
    pub home_id: Option<String>,
    pub home_name: Option<String>,
    pub away_id: Option<String>,
    pub away_name: Option<String>,
    pub home_score: Option<i64>,
    pub away_score: Option<i64>,
    pub venue: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamDraft {
    pub id: Option<String>,
    pub name: Option<String>,
    pub short_name: Option<String>,
    pub crest_url: Option<String>,
    pub country: Option<String>,
    pub founded: Option<i64>,
    pub stadium_name: Option<String>,
    pub stadium_capacity: Option<i64>,
    pub stadium_city: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerDraft {
    pub id: Option<String>,
    pub name: Option<String>,
    pub team_id: Option<String>,
    pub position: Option<String>,
    pub shirt_number: Option<i64>,
    pub nationality: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
}

/// Maps one provider's raw rows into drafts.
pub trait ProviderAdapter: Send + Sync {
    fn provider(&self) -> ProviderId;

    fn standing(&self, row: &Value) -> StandingDraft;

    fn fixture(&self, row: &Value) -> MatchDraft;

    fn team(&self, row: &Value) -> TeamDraft;

    fn player(&self, row: &Value) -> PlayerDraft;
}

/// One adapter per provider, selected by id.
pub struct AdapterTable {
    adapters: HashMap<ProviderId, Box<dyn ProviderAdapter>>,
}

impl AdapterTable {
    /// Table with the built-in adapter for every provider.
    #[must_use]
    pub fn builtin() -> Self {
        Self::empty()
            .with_adapter(Box::new(TheSportsDbAdapter))
            .with_adapter(Box::new(FootballDataAdapter))
            .with_adapter(Box::new(ApiFootballAdapter))
    }

    #[must_use]
    pub fn empty() -> Self {
        Self {
            adapters: HashMap::new(),
        }
    }

    /// Registers (or replaces) the adapter for its provider.
    #[must_use]
    pub fn with_adapter(mut self, adapter: Box<dyn ProviderAdapter>) -> Self {
        self.adapters.insert(adapter.provider(), adapter);
        self
    }

    #[must_use]
    pub fn get(&self, provider: ProviderId) -> Option<&dyn ProviderAdapter> {
        self.adapters.get(&provider).map(|adapter| &**adapter)
    }
}

impl Default for AdapterTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl std::fmt::Debug for AdapterTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut providers: Vec<_> = self.adapters.keys().collect();
        providers.sort();
        f.debug_struct("AdapterTable")
            .field("providers", &providers)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_covers_every_provider() {
        let table = AdapterTable::builtin();
        for provider in ProviderId::ALL {
            assert_eq!(table.get(provider).map(|a| a.provider()), Some(provider));
        }
        assert!(AdapterTable::empty().get(ProviderId::TheSportsDb).is_none());
    }
}
