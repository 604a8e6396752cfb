use crate::adapter::{AdapterTable, ProviderAdapter};
use crate::{matches, standings, teams};
use serde_json::Value;
use sports_etl_core::{
    ConsistencyPolicy, MatchRecord, PlayerRecord, ProviderId, StandingRecord, TeamRecord,
    TransformationResult,
};

/// Entry point of the transformation stage.
///
/// Pure: the same rows and provider tag always give the same result. The
/// provider tag selects the adapter from the table.
#[derive(Debug, Default)]
pub struct Transformer {
    adapters: AdapterTable,
    policy: ConsistencyPolicy,
}

impl Transformer {
    #[must_use]
    pub fn new(policy: ConsistencyPolicy) -> Self {
        Self {
            adapters: AdapterTable::builtin(),
            policy,
        }
    }

    #[must_use]
    pub fn with_adapters(mut self, adapters: AdapterTable) -> Self {
        self.adapters = adapters;
        self
    }

    #[must_use]
    pub fn policy(&self) -> ConsistencyPolicy {
        self.policy
    }

    #[must_use]
    pub fn standings(&self, rows: &[Value], provider: ProviderId) -> TransformationResult<StandingRecord> {
        match self.adapters.get(provider) {
            Some(adapter) => standings::transform_standings(rows, adapter, self.policy),
            None => unmapped(rows, provider),
        }
    }

    #[must_use]
    pub fn matches(&self, rows: &[Value], provider: ProviderId) -> TransformationResult<MatchRecord> {
        match self.adapters.get(provider) {
            Some(adapter) => matches::transform_matches(rows, adapter),
            None => unmapped(rows, provider),
        }
    }

    #[must_use]
    pub fn teams(
        &self,
        rows: &[Value],
        provider: ProviderId,
        league: Option<&str>,
    ) -> TransformationResult<TeamRecord> {
        match self.adapters.get(provider) {
            Some(adapter) => teams::transform_teams(rows, adapter, league),
            None => unmapped(rows, provider),
        }
    }

    #[must_use]
    pub fn squad(&self, rows: &[Value], provider: ProviderId, team_id: &str) -> TransformationResult<PlayerRecord> {
        match self.adapters.get(provider) {
            Some(adapter) => teams::transform_squad(rows, adapter, team_id),
            None => unmapped(rows, provider),
        }
    }

    /// The adapter registered for a provider.
    #[must_use]
    pub fn adapter(&self, provider: ProviderId) -> Option<&dyn ProviderAdapter> {
        self.adapters.get(provider)
    }
}

/// Every row is dropped when no adapter knows the provider's schema.
fn unmapped<T>(rows: &[Value], provider: ProviderId) -> TransformationResult<T> {
    let mut tally = crate::tally::Tally::new("unmapped", provider, rows.len());
    for index in 0..rows.len() {
        tally.dropped(index, &format!("no adapter for provider {provider}"));
    }
    tally.finish(Vec::new())
}
