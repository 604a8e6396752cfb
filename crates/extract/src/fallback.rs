//! Provider fallback.
//!
//! Walks a league's provider priority for a data need and stops at the first
//! provider that yields a non-empty batch of JSON objects. Exhausting every
//! provider is an ordinary outcome and yields `None`.

use crate::endpoints::best_search_hit;
use crate::error::FailureKind;
use crate::gateway::Extractor;
use crate::operation::{FetchParams, Operation, StatusFilter};
use crate::raw::RawBatch;
use sports_etl_core::{DataNeed, LeagueDescriptor, ProviderId, Season, TeamRecord};
use std::fmt;
use std::sync::Arc;

/// What happened when one provider was considered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// Not called: no identifier for the league/team, or provider unconfigured.
    Skipped(String),
    /// Called and failed.
    Failed(FailureKind),
    /// Called, but the rows were not usable.
    Rejected(String),
    Succeeded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    pub provider: ProviderId,
    pub outcome: AttemptOutcome,
}

impl fmt::Display for Attempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            AttemptOutcome::Skipped(why) => write!(f, "{}: skipped ({why})", self.provider),
            AttemptOutcome::Failed(kind) => write!(f, "{}: {kind}", self.provider),
            AttemptOutcome::Rejected(why) => write!(f, "{}: rejected ({why})", self.provider),
            AttemptOutcome::Succeeded => write!(f, "{}: ok", self.provider),
        }
    }
}

/// A batch together with the provider that supplied it.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub batch: RawBatch,
    /// Provider credited with the data.
    pub provider: ProviderId,
    /// Every provider considered, in order, ending with the winner.
    pub attempts: Vec<Attempt>,
}

/// Priority-ordered provider fallback.
#[derive(Clone)]
pub struct FallbackResolver {
    extractor: Arc<dyn Extractor>,
}

impl fmt::Debug for FallbackResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FallbackResolver").finish_non_exhaustive()
    }
}

impl FallbackResolver {
    #[must_use]
    pub fn new(extractor: Arc<dyn Extractor>) -> Self {
        Self { extractor }
    }

    /// Resolves a league-scoped need.
    pub async fn resolve(
        &self,
        need: DataNeed,
        league: &LeagueDescriptor,
        season: Season,
    ) -> Option<Resolution> {
        self.resolve_filtered(need, league, season, None).await
    }

    /// Resolves a league-scoped need, restricting matches to a status.
    pub async fn resolve_filtered(
        &self,
        need: DataNeed,
        league: &LeagueDescriptor,
        season: Season,
        status: Option<StatusFilter>,
    ) -> Option<Resolution> {
        let operation = Operation::for_need(need);
        let mut attempts = Vec::new();

        for provider in league.priority_for(need) {
            let Some(league_id) = league.provider_ids.get(provider) else {
                attempts.push(skipped(provider, "no league id"));
                continue;
            };
            if !self.extractor.is_configured(provider) {
                attempts.push(skipped(provider, "not configured"));
                continue;
            }

            let mut params = FetchParams::league(league_id, season);
            params.status = status;

            if let Some(batch) = self.try_provider(provider, operation, &params, &mut attempts).await {
                tracing::info!(
                    league = %league.code,
                    need = %need,
                    provider = %provider,
                    rows = batch.len(),
                    "Resolved"
                );
                return Some(Resolution {
                    batch,
                    provider,
                    attempts,
                });
            }
        }

        tracing::info!(
            league = %league.code,
            need = %need,
            attempts = attempts.len(),
            "No provider yielded data"
        );
        None
    }

    /// Resolves a team's squad.
    ///
    /// Team ids are provider-specific: the provider that sourced the team is
    /// asked first with the known id, the others first search the team by
    /// name to learn their own id.
    pub async fn resolve_squad(&self, team: &TeamRecord) -> Option<Resolution> {
        let mut order = vec![team.source];
        order.extend(
            DataNeed::Squad
                .default_priority()
                .iter()
                .copied()
                .filter(|p| *p != team.source),
        );

        let mut attempts = Vec::new();
        for provider in order {
            if !self.extractor.is_configured(provider) {
                attempts.push(skipped(provider, "not configured"));
                continue;
            }

            let team_id = if provider == team.source {
                team.id.clone()
            } else {
                match self.search_team_id(provider, &team.name, &mut attempts).await {
                    Some(id) => id,
                    None => continue,
                }
            };

            let params = FetchParams::team(team_id);
            if let Some(batch) = self
                .try_provider(provider, Operation::Squad, &params, &mut attempts)
                .await
            {
                tracing::info!(team = %team.name, provider = %provider, players = batch.len(), "Resolved squad");
                return Some(Resolution {
                    batch,
                    provider,
                    attempts,
                });
            }
        }

        tracing::info!(team = %team.name, "No provider yielded a squad");
        None
    }

    async fn search_team_id(
        &self,
        provider: ProviderId,
        name: &str,
        attempts: &mut Vec<Attempt>,
    ) -> Option<String> {
        match self
            .extractor
            .fetch(provider, Operation::SearchTeam, &FetchParams::search(name))
            .await
        {
            Ok(batch) => {
                let id = best_search_hit(provider, &batch.rows, name);
                if id.is_none() {
                    attempts.push(Attempt {
                        provider,
                        outcome: AttemptOutcome::Rejected(format!("no search hit for '{name}'")),
                    });
                }
                id
            }
            Err(failure) => {
                attempts.push(Attempt {
                    provider,
                    outcome: AttemptOutcome::Failed(failure.kind),
                });
                None
            }
        }
    }

    async fn try_provider(
        &self,
        provider: ProviderId,
        operation: Operation,
        params: &FetchParams,
        attempts: &mut Vec<Attempt>,
    ) -> Option<RawBatch> {
        match self.extractor.fetch(provider, operation, params).await {
            Ok(batch) if batch.is_empty() => {
                attempts.push(Attempt {
                    provider,
                    outcome: AttemptOutcome::Failed(FailureKind::EmptyPayload),
                });
                None
            }
            Ok(batch) if !batch.is_well_formed() => {
                tracing::warn!(provider = %provider, operation = %operation, "Discarding batch with non-object rows");
                attempts.push(Attempt {
                    provider,
                    outcome: AttemptOutcome::Rejected("rows are not JSON objects".to_string()),
                });
                None
            }
            Ok(batch) => {
                attempts.push(Attempt {
                    provider,
                    outcome: AttemptOutcome::Succeeded,
                });
                Some(batch)
            }
            Err(failure) => {
                attempts.push(Attempt {
                    provider,
                    outcome: AttemptOutcome::Failed(failure.kind),
                });
                None
            }
        }
    }
}

fn skipped(provider: ProviderId, why: &str) -> Attempt {
    tracing::debug!(provider = %provider, reason = why, "Skipping provider");
    Attempt {
        provider,
        outcome: AttemptOutcome::Skipped(why.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExtractionFailure;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use serde_json::json;
    use sports_etl_core::LeagueRegistry;
    use std::collections::HashMap;

    /// Extractor answering from a script keyed by (provider, operation).
    #[derive(Default)]
    struct ScriptedExtractor {
        responses: HashMap<(ProviderId, Operation), Result<Vec<serde_json::Value>, FailureKind>>,
        unconfigured: Vec<ProviderId>,
        calls: Mutex<Vec<(ProviderId, Operation, FetchParams)>>,
    }

    impl ScriptedExtractor {
        fn respond(mut self, provider: ProviderId, operation: Operation, rows: Vec<serde_json::Value>) -> Self {
            self.responses.insert((provider, operation), Ok(rows));
            self
        }

        fn fail(mut self, provider: ProviderId, operation: Operation, kind: FailureKind) -> Self {
            self.responses.insert((provider, operation), Err(kind));
            self
        }

        fn calls(&self) -> Vec<(ProviderId, Operation, FetchParams)> {
            self.calls.lock().clone()
        }
    }

    #[async_trait]
    impl Extractor for ScriptedExtractor {
        async fn fetch(
            &self,
            provider: ProviderId,
            operation: Operation,
            params: &FetchParams,
        ) -> Result<RawBatch, ExtractionFailure> {
            self.calls.lock().push((provider, operation, params.clone()));
            match self.responses.get(&(provider, operation)) {
                Some(Ok(rows)) => Ok(RawBatch::new(provider, operation, params.request_id(), rows.clone())),
                Some(Err(kind)) => Err(ExtractionFailure::new(provider, operation, kind.clone())),
                None => Err(ExtractionFailure::new(provider, operation, FailureKind::EmptyPayload)),
            }
        }

        fn is_configured(&self, provider: ProviderId) -> bool {
            !self.unconfigured.contains(&provider)
        }
    }

    fn premier_league() -> LeagueDescriptor {
        LeagueRegistry::builtin().get("premier_league").unwrap().clone()
    }

    #[tokio::test]
    async fn test_falls_back_to_next_provider() {
        // standings priority is football_data, thesportsdb, api_football
        let extractor = Arc::new(
            ScriptedExtractor::default()
                .fail(
                    ProviderId::FootballData,
                    Operation::Standings,
                    FailureKind::Http { status: 503, message: "down".to_string() },
                )
                .respond(ProviderId::TheSportsDb, Operation::Standings, vec![json!({"intRank": "1"})]),
        );
        let resolver = FallbackResolver::new(extractor.clone());

        let resolution = resolver
            .resolve(DataNeed::Standings, &premier_league(), Season::new(2024))
            .await
            .unwrap();

        assert_eq!(resolution.provider, ProviderId::TheSportsDb);
        assert_eq!(resolution.batch.provider, ProviderId::TheSportsDb);
        assert_eq!(resolution.attempts.len(), 2);
        assert!(matches!(resolution.attempts[0].outcome, AttemptOutcome::Failed(_)));
        // api_football is never asked once thesportsdb answered
        assert_eq!(extractor.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_all_failing_returns_none() {
        let extractor = Arc::new(
            ScriptedExtractor::default()
                .fail(ProviderId::FootballData, Operation::Standings, FailureKind::Timeout("30s".into()))
                .fail(
                    ProviderId::TheSportsDb,
                    Operation::Standings,
                    FailureKind::RateLimited { retry_after_secs: 60 },
                )
                .fail(ProviderId::ApiFootball, Operation::Standings, FailureKind::Network("reset".into())),
        );
        let resolver = FallbackResolver::new(extractor.clone());

        let resolution = resolver
            .resolve(DataNeed::Standings, &premier_league(), Season::new(2024))
            .await;
        assert!(resolution.is_none());
        assert_eq!(extractor.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_skips_provider_without_league_id() {
        let mls = LeagueRegistry::builtin().get("mls").unwrap().clone();
        assert!(mls.provider_ids.football_data.is_none());

        let extractor = Arc::new(ScriptedExtractor::default().respond(
            ProviderId::TheSportsDb,
            Operation::Matches,
            vec![json!({"idEvent": "1"})],
        ));
        let resolver = FallbackResolver::new(extractor.clone());

        let resolution = resolver
            .resolve(DataNeed::Matches, &mls, Season::new(2024))
            .await
            .unwrap();
        assert_eq!(resolution.provider, ProviderId::TheSportsDb);
        assert_eq!(
            resolution.attempts[0].outcome,
            AttemptOutcome::Skipped("no league id".to_string())
        );
        assert!(extractor.calls().iter().all(|(p, _, _)| *p != ProviderId::FootballData));
    }

    #[tokio::test]
    async fn test_skips_unconfigured_provider() {
        let extractor = Arc::new(ScriptedExtractor {
            unconfigured: vec![ProviderId::FootballData],
            ..Default::default()
        }
        .respond(ProviderId::TheSportsDb, Operation::Standings, vec![json!({"intRank": "1"})]));
        let resolver = FallbackResolver::new(extractor.clone());

        let resolution = resolver
            .resolve(DataNeed::Standings, &premier_league(), Season::new(2024))
            .await
            .unwrap();
        assert_eq!(resolution.provider, ProviderId::TheSportsDb);
        assert_eq!(extractor.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_rejects_rows_that_are_not_objects() {
        let extractor = Arc::new(
            ScriptedExtractor::default()
                .respond(ProviderId::FootballData, Operation::Standings, vec![json!([1, 2])])
                .respond(ProviderId::TheSportsDb, Operation::Standings, vec![json!({"intRank": "1"})]),
        );
        let resolver = FallbackResolver::new(extractor);

        let resolution = resolver
            .resolve(DataNeed::Standings, &premier_league(), Season::new(2024))
            .await
            .unwrap();
        assert_eq!(resolution.provider, ProviderId::TheSportsDb);
        assert!(matches!(resolution.attempts[0].outcome, AttemptOutcome::Rejected(_)));
    }

    #[tokio::test]
    async fn test_status_filter_is_forwarded() {
        let extractor = Arc::new(ScriptedExtractor::default().respond(
            ProviderId::FootballData,
            Operation::Matches,
            vec![json!({"id": 1})],
        ));
        let resolver = FallbackResolver::new(extractor.clone());

        resolver
            .resolve_filtered(
                DataNeed::Matches,
                &premier_league(),
                Season::new(2024),
                Some(StatusFilter::Scheduled),
            )
            .await
            .unwrap();
        let calls = extractor.calls();
        assert_eq!(calls[0].2.status, Some(StatusFilter::Scheduled));
        assert_eq!(calls[0].2.league_id.as_deref(), Some("PL"));
    }

    fn arsenal(source: ProviderId, id: &str) -> TeamRecord {
        TeamRecord {
            id: id.to_string(),
            name: "Arsenal".to_string(),
            short_name: "ARS".to_string(),
            crest_url: None,
            country: Some("England".to_string()),
            league: Some("premier_league".to_string()),
            founded: Some(1886),
            stadium: None,
            source,
        }
    }

    #[tokio::test]
    async fn test_squad_uses_source_provider_id_first() {
        let extractor = Arc::new(ScriptedExtractor::default().respond(
            ProviderId::FootballData,
            Operation::Squad,
            vec![json!({"id": 1, "name": "David Raya"})],
        ));
        let resolver = FallbackResolver::new(extractor.clone());

        let resolution = resolver
            .resolve_squad(&arsenal(ProviderId::FootballData, "57"))
            .await
            .unwrap();
        assert_eq!(resolution.provider, ProviderId::FootballData);
        assert_eq!(extractor.calls()[0].2.team_id.as_deref(), Some("57"));
    }

    #[tokio::test]
    async fn test_squad_searches_other_providers_by_name() {
        let extractor = Arc::new(
            ScriptedExtractor::default()
                .fail(ProviderId::FootballData, Operation::Squad, FailureKind::Http {
                    status: 403,
                    message: "restricted".to_string(),
                })
                .respond(
                    ProviderId::TheSportsDb,
                    Operation::SearchTeam,
                    vec![json!({"idTeam": "133604", "strTeam": "Arsenal"})],
                )
                .respond(
                    ProviderId::TheSportsDb,
                    Operation::Squad,
                    vec![json!({"idPlayer": "34145937", "strPlayer": "Bukayo Saka"})],
                ),
        );
        let resolver = FallbackResolver::new(extractor.clone());

        let resolution = resolver
            .resolve_squad(&arsenal(ProviderId::FootballData, "57"))
            .await
            .unwrap();
        assert_eq!(resolution.provider, ProviderId::TheSportsDb);

        let squad_call = extractor
            .calls()
            .into_iter()
            .find(|(p, op, _)| *p == ProviderId::TheSportsDb && *op == Operation::Squad)
            .unwrap();
        assert_eq!(squad_call.2.team_id.as_deref(), Some("133604"));
    }
}
