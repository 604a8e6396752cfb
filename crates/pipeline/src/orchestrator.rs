//! Extract, transform and load sequencing.
//!
//! For one league the pipeline resolves the descriptor, picks the season and
//! runs standings, matches and teams as independent stages: each stage is
//! extract via provider fallback, then transform, then load. A stage that
//! finds no data or fails never stops the other stages, and a league that
//! fails never stops the rest of a batch.

use crate::error::PipelineError;
use crate::summary::{EntityOutcome, EntityStatus, LeagueRunResult, PipelineRunResult};
use chrono::Utc;
use futures_util::stream::{self, StreamExt};
use sports_etl_core::{
    DataNeed, LeagueDescriptor, LeagueRegistry, PipelineConfig, QualityGrade, Season, TeamRecord,
    TransformationResult,
};
use sports_etl_data::{DatasetCache, EntityKind, Loadable, MultiSinkLoader};
use sports_etl_extract::{Extractor, FallbackResolver, Resolution, StatusFilter};
use sports_etl_transform::Transformer;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// What a batch run does for each league.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunMode {
    Full(Option<Season>),
    Quick,
}

pub struct Pipeline {
    registry: Arc<LeagueRegistry>,
    resolver: FallbackResolver,
    transformer: Transformer,
    loader: MultiSinkLoader,
    cache: Option<Arc<DatasetCache>>,
    config: PipelineConfig,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("leagues", &self.registry.len())
            .field("loader", &self.loader)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    #[must_use]
    pub fn new(
        registry: Arc<LeagueRegistry>,
        extractor: Arc<dyn Extractor>,
        loader: MultiSinkLoader,
        config: PipelineConfig,
    ) -> Self {
        Self {
            registry,
            resolver: FallbackResolver::new(extractor),
            transformer: Transformer::new(config.consistency_policy),
            loader,
            cache: None,
            config,
        }
    }

    #[must_use]
    pub fn with_transformer(mut self, transformer: Transformer) -> Self {
        self.transformer = transformer;
        self
    }

    /// Reader cache to invalidate after each league is reloaded.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<DatasetCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    #[must_use]
    pub fn registry(&self) -> &LeagueRegistry {
        &self.registry
    }

    #[must_use]
    pub fn loader(&self) -> &MultiSinkLoader {
        &self.loader
    }

    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    // =========================================================================
    // Single league
    // =========================================================================

    /// Runs standings, matches and teams (and squads when rosters are
    /// enabled) for one league. `season` defaults to the current one.
    ///
    /// # Errors
    /// Returns [`PipelineError::LeagueNotFound`] for an unknown code.
    pub async fn process_league(&self, code: &str, season: Option<Season>) -> Result<LeagueRunResult, PipelineError> {
        let started_at = Utc::now();
        let timer = Instant::now();
        let league = self.descriptor(code)?;
        let season = season.unwrap_or_else(|| league.current_season());

        tracing::info!(league = %league.code, season = %season, "Processing league");

        let mut entities = vec![
            self.standings_stage(league, season).await,
            self.matches_stage(league, season, None).await,
        ];
        let (teams_outcome, teams) = self.teams_stage(league, season).await;
        entities.push(teams_outcome);

        if self.config.include_rosters && !teams.is_empty() {
            entities.push(self.squads_stage(&teams).await);
        }

        self.invalidate(&league.code);
        tracing::info!(
            league = %league.code,
            season = %season,
            loaded = entities.iter().filter(|e| e.is_loaded()).count(),
            elapsed_ms = timer.elapsed().as_millis() as u64,
            "League processed"
        );

        Ok(LeagueRunResult {
            league: league.code.clone(),
            season: Some(season),
            started_at,
            finished_at: Utc::now(),
            entities,
            error: None,
        })
    }

    /// Lightweight refresh: current-season standings and upcoming fixtures.
    ///
    /// # Errors
    /// Returns [`PipelineError::LeagueNotFound`] for an unknown code.
    pub async fn quick_update(&self, code: &str) -> Result<LeagueRunResult, PipelineError> {
        let started_at = Utc::now();
        let league = self.descriptor(code)?;
        let season = league.current_season();

        tracing::info!(league = %league.code, season = %season, "Quick update");

        let entities = vec![
            self.standings_stage(league, season).await,
            self.matches_stage(league, season, Some(StatusFilter::Scheduled))
                .await,
        ];
        self.invalidate(&league.code);

        Ok(LeagueRunResult {
            league: league.code.clone(),
            season: Some(season),
            started_at,
            finished_at: Utc::now(),
            entities,
            error: None,
        })
    }

    // =========================================================================
    // Batches
    // =========================================================================

    /// Runs [`Pipeline::process_league`] over `codes`.
    ///
    /// Sequential unless `parallel` is set, in which case at most
    /// `max_concurrency` leagues run at once. Every league runs under the
    /// configured timeout; failures are reported per league.
    pub async fn process_leagues(&self, codes: &[String], season: Option<Season>, parallel: bool) -> PipelineRunResult {
        self.run_batch(codes, RunMode::Full(season), parallel).await
    }

    /// Runs [`Pipeline::quick_update`] over `codes` with the same batching rules.
    pub async fn quick_updates(&self, codes: &[String], parallel: bool) -> PipelineRunResult {
        self.run_batch(codes, RunMode::Quick, parallel).await
    }

    async fn run_batch(&self, codes: &[String], mode: RunMode, parallel: bool) -> PipelineRunResult {
        let started_at = Utc::now();
        tracing::info!(leagues = codes.len(), parallel, "Starting batch run");

        let leagues: Vec<LeagueRunResult> = if parallel {
            let width = self.config.max_concurrency.max(1);
            stream::iter(codes.iter().map(|code| self.run_guarded(code, mode)))
                .buffered(width)
                .collect()
                .await
        } else {
            let mut results = Vec::with_capacity(codes.len());
            for code in codes {
                results.push(self.run_guarded(code, mode).await);
            }
            results
        };

        let result = PipelineRunResult::from_leagues(started_at, leagues);
        tracing::info!(
            processed = result.leagues_processed,
            failed = result.leagues_failed.len(),
            records = result.records.total(),
            elapsed_ms = result.duration().num_milliseconds(),
            "Batch run finished"
        );
        result
    }

    /// One league under the deadline; every error becomes a failed result.
    async fn run_guarded(&self, code: &str, mode: RunMode) -> LeagueRunResult {
        let started_at = Utc::now();
        let secs = self.config.league_timeout_secs;
        let season = match mode {
            RunMode::Full(season) => season,
            RunMode::Quick => None,
        };

        let run = async {
            match mode {
                RunMode::Full(season) => self.process_league(code, season).await,
                RunMode::Quick => self.quick_update(code).await,
            }
        };

        let outcome = match tokio::time::timeout(Duration::from_secs(secs), run).await {
            Ok(outcome) => outcome,
            Err(_) => Err(PipelineError::Timeout {
                league: code.to_string(),
                secs,
            }),
        };

        outcome.unwrap_or_else(|e| {
            tracing::warn!(league = code, "League failed: {}", e);
            LeagueRunResult::failed(code, season, started_at, e)
        })
    }

    // =========================================================================
    // Stages
    // =========================================================================

    async fn standings_stage(&self, league: &LeagueDescriptor, season: Season) -> EntityOutcome {
        let Some(resolution) = self.resolver.resolve(DataNeed::Standings, league, season).await else {
            return EntityOutcome::no_data(EntityKind::Standings);
        };
        let result = self
            .transformer
            .standings(&resolution.batch.rows, resolution.provider);
        self.load_stage(EntityKind::Standings, &league.code, Some(season), &resolution, &result)
            .await
    }

    async fn matches_stage(
        &self,
        league: &LeagueDescriptor,
        season: Season,
        status: Option<StatusFilter>,
    ) -> EntityOutcome {
        let kind = match status {
            Some(StatusFilter::Scheduled) => EntityKind::Fixtures,
            _ => EntityKind::Matches,
        };
        let Some(resolution) = self
            .resolver
            .resolve_filtered(DataNeed::Matches, league, season, status)
            .await
        else {
            return EntityOutcome::no_data(kind);
        };
        let result = self
            .transformer
            .matches(&resolution.batch.rows, resolution.provider);
        self.load_stage(kind, &league.code, Some(season), &resolution, &result)
            .await
    }

    /// Teams are fetched for `season` but stored unscoped; the loaded
    /// records feed the squad stage.
    async fn teams_stage(&self, league: &LeagueDescriptor, season: Season) -> (EntityOutcome, Vec<TeamRecord>) {
        let Some(resolution) = self.resolver.resolve(DataNeed::Teams, league, season).await else {
            return (EntityOutcome::no_data(EntityKind::Teams), Vec::new());
        };
        let result = self
            .transformer
            .teams(&resolution.batch.rows, resolution.provider, Some(&league.code));
        let outcome = self
            .load_stage(EntityKind::Teams, &league.code, None, &resolution, &result)
            .await;
        let teams = if outcome.is_loaded() {
            result.records
        } else {
            Vec::new()
        };
        (outcome, teams)
    }

    /// Resolves and loads every team's squad; reported as one outcome.
    async fn squads_stage(&self, teams: &[TeamRecord]) -> EntityOutcome {
        let mut loaded = 0usize;
        let mut rows = 0usize;
        let mut worst: Option<QualityGrade> = None;
        let mut provider = None;
        let mut failures = Vec::new();

        for team in teams {
            let Some(resolution) = self.resolver.resolve_squad(team).await else {
                continue;
            };
            let result = self
                .transformer
                .squad(&resolution.batch.rows, resolution.provider, &team.id);
            if result.is_empty() {
                failures.push(format!("{}: no valid players", team.name));
                continue;
            }

            let receipt = self.loader.load_squad(team, &result).await;
            if receipt.file_ok || receipt.store_ok == Some(true) {
                loaded += 1;
                rows += result.records.len();
                worst = Some(worst.map_or(result.quality, |w| w.min(result.quality)));
                provider.get_or_insert(resolution.provider);
            } else {
                failures.push(format!("{}: {}", team.name, receipt.errors.join("; ")));
            }
        }

        tracing::info!(teams = teams.len(), loaded, players = rows, "Squads stage finished");

        let status = if loaded > 0 {
            EntityStatus::Loaded
        } else if failures.is_empty() {
            EntityStatus::NoData
        } else {
            EntityStatus::Failed(format!("{} squads failed", failures.len()))
        };
        EntityOutcome {
            kind: EntityKind::Squad,
            provider,
            quality: worst,
            rows_output: rows,
            receipt: None,
            status,
            attempts: failures,
        }
    }

    /// Loads a transformed batch unless nothing survived transformation.
    async fn load_stage<T: Loadable + Sync>(
        &self,
        kind: EntityKind,
        league: &str,
        season: Option<Season>,
        resolution: &Resolution,
        result: &TransformationResult<T>,
    ) -> EntityOutcome {
        let attempts = resolution.attempts.iter().map(ToString::to_string).collect();
        let mut outcome = EntityOutcome {
            kind,
            provider: Some(resolution.provider),
            quality: Some(result.quality),
            rows_output: result.rows_output,
            receipt: None,
            status: EntityStatus::Loaded,
            attempts,
        };

        // An empty batch would overwrite good data on file with nothing.
        if result.is_empty() {
            tracing::warn!(
                league,
                entity = %kind,
                provider = %resolution.provider,
                rows_input = result.rows_input,
                "Every row was rejected; skipping load"
            );
            outcome.status = EntityStatus::Failed(format!("all {} rows rejected", result.rows_input));
            return outcome;
        }

        let receipt = self.loader.load(kind, league, season, result).await;
        if !receipt.file_ok && receipt.store_ok != Some(true) {
            outcome.status = EntityStatus::Failed(receipt.errors.join("; "));
        }
        outcome.receipt = Some(receipt);
        outcome
    }

    fn descriptor(&self, code: &str) -> Result<&LeagueDescriptor, PipelineError> {
        self.registry
            .get(code)
            .ok_or_else(|| PipelineError::LeagueNotFound(code.to_string()))
    }

    fn invalidate(&self, league: &str) {
        if let Some(cache) = &self.cache {
            cache.invalidate(league);
        }
    }
}
