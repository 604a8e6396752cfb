//! End-to-end pipeline runs against a scripted extractor, a temporary data
//! root and the in-memory durable store.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use sports_etl_core::{
    LeagueDescriptor, LeagueRegistry, PipelineConfig, ProviderId, ProviderIds, QualityGrade, Season, Tier,
};
use sports_etl_data::{DatasetCache, EntityKind, FileSink, LocalDatasetReader, MemoryStore, MultiSinkLoader};
use sports_etl_extract::{ExtractionFailure, Extractor, FailureKind, FetchParams, Operation, RawBatch, StatusFilter};
use sports_etl_pipeline::{EntityStatus, Pipeline, PipelineError};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

// =============================================================================
// Fixtures
// =============================================================================

type Call = (ProviderId, Operation, Option<StatusFilter>);

#[derive(Default)]
struct ScriptedExtractor {
    responses: HashMap<(ProviderId, Operation), Result<Vec<Value>, FailureKind>>,
    delay: Option<Duration>,
    calls: Mutex<Vec<Call>>,
    seasons: Mutex<Vec<(Operation, Option<Season>)>>,
}

impl ScriptedExtractor {
    fn respond(mut self, provider: ProviderId, operation: Operation, rows: Vec<Value>) -> Self {
        self.responses.insert((provider, operation), Ok(rows));
        self
    }

    fn fail(mut self, provider: ProviderId, operation: Operation, kind: FailureKind) -> Self {
        self.responses.insert((provider, operation), Err(kind));
        self
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    fn seasons(&self) -> Vec<(Operation, Option<Season>)> {
        self.seasons.lock().clone()
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
        self.calls.lock().push((provider, operation, params.status));
        self.seasons.lock().push((operation, params.season));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match self.responses.get(&(provider, operation)) {
            Some(Ok(rows)) => Ok(RawBatch::new(provider, operation, params.request_id(), rows.clone())),
            Some(Err(kind)) => Err(ExtractionFailure::new(provider, operation, kind.clone())),
            None => Err(ExtractionFailure::new(provider, operation, FailureKind::EmptyPayload)),
        }
    }

    fn is_configured(&self, provider: ProviderId) -> bool {
        provider != ProviderId::ApiFootball
    }
}

fn league(code: &str) -> LeagueDescriptor {
    LeagueDescriptor {
        code: code.to_string(),
        name: "Test League".to_string(),
        country: "England".to_string(),
        continent: "Europe".to_string(),
        tier: Tier::One,
        provider_ids: ProviderIds {
            thesportsdb: Some("4328".to_string()),
            football_data: Some("PL".to_string()),
            api_football: Some("39".to_string()),
        },
        season_start_month: 8,
        team_count: 2,
        provider_priority: None,
    }
}

fn registry() -> Arc<LeagueRegistry> {
    Arc::new(LeagueRegistry::from_descriptors([league("test_league"), league("other_league")]).unwrap())
}

fn tsdb_standing(rank: u32, id: &str, name: &str, points: u32) -> Value {
    json!({
        "intRank": rank.to_string(),
        "idTeam": id,
        "strTeam": name,
        "intPlayed": "10",
        "intWin": "6",
        "intDraw": "2",
        "intLoss": "2",
        "intPoints": points.to_string(),
        "intGoalsFor": "18",
        "intGoalsAgainst": "9",
        "intGoalDifference": "9"
    })
}

fn fd_match(id: u64, date: &str, home: Option<u32>, away: Option<u32>) -> Value {
    json!({
        "id": id,
        "utcDate": date,
        "homeTeam": {"id": 57, "name": "Arsenal FC"},
        "awayTeam": {"id": 61, "name": "Chelsea FC"},
        "score": {"fullTime": {"home": home, "away": away}}
    })
}

fn tsdb_team(id: &str, name: &str) -> Value {
    json!({"idTeam": id, "strTeam": name, "strTeamShort": &name[..3], "strCountry": "England"})
}

fn tsdb_player(id: &str, team: &str, name: &str) -> Value {
    json!({"idPlayer": id, "idTeam": team, "strPlayer": name, "strPosition": "Midfielder", "strNumber": "8"})
}

fn happy_extractor() -> ScriptedExtractor {
    ScriptedExtractor::default()
        .fail(
            ProviderId::FootballData,
            Operation::Standings,
            FailureKind::RateLimited { retry_after_secs: 60 },
        )
        .respond(
            ProviderId::TheSportsDb,
            Operation::Standings,
            vec![tsdb_standing(1, "133604", "Arsenal", 20), tsdb_standing(2, "133610", "Chelsea", 20)],
        )
        .respond(
            ProviderId::FootballData,
            Operation::Matches,
            vec![
                fd_match(1001, "2025-03-01T15:00:00Z", Some(2), Some(1)),
                fd_match(1002, "2025-05-20T19:45:00Z", None, None),
            ],
        )
        .respond(
            ProviderId::TheSportsDb,
            Operation::Teams,
            vec![tsdb_team("133604", "Arsenal"), tsdb_team("133610", "Chelsea")],
        )
        .respond(
            ProviderId::TheSportsDb,
            Operation::Squad,
            vec![tsdb_player("1", "133604", "Declan Rice"), tsdb_player("2", "133604", "Bukayo Saka")],
        )
}

struct Harness {
    dir: TempDir,
    store: Arc<MemoryStore>,
    extractor: Arc<ScriptedExtractor>,
    pipeline: Pipeline,
}

fn harness(extractor: ScriptedExtractor, config: PipelineConfig) -> Harness {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(MemoryStore::new());
    let extractor = Arc::new(extractor);
    let loader = MultiSinkLoader::new(FileSink::new(dir.path())).with_store(store.clone());
    let pipeline = Pipeline::new(registry(), extractor.clone(), loader, config);
    Harness {
        dir,
        store,
        extractor,
        pipeline,
    }
}

// =============================================================================
// Single league
// =============================================================================

#[tokio::test]
async fn test_process_league_falls_back_and_loads_every_entity() {
    let h = harness(happy_extractor(), PipelineConfig::default());
    let season = Season::new(2024);

    let result = h.pipeline.process_league("test_league", Some(season)).await.unwrap();

    assert!(result.is_success());
    assert_eq!(result.season, Some(season));

    let standings = result.entity(EntityKind::Standings).unwrap();
    assert_eq!(standings.status, EntityStatus::Loaded);
    assert_eq!(standings.provider, Some(ProviderId::TheSportsDb));
    assert_eq!(standings.quality, Some(QualityGrade::High));
    assert!(standings.attempts[0].starts_with("football_data"));

    let matches = result.entity(EntityKind::Matches).unwrap();
    assert_eq!(matches.provider, Some(ProviderId::FootballData));
    assert_eq!(matches.rows_output, 2);

    let teams = result.entity(EntityKind::Teams).unwrap();
    assert_eq!(teams.status, EntityStatus::Loaded);
    assert!(result.entity(EntityKind::Squad).is_none());

    let league_dir = h.dir.path().join("leagues/test_league");
    assert!(league_dir.join("standings_2024_2025.json").exists());
    assert!(league_dir.join("matches_2024_2025.json").exists());
    assert!(league_dir.join("teams.json").exists());

    assert_eq!(h.store.collection_len("standings"), 2);
    assert_eq!(h.store.collection_len("matches"), 2);
    assert_eq!(h.store.collection_len("teams"), 2);
    assert!(h.store.get("matches", "test_league:1001").is_some());
}

#[tokio::test]
async fn test_requested_season_reaches_every_league_fetch() {
    let h = harness(happy_extractor(), PipelineConfig::default());
    let season = Season::new(2019);

    h.pipeline.process_league("test_league", Some(season)).await.unwrap();

    let seasons = h.extractor.seasons();
    for operation in [Operation::Standings, Operation::Matches, Operation::Teams] {
        assert!(seasons.iter().any(|(op, _)| *op == operation));
    }
    assert!(seasons.iter().all(|(_, s)| *s == Some(season)));
}

#[tokio::test]
async fn test_loaded_files_are_readable() {
    let h = harness(happy_extractor(), PipelineConfig::default());
    let season = Season::new(2024);
    h.pipeline.process_league("test_league", Some(season)).await.unwrap();

    let reader = LocalDatasetReader::new(h.dir.path(), Arc::new(DatasetCache::new(Duration::from_secs(60))));
    let table = reader.standings("test_league", season).await.unwrap();
    assert_eq!(table.len(), 2);
    assert_eq!(table[0].team.name, "Arsenal");

    let form = reader.team_form("test_league", season, "Arsenal FC", 5).await.unwrap();
    assert_eq!(form.to_string(), "W");
}

#[tokio::test]
async fn test_reload_is_idempotent_in_the_store() {
    let h = harness(happy_extractor(), PipelineConfig::default());
    let season = Some(Season::new(2024));

    h.pipeline.process_league("test_league", season).await.unwrap();
    let documents = h.store.len();
    h.pipeline.process_league("test_league", season).await.unwrap();

    assert_eq!(h.store.len(), documents);
    assert_eq!(h.store.writes(), documents * 2);
}

#[tokio::test]
async fn test_unknown_league_fails_fast() {
    let h = harness(happy_extractor(), PipelineConfig::default());

    let err = h.pipeline.process_league("atlantis", None).await.unwrap_err();
    assert_eq!(err, PipelineError::LeagueNotFound("atlantis".to_string()));
    assert!(h.extractor.calls().is_empty());
}

#[tokio::test]
async fn test_missing_entity_does_not_abort_others() {
    let extractor = ScriptedExtractor::default().respond(
        ProviderId::FootballData,
        Operation::Standings,
        vec![json!({
            "position": 1,
            "team": {"id": 57, "name": "Arsenal FC"},
            "playedGames": 3,
            "won": 3,
            "draw": 0,
            "lost": 0,
            "points": 9,
            "goalsFor": 7,
            "goalsAgainst": 1
        })],
    );
    let h = harness(extractor, PipelineConfig::default());

    let result = h.pipeline.process_league("test_league", Some(Season::new(2024))).await.unwrap();

    assert!(result.is_success());
    assert_eq!(result.entity(EntityKind::Standings).unwrap().status, EntityStatus::Loaded);
    assert_eq!(result.entity(EntityKind::Matches).unwrap().status, EntityStatus::NoData);
    assert_eq!(result.entity(EntityKind::Teams).unwrap().status, EntityStatus::NoData);
}

#[tokio::test]
async fn test_all_providers_failing_is_not_a_fault() {
    let extractor = ScriptedExtractor::default()
        .fail(
            ProviderId::FootballData,
            Operation::Standings,
            FailureKind::Http { status: 503, message: "unavailable".to_string() },
        )
        .fail(ProviderId::TheSportsDb, Operation::Standings, FailureKind::Timeout("30s".to_string()));
    let h = harness(extractor, PipelineConfig::default());

    let result = h.pipeline.process_league("test_league", Some(Season::new(2024))).await.unwrap();

    assert!(!result.is_success());
    assert_eq!(result.failure_reason().as_deref(), Some("no data loaded"));
    assert!(result.entities.iter().all(|e| e.status == EntityStatus::NoData));
    assert!(h.store.is_empty());
}

#[tokio::test]
async fn test_fully_rejected_batch_is_not_loaded() {
    let extractor = ScriptedExtractor::default().respond(
        ProviderId::FootballData,
        Operation::Standings,
        vec![json!({"team": {"name": "No Position FC"}}), json!({"position": 2})],
    );
    let h = harness(extractor, PipelineConfig::default());

    let result = h.pipeline.process_league("test_league", Some(Season::new(2024))).await.unwrap();

    let standings = result.entity(EntityKind::Standings).unwrap();
    assert!(matches!(standings.status, EntityStatus::Failed(_)));
    assert_eq!(standings.quality, Some(QualityGrade::Invalid));
    assert!(!h.dir.path().join("leagues/test_league/standings_2024_2025.json").exists());
}

#[tokio::test]
async fn test_rosters_are_loaded_when_enabled() {
    let config = PipelineConfig {
        include_rosters: true,
        ..PipelineConfig::default()
    };
    let h = harness(happy_extractor(), config);

    let result = h.pipeline.process_league("test_league", Some(Season::new(2024))).await.unwrap();

    let squads = result.entity(EntityKind::Squad).unwrap();
    assert_eq!(squads.status, EntityStatus::Loaded);
    assert_eq!(squads.provider, Some(ProviderId::TheSportsDb));
    assert!(h.dir.path().join("teams/arsenal_squad.json").exists());
    assert!(h.dir.path().join("teams/chelsea_squad.json").exists());
    assert_eq!(h.store.collection_len("players"), 2);
}

#[tokio::test]
async fn test_quick_update_loads_standings_and_fixtures_only() {
    let h = harness(happy_extractor(), PipelineConfig::default());

    let result = h.pipeline.quick_update("test_league").await.unwrap();
    let season = result.season.unwrap();

    let kinds: Vec<_> = result.entities.iter().map(|e| e.kind).collect();
    assert_eq!(kinds, [EntityKind::Standings, EntityKind::Fixtures]);

    let calls = h.extractor.calls();
    assert!(calls.contains(&(ProviderId::FootballData, Operation::Matches, Some(StatusFilter::Scheduled))));
    assert!(calls.iter().all(|(_, op, _)| *op != Operation::Teams));

    let fixtures = h
        .dir
        .path()
        .join(format!("leagues/test_league/fixtures_{}.json", season.underscored()));
    assert!(fixtures.exists());
}

// =============================================================================
// Batches
// =============================================================================

#[tokio::test]
async fn test_batch_reports_per_league_outcomes() {
    let h = harness(happy_extractor(), PipelineConfig::default());
    let codes = vec!["test_league".to_string(), "atlantis".to_string(), "other_league".to_string()];

    let result = h.pipeline.process_leagues(&codes, Some(Season::new(2024)), false).await;

    assert_eq!(result.leagues.len(), 3);
    assert_eq!(result.leagues_processed, 2);
    assert_eq!(result.leagues_failed.len(), 1);
    assert_eq!(result.leagues_failed[0].0, "atlantis");
    assert!(result.leagues_failed[0].1.contains("league not found"));
    assert_eq!(result.records.standings, 4);
    assert_eq!(result.quality["test_league"][&EntityKind::Standings], QualityGrade::High);
}

#[tokio::test]
async fn test_parallel_batch_keeps_input_order() {
    let config = PipelineConfig {
        parallel: true,
        max_concurrency: 2,
        ..PipelineConfig::default()
    };
    let h = harness(happy_extractor(), config);
    let codes = vec!["other_league".to_string(), "test_league".to_string()];

    let result = h.pipeline.process_leagues(&codes, Some(Season::new(2024)), true).await;

    let order: Vec<_> = result.leagues.iter().map(|l| l.league.as_str()).collect();
    assert_eq!(order, ["other_league", "test_league"]);
    assert_eq!(result.leagues_processed, 2);
    assert!((result.success_rate() - 1.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_league_timeout_becomes_a_failed_league() {
    let mut extractor = happy_extractor();
    extractor.delay = Some(Duration::from_secs(3));
    let config = PipelineConfig {
        league_timeout_secs: 1,
        ..PipelineConfig::default()
    };
    let h = harness(extractor, config);

    let result = h
        .pipeline
        .process_leagues(&["test_league".to_string()], None, false)
        .await;

    assert_eq!(result.leagues_processed, 0);
    assert!(result.leagues_failed[0].1.contains("timed out"));
}

#[tokio::test]
async fn test_quick_updates_batch() {
    let h = harness(happy_extractor(), PipelineConfig::default());
    let codes = vec!["test_league".to_string(), "other_league".to_string()];

    let result = h.pipeline.quick_updates(&codes, false).await;

    assert_eq!(result.leagues_processed, 2);
    assert_eq!(result.records.fixtures, 4);
    assert_eq!(result.records.teams, 0);
}
