//! Per-league and per-batch run results.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sports_etl_core::{ProviderId, QualityGrade, Season};
use sports_etl_data::{EntityKind, LoadReceipt};
use std::collections::BTreeMap;

/// How one entity kind of one league ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum EntityStatus {
    /// At least one sink accepted the batch.
    Loaded,
    /// No provider had data; not a fault.
    NoData,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityOutcome {
    pub kind: EntityKind,
    /// Provider credited with the data.
    pub provider: Option<ProviderId>,
    pub quality: Option<QualityGrade>,
    pub rows_output: usize,
    pub receipt: Option<LoadReceipt>,
    pub status: EntityStatus,
    /// Provider attempts, in order, as `"<provider>: <outcome>"`.
    #[serde(default)]
    pub attempts: Vec<String>,
}

impl EntityOutcome {
    #[must_use]
    pub fn no_data(kind: EntityKind) -> Self {
        Self {
            kind,
            provider: None,
            quality: None,
            rows_output: 0,
            receipt: None,
            status: EntityStatus::NoData,
            attempts: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.status == EntityStatus::Loaded
    }
}

/// Result of running one league.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeagueRunResult {
    pub league: String,
    pub season: Option<Season>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub entities: Vec<EntityOutcome>,
    /// Set when the league could not run at all (unknown code, timeout).
    pub error: Option<String>,
}

impl LeagueRunResult {
    /// A league that never got past its preconditions.
    #[must_use]
    pub fn failed(league: &str, season: Option<Season>, started_at: DateTime<Utc>, error: impl ToString) -> Self {
        Self {
            league: league.to_string(),
            season,
            started_at,
            finished_at: Utc::now(),
            entities: Vec::new(),
            error: Some(error.to_string()),
        }
    }

    /// Ran to completion and loaded at least one entity kind.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.error.is_none() && self.entities.iter().any(EntityOutcome::is_loaded)
    }

    /// Why the league counts as failed, if it does.
    #[must_use]
    pub fn failure_reason(&self) -> Option<String> {
        if let Some(error) = &self.error {
            return Some(error.clone());
        }
        (!self.is_success()).then(|| "no data loaded".to_string())
    }

    #[must_use]
    pub fn entity(&self, kind: EntityKind) -> Option<&EntityOutcome> {
        self.entities.iter().find(|e| e.kind == kind)
    }

    #[must_use]
    pub fn duration(&self) -> Duration {
        self.finished_at - self.started_at
    }
}

/// Records loaded per entity kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordCounts {
    pub standings: usize,
    pub matches: usize,
    pub fixtures: usize,
    pub teams: usize,
    pub players: usize,
}

impl RecordCounts {
    pub fn add(&mut self, kind: EntityKind, rows: usize) {
        let slot = match kind {
            EntityKind::Standings => &mut self.standings,
            EntityKind::Matches => &mut self.matches,
            EntityKind::Fixtures => &mut self.fixtures,
            EntityKind::Teams => &mut self.teams,
            EntityKind::Squad => &mut self.players,
        };
        *slot += rows;
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.standings + self.matches + self.fixtures + self.teams + self.players
    }
}

/// Result of a batch run over several leagues.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineRunResult {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub leagues_processed: usize,
    pub leagues_failed: Vec<(String, String)>,
    pub records: RecordCounts,
    pub quality: BTreeMap<String, BTreeMap<EntityKind, QualityGrade>>,
    pub quality_distribution: BTreeMap<QualityGrade, usize>,
    pub leagues: Vec<LeagueRunResult>,
}

impl PipelineRunResult {
    /// Aggregates per-league results; `finished_at` is now.
    #[must_use]
    pub fn from_leagues(started_at: DateTime<Utc>, leagues: Vec<LeagueRunResult>) -> Self {
        let mut records = RecordCounts::default();
        let mut quality: BTreeMap<String, BTreeMap<EntityKind, QualityGrade>> = BTreeMap::new();
        let mut quality_distribution = BTreeMap::new();
        let mut leagues_failed = Vec::new();
        let mut leagues_processed = 0;

        for league in &leagues {
            match league.failure_reason() {
                Some(reason) => leagues_failed.push((league.league.clone(), reason)),
                None => leagues_processed += 1,
            }

            for entity in league.entities.iter().filter(|e| e.is_loaded()) {
                records.add(entity.kind, entity.rows_output);
                if let Some(grade) = entity.quality {
                    quality
                        .entry(league.league.clone())
                        .or_default()
                        .insert(entity.kind, grade);
                    *quality_distribution.entry(grade).or_insert(0) += 1;
                }
            }
        }

        Self {
            started_at,
            finished_at: Utc::now(),
            leagues_processed,
            leagues_failed,
            records,
            quality,
            quality_distribution,
            leagues,
        }
    }

    #[must_use]
    pub fn duration(&self) -> Duration {
        self.finished_at - self.started_at
    }

    /// Share of leagues that succeeded, in `[0, 1]`.
    #[must_use]
    pub fn success_rate(&self) -> f64 {
        let total = self.leagues_processed + self.leagues_failed.len();
        if total == 0 {
            0.0
        } else {
            self.leagues_processed as f64 / total as f64
        }
    }
}
