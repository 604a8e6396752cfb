//! Cached read side of the file sink.
//!
//! Serves standings, teams, matches and derived features to downstream
//! consumers without re-reading the filesystem on every call. The cache is an
//! explicit [`DatasetCache`] value shared by handle, so several readers can
//! sit on one cache and the pipeline can invalidate a league after a reload.

use crate::cache::TtlCache;
use crate::entity::EntityKind;
use crate::file_sink::{FileSink, SinkError};
use chrono::{Duration as ChronoDuration, NaiveDate};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sports_etl_core::{MatchRecord, MatchResult, MatchStatus, PlayerRecord, Season, StandingRecord, TeamRecord};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Matches considered when computing the recent-form feature.
pub const FEATURE_FORM_WINDOW: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct DatasetKey {
    league: String,
    entity: EntityKind,
    season: Option<Season>,
}

/// Shared TTL cache for parsed datasets.
#[derive(Debug)]
pub struct DatasetCache {
    standings: TtlCache<DatasetKey, Arc<Vec<StandingRecord>>>,
    matches: TtlCache<DatasetKey, Arc<Vec<MatchRecord>>>,
    teams: TtlCache<DatasetKey, Arc<Vec<TeamRecord>>>,
    squads: TtlCache<String, Arc<Vec<PlayerRecord>>>,
}

impl DatasetCache {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            standings: TtlCache::new(ttl),
            matches: TtlCache::new(ttl),
            teams: TtlCache::new(ttl),
            squads: TtlCache::new(ttl),
        }
    }

    /// Drops every cached dataset of `league`.
    pub fn invalidate(&self, league: &str) -> usize {
        let same = |key: &DatasetKey| key.league == league;
        self.standings.invalidate_where(same) + self.matches.invalidate_where(same) + self.teams.invalidate_where(same)
    }

    pub fn invalidate_squad(&self, team_name: &str) {
        let safe = TeamRecord::safe_name(team_name);
        self.squads.invalidate_where(|key| *key == safe);
    }

    pub fn clear(&self) {
        self.standings.clear();
        self.matches.clear();
        self.teams.clear();
        self.squads.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.standings.len() + self.matches.len() + self.teams.len() + self.squads.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Date window relative to a reference day, both ends inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayWindow {
    /// The last `n` days up to the reference day.
    Past(u32),
    /// The next `n` days from the reference day.
    Upcoming(u32),
}

impl DayWindow {
    #[must_use]
    pub fn contains(&self, date: NaiveDate, today: NaiveDate) -> bool {
        match *self {
            // A bound beyond the calendar range leaves that side open.
            DayWindow::Past(days) => {
                date <= today
                    && today
                        .checked_sub_signed(ChronoDuration::days(i64::from(days)))
                        .map_or(true, |start| date >= start)
            }
            DayWindow::Upcoming(days) => {
                date >= today
                    && today
                        .checked_add_signed(ChronoDuration::days(i64::from(days)))
                        .map_or(true, |end| date <= end)
            }
        }
    }
}

/// Filter for [`LocalDatasetReader::matches_filtered`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchFilter {
    pub status: Option<MatchStatus>,
    pub window: Option<DayWindow>,
}

impl MatchFilter {
    #[must_use]
    pub fn with_status(mut self, status: MatchStatus) -> Self {
        self.status = Some(status);
        self
    }

    #[must_use]
    pub fn with_window(mut self, window: DayWindow) -> Self {
        self.window = Some(window);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormResult {
    Win,
    Draw,
    Loss,
}

impl FormResult {
    #[must_use]
    pub const fn points(&self) -> u32 {
        match self {
            FormResult::Win => 3,
            FormResult::Draw => 1,
            FormResult::Loss => 0,
        }
    }

    #[must_use]
    pub const fn letter(&self) -> char {
        match self {
            FormResult::Win => 'W',
            FormResult::Draw => 'D',
            FormResult::Loss => 'L',
        }
    }
}

/// A team's results over its most recent finished matches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamForm {
    pub team: String,
    /// Newest first.
    pub results: Vec<FormResult>,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub points: u32,
    pub goals_for: u32,
    pub goals_against: u32,
}

impl TeamForm {
    #[must_use]
    pub fn matches(&self) -> usize {
        self.results.len()
    }

    /// Length of the current run of identical results.
    #[must_use]
    pub fn streak(&self) -> Option<(FormResult, usize)> {
        let first = *self.results.first()?;
        Some((first, self.results.iter().take_while(|r| **r == first).count()))
    }

    fn push(&mut self, result: FormResult, scored: u32, conceded: u32) {
        match result {
            FormResult::Win => self.wins += 1,
            FormResult::Draw => self.draws += 1,
            FormResult::Loss => self.losses += 1,
        }
        self.points += result.points();
        self.goals_for += scored;
        self.goals_against += conceded;
        self.results.push(result);
    }
}

impl fmt::Display for TeamForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.results.iter().try_for_each(|r| write!(f, "{}", r.letter()))
    }
}

/// Numeric feature row of one team, for clustering consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamFeatures {
    pub team_id: String,
    pub team_name: String,
    pub position: u32,
    pub points_per_game: f64,
    pub goal_difference_per_game: f64,
    pub goals_for_per_game: f64,
    pub goals_against_per_game: f64,
    pub win_rate: f64,
    pub draw_rate: f64,
    pub loss_rate: f64,
    /// Points per game over the last few finished matches, when any are on file.
    pub recent_points_per_game: Option<f64>,
}

/// Reads datasets written by the file sink through a shared cache.
#[derive(Debug, Clone)]
pub struct LocalDatasetReader {
    sink: FileSink,
    cache: Arc<DatasetCache>,
}

impl LocalDatasetReader {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, cache: Arc<DatasetCache>) -> Self {
        Self {
            sink: FileSink::new(root),
            cache,
        }
    }

    #[must_use]
    pub fn cache(&self) -> &Arc<DatasetCache> {
        &self.cache
    }

    /// # Errors
    /// Returns error if the file exists but cannot be read or parsed.
    pub async fn standings(&self, league: &str, season: Season) -> Result<Arc<Vec<StandingRecord>>, SinkError> {
        let key = key(league, EntityKind::Standings, Some(season));
        let path = self.sink.league_path(league, EntityKind::Standings, Some(season));
        self.cached(&self.cache.standings, key, path).await
    }

    /// # Errors
    /// Returns error if the file exists but cannot be read or parsed.
    pub async fn matches(&self, league: &str, season: Season) -> Result<Arc<Vec<MatchRecord>>, SinkError> {
        let key = key(league, EntityKind::Matches, Some(season));
        let path = self.sink.league_path(league, EntityKind::Matches, Some(season));
        self.cached(&self.cache.matches, key, path).await
    }

    /// # Errors
    /// Returns error if the file exists but cannot be read or parsed.
    pub async fn fixtures(&self, league: &str, season: Season) -> Result<Arc<Vec<MatchRecord>>, SinkError> {
        let key = key(league, EntityKind::Fixtures, Some(season));
        let path = self.sink.league_path(league, EntityKind::Fixtures, Some(season));
        self.cached(&self.cache.matches, key, path).await
    }

    /// # Errors
    /// Returns error if the file exists but cannot be read or parsed.
    pub async fn teams(&self, league: &str) -> Result<Arc<Vec<TeamRecord>>, SinkError> {
        let key = key(league, EntityKind::Teams, None);
        let path = self.sink.league_path(league, EntityKind::Teams, None);
        self.cached(&self.cache.teams, key, path).await
    }

    /// # Errors
    /// Returns error if the file exists but cannot be read or parsed.
    pub async fn squad(&self, team_name: &str) -> Result<Arc<Vec<PlayerRecord>>, SinkError> {
        let path = self.sink.squad_path(team_name);
        self.cached(&self.cache.squads, TeamRecord::safe_name(team_name), path)
            .await
    }

    /// Results and fixtures of a season merged by match id, filtered by
    /// status and date window.
    ///
    /// A finished copy of a match wins over a scheduled one. Past windows are
    /// returned newest first, everything else in kickoff order.
    ///
    /// # Errors
    /// Returns error if either file exists but cannot be read or parsed.
    pub async fn matches_filtered(
        &self,
        league: &str,
        season: Season,
        filter: MatchFilter,
        today: NaiveDate,
    ) -> Result<Vec<MatchRecord>, SinkError> {
        let played = self.matches(league, season).await?;
        let upcoming = self.fixtures(league, season).await?;

        let mut merged: BTreeMap<&str, &MatchRecord> = BTreeMap::new();
        for record in played.iter().chain(upcoming.iter()) {
            match merged.get(record.id.as_str()) {
                Some(existing) if existing.is_finished() || !record.is_finished() => {}
                _ => {
                    merged.insert(record.id.as_str(), record);
                }
            }
        }

        let mut out: Vec<MatchRecord> = merged
            .into_values()
            .filter(|m| filter.status.map_or(true, |s| m.status == s))
            .filter(|m| filter.window.map_or(true, |w| w.contains(m.date, today)))
            .cloned()
            .collect();

        out.sort_by(|a, b| (a.date, a.kickoff, &a.id).cmp(&(b.date, b.kickoff, &b.id)));
        if matches!(filter.window, Some(DayWindow::Past(_))) {
            out.reverse();
        }
        Ok(out)
    }

    /// Form over `team`'s last `last_n` finished matches; `team` is an id or a
    /// case-insensitive name.
    ///
    /// # Errors
    /// Returns error if the matches file exists but cannot be read or parsed.
    pub async fn team_form(
        &self,
        league: &str,
        season: Season,
        team: &str,
        last_n: usize,
    ) -> Result<TeamForm, SinkError> {
        let played = self.matches(league, season).await?;
        Ok(form_from(&played, team, last_n))
    }

    /// One feature row per team of the season's table.
    ///
    /// # Errors
    /// Returns error if a dataset file exists but cannot be read or parsed.
    pub async fn team_features(&self, league: &str, season: Season) -> Result<Vec<TeamFeatures>, SinkError> {
        let table = self.standings(league, season).await?;
        let played = self.matches(league, season).await?;

        Ok(table
            .iter()
            .map(|row| {
                let form = form_from(&played, &row.team.id, FEATURE_FORM_WINDOW);
                let form = if form.matches() == 0 {
                    form_from(&played, &row.team.name, FEATURE_FORM_WINDOW)
                } else {
                    form
                };
                let recent = (form.matches() > 0).then(|| f64::from(form.points) / form.matches() as f64);

                TeamFeatures {
                    team_id: row.team.id.clone(),
                    team_name: row.team.name.clone(),
                    position: row.position,
                    points_per_game: row.metrics.points_per_game,
                    goal_difference_per_game: row.metrics.goal_difference_per_game,
                    goals_for_per_game: row.metrics.goals_for_per_game,
                    goals_against_per_game: row.metrics.goals_against_per_game,
                    win_rate: row.metrics.win_rate,
                    draw_rate: row.metrics.draw_rate,
                    loss_rate: row.metrics.loss_rate,
                    recent_points_per_game: recent,
                }
            })
            .collect())
    }

    /// Drops the league's cached datasets so the next read hits the files.
    pub fn invalidate(&self, league: &str) -> usize {
        let dropped = self.cache.invalidate(league);
        tracing::debug!(league, dropped, "Invalidated cached datasets");
        dropped
    }

    async fn cached<K, T>(
        &self,
        cache: &TtlCache<K, Arc<Vec<T>>>,
        key: K,
        path: PathBuf,
    ) -> Result<Arc<Vec<T>>, SinkError>
    where
        K: Eq + std::hash::Hash,
        T: DeserializeOwned,
    {
        if let Some(hit) = cache.get(&key) {
            return Ok(hit);
        }

        // Missing files are not cached so a later load shows up immediately.
        let Some(envelope) = self.sink.read::<T>(&path).await? else {
            return Ok(Arc::new(Vec::new()));
        };

        let data = Arc::new(envelope.data);
        cache.insert(key, Arc::clone(&data));
        Ok(data)
    }
}

fn key(league: &str, entity: EntityKind, season: Option<Season>) -> DatasetKey {
    DatasetKey {
        league: league.to_string(),
        entity,
        season,
    }
}

fn form_from(matches: &[MatchRecord], team: &str, last_n: usize) -> TeamForm {
    let mut finished: Vec<(&MatchRecord, bool)> = matches
        .iter()
        .filter(|m| m.is_finished())
        .filter_map(|m| m.side_of(team).map(|home| (m, home)))
        .collect();
    finished.sort_by(|(a, _), (b, _)| (b.date, b.kickoff).cmp(&(a.date, a.kickoff)));

    let mut form = TeamForm {
        team: team.to_string(),
        ..TeamForm::default()
    };
    for (record, home) in finished.into_iter().take(last_n) {
        let (Some(h), Some(a)) = (record.score.home, record.score.away) else {
            continue;
        };
        let (scored, conceded) = if home { (h, a) } else { (a, h) };
        let result = match (record.result, home) {
            (Some(MatchResult::Draw), _) => FormResult::Draw,
            (Some(MatchResult::HomeWin), true) | (Some(MatchResult::AwayWin), false) => FormResult::Win,
            _ => FormResult::Loss,
        };
        form.push(result, scored, conceded);
    }
    form
}
