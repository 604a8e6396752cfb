//! JSON file sink.
//!
//! Layout under the data root:
//!
//! ```text
//! leagues/<league>/standings_<season>.json
//! leagues/<league>/matches_<season>.json
//! leagues/<league>/fixtures_<season>.json
//! leagues/<league>/teams.json
//! teams/<safe-team-name>_squad.json
//! ```
//!
//! Every file is `{"_metadata": {...}, "data": [...]}`. Writes go to a
//! temporary sibling first and are renamed into place, so readers never see
//! a half-written file.

use crate::entity::EntityKind;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sports_etl_core::{ProviderId, QualityGrade, Season, TeamRecord, TransformSummary};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Schema version written into every envelope.
pub const SCHEMA_VERSION: &str = "1.0";

/// Errors from file sink operations.
#[derive(Error, Debug)]
pub enum SinkError {
    /// IO error reading/writing file.
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error.
    #[error("JSON error on {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl SinkError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn json(path: &Path, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Envelope metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadMetadata {
    pub loaded_at: DateTime<Utc>,
    pub version: String,
    pub entity: EntityKind,
    pub league: Option<String>,
    #[serde(default)]
    pub season: Option<Season>,
    pub source_provider: ProviderId,
    pub quality: QualityGrade,
    pub rows_input: usize,
    pub rows_output: usize,
    pub rows_dropped: usize,
    pub nulls_filled: usize,
    pub outliers_detected: usize,
    #[serde(default)]
    pub rows_repaired: usize,
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl LoadMetadata {
    #[must_use]
    pub fn new(
        entity: EntityKind,
        league: Option<&str>,
        season: Option<Season>,
        summary: TransformSummary,
    ) -> Self {
        Self {
            loaded_at: Utc::now(),
            version: SCHEMA_VERSION.to_string(),
            entity,
            league: league.map(str::to_string),
            season,
            source_provider: summary.source_provider,
            quality: summary.quality,
            rows_input: summary.rows_input,
            rows_output: summary.rows_output,
            rows_dropped: summary.rows_dropped,
            nulls_filled: summary.nulls_filled,
            outliers_detected: summary.outliers_detected,
            rows_repaired: summary.rows_repaired,
            warnings: summary.warnings,
        }
    }
}

/// On-disk file shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    #[serde(rename = "_metadata")]
    pub metadata: LoadMetadata,
    pub data: Vec<T>,
}

/// Writes and reads enveloped datasets under a root directory.
#[derive(Debug, Clone)]
pub struct FileSink {
    root: PathBuf,
}

impl FileSink {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of a league-scoped dataset. Teams ignore the season.
    #[must_use]
    pub fn league_path(&self, league: &str, entity: EntityKind, season: Option<Season>) -> PathBuf {
        let dir = self.root.join("leagues").join(league);
        match (entity, season) {
            (EntityKind::Teams, _) | (_, None) => dir.join(format!("{}.json", entity.as_str())),
            (_, Some(season)) => dir.join(format!("{}_{}.json", entity.as_str(), season.underscored())),
        }
    }

    /// Path of a team's squad file.
    #[must_use]
    pub fn squad_path(&self, team_name: &str) -> PathBuf {
        self.root
            .join("teams")
            .join(format!("{}_squad.json", TeamRecord::safe_name(team_name)))
    }

    /// Directory holding every dataset of a league.
    #[must_use]
    pub fn league_dir(&self, league: &str) -> PathBuf {
        self.root.join("leagues").join(league)
    }

    /// Atomically writes an envelope to `path`, creating parent directories.
    ///
    /// # Errors
    /// Returns error if serialization or any filesystem step fails.
    pub async fn write<T: Serialize>(&self, path: &Path, envelope: &Envelope<T>) -> Result<(), SinkError> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| SinkError::io(parent, e))?;
        }

        let bytes = serde_json::to_vec_pretty(envelope).map_err(|e| SinkError::json(path, e))?;
        let tmp = path.with_extension("json.tmp");

        tokio::fs::write(&tmp, &bytes)
            .await
            .map_err(|e| SinkError::io(&tmp, e))?;
        if let Err(e) = tokio::fs::rename(&tmp, path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(SinkError::io(path, e));
        }

        tracing::debug!(path = %path.display(), bytes = bytes.len(), "Wrote dataset file");
        Ok(())
    }

    /// Reads an envelope; `Ok(None)` when the file does not exist.
    ///
    /// # Errors
    /// Returns error if the file exists but cannot be read or parsed.
    pub async fn read<T: DeserializeOwned>(&self, path: &Path) -> Result<Option<Envelope<T>>, SinkError> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(SinkError::io(path, e)),
        };
        let envelope = serde_json::from_slice(&bytes).map_err(|e| SinkError::json(path, e))?;
        Ok(Some(envelope))
    }
}
