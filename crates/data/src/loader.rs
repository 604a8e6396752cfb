//! Multi-sink loader.
//!
//! Every batch is written to the file sink and, when a durable store is
//! attached, upserted record by record. The two sinks are independent: a
//! failure in one is recorded in the [`LoadReceipt`] and never stops the other.

use crate::entity::{EntityKind, KeyScope, Loadable};
use crate::file_sink::{Envelope, FileSink, LoadMetadata};
use crate::store::DurableStore;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use sports_etl_core::{PlayerRecord, Season, TeamRecord, TransformationResult};
use std::path::PathBuf;
use std::sync::Arc;

/// Outcome of loading one batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadReceipt {
    pub entity: EntityKind,
    /// League code, or the team name for squads.
    pub league: String,
    pub season: Option<Season>,
    pub file_ok: bool,
    /// `None` when no durable store is attached.
    pub store_ok: Option<bool>,
    pub records: usize,
    pub file_path: PathBuf,
    #[serde(default)]
    pub errors: Vec<String>,
}

impl LoadReceipt {
    /// Every attached sink accepted the batch.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.file_ok && self.store_ok.unwrap_or(true)
    }
}

/// Counters accumulated over the loader's lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadStats {
    pub files_written: u64,
    pub file_failures: u64,
    pub documents_upserted: u64,
    pub store_failures: u64,
}

impl LoadStats {
    fn record_file(&mut self, ok: bool) {
        if ok {
            self.files_written += 1;
        } else {
            self.file_failures += 1;
        }
    }

    fn record_store(&mut self, upserted: u64, failed: u64) {
        self.documents_upserted += upserted;
        self.store_failures += failed;
    }
}

pub struct MultiSinkLoader {
    file: FileSink,
    store: Option<Arc<dyn DurableStore>>,
    stats: Mutex<LoadStats>,
}

impl std::fmt::Debug for MultiSinkLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultiSinkLoader")
            .field("file", &self.file)
            .field("store", &self.store.as_ref().map(|s| s.name()))
            .field("stats", &*self.stats.lock())
            .finish()
    }
}

impl MultiSinkLoader {
    #[must_use]
    pub fn new(file: FileSink) -> Self {
        Self {
            file,
            store: None,
            stats: Mutex::new(LoadStats::default()),
        }
    }

    #[must_use]
    pub fn with_store(mut self, store: Arc<dyn DurableStore>) -> Self {
        self.store = Some(store);
        self
    }

    #[must_use]
    pub fn file_sink(&self) -> &FileSink {
        &self.file
    }

    #[must_use]
    pub fn has_store(&self) -> bool {
        self.store.is_some()
    }

    #[must_use]
    pub fn stats(&self) -> LoadStats {
        *self.stats.lock()
    }

    /// Loads a league-scoped batch (standings, matches, fixtures or teams).
    pub async fn load<T: Loadable>(
        &self,
        entity: EntityKind,
        league: &str,
        season: Option<Season>,
        result: &TransformationResult<T>,
    ) -> LoadReceipt {
        let path = self.file.league_path(league, entity, season);
        let scope = KeyScope {
            league,
            season,
            provider: result.provider,
        };
        self.load_into(entity, league, season, path, scope, result).await
    }

    /// Loads a team's squad under `teams/<safe-name>_squad.json`.
    pub async fn load_squad(
        &self,
        team: &TeamRecord,
        result: &TransformationResult<PlayerRecord>,
    ) -> LoadReceipt {
        let path = self.file.squad_path(&team.name);
        let league = team.league.as_deref().unwrap_or_default();
        let scope = KeyScope {
            league,
            season: None,
            provider: result.provider,
        };
        self.load_into(EntityKind::Squad, &team.name, None, path, scope, result)
            .await
    }

    async fn load_into<T: Loadable>(
        &self,
        entity: EntityKind,
        label: &str,
        season: Option<Season>,
        path: PathBuf,
        scope: KeyScope<'_>,
        result: &TransformationResult<T>,
    ) -> LoadReceipt {
        let mut errors = Vec::new();

        let league = (entity != EntityKind::Squad).then_some(label);
        let envelope = Envelope {
            metadata: LoadMetadata::new(entity, league, season, result.summary()),
            data: result.records.iter().collect::<Vec<_>>(),
        };

        let file_ok = match self.file.write(&path, &envelope).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(entity = %entity, dataset = label, "File sink write failed: {}", e);
                errors.push(format!("file: {e}"));
                false
            }
        };
        self.stats.lock().record_file(file_ok);

        let store_ok = match &self.store {
            Some(store) => Some(self.upsert_all(store.as_ref(), entity, label, scope, result, &mut errors).await),
            None => None,
        };

        tracing::info!(
            entity = %entity,
            dataset = label,
            records = result.records.len(),
            quality = %result.quality,
            file_ok,
            store_ok = ?store_ok,
            "Loaded batch"
        );

        LoadReceipt {
            entity,
            league: label.to_string(),
            season,
            file_ok,
            store_ok,
            records: result.records.len(),
            file_path: path,
            errors,
        }
    }

    async fn upsert_all<T: Loadable>(
        &self,
        store: &dyn DurableStore,
        entity: EntityKind,
        label: &str,
        scope: KeyScope<'_>,
        result: &TransformationResult<T>,
        errors: &mut Vec<String>,
    ) -> bool {
        let collection = entity.collection();
        let mut upserted = 0u64;
        let mut failed = 0u64;

        for record in &result.records {
            let key = record.natural_key(scope);
            let outcome = match serde_json::to_value(record) {
                Ok(document) => store.upsert(collection, &key, &document).await,
                Err(e) => Err(e.into()),
            };
            match outcome {
                Ok(()) => upserted += 1,
                Err(e) => {
                    failed += 1;
                    if errors.len() < 10 {
                        errors.push(format!("store {key}: {e}"));
                    }
                }
            }
        }

        if failed > 0 {
            tracing::error!(
                entity = %entity,
                dataset = label,
                store = store.name(),
                failed,
                upserted,
                "Durable store upserts failed"
            );
        }
        self.stats.lock().record_store(upserted, failed);
        failed == 0
    }
}
