//! Wiring shared by every command: configuration, registry, sinks.

use anyhow::{Context, Result};
use clap::Args;
use sports_etl_core::{config_loader::DEFAULT_CONFIG_PATH, AppConfig, ConfigLoader, LeagueRegistry};
use sports_etl_data::{
    DatasetCache, DurableStore, FileSink, LocalDatasetReader, MemoryStore, MultiSinkLoader, PgDocumentStore,
};
use sports_etl_extract::ExtractionGateway;
use sports_etl_pipeline::Pipeline;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Flags accepted by every command.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Config file path
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Config profile layered on top (reads Config.<profile>.toml)
    #[arg(long, global = true, env = "SPORTS_ETL_PROFILE")]
    pub profile: Option<String>,

    /// Override the data root of the file sink
    #[arg(long, global = true)]
    pub data_root: Option<PathBuf>,

    /// Upsert into an in-memory store instead of PostgreSQL
    #[arg(long, global = true)]
    pub dry_run_store: bool,
}

pub struct AppContext {
    pub config: AppConfig,
    pub registry: Arc<LeagueRegistry>,
    pub cache: Arc<DatasetCache>,
    dry_run_store: bool,
}

impl AppContext {
    /// Loads configuration; the only step whose failure aborts the process.
    ///
    /// # Errors
    /// Returns an error if the configuration or the league catalogue cannot
    /// be read or parsed.
    pub fn load(args: &GlobalArgs) -> Result<Self> {
        let mut config = ConfigLoader::load_from(&args.config, args.profile.as_deref())
            .with_context(|| format!("loading configuration from {}", args.config.display()))?;
        if let Some(root) = &args.data_root {
            config.data.root.clone_from(root);
        }

        let registry = LeagueRegistry::load(config.registry_path.as_deref())?;
        tracing::info!("League registry: {} league(s)", registry.len());

        let cache = Arc::new(DatasetCache::new(Duration::from_secs(config.data.cache_ttl_secs)));
        Ok(Self {
            config,
            registry: Arc::new(registry),
            cache,
            dry_run_store: args.dry_run_store,
        })
    }

    /// Builds the pipeline with the file sink and, when available, a durable store.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub async fn pipeline(&self) -> Result<Pipeline> {
        let gateway = ExtractionGateway::new(&self.config.providers)?;

        let mut loader = MultiSinkLoader::new(FileSink::new(&self.config.data.root));
        if let Some(store) = self.store().await {
            loader = loader.with_store(store);
        }

        Ok(Pipeline::new(
            Arc::clone(&self.registry),
            Arc::new(gateway),
            loader,
            self.config.pipeline.clone(),
        )
        .with_cache(Arc::clone(&self.cache)))
    }

    #[must_use]
    pub fn reader(&self) -> LocalDatasetReader {
        LocalDatasetReader::new(&self.config.data.root, Arc::clone(&self.cache))
    }

    /// An unreachable database downgrades the run to file-only.
    async fn store(&self) -> Option<Arc<dyn DurableStore>> {
        if self.dry_run_store {
            tracing::info!("Using in-memory document store");
            return Some(Arc::new(MemoryStore::new()));
        }

        let database = self.config.database.as_ref()?;
        match PgDocumentStore::connect(database).await {
            Ok(store) => Some(Arc::new(store)),
            Err(e) => {
                tracing::error!("Document store unavailable, continuing with files only: {}", e);
                None
            }
        }
    }
}
