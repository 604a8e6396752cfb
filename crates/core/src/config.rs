use crate::provider::ProviderId;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub database: Option<DatabaseConfig>,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    /// TOML league catalogue replacing the built-in one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registry_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Root of the file sink (`<root>/leagues/...`, `<root>/teams/...`).
    pub root: PathBuf,
    /// TTL of the dataset reader cache.
    pub cache_ttl_secs: u64,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("data"),
            cache_ttl_secs: 1800,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub enabled: bool,
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    /// Minimum spacing between two requests to this provider.
    pub min_interval_ms: u64,
    pub timeout_secs: u64,
}

impl ProviderConfig {
    /// Whether the provider can be called at all.
    ///
    /// football-data.org and API-Football refuse anonymous requests, so they
    /// count as unconfigured without a key.
    #[must_use]
    pub fn is_usable(&self, provider: ProviderId) -> bool {
        if !self.enabled {
            return false;
        }
        match provider {
            ProviderId::TheSportsDb => true,
            ProviderId::FootballData | ProviderId::ApiFootball => {
                self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    pub thesportsdb: ProviderConfig,
    pub football_data: ProviderConfig,
    pub api_football: ProviderConfig,
}

impl ProvidersConfig {
    #[must_use]
    pub fn get(&self, provider: ProviderId) -> &ProviderConfig {
        match provider {
            ProviderId::TheSportsDb => &self.thesportsdb,
            ProviderId::FootballData => &self.football_data,
            ProviderId::ApiFootball => &self.api_football,
        }
    }
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            thesportsdb: ProviderConfig {
                enabled: true,
                base_url: "https://www.thesportsdb.com/api/v1/json".to_string(),
                // Public test key.
                api_key: Some("3".to_string()),
                min_interval_ms: 0,
                timeout_secs: 30,
            },
            football_data: ProviderConfig {
                enabled: true,
                base_url: "https://api.football-data.org/v4".to_string(),
                api_key: None,
                // Free plan: 10 requests per minute.
                min_interval_ms: 6_000,
                timeout_secs: 30,
            },
            api_football: ProviderConfig {
                enabled: true,
                base_url: "https://v3.football.api-sports.io".to_string(),
                api_key: None,
                min_interval_ms: 1_000,
                timeout_secs: 30,
            },
        }
    }
}

/// What to do with a table row whose wins + draws + losses fall short of games played.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsistencyPolicy {
    /// Credit the deficit to draws and log a warning.
    #[default]
    RepairDraws,
    /// Drop the row as invalid.
    RejectRow,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Fan leagues out concurrently instead of one after another.
    pub parallel: bool,
    pub max_concurrency: usize,
    /// Deadline for one league's full run.
    pub league_timeout_secs: u64,
    /// Fetch and store squads after teams.
    pub include_rosters: bool,
    #[serde(default)]
    pub consistency_policy: ConsistencyPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            parallel: false,
            max_concurrency: 4,
            league_timeout_secs: 300,
            include_rosters: false,
            consistency_policy: ConsistencyPolicy::RepairDraws,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_usable_without_files() {
        let config = AppConfig::default();
        assert_eq!(config.data.root, PathBuf::from("data"));
        assert_eq!(config.data.cache_ttl_secs, 1800);
        assert!(config.database.is_none());
        assert!(!config.pipeline.parallel);
    }

    #[test]
    fn test_keyed_providers_need_a_key() {
        let providers = ProvidersConfig::default();
        assert!(providers.thesportsdb.is_usable(ProviderId::TheSportsDb));
        assert!(!providers.football_data.is_usable(ProviderId::FootballData));

        let mut keyed = providers.api_football.clone();
        keyed.api_key = Some("secret".to_string());
        assert!(keyed.is_usable(ProviderId::ApiFootball));

        keyed.enabled = false;
        assert!(!keyed.is_usable(ProviderId::ApiFootball));
    }

    #[test]
    fn test_football_data_interval_respects_free_quota() {
        let providers = ProvidersConfig::default();
        assert!(providers.get(ProviderId::FootballData).min_interval_ms >= 6_000);
    }
}
