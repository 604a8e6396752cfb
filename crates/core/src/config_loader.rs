use crate::config::AppConfig;
use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use std::path::Path;

/// Environment variable prefix; nested keys are separated by `__`,
/// e.g. `SPORTS_ETL_PROVIDERS__FOOTBALL_DATA__API_KEY`.
pub const ENV_PREFIX: &str = "SPORTS_ETL_";

pub const DEFAULT_CONFIG_PATH: &str = "config/Config.toml";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads application configuration by layering built-in defaults, the
    /// TOML file and environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration files cannot be read or parsed.
    pub fn load() -> Result<AppConfig> {
        Self::load_from(DEFAULT_CONFIG_PATH, None)
    }

    /// Loads application configuration with a specific profile.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration files cannot be read or parsed.
    pub fn load_with_profile(profile: &str) -> Result<AppConfig> {
        Self::load_from(DEFAULT_CONFIG_PATH, Some(profile))
    }

    /// Loads configuration from an explicit file; `Config.<profile>.toml`
    /// next to it is layered on top when a profile is given. Missing files
    /// are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration files cannot be parsed.
    pub fn load_from(path: impl AsRef<Path>, profile: Option<&str>) -> Result<AppConfig> {
        let path = path.as_ref();
        let config: AppConfig = Self::figment(path, profile).extract()?;
        tracing::debug!(path = %path.display(), ?profile, "Loaded configuration");
        Ok(config)
    }

    fn figment(path: &Path, profile: Option<&str>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(path));

        if let Some(profile) = profile {
            let profile_file = path.with_file_name(format!("Config.{profile}.toml"));
            figment = figment.merge(Toml::file(profile_file));
        }

        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }
}
