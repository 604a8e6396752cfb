//! The league catalogue.
//!
//! Built once at start-up and handed to every component behind an `Arc`;
//! nothing looks leagues up through global state.

use crate::league::{LeagueDescriptor, ProviderIds, Tier};
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Immutable catalogue of league descriptors keyed by league code.
#[derive(Debug, Clone)]
pub struct LeagueRegistry {
    leagues: BTreeMap<String, LeagueDescriptor>,
}

#[derive(Debug, Deserialize)]
struct RegistryFile {
    leagues: Vec<LeagueDescriptor>,
}

impl LeagueRegistry {
    /// Builds a registry from descriptors.
    ///
    /// # Errors
    /// Returns an error on duplicate codes or an out-of-range season-start month.
    pub fn from_descriptors(descriptors: impl IntoIterator<Item = LeagueDescriptor>) -> Result<Self> {
        let mut leagues = BTreeMap::new();
        for mut league in descriptors {
            league.code = league.code.trim().to_ascii_lowercase();
            if !(1..=12).contains(&league.season_start_month) {
                bail!(
                    "league {}: season_start_month must be 1-12 (got {})",
                    league.code,
                    league.season_start_month
                );
            }
            if leagues.contains_key(&league.code) {
                bail!("duplicate league code: {}", league.code);
            }
            leagues.insert(league.code.clone(), league);
        }
        Ok(Self { leagues })
    }

    /// Parses a TOML catalogue of `[[leagues]]` tables.
    ///
    /// # Errors
    /// Returns an error if the document is malformed or fails validation.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let file: RegistryFile = toml::from_str(raw).context("parsing league catalogue")?;
        Self::from_descriptors(file.leagues)
    }

    /// Reads a catalogue file, or falls back to the built-in catalogue when
    /// no path is configured.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::builtin());
        };
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading league catalogue {}", path.display()))?;
        let registry = Self::from_toml_str(&raw)?;
        tracing::debug!(path = %path.display(), leagues = registry.len(), "Loaded league catalogue");
        Ok(registry)
    }

    /// The built-in catalogue of supported leagues.
    #[must_use]
    pub fn builtin() -> Self {
        let leagues = builtin_descriptors()
            .into_iter()
            .map(|l| (l.code.clone(), l))
            .collect();
        Self { leagues }
    }

    /// Looks a league up by code, ignoring case.
    #[must_use]
    pub fn get(&self, code: &str) -> Option<&LeagueDescriptor> {
        self.leagues.get(&code.trim().to_ascii_lowercase())
    }

    /// All league codes, sorted.
    #[must_use]
    pub fn codes(&self) -> Vec<String> {
        self.leagues.keys().cloned().collect()
    }

    /// Leagues of one priority tier.
    #[must_use]
    pub fn by_tier(&self, tier: Tier) -> Vec<&LeagueDescriptor> {
        self.leagues.values().filter(|l| l.tier == tier).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LeagueDescriptor> {
        self.leagues.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.leagues.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.leagues.is_empty()
    }
}

#[allow(clippy::too_many_arguments)]
fn league(
    code: &str,
    name: &str,
    country: &str,
    continent: &str,
    tier: Tier,
    ids: (Option<&str>, Option<&str>, Option<&str>),
    season_start_month: u32,
    team_count: u32,
) -> LeagueDescriptor {
    LeagueDescriptor {
        code: code.to_string(),
        name: name.to_string(),
        country: country.to_string(),
        continent: continent.to_string(),
        tier,
        provider_ids: ProviderIds {
            thesportsdb: ids.0.map(str::to_string),
            football_data: ids.1.map(str::to_string),
            api_football: ids.2.map(str::to_string),
        },
        season_start_month,
        team_count,
        provider_priority: None,
    }
}

fn builtin_descriptors() -> Vec<LeagueDescriptor> {
    vec![
        // Tier 1: the big five
        league("premier_league", "Premier League", "England", "Europe", Tier::One, (Some("4328"), Some("PL"), Some("39")), 8, 20),
        league("la_liga", "La Liga", "Spain", "Europe", Tier::One, (Some("4335"), Some("PD"), Some("140")), 8, 20),
        league("bundesliga", "Bundesliga", "Germany", "Europe", Tier::One, (Some("4331"), Some("BL1"), Some("78")), 8, 18),
        league("serie_a", "Serie A", "Italy", "Europe", Tier::One, (Some("4332"), Some("SA"), Some("135")), 8, 20),
        league("ligue_1", "Ligue 1", "France", "Europe", Tier::One, (Some("4334"), Some("FL1"), Some("61")), 8, 18),
        // Tier 2
        league("eredivisie", "Eredivisie", "Netherlands", "Europe", Tier::Two, (Some("4337"), Some("DED"), Some("88")), 8, 18),
        league("primeira_liga", "Primeira Liga", "Portugal", "Europe", Tier::Two, (Some("4344"), Some("PPL"), Some("94")), 8, 18),
        league("championship", "EFL Championship", "England", "Europe", Tier::Two, (Some("4329"), Some("ELC"), Some("40")), 8, 24),
        league("brasileirao", "Campeonato Brasileiro Série A", "Brazil", "South America", Tier::Two, (Some("4351"), Some("BSA"), Some("71")), 4, 20),
        // Tier 3: no football-data.org coverage on the free plan
        league("mls", "Major League Soccer", "USA", "North America", Tier::Three, (Some("4346"), None, Some("253")), 2, 29),
        league("scottish_premiership", "Scottish Premiership", "Scotland", "Europe", Tier::Three, (Some("4330"), None, Some("179")), 8, 12),
        league("super_lig", "Süper Lig", "Turkey", "Europe", Tier::Three, (Some("4339"), None, Some("203")), 8, 19),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{DataNeed, ProviderId};

    #[test]
    fn test_builtin_has_unique_codes() {
        let registry = LeagueRegistry::builtin();
        let rebuilt = LeagueRegistry::from_descriptors(registry.iter().cloned()).unwrap();
        assert_eq!(rebuilt.len(), registry.len());
        assert!(registry.len() >= 10);
    }

    #[test]
    fn test_get_is_case_insensitive() {
        let registry = LeagueRegistry::builtin();
        let league = registry.get("Premier_League").unwrap();
        assert_eq!(league.provider_ids.football_data.as_deref(), Some("PL"));
        assert!(registry.get("unknown_league").is_none());
    }

    #[test]
    fn test_by_tier() {
        let registry = LeagueRegistry::builtin();
        let tier_one = registry.by_tier(Tier::One);
        assert_eq!(tier_one.len(), 5);
        assert!(tier_one.iter().all(|l| l.tier == Tier::One));
    }

    #[test]
    fn test_tier_three_skips_football_data() {
        let registry = LeagueRegistry::builtin();
        let mls = registry.get("mls").unwrap();
        let order = mls.providers_for(DataNeed::Standings);
        assert!(!order.contains(&ProviderId::FootballData));
        assert_eq!(order, vec![ProviderId::TheSportsDb, ProviderId::ApiFootball]);
    }

    #[test]
    fn test_from_toml_str() {
        let raw = r#"
            [[leagues]]
            code = "allsvenskan"
            name = "Allsvenskan"
            country = "Sweden"
            continent = "Europe"
            tier = 3
            season_start_month = 4
            team_count = 16

            [leagues.provider_ids]
            thesportsdb = "4347"
        "#;

        let registry = LeagueRegistry::from_toml_str(raw).unwrap();
        let league = registry.get("allsvenskan").unwrap();
        assert_eq!(league.tier, Tier::Three);
        assert_eq!(league.provider_ids.thesportsdb.as_deref(), Some("4347"));
        assert!(league.provider_ids.api_football.is_none());
    }

    #[test]
    fn test_load_reads_catalogue_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "leagues.toml",
                r#"
                [[leagues]]
                code = "eliteserien"
                name = "Eliteserien"
                country = "Norway"
                continent = "Europe"
                tier = 3
                season_start_month = 4
                team_count = 16
                "#,
            )?;

            let registry = LeagueRegistry::load(Some(Path::new("leagues.toml"))).unwrap();
            assert_eq!(registry.codes(), vec!["eliteserien".to_string()]);
            assert!(LeagueRegistry::load(Some(Path::new("missing.toml"))).is_err());
            assert_eq!(LeagueRegistry::load(None).unwrap().len(), LeagueRegistry::builtin().len());
            Ok(())
        });
    }

    #[test]
    fn test_duplicate_codes_rejected() {
        let registry = LeagueRegistry::builtin();
        let first = registry.get("la_liga").unwrap().clone();
        let result = LeagueRegistry::from_descriptors(vec![first.clone(), first]);
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_start_month_rejected() {
        let mut league = LeagueRegistry::builtin().get("serie_a").unwrap().clone();
        league.season_start_month = 13;
        assert!(LeagueRegistry::from_descriptors(vec![league]).is_err());
    }
}
