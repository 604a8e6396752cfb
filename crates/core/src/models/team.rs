//! Clubs and their rosters.

use crate::provider::ProviderId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stadium {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
}

/// A club as described by the provider that supplied it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRecord {
    /// Identifier at `source`; squad lookups start there.
    pub id: String,
    pub name: String,
    pub short_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crest_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub league: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub founded: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stadium: Option<Stadium>,
    pub source: ProviderId,
}

impl TeamRecord {
    /// File-system safe version of the team name: lowercase ASCII
    /// alphanumerics joined by single underscores.
    #[must_use]
    pub fn safe_name(name: &str) -> String {
        let mut out = String::with_capacity(name.len());
        let mut last_sep = true;
        for ch in name.chars() {
            if ch.is_ascii_alphanumeric() {
                out.push(ch.to_ascii_lowercase());
                last_sep = false;
            } else if !last_sep {
                out.push('_');
                last_sep = true;
            }
        }
        let trimmed = out.trim_end_matches('_');
        if trimmed.is_empty() {
            "team".to_string()
        } else {
            trimmed.to_string()
        }
    }
}

/// One player in a squad.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub id: String,
    pub name: String,
    pub team_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shirt_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nationality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
}

impl PlayerRecord {
    #[must_use]
    pub fn natural_key(&self) -> String {
        format!("{}:{}", self.team_id, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_name() {
        assert_eq!(TeamRecord::safe_name("Manchester United FC"), "manchester_united_fc");
        assert_eq!(TeamRecord::safe_name("  Brighton & Hove Albion "), "brighton_hove_albion");
        assert_eq!(TeamRecord::safe_name("../../etc"), "etc");
        assert_eq!(TeamRecord::safe_name("Atlético Madrid"), "atl_tico_madrid");
        assert_eq!(TeamRecord::safe_name("***"), "team");
    }
}
