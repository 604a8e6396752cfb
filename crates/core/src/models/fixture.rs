//! Fixtures and results.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// One side of a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSide {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
}

/// Final (or current) score; either side may be unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Score {
    pub home: Option<u32>,
    pub away: Option<u32>,
}

impl Score {
    #[must_use]
    pub const fn new(home: Option<u32>, away: Option<u32>) -> Self {
        Self { home, away }
    }

    /// Both sides known.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.home.is_some() && self.away.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
    Scheduled,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchResult {
    HomeWin,
    Draw,
    AwayWin,
}

/// A fixture or a played match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub id: String,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kickoff: Option<NaiveTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub round: Option<String>,
    pub home: MatchSide,
    pub away: MatchSide,
    pub score: Score,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue: Option<String>,
    pub status: MatchStatus,
    pub result: Option<MatchResult>,
}

impl MatchRecord {
    /// Status and result implied by a score: finished iff both sides are known.
    #[must_use]
    pub fn outcome(score: Score) -> (MatchStatus, Option<MatchResult>) {
        match (score.home, score.away) {
            (Some(home), Some(away)) => {
                let result = match home.cmp(&away) {
                    std::cmp::Ordering::Greater => MatchResult::HomeWin,
                    std::cmp::Ordering::Equal => MatchResult::Draw,
                    std::cmp::Ordering::Less => MatchResult::AwayWin,
                };
                (MatchStatus::Finished, Some(result))
            }
            _ => (MatchStatus::Scheduled, None),
        }
    }

    /// Durable-store key; match ids are not unique across leagues.
    #[must_use]
    pub fn natural_key(&self, league_code: &str) -> String {
        format!("{league_code}:{}", self.id)
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.status == MatchStatus::Finished
    }

    /// True if `team` (id or case-insensitive name) plays in this match.
    #[must_use]
    pub fn involves(&self, team: &str) -> bool {
        self.side_of(team).is_some()
    }

    /// `Some(true)` when `team` is at home, `Some(false)` away, `None` otherwise.
    #[must_use]
    pub fn side_of(&self, team: &str) -> Option<bool> {
        let matches = |side: &MatchSide| {
            side.id.as_deref() == Some(team) || side.name.eq_ignore_ascii_case(team)
        };
        if matches(&self.home) {
            Some(true)
        } else if matches(&self.away) {
            Some(false)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_score_is_scheduled() {
        let (status, result) = MatchRecord::outcome(Score::new(Some(2), None));
        assert_eq!(status, MatchStatus::Scheduled);
        assert_eq!(result, None);
    }

    #[test]
    fn test_complete_score_is_finished() {
        assert_eq!(
            MatchRecord::outcome(Score::new(Some(2), Some(1))),
            (MatchStatus::Finished, Some(MatchResult::HomeWin))
        );
        assert_eq!(
            MatchRecord::outcome(Score::new(Some(1), Some(1))),
            (MatchStatus::Finished, Some(MatchResult::Draw))
        );
        assert_eq!(
            MatchRecord::outcome(Score::new(Some(0), Some(3))),
            (MatchStatus::Finished, Some(MatchResult::AwayWin))
        );
    }

    #[test]
    fn test_status_serialises_upper_case() {
        let json = serde_json::to_string(&MatchStatus::Finished).unwrap();
        assert_eq!(json, "\"FINISHED\"");
        let json = serde_json::to_string(&MatchResult::HomeWin).unwrap();
        assert_eq!(json, "\"HOME_WIN\"");
    }

    #[test]
    fn test_side_of_matches_id_or_name() {
        let (status, result) = MatchRecord::outcome(Score::default());
        let record = MatchRecord {
            id: "1".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            kickoff: None,
            round: None,
            home: MatchSide {
                id: Some("57".to_string()),
                name: "Arsenal".to_string(),
            },
            away: MatchSide {
                id: None,
                name: "Chelsea".to_string(),
            },
            score: Score::default(),
            venue: None,
            status,
            result,
        };
        assert_eq!(record.side_of("57"), Some(true));
        assert_eq!(record.side_of("chelsea"), Some(false));
        assert!(!record.involves("Everton"));
        assert_eq!(record.natural_key("premier_league"), "premier_league:1");
    }
}
