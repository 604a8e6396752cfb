//! League table rows.

use crate::league::Season;
use serde::{Deserialize, Serialize};

/// Compact team reference embedded in standings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRef {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crest_url: Option<String>,
}

/// One row of a league table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandingRecord {
    /// Rank in the table, 1-based.
    pub position: u32,
    pub team: TeamRef,
    pub played: u32,
    pub won: u32,
    pub drawn: u32,
    pub lost: u32,
    /// Signed because of points deductions.
    pub points: i32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub goal_difference: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form: Option<String>,
    pub metrics: StandingMetrics,
}

impl StandingRecord {
    /// Durable-store key; team ids are only unique within a league and season.
    #[must_use]
    pub fn natural_key(&self, league_code: &str, season: Season) -> String {
        format!("{league_code}:{}:{}", season.underscored(), self.team.id)
    }

    /// Highest points total reachable in `played` games.
    #[must_use]
    pub const fn max_points(played: u32) -> i64 {
        played as i64 * 3
    }
}

/// Per-game metrics derived from a table row.
///
/// Every ratio divides by `max(played, 1)` so a team that has not played yet
/// gets zeros rather than NaN.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StandingMetrics {
    pub points_per_game: f64,
    pub goal_difference_per_game: f64,
    pub goals_for_per_game: f64,
    pub goals_against_per_game: f64,
    pub win_rate: f64,
    pub draw_rate: f64,
    pub loss_rate: f64,
}

impl StandingMetrics {
    #[must_use]
    pub fn compute(
        played: u32,
        won: u32,
        drawn: u32,
        lost: u32,
        points: i32,
        goals_for: u32,
        goals_against: u32,
    ) -> Self {
        let games = f64::from(played.max(1));
        let goal_difference = i64::from(goals_for) - i64::from(goals_against);

        Self {
            points_per_game: f64::from(points) / games,
            goal_difference_per_game: goal_difference as f64 / games,
            goals_for_per_game: f64::from(goals_for) / games,
            goals_against_per_game: f64::from(goals_against) / games,
            win_rate: f64::from(won) / games,
            draw_rate: f64::from(drawn) / games,
            loss_rate: f64::from(lost) / games,
        }
    }
}
