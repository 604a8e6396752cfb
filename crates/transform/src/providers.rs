//! Built-in adapters for the three providers.

use crate::adapter::{MatchDraft, PlayerDraft, ProviderAdapter, StandingDraft, TeamDraft};
use crate::field::{date, int, text, text_any, time, timestamp};
use serde_json::Value;
use sports_etl_core::ProviderId;

// =============================================================================
// TheSportsDB
// =============================================================================

/// TheSportsDB: flat rows, `int*`/`str*` keys, every number a string.
#[derive(Debug, Clone, Copy, Default)]
pub struct TheSportsDbAdapter;

impl ProviderAdapter for TheSportsDbAdapter {
    fn provider(&self) -> ProviderId {
        ProviderId::TheSportsDb
    }

    fn standing(&self, row: &Value) -> StandingDraft {
        StandingDraft {
            position: int(row, "/intRank"),
            team_id: text(row, "/idTeam"),
            team_name: text(row, "/strTeam"),
            crest_url: text_any(row, &["/strBadge", "/strTeamBadge"]),
            played: int(row, "/intPlayed"),
            won: int(row, "/intWin"),
            drawn: int(row, "/intDraw"),
            lost: int(row, "/intLoss"),
            points: int(row, "/intPoints"),
            goals_for: int(row, "/intGoalsFor"),
            goals_against: int(row, "/intGoalsAgainst"),
            goal_difference: int(row, "/intGoalDifference"),
            form: text(row, "/strForm"),
        }
    }

    fn fixture(&self, row: &Value) -> MatchDraft {
        MatchDraft {
            id: text(row, "/idEvent"),
            date: date(row, "/dateEvent").or_else(|| timestamp(row, "/strTimestamp").0),
            kickoff: time(row, "/strTime"),
            round: text(row, "/intRound"),
            home_id: text(row, "/idHomeTeam"),
            home_name: text(row, "/strHomeTeam"),
            away_id: text(row, "/idAwayTeam"),
            away_name: text(row, "/strAwayTeam"),
            home_score: int(row, "/intHomeScore"),
            away_score: int(row, "/intAwayScore"),
            venue: text(row, "/strVenue"),
        }
    }

    fn team(&self, row: &Value) -> TeamDraft {
        TeamDraft {
            id: text(row, "/idTeam"),
            name: text(row, "/strTeam"),
            short_name: text(row, "/strTeamShort"),
            crest_url: text_any(row, &["/strBadge", "/strTeamBadge"]),
            country: text(row, "/strCountry"),
            founded: int(row, "/intFormedYear"),
            stadium_name: text_any(row, &["/strStadium", "/strVenue"]),
            stadium_capacity: int(row, "/intStadiumCapacity"),
            stadium_city: text_any(row, &["/strStadiumLocation", "/strLocation"]),
        }
    }

    fn player(&self, row: &Value) -> PlayerDraft {
        PlayerDraft {
            id: text(row, "/idPlayer"),
            name: text(row, "/strPlayer"),
            team_id: text(row, "/idTeam"),
            position: text(row, "/strPosition"),
            shirt_number: int(row, "/strNumber"),
            nationality: text(row, "/strNationality"),
            date_of_birth: date(row, "/dateBorn"),
        }
    }
}

// =============================================================================
// football-data.org
// =============================================================================

/// football-data.org: nested team objects, numeric ids, camelCase keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct FootballDataAdapter;

impl ProviderAdapter for FootballDataAdapter {
    fn provider(&self) -> ProviderId {
        ProviderId::FootballData
    }

    fn standing(&self, row: &Value) -> StandingDraft {
        StandingDraft {
            position: int(row, "/position"),
            team_id: text(row, "/team/id"),
            team_name: text(row, "/team/name"),
            crest_url: text(row, "/team/crest"),
            played: int(row, "/playedGames"),
            won: int(row, "/won"),
            drawn: int(row, "/draw"),
            lost: int(row, "/lost"),
            points: int(row, "/points"),
            goals_for: int(row, "/goalsFor"),
            goals_against: int(row, "/goalsAgainst"),
            goal_difference: int(row, "/goalDifference"),
            form: text(row, "/form"),
        }
    }

    fn fixture(&self, row: &Value) -> MatchDraft {
        let (date, kickoff) = timestamp(row, "/utcDate");
        MatchDraft {
            id: text(row, "/id"),
            date,
            kickoff,
            round: text_any(row, &["/matchday", "/stage"]),
            home_id: text(row, "/homeTeam/id"),
            home_name: text(row, "/homeTeam/name"),
            away_id: text(row, "/awayTeam/id"),
            away_name: text(row, "/awayTeam/name"),
            home_score: int(row, "/score/fullTime/home"),
            away_score: int(row, "/score/fullTime/away"),
            venue: text(row, "/venue"),
        }
    }

    fn team(&self, row: &Value) -> TeamDraft {
        TeamDraft {
            id: text(row, "/id"),
            name: text(row, "/name"),
            short_name: text_any(row, &["/tla", "/shortName"]),
            crest_url: text(row, "/crest"),
            country: text(row, "/area/name"),
            founded: int(row, "/founded"),
            stadium_name: text(row, "/venue"),
            stadium_capacity: None,
            stadium_city: None,
        }
    }

    fn player(&self, row: &Value) -> PlayerDraft {
        PlayerDraft {
            id: text(row, "/id"),
            name: text(row, "/name"),
            team_id: text(row, "/teamId"),
            position: text(row, "/position"),
            shirt_number: int(row, "/shirtNumber"),
            nationality: text(row, "/nationality"),
            date_of_birth: date(row, "/dateOfBirth"),
        }
    }
}

// =============================================================================
// API-Football
// =============================================================================

/// API-Football: entities wrapped in `team`/`fixture`/`teams` objects.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiFootballAdapter;

impl ProviderAdapter for ApiFootballAdapter {
    fn provider(&self) -> ProviderId {
        ProviderId::ApiFootball
    }

    fn standing(&self, row: &Value) -> StandingDraft {
        StandingDraft {
            position: int(row, "/rank"),
            team_id: text(row, "/team/id"),
            team_name: text(row, "/team/name"),
            crest_url: text(row, "/team/logo"),
            played: int(row, "/all/played"),
            won: int(row, "/all/win"),
            drawn: int(row, "/all/draw"),
            lost: int(row, "/all/lose"),
            points: int(row, "/points"),
            goals_for: int(row, "/all/goals/for"),
            goals_against: int(row, "/all/goals/against"),
            goal_difference: int(row, "/goalsDiff"),
            form: text(row, "/form"),
        }
    }

    fn fixture(&self, row: &Value) -> MatchDraft {
        let (date, kickoff) = timestamp(row, "/fixture/date");
        MatchDraft {
            id: text(row, "/fixture/id"),
            date,
            kickoff,
            round: text(row, "/league/round"),
            home_id: text(row, "/teams/home/id"),
            home_name: text(row, "/teams/home/name"),
            away_id: text(row, "/teams/away/id"),
            away_name: text(row, "/teams/away/name"),
            home_score: int(row, "/goals/home"),
            away_score: int(row, "/goals/away"),
            venue: text(row, "/fixture/venue/name"),
        }
    }

    fn team(&self, row: &Value) -> TeamDraft {
        TeamDraft {
            id: text(row, "/team/id"),
            name: text(row, "/team/name"),
            short_name: text(row, "/team/code"),
            crest_url: text(row, "/team/logo"),
            country: text(row, "/team/country"),
            founded: int(row, "/team/founded"),
            stadium_name: text(row, "/venue/name"),
            stadium_capacity: int(row, "/venue/capacity"),
            stadium_city: text(row, "/venue/city"),
        }
    }

    fn player(&self, row: &Value) -> PlayerDraft {
        PlayerDraft {
            id: text(row, "/id"),
            name: text(row, "/name"),
            team_id: text(row, "/teamId"),
            position: text(row, "/position"),
            shirt_number: int(row, "/number"),
            nationality: None,
            date_of_birth: None,
        }
    }
}
