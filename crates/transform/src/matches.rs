//! Fixture and result normalisation.

use crate::adapter::{MatchDraft, ProviderAdapter};
use crate::tally::Tally;
use serde_json::Value;
use sports_etl_core::{MatchRecord, MatchSide, Score, TransformationResult};
use std::collections::HashSet;

/// Normalises raw match rows.
///
/// Id, both teams and the date are required. Status and result are derived
/// from the score pair: a match is finished only when both sides are known.
/// Repeated ids keep the first occurrence.
#[must_use]
pub fn transform_matches(rows: &[Value], adapter: &dyn ProviderAdapter) -> TransformationResult<MatchRecord> {
    let mut tally = Tally::new("matches", adapter.provider(), rows.len());
    let mut seen = HashSet::new();
    let mut records = Vec::with_capacity(rows.len());

    for (index, row) in rows.iter().enumerate() {
        let Some(record) = match_from_draft(index, adapter.fixture(row), &mut tally) else {
            continue;
        };
        if !seen.insert(record.id.clone()) {
            tally.dropped(index, &format!("duplicate match id {}", record.id));
            continue;
        }
        records.push(record);
    }

    records.sort_by(|a, b| (a.date, a.kickoff, &a.id).cmp(&(b.date, b.kickoff, &b.id)));
    tally.finish(records)
}

fn match_from_draft(index: usize, draft: MatchDraft, tally: &mut Tally) -> Option<MatchRecord> {
    let home_name = draft.home_name.or(draft.home_id.clone());
    let away_name = draft.away_name.or(draft.away_id.clone());

    let mut missing = Vec::new();
    if draft.id.is_none() {
        missing.push("id");
    }
    if home_name.is_none() {
        missing.push("home team");
    }
    if away_name.is_none() {
        missing.push("away team");
    }
    if draft.date.is_none() {
        missing.push("date");
    }
    let (Some(id), Some(home_name), Some(away_name), Some(date)) =
        (draft.id, home_name, away_name, draft.date)
    else {
        tally.dropped(index, &format!("missing {}", missing.join(", ")));
        return None;
    };

    let goals = |value: Option<i64>| value.and_then(|v| u32::try_from(v).ok());
    let score = Score {
        home: goals(draft.home_score),
        away: goals(draft.away_score),
    };
    let (status, result) = MatchRecord::outcome(score);

    Some(MatchRecord {
        id,
        date,
        kickoff: draft.kickoff,
        round: draft.round,
        home: MatchSide {
            id: draft.home_id,
            name: home_name,
        },
        away: MatchSide {
            id: draft.away_id,
            name: away_name,
        },
        score,
        venue: draft.venue,
        status,
        result,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{ApiFootballAdapter, TheSportsDbAdapter};
    use serde_json::json;
    use sports_etl_core::{MatchResult, MatchStatus, QualityGrade};

    fn event(id: &str, home_score: Value, away_score: Value) -> Value {
        json!({
            "idEvent": id, "dateEvent": "2024-08-17", "strTime": "14:00:00", "intRound": "1",
            "idHomeTeam": "133604", "strHomeTeam": "Arsenal",
            "idAwayTeam": "134301", "strAwayTeam": "Wolves",
            "intHomeScore": home_score, "intAwayScore": away_score
        })
    }

    #[test]
    fn test_half_known_score_is_scheduled() {
        let result = transform_matches(&[event("1", json!(2), Value::Null)], &TheSportsDbAdapter);
        let record = &result.records[0];
        assert_eq!(record.status, MatchStatus::Scheduled);
        assert_eq!(record.result, None);
    }

    #[test]
    fn test_full_score_is_finished_home_win() {
        let result = transform_matches(&[event("1", json!("2"), json!("1"))], &TheSportsDbAdapter);
        let record = &result.records[0];
        assert_eq!(record.status, MatchStatus::Finished);
        assert_eq!(record.result, Some(MatchResult::HomeWin));
        assert_eq!(record.score.home, Some(2));
        assert_eq!(result.quality, QualityGrade::High);
    }

    #[test]
    fn test_duplicates_and_missing_fields_are_dropped() {
        let mut no_date = event("3", Value::Null, Value::Null);
        no_date.as_object_mut().unwrap().remove("dateEvent");
        let rows = vec![
            event("1", json!(1), json!(1)),
            event("1", json!(1), json!(1)),
            event("2", Value::Null, Value::Null),
            no_date,
        ];
        let result = transform_matches(&rows, &TheSportsDbAdapter);

        assert_eq!(result.rows_output, 2);
        assert_eq!(result.rows_dropped, 2);
        assert!(result.warnings.iter().any(|w| w.contains("duplicate")));
        assert!(result.warnings.iter().any(|w| w.contains("date")));
        assert_eq!(result.quality, QualityGrade::Low);
    }

    #[test]
    fn test_api_football_fixture() {
        let row = json!({
            "fixture": {"id": 1208021, "date": "2024-08-16T19:00:00+00:00", "venue": {"name": "Old Trafford"}},
            "league": {"round": "Regular Season - 1"},
            "teams": {"home": {"id": 33, "name": "Manchester United"}, "away": {"id": 36, "name": "Fulham"}},
            "goals": {"home": 1, "away": 0}
        });
        let result = transform_matches(&[row], &ApiFootballAdapter);
        let record = &result.records[0];
        assert_eq!(record.id, "1208021");
        assert_eq!(record.venue.as_deref(), Some("Old Trafford"));
        assert_eq!(record.result, Some(MatchResult::HomeWin));
    }
}
