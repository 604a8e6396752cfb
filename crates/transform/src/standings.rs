//! League table normalisation.

use crate::adapter::{ProviderAdapter, StandingDraft};
use crate::tally::Tally;
use serde_json::Value;
use sports_etl_core::{
    ConsistencyPolicy, StandingMetrics, StandingRecord, TeamRecord, TeamRef, TransformationResult,
};

/// Most points a team can hold after `played` games (three per win).
const POINTS_PER_WIN: i64 = 3;

/// Normalises raw table rows.
///
/// Rows missing position, team, games played or points are dropped. Missing
/// secondary counts are filled with zero. Win/draw/loss totals that fall
/// short of games played are handled according to `policy`.
#[must_use]
pub fn transform_standings(
    rows: &[Value],
    adapter: &dyn ProviderAdapter,
    policy: ConsistencyPolicy,
) -> TransformationResult<StandingRecord> {
    let mut tally = Tally::new("standings", adapter.provider(), rows.len());
    let mut records = Vec::with_capacity(rows.len());

    for (index, row) in rows.iter().enumerate() {
        let draft = adapter.standing(row);
        if let Some(record) = standing_from_draft(index, draft, policy, &mut tally) {
            records.push(record);
        }
    }

    records.sort_by_key(|r| r.position);
    tally.finish(records)
}

fn standing_from_draft(
    index: usize,
    draft: StandingDraft,
    policy: ConsistencyPolicy,
    tally: &mut Tally,
) -> Option<StandingRecord> {
    let mut missing = Vec::new();
    if draft.position.is_none() {
        missing.push("position");
    }
    if draft.team_name.is_none() && draft.team_id.is_none() {
        missing.push("team");
    }
    if draft.played.is_none() {
        missing.push("games played");
    }
    if draft.points.is_none() {
        missing.push("points");
    }
    if !missing.is_empty() {
        tally.dropped(index, &format!("missing {}", missing.join(", ")));
        return None;
    }

    let position = draft.position.and_then(|p| u32::try_from(p).ok()).filter(|p| *p >= 1);
    let Some(position) = position else {
        tally.dropped(index, "position must be a positive rank");
        return None;
    };
    let Some(played) = draft.played.and_then(|p| u32::try_from(p).ok()) else {
        tally.dropped(index, "negative games played");
        return None;
    };
    let Some(points) = draft.points.and_then(|p| i32::try_from(p).ok()) else {
        tally.dropped(index, "points out of range");
        return None;
    };

    let team_name = draft.team_name.clone().or(draft.team_id.clone()).unwrap_or_default();
    let team_id = draft
        .team_id
        .clone()
        .unwrap_or_else(|| TeamRecord::safe_name(&team_name));

    let mut fills = 0;
    let won = count(index, "won", draft.won, &mut fills, tally);
    let mut drawn = count(index, "drawn", draft.drawn, &mut fills, tally);
    let lost = count(index, "lost", draft.lost, &mut fills, tally);
    let goals_for = count(index, "goals for", draft.goals_for, &mut fills, tally);
    let goals_against = count(index, "goals against", draft.goals_against, &mut fills, tally);
    let goals_known = draft.goals_for.is_some() && draft.goals_against.is_some();

    let computed_gd = i64::from(goals_for) - i64::from(goals_against);
    let goal_difference = match draft.goal_difference {
        Some(gd) => {
            if goals_known && gd != computed_gd {
                tally.outlier(
                    index,
                    &format!("goal difference {gd} does not match goals {goals_for}-{goals_against}"),
                );
            }
            gd
        }
        None => {
            fills += 1;
            computed_gd
        }
    };
    tally.filled(fills);

    if i64::from(points) > POINTS_PER_WIN * i64::from(played) {
        tally.outlier(
            index,
            &format!("{points} points exceed the maximum for {played} games"),
        );
    }

    let decided = u64::from(won) + u64::from(drawn) + u64::from(lost);
    if decided < u64::from(played) {
        // decided < played, so the u32 sum cannot overflow
        let deficit = played - (won + drawn + lost);
        match policy {
            ConsistencyPolicy::RepairDraws => {
                drawn += deficit;
                tally.repaired(
                    index,
                    &format!("wins+draws+losses {decided} < games played {played}; credited {deficit} to draws"),
                );
            }
            ConsistencyPolicy::RejectRow => {
                tally.dropped(
                    index,
                    &format!("wins+draws+losses {decided} < games played {played}"),
                );
                return None;
            }
        }
    } else if decided > u64::from(played) {
        match policy {
            ConsistencyPolicy::RepairDraws => tally.outlier(
                index,
                &format!("wins+draws+losses {decided} > games played {played}"),
            ),
            ConsistencyPolicy::RejectRow => {
                tally.dropped(
                    index,
                    &format!("wins+draws+losses {decided} > games played {played}"),
                );
                return None;
            }
        }
    }

    let goal_difference = match i32::try_from(goal_difference) {
        Ok(gd) => gd,
        Err(_) => {
            tally.outlier(index, &format!("goal difference {goal_difference} out of range"));
            if goal_difference < 0 {
                i32::MIN
            } else {
                i32::MAX
            }
        }
    };

    Some(StandingRecord {
        position,
        team: TeamRef {
            id: team_id,
            name: team_name,
            crest_url: draft.crest_url,
        },
        played,
        won,
        drawn,
        lost,
        points,
        goals_for,
        goals_against,
        goal_difference,
        form: draft.form,
        metrics: StandingMetrics::compute(played, won, drawn, lost, points, goals_for, goals_against),
    })
}

/// A secondary count: absent values are filled with zero, negative or
/// oversized ones are zeroed and flagged.
fn count(index: usize, field: &str, value: Option<i64>, fills: &mut usize, tally: &mut Tally) -> u32 {
    match value {
        None => {
            *fills += 1;
            0
        }
        Some(v) => u32::try_from(v).unwrap_or_else(|_| {
            tally.outlier(index, &format!("{field} {v} out of range; zeroed"));
            0
        }),
    }
}
