//! Team catalogue and squad normalisation.

use crate::adapter::ProviderAdapter;
use crate::tally::Tally;
use serde_json::Value;
use sports_etl_core::{PlayerRecord, Stadium, TeamRecord, TransformationResult};
use std::collections::HashSet;

/// Normalises raw team rows; id and name are required.
///
/// `league` is the internal league code the teams were fetched for.
#[must_use]
pub fn transform_teams(
    rows: &[Value],
    adapter: &dyn ProviderAdapter,
    league: Option<&str>,
) -> TransformationResult<TeamRecord> {
    let mut tally = Tally::new("teams", adapter.provider(), rows.len());
    let mut seen = HashSet::new();
    let mut records = Vec::with_capacity(rows.len());

    for (index, row) in rows.iter().enumerate() {
        let draft = adapter.team(row);
        let (Some(id), Some(name)) = (draft.id, draft.name) else {
            tally.dropped(index, "missing team id or name");
            continue;
        };
        if !seen.insert(id.clone()) {
            tally.dropped(index, &format!("duplicate team id {id}"));
            continue;
        }

        let stadium = draft.stadium_name.map(|stadium_name| Stadium {
            name: stadium_name,
            capacity: draft.stadium_capacity.and_then(|c| u32::try_from(c).ok()),
            city: draft.stadium_city,
        });

        records.push(TeamRecord {
            short_name: draft.short_name.unwrap_or_else(|| name.clone()),
            id,
            name,
            crest_url: draft.crest_url,
            country: draft.country,
            league: league.map(str::to_string),
            founded: draft.founded.and_then(|y| u16::try_from(y).ok()).filter(|y| *y > 0),
            stadium,
            source: adapter.provider(),
        });
    }

    records.sort_by(|a, b| a.name.cmp(&b.name));
    tally.finish(records)
}

/// Normalises raw squad rows; id and name are required.
///
/// Players whose row carries no team id are attributed to `team_id`.
#[must_use]
pub fn transform_squad(
    rows: &[Value],
    adapter: &dyn ProviderAdapter,
    team_id: &str,
) -> TransformationResult<PlayerRecord> {
    let mut tally = Tally::new("squad", adapter.provider(), rows.len());
    let mut seen = HashSet::new();
    let mut records = Vec::with_capacity(rows.len());

    for (index, row) in rows.iter().enumerate() {
        let draft = adapter.player(row);
        let (Some(id), Some(name)) = (draft.id, draft.name) else {
            tally.dropped(index, "missing player id or name");
            continue;
        };
        if !seen.insert(id.clone()) {
            tally.dropped(index, &format!("duplicate player id {id}"));
            continue;
        }
        records.push(PlayerRecord {
            id,
            name,
            team_id: draft.team_id.unwrap_or_else(|| team_id.to_string()),
            position: draft.position,
            shirt_number: draft.shirt_number.and_then(|n| u32::try_from(n).ok()),
            nationality: draft.nationality,
            date_of_birth: draft.date_of_birth,
        });
    }

    tally.finish(records)
}
