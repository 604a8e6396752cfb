#![allow(clippy::format_push_string)]

use crate::summary::{EntityStatus, PipelineRunResult};
use sports_etl_core::QualityGrade;

const RULE: &str = "═══════════════════════════════════════════════════════════════\n";
const THIN_RULE: &str = "───────────────────────────────────────────────────────────────\n";

pub struct RunSummaryFormatter;

impl RunSummaryFormatter {
    #[must_use]
    pub fn format(result: &PipelineRunResult) -> String {
        let mut output = String::new();

        output.push('\n');
        output.push_str(RULE);
        output.push_str("                    PIPELINE RUN SUMMARY                       \n");
        output.push_str(RULE);
        output.push('\n');

        // Timing
        output.push_str("Timing\n");
        output.push_str(THIN_RULE);
        output.push_str(&format!(
            "Start:                 {}\n",
            result.started_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));
        output.push_str(&format!(
            "End:                   {}\n",
            result.finished_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));
        let duration = result.duration();
        output.push_str(&format!(
            "Duration:              {}m {}s\n",
            duration.num_minutes(),
            duration.num_seconds() % 60
        ));
        output.push('\n');

        // Leagues
        let total = result.leagues_processed + result.leagues_failed.len();
        output.push_str("Leagues\n");
        output.push_str(THIN_RULE);
        output.push_str(&format!("Processed:             {}/{}\n", result.leagues_processed, total));
        output.push_str(&format!("Success Rate:          {:.1}%\n", result.success_rate() * 100.0));
        for (league, reason) in &result.leagues_failed {
            output.push_str(&format!("  ✗ {league:<20} {reason}\n"));
        }
        output.push('\n');

        // Records
        output.push_str("Records Loaded\n");
        output.push_str(THIN_RULE);
        output.push_str(&format!("Standings:             {}\n", result.records.standings));
        output.push_str(&format!("Matches:               {}\n", result.records.matches));
        output.push_str(&format!("Fixtures:              {}\n", result.records.fixtures));
        output.push_str(&format!("Teams:                 {}\n", result.records.teams));
        output.push_str(&format!("Players:               {}\n", result.records.players));
        output.push('\n');

        // Quality
        output.push_str("Quality Distribution\n");
        output.push_str(THIN_RULE);
        for grade in [QualityGrade::High, QualityGrade::Medium, QualityGrade::Low, QualityGrade::Invalid] {
            let count = result.quality_distribution.get(&grade).copied().unwrap_or(0);
            output.push_str(&format!("{:<23}{}\n", format!("{grade}:"), count));
        }
        output.push('\n');

        // Per league
        if !result.leagues.is_empty() {
            output.push_str("Per League\n");
            output.push_str(THIN_RULE);
            for league in &result.leagues {
                let marker = if league.is_success() { "✓" } else { "✗" };
                let season = league.season.map(|s| s.to_string()).unwrap_or_else(|| "-".to_string());
                output.push_str(&format!("{marker} {:<20} {season}\n", league.league));
                for entity in &league.entities {
                    let detail = match &entity.status {
                        EntityStatus::Loaded => format!(
                            "{} rows, {} via {}",
                            entity.rows_output,
                            entity.quality.map_or("-", |q| q.as_str()),
                            entity.provider.map_or("-", |p| p.as_str()),
                        ),
                        EntityStatus::NoData => "no data".to_string(),
                        EntityStatus::Failed(reason) => format!("failed: {reason}"),
                    };
                    output.push_str(&format!("    {:<12} {detail}\n", entity.kind.as_str()));
                }
            }
            output.push('\n');
        }

        output.push_str(RULE);

        if result.records.total() == 0 {
            output.push_str("\n⚠️  No records were loaded during this run.\n");
            output.push_str("    Check provider API keys and league identifiers.\n\n");
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summary::{EntityOutcome, LeagueRunResult};
    use chrono::Utc;
    use sports_etl_core::{ProviderId, Season};
    use sports_etl_data::EntityKind;

    #[test]
    fn test_format_mentions_leagues_and_grades() {
        let league = LeagueRunResult {
            league: "la_liga".to_string(),
            season: Some(Season::new(2024)),
            started_at: Utc::now(),
            finished_at: Utc::now(),
            entities: vec![
                EntityOutcome {
                    kind: EntityKind::Standings,
                    provider: Some(ProviderId::TheSportsDb),
                    quality: Some(QualityGrade::High),
                    rows_output: 20,
                    receipt: None,
                    status: EntityStatus::Loaded,
                    attempts: vec![],
                },
                EntityOutcome::no_data(EntityKind::Teams),
            ],
            error: None,
        };
        let result = PipelineRunResult::from_leagues(Utc::now(), vec![league]);

        let text = RunSummaryFormatter::format(&result);
        assert!(text.contains("PIPELINE RUN SUMMARY"));
        assert!(text.contains("Processed:             1/1"));
        assert!(text.contains("20 rows, HIGH via thesportsdb"));
        assert!(text.contains("no data"));
        assert!(!text.contains("No records were loaded"));
    }

    #[test]
    fn test_format_warns_when_nothing_loaded() {
        let result = PipelineRunResult::from_leagues(Utc::now(), vec![]);
        assert!(RunSummaryFormatter::format(&result).contains("No records were loaded"));
    }
}
