//! Read-only commands over the registry and the file sink.

use crate::context::AppContext;
use anyhow::{anyhow, Result};
use clap::Args;
use sports_etl_core::{ProviderId, Season, Tier};

/// Arguments for the leagues command.
#[derive(Args, Debug, Clone)]
pub struct LeaguesArgs {
    /// Only leagues of this tier (1-3)
    #[arg(long)]
    pub tier: Option<u8>,
}

/// Arguments for the standings command.
#[derive(Args, Debug, Clone)]
pub struct StandingsArgs {
    pub code: String,

    /// Season, e.g. 2024-2025 (defaults to the league's current season)
    #[arg(long)]
    pub season: Option<Season>,
}

/// Arguments for the form command.
#[derive(Args, Debug, Clone)]
pub struct FormArgs {
    pub code: String,

    /// Team id or name
    pub team: String,

    /// Number of finished matches to consider
    #[arg(long, default_value_t = 5)]
    pub last: usize,

    #[arg(long)]
    pub season: Option<Season>,
}

/// Lists the league registry.
///
/// # Errors
/// Returns an error for an invalid tier.
pub fn run_leagues(ctx: &AppContext, args: &LeaguesArgs) -> Result<()> {
    let tier = args
        .tier
        .map(Tier::try_from)
        .transpose()
        .map_err(|e| anyhow!(e))?;

    println!();
    println!(
        "{:<22} {:<28} {:<14} {:>4} {:>8}  {}",
        "Code", "Name", "Country", "Tier", "Season", "Providers"
    );
    println!("{}", "-".repeat(100));

    for league in ctx.registry.iter().filter(|l| tier.map_or(true, |t| l.tier == t)) {
        let providers: Vec<&str> = ProviderId::ALL
            .iter()
            .filter(|p| league.provider_ids.get(**p).is_some())
            .map(|p| p.as_str())
            .collect();
        println!(
            "{:<22} {:<28} {:<14} {:>4} {:>8}  {}",
            league.code,
            league.name,
            league.country,
            u8::from(league.tier),
            league.current_season().to_string(),
            providers.join(", ")
        );
    }
    println!();
    Ok(())
}

/// Prints a stored league table.
///
/// # Errors
/// Returns an error for an unknown league or an unreadable dataset.
pub async fn run_standings(ctx: &AppContext, args: &StandingsArgs) -> Result<()> {
    let (code, season) = resolve(ctx, &args.code, args.season)?;
    let table = ctx.reader().standings(&code, season).await?;

    if table.is_empty() {
        println!("No standings on file for {code} {season}");
        return Ok(());
    }

    println!();
    println!("{code} {season}");
    println!(
        "{:>3}  {:<28} {:>3} {:>3} {:>3} {:>3} {:>4} {:>4} {:>5} {:>4}",
        "#", "Team", "P", "W", "D", "L", "GF", "GA", "GD", "Pts"
    );
    println!("{}", "-".repeat(72));
    for row in table.iter() {
        println!(
            "{:>3}  {:<28} {:>3} {:>3} {:>3} {:>3} {:>4} {:>4} {:>+5} {:>4}",
            row.position,
            row.team.name,
            row.played,
            row.won,
            row.drawn,
            row.lost,
            row.goals_for,
            row.goals_against,
            row.goal_difference,
            row.points
        );
    }
    println!();
    Ok(())
}

/// Prints a team's recent form.
///
/// # Errors
/// Returns an error for an unknown league or an unreadable dataset.
pub async fn run_form(ctx: &AppContext, args: &FormArgs) -> Result<()> {
    let (code, season) = resolve(ctx, &args.code, args.season)?;
    let form = ctx
        .reader()
        .team_form(&code, season, &args.team, args.last)
        .await?;

    if form.matches() == 0 {
        println!("No finished matches on file for {} in {code} {season}", args.team);
        return Ok(());
    }

    println!("Team:     {}", args.team);
    println!("Form:     {form}  (newest first)");
    println!("Record:   {}W {}D {}L", form.wins, form.draws, form.losses);
    println!("Points:   {} from {} matches", form.points, form.matches());
    println!("Goals:    {}-{}", form.goals_for, form.goals_against);
    if let Some((result, run)) = form.streak() {
        println!("Streak:   {}{}", run, result.letter());
    }
    Ok(())
}

/// Canonical league code and the season to read.
fn resolve(ctx: &AppContext, code: &str, season: Option<Season>) -> Result<(String, Season)> {
    let league = ctx
        .registry
        .get(code)
        .ok_or_else(|| anyhow!("league not found: {code}"))?;
    Ok((league.code.clone(), season.unwrap_or_else(|| league.current_season())))
}
