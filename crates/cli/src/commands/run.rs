//! Pipeline runs: batch, single league and quick updates.

use crate::context::AppContext;
use anyhow::{anyhow, Result};
use clap::Args;
use sports_etl_core::{PipelineConfig, Season, Tier};
use sports_etl_pipeline::{LeagueRunResult, PipelineRunResult, RunSummaryFormatter};

/// Arguments for the run command.
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Comma-separated league codes (defaults to every registry league)
    #[arg(long, value_delimiter = ',')]
    pub leagues: Vec<String>,

    /// Only leagues of this tier (1-3)
    #[arg(long, conflicts_with = "leagues")]
    pub tier: Option<u8>,

    /// Process leagues concurrently
    #[arg(long)]
    pub parallel: bool,

    /// Season, e.g. 2024-2025 (defaults to each league's current season)
    #[arg(long)]
    pub season: Option<Season>,

    /// Print the run result as JSON instead of the summary table
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the league command.
#[derive(Args, Debug, Clone)]
pub struct LeagueArgs {
    /// League code, e.g. premier_league
    pub code: String,

    #[arg(long)]
    pub season: Option<Season>,

    #[arg(long)]
    pub json: bool,
}

/// Arguments for the quick-update command.
#[derive(Args, Debug, Clone)]
pub struct QuickUpdateArgs {
    /// League codes
    #[arg(required = true)]
    pub codes: Vec<String>,

    #[arg(long)]
    pub parallel: bool,

    #[arg(long)]
    pub json: bool,
}

/// Runs the batch command.
///
/// # Errors
/// Returns an error for an invalid tier or if the pipeline cannot be built.
pub async fn run_batch(ctx: &AppContext, args: RunArgs) -> Result<()> {
    let codes = select_leagues(ctx, &args)?;
    let parallel = parallel_mode(args.parallel, &ctx.config.pipeline);
    tracing::info!("Running {} league(s), parallel: {}", codes.len(), parallel);

    let pipeline = ctx.pipeline().await?;
    let result = pipeline.process_leagues(&codes, args.season, parallel).await;
    print_result(&result, args.json)
}

/// Runs one league.
///
/// # Errors
/// Returns an error if the pipeline cannot be built.
pub async fn run_league(ctx: &AppContext, args: LeagueArgs) -> Result<()> {
    let pipeline = ctx.pipeline().await?;
    let started_at = chrono::Utc::now();

    let league = match pipeline.process_league(&args.code, args.season).await {
        Ok(league) => league,
        Err(e) => LeagueRunResult::failed(&args.code, args.season, started_at, e),
    };
    print_result(&PipelineRunResult::from_leagues(started_at, vec![league]), args.json)
}

/// Refreshes standings and upcoming fixtures.
///
/// # Errors
/// Returns an error if the pipeline cannot be built.
pub async fn run_quick_update(ctx: &AppContext, args: QuickUpdateArgs) -> Result<()> {
    let parallel = parallel_mode(args.parallel, &ctx.config.pipeline);
    tracing::info!("Quick update of {} league(s), parallel: {}", args.codes.len(), parallel);

    let pipeline = ctx.pipeline().await?;
    let result = pipeline.quick_updates(&args.codes, parallel).await;
    print_result(&result, args.json)
}

/// The `--parallel` flag can only switch concurrency on.
fn parallel_mode(flag: bool, config: &PipelineConfig) -> bool {
    flag || config.parallel
}

fn select_leagues(ctx: &AppContext, args: &RunArgs) -> Result<Vec<String>> {
    if !args.leagues.is_empty() {
        return Ok(args.leagues.iter().map(|c| c.trim().to_string()).collect());
    }
    match args.tier {
        Some(tier) => {
            let tier = Tier::try_from(tier).map_err(|e| anyhow!(e))?;
            Ok(ctx.registry.by_tier(tier).into_iter().map(|l| l.code.clone()).collect())
        }
        None => Ok(ctx.registry.codes()),
    }
}

fn print_result(result: &PipelineRunResult, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
    } else {
        print!("{}", RunSummaryFormatter::format(result));
    }
    Ok(())
}
