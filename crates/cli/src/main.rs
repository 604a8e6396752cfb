use clap::{Parser, Subcommand};

mod commands;
mod context;

use commands::{FormArgs, LeagueArgs, LeaguesArgs, QuickUpdateArgs, RunArgs, StandingsArgs};
use context::{AppContext, GlobalArgs};

#[derive(Parser)]
#[command(name = "sports-etl")]
#[command(about = "Sports statistics ETL pipeline", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pipeline for a batch of leagues
    Run(RunArgs),
    /// Run the pipeline for one league
    League(LeagueArgs),
    /// Refresh standings and upcoming fixtures only
    QuickUpdate(QuickUpdateArgs),
    /// List the league registry
    Leagues(LeaguesArgs),
    /// Show a stored league table
    Standings(StandingsArgs),
    /// Show a team's recent form from stored matches
    Form(FormArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Configuration errors are the only ones that fail the process.
    let ctx = AppContext::load(&cli.global)?;

    let outcome = match cli.command {
        Commands::Run(args) => commands::run_batch(&ctx, args).await,
        Commands::League(args) => commands::run_league(&ctx, args).await,
        Commands::QuickUpdate(args) => commands::run_quick_update(&ctx, args).await,
        Commands::Leagues(args) => commands::run_leagues(&ctx, &args),
        Commands::Standings(args) => commands::run_standings(&ctx, &args).await,
        Commands::Form(args) => commands::run_form(&ctx, &args).await,
    };

    if let Err(e) = outcome {
        tracing::error!("Command failed: {:#}", e);
    }

    Ok(())
}
