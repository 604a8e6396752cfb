//! CLI commands for the sports data ETL pipeline.

pub mod inspect;
pub mod run;

pub use inspect::{run_form, run_leagues, run_standings, FormArgs, LeaguesArgs, StandingsArgs};
pub use run::{run_batch, run_league, run_quick_update, LeagueArgs, QuickUpdateArgs, RunArgs};
