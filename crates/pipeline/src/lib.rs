//! League-by-league ETL orchestration.
//!
//! This crate provides:
//! - The [`Pipeline`] sequencing extraction, transformation and loading
//! - Sequential and bounded-parallel batch runs with per-league deadlines
//! - Run results and a human-readable run summary

pub mod error;
pub mod formatter;
pub mod orchestrator;
pub mod summary;

pub use error::PipelineError;
pub use formatter::RunSummaryFormatter;
pub use orchestrator::Pipeline;
pub use summary::{EntityOutcome, EntityStatus, LeagueRunResult, PipelineRunResult, RecordCounts};
