//! Core types for the sports data ETL pipeline.
//!
//! This crate provides:
//! - The immutable league registry and season inference
//! - Provider identities and per-need fallback priorities
//! - Canonical standing, match, team and player records
//! - Transformation results and quality grading
//! - Layered application configuration

pub mod config;
pub mod config_loader;
pub mod league;
pub mod models;
pub mod provider;
pub mod registry;

pub use config::{
    AppConfig, ConsistencyPolicy, DataConfig, DatabaseConfig, PipelineConfig, ProviderConfig,
    ProvidersConfig,
};
pub use config_loader::ConfigLoader;
pub use league::{LeagueDescriptor, ProviderIds, Season, Tier};
pub use models::{
    MatchRecord, MatchResult, MatchSide, MatchStatus, PlayerRecord, QualityGrade, Score, Stadium,
    StandingMetrics, StandingRecord, TeamRecord, TeamRef, TransformSummary, TransformationResult,
};
pub use provider::{DataNeed, ProviderId};
pub use registry::LeagueRegistry;
