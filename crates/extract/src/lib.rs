//! Extraction layer for the sports data ETL pipeline.
//!
//! - [`ExtractionGateway`]: rate-limited HTTP access to every provider
//! - [`FallbackResolver`]: priority-ordered provider fallback per data need
//! - [`endpoints`]: per-provider request and envelope bindings
//!
//! # Example
//!
//! ```ignore
//! use sports_etl_core::{AppConfig, DataNeed, LeagueRegistry};
//! use sports_etl_extract::{ExtractionGateway, FallbackResolver};
//! use std::sync::Arc;
//!
//! let config = AppConfig::default();
//! let gateway = Arc::new(ExtractionGateway::new(&config.providers)?);
//! let resolver = FallbackResolver::new(gateway);
//!
//! let registry = LeagueRegistry::builtin();
//! let league = registry.get("premier_league").unwrap();
//! if let Some(resolution) = resolver
//!     .resolve(DataNeed::Standings, league, league.current_season())
//!     .await
//! {
//!     println!("{} rows from {}", resolution.batch.len(), resolution.provider);
//! }
//! ```

pub mod endpoints;
pub mod error;
pub mod fallback;
pub mod gateway;
pub mod operation;
pub mod raw;
pub mod throttle;

pub use error::{ExtractionFailure, FailureKind};
pub use fallback::{Attempt, AttemptOutcome, FallbackResolver, Resolution};
pub use gateway::{ExtractionGateway, Extractor, GatewayStats, ProviderCounters};
pub use operation::{FetchParams, Operation, StatusFilter};
pub use raw::RawBatch;
pub use throttle::ProviderThrottle;
