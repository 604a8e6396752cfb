//! Quality-scored transformation of raw provider rows.
//!
//! Each provider's rows are read through a typed [`ProviderAdapter`] into
//! drafts, then validated, null-filled, checked for inconsistencies and
//! graded. Nothing here performs I/O.

pub mod adapter;
pub mod field;
pub mod matches;
pub mod providers;
pub mod standings;
mod tally;
pub mod teams;
pub mod transformer;

pub use adapter::{AdapterTable, MatchDraft, PlayerDraft, ProviderAdapter, StandingDraft, TeamDraft};
pub use matches::transform_matches;
pub use providers::{ApiFootballAdapter, FootballDataAdapter, TheSportsDbAdapter};
pub use standings::transform_standings;
pub use teams::{transform_squad, transform_teams};
pub use transformer::Transformer;
