//! Canonical records produced by the transformer.
//!
//! These shapes are provider-independent; every sink and reader speaks them.

pub mod fixture;
pub mod quality;
pub mod standing;
pub mod team;

pub use fixture::{MatchRecord, MatchResult, MatchSide, MatchStatus, Score};
pub use quality::{QualityGrade, TransformSummary, TransformationResult};
pub use standing::{StandingMetrics, StandingRecord, TeamRef};
pub use team::{PlayerRecord, Stadium, TeamRecord};
