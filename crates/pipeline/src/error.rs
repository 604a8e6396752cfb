use thiserror::Error;

/// Errors that stop one league's run before any provider is called.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[error("league not found: {0}")]
    LeagueNotFound(String),

    #[error("league {league} timed out after {secs}s")]
    Timeout { league: String, secs: u64 },
}
