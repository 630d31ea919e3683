use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("Invalid range: end {end} is before start {start}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("Invalid argument '{name}': {reason}")]
    InvalidArgument { name: &'static str, reason: String },

    #[error("Fact source error: {0}")]
    Upstream(#[from] rusqlite::Error),

    #[error("Fact source unavailable: {reason}")]
    UpstreamUnavailable { reason: String },

    #[error("Query cancelled by caller")]
    Cancelled,

    #[error("Query deadline exceeded")]
    DeadlineExceeded,

    #[error("Arithmetic overflow while computing {what}")]
    Overflow { what: &'static str },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AnalyticsError {
    /// True when the failure came from the fact source rather than from
    /// the caller's parameters. Callers own any retry decision.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            AnalyticsError::Upstream(_)
                | AnalyticsError::UpstreamUnavailable { .. }
                | AnalyticsError::DeadlineExceeded
        )
    }
}

pub type AnalyticsResult<T> = Result<T, AnalyticsError>;
