use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T, E = StressError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum StressError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("failed to build request: {0}")]
    Build(#[source] reqwest::Error),

    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// Non-200 response. Displays as the status line, e.g. `500 Internal Server Error`.
    #[error("{status}{}", suffix(.detail))]
    Status {
        status: StatusCode,
        detail: Option<String>,
    },

    #[error("failed to serialize batch: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to create latency histogram: {0}")]
    Histogram(#[from] hdrhistogram::CreationError),

    #[error("aggregator is gone")]
    ChannelClosed,

    #[error("all workers stopped at {completed} of {target} locations")]
    Incomplete { completed: u64, target: u64 },

    #[error("aborted at {completed} queries: {reason}")]
    Aborted { completed: u64, reason: String },
}

fn suffix(detail: &Option<String>) -> String {
    detail.as_deref().map(|d| format!(": {d}")).unwrap_or_default()
}

impl StressError {
    /// Successful location count reached before the run ended, if it ended early.
    pub fn completed(&self) -> Option<u64> {
        match self {
            StressError::Aborted { completed, .. } | StressError::Incomplete { completed, .. } => {
                Some(*completed)
            }
            _ => None,
        }
    }
}
