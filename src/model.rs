use crate::error::{Result, StressError};
use std::time::Duration;

pub const DEFAULT_HOST: &str = "http://127.0.0.1:8082";
pub const ELEVATIONS_PATH: &str = "/v1/elevations";

#[derive(Clone, Debug)]
pub struct RunConfig {
    pub base_url: String,
    /// Value of the `Authorization` header, omitted when `None`.
    pub auth: Option<String>,
    pub workers: usize,
    pub requests_per_worker: usize,
    pub locations_per_request: usize,
    pub timeout: Option<Duration>,
    pub progress: bool,
}

impl RunConfig {
    pub fn new(
        base_url: impl Into<String>,
        workers: usize,
        requests_per_worker: usize,
        locations_per_request: usize,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            auth: None,
            workers,
            requests_per_worker,
            locations_per_request,
            timeout: None,
            progress: false,
        }
    }

    pub fn with_auth(mut self, auth: impl Into<String>) -> Self {
        let auth = auth.into();
        self.auth = if auth.is_empty() { None } else { Some(auth) };
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(StressError::InvalidConfig("host must not be empty".into()));
        }
        if self.workers == 0 {
            return Err(StressError::InvalidConfig("clients must be > 0".into()));
        }
        if self.requests_per_worker == 0 {
            return Err(StressError::InvalidConfig(
                "requests per client must be > 0".into(),
            ));
        }
        if self.locations_per_request == 0 {
            return Err(StressError::InvalidConfig(
                "locations per request must be > 0".into(),
            ));
        }
        if self.checked_target().is_none() {
            return Err(StressError::InvalidConfig(
                "total location count overflows".into(),
            ));
        }
        Ok(())
    }

    pub fn query_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), ELEVATIONS_PATH)
    }

    /// Requests the whole run issues: workers x requests per worker.
    pub fn total_requests(&self) -> u64 {
        self.workers as u64 * self.requests_per_worker as u64
    }

    /// Locations the whole run must send before it counts as complete.
    pub fn target(&self) -> u64 {
        self.checked_target().unwrap_or(u64::MAX)
    }

    fn checked_target(&self) -> Option<u64> {
        (self.workers as u64)
            .checked_mul(self.requests_per_worker as u64)?
            .checked_mul(self.locations_per_request as u64)
    }
}

/// What a worker reports to the aggregator after each request.
#[derive(Debug)]
pub enum Outcome {
    Success {
        locations: usize,
        elapsed: Duration,
        bytes: u64,
    },
    Failure {
        rank: usize,
        /// 1-based index of the failed request within the worker.
        request: usize,
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_is_product_of_counts() {
        let config = RunConfig::new(DEFAULT_HOST, 2, 3, 4);
        assert_eq!(config.target(), 24);
        assert_eq!(config.total_requests(), 6);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn query_url_joins_path() {
        let config = RunConfig::new("http://localhost:9000/", 1, 1, 1);
        assert_eq!(config.query_url(), "http://localhost:9000/v1/elevations");

        let config = RunConfig::new(DEFAULT_HOST, 1, 1, 1);
        assert_eq!(config.query_url(), "http://127.0.0.1:8082/v1/elevations");
    }

    #[test]
    fn empty_auth_is_omitted() {
        let config = RunConfig::new(DEFAULT_HOST, 1, 1, 1).with_auth("");
        assert!(config.auth.is_none());

        let config = RunConfig::new(DEFAULT_HOST, 1, 1, 1).with_auth("Bearer abc");
        assert_eq!(config.auth.as_deref(), Some("Bearer abc"));
    }

    #[test]
    fn zero_counts_are_rejected() {
        for config in [
            RunConfig::new(DEFAULT_HOST, 0, 1, 1),
            RunConfig::new(DEFAULT_HOST, 1, 0, 1),
            RunConfig::new(DEFAULT_HOST, 1, 1, 0),
            RunConfig::new("", 1, 1, 1),
        ] {
            assert!(matches!(
                config.validate(),
                Err(StressError::InvalidConfig(_))
            ));
        }
    }

    #[test]
    fn overflowing_target_is_rejected() {
        let config = RunConfig::new(DEFAULT_HOST, usize::MAX, usize::MAX, 2);
        assert!(config.validate().is_err());
    }
}
