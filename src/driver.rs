use crate::aggregator::Aggregator;
use crate::error::{Result, StressError};
use crate::model::{Outcome, RunConfig};
use crate::report::Summary;
use crate::worker::worker;
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::task::JoinSet;

/// Fans requests out over `workers` tasks and folds their outcomes.
pub struct LoadDriver {
    client: reqwest::Client,
    config: Arc<RunConfig>,
}

impl LoadDriver {
    pub fn new(config: RunConfig) -> Result<Self> {
        config.validate()?;

        let mut builder = reqwest::Client::builder().pool_max_idle_per_host(config.workers);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(StressError::Client)?;

        Ok(Self {
            client,
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Runs until every worker's requests succeed or any one fails.
    ///
    /// On failure the returned error is `Aborted`, and workers still in flight
    /// are cancelled rather than drained.
    pub async fn run(&self) -> Result<Summary> {
        let config = &self.config;
        let url: Arc<str> = Arc::from(config.query_url());

        tracing::info!("Testing: {}", config.base_url);
        tracing::info!("Number of clients: {}", config.workers);
        tracing::info!("Requests per client: {}", config.requests_per_worker);
        tracing::info!("Locations per request: {}", config.locations_per_request);

        let mut aggregator = Aggregator::new(config.target())?;
        if config.progress {
            aggregator = aggregator.with_progress();
        }

        let (tx, mut rx) = mpsc::channel::<Outcome>(config.workers.saturating_mul(2));

        let started_at = Utc::now();
        let begin = Instant::now();

        let mut set = JoinSet::new();
        for rank in 0..config.workers {
            set.spawn(worker(
                rank,
                self.client.clone(),
                url.clone(),
                config.clone(),
                tx.clone(),
            ));
        }

        drop(tx);

        // dropping `set` on the error path aborts the remaining workers
        let totals = aggregator.run(&mut rx).await?;
        let elapsed = begin.elapsed();

        while let Some(res) = set.join_next().await {
            if let Ok(Err(e)) = res {
                tracing::debug!("worker ended after completion: {}", e);
            }
        }

        Ok(Summary::new(
            url.to_string(),
            config.workers,
            config.total_requests(),
            started_at,
            elapsed,
            &totals,
        ))
    }
}
