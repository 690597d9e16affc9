use crate::error::{Result, StressError};
use crate::geo::Batch;
use crate::model::{Outcome, RunConfig};
use futures::StreamExt;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

const ERROR_DETAIL_LIMIT: usize = 256;

/// Runs `requests_per_worker` sequential queries, reporting each one.
///
/// Stops at the first failed query. Returns early with `ChannelClosed` if the
/// aggregator has already finished.
pub async fn worker(
    rank: usize,
    client: reqwest::Client,
    url: Arc<str>,
    config: Arc<RunConfig>,
    tx: mpsc::Sender<Outcome>,
) -> Result<()> {
    let mut rng = SmallRng::from_entropy();

    for ite in 0..config.requests_per_worker {
        let batch = Batch::random(&mut rng, config.locations_per_request);

        let outcome = match query(&client, &url, config.auth.as_deref(), &batch).await {
            Ok(stats) => Outcome::Success {
                locations: batch.len(),
                elapsed: stats.elapsed,
                bytes: stats.bytes,
            },
            Err(e) => {
                tracing::warn!(rank, "Failed to query for request #{}: {}", ite + 1, e);
                tx.send(Outcome::Failure {
                    rank,
                    request: ite + 1,
                    reason: e.to_string(),
                })
                .await
                .map_err(|_| StressError::ChannelClosed)?;
                return Ok(());
            }
        };

        tx.send(outcome)
            .await
            .map_err(|_| StressError::ChannelClosed)?;
    }

    Ok(())
}

#[derive(Debug, Clone, Copy)]
pub struct QueryStats {
    pub elapsed: Duration,
    pub bytes: u64,
}

/// Sends one batch and reads the whole response.
///
/// Anything but 200 is a failure, described by its status line and the start of its body.
pub async fn query(
    client: &reqwest::Client,
    url: &str,
    auth: Option<&str>,
    batch: &Batch,
) -> Result<QueryStats> {
    let body = batch.to_body()?;

    let mut builder = client
        .post(url)
        .header(CONTENT_TYPE, "application/json")
        .body(body);
    if let Some(auth) = auth {
        builder = builder.header(AUTHORIZATION, auth);
    }
    let request = builder.build().map_err(StressError::Build)?;

    let begin = Instant::now();
    let response = client
        .execute(request)
        .await
        .map_err(StressError::Transport)?;
    let status = response.status();

    let mut stream = response.bytes_stream();
    let mut bytes = 0u64;
    let mut head = Vec::new();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(StressError::Transport)?;
        bytes += chunk.len() as u64;
        if status != StatusCode::OK && head.len() < ERROR_DETAIL_LIMIT {
            let take = (ERROR_DETAIL_LIMIT - head.len()).min(chunk.len());
            head.extend_from_slice(&chunk[..take]);
        }
    }
    let elapsed = begin.elapsed();

    if status != StatusCode::OK {
        let detail = String::from_utf8_lossy(&head).trim().to_string();
        return Err(StressError::Status {
            status,
            detail: (!detail.is_empty()).then_some(detail),
        });
    }

    Ok(QueryStats { elapsed, bytes })
}
