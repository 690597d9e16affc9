//! Final run statistics.

use crate::aggregator::RunTotals;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub url: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub clients: usize,
    pub requests: u64,
    pub locations: u64,
    pub bytes_received: u64,
    pub elapsed_secs: f64,
    /// Cumulative round-trip time divided by the request count.
    pub avg_rtt_ms: f64,
    /// Locations per second of wall-clock time.
    pub throughput: f64,
    pub latency_min_ms: f64,
    pub latency_p50_ms: f64,
    pub latency_p90_ms: f64,
    pub latency_p99_ms: f64,
    pub latency_max_ms: f64,
}

impl Summary {
    pub fn new(
        url: String,
        clients: usize,
        requests: u64,
        started_at: DateTime<Utc>,
        elapsed: Duration,
        totals: &RunTotals,
    ) -> Self {
        let elapsed_secs = elapsed.as_secs_f64();
        let avg_rtt_ms = if requests > 0 {
            totals.elapsed.as_secs_f64() * 1000.0 / requests as f64
        } else {
            0.0
        };
        let throughput = if elapsed_secs > 0.0 {
            totals.locations as f64 / elapsed_secs
        } else {
            0.0
        };
        let ms = |us: u64| us as f64 / 1000.0;

        Self {
            url,
            started_at,
            finished_at: Utc::now(),
            clients,
            requests,
            locations: totals.locations,
            bytes_received: totals.bytes,
            elapsed_secs,
            avg_rtt_ms,
            throughput,
            latency_min_ms: ms(totals.latency.min()),
            latency_p50_ms: ms(totals.latency.value_at_quantile(0.50)),
            latency_p90_ms: ms(totals.latency.value_at_quantile(0.90)),
            latency_p99_ms: ms(totals.latency.value_at_quantile(0.99)),
            latency_max_ms: ms(totals.latency.max()),
        }
    }

    pub fn log(&self) {
        tracing::info!(
            "Finished {} elevation queries by {} requests.",
            self.locations,
            self.requests
        );
        tracing::info!("Time elapsed: {:.3}s", self.elapsed_secs);
        tracing::info!("Average RTT per request: {:.3}ms", self.avg_rtt_ms);
        tracing::info!("Average throughput: {:.0} elevations/sec", self.throughput);
        tracing::info!(
            "Latency (ms) min/p50/p90/p99/max: {:.1} / {:.1} / {:.1} / {:.1} / {:.1}",
            self.latency_min_ms,
            self.latency_p50_ms,
            self.latency_p90_ms,
            self.latency_p99_ms,
            self.latency_max_ms
        );
        tracing::info!("Received {} bytes", self.bytes_received);
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
