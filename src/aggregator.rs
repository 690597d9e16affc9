use crate::error::{Result, StressError};
use crate::model::Outcome;
use hdrhistogram::Histogram;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tokio::sync::mpsc;

/// Accumulated results of successful requests.
#[derive(Debug)]
pub struct RunTotals {
    pub locations: u64,
    pub requests: u64,
    pub elapsed: Duration,
    pub bytes: u64,
    /// Round-trip times in microseconds.
    pub latency: Histogram<u64>,
}

impl RunTotals {
    pub fn new() -> Result<Self> {
        Ok(Self {
            locations: 0,
            requests: 0,
            elapsed: Duration::ZERO,
            bytes: 0,
            latency: Histogram::new(3)?,
        })
    }

    pub(crate) fn record(&mut self, locations: usize, elapsed: Duration, bytes: u64) {
        self.locations += locations as u64;
        self.requests += 1;
        self.elapsed += elapsed;
        self.bytes += bytes;
        // `record` grows the histogram; out-of-range values are dropped
        self.latency
            .record(elapsed.as_micros().min(u64::MAX as u128) as u64)
            .ok();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    Continue,
    Complete,
}

/// Sole consumer of worker outcomes. Ends the run when the target location
/// count is reached or on the first failure.
pub struct Aggregator {
    target: u64,
    totals: RunTotals,
    pb: ProgressBar,
}

impl Aggregator {
    pub fn new(target: u64) -> Result<Self> {
        Ok(Self {
            target,
            totals: RunTotals::new()?,
            pb: ProgressBar::hidden(),
        })
    }

    /// Shows a bar over the target location count on stderr.
    pub fn with_progress(mut self) -> Self {
        let pb = ProgressBar::new(self.target);
        if let Ok(sty) =
            ProgressStyle::with_template("{spinner} [{elapsed_precise}] {bar:40} {pos}/{len} {per_sec}")
        {
            pb.set_style(sty);
        }
        self.pb = pb;
        self
    }

    pub fn target(&self) -> u64 {
        self.target
    }

    pub fn totals(&self) -> &RunTotals {
        &self.totals
    }

    /// Folds one outcome into the totals.
    pub fn observe(&mut self, outcome: Outcome) -> Result<Progress> {
        match outcome {
            Outcome::Success {
                locations,
                elapsed,
                bytes,
            } => {
                self.totals.record(locations, elapsed, bytes);
                self.pb.inc(locations as u64);
                if self.totals.locations >= self.target {
                    self.pb.finish();
                    Ok(Progress::Complete)
                } else {
                    Ok(Progress::Continue)
                }
            }
            Outcome::Failure {
                rank,
                request,
                reason,
            } => {
                self.pb.abandon();
                tracing::error!(
                    rank,
                    request,
                    "Aborted at {} queries: {}",
                    self.totals.locations,
                    reason
                );
                Err(StressError::Aborted {
                    completed: self.totals.locations,
                    reason,
                })
            }
        }
    }

    /// Receives until the run completes or fails.
    pub async fn run(mut self, rx: &mut mpsc::Receiver<Outcome>) -> Result<RunTotals> {
        while let Some(outcome) = rx.recv().await {
            if self.observe(outcome)? == Progress::Complete {
                return Ok(self.totals);
            }
        }
        self.pb.abandon();
        Err(StressError::Incomplete {
            completed: self.totals.locations,
            target: self.target,
        })
    }
}
