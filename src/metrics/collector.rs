use std::time::Duration;

use tokio::{sync::mpsc, task::JoinHandle};

use super::{LatencyHistogram, RequestKind, RunHeader, RunSummary, Sample};

/// Running totals for one load run. Fed one `Sample` at a time by the
/// collector task.
#[derive(Debug)]
pub struct RunAggregate {
    histogram: Option<LatencyHistogram>,
    iterations_completed: u64,
    iterations_failed: u64,
    iteration_time_sum_ms: u128,
    total_requests: u64,
    page_requests: u64,
    script_requests: u64,
    failed_requests: u64,
    timeout_requests: u64,
    transport_errors: u64,
    response_bytes: u64,
    latency_sum_ms: u128,
    min_latency_ms: u64,
    max_latency_ms: u64,
}

impl Default for RunAggregate {
    fn default() -> Self {
        Self::new()
    }
}

impl RunAggregate {
    #[must_use]
    pub fn new() -> Self {
        let histogram = match LatencyHistogram::new() {
            Ok(histogram) => Some(histogram),
            Err(err) => {
                tracing::warn!("Latency percentiles disabled: {}", err);
                None
            }
        };
        Self {
            histogram,
            iterations_completed: 0,
            iterations_failed: 0,
            iteration_time_sum_ms: 0,
            total_requests: 0,
            page_requests: 0,
            script_requests: 0,
            failed_requests: 0,
            timeout_requests: 0,
            transport_errors: 0,
            response_bytes: 0,
            latency_sum_ms: 0,
            min_latency_ms: u64::MAX,
            max_latency_ms: 0,
        }
    }

    pub fn consume(&mut self, sample: &Sample) {
        match sample {
            Sample::Request(metric) => {
                let latency_ms = duration_ms(metric.response_time);
                self.total_requests = self.total_requests.saturating_add(1);
                match metric.kind {
                    RequestKind::Page => {
                        self.page_requests = self.page_requests.saturating_add(1);
                    }
                    RequestKind::Script => {
                        self.script_requests = self.script_requests.saturating_add(1);
                    }
                }
                if !metric.success() {
                    self.failed_requests = self.failed_requests.saturating_add(1);
                }
                if metric.timed_out {
                    self.timeout_requests = self.timeout_requests.saturating_add(1);
                }
                if metric.transport_error {
                    self.transport_errors = self.transport_errors.saturating_add(1);
                }
                self.response_bytes = self.response_bytes.saturating_add(metric.response_bytes);
                self.latency_sum_ms = self.latency_sum_ms.saturating_add(u128::from(latency_ms));
                self.min_latency_ms = self.min_latency_ms.min(latency_ms);
                self.max_latency_ms = self.max_latency_ms.max(latency_ms);
                if let Some(histogram) = self.histogram.as_mut() {
                    histogram.record(latency_ms);
                }
            }
            Sample::Iteration(metric) => {
                self.iterations_completed = self.iterations_completed.saturating_add(1);
                if metric.failed {
                    self.iterations_failed = self.iterations_failed.saturating_add(1);
                }
                self.iteration_time_sum_ms = self
                    .iteration_time_sum_ms
                    .saturating_add(u128::from(duration_ms(metric.duration)));
            }
        }
    }

    #[must_use]
    pub const fn total_requests(&self) -> u64 {
        self.total_requests
    }

    #[must_use]
    pub const fn iterations_completed(&self) -> u64 {
        self.iterations_completed
    }

    #[must_use]
    pub fn summarize(&self, header: RunHeader, elapsed: Duration, interrupted: bool) -> RunSummary {
        let (p50, p90, p99) = self
            .histogram
            .as_ref()
            .map_or((0, 0, 0), LatencyHistogram::percentiles);
        let min_latency_ms = if self.total_requests == 0 {
            0
        } else {
            self.min_latency_ms
        };
        let elapsed_ms = duration_ms(elapsed);
        RunSummary {
            scenario: header.scenario,
            executor: header.executor,
            base_url: header.base_url,
            started_at: header.started_at,
            duration_ms: elapsed_ms,
            interrupted,
            vus: header.vus,
            iterations_completed: self.iterations_completed,
            iterations_failed: self.iterations_failed,
            total_requests: self.total_requests,
            page_requests: self.page_requests,
            script_requests: self.script_requests,
            failed_requests: self.failed_requests,
            timeout_requests: self.timeout_requests,
            transport_errors: self.transport_errors,
            response_bytes: self.response_bytes,
            min_latency_ms,
            avg_latency_ms: average(self.latency_sum_ms, self.total_requests),
            max_latency_ms: self.max_latency_ms,
            p50_latency_ms: p50,
            p90_latency_ms: p90,
            p99_latency_ms: p99,
            avg_iteration_ms: average(self.iteration_time_sum_ms, self.iterations_completed),
            avg_rps: rate_per_second(self.total_requests, elapsed_ms),
        }
    }
}

/// Drains samples until every sender is dropped, then hands back the totals.
#[must_use]
pub fn setup_metrics_collector(mut metrics_rx: mpsc::Receiver<Sample>) -> JoinHandle<RunAggregate> {
    tokio::spawn(async move {
        let mut aggregate = RunAggregate::new();
        while let Some(sample) = metrics_rx.recv().await {
            aggregate.consume(&sample);
        }
        tracing::debug!(
            "Metrics collector finished after {} requests.",
            aggregate.total_requests()
        );
        aggregate
    })
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn rate_per_second(count: u64, elapsed_ms: u64) -> f64 {
    if elapsed_ms == 0 {
        return 0.0;
    }
    count as f64 * 1000.0 / elapsed_ms as f64
}

fn average(sum: u128, count: u64) -> u64 {
    let avg = sum.checked_div(u128::from(count)).unwrap_or(0);
    u64::try_from(avg).unwrap_or(u64::MAX)
}
