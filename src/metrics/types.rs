use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestKind {
    Page,
    Script,
}

#[derive(Clone, Copy, Debug)]
pub struct RequestMetric {
    pub kind: RequestKind,
    pub start: Instant,
    pub response_time: Duration,
    /// 0 when no response arrived.
    pub status_code: u16,
    pub timed_out: bool,
    pub transport_error: bool,
    pub response_bytes: u64,
}

impl RequestMetric {
    #[must_use]
    pub fn success(&self) -> bool {
        !self.timed_out && !self.transport_error && (200..300).contains(&self.status_code)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct IterationMetric {
    pub vu: usize,
    pub duration: Duration,
    pub requests: u64,
    pub failed: bool,
}

#[derive(Clone, Copy, Debug)]
pub enum Sample {
    Request(RequestMetric),
    Iteration(IterationMetric),
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub scenario: String,
    pub executor: String,
    pub base_url: String,
    pub started_at: String,
    pub duration_ms: u64,
    pub interrupted: bool,
    pub vus: usize,
    pub iterations_completed: u64,
    pub iterations_failed: u64,
    pub total_requests: u64,
    pub page_requests: u64,
    pub script_requests: u64,
    pub failed_requests: u64,
    pub timeout_requests: u64,
    pub transport_errors: u64,
    pub response_bytes: u64,
    pub min_latency_ms: u64,
    pub avg_latency_ms: u64,
    pub max_latency_ms: u64,
    pub p50_latency_ms: u64,
    pub p90_latency_ms: u64,
    pub p99_latency_ms: u64,
    pub avg_iteration_ms: u64,
    pub avg_rps: f64,
}

/// Run facts that do not come from samples.
#[derive(Debug, Clone)]
pub struct RunHeader {
    pub scenario: String,
    pub executor: String,
    pub base_url: String,
    pub started_at: String,
    pub vus: usize,
}
