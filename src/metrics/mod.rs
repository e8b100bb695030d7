//! Request/iteration samples, aggregation, and latency histograms.
mod collector;
mod histogram;
mod types;


pub use collector::{RunAggregate, setup_metrics_collector};
pub use histogram::LatencyHistogram;
pub use types::{IterationMetric, RequestKind, RequestMetric, RunHeader, RunSummary, Sample};
