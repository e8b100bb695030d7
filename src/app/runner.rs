use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::{
    args::RunArgs,
    error::{AppError, AppResult, ValidationError},
    executor::{ScenarioSpec, run_scenario},
    http::{HttpSettings, IterationContext, ScriptExtractor, build_client, validate_base_url},
    metrics::{RunHeader, RunSummary, Sample, setup_metrics_collector},
    shutdown::{setup_signal_shutdown_handler, shutdown_channel},
};

/// Bounded so slow aggregation applies backpressure to the VUs instead of
/// growing memory.
const METRICS_CHANNEL_CAPACITY: usize = 10_000;

/// Runs one load scenario end to end and returns its summary.
///
/// # Errors
///
/// Returns an error when the base URL or client settings are invalid, or
/// when a VU/collector task fails.
pub(crate) async fn run_load(args: &RunArgs, scenario_name: String) -> AppResult<RunSummary> {
    if args.base_url.trim().is_empty() {
        return Err(AppError::validation(ValidationError::MissingBaseUrl));
    }
    validate_base_url(&args.base_url)?;
    let client = build_client(&HttpSettings::from(args))?;
    let extractor = Arc::new(ScriptExtractor::new().map_err(AppError::http)?);
    let spec = ScenarioSpec::from_args(scenario_name, args);

    let (shutdown_tx, _) = shutdown_channel();
    let (metrics_tx, metrics_rx) = mpsc::channel::<Sample>(METRICS_CHANNEL_CAPACITY);
    let collector_handle = setup_metrics_collector(metrics_rx);
    let signal_handle = setup_signal_shutdown_handler(&shutdown_tx);

    let header = RunHeader {
        scenario: spec.name.clone(),
        executor: spec.executor.as_str().to_owned(),
        base_url: spec.base_url.clone(),
        started_at: chrono::Utc::now().to_rfc3339(),
        vus: spec.effective_vus(),
    };
    let context = IterationContext {
        client,
        base_url: Arc::from(spec.base_url.as_str()),
        extractor,
        metrics_tx,
    };

    let run_start = Instant::now();
    let outcome = run_scenario(&spec, context, &shutdown_tx).await?;
    let elapsed = run_start.elapsed();

    signal_handle.await?;
    let aggregate = collector_handle.await?;
    tracing::debug!(
        "Run finished: {} iterations, {} requests.",
        aggregate.iterations_completed(),
        aggregate.total_requests()
    );

    Ok(aggregate.summarize(header, elapsed, outcome.interrupted))
}
