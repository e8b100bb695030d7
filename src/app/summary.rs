use std::io::Write;

use crate::{args::OutputFormat, error::AppResult, metrics::RunSummary};

pub(crate) struct SummaryStats {
    pub(crate) iteration_success_x100: u64,
}

pub(crate) fn compute_summary_stats(summary: &RunSummary) -> SummaryStats {
    let iterations = summary.iterations_completed;
    let passed = iterations.saturating_sub(summary.iterations_failed);

    let iteration_success_x100 = if iterations > 0 {
        let scaled = u128::from(passed)
            .saturating_mul(10_000)
            .checked_div(u128::from(iterations))
            .unwrap_or(0);
        u64::try_from(scaled).unwrap_or(u64::MAX)
    } else {
        0
    };

    SummaryStats {
        iteration_success_x100,
    }
}

/// Writes the end-of-run summary in the requested format.
///
/// # Errors
///
/// Returns an error when the writer fails or JSON encoding fails.
pub(crate) fn write_summary<W: Write>(
    out: &mut W,
    summary: &RunSummary,
    format: OutputFormat,
) -> AppResult<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, summary)?;
            writeln!(out)?;
        }
        OutputFormat::Text => write_text_summary(out, summary)?,
    }
    out.flush()?;
    Ok(())
}

fn write_text_summary<W: Write>(out: &mut W, summary: &RunSummary) -> std::io::Result<()> {
    let stats = compute_summary_stats(summary);

    writeln!(
        out,
        "Scenario: {} ({}, {} VUs)",
        summary.scenario, summary.executor, summary.vus
    )?;
    writeln!(out, "Target: {}", summary.base_url)?;
    writeln!(out, "Started: {}", summary.started_at)?;
    writeln!(
        out,
        "Duration: {}.{:03}s",
        summary.duration_ms / 1000,
        summary.duration_ms % 1000
    )?;
    writeln!(
        out,
        "Iterations: {} ({}.{:02}% passed, {} failed)",
        summary.iterations_completed,
        stats.iteration_success_x100 / 100,
        stats.iteration_success_x100 % 100,
        summary.iterations_failed
    )?;
    writeln!(
        out,
        "Requests: {} (page: {}, script: {})",
        summary.total_requests, summary.page_requests, summary.script_requests
    )?;
    writeln!(out, "Failed Requests: {}", summary.failed_requests)?;
    writeln!(out, "Timeouts: {}", summary.timeout_requests)?;
    writeln!(out, "Transport Errors: {}", summary.transport_errors)?;
    writeln!(out, "Data Received: {} bytes", summary.response_bytes)?;
    writeln!(
        out,
        "Min/Avg/Max Latency: {}ms / {}ms / {}ms",
        summary.min_latency_ms, summary.avg_latency_ms, summary.max_latency_ms
    )?;
    writeln!(
        out,
        "P50/P90/P99 Latency: {}ms / {}ms / {}ms",
        summary.p50_latency_ms, summary.p90_latency_ms, summary.p99_latency_ms
    )?;
    writeln!(out, "Avg Iteration: {}ms", summary.avg_iteration_ms)?;
    writeln!(out, "Avg RPS: {:.2}", summary.avg_rps)?;
    if summary.interrupted {
        writeln!(out, "Run interrupted before all iterations finished.")?;
    }
    Ok(())
}
