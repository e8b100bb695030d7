use std::sync::Arc;

use reqwest::Client;
use tokio::{sync::mpsc, time::Instant};

use crate::metrics::{IterationMetric, RequestKind, RequestMetric, Sample};

use super::execution::fetch;
use super::page::{ScriptExtractor, resolve_script_url};

/// Everything a virtual user needs to run iterations. Cheap to clone: the
/// client pool, base URL, and extractor are shared.
#[derive(Clone)]
pub struct IterationContext {
    pub client: Client,
    pub base_url: Arc<str>,
    pub extractor: Arc<ScriptExtractor>,
    pub metrics_tx: mpsc::Sender<Sample>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IterationReport {
    /// URLs requested, in order: the page first, then each script.
    pub requested: Vec<String>,
    pub failed: bool,
}

/// Fetches the front page, then every `<script src>` it references.
///
/// There is no retry. A transport failure on the page ends the iteration
/// before any script is fetched; any other failed fetch marks the iteration
/// failed but the remaining scripts are still requested.
pub async fn run_frontpage_iteration(context: &IterationContext, vu: usize) -> IterationReport {
    let started = Instant::now();
    let base_url: &str = &context.base_url;
    let mut report = IterationReport::default();

    let page = fetch(&context.client, base_url, RequestKind::Page).await;
    report.requested.push(base_url.to_owned());
    let page_metric = page.metric;
    record(context, page_metric).await;

    if let Some(body) = page.body {
        report.failed = !page_metric.success();
        for src in context.extractor.script_sources(&body) {
            let url = resolve_script_url(base_url, &src);
            let script = fetch(&context.client, &url, RequestKind::Script).await;
            if !script.metric.success() {
                tracing::debug!(
                    "VU {} script {} failed with status {}.",
                    vu,
                    url,
                    script.metric.status_code
                );
                report.failed = true;
            }
            record(context, script.metric).await;
            report.requested.push(url);
        }
    } else {
        report.failed = true;
    }

    let iteration = IterationMetric {
        vu,
        duration: started.elapsed(),
        requests: u64::try_from(report.requested.len()).unwrap_or(u64::MAX),
        failed: report.failed,
    };
    if context
        .metrics_tx
        .send(Sample::Iteration(iteration))
        .await
        .is_err()
    {
        tracing::trace!("Metrics receiver closed; dropping iteration sample.");
    }
    report
}

async fn record(context: &IterationContext, metric: RequestMetric) {
    if context
        .metrics_tx
        .send(Sample::Request(metric))
        .await
        .is_err()
    {
        tracing::trace!("Metrics receiver closed; dropping request sample.");
    }
}
