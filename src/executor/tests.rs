use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use super::*;
use crate::error::{AppError, AppResult};
use crate::http::{HttpSettings, ScriptExtractor, build_client};
use crate::metrics::{RunAggregate, Sample, setup_metrics_collector};
use crate::shutdown::shutdown_channel;
use crate::test_support::{FixtureServer, Route};

fn run_async_test<F>(future: F) -> AppResult<()>
where
    F: Future<Output = AppResult<()>>,
{
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()?;
    runtime.block_on(future)
}

fn spec(executor: ExecutorKind, vus: usize, iterations: u64, base_url: &str) -> ScenarioSpec {
    ScenarioSpec {
        name: "frontpage".to_owned(),
        executor,
        vus,
        iterations,
        max_duration: Duration::from_secs(30),
        graceful_stop: Duration::ZERO,
        base_url: base_url.to_owned(),
    }
}

async fn run_against(spec: &ScenarioSpec) -> AppResult<(ExecutionOutcome, RunAggregate)> {
    let settings = HttpSettings {
        request_timeout: Duration::from_secs(5),
        connect_timeout: Duration::from_secs(1),
        headers: Vec::new(),
        no_ua: false,
        authorized: false,
        insecure: false,
    };
    let (metrics_tx, metrics_rx) = mpsc::channel::<Sample>(256);
    let collector = setup_metrics_collector(metrics_rx);
    let context = IterationContext {
        client: build_client(&settings)?,
        base_url: Arc::from(spec.base_url.as_str()),
        extractor: Arc::new(ScriptExtractor::new()?),
        metrics_tx,
    };
    let (shutdown_tx, _) = shutdown_channel();
    let outcome = run_scenario(spec, context, &shutdown_tx).await?;
    let aggregate = collector.await?;
    Ok((outcome, aggregate))
}

#[test]
fn effective_vus_caps_shared_pool() -> Result<(), String> {
    let shared = spec(ExecutorKind::SharedIterations, 1000, 10, "http://x");
    if shared.effective_vus() != 10 {
        return Err(format!("Unexpected VUs {}", shared.effective_vus()));
    }
    let per_vu = spec(ExecutorKind::PerVuIterations, 1000, 10, "http://x");
    if per_vu.effective_vus() != 1000 {
        return Err(format!("Unexpected VUs {}", per_vu.effective_vus()));
    }
    Ok(())
}

#[test]
fn shared_iterations_run_exactly_the_pool() -> AppResult<()> {
    run_async_test(async {
        let server = FixtureServer::frontpage().map_err(AppError::validation)?;
        let spec = spec(ExecutorKind::SharedIterations, 4, 10, &server.url);

        let (outcome, aggregate) = run_against(&spec).await?;

        if outcome.interrupted || outcome.hit_max_duration {
            return Err(AppError::validation(format!("Unexpected outcome {:?}", outcome)));
        }
        if aggregate.iterations_completed() != 10 || aggregate.total_requests() != 30 {
            return Err(AppError::validation(format!(
                "Unexpected totals: {} iterations, {} requests",
                aggregate.iterations_completed(),
                aggregate.total_requests()
            )));
        }
        let pages = server
            .requests()
            .map_err(AppError::validation)?
            .iter()
            .filter(|path| path.as_str() == "/")
            .count();
        if pages != 10 {
            return Err(AppError::validation(format!("Expected 10 page hits, got {}", pages)));
        }
        Ok(())
    })
}

#[test]
fn per_vu_iterations_multiply_by_vus() -> AppResult<()> {
    run_async_test(async {
        let server = FixtureServer::start(vec![("/", Route::ok("<p>no scripts</p>"))], Duration::ZERO)
            .map_err(AppError::validation)?;
        let spec = spec(ExecutorKind::PerVuIterations, 3, 2, &server.url);

        let (_, aggregate) = run_against(&spec).await?;

        if aggregate.iterations_completed() != 6 || aggregate.total_requests() != 6 {
            return Err(AppError::validation(format!(
                "Unexpected totals: {} iterations, {} requests",
                aggregate.iterations_completed(),
                aggregate.total_requests()
            )));
        }
        Ok(())
    })
}

#[test]
fn max_duration_interrupts_slow_run() -> AppResult<()> {
    run_async_test(async {
        let server = FixtureServer::start(
            vec![("/", Route::ok("<p>slow</p>"))],
            Duration::from_millis(200),
        )
        .map_err(AppError::validation)?;
        let mut spec = spec(ExecutorKind::SharedIterations, 2, 1_000, &server.url);
        spec.max_duration = Duration::from_millis(300);

        let (outcome, aggregate) = run_against(&spec).await?;

        if !outcome.interrupted || !outcome.hit_max_duration {
            return Err(AppError::validation(format!("Unexpected outcome {:?}", outcome)));
        }
        if aggregate.iterations_completed() >= 1_000 {
            return Err(AppError::validation("Run was not cut short"));
        }
        Ok(())
    })
}

#[test]
fn graceful_stop_lets_in_flight_iterations_finish() -> AppResult<()> {
    run_async_test(async {
        let server = FixtureServer::start(
            vec![("/", Route::ok("<p>slow</p>"))],
            Duration::from_millis(300),
        )
        .map_err(AppError::validation)?;
        let mut spec = spec(ExecutorKind::SharedIterations, 2, 1_000, &server.url);
        spec.max_duration = Duration::from_millis(100);
        spec.graceful_stop = Duration::from_secs(5);

        let (outcome, aggregate) = run_against(&spec).await?;

        if !outcome.interrupted || !outcome.hit_max_duration {
            return Err(AppError::validation(format!("Unexpected outcome {:?}", outcome)));
        }
        if aggregate.iterations_completed() != 2 {
            return Err(AppError::validation(format!(
                "Expected both in-flight iterations to finish, got {}",
                aggregate.iterations_completed()
            )));
        }
        Ok(())
    })
}

#[test]
fn zero_graceful_stop_abandons_in_flight_iterations() -> AppResult<()> {
    run_async_test(async {
        let server = FixtureServer::start(
            vec![("/", Route::ok("<p>slow</p>"))],
            Duration::from_millis(500),
        )
        .map_err(AppError::validation)?;
        let mut spec = spec(ExecutorKind::SharedIterations, 2, 1_000, &server.url);
        spec.max_duration = Duration::from_millis(100);

        let (outcome, aggregate) = run_against(&spec).await?;

        if !outcome.interrupted || aggregate.iterations_completed() != 0 {
            return Err(AppError::validation(format!(
                "Unexpected outcome {:?} with {} iterations",
                outcome,
                aggregate.iterations_completed()
            )));
        }
        Ok(())
    })
}

#[test]
fn broadcast_shutdown_stops_vus() -> AppResult<()> {
    run_async_test(async {
        let server = FixtureServer::start(
            vec![("/", Route::ok("<p>slow</p>"))],
            Duration::from_millis(100),
        )
        .map_err(AppError::validation)?;
        let spec = spec(ExecutorKind::PerVuIterations, 2, 1_000, &server.url);
        let settings = HttpSettings {
            request_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(1),
            headers: Vec::new(),
            no_ua: false,
            authorized: false,
            insecure: false,
        };
        let (metrics_tx, _metrics_rx) = mpsc::channel::<Sample>(4_096);
        let context = IterationContext {
            client: build_client(&settings)?,
            base_url: Arc::from(spec.base_url.as_str()),
            extractor: Arc::new(ScriptExtractor::new()?),
            metrics_tx,
        };
        let (shutdown_tx, _) = shutdown_channel();
        let trigger = shutdown_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(250)).await;
            drop(trigger.send(()));
        });

        let outcome = tokio::time::timeout(
            Duration::from_secs(5),
            run_scenario(&spec, context, &shutdown_tx),
        )
        .await
        .map_err(|_elapsed| AppError::validation("Shutdown did not stop the run"))??;

        if !outcome.interrupted || outcome.hit_max_duration {
            return Err(AppError::validation(format!("Unexpected outcome {:?}", outcome)));
        }
        Ok(())
    })
}
