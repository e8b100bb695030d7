//! Virtual-user scheduling.
//!
//! A run spawns one task per virtual user (VU). VUs share nothing but the
//! HTTP client pool, the metrics channel, and, for `shared-iterations`, the
//! iteration pool. Each VU loops: claim an iteration, run it, repeat until
//! its budget is spent or a shutdown is broadcast. A timer task broadcasts
//! the shutdown when `max_duration` elapses.
//!
//! A shutdown only stops VUs from claiming more work. Iterations already in
//! flight get `graceful_stop` to finish before they are abandoned.
mod pool;

#[cfg(test)]
mod tests;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast::error::TryRecvError;

use crate::{
    args::{ExecutorKind, RunArgs},
    error::AppResult,
    http::{IterationContext, run_frontpage_iteration},
    shutdown::{ShutdownReceiver, ShutdownSender, shutdown_channel},
};

use pool::IterationPool;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioSpec {
    pub name: String,
    pub executor: ExecutorKind,
    pub vus: usize,
    pub iterations: u64,
    pub max_duration: Duration,
    pub graceful_stop: Duration,
    pub base_url: String,
}

impl ScenarioSpec {
    #[must_use]
    pub fn from_args(name: String, args: &RunArgs) -> Self {
        Self {
            name,
            executor: args.executor,
            vus: args.vus.get(),
            iterations: args.iterations.get(),
            max_duration: args.max_duration,
            graceful_stop: args.graceful_stop,
            base_url: args.base_url.clone(),
        }
    }

    /// VUs actually started. A shared pool never gets more VUs than it has
    /// iterations.
    #[must_use]
    pub fn effective_vus(&self) -> usize {
        match self.executor {
            ExecutorKind::SharedIterations => {
                let cap = usize::try_from(self.iterations).unwrap_or(usize::MAX);
                self.vus.min(cap)
            }
            ExecutorKind::PerVuIterations => self.vus,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionOutcome {
    /// A shutdown (signal or max duration) stopped at least one VU early.
    pub interrupted: bool,
    pub hit_max_duration: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VuExit {
    Finished,
    Interrupted,
}

enum IterationBudget {
    Shared(Arc<IterationPool>),
    PerVu(u64),
}

/// Runs every VU of the scenario to completion or shutdown.
///
/// The caller's `context` is consumed so that its metrics sender is dropped
/// once the VUs finish; the collector relies on that to terminate.
///
/// # Errors
///
/// Returns an error if a VU task panics or is cancelled.
pub async fn run_scenario(
    spec: &ScenarioSpec,
    context: IterationContext,
    shutdown_tx: &ShutdownSender,
) -> AppResult<ExecutionOutcome> {
    let vus = spec.effective_vus();
    if vus < spec.vus {
        tracing::warn!(
            "Only {} iterations for {} VUs; starting {} VUs.",
            spec.iterations,
            spec.vus,
            vus
        );
    }
    tracing::info!(
        "Scenario '{}': {} with {} VUs and {} iterations against {}.",
        spec.name,
        spec.executor.as_str(),
        vus,
        spec.iterations,
        spec.base_url
    );

    let deadline_handle = spawn_deadline(spec.max_duration, shutdown_tx);
    let (hard_stop_tx, _) = shutdown_channel();
    let grace_handle = spawn_graceful_stop(spec.graceful_stop, shutdown_tx, &hard_stop_tx);
    let shared_pool = Arc::new(IterationPool::new(spec.iterations));

    let mut handles = Vec::with_capacity(vus);
    for vu in 0..vus {
        let context = context.clone();
        let mut stop = VuStop {
            shutdown_rx: shutdown_tx.subscribe(),
            hard_stop_rx: hard_stop_tx.subscribe(),
        };
        let budget = match spec.executor {
            ExecutorKind::SharedIterations => IterationBudget::Shared(Arc::clone(&shared_pool)),
            ExecutorKind::PerVuIterations => IterationBudget::PerVu(spec.iterations),
        };
        handles.push(tokio::spawn(async move {
            run_vu(vu, &context, &budget, &mut stop).await
        }));
    }
    drop(context);

    let mut interrupted = false;
    for handle in handles {
        if handle.await? == VuExit::Interrupted {
            interrupted = true;
        }
    }

    grace_handle.abort();
    drop(shutdown_tx.send(()));
    let hit_max_duration = deadline_handle.await?;
    if hit_max_duration {
        match spec.executor {
            ExecutorKind::SharedIterations => tracing::warn!(
                "Max duration {:?} reached after {} of {} iterations were claimed.",
                spec.max_duration,
                shared_pool.claimed(),
                spec.iterations
            ),
            ExecutorKind::PerVuIterations => {
                tracing::warn!("Max duration {:?} reached.", spec.max_duration);
            }
        }
    }

    Ok(ExecutionOutcome {
        interrupted,
        hit_max_duration,
    })
}

struct VuStop {
    /// Stop claiming iterations.
    shutdown_rx: ShutdownReceiver,
    /// Abandon the iteration in flight.
    hard_stop_rx: ShutdownReceiver,
}

async fn run_vu(
    vu: usize,
    context: &IterationContext,
    budget: &IterationBudget,
    stop: &mut VuStop,
) -> VuExit {
    let mut local_runs: u64 = 0;
    loop {
        match stop.shutdown_rx.try_recv() {
            Ok(()) | Err(TryRecvError::Lagged(_) | TryRecvError::Closed) => {
                return VuExit::Interrupted;
            }
            Err(TryRecvError::Empty) => {}
        }

        let claimed = match budget {
            IterationBudget::Shared(pool) => pool.try_claim(),
            IterationBudget::PerVu(limit) => {
                if local_runs < *limit {
                    local_runs = local_runs.saturating_add(1);
                    true
                } else {
                    false
                }
            }
        };
        if !claimed {
            tracing::trace!("VU {} finished.", vu);
            return VuExit::Finished;
        }

        tokio::select! {
            _ = stop.hard_stop_rx.recv() => {
                tracing::debug!("VU {} abandoned its iteration after the graceful stop.", vu);
                return VuExit::Interrupted;
            }
            report = run_frontpage_iteration(context, vu) => {
                if report.failed {
                    tracing::debug!("VU {} iteration failed after {} requests.", vu, report.requested.len());
                }
            }
        }
    }
}

/// Waits for the shutdown, then gives in-flight iterations `graceful_stop`
/// before broadcasting the hard stop. Aborted once every VU has exited.
fn spawn_graceful_stop(
    graceful_stop: Duration,
    shutdown_tx: &ShutdownSender,
    hard_stop_tx: &ShutdownSender,
) -> tokio::task::JoinHandle<()> {
    let mut shutdown_rx = shutdown_tx.subscribe();
    let hard_stop_tx = hard_stop_tx.clone();
    tokio::spawn(async move {
        drop(shutdown_rx.recv().await);
        if !graceful_stop.is_zero() {
            tracing::info!(
                "Stopping: waiting up to {:?} for in-flight iterations.",
                graceful_stop
            );
            tokio::time::sleep(graceful_stop).await;
        }
        drop(hard_stop_tx.send(()));
    })
}

fn spawn_deadline(
    max_duration: Duration,
    shutdown_tx: &ShutdownSender,
) -> tokio::task::JoinHandle<bool> {
    let shutdown_tx = shutdown_tx.clone();
    let mut shutdown_rx = shutdown_tx.subscribe();
    tokio::spawn(async move {
        tokio::select! {
            _ = shutdown_rx.recv() => false,
            () = tokio::time::sleep(max_duration) => {
                drop(shutdown_tx.send(()));
                true
            }
        }
    })
}
