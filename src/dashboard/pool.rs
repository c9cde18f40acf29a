//! Bounded fan-out of per-project metric computation with a single
//! aggregating consumer. The first error wins and stops every worker.

use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use super::DashboardError;
use super::aggregate::{Aggregator, PartialMetrics};
use crate::models::ProjectMeta;

const MIN_WORKERS: usize = 4;

/// `min(max_workers, max(4, cpus * 4))`.
pub fn worker_count(max_workers: usize) -> usize {
    let cpus = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    (cpus * 4).clamp(MIN_WORKERS, max_workers.max(MIN_WORKERS))
}

#[derive(Debug, Clone, Copy)]
pub struct PoolSettings {
    pub workers: usize,
    pub now: DateTime<Utc>,
    pub idle_threshold: TimeDelta,
}

/// Compute and aggregate metrics for every project in `project_ids`.
///
/// Returns on the first error reported by a worker, or when `cancel` fires.
/// Workers still running at that point are cancelled and aborted; none
/// outlive this call.
pub async fn run<F, Fut>(
    project_ids: Vec<i32>,
    settings: PoolSettings,
    cancel: &CancellationToken,
    get_meta: F,
) -> Result<Aggregator, DashboardError>
where
    F: Fn(i32) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<ProjectMeta, DashboardError>> + Send + 'static,
{
    let total = project_ids.len();
    let mut aggregator = Aggregator::default();
    if total == 0 {
        return Ok(aggregator);
    }

    let workers = settings.workers.clamp(1, total);
    let abort = cancel.child_token();
    let _abort_on_exit = abort.clone().drop_guard();

    let (job_tx, job_rx) = mpsc::channel::<i32>(workers);
    let job_rx = Arc::new(Mutex::new(job_rx));
    let (result_tx, mut result_rx) = mpsc::channel::<PartialMetrics>(workers);
    // Capacity 1: later errors are dropped. Kept open by `err_tx` below.
    let (err_tx, mut err_rx) = mpsc::channel::<DashboardError>(1);
    let get_meta = Arc::new(get_meta);

    let mut tasks = JoinSet::new();
    tasks.spawn(feed(project_ids, job_tx, abort.clone()));
    for _ in 0..workers {
        tasks.spawn(work(
            job_rx.clone(),
            result_tx.clone(),
            err_tx.clone(),
            abort.clone(),
            get_meta.clone(),
            settings,
        ));
    }
    drop(result_tx);

    tracing::debug!(workers, projects = total, "Metric workers started");

    while aggregator.received() < total {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(DashboardError::Cancelled),
            Some(err) = err_rx.recv() => return Err(err),
            partial = result_rx.recv() => match partial {
                Some(partial) => aggregator.add(&partial),
                None => {
                    return Err(DashboardError::Worker(format!(
                        "metric workers exited after {} of {total} projects",
                        aggregator.received()
                    )));
                }
            },
        }
    }

    drop(err_tx);
    Ok(aggregator)
}

async fn feed(project_ids: Vec<i32>, jobs: mpsc::Sender<i32>, abort: CancellationToken) {
    for id in project_ids {
        tokio::select! {
            _ = abort.cancelled() => return,
            sent = jobs.send(id) => {
                if sent.is_err() {
                    return;
                }
            }
        }
    }
}

async fn work<F, Fut>(
    jobs: Arc<Mutex<mpsc::Receiver<i32>>>,
    results: mpsc::Sender<PartialMetrics>,
    errors: mpsc::Sender<DashboardError>,
    abort: CancellationToken,
    get_meta: Arc<F>,
    settings: PoolSettings,
) where
    F: Fn(i32) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<ProjectMeta, DashboardError>> + Send + 'static,
{
    loop {
        let next = {
            let mut jobs = jobs.lock().await;
            tokio::select! {
                _ = abort.cancelled() => None,
                id = jobs.recv() => id,
            }
        };
        let Some(id) = next else {
            break;
        };

        let meta = tokio::select! {
            _ = abort.cancelled() => break,
            meta = get_meta(id) => meta,
        };
        let meta = match meta {
            Ok(meta) => meta,
            Err(e) => {
                tracing::warn!(project_id = id, "Metric worker failed: {e}");
                let _ = errors.try_send(e);
                break;
            }
        };

        let partial = PartialMetrics::from_meta(&meta, settings.now, settings.idle_threshold);

        tokio::select! {
            _ = abort.cancelled() => break,
            sent = results.send(partial) => {
                if sent.is_err() {
                    break;
                }
            }
        }
    }
}
