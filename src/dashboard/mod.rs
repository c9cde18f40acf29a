//! Dashboard metrics across all projects.
//!
//! A recomputation loads metadata for every project in one batch, fans the
//! per-project work out to a bounded worker pool and folds the results in a
//! single aggregator. The snapshot is cached under [`DASHBOARD_CACHE_KEY`];
//! a build lock keeps concurrent cold-cache requests from recomputing it
//! more than once.

pub mod aggregate;
pub mod pool;

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{TimeDelta, Utc};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, Span};

use crate::cache::Cache;
use crate::config::DashboardConfig;
use crate::meta::MetaLoader;
use crate::models::{MetricsDashboard, Project, ProjectMeta};

use pool::PoolSettings;

pub const DASHBOARD_CACHE_KEY: &str = "metrics_dashboard";

pub fn project_meta_key(project_id: i32) -> String {
    format!("projects:meta:{project_id}")
}

pub fn project_key(project_id: i32) -> String {
    format!("projects:one:{project_id}")
}

#[derive(Debug)]
pub enum DashboardError {
    /// A metadata query failed.
    Fetch(sqlx::Error),
    /// The caller cancelled, or the recomputation ran past its deadline.
    Cancelled,
    /// A worker stopped without reporting a result.
    Worker(String),
}

impl std::fmt::Display for DashboardError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DashboardError::Fetch(err) => write!(f, "metadata fetch failed: {err}"),
            DashboardError::Cancelled => write!(f, "dashboard computation cancelled"),
            DashboardError::Worker(msg) => write!(f, "metric worker failed: {msg}"),
        }
    }
}

impl std::error::Error for DashboardError {}

impl From<sqlx::Error> for DashboardError {
    fn from(err: sqlx::Error) -> Self {
        DashboardError::Fetch(err)
    }
}

pub struct Dashboard {
    loader: MetaLoader,
    cache: Cache,
    config: DashboardConfig,
    build_lock: Mutex<()>,
    span: Span,
}

impl Dashboard {
    pub fn new(loader: MetaLoader, cache: Cache, config: DashboardConfig, span: Span) -> Self {
        Self {
            loader,
            cache,
            config,
            build_lock: Mutex::new(()),
            span,
        }
    }

    /// Current dashboard snapshot, served from cache when fresh.
    ///
    /// Callers queue on the build lock; whoever holds it re-checks the cache
    /// and recomputes only when it is still cold. Failed computations are
    /// never cached.
    pub async fn metrics(
        &self,
        cancel: &CancellationToken,
    ) -> Result<MetricsDashboard, DashboardError> {
        let _build = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(DashboardError::Cancelled),
            guard = self.build_lock.lock() => guard,
        };

        self.cache
            .use_or_compute(DASHBOARD_CACHE_KEY, || self.compute_with_deadline(cancel))
            .instrument(self.span.clone())
            .await
    }

    async fn compute_with_deadline(
        &self,
        cancel: &CancellationToken,
    ) -> Result<MetricsDashboard, DashboardError> {
        let started = Instant::now();
        tracing::info!("Dashboard cache miss, recomputing");

        let result = match tokio::time::timeout(self.config.timeout, self.compute(cancel)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    timeout_ms = self.config.timeout.as_millis() as u64,
                    "Dashboard recomputation timed out"
                );
                Err(DashboardError::Cancelled)
            }
        };

        match &result {
            Ok(dashboard) => tracing::info!(
                projects = dashboard.projects,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Dashboard recomputed"
            ),
            Err(e) => tracing::error!(
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Dashboard recomputation failed: {e}"
            ),
        }
        result
    }

    async fn compute(&self, cancel: &CancellationToken) -> Result<MetricsDashboard, DashboardError> {
        let project_ids = guarded(cancel, self.loader.source().all_project_ids()).await?;
        if project_ids.is_empty() {
            return Ok(MetricsDashboard::default());
        }

        let batch = guarded(cancel, self.loader.load_batch(&project_ids)).await?;
        self.seed_project_cache(batch.projects.clone());

        let now = Utc::now();
        let window = to_delta(self.config.ending_soon_window);
        let ending_soon = batch
            .projects
            .iter()
            .filter(|p| p.ends_within(now, window))
            .count() as u64;

        let settings = PoolSettings {
            workers: pool::worker_count(self.config.max_workers),
            now,
            idle_threshold: to_delta(self.config.idle_threshold),
        };

        let metas = Arc::new(batch.metas);
        let loader = self.loader.clone();
        let cache = self.cache.clone();
        let get_meta = move |id| fetch_meta(cache.clone(), loader.clone(), metas.clone(), id);

        let ids: Vec<i32> = batch.projects.iter().map(|p| p.id).collect();
        let aggregator = pool::run(ids, settings, cancel, get_meta).await?;

        Ok(aggregator.finish(batch.projects.len() as u64, ending_soon))
    }

    /// Store each project row under its own key in the background. Failures
    /// are logged by the cache and otherwise ignored.
    fn seed_project_cache(&self, projects: Vec<Project>) {
        let cache = self.cache.clone();
        tokio::spawn(
            async move {
                for project in &projects {
                    cache.set(&project_key(project.id), project).await;
                }
                tracing::debug!(projects = projects.len(), "Seeded project cache");
            }
            .instrument(self.span.clone()),
        );
    }
}

/// Per-project metadata through the cache, falling back to the batch result
/// and then to a single-project load.
async fn fetch_meta(
    cache: Cache,
    loader: MetaLoader,
    metas: Arc<HashMap<i32, ProjectMeta>>,
    project_id: i32,
) -> Result<ProjectMeta, DashboardError> {
    cache
        .use_or_compute(&project_meta_key(project_id), || async {
            match metas.get(&project_id) {
                Some(meta) => Ok(meta.clone()),
                None => loader
                    .load_one(project_id)
                    .await
                    .map(Option::unwrap_or_default)
                    .map_err(DashboardError::Fetch),
            }
        })
        .await
}

async fn guarded<T>(
    cancel: &CancellationToken,
    fetch: impl Future<Output = Result<T, sqlx::Error>>,
) -> Result<T, DashboardError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(DashboardError::Cancelled),
        result = fetch => result.map_err(DashboardError::Fetch),
    }
}

fn to_delta(duration: Duration) -> TimeDelta {
    TimeDelta::from_std(duration).unwrap_or(TimeDelta::MAX)
}
