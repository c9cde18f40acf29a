//! Per-project metadata, loaded for many projects at once.
//!
//! [`MetaLoader::load_batch`] issues five queries in total no matter how many
//! project ids it is given, then groups the rows by project in memory.

#[cfg(test)]
pub(crate) mod fixtures;
pub mod postgres;

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tracing::{Instrument, Span};

use crate::models::{Consultant, ConsultantLink, Project, ProjectMeta, ProjectStatus, TimeEntry};

pub use postgres::PgMetaSource;

/// Read capabilities the metadata loader and the dashboard depend on.
#[async_trait]
pub trait MetaSource: Send + Sync {
    async fn all_project_ids(&self) -> Result<Vec<i32>, sqlx::Error>;
    async fn time_entries_for_projects(&self, ids: &[i32]) -> Result<Vec<TimeEntry>, sqlx::Error>;
    /// Newest first within each project.
    async fn status_history_for_projects(
        &self,
        ids: &[i32],
    ) -> Result<Vec<ProjectStatus>, sqlx::Error>;
    async fn projects_by_ids(&self, ids: &[i32]) -> Result<Vec<Project>, sqlx::Error>;
    async fn related_consultant_links(
        &self,
        ids: &[i32],
    ) -> Result<Vec<ConsultantLink>, sqlx::Error>;
    async fn consultants_by_ids(&self, ids: &[i32]) -> Result<Vec<Consultant>, sqlx::Error>;
}

#[derive(Debug, Clone, Default)]
pub struct MetaBatch {
    pub metas: HashMap<i32, ProjectMeta>,
    /// Project rows that exist among the requested ids.
    pub projects: Vec<Project>,
}

#[derive(Clone)]
pub struct MetaLoader {
    source: Arc<dyn MetaSource>,
    span: Span,
}

impl MetaLoader {
    pub fn new(source: Arc<dyn MetaSource>, span: Span) -> Self {
        Self { source, span }
    }

    pub fn source(&self) -> &Arc<dyn MetaSource> {
        &self.source
    }

    /// Load metadata for every id in `project_ids`.
    ///
    /// Ids without a project row still get an entry, with no manager and
    /// empty histories. Any failed fetch aborts the whole load.
    pub async fn load_batch(&self, project_ids: &[i32]) -> Result<MetaBatch, sqlx::Error> {
        self.load_batch_inner(project_ids)
            .instrument(self.span.clone())
            .await
    }

    /// Metadata for a single project, or `None` when it does not exist.
    pub async fn load_one(&self, project_id: i32) -> Result<Option<ProjectMeta>, sqlx::Error> {
        let mut batch = self.load_batch(&[project_id]).await?;
        if batch.projects.is_empty() {
            return Ok(None);
        }
        Ok(batch.metas.remove(&project_id))
    }

    async fn load_batch_inner(&self, project_ids: &[i32]) -> Result<MetaBatch, sqlx::Error> {
        if project_ids.is_empty() {
            return Ok(MetaBatch::default());
        }

        let started = Instant::now();
        tracing::debug!(projects = project_ids.len(), "Loading project metadata batch");

        let step = Instant::now();
        let time_entries = self.source.time_entries_for_projects(project_ids).await?;
        tracing::debug!(
            rows = time_entries.len(),
            elapsed_ms = step.elapsed().as_millis() as u64,
            "Fetched time entries"
        );

        let step = Instant::now();
        let statuses = self.source.status_history_for_projects(project_ids).await?;
        tracing::debug!(
            rows = statuses.len(),
            elapsed_ms = step.elapsed().as_millis() as u64,
            "Fetched status history"
        );

        let step = Instant::now();
        let projects = self.source.projects_by_ids(project_ids).await?;
        tracing::debug!(
            rows = projects.len(),
            elapsed_ms = step.elapsed().as_millis() as u64,
            "Fetched projects"
        );

        let step = Instant::now();
        let links = self.source.related_consultant_links(project_ids).await?;
        tracing::debug!(
            rows = links.len(),
            elapsed_ms = step.elapsed().as_millis() as u64,
            "Fetched related consultants"
        );

        let step = Instant::now();
        let manager_ids: Vec<i32> = projects
            .iter()
            .filter_map(|p| p.manager_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let managers = self.source.consultants_by_ids(&manager_ids).await?;
        tracing::debug!(
            rows = managers.len(),
            elapsed_ms = step.elapsed().as_millis() as u64,
            "Fetched managers"
        );

        let metas = assemble(project_ids, &projects, time_entries, statuses, links, managers);

        tracing::info!(
            projects = project_ids.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Loaded project metadata batch"
        );

        Ok(MetaBatch { metas, projects })
    }
}

fn assemble(
    project_ids: &[i32],
    projects: &[Project],
    time_entries: Vec<TimeEntry>,
    statuses: Vec<ProjectStatus>,
    links: Vec<ConsultantLink>,
    managers: Vec<Consultant>,
) -> HashMap<i32, ProjectMeta> {
    let mut entries_by_project: HashMap<i32, Vec<TimeEntry>> = HashMap::new();
    for entry in time_entries {
        entries_by_project.entry(entry.project_id).or_default().push(entry);
    }

    let mut statuses_by_project: HashMap<i32, Vec<ProjectStatus>> = HashMap::new();
    for status in statuses {
        statuses_by_project.entry(status.project_id).or_default().push(status);
    }

    let mut consultants_by_project: HashMap<i32, Vec<Consultant>> = HashMap::new();
    for link in links {
        consultants_by_project
            .entry(link.project_id)
            .or_default()
            .push(link.consultant);
    }

    let managers: HashMap<i32, Consultant> = managers.into_iter().map(|m| (m.id, m)).collect();
    let manager_of: HashMap<i32, i32> = projects
        .iter()
        .filter_map(|p| p.manager_id.map(|m| (p.id, m)))
        .collect();

    let mut metas = HashMap::with_capacity(project_ids.len());
    for &id in project_ids {
        if metas.contains_key(&id) {
            continue;
        }

        let mut time_entries = entries_by_project.remove(&id).unwrap_or_default();
        time_entries.sort_by(|a, b| b.id.cmp(&a.id));

        // index 0 must be the latest status
        let mut status_history = statuses_by_project.remove(&id).unwrap_or_default();
        status_history.sort_by(|a, b| b.id.cmp(&a.id));

        let mut consultants = consultants_by_project.remove(&id).unwrap_or_default();
        consultants.sort_by_key(|c| c.id);
        consultants.dedup_by_key(|c| c.id);

        let manager = manager_of.get(&id).and_then(|m| managers.get(m)).cloned();

        metas.insert(
            id,
            ProjectMeta {
                manager,
                time_entries,
                status_history,
                consultants,
            },
        );
    }
    metas
}
