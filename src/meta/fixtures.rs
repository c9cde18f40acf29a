//! In-memory [`MetaSource`] used by unit tests.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use super::MetaSource;
use crate::models::{
    Consultant, ConsultantLink, EntryType, Project, ProjectStatus, TimeEntry,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FakeCall {
    AllProjectIds,
    TimeEntries,
    StatusHistory,
    Projects,
    ConsultantLinks,
    Consultants,
}

#[derive(Default)]
pub struct FakeSource {
    pub projects: Vec<Project>,
    pub entries: Vec<TimeEntry>,
    pub statuses: Vec<ProjectStatus>,
    pub consultants: Vec<Consultant>,
    /// (project_id, consultant_id)
    pub assignments: Vec<(i32, i32)>,
    /// Every capability call, including failed ones.
    pub calls: AtomicUsize,
    /// Number of batch loads started (time entry fetches).
    pub batch_loads: AtomicUsize,
    pub fail_on: Option<FakeCall>,
    pub hang_on: Option<FakeCall>,
    pub delay: Option<Duration>,
}

impl FakeSource {
    async fn enter(&self, call: FakeCall) -> Result<(), sqlx::Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if call == FakeCall::TimeEntries {
            self.batch_loads.fetch_add(1, Ordering::SeqCst);
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.hang_on == Some(call) {
            std::future::pending::<()>().await;
        }
        if self.fail_on == Some(call) {
            return Err(sqlx::Error::Protocol(format!("{call:?} failed")));
        }
        Ok(())
    }

    fn consultant(&self, id: i32) -> Option<Consultant> {
        self.consultants.iter().find(|c| c.id == id).cloned()
    }
}

#[async_trait]
impl MetaSource for FakeSource {
    async fn all_project_ids(&self) -> Result<Vec<i32>, sqlx::Error> {
        self.enter(FakeCall::AllProjectIds).await?;
        let mut ids: Vec<i32> = self.projects.iter().map(|p| p.id).collect();
        ids.sort_by(|a, b| b.cmp(a));
        Ok(ids)
    }

    async fn time_entries_for_projects(&self, ids: &[i32]) -> Result<Vec<TimeEntry>, sqlx::Error> {
        self.enter(FakeCall::TimeEntries).await?;
        Ok(self
            .entries
            .iter()
            .filter(|e| ids.contains(&e.project_id))
            .cloned()
            .collect())
    }

    async fn status_history_for_projects(
        &self,
        ids: &[i32],
    ) -> Result<Vec<ProjectStatus>, sqlx::Error> {
        self.enter(FakeCall::StatusHistory).await?;
        let mut statuses: Vec<ProjectStatus> = self
            .statuses
            .iter()
            .filter(|s| ids.contains(&s.project_id))
            .cloned()
            .collect();
        statuses.sort_by(|a, b| a.project_id.cmp(&b.project_id).then(b.id.cmp(&a.id)));
        Ok(statuses)
    }

    async fn projects_by_ids(&self, ids: &[i32]) -> Result<Vec<Project>, sqlx::Error> {
        self.enter(FakeCall::Projects).await?;
        Ok(self
            .projects
            .iter()
            .filter(|p| ids.contains(&p.id))
            .cloned()
            .collect())
    }

    async fn related_consultant_links(
        &self,
        ids: &[i32],
    ) -> Result<Vec<ConsultantLink>, sqlx::Error> {
        self.enter(FakeCall::ConsultantLinks).await?;
        let authored = self
            .entries
            .iter()
            .filter_map(|e| e.consultant_id.map(|c| (e.project_id, c)));
        let pairs: BTreeSet<(i32, i32)> = self
            .assignments
            .iter()
            .copied()
            .chain(authored)
            .filter(|(project_id, _)| ids.contains(project_id))
            .collect();

        Ok(pairs
            .into_iter()
            .filter_map(|(project_id, consultant_id)| {
                self.consultant(consultant_id).map(|consultant| ConsultantLink {
                    consultant,
                    project_id,
                })
            })
            .collect())
    }

    async fn consultants_by_ids(&self, ids: &[i32]) -> Result<Vec<Consultant>, sqlx::Error> {
        self.enter(FakeCall::Consultants).await?;
        Ok(self
            .consultants
            .iter()
            .filter(|c| ids.contains(&c.id))
            .cloned()
            .collect())
    }
}

pub fn consultant(id: i32) -> Consultant {
    Consultant {
        id,
        first_name: format!("First{id}"),
        last_name: format!("Last{id}"),
        email: format!("consultant{id}@example.com"),
        profile_picture: String::new(),
    }
}

pub fn project(id: i32, manager_id: Option<i32>) -> Project {
    Project {
        id,
        manager_id,
        number: format!("PRJ-{id:03}"),
        name: format!("Project {id}"),
        projected_start_date: None,
        start_date: None,
        projected_end_date: None,
        end_date: None,
        description: String::new(),
    }
}

/// A status created `age_days` ago.
pub fn status(id: i32, project_id: i32, title: &str, age_days: i64) -> ProjectStatus {
    ProjectStatus {
        id,
        title: title.to_string(),
        project_id,
        consultant_id: None,
        description: String::new(),
        date_created: Utc::now() - chrono::Duration::days(age_days),
    }
}

pub fn entry(
    id: i32,
    project_id: i32,
    entry_type: EntryType,
    hours: f64,
    consultant_id: Option<i32>,
) -> TimeEntry {
    TimeEntry {
        id,
        hours,
        title: format!("{} #{id}", entry_type.as_str()),
        description: String::new(),
        consultant_id,
        project_id,
        entry_type,
        entry_date: Utc::now(),
    }
}
