use async_trait::async_trait;
use sqlx::PgPool;

use super::MetaSource;
use crate::db;
use crate::models::{Consultant, ConsultantLink, Project, ProjectStatus, TimeEntry};

#[derive(Clone)]
pub struct PgMetaSource {
    pool: PgPool,
}

impl PgMetaSource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MetaSource for PgMetaSource {
    async fn all_project_ids(&self) -> Result<Vec<i32>, sqlx::Error> {
        db::projects::all_ids(&self.pool).await
    }

    async fn time_entries_for_projects(&self, ids: &[i32]) -> Result<Vec<TimeEntry>, sqlx::Error> {
        db::time_entries::history_for_projects(&self.pool, ids).await
    }

    async fn status_history_for_projects(
        &self,
        ids: &[i32],
    ) -> Result<Vec<ProjectStatus>, sqlx::Error> {
        db::statuses::history_for_projects(&self.pool, ids).await
    }

    async fn projects_by_ids(&self, ids: &[i32]) -> Result<Vec<Project>, sqlx::Error> {
        db::projects::find_by_ids(&self.pool, ids).await
    }

    async fn related_consultant_links(
        &self,
        ids: &[i32],
    ) -> Result<Vec<ConsultantLink>, sqlx::Error> {
        db::consultants::related_links_for_projects(&self.pool, ids).await
    }

    async fn consultants_by_ids(&self, ids: &[i32]) -> Result<Vec<Consultant>, sqlx::Error> {
        db::consultants::find_by_ids(&self.pool, ids).await
    }
}
