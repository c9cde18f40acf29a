use sqlx::PgPool;

use crate::models::{NewProjectStatus, ProjectStatus};

pub async fn create<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    status: &NewProjectStatus,
) -> Result<ProjectStatus, sqlx::Error> {
    sqlx::query_as::<_, ProjectStatus>(
        "INSERT INTO project_statuses (project_id, consultant_id, title, description, date_created)
         VALUES ($1, $2, $3, $4, $5) RETURNING *",
    )
    .bind(status.project_id)
    .bind(status.consultant_id)
    .bind(&status.title)
    .bind(&status.description)
    .bind(status.date_created)
    .fetch_one(executor)
    .await
}

/// Status history for the given projects, newest first within each project.
pub async fn history_for_projects(
    pool: &PgPool,
    project_ids: &[i32],
) -> Result<Vec<ProjectStatus>, sqlx::Error> {
    sqlx::query_as::<_, ProjectStatus>(
        "SELECT * FROM project_statuses WHERE project_id = ANY($1) ORDER BY project_id, id DESC",
    )
    .bind(project_ids)
    .fetch_all(pool)
    .await
}
