use sqlx::PgPool;

use crate::models::{NewTimeEntry, TimeEntry};

pub async fn create<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    entry: &NewTimeEntry,
) -> Result<TimeEntry, sqlx::Error> {
    sqlx::query_as::<_, TimeEntry>(
        "INSERT INTO project_time_entries
            (project_id, consultant_id, type, hours, title, description, entry_date)
         VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
    )
    .bind(entry.project_id)
    .bind(entry.consultant_id)
    .bind(entry.entry_type.as_str())
    .bind(entry.hours)
    .bind(&entry.title)
    .bind(&entry.description)
    .bind(entry.entry_date)
    .fetch_one(executor)
    .await
}

pub async fn history_for_projects(
    pool: &PgPool,
    project_ids: &[i32],
) -> Result<Vec<TimeEntry>, sqlx::Error> {
    sqlx::query_as::<_, TimeEntry>(
        "SELECT * FROM project_time_entries WHERE project_id = ANY($1) ORDER BY project_id, id DESC",
    )
    .bind(project_ids)
    .fetch_all(pool)
    .await
}
