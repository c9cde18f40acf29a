use sqlx::PgPool;

use crate::models::{Consultant, ConsultantLink, NewConsultant};

pub async fn create<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    consultant: &NewConsultant,
) -> Result<Consultant, sqlx::Error> {
    sqlx::query_as::<_, Consultant>(
        "INSERT INTO consultants (first_name, last_name, email, profile_picture)
         VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(&consultant.first_name)
    .bind(&consultant.last_name)
    .bind(&consultant.email)
    .bind(&consultant.profile_picture)
    .fetch_one(executor)
    .await
}

pub async fn find_by_ids(pool: &PgPool, ids: &[i32]) -> Result<Vec<Consultant>, sqlx::Error> {
    sqlx::query_as::<_, Consultant>("SELECT * FROM consultants WHERE id = ANY($1) ORDER BY id")
        .bind(ids)
        .fetch_all(pool)
        .await
}

pub async fn assign_to_project<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    project_id: i32,
    consultant_id: i32,
    role: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO project_consultants (project_id, consultant_id, role) VALUES ($1, $2, $3)",
    )
    .bind(project_id)
    .bind(consultant_id)
    .bind(role)
    .execute(executor)
    .await?;
    Ok(())
}

/// Consultants related to any of the given projects, through an explicit
/// assignment or a logged time entry. One row per (consultant, project).
pub async fn related_links_for_projects(
    pool: &PgPool,
    project_ids: &[i32],
) -> Result<Vec<ConsultantLink>, sqlx::Error> {
    sqlx::query_as::<_, ConsultantLink>(
        "SELECT c.id, c.first_name, c.last_name, c.email, c.profile_picture, pc.project_id
         FROM consultants c
         JOIN project_consultants pc ON pc.consultant_id = c.id
         WHERE pc.project_id = ANY($1)
         UNION
         SELECT c.id, c.first_name, c.last_name, c.email, c.profile_picture, te.project_id
         FROM consultants c
         JOIN project_time_entries te ON te.consultant_id = c.id
         WHERE te.project_id = ANY($1)
         ORDER BY project_id, id",
    )
    .bind(project_ids)
    .fetch_all(pool)
    .await
}
