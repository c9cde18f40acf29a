use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::models::{NewProject, Project};

pub async fn create<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    project: &NewProject,
) -> Result<Project, sqlx::Error> {
    sqlx::query_as::<_, Project>(
        "INSERT INTO projects
            (manager_id, number, name, projected_start_date, start_date,
             projected_end_date, end_date, description)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *",
    )
    .bind(project.manager_id)
    .bind(&project.number)
    .bind(&project.name)
    .bind(project.projected_start_date)
    .bind(project.start_date)
    .bind(project.projected_end_date)
    .bind(project.end_date)
    .bind(&project.description)
    .fetch_one(executor)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: i32) -> Result<Option<Project>, sqlx::Error> {
    sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_ids(pool: &PgPool, ids: &[i32]) -> Result<Vec<Project>, sqlx::Error> {
    sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = ANY($1) ORDER BY id DESC")
        .bind(ids)
        .fetch_all(pool)
        .await
}

pub async fn count_all(pool: &PgPool) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM projects")
        .fetch_one(pool)
        .await?;
    Ok(row.0)
}

pub async fn all_ids(pool: &PgPool) -> Result<Vec<i32>, sqlx::Error> {
    sqlx::query_scalar::<_, i32>("SELECT id FROM projects ORDER BY id DESC")
        .fetch_all(pool)
        .await
}

pub async fn page_ids(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<i32>, sqlx::Error> {
    sqlx::query_scalar::<_, i32>("SELECT id FROM projects ORDER BY id DESC LIMIT $1 OFFSET $2")
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
}

/// Ids of projects matching every term. A term matches when it appears
/// (case-insensitively) in any searchable field of the project or of its
/// consultants, time entries, statuses and tags.
pub async fn search_ids(
    pool: &PgPool,
    terms: &[String],
    limit: i64,
    offset: i64,
) -> Result<Vec<i32>, sqlx::Error> {
    let mut query: QueryBuilder<Postgres> = QueryBuilder::new(
        "SELECT DISTINCT p.id FROM projects p
         LEFT JOIN project_consultants pc ON pc.project_id = p.id
         LEFT JOIN consultants c ON c.id = pc.consultant_id
         LEFT JOIN project_time_entries te ON te.project_id = p.id
         LEFT JOIN project_statuses s ON s.project_id = p.id
         LEFT JOIN project_tags tg ON tg.project_id = p.id
         WHERE TRUE",
    );

    const FIELDS: [&str; 10] = [
        "p.name",
        "p.description",
        "c.first_name",
        "c.last_name",
        "c.email",
        "te.title",
        "te.description",
        "s.title",
        "s.description",
        "tg.tag",
    ];

    for term in terms {
        let pattern = format!("%{term}%");
        query.push(" AND (");
        for (i, field) in FIELDS.iter().enumerate() {
            if i > 0 {
                query.push(" OR ");
            }
            query.push(*field).push(" ILIKE ").push_bind(pattern.clone());
        }
        query.push(")");
    }

    query
        .push(" ORDER BY p.id DESC LIMIT ")
        .push_bind(limit)
        .push(" OFFSET ")
        .push_bind(offset);

    query.build_query_scalar::<i32>().fetch_all(pool).await
}
