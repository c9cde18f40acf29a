pub async fn create<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    project_id: i32,
    tag: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO project_tags (project_id, tag) VALUES ($1, $2)")
        .bind(project_id)
        .bind(tag)
        .execute(executor)
        .await?;
    Ok(())
}
