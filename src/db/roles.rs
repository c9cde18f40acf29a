pub async fn create<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    consultant_id: i32,
    role: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO consultant_roles (consultant_id, role) VALUES ($1, $2)")
        .bind(consultant_id)
        .bind(role)
        .execute(executor)
        .await?;
    Ok(())
}
