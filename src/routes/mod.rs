pub mod dashboard;
pub mod meta;
pub mod projects;

use axum::Router;
use axum::routing::get;

use crate::error::AppError;
use crate::state::SharedState;

pub fn api_routes() -> Router<SharedState> {
    Router::new()
        .route("/dashboard", get(dashboard::metrics))
        .route("/meta/{project_id}", get(meta::get))
        // Projects
        .route("/project/one/{project_id}", get(projects::get))
        .route("/project/page/{page}", get(projects::page))
        .route("/project/search/{query}/page/{page}", get(projects::search))
}

/// Parse a numeric path segment, rejecting negatives.
fn parse_path_number<T>(raw: &str, what: &str) -> Result<T, AppError>
where
    T: std::str::FromStr + Default + PartialOrd,
{
    match raw.parse::<T>() {
        Ok(n) if n >= T::default() => Ok(n),
        _ => Err(AppError::BadRequest(format!("Invalid {what}"))),
    }
}
