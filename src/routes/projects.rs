use axum::Json;
use axum::extract::{Path, State};

use crate::dashboard::project_key;
use crate::db;
use crate::error::AppError;
use crate::models::Project;
use crate::state::SharedState;

use super::parse_path_number;

pub const PAGE_SIZE: i64 = 10;
pub const SEARCH_PAGE_SIZE: i64 = 20;

pub async fn get(
    State(state): State<SharedState>,
    Path(project_id): Path<String>,
) -> Result<Json<Project>, AppError> {
    let project_id: i32 = parse_path_number(&project_id, "project id")?;

    let project = state
        .cache
        .use_or_compute(&project_key(project_id), || async {
            db::projects::find_by_id(&state.pool, project_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Project not found".to_string()))
        })
        .await?;

    Ok(Json(project))
}

/// Project ids, newest first. Pages start at 0.
pub async fn page(
    State(state): State<SharedState>,
    Path(page): Path<String>,
) -> Result<Json<Vec<i32>>, AppError> {
    let page: i64 = parse_path_number(&page, "page number")?;
    let offset = offset_for(page, PAGE_SIZE)?;

    let ids = state
        .cache
        .use_or_compute(&format!("projects:page:{page}"), || async {
            db::projects::page_ids(&state.pool, PAGE_SIZE, offset)
                .await
                .map_err(AppError::from)
        })
        .await?;

    Ok(Json(ids))
}

/// Ids of projects matching every `+`-separated term of `query`.
pub async fn search(
    State(state): State<SharedState>,
    Path((query, page)): Path<(String, String)>,
) -> Result<Json<Vec<i32>>, AppError> {
    let page: i64 = parse_path_number(&page, "page number")?;
    let offset = offset_for(page, SEARCH_PAGE_SIZE)?;

    let terms = search_terms(&query);
    if terms.is_empty() {
        return Err(AppError::BadRequest("Search query required".to_string()));
    }

    let key = format!("projects:search:{}:page:{page}", terms.join("+"));
    let ids = state
        .cache
        .use_or_compute(&key, || async {
            db::projects::search_ids(&state.pool, &terms, SEARCH_PAGE_SIZE, offset)
                .await
                .map_err(AppError::from)
        })
        .await?;

    Ok(Json(ids))
}

fn offset_for(page: i64, page_size: i64) -> Result<i64, AppError> {
    page.checked_mul(page_size)
        .ok_or_else(|| AppError::BadRequest("Page number too large".to_string()))
}

/// Lowercased, non-empty terms with LIKE wildcards escaped.
fn search_terms(query: &str) -> Vec<String> {
    query
        .split('+')
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .map(|t| t.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_"))
        .collect()
}
