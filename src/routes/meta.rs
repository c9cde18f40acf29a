use axum::Json;
use axum::extract::{Path, State};

use crate::dashboard::project_meta_key;
use crate::error::AppError;
use crate::models::ProjectMeta;
use crate::state::SharedState;

use super::parse_path_number;

pub async fn get(
    State(state): State<SharedState>,
    Path(project_id): Path<String>,
) -> Result<Json<ProjectMeta>, AppError> {
    let project_id: i32 = parse_path_number(&project_id, "project id")?;

    let meta = state
        .cache
        .use_or_compute(&project_meta_key(project_id), || async {
            state
                .loader
                .load_one(project_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Project not found".to_string()))
        })
        .await?;

    Ok(Json(meta))
}
