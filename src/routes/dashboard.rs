use axum::Json;
use axum::extract::State;

use crate::error::AppError;
use crate::models::MetricsDashboard;
use crate::state::SharedState;

pub async fn metrics(State(state): State<SharedState>) -> Result<Json<MetricsDashboard>, AppError> {
    let dashboard = state.dashboard.metrics(&state.shutdown).await?;
    Ok(Json(dashboard))
}
