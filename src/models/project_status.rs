use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const STATUS_COMPLETED: &str = "completed";
pub const STATUS_ACTIVE: &str = "active";

#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectStatus {
    pub id: i32,
    pub title: String,
    pub project_id: i32,
    pub consultant_id: Option<i32>,
    pub description: String,
    pub date_created: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewProjectStatus {
    pub project_id: i32,
    pub consultant_id: Option<i32>,
    pub title: String,
    pub description: String,
    pub date_created: DateTime<Utc>,
}
