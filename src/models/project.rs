use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: i32,
    pub manager_id: Option<i32>,
    pub number: String,
    pub name: String,
    pub projected_start_date: Option<DateTime<Utc>>,
    pub start_date: Option<DateTime<Utc>>,
    pub projected_end_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub description: String,
}

impl Project {
    /// True when the end date lies strictly inside `(now, now + window)`.
    pub fn ends_within(&self, now: DateTime<Utc>, window: chrono::Duration) -> bool {
        match self.end_date {
            Some(end) => {
                end > now && now.checked_add_signed(window).is_none_or(|limit| end < limit)
            }
            None => false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewProject {
    pub manager_id: Option<i32>,
    pub number: String,
    pub name: String,
    pub projected_start_date: Option<DateTime<Utc>>,
    pub start_date: Option<DateTime<Utc>>,
    pub projected_end_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub description: String,
}
