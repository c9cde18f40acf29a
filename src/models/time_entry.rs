use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    Debit,
    Credit,
}

impl EntryType {
    pub fn as_str(self) -> &'static str {
        match self {
            EntryType::Debit => "debit",
            EntryType::Credit => "credit",
        }
    }
}

impl TryFrom<String> for EntryType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "debit" => Ok(EntryType::Debit),
            "credit" => Ok(EntryType::Credit),
            other => Err(format!("unknown time entry type: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeEntry {
    pub id: i32,
    pub hours: f64,
    pub title: String,
    pub description: String,
    pub consultant_id: Option<i32>,
    pub project_id: i32,
    #[sqlx(rename = "type", try_from = "String")]
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    pub entry_date: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewTimeEntry {
    pub project_id: i32,
    pub consultant_id: Option<i32>,
    pub entry_type: EntryType,
    pub hours: f64,
    pub title: String,
    pub description: String,
    pub entry_date: DateTime<Utc>,
}
