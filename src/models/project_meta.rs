use serde::{Deserialize, Serialize};

use super::{Consultant, ProjectStatus, TimeEntry};

/// Everything the dashboard needs to know about one project.
///
/// `status_history` is most-recent-first: index 0 is the current status.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMeta {
    pub manager: Option<Consultant>,
    pub time_entries: Vec<TimeEntry>,
    pub status_history: Vec<ProjectStatus>,
    pub consultants: Vec<Consultant>,
}
