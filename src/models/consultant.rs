use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Consultant {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub profile_picture: String,
}

/// A consultant related to a project, either by explicit assignment or by
/// having logged time against it.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct ConsultantLink {
    #[sqlx(flatten)]
    pub consultant: Consultant,
    pub project_id: i32,
}

#[derive(Debug, Clone)]
pub struct NewConsultant {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub profile_picture: String,
}
