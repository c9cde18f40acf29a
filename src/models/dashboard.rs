use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsDashboard {
    pub projects: u64,
    pub active: u64,
    pub completed: u64,
    pub idle: u64,
    #[serde(rename = "outOfBudget")]
    pub out_of_budget: u64,
    #[serde(rename = "totalDebit")]
    pub total_debit: f64,
    #[serde(rename = "totalCredit")]
    pub total_credit: f64,
    #[serde(rename = "avgCreditOverDebit")]
    pub avg_credit_over_debit: f64,
    #[serde(rename = "endingSoonCount")]
    pub ending_soon: u64,
}
