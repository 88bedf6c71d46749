use serde::{Deserialize, Serialize};

/// Health summary of one third-party integration, as shown on the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationStatus {
    pub name: String,
    pub category: String,
    pub status: String,
    pub response_time: String,
    pub last_success: Option<String>,
    pub uptime: String,
    pub issue: Option<String>,
}

impl IntegrationStatus {
    /// Starting point before any probe has succeeded
    pub fn unknown(name: &str, category: &str, status: &str) -> Self {
        Self {
            name: name.to_string(),
            category: category.to_string(),
            status: status.to_string(),
            response_time: "N/A".to_string(),
            last_success: None,
            uptime: "0%".to_string(),
            issue: None,
        }
    }
}
