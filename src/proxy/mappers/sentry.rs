// Sentry issue -> dashboard alert mapping
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Only the most recent issues are surfaced as alerts
pub const MAX_ALERTS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentryAlert {
    pub message: String,
    pub severity: String,
    pub time: Value,
    pub details: String,
    pub original_issue: OriginalIssue,
}

/// Issue fields carried along with each alert. A field the issue carries
/// explicitly, `null` included, is kept as is; defaults only fill absent keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OriginalIssue {
    pub id: Value,
    pub short_id: Value,
    pub title: Value,
    pub culprit: Value,
    pub status: Value,
    pub level: Value,
    pub last_seen: Value,
    pub permalink: Value,
}

fn field_or(issue: &Value, key: &str, default: &str) -> Value {
    issue
        .get(key)
        .cloned()
        .unwrap_or_else(|| Value::String(default.to_string()))
}

fn field(issue: &Value, key: &str) -> Value {
    issue.get(key).cloned().unwrap_or(Value::Null)
}

fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "None".to_string(),
        other => other.to_string(),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Map a Sentry issue list to alerts. `now` stands in for an absent `lastSeen`.
///
/// Any payload other than an array is an error; the text names what arrived.
pub fn transform_issues_to_alerts(issues: &Value, now: &str) -> Result<Vec<SentryAlert>, String> {
    let Some(issues) = issues.as_array() else {
        return Err(format!("expected a list of issues, got {}", kind(issues)));
    };

    let alerts = issues
        .iter()
        .take(MAX_ALERTS)
        .map(|issue| {
            let severity = if issue.get("level").and_then(|v| v.as_str()) == Some("error") {
                "Error"
            } else {
                "Warning"
            };
            let project_name = issue
                .get("project")
                .and_then(|p| p.get("name"))
                .map(display)
                .unwrap_or_else(|| "Unknown".to_string());

            SentryAlert {
                message: format!("Issue detected: {}", display(&field_or(issue, "title", "Unknown issue"))),
                severity: severity.to_string(),
                time: field_or(issue, "lastSeen", now),
                details: format!("Project: {}", project_name),
                original_issue: OriginalIssue {
                    id: field(issue, "id"),
                    short_id: field(issue, "shortId"),
                    title: field(issue, "title"),
                    culprit: field_or(issue, "culprit", "Unknown"),
                    status: field_or(issue, "status", "unresolved"),
                    level: field_or(issue, "level", "error"),
                    last_seen: field(issue, "lastSeen"),
                    permalink: field_or(issue, "permalink", ""),
                },
            }
        })
        .collect();

    Ok(alerts)
}
