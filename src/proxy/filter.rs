// Request parameter filter
// Each gateway operation may only forward the fields listed in its allow-list

use once_cell::sync::Lazy;
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use crate::error::{AppError, AppResult};

/// Allow-list table (operation name -> permitted field names)
static REQUEST_PARAMS: Lazy<HashMap<&'static str, HashSet<&'static str>>> = Lazy::new(|| {
    let table: [(&str, &[&str]); 8] = [
        // Sentry
        (
            "update_issue_status",
            &["status", "statusDetails", "assignedTo", "hasSeen", "isBookmarked", "isSubscribed", "isPublic"],
        ),
        // Mailgun
        (
            "get_account_metrics",
            &["start", "end", "resolution", "duration", "dimensions", "metrics", "filter"],
        ),
        (
            "get_account_usage_metrics",
            &["start", "end", "resolution", "duration", "dimensions", "metrics", "filter"],
        ),
        (
            "get_logs",
            &["start", "end", "events", "metric_events", "filter", "include_subaccounts", "include_totals", "pagination"],
        ),
        ("get_stat_totals", &["start", "end", "resolution", "duration", "event"]),
        (
            "get_filtered_grouped_stats",
            &["start", "end", "resolution", "duration", "event", "filter", "group"],
        ),
        ("get_mailing_lists", &["address", "limit", "skip"]),
        ("get_mailing_list_members", &["address", "subscribed", "limit", "skip"]),
    ];

    table
        .into_iter()
        .map(|(operation, fields)| (operation, fields.iter().copied().collect()))
        .collect()
});

/// Keep only the fields of `data` that `operation` is allowed to forward.
///
/// Values are cloned untouched. An operation missing from the table is a
/// programming error and yields [`AppError::Configuration`].
pub fn filter_request_data(data: &Map<String, Value>, operation: &str) -> AppResult<Map<String, Value>> {
    let allowed = REQUEST_PARAMS
        .get(operation)
        .ok_or_else(|| AppError::Configuration(format!("unknown operation: {}", operation)))?;

    Ok(retain_allowed(data, allowed))
}

fn retain_allowed(data: &Map<String, Value>, allowed: &HashSet<&'static str>) -> Map<String, Value> {
    data.iter()
        .filter(|(key, _)| allowed.contains(key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Gateway operations that carry an allow-list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    UpdateIssueStatus,
    GetAccountMetrics,
    GetAccountUsageMetrics,
    GetLogs,
    GetStatTotals,
    GetFilteredGroupedStats,
    GetMailingLists,
    GetMailingListMembers,
}

impl Operation {
    pub const ALL: [Operation; 8] = [
        Operation::UpdateIssueStatus,
        Operation::GetAccountMetrics,
        Operation::GetAccountUsageMetrics,
        Operation::GetLogs,
        Operation::GetStatTotals,
        Operation::GetFilteredGroupedStats,
        Operation::GetMailingLists,
        Operation::GetMailingListMembers,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::UpdateIssueStatus => "update_issue_status",
            Operation::GetAccountMetrics => "get_account_metrics",
            Operation::GetAccountUsageMetrics => "get_account_usage_metrics",
            Operation::GetLogs => "get_logs",
            Operation::GetStatTotals => "get_stat_totals",
            Operation::GetFilteredGroupedStats => "get_filtered_grouped_stats",
            Operation::GetMailingLists => "get_mailing_lists",
            Operation::GetMailingListMembers => "get_mailing_list_members",
        }
    }

    pub fn allowed_fields(&self) -> &'static HashSet<&'static str> {
        // every variant has a row in REQUEST_PARAMS (checked in tests)
        &REQUEST_PARAMS[self.as_str()]
    }

    /// Infallible form of [`filter_request_data`] for call sites with a typed operation.
    pub fn filter(&self, data: &Map<String, Value>) -> Map<String, Value> {
        retain_allowed(data, self.allowed_fields())
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operation::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| AppError::Configuration(format!("unknown operation: {}", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_keeps_only_allowed_fields() {
        let payload = object(json!({"event": "accepted", "bogus": "x"}));
        let filtered = filter_request_data(&payload, "get_stat_totals").unwrap();
        assert_eq!(Value::Object(filtered), json!({"event": "accepted"}));
    }

    #[test]
    fn test_drops_secret_fields_for_issue_update() {
        let payload = object(json!({"status": "resolved", "secret": "x"}));
        let filtered = filter_request_data(&payload, "update_issue_status").unwrap();
        assert_eq!(Value::Object(filtered), json!({"status": "resolved"}));
    }

    #[test]
    fn test_key_set_is_intersection_and_values_untouched() {
        let payload = object(json!({
            "start": "Mon, 01 Jan 2024 00:00:00 +0000",
            "metrics": ["accepted_count", "delivered_count"],
            "filter": {"AND": [{"attribute": "domain", "comparator": "=", "values": []}]},
            "pagination": {"limit": 10},
            "include_totals": true,
            "unknown": 1
        }));

        for op in Operation::ALL {
            let filtered = filter_request_data(&payload, op.as_str()).unwrap();
            let expected: HashSet<&str> = payload
                .keys()
                .map(String::as_str)
                .filter(|k| op.allowed_fields().contains(*k))
                .collect();
            let actual: HashSet<&str> = filtered.keys().map(String::as_str).collect();
            assert_eq!(actual, expected, "operation {}", op);
            for (key, value) in &filtered {
                assert_eq!(value, &payload[key]);
            }
        }
    }

    #[test]
    fn test_absent_allowed_fields_are_not_defaulted() {
        let filtered = filter_request_data(&Map::new(), "get_logs").unwrap();
        assert!(filtered.is_empty());
    }

    #[test]
    fn test_input_is_not_mutated_and_result_is_stable() {
        let payload = object(json!({"limit": 5, "skip": 10, "other": "y"}));
        let before = payload.clone();
        let first = filter_request_data(&payload, "get_mailing_list_members").unwrap();
        let second = filter_request_data(&payload, "get_mailing_list_members").unwrap();
        assert_eq!(payload, before);
        assert_eq!(first, second);
    }

    #[test]
    fn test_unknown_operation_is_a_configuration_error() {
        let payload = object(json!({"status": "resolved"}));
        let err = filter_request_data(&payload, "delete_everything").unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
        assert!("delete_everything".parse::<Operation>().is_err());
    }

    #[test]
    fn test_every_operation_has_a_table_row() {
        for op in Operation::ALL {
            assert!(REQUEST_PARAMS.contains_key(op.as_str()));
            assert_eq!(op.as_str().parse::<Operation>().unwrap(), op);
        }
        assert_eq!(REQUEST_PARAMS.len(), Operation::ALL.len());
    }

    #[test]
    fn test_typed_filter_matches_named_filter() {
        let payload = object(json!({"address": "devs@mg.example.test", "subscribed": "yes", "page": 2}));
        let typed = Operation::GetMailingListMembers.filter(&payload);
        let named = filter_request_data(&payload, "get_mailing_list_members").unwrap();
        assert_eq!(typed, named);
        assert_eq!(typed.len(), 2);
    }
}
