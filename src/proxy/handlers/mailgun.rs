// Mailgun Handler
// Analytics, stats, logs and mailing lists, authenticated with api:<key> basic auth
use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{Map, Value};

use crate::error::AppResult;
use crate::models::MailgunConfig;
use crate::proxy::common::utils::{join_uri, JsonPayload};
use crate::proxy::filter::Operation;
use crate::proxy::server::AppState;
use crate::proxy::upstream::TransportOptions;

fn mailgun_uri(state: &AppState, segments: &[&str]) -> AppResult<String> {
    join_uri(&state.config.mailgun.base_uri, segments)
}

fn authorized(state: &AppState, options: TransportOptions) -> TransportOptions {
    options.basic_auth(
        MailgunConfig::AUTH_USER,
        Some(state.config.mailgun.api_key.clone()),
    )
}

/// Filtered payload as a JSON body
async fn forward_body(
    state: &AppState,
    options: TransportOptions,
    operation: Operation,
    payload: &Map<String, Value>,
) -> AppResult<Json<Value>> {
    let filtered = operation.filter(payload);
    let options = authorized(state, options).json(Value::Object(filtered));
    state.upstream.make_request(&options).await.map(Json)
}

/// Filtered payload as query parameters
async fn forward_query(
    state: &AppState,
    options: TransportOptions,
    operation: Operation,
    payload: &Map<String, Value>,
) -> AppResult<Json<Value>> {
    let filtered = operation.filter(payload);
    let options = authorized(state, options).query(filtered);
    state.upstream.make_request(&options).await.map(Json)
}

/// GET /api/mailgun/queue-status/
pub async fn handle_get_queue_status(State(state): State<AppState>) -> AppResult<Json<Value>> {
    let domain = state.config.mailgun.api_name.clone();
    let uri = mailgun_uri(&state, &["v3", "domains", domain.as_str(), "sending_queues"])?;
    let options = authorized(&state, TransportOptions::get(uri));
    state.upstream.make_request(&options).await.map(Json)
}

/// PUT /api/mailgun/account-metrics/
pub async fn handle_get_account_metrics(
    State(state): State<AppState>,
    JsonPayload(payload): JsonPayload,
) -> AppResult<Json<Value>> {
    let uri = mailgun_uri(&state, &["v1", "analytics", "metrics"])?;
    forward_body(&state, TransportOptions::post(uri), Operation::GetAccountMetrics, &payload).await
}

/// PUT /api/mailgun/account-usage-metrics/
pub async fn handle_get_account_usage_metrics(
    State(state): State<AppState>,
    JsonPayload(payload): JsonPayload,
) -> AppResult<Json<Value>> {
    let uri = mailgun_uri(&state, &["v1", "analytics", "usage", "metrics"])?;
    forward_body(&state, TransportOptions::post(uri), Operation::GetAccountUsageMetrics, &payload).await
}

/// PUT /api/mailgun/logs/
pub async fn handle_get_logs(
    State(state): State<AppState>,
    JsonPayload(payload): JsonPayload,
) -> AppResult<Json<Value>> {
    let uri = mailgun_uri(&state, &["v1", "analytics", "logs"])?;
    forward_body(&state, TransportOptions::post(uri), Operation::GetLogs, &payload).await
}

/// PUT /api/mailgun/stats/totals/
pub async fn handle_get_stat_totals(
    State(state): State<AppState>,
    JsonPayload(payload): JsonPayload,
) -> AppResult<Json<Value>> {
    let uri = mailgun_uri(&state, &["v3", "stats", "total"])?;
    forward_query(&state, TransportOptions::get(uri), Operation::GetStatTotals, &payload).await
}

/// PUT /api/mailgun/stats/filter/
pub async fn handle_get_filtered_grouped_stats(
    State(state): State<AppState>,
    JsonPayload(payload): JsonPayload,
) -> AppResult<Json<Value>> {
    let uri = mailgun_uri(&state, &["v3", "stats", "filter"])?;
    forward_query(&state, TransportOptions::get(uri), Operation::GetFilteredGroupedStats, &payload).await
}

/// PUT /api/mailgun/mailing-lists/
pub async fn handle_get_mailing_lists(
    State(state): State<AppState>,
    JsonPayload(payload): JsonPayload,
) -> AppResult<Json<Value>> {
    let uri = mailgun_uri(&state, &["v3", "lists"])?;
    forward_query(&state, TransportOptions::get(uri), Operation::GetMailingLists, &payload).await
}

/// PUT /api/mailgun/mailing-list-members/:list_address/
pub async fn handle_get_mailing_list_members(
    State(state): State<AppState>,
    Path(list_address): Path<String>,
    JsonPayload(payload): JsonPayload,
) -> AppResult<Json<Value>> {
    let uri = mailgun_uri(&state, &["v3", "lists", list_address.as_str(), "members", ""])?;
    forward_query(&state, TransportOptions::get(uri), Operation::GetMailingListMembers, &payload).await
}
