// Sentry Handler
// Proxies the error-tracking API with the configured bearer token
use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Map, Value};

use crate::error::{AppError, AppResult};
use crate::proxy::common::utils::{join_uri, JsonPayload};
use crate::proxy::filter::Operation;
use crate::proxy::mappers::sentry::{transform_issues_to_alerts, SentryAlert};
use crate::proxy::server::AppState;
use crate::proxy::upstream::TransportOptions;

fn organization_uri(state: &AppState, tail: &[&str]) -> AppResult<String> {
    let sentry = &state.config.sentry;
    let mut segments = vec!["organizations", sentry.organization_slug.as_str()];
    segments.extend_from_slice(tail);
    join_uri(&sentry.base_uri, &segments)
}

fn project_uri(state: &AppState, tail: &[&str]) -> AppResult<String> {
    let sentry = &state.config.sentry;
    let mut segments = vec![
        "projects",
        sentry.organization_slug.as_str(),
        sentry.project_id.as_str(),
    ];
    segments.extend_from_slice(tail);
    join_uri(&sentry.base_uri, &segments)
}

fn authorized(state: &AppState, options: TransportOptions) -> TransportOptions {
    options.headers([state.config.sentry.auth_header()])
}

/// GET /api/sentry/issues/:issue_id/events/
pub async fn handle_get_issue_events(
    State(state): State<AppState>,
    Path(issue_id): Path<u64>,
) -> AppResult<Json<Value>> {
    let id = issue_id.to_string();
    let uri = organization_uri(&state, &["issues", id.as_str(), "events", ""])?;
    let options = authorized(&state, TransportOptions::get(uri));
    state.upstream.make_request(&options).await.map(Json)
}

/// PUT /api/sentry/issues/:issue_id/
pub async fn handle_update_issue_status(
    State(state): State<AppState>,
    Path(issue_id): Path<u64>,
    JsonPayload(payload): JsonPayload,
) -> AppResult<Json<Value>> {
    let id = issue_id.to_string();
    let uri = organization_uri(&state, &["issues", id.as_str(), ""])?;
    let filtered = Operation::UpdateIssueStatus.filter(&payload);

    let options = authorized(&state, TransportOptions::put(uri)).json(Value::Object(filtered));
    state.upstream.make_request(&options).await.map(Json)
}

/// GET /api/sentry/issues/
pub async fn handle_get_issues(State(state): State<AppState>) -> AppResult<Json<Value>> {
    let uri = project_uri(&state, &["issues", ""])?;
    let options = authorized(&state, TransportOptions::get(uri));
    state.upstream.make_request(&options).await.map(Json)
}

/// GET /api/sentry/events/
pub async fn handle_get_events(State(state): State<AppState>) -> AppResult<Json<Value>> {
    let uri = project_uri(&state, &["events", ""])?;
    let options = authorized(&state, TransportOptions::get(uri));
    state.upstream.make_request(&options).await.map(Json)
}

/// GET /api/sentry/members/
pub async fn handle_get_organization_members(State(state): State<AppState>) -> AppResult<Json<Value>> {
    let uri = organization_uri(&state, &["members", ""])?;
    let options = authorized(&state, TransportOptions::get(uri));
    state.upstream.make_request(&options).await.map(Json)
}

/// GET /api/sentry/alerts/
/// Recent issues (last 24h) reshaped as dashboard alerts
pub async fn handle_get_alerts(State(state): State<AppState>) -> AppResult<Json<Vec<SentryAlert>>> {
    let uri = project_uri(&state, &["issues", ""])?;
    let mut params = Map::new();
    params.insert("statsPeriod".to_string(), json!("24h"));
    let options = authorized(&state, TransportOptions::get(uri)).query(params);

    let issues = state.upstream.make_request(&options).await?;
    let now = chrono::Local::now().to_rfc3339();
    let alerts = transform_issues_to_alerts(&issues, &now).map_err(|detail| {
        let err = AppError::ResponseDecode {
            method: options.method.to_string(),
            uri: options.uri.clone(),
            params: options.params_summary(),
            detail,
        };
        tracing::error!("{}", err);
        err
    })?;

    tracing::debug!("Mapped {} Sentry issues to alerts", alerts.len());
    Ok(Json(alerts))
}
