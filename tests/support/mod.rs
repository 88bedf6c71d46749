//! Local stand-in for the upstream services.
//!
//! Every request is echoed back as JSON unless its path selects a canned reply.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use axum::body::Bytes;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use dashboard_gateway_lib::models::AppConfig;
use serde_json::{json, Value};
use tokio::sync::oneshot;

pub const SENTRY_TOKEN: &str = "sntrys_test";
pub const MAILGUN_KEY: &str = "key-test";

pub struct MockUpstream {
    pub base_url: String,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockUpstream {
    pub async fn start() -> Self {
        let app = Router::new().fallback(upstream);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr: SocketAddr = listener.local_addr().expect("addr");
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        tokio::spawn(async move {
            let server = axum::serve(listener, app).with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            });
            let _ = server.await;
        });

        Self {
            base_url: format!("http://{addr}"),
            shutdown_tx: Some(shutdown_tx),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Gateway config with every upstream pointed at this server
    pub fn config(&self) -> AppConfig {
        let mut config = AppConfig::new();
        config.sentry.base_uri = self.url("/api/0");
        config.sentry.health_uri = self.url("/_health/");
        config.sentry.organization_slug = "acme".to_string();
        config.sentry.project_id = "42".to_string();
        config.sentry.bearer_auth = SENTRY_TOKEN.to_string();
        config.mailgun.base_uri = self.base_url.clone();
        config.mailgun.api_name = "mg.example.test".to_string();
        config.mailgun.api_key = MAILGUN_KEY.to_string();
        config
    }
}

impl Drop for MockUpstream {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Address nothing listens on
pub async fn closed_port_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    format!("http://{addr}/")
}

async fn upstream(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Response {
    let path = uri.path().to_string();

    if path.contains("/status/500") {
        return (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response();
    }
    if path.contains("/status/404") {
        return (StatusCode::NOT_FOUND, "missing").into_response();
    }
    if path == "/not-json" {
        return (
            [(header::CONTENT_TYPE, "text/html")],
            "<html>maintenance</html>",
        )
            .into_response();
    }
    if path == "/slow" {
        tokio::time::sleep(Duration::from_secs(3)).await;
        return Json(json!({"late": true})).into_response();
    }
    if path == "/fixed/a-one" {
        return Json(json!({"a": 1})).into_response();
    }
    if path == "/fixed/total" {
        return Json(json!({"total": 42})).into_response();
    }
    if path == "/fixed/list" {
        return Json(json!([1, "two", null])).into_response();
    }
    if path == "/_health/" {
        return Json(json!({"ok": true})).into_response();
    }
    if method == Method::GET && path == "/api/0/projects/acme/42/issues/" {
        return Json(json!([
            {
                "id": "12345",
                "shortId": "AUTH-001",
                "title": "TypeError in user authentication module",
                "level": "error",
                "lastSeen": "2024-05-01T10:00:00Z",
                "project": {"name": "dashboard"}
            },
            {
                "id": "67890",
                "title": "API rate limit exceeded",
                "level": "warning",
                "query": uri.query()
            }
        ]))
        .into_response();
    }

    let body_json = serde_json::from_slice::<Value>(&body).unwrap_or(Value::Null);
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string);

    Json(json!({
        "method": method.as_str(),
        "path": path,
        "query": uri.query(),
        "body": body_json,
        "authorization": authorization,
    }))
    .into_response()
}
