use crate::models::AppConfig;
use crate::proxy::upstream::UpstreamClient;
use axum::{
    response::{IntoResponse, Json, Response},
    routing::{get, put},
    Router,
};
use std::sync::Arc;
use tokio::sync::oneshot;
use tower_http::normalize_path::NormalizePath;
use tower_http::trace::TraceLayer;
use tracing::{debug, error};

/// Axum application state. Read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub upstream: Arc<UpstreamClient>,
}

impl AppState {
    pub fn new(config: Arc<AppConfig>) -> Result<Self, String> {
        let upstream = UpstreamClient::new(&config.proxy).map_err(|e| e.to_string())?;
        Ok(Self {
            config,
            upstream: Arc::new(upstream),
        })
    }
}

/// The served application: routes behind trailing-slash normalization
pub type GatewayApp = NormalizePath<Router>;

/// Routes plus path normalization, so `/api/sentry/issues/` and
/// `/api/sentry/issues` reach the same handler
pub fn build_app(state: AppState) -> GatewayApp {
    NormalizePath::trim_trailing_slash(build_router(state))
}

/// Build the gateway routes. Paths are registered without a trailing slash.
pub fn build_router(state: AppState) -> Router {
    use crate::proxy::handlers::{integrations, mailgun, sentry};

    Router::new()
        // Sentry
        .route(
            "/api/sentry/issues/:issue_id/events",
            get(sentry::handle_get_issue_events),
        )
        .route(
            "/api/sentry/issues/:issue_id",
            put(sentry::handle_update_issue_status),
        )
        .route("/api/sentry/issues", get(sentry::handle_get_issues))
        .route("/api/sentry/events", get(sentry::handle_get_events))
        .route("/api/sentry/alerts", get(sentry::handle_get_alerts))
        .route(
            "/api/sentry/members",
            get(sentry::handle_get_organization_members),
        )
        // Integration status
        .route(
            "/api/sentry/integration-status",
            get(integrations::handle_sentry_integration_status),
        )
        .route(
            "/api/hubspot/integration-status",
            get(integrations::handle_hubspot_integration_status),
        )
        // Mailgun
        .route(
            "/api/mailgun/queue-status",
            get(mailgun::handle_get_queue_status),
        )
        .route(
            "/api/mailgun/account-metrics",
            put(mailgun::handle_get_account_metrics),
        )
        .route(
            "/api/mailgun/account-usage-metrics",
            put(mailgun::handle_get_account_usage_metrics),
        )
        .route("/api/mailgun/logs", put(mailgun::handle_get_logs))
        .route(
            "/api/mailgun/stats/totals",
            put(mailgun::handle_get_stat_totals),
        )
        .route(
            "/api/mailgun/stats/filter",
            put(mailgun::handle_get_filtered_grouped_stats),
        )
        .route(
            "/api/mailgun/mailing-lists",
            put(mailgun::handle_get_mailing_lists),
        )
        .route(
            "/api/mailgun/mailing-list-members/:list_address",
            put(mailgun::handle_get_mailing_list_members),
        )
        .route("/health", get(health_check_handler))
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(
            crate::proxy::middleware::logging_middleware,
        ))
        .layer(crate::proxy::middleware::cors_layer())
        .with_state(state)
}

/// Axum server instance
pub struct AxumServer {
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl AxumServer {
    /// Start Axum server
    pub async fn start(config: Arc<AppConfig>) -> Result<(Self, tokio::task::JoinHandle<()>), String> {
        let addr = format!("{}:{}", config.proxy.get_bind_address(), config.proxy.port);
        let state = AppState::new(config)?;
        let app = build_app(state);

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| format!("Failed to bind address {}: {}", addr, e))?;
        let local_addr = listener
            .local_addr()
            .map_err(|e| format!("Failed to read local address: {}", e))?;

        tracing::info!("Dashboard gateway started at http://{}", local_addr);

        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

        let server_instance = Self {
            shutdown_tx: Some(shutdown_tx),
        };

        let handle = tokio::spawn(async move {
            use hyper::server::conn::http1;
            use hyper_util::rt::TokioIo;
            use hyper_util::service::TowerToHyperService;

            loop {
                tokio::select! {
                    res = listener.accept() => {
                        match res {
                            Ok((stream, _)) => {
                                let io = TokioIo::new(stream);
                                let service = TowerToHyperService::new(app.clone());

                                tokio::task::spawn(async move {
                                    if let Err(err) = http1::Builder::new()
                                        .serve_connection(io, service)
                                        .await
                                    {
                                        debug!("Connection handling finished or errored: {:?}", err);
                                    }
                                });
                            }
                            Err(e) => {
                                error!("Failed to accept connection: {:?}", e);
                            }
                        }
                    }
                    _ = &mut shutdown_rx => {
                        tracing::info!("Dashboard gateway stopped listening");
                        break;
                    }
                }
            }
        });

        Ok((server_instance, handle))
    }

    /// Stop server
    pub fn stop(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Health check handler
async fn health_check_handler() -> Response {
    Json(serde_json::json!({
        "status": "ok"
    }))
    .into_response()
}
