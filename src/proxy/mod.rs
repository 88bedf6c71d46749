// proxy module - dashboard REST gateway

pub mod config;
pub mod filter;
pub mod server;

pub mod common; // Shared handler helpers
pub mod handlers; // API endpoint handlers
pub mod mappers; // Upstream payload reshaping
pub mod middleware; // Axum middleware
pub mod upstream; // Upstream client

pub use config::ProxyConfig;
pub use filter::{filter_request_data, Operation};
pub use server::{build_app, build_router, AppState, AxumServer, GatewayApp};
pub use upstream::{HttpMethod, TransportOptions, UpstreamClient};
