// Upstream module - forwarding to Sentry, Mailgun and HubSpot

pub mod client;
pub mod options;

pub use client::UpstreamClient;
pub use options::{BasicAuth, HttpMethod, TransportOptions};
