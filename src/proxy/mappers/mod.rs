// Mappers - reshape upstream payloads for the dashboard

pub mod sentry;

pub use sentry::{transform_issues_to_alerts, SentryAlert};
