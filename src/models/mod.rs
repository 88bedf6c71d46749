pub mod config;
pub mod integration;

pub use config::{AppConfig, HubSpotConfig, MailgunConfig, SentryConfig};
pub use integration::IntegrationStatus;
