use crate::proxy::ProxyConfig;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Application configuration, built once at startup
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub proxy: ProxyConfig,
    #[serde(default)]
    pub sentry: SentryConfig,
    #[serde(default)]
    pub mailgun: MailgunConfig,
    #[serde(default)]
    pub hubspot: HubSpotConfig,
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Error-tracking upstream
#[derive(Clone, Serialize, Deserialize)]
pub struct SentryConfig {
    #[serde(default = "default_sentry_base_uri")]
    pub base_uri: String,
    #[serde(default = "default_sentry_health_uri")]
    pub health_uri: String,
    #[serde(default)]
    pub organization_slug: String,
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub bearer_auth: String,
}

impl Default for SentryConfig {
    fn default() -> Self {
        Self {
            base_uri: default_sentry_base_uri(),
            health_uri: default_sentry_health_uri(),
            organization_slug: String::new(),
            project_id: String::new(),
            bearer_auth: String::new(),
        }
    }
}

impl SentryConfig {
    pub fn auth_header(&self) -> (String, String) {
        ("Authorization".to_string(), format!("Bearer {}", self.bearer_auth))
    }
}

impl fmt::Debug for SentryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SentryConfig")
            .field("base_uri", &self.base_uri)
            .field("health_uri", &self.health_uri)
            .field("organization_slug", &self.organization_slug)
            .field("project_id", &self.project_id)
            .field("bearer_auth", &redact(&self.bearer_auth))
            .finish()
    }
}

/// Transactional-email upstream
#[derive(Clone, Serialize, Deserialize)]
pub struct MailgunConfig {
    #[serde(default = "default_mailgun_base_uri")]
    pub base_uri: String,
    /// Sending domain
    #[serde(default)]
    pub api_name: String,
    #[serde(default)]
    pub api_key: String,
}

impl Default for MailgunConfig {
    fn default() -> Self {
        Self {
            base_uri: default_mailgun_base_uri(),
            api_name: String::new(),
            api_key: String::new(),
        }
    }
}

impl MailgunConfig {
    /// Mailgun uses basic auth with the fixed user "api"
    pub const AUTH_USER: &'static str = "api";
}

impl fmt::Debug for MailgunConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailgunConfig")
            .field("base_uri", &self.base_uri)
            .field("api_name", &self.api_name)
            .field("api_key", &redact(&self.api_key))
            .finish()
    }
}

/// CRM upstream. No route forwards to it yet; its status check is simulated.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct HubSpotConfig {
    #[serde(default)]
    pub access_token: Option<String>,
}

impl fmt::Debug for HubSpotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HubSpotConfig")
            .field("access_token", &self.access_token.as_deref().map(redact))
            .finish()
    }
}

fn redact(secret: &str) -> &'static str {
    if secret.is_empty() {
        "<unset>"
    } else {
        "<redacted>"
    }
}

fn default_sentry_base_uri() -> String {
    "https://sentry.io/api/0".to_string()
}

fn default_sentry_health_uri() -> String {
    "https://sentry.io/_health/".to_string()
}

fn default_mailgun_base_uri() -> String {
    "https://api.mailgun.net".to_string()
}
