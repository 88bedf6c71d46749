use std::fs;
use std::path::{Path, PathBuf};

use crate::models::AppConfig;

const DATA_DIR: &str = ".dashboard_gateway";
const CONFIG_FILE: &str = "config.json";
const CONFIG_PATH_ENV: &str = "DASHBOARD_GATEWAY_CONFIG";

/// Get data directory path, creating it if needed
pub fn get_data_dir() -> Result<PathBuf, String> {
    let home = dirs::home_dir().ok_or("Failed to get user home directory")?;
    let data_dir = home.join(DATA_DIR);

    if !data_dir.exists() {
        fs::create_dir_all(&data_dir)
            .map_err(|e| format!("Failed to create data directory: {}", e))?;
    }

    Ok(data_dir)
}

/// Resolve the config file: explicit env path first, then the data directory
fn config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        return Some(PathBuf::from(path));
    }
    dirs::home_dir().map(|home| home.join(DATA_DIR).join(CONFIG_FILE))
}

/// Load application config: defaults, then the config file, then the process environment
pub fn load_app_config() -> Result<AppConfig, String> {
    let config = match config_path() {
        Some(path) if path.exists() => load_config_file(&path)?,
        _ => AppConfig::new(),
    };

    apply_env_overrides(config, |key| std::env::var(key).ok())
}

/// Read a JSON config file; missing sections fall back to defaults
pub fn load_config_file(path: &Path) -> Result<AppConfig, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config file {}: {}", path.display(), e))?;

    serde_json::from_str(&content).map_err(|e| format!("Failed to parse config file: {}", e))
}

/// Override config values from environment variables.
///
/// `lookup` abstracts the environment so callers can inject values.
pub fn apply_env_overrides<F>(mut config: AppConfig, lookup: F) -> Result<AppConfig, String>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(port) = lookup("PORT") {
        config.proxy.port = port
            .parse()
            .map_err(|e| format!("Invalid PORT {:?}: {}", port, e))?;
    }
    if let Some(timeout) = lookup("GATEWAY_REQUEST_TIMEOUT") {
        config.proxy.request_timeout = timeout
            .parse()
            .map_err(|e| format!("Invalid GATEWAY_REQUEST_TIMEOUT {:?}: {}", timeout, e))?;
    }
    if let Some(allow_lan) = lookup("GATEWAY_ALLOW_LAN") {
        config.proxy.allow_lan_access = matches!(allow_lan.to_ascii_lowercase().as_str(), "1" | "true" | "yes");
    }

    if let Some(v) = lookup("SENTRY_BASE_URI") {
        config.sentry.base_uri = v;
    }
    if let Some(v) = lookup("SENTRY_ORGANIZATION_SLUG") {
        config.sentry.organization_slug = v;
    }
    if let Some(v) = lookup("SENTRY_PROJECT_ID") {
        config.sentry.project_id = v;
    }
    if let Some(v) = lookup("SENTRY_BEARER_AUTH") {
        config.sentry.bearer_auth = v;
    }

    if let Some(v) = lookup("MAILGUN_BASE_URI") {
        config.mailgun.base_uri = v;
    }
    if let Some(v) = lookup("MAILGUN_API_NAME") {
        config.mailgun.api_name = v;
    }
    if let Some(v) = lookup("MAILGUN_API_KEY") {
        config.mailgun.api_key = v;
    }

    if let Some(v) = lookup("HUBSPOT_ACCESS_TOKEN") {
        config.hubspot.access_token = Some(v);
    }

    // Base URIs are joined with path suffixes
    config.sentry.base_uri = config.sentry.base_uri.trim_end_matches('/').to_string();
    config.mailgun.base_uri = config.mailgun.base_uri.trim_end_matches('/').to_string();

    Ok(config)
}
