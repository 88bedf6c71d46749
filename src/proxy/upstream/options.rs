// Outbound call description
// Assembled by handlers, consumed verbatim by UpstreamClient::make_request

use serde_json::{json, Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::error::AppError;

const REDACTED: &str = "<redacted>";

/// The only verbs the gateway forwards with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Put,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Put => "PUT",
            HttpMethod::Post => "POST",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "get" => Ok(HttpMethod::Get),
            "put" => Ok(HttpMethod::Put),
            "post" => Ok(HttpMethod::Post),
            other => Err(AppError::Configuration(format!(
                "Invalid request type {:?} (only \"get\", \"put\", and \"post\" are allowed)",
                other
            ))),
        }
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Post => reqwest::Method::POST,
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct BasicAuth {
    pub username: String,
    pub password: Option<String>,
}

/// One outbound call: target, verb, and the transport fields passed through to reqwest
#[derive(Clone)]
pub struct TransportOptions {
    pub uri: String,
    pub method: HttpMethod,
    pub headers: Vec<(String, String)>,
    pub basic_auth: Option<BasicAuth>,
    pub bearer_auth: Option<String>,
    pub query: Option<Map<String, Value>>,
    pub json: Option<Value>,
}

impl TransportOptions {
    pub fn new(method: HttpMethod, uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            method,
            headers: Vec::new(),
            basic_auth: None,
            bearer_auth: None,
            query: None,
            json: None,
        }
    }

    pub fn get(uri: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, uri)
    }

    pub fn put(uri: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, uri)
    }

    pub fn post(uri: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, uri)
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.headers
            .extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn basic_auth(mut self, username: impl Into<String>, password: Option<String>) -> Self {
        self.basic_auth = Some(BasicAuth {
            username: username.into(),
            password,
        });
        self
    }

    pub fn bearer_auth(mut self, token: impl Into<String>) -> Self {
        self.bearer_auth = Some(token.into());
        self
    }

    pub fn query(mut self, params: Map<String, Value>) -> Self {
        self.query = Some(params);
        self
    }

    pub fn json(mut self, body: impl Into<Value>) -> Self {
        self.json = Some(body.into());
        self
    }

    /// Flatten the JSON query object into url pairs.
    ///
    /// Arrays repeat the key, nested objects are sent as JSON text, nulls are skipped.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        let Some(query) = &self.query else {
            return pairs;
        };

        for (key, value) in query {
            match value {
                Value::Array(items) => {
                    for item in items {
                        if let Some(text) = query_text(item) {
                            pairs.push((key.clone(), text));
                        }
                    }
                }
                other => {
                    if let Some(text) = query_text(other) {
                        pairs.push((key.clone(), text));
                    }
                }
            }
        }
        pairs
    }

    /// Everything but method and uri, with credentials masked. Used in error text and logs.
    pub fn params_summary(&self) -> String {
        let mut summary = Map::new();

        if !self.headers.is_empty() {
            let headers: Map<String, Value> = self
                .headers
                .iter()
                .map(|(name, value)| {
                    let shown = if is_sensitive_header(name) {
                        REDACTED.to_string()
                    } else {
                        value.clone()
                    };
                    (name.clone(), Value::String(shown))
                })
                .collect();
            summary.insert("headers".into(), Value::Object(headers));
        }
        if let Some(auth) = &self.basic_auth {
            summary.insert("auth".into(), json!([auth.username, REDACTED]));
        }
        if self.bearer_auth.is_some() {
            summary.insert("bearer_auth".into(), json!(REDACTED));
        }
        if let Some(query) = &self.query {
            summary.insert("params".into(), Value::Object(query.clone()));
        }
        if let Some(body) = &self.json {
            summary.insert("json".into(), body.clone());
        }

        Value::Object(summary).to_string()
    }
}

impl fmt::Debug for TransportOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportOptions")
            .field("method", &self.method)
            .field("uri", &self.uri)
            .field("params", &self.params_summary())
            .finish()
    }
}

fn query_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        nested => Some(nested.to_string()),
    }
}

fn is_sensitive_header(name: &str) -> bool {
    let name = name.to_ascii_lowercase();
    name == "authorization" || name == "proxy-authorization" || name.contains("api-key") || name.contains("token")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_parse_is_case_insensitive() {
        assert_eq!("get".parse::<HttpMethod>().unwrap(), HttpMethod::Get);
        assert_eq!("PUT".parse::<HttpMethod>().unwrap(), HttpMethod::Put);
        assert_eq!("Post".parse::<HttpMethod>().unwrap(), HttpMethod::Post);
    }

    #[test]
    fn test_unsupported_method_is_configuration_error() {
        let err = "delete".parse::<HttpMethod>().unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
        assert!("patch".parse::<HttpMethod>().is_err());
    }

    #[test]
    fn test_query_pairs_flatten_json() {
        let query = json!({
            "event": ["accepted", "delivered"],
            "limit": 10,
            "subscribed": true,
            "skip": null,
            "filter": {"domain": "mg.example.test"}
        });
        let options = TransportOptions::get("https://api.example.test/v3/stats/total")
            .query(query.as_object().cloned().unwrap());

        let mut pairs = options.query_pairs();
        pairs.sort();
        assert_eq!(
            pairs,
            vec![
                ("event".to_string(), "accepted".to_string()),
                ("event".to_string(), "delivered".to_string()),
                ("filter".to_string(), "{\"domain\":\"mg.example.test\"}".to_string()),
                ("limit".to_string(), "10".to_string()),
                ("subscribed".to_string(), "true".to_string()),
            ]
        );
    }

    #[test]
    fn test_params_summary_redacts_credentials() {
        let options = TransportOptions::put("https://sentry.example.test/api/0/issues/1/")
            .header("Authorization", "Bearer sntrys_secret")
            .header("Accept", "application/json")
            .basic_auth("api", Some("key-123".into()))
            .json(json!({"status": "resolved"}));

        let summary = options.params_summary();
        assert!(!summary.contains("sntrys_secret"));
        assert!(!summary.contains("key-123"));
        assert!(summary.contains("application/json"));
        assert!(summary.contains("resolved"));

        let debug = format!("{:?}", options);
        assert!(!debug.contains("sntrys_secret"));
        assert!(debug.contains("PUT"));
    }
}
