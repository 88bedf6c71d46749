// Upstream client implementation
// One outbound call per inbound request: no retries, failures normalized into AppError

use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue},
    Client,
};
use serde_json::Value;
use std::time::Instant;

use super::options::TransportOptions;
use crate::error::{AppError, AppResult};
use crate::proxy::config::ProxyConfig;

pub struct UpstreamClient {
    http_client: Client,
}

impl UpstreamClient {
    pub fn new(config: &ProxyConfig) -> AppResult<Self> {
        let http_client = crate::utils::http::create_client_with_proxy(
            config.request_timeout,
            Some(&config.upstream_proxy),
        )?;
        Ok(Self { http_client })
    }

    /// Perform the call described by `options` and return the upstream JSON untouched.
    ///
    /// Non-2xx statuses, transport faults and non-JSON bodies all come back as
    /// `Err`, after a diagnostic trace has been written.
    pub async fn make_request(&self, options: &TransportOptions) -> AppResult<Value> {
        let result = self.dispatch(options).await;

        if let Err(e) = &result {
            tracing::error!(
                method = %options.method,
                uri = %options.uri,
                params = %options.params_summary(),
                "{}",
                e
            );
        }

        result
    }

    async fn dispatch(&self, options: &TransportOptions) -> AppResult<Value> {
        let headers = build_headers(options)?;

        let mut request = self
            .http_client
            .request(options.method.into(), &options.uri)
            .headers(headers);

        if let Some(auth) = &options.basic_auth {
            request = request.basic_auth(&auth.username, auth.password.as_ref());
        }
        if let Some(token) = &options.bearer_auth {
            request = request.bearer_auth(token);
        }
        if options.query.is_some() {
            request = request.query(&options.query_pairs());
        }
        if let Some(body) = &options.json {
            request = request.json(body);
        }

        tracing::debug!("Forwarding {} {}", options.method, options.uri);

        let response = request
            .send()
            .await
            .map_err(|e| transport_error(options, &e))?;

        let status = response.status();
        if !status.is_success() {
            let reason = status.canonical_reason().unwrap_or("unknown status");
            let detail = match response.text().await {
                Ok(body) if body.is_empty() => reason.to_string(),
                Ok(body) => body,
                Err(e) => format!("{} (failed to read response body: {})", reason, e),
            };
            return Err(AppError::UpstreamHttp {
                method: options.method.to_string(),
                uri: options.uri.clone(),
                params: options.params_summary(),
                status: status.as_u16(),
                detail,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| transport_error(options, &e))?;

        serde_json::from_str(&body).map_err(|e| AppError::ResponseDecode {
            method: options.method.to_string(),
            uri: options.uri.clone(),
            params: options.params_summary(),
            detail: e.to_string(),
        })
    }

    /// Probe a health endpoint. Returns the status code and elapsed milliseconds.
    pub async fn check_health(&self, uri: &str, bearer_token: Option<&str>) -> Result<(u16, f64), String> {
        let mut request = self.http_client.get(uri);
        if let Some(token) = bearer_token {
            request = request.bearer_auth(token);
        }

        let start = Instant::now();
        let response = request.send().await.map_err(|e| e.to_string())?;
        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

        Ok((response.status().as_u16(), elapsed_ms))
    }
}

fn build_headers(options: &TransportOptions) -> AppResult<HeaderMap> {
    let mut headers = HeaderMap::new();
    for (name, value) in &options.headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| AppError::Configuration(format!("Invalid header name {:?}: {}", name, e)))?;
        let header_value = HeaderValue::from_str(value)
            .map_err(|e| AppError::Configuration(format!("Invalid value for header {}: {}", name, e)))?;
        headers.append(header_name, header_value);
    }
    Ok(headers)
}

fn transport_error(options: &TransportOptions, e: &reqwest::Error) -> AppError {
    let detail = if e.is_timeout() {
        format!("timed out: {}", e)
    } else if e.is_connect() {
        format!("connection failed: {}", e)
    } else {
        e.to_string()
    };

    AppError::Transport {
        method: options.method.to_string(),
        uri: options.uri.clone(),
        params: options.params_summary(),
        detail,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::fmt::MakeWriter;

    /// In-memory sink for formatted trace output
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedLogs {
        type Writer = CapturedLogs;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn test_build_headers_rejects_invalid_value() {
        let options = TransportOptions::get("https://sentry.example.test/api/0/")
            .header("Authorization", "Bearer line\nbreak");
        let err = build_headers(&options).unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
    }

    #[test]
    fn test_build_headers_keeps_all_values() {
        let options = TransportOptions::get("https://sentry.example.test/api/0/")
            .header("Accept", "application/json")
            .header("X-Trace", "a")
            .header("X-Trace", "b");
        let headers = build_headers(&options).unwrap();
        assert_eq!(headers.get_all("x-trace").iter().count(), 2);
        assert_eq!(headers["accept"], "application/json");
    }

    #[tokio::test]
    async fn test_malformed_uri_is_transport_error() {
        let client = UpstreamClient::new(&ProxyConfig::default()).unwrap();
        let err = client
            .make_request(&TransportOptions::get("not a uri"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Transport { .. }));
        assert!(err.to_string().contains("GET request to not a uri"));
    }

    #[tokio::test]
    async fn test_failure_is_traced_without_credentials() {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::ERROR)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let client = UpstreamClient::new(&ProxyConfig::default()).unwrap();
        let options = TransportOptions::put("not a uri")
            .header("Authorization", "Bearer sntrys_secret")
            .basic_auth("api", Some("key-123".into()))
            .json(serde_json::json!({"status": "resolved"}));
        let err = client.make_request(&options).await.unwrap_err();

        let output = logs.contents();
        assert!(output.contains("ERROR"), "{output}");
        assert!(output.contains("method=PUT"), "{output}");
        assert!(output.contains("uri=not a uri"), "{output}");
        assert!(output.contains("resolved"), "{output}");
        assert!(output.contains(&err.to_string()), "{output}");
        assert!(!output.contains("sntrys_secret"), "{output}");
        assert!(!output.contains("key-123"), "{output}");
    }
}
