use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    /// The calling code is wrong: unknown operation, unsupported method,
    /// or static configuration that cannot be turned into a request.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Request error on {method} request to {uri} with {params}: upstream returned {status}: {detail}")]
    UpstreamHttp {
        method: String,
        uri: String,
        params: String,
        status: u16,
        detail: String,
    },

    #[error("Request error on {method} request to {uri} with {params}: {detail}")]
    Transport {
        method: String,
        uri: String,
        params: String,
        detail: String,
    },

    #[error("Request error on {method} request to {uri} with {params}: could not decode response: {detail}")]
    ResponseDecode {
        method: String,
        uri: String,
        params: String,
        detail: String,
    },
}

impl AppError {
    /// True for the failures a single outbound call can produce.
    pub fn is_forward_failure(&self) -> bool {
        matches!(
            self,
            AppError::UpstreamHttp { .. } | AppError::Transport { .. } | AppError::ResponseDecode { .. }
        )
    }

    pub fn status_code(&self) -> StatusCode {
        if self.is_forward_failure() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status_code(), self.to_string()).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_failures_map_to_bad_request() {
        let err = AppError::UpstreamHttp {
            method: "GET".into(),
            uri: "https://api.example.test/v3/stats/total".into(),
            params: "{}".into(),
            status: 404,
            detail: "not found".into(),
        };
        assert!(err.is_forward_failure());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let text = err.to_string();
        assert!(text.starts_with("Request error on GET request to https://api.example.test/v3/stats/total"));
        assert!(text.contains("404"));
    }

    #[test]
    fn configuration_is_a_server_fault() {
        let err = AppError::Configuration("unknown operation: get_bogus".into());
        assert!(!err.is_forward_failure());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
