// Utility functions shared by handlers

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{Map, Value};
use url::Url;

use crate::error::{AppError, AppResult};

/// Append path segments to a base URI, percent-encoding each segment.
///
/// An empty last segment produces a trailing slash.
pub fn join_uri(base: &str, segments: &[&str]) -> AppResult<String> {
    let mut url = Url::parse(base)
        .map_err(|e| AppError::Configuration(format!("Invalid base URI {:?}: {}", base, e)))?;

    url.path_segments_mut()
        .map_err(|_| AppError::Configuration(format!("Base URI cannot take a path: {}", base)))?
        .pop_if_empty()
        .extend(segments);

    Ok(url.to_string())
}

/// Inbound JSON object payload.
///
/// An empty body is an empty payload. Anything else must be a JSON object:
/// malformed JSON is rejected with 400 and other JSON values with 422, the
/// same rejections axum's `Json` extractor produces. The content type is not
/// checked.
#[derive(Debug, Clone, Default)]
pub struct JsonPayload(pub Map<String, Value>);

#[async_trait]
impl<S> FromRequest<S> for JsonPayload
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = Bytes::from_request(req, state)
            .await
            .map_err(IntoResponse::into_response)?;

        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }

        let Json(payload) = Json::<Map<String, Value>>::from_bytes(&body).map_err(|rejection| {
            tracing::debug!("Rejected request body: {}", rejection.body_text());
            rejection.into_response()
        })?;
        Ok(Self(payload))
    }
}
