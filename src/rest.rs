//! Generic REST Client
//!
//! Authenticated JSON calls against a base URL. Every request carries a bearer token from the
//! configured [`TokenSource`] and JSON content-type/accept headers. Any status outside 2xx is
//! returned as [`ApiError::Status`] with the raw body; this layer never retries.

use crate::error::ApiError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

pub mod token;
pub mod transport;

pub use reqwest::Method;
pub use token::{CommandToken, EnvToken, StaticToken, TokenSource};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, MockTransport, ReqwestTransport};

const JSON_CONTENT_TYPE: &str = "application/json";

/// JSON client bound to one API base URL.
#[derive(Clone)]
pub struct RestClient {
    base_url: String,
    transport: Arc<dyn HttpTransport>,
    tokens: Arc<dyn TokenSource>,
}

impl RestClient {
    pub fn new(
        base_url: impl Into<String>,
        transport: Arc<dyn HttpTransport>,
        tokens: Arc<dyn TokenSource>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            transport,
            tokens,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `{base}/{path}`, with exactly one slash at the seam.
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Send a GET request and return the parsed JSON body.
    pub async fn get(&self, path: &str) -> Result<Value, ApiError> {
        let request = self.build_request(Method::GET, path, None)?;
        self.request(request).await
    }

    /// Send a non-GET request (POST by default at call sites), with an optional JSON payload.
    pub async fn mutate(
        &self,
        path: &str,
        payload: Option<&Value>,
        method: Method,
    ) -> Result<Value, ApiError> {
        let body = payload
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| ApiError::Decode(format!("Failed to serialize payload: {}", e)))?;
        let request = self.build_request(method, path, body)?;
        self.request(request).await
    }

    /// Typed GET.
    pub async fn get_as<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        decode(self.get(path).await?)
    }

    /// Typed mutation: serializes `payload` and decodes the response into `T`.
    pub async fn mutate_as<P: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        payload: &P,
        method: Method,
    ) -> Result<T, ApiError> {
        let payload = serde_json::to_value(payload)
            .map_err(|e| ApiError::Decode(format!("Failed to serialize payload: {}", e)))?;
        decode(self.mutate(path, Some(&payload), method).await?)
    }

    fn build_request(
        &self,
        method: Method,
        path: &str,
        body: Option<String>,
    ) -> Result<HttpRequest, ApiError> {
        let token = self.tokens.access_token()?;
        Ok(HttpRequest {
            method,
            url: self.url(path),
            headers: vec![
                ("Authorization".to_string(), format!("Bearer {}", token)),
                ("Accept".to_string(), JSON_CONTENT_TYPE.to_string()),
                ("Content-Type".to_string(), JSON_CONTENT_TYPE.to_string()),
            ],
            body,
        })
    }

    async fn request(&self, request: HttpRequest) -> Result<Value, ApiError> {
        let method = request.method.clone();
        let url = request.url.clone();
        let response = self.transport.send(request).await?;
        debug!(%method, %url, status = response.status, "API round trip");
        classify_response(response.status, &response.body)
    }
}

/// Turn a raw response into JSON. Non-2xx statuses fail; an empty body is an empty object.
pub fn classify_response(status: u16, body: &str) -> Result<Value, ApiError> {
    if status / 100 != 2 {
        return Err(ApiError::Status {
            code: status,
            message: body.to_string(),
        });
    }
    if body.trim().is_empty() {
        return Ok(Value::Object(serde_json::Map::new()));
    }
    serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
}
