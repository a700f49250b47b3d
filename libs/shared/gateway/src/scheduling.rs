use std::time::Duration;

use reqwest::{
    header::{HeaderMap, HeaderValue, CONTENT_TYPE},
    Client, Method,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error};

use shared_config::AppConfig;

/// Classified failure of a scheduling-service call. Cells map these into
/// their own error taxonomy; raw transport errors never cross a cell boundary.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Scheduling service error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Scheduling service request timed out")]
    Timeout,

    #[error("Scheduling service unreachable: {0}")]
    Transport(String),

    #[error("Unexpected scheduling service response: {0}")]
    Decode(String),
}

impl GatewayError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, GatewayError::Api { status: 409, .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, GatewayError::Api { status: 404, .. })
    }

    /// Timeouts, connection failures and 5xx responses are uniformly
    /// recoverable: the caller may retry the same action.
    pub fn is_transient(&self) -> bool {
        match self {
            GatewayError::Timeout | GatewayError::Transport(_) => true,
            GatewayError::Api { status, .. } => *status >= 500,
            GatewayError::Decode(_) => false,
        }
    }
}

pub struct SchedulingClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl SchedulingClient {
    pub fn new(config: &AppConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: config.scheduling_api_url.clone(),
            api_key: config.scheduling_api_key.clone(),
        }
    }

    fn get_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();

        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Ok(key) = HeaderValue::from_str(&self.api_key) {
            headers.insert("x-api-key", key);
        }

        headers
    }

    pub async fn request<T>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<T, GatewayError>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making request to {}", url);

        let mut req = self.client.request(method, &url).headers(self.get_headers());

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await.map_err(|e| {
            if e.is_timeout() {
                GatewayError::Timeout
            } else {
                GatewayError::Transport(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let raw = response.text().await.unwrap_or_default();
            let message = extract_service_message(&raw);
            error!("API error ({}): {}", status, message);

            return Err(GatewayError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| GatewayError::Decode(e.to_string()))
    }

    pub fn get_base_url(&self) -> &str {
        &self.base_url
    }
}

/// Prefer the service's own message field over the raw body.
fn extract_service_message(raw: &str) -> String {
    serde_json::from_str::<Value>(raw)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_owned))
        .unwrap_or_else(|| raw.to_string())
}
