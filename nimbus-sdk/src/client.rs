//! HTTP transport: signing, the common response envelope, and error-body
//! parsing. One request-response cycle per call, on the caller's task.

use reqwest::StatusCode;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::{Config, Service};
use crate::error::{ApiError, Result};
use crate::sign;
use crate::types::{CommonResponse, ErrorBody};

/// Client for the cloud API gateway.
pub struct ApiClient {
    http: reqwest::Client,
    config: Config,
}

impl ApiClient {
    pub fn new(config: Config) -> Result<Self> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Issue an action call: POST JSON to `{base}{prefix}/{action}`.
    ///
    /// The success body carries the envelope fields beside the payload; a
    /// non-zero `returnCode` is surfaced as an API error even on HTTP 200.
    pub(crate) async fn post<P, T>(&self, service: Service, action: &'static str, params: &P) -> Result<T>
    where
        P: Serialize,
        T: DeserializeOwned,
    {
        let path = format!("{}/{}", service.prefix(), action);
        debug!(
            action,
            params = %serde_json::to_string(params).unwrap_or_default(),
            "request"
        );

        let request = self
            .signed(reqwest::Method::POST, &path)
            .json(params)
            .send()
            .await?;
        let body = self.read_body(action, request).await?;

        let envelope: CommonResponse =
            serde_json::from_str(&body).map_err(|source| ApiError::Decode { action, source })?;
        debug!(
            action,
            request_id = envelope.request_id.as_deref().unwrap_or("-"),
            return_code = envelope.return_code.as_deref().unwrap_or("-"),
            "response"
        );
        if let Some(code) = &envelope.return_code
            && code != "0"
        {
            return Err(ApiError::Api {
                return_code: code.clone(),
                return_message: envelope.return_message.unwrap_or_default(),
                request_id: envelope.request_id,
            });
        }

        serde_json::from_str(&body).map_err(|source| ApiError::Decode { action, source })
    }

    /// Issue a plain GET to `{base}{prefix}{path}` (metadata services carry
    /// no envelope).
    pub(crate) async fn get<T>(&self, service: Service, path: &str, action: &'static str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let full = format!("{}{}", service.prefix(), path);
        debug!(action, path = %full, "request");

        let request = self.signed(reqwest::Method::GET, &full).send().await?;
        let body = self.read_body(action, request).await?;

        serde_json::from_str(&body).map_err(|source| ApiError::Decode { action, source })
    }

    fn signed(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let timestamp = sign::now_millis();
        let signature = sign::signature(
            &self.config.secret_key,
            method.as_str(),
            path,
            &timestamp,
            &self.config.access_key,
        );
        self.http
            .request(method, format!("{}{}", self.config.base_url(), path))
            .header(sign::HEADER_TIMESTAMP, timestamp)
            .header(sign::HEADER_ACCESS_KEY, &self.config.access_key)
            .header(sign::HEADER_SIGNATURE, signature)
    }

    async fn read_body(&self, action: &'static str, response: reqwest::Response) -> Result<String> {
        let status = response.status();
        let body = response.text().await?;
        if status.is_success() {
            return Ok(body);
        }
        debug!(action, status = %status, body = %body, "error response");
        Err(parse_error_body(status, &body))
    }
}

/// Parse an error body into its return code and message. A body that does
/// not match the documented shape is a fatal, non-retryable condition.
fn parse_error_body(status: StatusCode, body: &str) -> ApiError {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => ApiError::Api {
            return_code: parsed.response_error.return_code,
            return_message: parsed.response_error.return_message,
            request_id: None,
        },
        Err(_) => ApiError::MalformedErrorBody(format!("status {status}: {body}")),
    }
}
