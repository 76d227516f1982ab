//! reqwest-backed auth gateway.
//!
//! Thin HTTP wrapper for `POST /auth/login` and `POST /auth/register`.
//! Response classification lives in pure functions for testability.

#[cfg(test)]
#[path = "http_test.rs"]
mod http_test;

use super::AuthGateway;
use super::types::{
    ErrorBody, GatewayError, LOGIN_FAILED_MESSAGE, LoginRequest, LoginResponse, REGISTER_FAILED_MESSAGE,
    RegisterRequest,
};
use crate::config::AuthConfig;

const LOGIN_PATH: &str = "/auth/login";
const REGISTER_PATH: &str = "/auth/register";

// =============================================================================
// CLIENT
// =============================================================================

pub struct HttpGateway {
    http: reqwest::Client,
    config: AuthConfig,
}

impl HttpGateway {
    /// Build a gateway with the configured base URL and timeouts.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(config: AuthConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(config.timeouts.request())
            .connect_timeout(config.timeouts.connect())
            .build()?;
        Ok(Self { http, config })
    }

    /// POST a JSON body and return the status code and raw response text.
    async fn post<B: serde::Serialize + Sync>(&self, path: &str, body: &B) -> Result<(u16, String), GatewayError> {
        let url = self.config.endpoint(path);
        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;
        tracing::debug!(path, status, "auth request completed");
        Ok((status, text))
    }
}

#[async_trait::async_trait]
impl AuthGateway for HttpGateway {
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, GatewayError> {
        let (status, text) = self.post(LOGIN_PATH, request).await?;
        if !is_success(status) {
            return Err(classify_rejection(&text, LOGIN_FAILED_MESSAGE));
        }
        parse_login_response(&text)
    }

    async fn register(&self, request: &RegisterRequest) -> Result<(), GatewayError> {
        let (status, text) = self.post(REGISTER_PATH, request).await?;
        if !is_success(status) {
            return Err(classify_rejection(&text, REGISTER_FAILED_MESSAGE));
        }
        Ok(())
    }
}

// =============================================================================
// PARSING
// =============================================================================

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

/// Map a non-2xx body to a gateway error.
///
/// A JSON object body is a structured rejection: its `message` is surfaced
/// verbatim, or `fallback` when the message is missing or blank. Anything
/// else (empty body, HTML from a proxy, truncated JSON) is a network error.
fn classify_rejection(body: &str, fallback: &str) -> GatewayError {
    let trimmed = body.trim();
    if !trimmed.starts_with('{') {
        return GatewayError::Network(format!("unstructured error response ({} bytes)", body.len()));
    }
    match serde_json::from_str::<ErrorBody>(trimmed) {
        Ok(parsed) => {
            let message = parsed
                .message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| fallback.to_owned());
            GatewayError::ServerMessage(message)
        }
        Err(e) => GatewayError::Network(format!("malformed error response: {e}")),
    }
}

fn parse_login_response(body: &str) -> Result<LoginResponse, GatewayError> {
    serde_json::from_str(body).map_err(|e| GatewayError::Network(format!("malformed login response: {e}")))
}
