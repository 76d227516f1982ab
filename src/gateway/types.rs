//! Wire types for the remote auth API.

use serde::{Deserialize, Serialize};

use crate::validate::{ValidLogin, ValidRegistration};

// =============================================================================
// ERROR
// =============================================================================

pub const NETWORK_ERROR_MESSAGE: &str = "Network error occurred";
pub const LOGIN_FAILED_MESSAGE: &str = "Failed to login";
pub const REGISTER_FAILED_MESSAGE: &str = "Failed to register";

/// Normalized failure of a gateway call. Every variant is terminal for the attempt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// The server rejected the request with a structured body.
    #[error("{0}")]
    ServerMessage(String),

    /// No structured response: connect failure, timeout, or an unreadable body.
    #[error("network error: {0}")]
    Network(String),
}

impl GatewayError {
    /// Text shown to the user and stored in the slice's `error` field.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::ServerMessage(text) => text.clone(),
            Self::Network(_) => NETWORK_ERROR_MESSAGE.to_owned(),
        }
    }
}

// =============================================================================
// REQUESTS
// =============================================================================

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl From<&ValidLogin> for LoginRequest {
    fn from(valid: &ValidLogin) -> Self {
        Self { email: valid.email().to_owned(), password: valid.password().to_owned() }
    }
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest").field("email", &self.email).finish_non_exhaustive()
    }
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
}

impl From<&ValidRegistration> for RegisterRequest {
    fn from(valid: &ValidRegistration) -> Self {
        Self {
            email: valid.email().to_owned(),
            password: valid.password().to_owned(),
            full_name: valid.fullname().to_owned(),
        }
    }
}

impl std::fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("email", &self.email)
            .field("full_name", &self.full_name)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// RESPONSES
// =============================================================================

/// Successful `POST /auth/login` body: `{ timestamp, data: { token } }`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub timestamp: String,
    pub data: LoginData,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginData {
    pub token: String,
}

impl LoginResponse {
    #[must_use]
    pub fn token(&self) -> &str {
        &self.data.token
    }
}

/// Structured error body returned by the API on rejection.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}
