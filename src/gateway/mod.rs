//! Auth gateway: the boundary to the remote authentication API.
//!
//! DESIGN
//! ======
//! Flows depend on the [`AuthGateway`] trait so they can run against
//! [`HttpGateway`] in production and scripted mocks in tests. The gateway
//! performs exactly one request per call and never retries.

pub mod http;
pub mod types;

pub use http::HttpGateway;
pub use types::{GatewayError, LoginRequest, LoginResponse, RegisterRequest};

/// Remote authentication operations.
#[async_trait::async_trait]
pub trait AuthGateway: Send + Sync {
    /// Exchange credentials for a session token.
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, GatewayError>;

    /// Create an account. The API returns an empty body on success.
    async fn register(&self, request: &RegisterRequest) -> Result<(), GatewayError>;
}
