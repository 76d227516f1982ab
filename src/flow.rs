//! Login and registration flows: gateway call plus store transitions.
//!
//! Each flow dispatches `Pending`, awaits exactly one gateway call, then
//! dispatches `Fulfilled` or `Rejected`. The `spawn_*` variants dispatch
//! `Pending` before returning and run the call as a detached tokio task, so
//! the outcome is applied even if the returned handle is dropped.

#[cfg(test)]
#[path = "flow_test.rs"]
mod flow_test;

use std::sync::Arc;

use tokio::sync::oneshot;

use crate::gateway::types::NETWORK_ERROR_MESSAGE;
use crate::gateway::{AuthGateway, LoginRequest, LoginResponse, RegisterRequest};
use crate::store::{LoginAction, RegisterAction, SessionStore};
use crate::validate::{ValidLogin, ValidRegistration};

/// Tagged result of an auth attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome<T> {
    /// The request is still in flight.
    Pending,
    Success(T),
    /// The attempt failed; carries the message stored in the slice.
    Failure(String),
}

impl<T> Outcome<T> {
    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

pub type LoginOutcome = Outcome<LoginResponse>;
pub type RegisterOutcome = Outcome<()>;

// =============================================================================
// INLINE FLOWS
// =============================================================================

/// Run a login attempt to completion on the current task.
pub async fn login_user(store: &SessionStore, gateway: &dyn AuthGateway, credentials: &ValidLogin) -> LoginOutcome {
    store.dispatch(LoginAction::Pending);
    resolve_login(store, gateway, LoginRequest::from(credentials)).await
}

/// Run a registration attempt to completion on the current task.
pub async fn register_user(
    store: &SessionStore,
    gateway: &dyn AuthGateway,
    details: &ValidRegistration,
) -> RegisterOutcome {
    store.dispatch(RegisterAction::Pending);
    resolve_register(store, gateway, RegisterRequest::from(details)).await
}

async fn resolve_login(store: &SessionStore, gateway: &dyn AuthGateway, request: LoginRequest) -> LoginOutcome {
    match gateway.login(&request).await {
        Ok(response) => {
            tracing::info!(email = %request.email, "login succeeded");
            store.dispatch(LoginAction::Fulfilled { token: response.token().to_owned() });
            Outcome::Success(response)
        }
        Err(e) => {
            tracing::warn!(email = %request.email, error = %e, "login failed");
            let message = e.user_message();
            store.dispatch(LoginAction::Rejected { message: message.clone() });
            Outcome::Failure(message)
        }
    }
}

async fn resolve_register(store: &SessionStore, gateway: &dyn AuthGateway, request: RegisterRequest) -> RegisterOutcome {
    match gateway.register(&request).await {
        Ok(()) => {
            tracing::info!(email = %request.email, "registration succeeded");
            store.dispatch(RegisterAction::Fulfilled);
            Outcome::Success(())
        }
        Err(e) => {
            tracing::warn!(email = %request.email, error = %e, "registration failed");
            let message = e.user_message();
            store.dispatch(RegisterAction::Rejected { message: message.clone() });
            Outcome::Failure(message)
        }
    }
}

// =============================================================================
// SPAWNED FLOWS
// =============================================================================

/// Handle to a spawned flow.
#[derive(Debug)]
pub struct FlowHandle<T> {
    rx: oneshot::Receiver<Outcome<T>>,
    resolved: Option<Outcome<T>>,
}

impl<T: Clone> FlowHandle<T> {
    /// Current outcome without waiting; `Pending` until the gateway resolves.
    pub fn outcome(&mut self) -> Outcome<T> {
        if let Some(outcome) = &self.resolved {
            return outcome.clone();
        }
        match self.rx.try_recv() {
            Ok(outcome) => {
                self.resolved = Some(outcome.clone());
                outcome
            }
            Err(oneshot::error::TryRecvError::Empty) => Outcome::Pending,
            Err(oneshot::error::TryRecvError::Closed) => abandoned(),
        }
    }
}

impl<T> FlowHandle<T> {
    /// Wait for the flow to resolve.
    pub async fn join(self) -> Outcome<T> {
        if let Some(outcome) = self.resolved {
            return outcome;
        }
        self.rx.await.unwrap_or_else(|_| abandoned())
    }
}

/// The task ended without reporting, which only happens if it panicked.
fn abandoned<T>() -> Outcome<T> {
    Outcome::Failure(NETWORK_ERROR_MESSAGE.to_owned())
}

/// Start a login attempt on the tokio runtime.
///
/// The slice is `Pending` when this returns. Must be called from within a runtime.
pub fn spawn_login(store: SessionStore, gateway: Arc<dyn AuthGateway>, credentials: &ValidLogin) -> FlowHandle<LoginResponse> {
    store.dispatch(LoginAction::Pending);
    let request = LoginRequest::from(credentials);
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
        let outcome = resolve_login(&store, gateway.as_ref(), request).await;
        let _ = tx.send(outcome);
    });
    FlowHandle { rx, resolved: None }
}

/// Start a registration attempt on the tokio runtime.
///
/// The slice is `Pending` when this returns. Must be called from within a runtime.
pub fn spawn_register(
    store: SessionStore,
    gateway: Arc<dyn AuthGateway>,
    details: &ValidRegistration,
) -> FlowHandle<()> {
    store.dispatch(RegisterAction::Pending);
    let request = RegisterRequest::from(details);
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
        let outcome = resolve_register(&store, gateway.as_ref(), request).await;
        let _ = tx.send(outcome);
    });
    FlowHandle { rx, resolved: None }
}
