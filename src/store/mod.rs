//! Session store owning the login and registration slices.
//!
//! DESIGN
//! ======
//! `SessionStore` is an explicitly constructed, cloneable handle; there is no
//! global instance. State changes only through [`SessionStore::dispatch`],
//! which applies the slice reducer synchronously and publishes the new
//! [`AuthSnapshot`] on a `tokio::sync::watch` channel. Observers read or
//! subscribe; nothing is pushed to them besides the snapshot itself.
//!
//! CONCURRENCY
//! ===========
//! The store never enqueues or cancels attempts. Two overlapping login
//! submissions both apply their outcome, in resolution order, and an outcome
//! that resolves after a logout still applies. Call sites must refuse a
//! second submission while the slice is loading.

pub mod login;
pub mod register;

#[cfg(test)]
#[path = "mod_test.rs"]
mod mod_test;

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;

pub use login::{LoginAction, LoginSession, PersistedSession};
pub use register::{RegisterAction, RegistrationStatus};

use crate::persist::{self, SessionPersistence};

/// Storage key for the persisted login pair.
pub const LOGIN_STORAGE_KEY: &str = "auth.login";

/// A transition of one slice.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Login(LoginAction),
    Register(RegisterAction),
}

impl From<LoginAction> for Action {
    fn from(action: LoginAction) -> Self {
        Self::Login(action)
    }
}

impl From<RegisterAction> for Action {
    fn from(action: RegisterAction) -> Self {
        Self::Register(action)
    }
}

/// Point-in-time copy of both slices.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthSnapshot {
    pub login: LoginSession,
    pub register: RegistrationStatus,
}

impl AuthSnapshot {
    fn apply(&mut self, action: Action) {
        match action {
            Action::Login(action) => self.login.reduce(action),
            Action::Register(action) => self.register.reduce(action),
        }
    }
}

struct Inner {
    tx: watch::Sender<AuthSnapshot>,
    persistence: Option<Arc<dyn SessionPersistence>>,
    /// Held across apply and persist so storage sees writes in dispatch order.
    write: Mutex<()>,
}

/// Shared handle to the auth state container.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

impl SessionStore {
    /// Create a store backed by `persistence`, restoring a previously saved login.
    ///
    /// Unreadable or corrupt persisted data is logged and treated as anonymous.
    #[must_use]
    pub fn new(persistence: Arc<dyn SessionPersistence>) -> Self {
        let login = match persist::load_json::<PersistedSession>(persistence.as_ref(), LOGIN_STORAGE_KEY) {
            Ok(Some(saved)) => LoginSession::restore(&saved),
            Ok(None) => LoginSession::default(),
            Err(e) => {
                tracing::warn!(error = %e, "discarding unreadable persisted session");
                LoginSession::default()
            }
        };
        if login.is_authenticated {
            tracing::debug!("restored authenticated session");
        }
        Self::with_state(AuthSnapshot { login, register: RegistrationStatus::default() }, Some(persistence))
    }

    /// Create a store with no durable backing.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::with_state(AuthSnapshot::default(), None)
    }

    fn with_state(initial: AuthSnapshot, persistence: Option<Arc<dyn SessionPersistence>>) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { inner: Arc::new(Inner { tx, persistence, write: Mutex::new(()) }) }
    }

    /// Apply `action` to its slice and notify subscribers.
    pub fn dispatch(&self, action: impl Into<Action>) {
        let action = action.into();
        let mut changed_pair = None;
        let _write = self.inner.write.lock().unwrap_or_else(PoisonError::into_inner);

        self.inner.tx.send_modify(|snapshot| {
            let before = snapshot.login.persisted();
            snapshot.apply(action);
            let after = snapshot.login.persisted();
            if before != after {
                changed_pair = Some(after);
            }
        });

        if let Some(pair) = changed_pair {
            self.persist(&pair);
        }
    }

    fn persist(&self, pair: &PersistedSession) {
        let Some(storage) = &self.inner.persistence else {
            return;
        };
        // An anonymous pair is stored as no entry at all.
        let result = if *pair == PersistedSession::default() {
            storage.remove(LOGIN_STORAGE_KEY)
        } else {
            persist::save_json(storage.as_ref(), LOGIN_STORAGE_KEY, pair)
        };
        // State is already applied; a failed write only costs durability.
        if let Err(e) = result {
            tracing::warn!(error = %e, "failed to persist login session");
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> AuthSnapshot {
        self.inner.tx.borrow().clone()
    }

    #[must_use]
    pub fn login(&self) -> LoginSession {
        self.inner.tx.borrow().login.clone()
    }

    #[must_use]
    pub fn register(&self) -> RegistrationStatus {
        self.inner.tx.borrow().register.clone()
    }

    /// Receive every snapshot published after this call.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AuthSnapshot> {
        self.inner.tx.subscribe()
    }

    pub fn logout(&self) {
        self.dispatch(LoginAction::Logout);
    }

    pub fn clear_login_error(&self) {
        self.dispatch(LoginAction::ClearError);
    }

    pub fn clear_register_error(&self) {
        self.dispatch(RegisterAction::ClearError);
    }

    pub fn reset_registration(&self) {
        self.dispatch(RegisterAction::Reset);
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let snapshot = self.inner.tx.borrow();
        f.debug_struct("SessionStore")
            .field("authenticated", &snapshot.login.is_authenticated)
            .field("login_loading", &snapshot.login.is_loading)
            .field("registered", &snapshot.register.is_registered)
            .field("durable", &self.inner.persistence.is_some())
            .finish()
    }
}
