//! Login slice: the current session token and the state of the last attempt.
//!
//! SYSTEM CONTEXT
//! ==============
//! Read by the navigation gate and the login page; written only through
//! [`LoginAction`] via the session store.

#[cfg(test)]
#[path = "login_test.rs"]
mod login_test;

use serde::{Deserialize, Serialize};

/// Login session state.
///
/// Invariants: `is_authenticated` and `is_loading` are never both true, and
/// `token` is present iff `is_authenticated`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoginSession {
    pub token: Option<String>,
    pub is_authenticated: bool,
    pub is_loading: bool,
    pub error: Option<String>,
}

/// Transitions of the login slice.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoginAction {
    /// A login request was submitted.
    Pending,
    /// The gateway accepted the credentials.
    Fulfilled { token: String },
    /// The gateway rejected the credentials or could not be reached.
    Rejected { message: String },
    Logout,
    ClearError,
}

impl LoginSession {
    pub(crate) fn reduce(&mut self, action: LoginAction) {
        match action {
            LoginAction::Pending => {
                // A fresh attempt supersedes any prior session.
                self.is_loading = true;
                self.token = None;
                self.is_authenticated = false;
                self.error = None;
            }
            LoginAction::Fulfilled { token } => {
                self.is_loading = false;
                self.token = Some(token);
                self.is_authenticated = true;
                self.error = None;
            }
            LoginAction::Rejected { message } => {
                self.is_loading = false;
                self.token = None;
                self.is_authenticated = false;
                self.error = Some(message);
            }
            LoginAction::Logout => *self = Self::default(),
            LoginAction::ClearError => self.error = None,
        }
    }

    /// Rebuild a session from its persisted pair. Transient fields start empty.
    #[must_use]
    pub fn restore(persisted: &PersistedSession) -> Self {
        match (&persisted.token, persisted.is_authenticated) {
            (Some(token), true) => Self { token: Some(token.clone()), is_authenticated: true, ..Self::default() },
            _ => Self::default(),
        }
    }

    #[must_use]
    pub fn persisted(&self) -> PersistedSession {
        PersistedSession { token: self.token.clone(), is_authenticated: self.is_authenticated }
    }
}

/// The only part of the login slice that survives a restart.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedSession {
    pub token: Option<String>,
    pub is_authenticated: bool,
}
