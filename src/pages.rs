//! Login and registration page controllers.
//!
//! SYSTEM CONTEXT
//! ==============
//! Front ends (the CLI, or any UI) drive these instead of calling flows
//! directly. They own the call-site rules the store leaves to its callers:
//! refuse a submission while the slice is loading, validate before anything
//! is dispatched, and turn snapshot changes into toasts and navigations.

#[cfg(test)]
#[path = "pages_test.rs"]
mod pages_test;

use std::sync::Arc;

use crate::flow::{self, FlowHandle};
use crate::gate::{self, Navigation, Route};
use crate::gateway::{AuthGateway, LoginResponse};
use crate::store::SessionStore;
use crate::validate::{self, FieldErrors, LoginForm, RegisterForm};

/// Why a form submission did not start a request.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SubmitError {
    #[error("a request is already in flight")]
    Busy,

    #[error("{0}")]
    Invalid(FieldErrors),
}

/// Side effect a page asks its host to perform.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PageEffect {
    /// Show a transient error notification.
    Toast(String),
    Navigate(Route),
}

fn submit_label(loading: bool) -> &'static str {
    if loading { "Signing In..." } else { "Sign In" }
}

// =============================================================================
// LOGIN
// =============================================================================

#[derive(Clone)]
pub struct LoginPage {
    store: SessionStore,
    gateway: Arc<dyn AuthGateway>,
}

impl LoginPage {
    #[must_use]
    pub fn new(store: SessionStore, gateway: Arc<dyn AuthGateway>) -> Self {
        Self { store, gateway }
    }

    /// Whether the page may render, or where to go instead.
    #[must_use]
    pub fn open(&self) -> Navigation {
        gate::guard(Route::Login, &self.store.login())
    }

    /// Validate `form` and start a login attempt.
    ///
    /// # Errors
    ///
    /// [`SubmitError::Busy`] while a login is in flight, [`SubmitError::Invalid`]
    /// when validation fails. Neither touches the store or the gateway.
    pub fn submit(&self, form: &LoginForm) -> Result<FlowHandle<LoginResponse>, SubmitError> {
        if self.store.login().is_loading {
            return Err(SubmitError::Busy);
        }
        let credentials = validate::validate_login(form).map_err(SubmitError::Invalid)?;
        Ok(flow::spawn_login(self.store.clone(), Arc::clone(&self.gateway), &credentials))
    }

    /// React to the current login state. An error is toasted once and then cleared.
    pub fn effects(&self) -> Vec<PageEffect> {
        let login = self.store.login();
        let mut effects = Vec::new();
        if let Some(error) = login.error {
            effects.push(PageEffect::Toast(error));
            self.store.clear_login_error();
        }
        if login.is_authenticated {
            effects.push(PageEffect::Navigate(Route::Dashboard));
        }
        effects
    }

    #[must_use]
    pub fn submit_label(&self) -> &'static str {
        submit_label(self.store.login().is_loading)
    }
}

// =============================================================================
// REGISTER
// =============================================================================

#[derive(Clone)]
pub struct RegisterPage {
    store: SessionStore,
    gateway: Arc<dyn AuthGateway>,
}

impl RegisterPage {
    #[must_use]
    pub fn new(store: SessionStore, gateway: Arc<dyn AuthGateway>) -> Self {
        Self { store, gateway }
    }

    #[must_use]
    pub fn open(&self) -> Navigation {
        gate::guard(Route::Register, &self.store.login())
    }

    /// Validate `form` and start a registration attempt.
    ///
    /// # Errors
    ///
    /// [`SubmitError::Busy`] while a registration is in flight, [`SubmitError::Invalid`]
    /// when validation fails.
    pub fn submit(&self, form: &RegisterForm) -> Result<FlowHandle<()>, SubmitError> {
        if self.store.register().is_loading {
            return Err(SubmitError::Busy);
        }
        let details = validate::validate_registration(form).map_err(SubmitError::Invalid)?;
        Ok(flow::spawn_register(self.store.clone(), Arc::clone(&self.gateway), &details))
    }

    /// React to the current registration state. A completed registration
    /// sends the user to the login page.
    pub fn effects(&self) -> Vec<PageEffect> {
        let status = self.store.register();
        let mut effects = Vec::new();
        if let Some(error) = status.error {
            effects.push(PageEffect::Toast(error));
            self.store.clear_register_error();
        }
        if status.is_registered {
            effects.push(PageEffect::Navigate(Route::Login));
        }
        effects
    }

    #[must_use]
    pub fn submit_label(&self) -> &'static str {
        submit_label(self.store.register().is_loading)
    }
}
