//! Navigation gate: route reachability for the current login session.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every route transition is checked here before it is allowed, so the
//! redirect rules stay identical across pages and front ends.

#[cfg(test)]
#[path = "gate_test.rs"]
mod gate_test;

use std::fmt;

use crate::store::LoginSession;

/// Routes known to the auth front end.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Route {
    /// `/`, which only forwards to the login page.
    Entry,
    Login,
    Register,
    /// Authenticated landing page.
    Dashboard,
}

impl Route {
    pub const ALL: [Self; 4] = [Self::Entry, Self::Login, Self::Register, Self::Dashboard];

    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Entry => "/",
            Self::Login => "/login",
            Self::Register => "/register",
            Self::Dashboard => "/dashboard",
        }
    }

    /// Parse a path, ignoring a trailing slash, query, and fragment.
    #[must_use]
    pub fn from_path(path: &str) -> Option<Self> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');
        match trimmed {
            "" => Some(Self::Entry),
            "/login" => Some(Self::Login),
            "/register" => Some(Self::Register),
            "/dashboard" => Some(Self::Dashboard),
            _ => None,
        }
    }

    #[must_use]
    pub fn requires_auth(self) -> bool {
        matches!(self, Self::Dashboard)
    }

    /// Pages only meaningful to anonymous visitors.
    #[must_use]
    pub fn is_public_only(self) -> bool {
        matches!(self, Self::Login | Self::Register)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Decision for a requested navigation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Navigation {
    Allow,
    Redirect(Route),
}

/// Decide whether `route` may be shown for `session`.
#[must_use]
pub fn guard(route: Route, session: &LoginSession) -> Navigation {
    if route == Route::Entry {
        return Navigation::Redirect(Route::Login);
    }
    if route.requires_auth() && !session.is_authenticated {
        return Navigation::Redirect(Route::Login);
    }
    if route.is_public_only() && session.is_authenticated {
        return Navigation::Redirect(Route::Dashboard);
    }
    Navigation::Allow
}

/// Follow redirects from `route` to the page that will actually render.
#[must_use]
pub fn resolve(route: Route, session: &LoginSession) -> Route {
    let mut current = route;
    // Each route redirects at most once per rule set, so the chain is short.
    for _ in 0..Route::ALL.len() {
        match guard(current, session) {
            Navigation::Allow => return current,
            Navigation::Redirect(next) => current = next,
        }
    }
    tracing::warn!(from = %route, to = %current, "redirect chain did not settle");
    current
}
