//! Client-side authentication core for Gatherly.
//!
//! Validates login and registration forms, calls the remote auth API, tracks
//! the resulting session in an injectable [`SessionStore`], and gates routes
//! on the login state.
//!
//! ```text
//! pages ──► validate ──► flow ──► gateway (HTTP)
//!                          │
//!                          ▼
//!                        store ──► persist
//!                          │
//!                          ▼
//!                         gate
//! ```

pub mod config;
pub mod flow;
pub mod gate;
pub mod gateway;
pub mod pages;
pub mod persist;
pub mod store;
pub mod validate;

pub use config::AuthConfig;
pub use flow::{FlowHandle, Outcome};
pub use gate::{Navigation, Route};
pub use gateway::{AuthGateway, GatewayError, HttpGateway};
pub use pages::{LoginPage, PageEffect, RegisterPage, SubmitError};
pub use persist::{FileStorage, MemoryStorage, SessionPersistence};
pub use store::{Action, AuthSnapshot, LoginSession, RegistrationStatus, SessionStore};
