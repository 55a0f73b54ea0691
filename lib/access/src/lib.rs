//! Login orchestration and identity lookup for keyhole.
//!
//! This crate provides:
//! - The `Authenticator` contract implemented by the OIDC client
//! - OIDC provider configuration (`OidcConfig`)
//! - CSRF state generation for login attempts
//! - `AuthenticationService`, which turns a completed OIDC exchange into a
//!   session token and a session token back into identity claims
//! - `LoginAttempt`, the state machine of a single login
//!
//! # Error model
//!
//! Token-level failures are re-classified into the coarse `ServiceError`
//! categories the HTTP layer branches on. The original report stays attached
//! as the cause.

pub mod authenticator;
pub mod csrf;
pub mod error;
pub mod login;
pub mod oidc;
pub mod service;

pub use authenticator::{Authenticator, AuthorizationRequest};
pub use error::{AuthenticatorError, ServiceError};
pub use login::{LoginAttempt, LoginState};
pub use oidc::OidcConfig;
pub use service::AuthenticationService;
