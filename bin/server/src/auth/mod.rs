//! Authentication module for the keyhole server.
//!
//! This module provides:
//! - The OIDC client that implements the `Authenticator` contract
//! - The signed login session cookie carrying the CSRF state and nonce
//! - The login, callback, logout and identity routes
//!
//! Sessions are stateless: the only things stored between the login redirect
//! and the callback are the CSRF state and the ID-token nonce, inside a cookie
//! signed with the store key. After the callback the caller holds a signed session token.

pub mod oidc;
pub mod routes;
pub mod session;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use keyhole_access::{AuthenticationService, Authenticator};
use std::sync::Arc;

use crate::config::SessionConfig;

pub use oidc::OidcClient;
pub use routes::{callback, login, logout, me, ping};

/// Shared application state.
pub struct AppState<A> {
    /// Login and identity operations.
    pub service: Arc<AuthenticationService<A>>,
    /// Key signing the login session cookie.
    pub cookie_key: Key,
    /// Session configuration.
    pub session_config: SessionConfig,
}

impl<A: Authenticator> AppState<A> {
    /// Creates a new application state.
    pub fn new(
        service: AuthenticationService<A>,
        cookie_key: Key,
        session_config: SessionConfig,
    ) -> Self {
        Self {
            service: Arc::new(service),
            cookie_key,
            session_config,
        }
    }
}

impl<A> Clone for AppState<A> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            cookie_key: self.cookie_key.clone(),
            session_config: self.session_config.clone(),
        }
    }
}

impl<A> FromRef<AppState<A>> for Key {
    fn from_ref(state: &AppState<A>) -> Self {
        state.cookie_key.clone()
    }
}
