//! keyhole HTTP server.
//!
//! This crate wires the keyhole authentication service behind an axum
//! router: `/login` and `/login/callback` run the OIDC authorization-code
//! flow, `/me` resolves a session token into its claims, `/logout` drops the
//! token cookie and `/ping` answers liveness checks.

pub mod auth;
pub mod config;
pub mod error;

use axum::Router;
use axum::routing::get;
use keyhole_access::Authenticator;
use tower_http::trace::TraceLayer;

use crate::auth::AppState;

/// Builds the application router.
pub fn router<A: Authenticator + 'static>(state: AppState<A>) -> Router {
    Router::new()
        .route("/login", get(auth::login::<A>))
        .route("/login/callback", get(auth::callback::<A>))
        .route("/logout", get(auth::logout))
        .route("/me", get(auth::me::<A>))
        .route("/ping", get(auth::ping))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
