//! Authentication routes for login, callback, logout and identity lookup.

use axum::Json;
use axum::extract::{Query, State};
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, LOCATION};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite, SignedCookieJar};
use keyhole_access::{Authenticator, LoginAttempt, ServiceError};
use rootcause::Report;
use serde::Deserialize;
use time::Duration as TimeDuration;

use super::session::{self, LoginSession};
use super::AppState;
use crate::error::ApiError;

/// Session token cookie name.
pub const TOKEN_COOKIE: &str = "token";

/// Query parameters for the OIDC callback.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    #[serde(default)]
    state: String,
    code: Option<String>,
}

/// Initiates the OIDC login flow by redirecting to the identity provider.
pub async fn login<A: Authenticator>(
    State(state): State<AppState<A>>,
    jar: SignedCookieJar,
) -> Result<impl IntoResponse, ApiError> {
    let mut attempt = LoginAttempt::new();
    let request = attempt.begin(&*state.service)?;
    let login_session = LoginSession {
        state: request.state,
        nonce: request.nonce,
    };
    let jar = session::start(jar, &login_session, &state.session_config)?;

    Ok((StatusCode::FOUND, jar, [(LOCATION, request.url)]))
}

/// Handles the OIDC callback after the user authenticates with the identity provider.
///
/// The login session is expired whatever the outcome.
pub async fn callback<A: Authenticator>(
    State(state): State<AppState<A>>,
    Query(query): Query<CallbackQuery>,
    jar: SignedCookieJar,
) -> Response {
    let (jar, stored) = session::finish(jar);

    let Some(stored) = stored else {
        tracing::debug!("callback without a login session");
        let error = ApiError::from(Report::from(ServiceError::Verification {
            reason: "invalid state parameter".to_string(),
        }));
        return (jar, error).into_response();
    };

    let mut attempt = LoginAttempt::resume(stored.state, stored.nonce);
    let token = match attempt
        .complete(&*state.service, &query.state, query.code.as_deref())
        .await
    {
        Ok(token) => token,
        Err(report) => return (jar, ApiError::from(report)).into_response(),
    };

    let token_cookie = Cookie::build((TOKEN_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(state.session_config.secure_cookies)
        .same_site(SameSite::Lax);

    (jar, CookieJar::new().add(token_cookie), StatusCode::OK).into_response()
}

/// Logs out the user by expiring their session token cookie.
pub async fn logout(jar: CookieJar) -> CookieJar {
    if jar.get(TOKEN_COOKIE).is_none() {
        return jar;
    }

    let expired = Cookie::build((TOKEN_COOKIE, ""))
        .path("/")
        .http_only(true)
        .max_age(TimeDuration::ZERO);

    jar.add(expired)
}

/// Returns the claims of the session token in the `Authorization` header.
pub async fn me<A: Authenticator>(
    State(state): State<AppState<A>>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let authorization = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    let body = state.service.fetch_identity(authorization)?;

    Ok(([(CONTENT_TYPE, "application/json")], body).into_response())
}

/// Liveness check.
pub async fn ping() -> Json<&'static str> {
    Json("pong")
}
