//! Login session stored in a signed cookie.

use axum_extra::extract::cookie::{Cookie, SameSite, SignedCookieJar};
use serde::{Deserialize, Serialize};
use time::Duration as TimeDuration;

use crate::config::SessionConfig;
use crate::error::ApiError;

/// Login session cookie name.
pub const SESSION_COOKIE: &str = "auth-session";

/// What a login must remember across the provider redirect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginSession {
    /// CSRF state the provider echoes back.
    pub state: String,
    /// Nonce the ID token must carry.
    pub nonce: String,
}

/// Stores the session of a login that is about to redirect.
pub fn start(
    jar: SignedCookieJar,
    session: &LoginSession,
    config: &SessionConfig,
) -> Result<SignedCookieJar, ApiError> {
    let value = serde_json::to_string(session)
        .map_err(|e| ApiError::internal(format!("could not save login session: {e}")))?;

    let cookie = Cookie::build((SESSION_COOKIE, value))
        .path("/")
        .http_only(true)
        .secure(config.secure_cookies)
        .same_site(SameSite::Lax)
        .max_age(TimeDuration::minutes(config.state_ttl_minutes));

    Ok(jar.add(cookie))
}

/// Reads the stored session and expires the cookie.
///
/// A missing, tampered or unreadable cookie yields `None`.
pub fn finish(jar: SignedCookieJar) -> (SignedCookieJar, Option<LoginSession>) {
    let session = jar
        .get(SESSION_COOKIE)
        .and_then(|cookie| serde_json::from_str::<LoginSession>(cookie.value()).ok());

    let expired = Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .max_age(TimeDuration::ZERO);

    (jar.add(expired), session)
}
