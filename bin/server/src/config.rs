//! Centralized server configuration.
//!
//! This module provides strongly-typed configuration for the server,
//! loaded via the `config` crate from environment variables. Nested keys use
//! `__` as the separator, so `OIDC__CLIENT_ID` fills `oidc.client_id`.
//!
//! See [`OidcConfig`](keyhole_access::OidcConfig) for the identity provider
//! settings.

use config::builder::{ConfigBuilder, DefaultState};
use cookie::Key;
use keyhole_access::OidcConfig;
use rootcause::Report;
use serde::Deserialize;
use std::fmt;
use std::net::SocketAddr;

/// Minimum length of the key that signs the login session cookie.
pub const MIN_STORE_KEY_BYTES: usize = 32;

/// Server configuration composed from library configs.
#[derive(Deserialize)]
pub struct ServerConfig {
    /// Address the HTTP listener binds to.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,

    /// Secret for signing and verifying session tokens.
    pub jwt_signing_key: String,

    /// Secret for signing the login session cookie.
    pub store_key: String,

    /// Login session configuration.
    #[serde(default)]
    pub session: SessionConfig,

    /// OIDC authentication configuration.
    pub oidc: OidcConfig,
}

/// Login session configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Whether to set the Secure flag on cookies (requires HTTPS).
    /// Set to false for local HTTP development.
    #[serde(default = "default_secure_cookies")]
    pub secure_cookies: bool,

    /// How long a started login may wait for its callback, in minutes.
    #[serde(default = "default_state_ttl_minutes")]
    pub state_ttl_minutes: i64,
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

fn default_secure_cookies() -> bool {
    true
}

fn default_state_ttl_minutes() -> i64 {
    10
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            secure_cookies: default_secure_cookies(),
            state_ttl_minutes: default_state_ttl_minutes(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// The sources could not be read or deserialized.
    Load { details: String },
    /// A value was present but unusable.
    Invalid { field: String, reason: String },
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Load { details } => write!(f, "failed to load configuration: {details}"),
            Self::Invalid { field, reason } => {
                write!(f, "invalid configuration for '{field}': {reason}")
            }
        }
    }
}

impl std::error::Error for ConfigurationError {}

impl ServerConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required configuration is missing or invalid.
    pub fn from_env() -> Result<Self, Report<ConfigurationError>> {
        Self::load(
            config::Config::builder().add_source(
                config::Environment::default()
                    .separator("__")
                    .try_parsing(true),
            ),
        )
    }

    /// Derives the key that signs the login session cookie.
    pub fn cookie_key(&self) -> Key {
        Key::derive_from(self.store_key.as_bytes())
    }

    fn load(builder: ConfigBuilder<DefaultState>) -> Result<Self, Report<ConfigurationError>> {
        let config: Self = builder
            .build()
            .and_then(config::Config::try_deserialize)
            .map_err(|e| ConfigurationError::Load {
                details: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), Report<ConfigurationError>> {
        if self.jwt_signing_key.is_empty() {
            return Err(invalid("jwt_signing_key", "must not be empty"));
        }

        if self.store_key.len() < MIN_STORE_KEY_BYTES {
            return Err(invalid(
                "store_key",
                &format!("must be at least {MIN_STORE_KEY_BYTES} bytes"),
            ));
        }

        if let Some(field) = self.oidc.missing_fields().first() {
            return Err(invalid(&format!("oidc.{field}"), "must not be empty"));
        }

        if self.session.state_ttl_minutes <= 0 {
            return Err(invalid("session.state_ttl_minutes", "must be positive"));
        }

        Ok(())
    }
}

fn invalid(field: &str, reason: &str) -> Report<ConfigurationError> {
    ConfigurationError::Invalid {
        field: field.to_string(),
        reason: reason.to_string(),
    }
    .into()
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("listen_addr", &self.listen_addr)
            .field("jwt_signing_key", &"<redacted>")
            .field("store_key", &"<redacted>")
            .field("session", &self.session)
            .field("oidc", &self.oidc)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STORE_KEY: &str = "0123456789abcdef0123456789abcdef";

    fn builder(overrides: &[(&str, &str)]) -> ConfigBuilder<DefaultState> {
        overrides
            .iter()
            .fold(config::Config::builder(), |builder, (key, value)| {
                builder
                    .set_override(*key, *value)
                    .expect("valid override")
            })
    }

    fn complete() -> Vec<(&'static str, &'static str)> {
        vec![
            ("jwt_signing_key", "signingKey"),
            ("store_key", STORE_KEY),
            ("oidc.issuer_url", "https://tenant.example.com/"),
            ("oidc.client_id", "client"),
            ("oidc.client_secret", "secret"),
            ("oidc.redirect_uri", "http://localhost:8080/login/callback"),
        ]
    }

    fn without(key: &str) -> Vec<(&'static str, &'static str)> {
        complete().into_iter().filter(|(k, _)| *k != key).collect()
    }

    fn invalid_field(err: &Report<ConfigurationError>) -> String {
        match err.current_context() {
            ConfigurationError::Invalid { field, .. } => field.clone(),
            other => panic!("expected invalid configuration, got {other}"),
        }
    }

    #[test]
    fn session_config_has_correct_defaults() {
        let config = SessionConfig::default();
        assert!(config.secure_cookies);
        assert_eq!(config.state_ttl_minutes, 10);
    }

    #[test]
    fn complete_configuration_loads_with_defaults() {
        let config = ServerConfig::load(builder(&complete())).expect("load");

        assert_eq!(config.listen_addr, "0.0.0.0:8080".parse().expect("addr"));
        assert_eq!(config.jwt_signing_key, "signingKey");
        assert_eq!(config.oidc.client_id(), "client");
        assert_eq!(config.oidc.scopes(), vec!["openid", "profile", "email"]);
        assert!(config.session.secure_cookies);
    }

    #[test]
    fn overrides_replace_defaults() {
        let mut values = complete();
        values.push(("listen_addr", "127.0.0.1:3000"));
        values.push(("session.secure_cookies", "false"));
        values.push(("oidc.scopes", "openid"));

        let config = ServerConfig::load(builder(&values)).expect("load");
        assert_eq!(config.listen_addr.port(), 3000);
        assert!(!config.session.secure_cookies);
        assert_eq!(config.oidc.scopes(), vec!["openid"]);
    }

    #[test]
    fn secrets_have_no_defaults() {
        for key in ["jwt_signing_key", "store_key", "oidc.client_secret"] {
            let err = ServerConfig::load(builder(&without(key))).expect_err(key);
            assert!(
                matches!(err.current_context(), ConfigurationError::Load { .. }),
                "{key}"
            );
        }
    }

    #[test]
    fn empty_signing_key_is_rejected() {
        let mut values = without("jwt_signing_key");
        values.push(("jwt_signing_key", ""));

        let err = ServerConfig::load(builder(&values)).expect_err("should fail");
        assert_eq!(invalid_field(&err), "jwt_signing_key");
    }

    #[test]
    fn short_store_key_is_rejected() {
        let mut values = without("store_key");
        values.push(("store_key", "short"));

        let err = ServerConfig::load(builder(&values)).expect_err("should fail");
        assert_eq!(invalid_field(&err), "store_key");
    }

    #[test]
    fn blank_oidc_field_is_rejected() {
        let mut values = without("oidc.client_id");
        values.push(("oidc.client_id", " "));

        let err = ServerConfig::load(builder(&values)).expect_err("should fail");
        assert_eq!(invalid_field(&err), "oidc.client_id");
    }

    #[test]
    fn cookie_key_derives_from_minimum_length_store_key() {
        let config = ServerConfig::load(builder(&complete())).expect("load");
        assert_eq!(config.store_key.len(), MIN_STORE_KEY_BYTES);

        let key = config.cookie_key();
        assert_eq!(key.master(), config.cookie_key().master());
        assert_ne!(key.master(), STORE_KEY.as_bytes());
    }

    #[test]
    fn debug_redacts_secrets() {
        let config = ServerConfig::load(builder(&complete())).expect("load");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("signingKey"));
        assert!(!rendered.contains(STORE_KEY));
        assert!(!rendered.contains("\"secret\""));
    }
}
