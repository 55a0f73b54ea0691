//! OIDC (OpenID Connect) provider configuration.
//!
//! The gateway logs users in against a single upstream OIDC broker, which
//! in turn federates the supported social providers.

use serde::Deserialize;
use std::fmt;

/// Configuration for the upstream OIDC provider.
///
/// The client credentials have no defaults; they must be supplied at runtime.
#[derive(Clone, Deserialize)]
pub struct OidcConfig {
    /// The OIDC issuer URL (e.g., "https://tenant.us.auth0.com/").
    /// Used for OIDC discovery.
    issuer_url: String,
    /// The OAuth2 client ID registered with the provider.
    client_id: String,
    /// The OAuth2 client secret.
    client_secret: String,
    /// The redirect URI for the callback (e.g., "https://app.example.com/login/callback").
    redirect_uri: String,
    /// OAuth2 scopes to request as a comma-separated string.
    /// Default: "openid,profile,email"
    #[serde(default = "default_scopes")]
    scopes: String,
}

fn default_scopes() -> String {
    "openid,profile,email".to_string()
}

impl OidcConfig {
    /// Creates a new OIDC configuration requesting the default scopes.
    #[must_use]
    pub fn new(
        issuer_url: String,
        client_id: String,
        client_secret: String,
        redirect_uri: String,
    ) -> Self {
        Self {
            issuer_url,
            client_id,
            client_secret,
            redirect_uri,
            scopes: default_scopes(),
        }
    }

    /// Returns the OIDC issuer URL.
    #[must_use]
    pub fn issuer_url(&self) -> &str {
        &self.issuer_url
    }

    /// Returns the OAuth2 client ID.
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Returns the OAuth2 client secret.
    #[must_use]
    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }

    /// Returns the OAuth2 redirect URI.
    #[must_use]
    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    /// Returns the scopes to request, parsed from the comma-separated string.
    /// Empty entries are skipped.
    #[must_use]
    pub fn scopes(&self) -> Vec<&str> {
        self.scopes
            .split(',')
            .map(str::trim)
            .filter(|scope| !scope.is_empty())
            .collect()
    }

    /// Returns the names of required fields that are empty.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("issuer_url", &self.issuer_url),
            ("client_id", &self.client_id),
            ("client_secret", &self.client_secret),
            ("redirect_uri", &self.redirect_uri),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

impl fmt::Debug for OidcConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OidcConfig")
            .field("issuer_url", &self.issuer_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("redirect_uri", &self.redirect_uri)
            .field("scopes", &self.scopes)
            .finish()
    }
}
