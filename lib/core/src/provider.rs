//! Identity providers accepted by the gateway.
//!
//! The upstream OIDC broker federates several social logins and prefixes the
//! subject of every identity with the provider that authenticated it, e.g.
//! `google-oauth2|1234`. Only the providers listed here are allowed to obtain
//! a session token.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A supported upstream identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Provider {
    /// Google accounts.
    #[serde(rename = "google-oauth2")]
    Google,
    /// Microsoft personal accounts.
    #[serde(rename = "windowslive")]
    WindowsLive,
}

impl Provider {
    /// Every supported provider, in display order.
    pub const ALL: [Provider; 2] = [Provider::Google, Provider::WindowsLive];

    /// Returns the subject prefix used by the upstream broker.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Google => "google-oauth2",
            Self::WindowsLive => "windowslive",
        }
    }

    /// Returns the supported set formatted for error messages,
    /// e.g. `google-oauth2 and windowslive`.
    #[must_use]
    pub fn supported() -> String {
        Self::ALL
            .iter()
            .map(Provider::as_str)
            .collect::<Vec<_>>()
            .join(" and ")
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a provider tag is not in the supported set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseProviderError {
    /// The rejected provider tag.
    pub value: String,
}

impl fmt::Display for ParseProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unsupported provider: got: ({}), want: ({})",
            self.value,
            Provider::supported()
        )
    }
}

impl std::error::Error for ParseProviderError {}

impl FromStr for Provider {
    type Err = ParseProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|provider| provider.as_str() == s)
            .ok_or_else(|| ParseProviderError {
                value: s.to_string(),
            })
    }
}
