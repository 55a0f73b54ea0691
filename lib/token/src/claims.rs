//! The claims embedded in every session token.

use keyhole_core::Provider;
use keyhole_core::Result;
use serde::{Deserialize, Serialize};

use crate::error::VerifyError;

/// Profile details copied from the upstream identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Avatar URL (the provider's `picture` claim).
    pub avatar_url: String,
    /// The provider that authenticated the identity.
    #[serde(
        rename = "o_auth_provider",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub provider: Option<Provider>,
}

/// Normalized identity claims.
///
/// This is both the payload of an issued token and the JSON body returned by
/// the identity endpoint. Registered claims use their JWT names on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityClaims {
    /// Profile details.
    pub metadata: Metadata,
    /// Audience.
    #[serde(rename = "aud", default)]
    pub audience: String,
    /// Expiration, in seconds since the epoch.
    #[serde(rename = "exp", default)]
    pub expires_at: i64,
    /// Issued-at, in seconds since the epoch.
    #[serde(rename = "iat", default)]
    pub issued_at: i64,
    /// Issuer.
    #[serde(rename = "iss", default)]
    pub issuer: String,
    /// Subject, `<provider>|<id>`.
    #[serde(rename = "sub", default)]
    pub subject: String,
}

impl IdentityClaims {
    /// Checks the validity window against `now` (seconds since the epoch).
    ///
    /// The token is valid from `iat` through `exp`, both inclusive.
    pub fn validate_at(&self, now: i64) -> Result<(), VerifyError> {
        if now > self.expires_at || now < self.issued_at {
            return Err(VerifyError::TokenExpiredOrNotYetValid.into());
        }
        Ok(())
    }
}
