//! Mapping of raw provider identities onto `IdentityClaims`.
//!
//! Every supported provider exposes the same profile fields (`name`, `email`,
//! `picture`, `sub`) next to the registered claims, so a single extractor
//! serves all of them; only the provider tag recorded in the metadata differs.

use keyhole_core::Provider;
use keyhole_core::Result;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::claims::{IdentityClaims, Metadata};
use crate::error::IssueError;

/// A verified upstream identity whose payload can be decoded on demand.
pub trait ClaimsSource {
    /// Returns the subject of the identity.
    fn subject(&self) -> &str;

    /// Decodes the identity payload into a caller-supplied shape.
    fn decode_claims<T: DeserializeOwned>(&self) -> std::result::Result<T, serde_json::Error>;
}

/// An ID token that has already been verified against the provider.
#[derive(Debug, Clone, PartialEq)]
pub struct IdentityToken {
    subject: String,
    payload: serde_json::Value,
}

impl IdentityToken {
    /// Creates an identity from its subject and JSON payload.
    #[must_use]
    pub fn new(subject: String, payload: serde_json::Value) -> Self {
        Self { subject, payload }
    }
}

impl ClaimsSource for IdentityToken {
    fn subject(&self) -> &str {
        &self.subject
    }

    fn decode_claims<T: DeserializeOwned>(&self) -> std::result::Result<T, serde_json::Error> {
        T::deserialize(&self.payload)
    }
}

/// The provider payload fields the gateway reads.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawClaims {
    aud: String,
    exp: i64,
    iat: i64,
    iss: String,
    name: String,
    email: String,
    picture: String,
    sub: String,
}

/// Builds normalized claims from a raw identity authenticated by `provider`.
pub fn extract_claims<S: ClaimsSource>(
    source: &S,
    provider: Provider,
) -> Result<IdentityClaims, IssueError> {
    let raw: RawClaims = source
        .decode_claims()
        .map_err(|e| IssueError::ClaimsUnreadable {
            reason: e.to_string(),
        })?;

    Ok(IdentityClaims {
        metadata: Metadata {
            name: raw.name,
            email: raw.email,
            avatar_url: raw.picture,
            provider: Some(provider),
        },
        audience: raw.aud,
        expires_at: raw.exp,
        issued_at: raw.iat,
        issuer: raw.iss,
        subject: raw.sub,
    })
}
