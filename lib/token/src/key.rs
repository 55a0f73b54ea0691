//! Shared HS256 signing material.

use jsonwebtoken::{DecodingKey, EncodingKey};
use std::fmt;
use std::sync::Arc;

/// Symmetric key shared by `TokenIssuer` and `TokenVerifier`.
///
/// The key is built once at startup and never mutated; clones share the same
/// material.
#[derive(Clone)]
pub struct SigningKey {
    inner: Arc<KeyMaterial>,
}

struct KeyMaterial {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl SigningKey {
    /// Creates a signing key from a shared secret.
    #[must_use]
    pub fn from_secret(secret: &[u8]) -> Self {
        Self {
            inner: Arc::new(KeyMaterial {
                encoding: EncodingKey::from_secret(secret),
                decoding: DecodingKey::from_secret(secret),
            }),
        }
    }

    pub(crate) fn encoding(&self) -> &EncodingKey {
        &self.inner.encoding
    }

    pub(crate) fn decoding(&self) -> &DecodingKey {
        &self.inner.decoding
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey").finish_non_exhaustive()
    }
}
