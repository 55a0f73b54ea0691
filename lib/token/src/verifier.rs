//! Session token verification.

use chrono::Utc;
use jsonwebtoken::errors::{Error as JwtError, ErrorKind};
use jsonwebtoken::{Algorithm, Validation, decode};
use keyhole_core::Result;
use tracing::debug;

use crate::claims::IdentityClaims;
use crate::error::VerifyError;
use crate::key::SigningKey;

/// Verifies session tokens issued by `TokenIssuer`.
///
/// Verification is stateless: the signature and the `iat`..`exp` window are
/// the only checks.
#[derive(Debug, Clone)]
pub struct TokenVerifier {
    key: SigningKey,
    validation: Validation,
}

impl TokenVerifier {
    /// Creates a verifier for tokens signed with `key`.
    #[must_use]
    pub fn new(key: SigningKey) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // The validity window is checked by `IdentityClaims::validate_at`.
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        Self { key, validation }
    }

    /// Verifies `token` against the current time.
    pub fn claims(&self, token: &str) -> Result<IdentityClaims, VerifyError> {
        self.claims_at(token, Utc::now().timestamp())
    }

    /// Verifies `token` as of `now`, in seconds since the epoch.
    pub fn claims_at(&self, token: &str, now: i64) -> Result<IdentityClaims, VerifyError> {
        let data = decode::<IdentityClaims>(token, self.key.decoding(), &self.validation)
            .map_err(classify)?;

        data.claims.validate_at(now).inspect_err(|_| {
            debug!(
                exp = data.claims.expires_at,
                iat = data.claims.issued_at,
                now,
                "token outside validity window"
            );
        })?;

        Ok(data.claims)
    }
}

fn classify(err: JwtError) -> VerifyError {
    debug!(error = %err, "token rejected");
    match err.kind() {
        ErrorKind::ExpiredSignature | ErrorKind::ImmatureSignature => {
            VerifyError::TokenExpiredOrNotYetValid
        }
        ErrorKind::InvalidToken
        | ErrorKind::InvalidSignature
        | ErrorKind::InvalidAlgorithm
        | ErrorKind::Base64(_)
        | ErrorKind::Json(_)
        | ErrorKind::Utf8(_) => VerifyError::TokenMalformed {
            reason: err.to_string(),
        },
        _ => VerifyError::TokenUnhandled {
            reason: err.to_string(),
        },
    }
}
