//! Authentication service.
//!
//! Composes the OIDC collaborator with token issuance and verification and
//! re-classifies every failure into a `ServiceError` category.

use keyhole_token::{
    ClaimsSource, IdentityClaims, IssueError, SigningKey, TokenIssuer, TokenVerifier, VerifyError,
};
use keyhole_core::Result;
use tracing::{debug, instrument, warn};

use crate::authenticator::{Authenticator, AuthorizationRequest};
use crate::error::{AuthenticatorError, ServiceError};

/// Login and identity operations over an `Authenticator`.
pub struct AuthenticationService<A> {
    authenticator: A,
    issuer: TokenIssuer,
    verifier: TokenVerifier,
}

impl<A: Authenticator> AuthenticationService<A> {
    /// Creates a service issuing and verifying tokens with `key`.
    #[must_use]
    pub fn new(authenticator: A, key: SigningKey) -> Self {
        Self {
            authenticator,
            issuer: TokenIssuer::new(key.clone()),
            verifier: TokenVerifier::new(key),
        }
    }

    /// Returns the underlying authenticator.
    #[must_use]
    pub fn authenticator(&self) -> &A {
        &self.authenticator
    }

    /// Starts a login: returns the provider URL plus the CSRF state and nonce
    /// to store.
    #[instrument(skip(self))]
    pub fn begin_authentication(&self) -> Result<AuthorizationRequest, ServiceError> {
        self.authenticator.create_authentication().map_err(|report| {
            warn!(error = %report, "could not create authentication");
            let reason = report.current_context().to_string();
            report.context(ServiceError::Upstream { reason })
        })
    }

    /// Exchanges `code` with the provider and issues a session token.
    ///
    /// `nonce` is the value returned by `begin_authentication` for this login.
    #[instrument(skip_all)]
    pub async fn complete_authentication(
        &self,
        code: &str,
        nonce: &str,
    ) -> Result<String, ServiceError> {
        let identity = self
            .authenticator
            .verify_authentication(code, nonce)
            .await
            .map_err(|report| {
                let reason = report.current_context().to_string();
                let category = match report.current_context() {
                    AuthenticatorError::NotFound { .. } => ServiceError::NotFound { reason },
                    AuthenticatorError::AuthenticationFailed { .. } => {
                        ServiceError::Verification { reason }
                    }
                    AuthenticatorError::Provider { .. } => ServiceError::Upstream { reason },
                };
                warn!(error = %report, "could not verify authentication");
                report.context(category)
            })?;

        self.issuer
            .create(&identity, identity.subject())
            .map_err(|report| {
                let reason = report.current_context().to_string();
                let category = match report.current_context() {
                    IssueError::SubjectMissing
                    | IssueError::SubjectMalformed { .. }
                    | IssueError::UnsupportedProvider { .. } => ServiceError::Creation { reason },
                    IssueError::ClaimsUnreadable { .. } | IssueError::SigningFailed { .. } => {
                        ServiceError::Internal { reason }
                    }
                };
                warn!(error = %report, "could not create token");
                report.context(category)
            })
    }

    /// Resolves an `Authorization` header value into the caller's claims.
    ///
    /// Malformed and expired tokens are reported as `ServiceError::Parse`.
    #[instrument(skip_all)]
    pub fn identity(&self, authorization: &str) -> Result<IdentityClaims, ServiceError> {
        let token = bearer_token(authorization)?;

        self.verifier.claims(token).map_err(|report| {
            let category = verification_category(report.current_context());
            debug!(error = %report, "could not fetch claims");
            report.context(category)
        })
    }

    /// Resolves an `Authorization` header value into the JSON claims body.
    pub fn fetch_identity(&self, authorization: &str) -> Result<Vec<u8>, ServiceError> {
        let claims = self.identity(authorization)?;
        serde_json::to_vec(&claims).map_err(|e| {
            ServiceError::Internal {
                reason: format!("could not marshal claims: {e}"),
            }
            .into()
        })
    }
}

/// Malformed and expired tokens are the caller's fault; anything else is ours.
fn verification_category(error: &VerifyError) -> ServiceError {
    let reason = error.to_string();
    match error {
        VerifyError::TokenMalformed { .. } | VerifyError::TokenExpiredOrNotYetValid => {
            ServiceError::Parse { reason }
        }
        VerifyError::TokenUnhandled { .. } => ServiceError::Internal { reason },
    }
}

/// Splits `Bearer <token>` into its token.
fn bearer_token(authorization: &str) -> Result<&str, ServiceError> {
    let parts: Vec<&str> = authorization.split_whitespace().collect();
    let [scheme, token] = parts.as_slice() else {
        return Err(ServiceError::Parse {
            reason: "invalid token length".to_string(),
        }
        .into());
    };

    if !scheme.eq_ignore_ascii_case("Bearer") {
        return Err(ServiceError::Parse {
            reason: "invalid token type".to_string(),
        }
        .into());
    }

    Ok(*token)
}
