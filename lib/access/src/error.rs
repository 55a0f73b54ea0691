//! Error types for the access crate.
//!
//! Errors are designed for layered context using rootcause:
//! - `AuthenticatorError`: failures reported by the OIDC collaborator
//! - `ServiceError`: the coarse categories surfaced to the HTTP boundary

use std::fmt;

/// Errors reported by an `Authenticator` implementation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthenticatorError {
    /// The code exchange yielded no token, or the response carried no ID token.
    NotFound { details: String },
    /// The ID token failed verification against the provider.
    AuthenticationFailed { details: String },
    /// Any other provider or transport failure.
    Provider { details: String },
}

impl fmt::Display for AuthenticatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { details } => {
                write!(f, "identity token not found: {details}")
            }
            Self::AuthenticationFailed { details } => {
                write!(f, "authentication failed: {details}")
            }
            Self::Provider { details } => {
                write!(f, "identity provider error: {details}")
            }
        }
    }
}

impl std::error::Error for AuthenticatorError {}

/// Errors from the authentication service.
///
/// Callers branch on the variant only; the underlying report is attached as
/// the cause for logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// The requested resource does not exist.
    NotFound { reason: String },
    /// The caller could not be verified.
    Verification { reason: String },
    /// A session token could not be created for the identity.
    Creation { reason: String },
    /// The presented credentials could not be parsed or are no longer valid.
    Parse { reason: String },
    /// The identity provider failed in an unclassified way.
    Upstream { reason: String },
    /// Any other failure.
    Internal { reason: String },
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { reason } => write!(f, "resource not found: {reason}"),
            Self::Verification { reason } => write!(f, "could not verify resource: {reason}"),
            Self::Creation { reason } => write!(f, "could not create resource: {reason}"),
            Self::Parse { reason } => write!(f, "could not parse resource: {reason}"),
            Self::Upstream { reason } => write!(f, "identity provider failure: {reason}"),
            Self::Internal { reason } => write!(f, "internal error: {reason}"),
        }
    }
}

impl std::error::Error for ServiceError {}
