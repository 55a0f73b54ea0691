//! Error types for the token crate.
//!
//! Errors are carried in rootcause reports:
//! - `IssueError`: failures while turning an identity into a signed token
//! - `VerifyError`: failures while reading a previously issued token

use std::fmt;

/// Errors from token issuance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueError {
    /// The identity carries no subject, or the provider segment is empty.
    SubjectMissing,
    /// The subject is not of the form `<provider>|<id>`.
    SubjectMalformed { subject: String },
    /// The subject names a provider outside the supported set.
    UnsupportedProvider { value: String, supported: String },
    /// The raw identity payload could not be decoded.
    ClaimsUnreadable { reason: String },
    /// The claims could not be encoded or signed.
    SigningFailed { reason: String },
}

impl fmt::Display for IssueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SubjectMissing => {
                write!(f, "subject not found")
            }
            Self::SubjectMalformed { subject } => {
                write!(f, "malformed subject '{subject}': want <provider>|<id>")
            }
            Self::UnsupportedProvider { value, supported } => {
                write!(f, "unsupported provider: got: ({value}), want: ({supported})")
            }
            Self::ClaimsUnreadable { reason } => {
                write!(f, "could not read identity claims: {reason}")
            }
            Self::SigningFailed { reason } => {
                write!(f, "could not sign token: {reason}")
            }
        }
    }
}

impl std::error::Error for IssueError {}

/// Errors from token verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyError {
    /// The token is structurally invalid or its signature does not match.
    TokenMalformed { reason: String },
    /// The token is outside its `iat`..`exp` validity window.
    TokenExpiredOrNotYetValid,
    /// Any other failure while parsing the token.
    TokenUnhandled { reason: String },
}

impl fmt::Display for VerifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TokenMalformed { reason } => {
                write!(f, "malformed token: {reason}")
            }
            Self::TokenExpiredOrNotYetValid => {
                write!(f, "token has expired or is not valid yet")
            }
            Self::TokenUnhandled { reason } => {
                write!(f, "could not handle token: {reason}")
            }
        }
    }
}

impl std::error::Error for VerifyError {}
