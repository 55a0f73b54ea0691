//! The contract between the gateway and its OIDC collaborator.

use async_trait::async_trait;
use keyhole_token::IdentityToken;
use keyhole_core::Result;

use crate::error::AuthenticatorError;

/// Where to send the user to log in, and the values bound to the attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationRequest {
    /// The provider authorization URL.
    pub url: String,
    /// Opaque CSRF state; the provider echoes it back on the callback.
    pub state: String,
    /// Nonce the provider must embed in the ID token.
    pub nonce: String,
}

/// An identity provider able to run the authorization-code flow.
///
/// Implementations classify exchange failures into
/// `AuthenticatorError::NotFound` and `AuthenticatorError::AuthenticationFailed`
/// so the service can map them onto HTTP outcomes.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Builds an authorization URL with a fresh CSRF state and nonce.
    fn create_authentication(&self) -> Result<AuthorizationRequest, AuthenticatorError>;

    /// Exchanges an authorization code for a verified identity.
    ///
    /// The ID token must carry `nonce`, the value issued with the
    /// authorization URL of the same attempt.
    async fn verify_authentication(
        &self,
        code: &str,
        nonce: &str,
    ) -> Result<IdentityToken, AuthenticatorError>;
}
