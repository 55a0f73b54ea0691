//! OIDC client implementation using the openidconnect crate.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use keyhole_access::csrf::generate_state;
use keyhole_access::{Authenticator, AuthenticatorError, AuthorizationRequest, OidcConfig};
use keyhole_token::IdentityToken;
use openidconnect::core::{CoreAuthenticationFlow, CoreClient, CoreProviderMetadata};
use openidconnect::{
    AuthorizationCode, ClientId, ClientSecret, CsrfToken, IssuerUrl, Nonce, RedirectUrl, Scope,
    TokenResponse,
};
use rootcause::Report;
use std::fmt;
use tracing::{debug, instrument};

/// OIDC client for authenticating users against the upstream provider.
pub struct OidcClient {
    provider_metadata: CoreProviderMetadata,
    client_id: ClientId,
    client_secret: ClientSecret,
    redirect_url: RedirectUrl,
    http_client: reqwest::Client,
    config: OidcConfig,
}

impl OidcClient {
    /// Creates a new OIDC client by discovering the provider metadata.
    #[instrument(skip_all, fields(issuer = config.issuer_url()))]
    pub async fn discover(config: OidcConfig) -> Result<Self, Report<OidcError>> {
        let issuer_url = IssuerUrl::new(config.issuer_url().to_string())
            .map_err(|e| OidcError::Configuration(format!("invalid issuer URL: {e}")))?;

        let http_client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| OidcError::Configuration(format!("failed to create HTTP client: {e}")))?;

        let provider_metadata = CoreProviderMetadata::discover_async(issuer_url, &http_client)
            .await
            .map_err(|e| OidcError::Discovery(format!("failed to discover provider: {e}")))?;

        let redirect_url = RedirectUrl::new(config.redirect_uri().to_string())
            .map_err(|e| OidcError::Configuration(format!("invalid redirect URI: {e}")))?;

        let client_id = ClientId::new(config.client_id().to_string());
        let client_secret = ClientSecret::new(config.client_secret().to_string());

        Ok(Self {
            provider_metadata,
            client_id,
            client_secret,
            redirect_url,
            http_client,
            config,
        })
    }
}

#[async_trait]
impl Authenticator for OidcClient {
    fn create_authentication(&self) -> Result<AuthorizationRequest, Report<AuthenticatorError>> {
        let state = generate_state()?;
        let nonce = generate_state()?;

        let client = CoreClient::from_provider_metadata(
            self.provider_metadata.clone(),
            self.client_id.clone(),
            Some(self.client_secret.clone()),
        )
        .set_redirect_uri(self.redirect_url.clone());

        let csrf_token = CsrfToken::new(state.clone());
        let id_token_nonce = Nonce::new(nonce.clone());
        let mut auth_request = client.authorize_url(
            CoreAuthenticationFlow::AuthorizationCode,
            move || csrf_token,
            move || id_token_nonce,
        );

        // The authorization-code flow always requests "openid".
        for scope in self.config.scopes() {
            if scope != "openid" {
                auth_request = auth_request.add_scope(Scope::new(scope.to_string()));
            }
        }

        let (auth_url, _, _) = auth_request.url();

        Ok(AuthorizationRequest {
            url: auth_url.to_string(),
            state,
            nonce,
        })
    }

    #[instrument(skip_all)]
    async fn verify_authentication(
        &self,
        code: &str,
        nonce: &str,
    ) -> Result<IdentityToken, Report<AuthenticatorError>> {
        let client = CoreClient::from_provider_metadata(
            self.provider_metadata.clone(),
            self.client_id.clone(),
            Some(self.client_secret.clone()),
        )
        .set_redirect_uri(self.redirect_url.clone());

        let token_request = client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .map_err(|e| AuthenticatorError::Provider {
                details: format!("token endpoint error: {e}"),
            })?;

        let token_response = token_request
            .request_async(&self.http_client)
            .await
            .map_err(|e| AuthenticatorError::NotFound {
                details: format!("token exchange failed: {e}"),
            })?;

        let id_token = token_response
            .id_token()
            .ok_or_else(|| AuthenticatorError::NotFound {
                details: "no ID token in response".to_string(),
            })?;

        let claims = id_token
            .claims(&client.id_token_verifier(), |actual: Option<&Nonce>| {
                verify_nonce(nonce, actual)
            })
            .map_err(|e| AuthenticatorError::AuthenticationFailed {
                details: format!("ID token validation failed: {e}"),
            })?;

        let subject = claims.subject().to_string();
        let payload = raw_payload(&token_response)?;
        debug!(subject = %subject, "verified ID token");

        Ok(IdentityToken::new(subject, payload))
    }
}

/// Checks the ID token nonce against the one issued for this login.
fn verify_nonce(expected: &str, actual: Option<&Nonce>) -> Result<(), String> {
    match actual {
        Some(actual) if actual.secret() == expected => Ok(()),
        Some(_) => Err("nonce does not match".to_string()),
        None => Err("nonce is missing".to_string()),
    }
}

/// Extracts the raw claims of the ID token in a token response.
///
/// The typed claims only carry the standard set; the raw payload keeps every
/// claim the provider sent so the token crate can map them per provider.
fn raw_payload<TR>(token_response: &TR) -> Result<serde_json::Value, Report<AuthenticatorError>>
where
    TR: serde::Serialize,
{
    let response_json =
        serde_json::to_value(token_response).map_err(|e| AuthenticatorError::Provider {
            details: format!("failed to serialize token response: {e}"),
        })?;

    let id_token = response_json
        .get("id_token")
        .and_then(|v| v.as_str())
        .ok_or_else(|| AuthenticatorError::NotFound {
            details: "no id_token in response".to_string(),
        })?;

    decode_payload(id_token)
}

fn decode_payload(jwt: &str) -> Result<serde_json::Value, Report<AuthenticatorError>> {
    let parts: Vec<&str> = jwt.split('.').collect();
    let [_, payload, _] = parts.as_slice() else {
        return Err(AuthenticatorError::Provider {
            details: "invalid JWT format".to_string(),
        }
        .into());
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|e| AuthenticatorError::Provider {
            details: format!("failed to decode JWT payload: {e}"),
        })?;

    serde_json::from_slice(&bytes)
        .map_err(|e| {
            AuthenticatorError::Provider {
                details: format!("failed to parse JWT payload: {e}"),
            }
            .into()
        })
}

/// OIDC setup errors.
#[derive(Debug)]
pub enum OidcError {
    /// Configuration error (invalid URLs, etc.)
    Configuration(String),
    /// Failed to discover provider metadata.
    Discovery(String),
}

impl fmt::Display for OidcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration(msg) => write!(f, "OIDC configuration error: {msg}"),
            Self::Discovery(msg) => write!(f, "OIDC discovery error: {msg}"),
        }
    }
}

impl std::error::Error for OidcError {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn jwt_with(payload: &serde_json::Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(payload.to_string());
        format!("{header}.{body}.c2lnbmF0dXJl")
    }

    #[test]
    fn payload_is_read_from_token_response() {
        let claims = json!({
            "sub": "google-oauth2|abc123",
            "name": "Ann",
            "picture": "http://x/p.png"
        });
        let response = json!({
            "access_token": "at",
            "token_type": "bearer",
            "id_token": jwt_with(&claims)
        });

        let payload = raw_payload(&response).expect("payload");
        assert_eq!(payload, claims);
    }

    #[test]
    fn missing_id_token_is_not_found() {
        let response = json!({"access_token": "at", "token_type": "bearer"});
        let err = raw_payload(&response).expect_err("should fail");
        assert!(matches!(
            err.current_context(),
            AuthenticatorError::NotFound { .. }
        ));
    }

    #[test]
    fn malformed_jwt_is_rejected() {
        for jwt in ["", "a.b", "a.b.c.d", "a.!!!.c"] {
            let err = decode_payload(jwt).expect_err(jwt);
            assert!(matches!(
                err.current_context(),
                AuthenticatorError::Provider { .. }
            ));
        }
    }

    #[test]
    fn nonce_must_match_the_issued_one() {
        assert!(verify_nonce("n-0", Some(&Nonce::new("n-0".to_string()))).is_ok());
        assert_eq!(
            verify_nonce("n-0", Some(&Nonce::new("n-1".to_string()))),
            Err("nonce does not match".to_string())
        );
        assert_eq!(
            verify_nonce("n-0", None),
            Err("nonce is missing".to_string())
        );
    }

    #[test]
    fn non_json_payload_is_rejected() {
        let jwt = format!("h.{}.s", URL_SAFE_NO_PAD.encode("not json"));
        let err = decode_payload(&jwt).expect_err("should fail");
        assert!(err.current_context().to_string().contains("parse"));
    }
}
