//! Session token issuance.

use jsonwebtoken::{Algorithm, Header, encode};
use keyhole_core::Result;
use tracing::debug;

use crate::claims::IdentityClaims;
use crate::error::IssueError;
use crate::extract::{ClaimsSource, extract_claims};
use crate::key::SigningKey;
use crate::subject::Subject;

/// Issues HS256 session tokens for authenticated identities.
#[derive(Debug, Clone)]
pub struct TokenIssuer {
    key: SigningKey,
}

impl TokenIssuer {
    /// Creates an issuer signing with `key`.
    #[must_use]
    pub fn new(key: SigningKey) -> Self {
        Self { key }
    }

    /// Validates `subject`, maps the identity's claims and signs them.
    ///
    /// The subject is checked before the payload is touched; identities with
    /// a missing, malformed or unsupported subject are never decoded.
    pub fn create<S: ClaimsSource>(
        &self,
        source: &S,
        subject: &str,
    ) -> Result<String, IssueError> {
        let subject = Subject::parse(subject)?;
        let claims = extract_claims(source, subject.provider())?;
        let token = self.sign(&claims)?;

        debug!(provider = %subject.provider(), "issued session token");

        Ok(token)
    }

    /// Signs already-normalized claims into a compact token.
    pub fn sign(&self, claims: &IdentityClaims) -> Result<String, IssueError> {
        encode(&Header::new(Algorithm::HS256), claims, self.key.encoding()).map_err(|e| {
            IssueError::SigningFailed {
                reason: e.to_string(),
            }
            .into()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::IdentityToken;
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use keyhole_core::Provider;
    use serde::de::DeserializeOwned;
    use serde_json::json;
    use std::cell::Cell;

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(SigningKey::from_secret(b"signingKey"))
    }

    fn sample_identity() -> IdentityToken {
        IdentityToken::new(
            "google-oauth2|abc123".to_string(),
            json!({
                "name": "Ann",
                "email": "a@x.com",
                "picture": "http://x/p.png",
                "sub": "google-oauth2|abc123",
                "aud": "A",
                "exp": 123,
                "iat": 100,
                "iss": "I"
            }),
        )
    }

    /// Records whether the payload was ever decoded.
    struct CountingSource {
        decoded: Cell<usize>,
    }

    impl CountingSource {
        fn new() -> Self {
            Self {
                decoded: Cell::new(0),
            }
        }
    }

    impl ClaimsSource for CountingSource {
        fn subject(&self) -> &str {
            ""
        }

        fn decode_claims<T: DeserializeOwned>(&self) -> std::result::Result<T, serde_json::Error> {
            self.decoded.set(self.decoded.get() + 1);
            serde_json::from_value(json!({}))
        }
    }

    fn decode_segment(segment: &str) -> serde_json::Value {
        let bytes = URL_SAFE_NO_PAD.decode(segment).expect("base64url");
        serde_json::from_slice(&bytes).expect("json")
    }

    #[test]
    fn creates_compact_hs256_token() {
        let token = issuer()
            .create(&sample_identity(), "google-oauth2|abc123")
            .expect("create");

        let parts: Vec<&str> = token.split('.').collect();
        assert_eq!(parts.len(), 3);
        assert!(parts.iter().all(|part| !part.is_empty()));

        let header = decode_segment(parts[0]);
        assert_eq!(header["alg"], "HS256");
        assert_eq!(header["typ"], "JWT");

        let payload = decode_segment(parts[1]);
        assert_eq!(payload["metadata"]["name"], "Ann");
        assert_eq!(payload["metadata"]["email"], "a@x.com");
        assert_eq!(payload["metadata"]["avatar_url"], "http://x/p.png");
        assert_eq!(payload["metadata"]["o_auth_provider"], "google-oauth2");
        assert_eq!(payload["aud"], "A");
        assert_eq!(payload["exp"], 123);
        assert_eq!(payload["iat"], 100);
        assert_eq!(payload["iss"], "I");
        assert_eq!(payload["sub"], "google-oauth2|abc123");
    }

    #[test]
    fn signing_is_deterministic() {
        let first = issuer()
            .create(&sample_identity(), "google-oauth2|abc123")
            .expect("create");
        let second = issuer()
            .create(&sample_identity(), "google-oauth2|abc123")
            .expect("create");
        assert_eq!(first, second);
    }

    #[test]
    fn windowslive_subject_tags_provider() {
        let token = issuer()
            .create(&sample_identity(), "windowslive|0f1e2d")
            .expect("create");
        let payload = decode_segment(token.split('.').nth(1).expect("payload"));
        assert_eq!(
            payload["metadata"]["o_auth_provider"],
            Provider::WindowsLive.as_str()
        );
    }

    #[test]
    fn rejected_subjects_never_reach_extractor() {
        let cases = [
            ("", "missing"),
            ("google-oauth2", "malformed"),
            ("google-oauth2|a|b", "malformed"),
            ("random subject", "malformed"),
            ("github|42", "unsupported"),
        ];

        for (subject, expected) in cases {
            let source = CountingSource::new();
            let err = issuer().create(&source, subject).expect_err(subject);

            let kind = match err.current_context() {
                IssueError::SubjectMissing => "missing",
                IssueError::SubjectMalformed { .. } => "malformed",
                IssueError::UnsupportedProvider { .. } => "unsupported",
                other => panic!("unexpected error for {subject}: {other}"),
            };
            assert_eq!(kind, expected, "subject {subject:?}");
            assert_eq!(source.decoded.get(), 0, "subject {subject:?}");
        }
    }

    #[test]
    fn unsupported_provider_message_names_value_and_set() {
        let err = issuer()
            .create(&sample_identity(), "facebook|99")
            .expect_err("should reject");
        let message = err.to_string();
        assert!(message.contains("facebook"));
        assert!(message.contains("google-oauth2 and windowslive"));
    }

    #[test]
    fn accepted_subject_decodes_payload_once() {
        let source = CountingSource::new();
        issuer()
            .create(&source, "google-oauth2|abc123")
            .expect("create");
        assert_eq!(source.decoded.get(), 1);
    }

    #[test]
    fn unreadable_claims_fail_issuance() {
        let source = IdentityToken::new(
            "google-oauth2|abc123".to_string(),
            json!({"iat": "yesterday"}),
        );
        let err = issuer()
            .create(&source, "google-oauth2|abc123")
            .expect_err("should fail");
        assert!(matches!(
            err.current_context(),
            IssueError::ClaimsUnreadable { .. }
        ));
    }
}
