//! Session token issuance and verification for keyhole.
//!
//! This crate provides:
//! - Subject parsing (`Subject`) for `<provider>|<id>` identifiers
//! - Provider claim mapping (`extract_claims`) into `IdentityClaims`
//! - HS256 token signing (`TokenIssuer`) and verification (`TokenVerifier`)
//!   over a shared `SigningKey`
//!
//! # Example
//!
//! ```
//! use keyhole_token::{IdentityToken, SigningKey, TokenIssuer, TokenVerifier};
//! use serde_json::json;
//!
//! let key = SigningKey::from_secret(b"correct horse battery staple");
//! let issuer = TokenIssuer::new(key.clone());
//! let verifier = TokenVerifier::new(key);
//!
//! let identity = IdentityToken::new(
//!     "google-oauth2|abc123".to_string(),
//!     json!({
//!         "aud": "A", "exp": 4_102_444_800_i64, "iat": 100, "iss": "I",
//!         "sub": "google-oauth2|abc123", "name": "Ann", "email": "a@x.com",
//!         "picture": "http://x/p.png"
//!     }),
//! );
//!
//! let token = issuer.create(&identity, "google-oauth2|abc123").expect("issue");
//! let claims = verifier.claims(&token).expect("verify");
//! assert_eq!(claims.metadata.name, "Ann");
//! ```

pub mod claims;
pub mod error;
pub mod extract;
pub mod issuer;
pub mod key;
pub mod subject;
pub mod verifier;

pub use claims::{IdentityClaims, Metadata};
pub use error::{IssueError, VerifyError};
pub use extract::{ClaimsSource, IdentityToken, extract_claims};
pub use issuer::TokenIssuer;
pub use key::SigningKey;
pub use subject::Subject;
pub use verifier::TokenVerifier;
