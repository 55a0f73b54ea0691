//! CSRF state for login attempts.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use keyhole_core::Result;

use crate::error::AuthenticatorError;

/// Number of random bytes behind each state value.
pub const STATE_BYTES: usize = 32;

/// Generates an unpredictable state value: 32 random bytes, standard base64.
pub fn generate_state() -> Result<String, AuthenticatorError> {
    let mut bytes = [0u8; STATE_BYTES];
    getrandom::fill(&mut bytes).map_err(|e| AuthenticatorError::Provider {
        details: format!("could not read random bytes: {e}"),
    })?;
    Ok(STANDARD.encode(bytes))
}
