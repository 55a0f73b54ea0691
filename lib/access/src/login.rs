//! The lifecycle of a single login attempt.
//!
//! ```text
//! Idle --begin--> AwaitingCallback --complete--> Completed
//!   |                    |
//!   +------failure-------+-------failure-------> Failed
//! ```
//!
//! The HTTP layer holds the CSRF state and nonce between the two requests of
//! a login, so an attempt is rebuilt from the stored values with
//! [`LoginAttempt::resume`] when the callback arrives.

use keyhole_core::Result;
use tracing::debug;

use crate::authenticator::{Authenticator, AuthorizationRequest};
use crate::error::ServiceError;
use crate::service::AuthenticationService;

/// State of a login attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginState {
    /// Nothing has happened yet.
    Idle,
    /// The user was sent to the provider with `csrf_state` and `nonce`.
    AwaitingCallback { csrf_state: String, nonce: String },
    /// A session token was issued.
    Completed,
    /// The attempt failed; it cannot be resumed.
    Failed,
}

/// A single login attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginAttempt {
    state: LoginState,
}

impl Default for LoginAttempt {
    fn default() -> Self {
        Self::new()
    }
}

impl LoginAttempt {
    /// Creates an idle attempt.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: LoginState::Idle,
        }
    }

    /// Rebuilds an attempt that is waiting for the provider callback.
    #[must_use]
    pub fn resume(csrf_state: String, nonce: String) -> Self {
        Self {
            state: LoginState::AwaitingCallback { csrf_state, nonce },
        }
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> &LoginState {
        &self.state
    }

    /// Asks the provider for an authorization URL.
    ///
    /// Moves `Idle` to `AwaitingCallback`, or to `Failed` if the provider
    /// cannot build the request.
    pub fn begin<A: Authenticator>(
        &mut self,
        service: &AuthenticationService<A>,
    ) -> Result<AuthorizationRequest, ServiceError> {
        if self.state != LoginState::Idle {
            return Err(ServiceError::Verification {
                reason: "login attempt already started".to_string(),
            }
            .into());
        }

        match service.begin_authentication() {
            Ok(request) => {
                self.state = LoginState::AwaitingCallback {
                    csrf_state: request.state.clone(),
                    nonce: request.nonce.clone(),
                };
                Ok(request)
            }
            Err(report) => {
                self.state = LoginState::Failed;
                Err(report)
            }
        }
    }

    /// Completes the attempt with the callback's `state` and `code`.
    ///
    /// The returned state must match the stored one and a non-empty code must
    /// be present; both failures are `ServiceError::Verification`. The attempt
    /// ends in `Completed` with a session token or in `Failed`.
    pub async fn complete<A: Authenticator>(
        &mut self,
        service: &AuthenticationService<A>,
        returned_state: &str,
        code: Option<&str>,
    ) -> Result<String, ServiceError> {
        let result = self.exchange(service, returned_state, code).await;
        self.state = match &result {
            Ok(_) => LoginState::Completed,
            Err(_) => LoginState::Failed,
        };
        result
    }

    async fn exchange<A: Authenticator>(
        &self,
        service: &AuthenticationService<A>,
        returned_state: &str,
        code: Option<&str>,
    ) -> Result<String, ServiceError> {
        let LoginState::AwaitingCallback { csrf_state, nonce } = &self.state else {
            return Err(ServiceError::Verification {
                reason: "login attempt is not awaiting a callback".to_string(),
            }
            .into());
        };

        if returned_state != csrf_state {
            debug!("callback state does not match the stored state");
            return Err(ServiceError::Verification {
                reason: "invalid state parameter".to_string(),
            }
            .into());
        }

        let code = code.filter(|code| !code.is_empty()).ok_or_else(|| {
            ServiceError::Verification {
                reason: "invalid code parameter".to_string(),
            }
        })?;

        service.complete_authentication(code, nonce).await
    }
}
