//! Subject identifiers issued by the upstream broker.

use keyhole_core::Provider;
use keyhole_core::Result;
use std::fmt;

use crate::error::IssueError;

/// A parsed `<provider>|<provider-user-id>` subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    provider: Provider,
    user_id: String,
}

impl Subject {
    /// Parses and validates a subject.
    ///
    /// Checks run in order: the subject must be non-empty, split into exactly
    /// two non-empty `|`-delimited segments, and name a supported provider.
    /// An empty provider segment counts as a missing subject.
    pub fn parse(subject: &str) -> Result<Self, IssueError> {
        if subject.is_empty() {
            return Err(IssueError::SubjectMissing.into());
        }

        let segments: Vec<&str> = subject.split('|').collect();
        let [provider, user_id] = segments.as_slice() else {
            return Err(IssueError::SubjectMalformed {
                subject: subject.to_string(),
            }
            .into());
        };

        if provider.is_empty() {
            return Err(IssueError::SubjectMissing.into());
        }

        if user_id.is_empty() {
            return Err(IssueError::SubjectMalformed {
                subject: subject.to_string(),
            }
            .into());
        }

        let provider = provider
            .parse::<Provider>()
            .map_err(|e| IssueError::UnsupportedProvider {
                value: e.value,
                supported: Provider::supported(),
            })?;

        Ok(Self {
            provider,
            user_id: (*user_id).to_string(),
        })
    }

    /// Returns the provider that authenticated the subject.
    #[must_use]
    pub fn provider(&self) -> Provider {
        self.provider
    }

    /// Returns the provider-specific user ID.
    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.provider, self.user_id)
    }
}
