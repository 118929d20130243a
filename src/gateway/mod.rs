// ============================================================================
// Edge Gateway - Admission Control
// ============================================================================
//
// The gateway gate-keeps every write request before its payload is allowed
// into the message channel:
//
// 1. The request must carry an `apiKey` header.
// 2. The key is checked remotely against the account service.
// 3. The body must decode as JSON.
// 4. The decoded document is published to the channel.
//
// The remote check is three-valued: a key is Allowed, Denied, or - when the
// account service cannot be reached or answers unexpectedly - Indeterminate.
// What happens to indeterminate requests is an explicit policy decision,
// not a silent default.
//
// ============================================================================

mod auth_client;
mod retry;

pub use auth_client::{CredentialChecker, CredentialClient};
pub use retry::with_retry;

use std::str::FromStr;

use crate::error::AppError;

/// Outcome of a remote credential check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDecision {
    /// The key exists and is unexpired.
    Allowed,
    /// The credential store explicitly reported the key as unknown.
    Denied,
    /// The check could not be completed (transport failure, timeout, or an
    /// unexpected response) even after retries.
    Indeterminate,
}

/// Policy applied to [`KeyDecision::Indeterminate`] outcomes.
///
/// `FailClosed` rejects requests whose key could not be verified.
/// `FailOpen` admits them, trading safety for availability when the
/// credential service is down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdmissionPolicy {
    #[default]
    FailClosed,
    FailOpen,
}

impl FromStr for AdmissionPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fail-closed" | "closed" => Ok(Self::FailClosed),
            "fail-open" | "open" => Ok(Self::FailOpen),
            _ => anyhow::bail!(
                "invalid admission policy: {}. Must be 'fail-closed' or 'fail-open'",
                s
            ),
        }
    }
}

impl AdmissionPolicy {
    /// Decides whether a request with this check outcome may proceed.
    pub fn admit(&self, decision: KeyDecision) -> Result<(), AppError> {
        match (decision, self) {
            (KeyDecision::Allowed, _) => Ok(()),
            (KeyDecision::Denied, _) => Err(AppError::auth("invalid API key")),
            (KeyDecision::Indeterminate, AdmissionPolicy::FailOpen) => {
                tracing::warn!("credential check inconclusive, admitting request (fail-open)");
                Ok(())
            }
            (KeyDecision::Indeterminate, AdmissionPolicy::FailClosed) => {
                Err(AppError::downstream("could not verify API key"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn allowed_is_admitted_under_both_policies() {
        assert!(AdmissionPolicy::FailClosed.admit(KeyDecision::Allowed).is_ok());
        assert!(AdmissionPolicy::FailOpen.admit(KeyDecision::Allowed).is_ok());
    }

    #[test]
    fn denied_is_unauthorized_under_both_policies() {
        for policy in [AdmissionPolicy::FailClosed, AdmissionPolicy::FailOpen] {
            let err = policy.admit(KeyDecision::Denied).unwrap_err();
            assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
        }
    }

    #[test]
    fn indeterminate_follows_the_policy() {
        let err = AdmissionPolicy::FailClosed
            .admit(KeyDecision::Indeterminate)
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        assert!(AdmissionPolicy::FailOpen
            .admit(KeyDecision::Indeterminate)
            .is_ok());
    }

    #[test]
    fn policy_parses_from_config_strings() {
        assert_eq!(
            "fail-closed".parse::<AdmissionPolicy>().unwrap(),
            AdmissionPolicy::FailClosed
        );
        assert_eq!(
            "fail-open".parse::<AdmissionPolicy>().unwrap(),
            AdmissionPolicy::FailOpen
        );
        assert!("maybe".parse::<AdmissionPolicy>().is_err());
    }
}
