//! Ledger error types

use thiserror::Error;

/// Failures raised while talking to the ledger
///
/// Remote failures are classified once, at the connector boundary, so callers
/// match on variants instead of inspecting message text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// The wallet has no identity for the requested role
    #[error("An identity for the user \"{role}\" does not exist in the wallet")]
    IdentityNotFound { role: String },

    /// Profile, network, channel or contract resolution failure
    #[error("{0}")]
    Connection(String),

    /// The contract reported a missing asset
    #[error("{0}")]
    NotFound(String),

    /// The contract refused the caller
    #[error("{0}")]
    AccessDenied(String),

    /// Any other contract failure
    #[error("{0}")]
    Remote(String),
}

impl LedgerError {
    /// Classify a failure message returned by the contract
    pub fn from_remote_message(message: impl Into<String>) -> Self {
        let message = message.into();
        let lowered = message.to_lowercase();
        if lowered.contains("does not exist") {
            Self::NotFound(message)
        } else if lowered.contains("access denied") {
            Self::AccessDenied(message)
        } else {
            Self::Remote(message)
        }
    }

    pub fn connection(context: &str, err: impl std::fmt::Display) -> Self {
        Self::Connection(format!("{context}: {err}"))
    }

    /// Whether the connection that produced this error is still usable
    pub const fn is_connection_failure(&self) -> bool {
        matches!(self, Self::Connection(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_not_found() {
        let err = LedgerError::from_remote_message("the asset a1 does not exist");
        assert_eq!(err, LedgerError::NotFound("the asset a1 does not exist".to_string()));
    }

    #[test]
    fn test_classify_access_denied() {
        let err = LedgerError::from_remote_message(
            "access denied: you can only view your own assets",
        );
        assert!(matches!(err, LedgerError::AccessDenied(_)));
    }

    #[test]
    fn test_classify_ignores_case() {
        let err = LedgerError::from_remote_message("Access Denied for asset a1");
        assert!(matches!(err, LedgerError::AccessDenied(_)));
    }

    #[test]
    fn test_classify_other() {
        let err = LedgerError::from_remote_message("only admin can create assets");
        assert_eq!(err, LedgerError::Remote("only admin can create assets".to_string()));
    }

    #[test]
    fn test_identity_message() {
        let err = LedgerError::IdentityNotFound {
            role: "guest".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "An identity for the user \"guest\" does not exist in the wallet"
        );
        assert!(!err.is_connection_failure());
    }
}
