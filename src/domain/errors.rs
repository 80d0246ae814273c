//! Domain errors for the rulebridge system.

use thiserror::Error;

/// Errors surfaced by the remote document API.
///
/// All three variants propagate unchanged from the entity client through
/// the coordinator to the tool-call handler. None are retried automatically
/// and none are cached: a failed lookup hits the network again on the
/// next call.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The remote store has no document with the given id.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// The attached credential is missing or was rejected (401/403).
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Transport failure, timeout, or a 5xx from the remote store.
    #[error("Network error: {0}")]
    Network(String),
}

impl ApiError {
    /// Build a `NotFound` for a project id.
    pub fn project_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            kind: "Project",
            id: id.into(),
        }
    }

    /// Build a `NotFound` for a rule id.
    pub fn rule_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            kind: "Rule",
            id: id.into(),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display_includes_kind_and_id() {
        let err = ApiError::rule_not_found("r42");
        assert_eq!(err.to_string(), "Rule not found: r42");

        let err = ApiError::project_not_found("p1");
        assert_eq!(err.to_string(), "Project not found: p1");
    }

    #[test]
    fn test_network_display() {
        let err = ApiError::Network("connection refused".to_string());
        assert_eq!(err.to_string(), "Network error: connection refused");
    }
}
