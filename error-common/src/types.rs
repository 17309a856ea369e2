use serde::{Deserialize, Serialize};
use std::fmt;

use crate::codes;

/// Classification of every failure that crosses the authentication boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Blacklist, rate limit, locked or suspended account. The user retries later.
    PolicyDenial,
    /// Wrong password or unknown user. The user retries immediately.
    CredentialFailure,
    /// Fingerprint mismatch. Forces re-authentication.
    SecurityViolation,
    /// Malformed input. The user corrects it and resubmits.
    ValidationError,
    /// A store or collaborator failed. Never exposes internals.
    SystemFailure,
}

impl ErrorCategory {
    /// HTTP status a transport layer should answer with
    pub fn status_code(&self) -> u16 {
        match self {
            Self::PolicyDenial => 403,
            Self::CredentialFailure | Self::SecurityViolation => 401,
            Self::ValidationError => 422,
            Self::SystemFailure => 503,
        }
    }

    /// Default error code for the category
    pub fn code(&self) -> &'static str {
        match self {
            Self::PolicyDenial => codes::policy::ACCESS_DENIED,
            Self::CredentialFailure => codes::credential::INVALID_CREDENTIALS,
            Self::SecurityViolation => codes::security::SESSION_INVALID,
            Self::ValidationError => codes::validation::INVALID_INPUT,
            Self::SystemFailure => codes::system::UNAVAILABLE,
        }
    }

    /// Whether the user can recover without re-authenticating
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::SecurityViolation)
    }

    /// Log severity attached to failures of this category
    pub fn severity(&self) -> Severity {
        match self {
            Self::ValidationError | Self::CredentialFailure => Severity::Info,
            Self::PolicyDenial => Severity::Notice,
            Self::SecurityViolation => Severity::Critical,
            Self::SystemFailure => Severity::Error,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PolicyDenial => "policy_denial",
            Self::CredentialFailure => "credential_failure",
            Self::SecurityViolation => "security_violation",
            Self::ValidationError => "validation_error",
            Self::SystemFailure => "system_failure",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Audit/log severity, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Notice,
    Warning,
    Error,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Notice => "notice",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ErrorCategory::PolicyDenial.status_code(), 403);
        assert_eq!(ErrorCategory::CredentialFailure.status_code(), 401);
        assert_eq!(ErrorCategory::SecurityViolation.status_code(), 401);
        assert_eq!(ErrorCategory::ValidationError.status_code(), 422);
        assert_eq!(ErrorCategory::SystemFailure.status_code(), 503);
    }

    #[test]
    fn test_security_violation_is_the_only_unrecoverable_category() {
        assert!(!ErrorCategory::SecurityViolation.is_recoverable());
        assert!(ErrorCategory::PolicyDenial.is_recoverable());
        assert!(ErrorCategory::CredentialFailure.is_recoverable());
        assert!(ErrorCategory::ValidationError.is_recoverable());
        assert!(ErrorCategory::SystemFailure.is_recoverable());
    }

    #[test]
    fn test_security_violation_outranks_timeouts() {
        assert!(ErrorCategory::SecurityViolation.severity() > ErrorCategory::PolicyDenial.severity());
        assert!(Severity::Critical > Severity::Warning);
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&ErrorCategory::CredentialFailure).unwrap();
        assert_eq!(json, "\"credential_failure\"");
    }
}
