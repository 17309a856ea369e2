use audit_engine::FailureReason;
use error_common::{codes, sanitize_for_client, ErrorCategory};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::password::PasswordViolation;

/// Failure of a store collaborator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Record not found: {0}")]
    NotFound(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Internal errors. These never reach a client; see [`AuthFailure`].
#[derive(Error, Debug)]
pub enum IdentityError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Crypto error: {0}")]
    Crypto(#[from] crypto::CryptoError),

    #[error("Email error: {0}")]
    Email(#[from] email_service::EmailError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Password rejected: {0:?}")]
    PasswordRejected(Vec<PasswordViolation>),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Account not found")]
    AccountNotFound,

    #[error("Reset token invalid or expired")]
    InvalidResetToken,

    #[error("Background task failed: {0}")]
    Task(String),
}

impl From<config::ConfigError> for IdentityError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<tokio::task::JoinError> for IdentityError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Task(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, IdentityError>;

/// What the caller of the authentication boundary sees.
///
/// `Display` yields the coarse user-facing message. The precise reason stays
/// in the audit trail; `reason` is exposed to callers inside the process only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthFailure {
    pub category: ErrorCategory,
    pub reason: Option<FailureReason>,
    /// Seconds until a rate-limited caller may retry
    pub retry_after: Option<i64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<PasswordViolation>,
    #[serde(skip)]
    message: String,
}

impl AuthFailure {
    pub fn from_reason(reason: FailureReason) -> Self {
        Self {
            category: reason.category(),
            reason: Some(reason),
            retry_after: None,
            violations: Vec::new(),
            message: reason_message(reason, None),
        }
    }

    pub fn rate_limited(retry_after: i64) -> Self {
        Self {
            retry_after: Some(retry_after),
            message: reason_message(FailureReason::RateLimited, Some(retry_after)),
            ..Self::from_reason(FailureReason::RateLimited)
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            category: ErrorCategory::ValidationError,
            reason: None,
            retry_after: None,
            violations: Vec::new(),
            message: message.into(),
        }
    }

    pub fn password_rejected(violations: Vec<PasswordViolation>) -> Self {
        Self {
            violations,
            ..Self::validation("The new password does not meet the password policy.")
        }
    }

    pub fn credential(message: impl Into<String>) -> Self {
        Self {
            category: ErrorCategory::CredentialFailure,
            reason: None,
            retry_after: None,
            violations: Vec::new(),
            message: message.into(),
        }
    }

    /// Generic failure; the internal detail is logged, never returned
    pub fn system(internal: &str) -> Self {
        Self {
            category: ErrorCategory::SystemFailure,
            reason: None,
            retry_after: None,
            violations: Vec::new(),
            message: sanitize_for_client(ErrorCategory::SystemFailure, internal),
        }
    }

    /// The one channel for a flow failed to deliver; the caller must know
    pub fn delivery_failed() -> Self {
        Self {
            category: ErrorCategory::SystemFailure,
            reason: None,
            retry_after: None,
            violations: Vec::new(),
            message: "We could not send the email. Please try again later.".to_string(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn code(&self) -> &'static str {
        match self.reason {
            Some(FailureReason::RateLimited) => codes::policy::RATE_LIMITED,
            Some(FailureReason::AccountLocked | FailureReason::AccountSuspended) => {
                codes::policy::ACCOUNT_UNAVAILABLE
            }
            _ => self.category.code(),
        }
    }

    pub fn status_code(&self) -> u16 {
        match self.reason {
            Some(FailureReason::RateLimited) => 429,
            _ => self.category.status_code(),
        }
    }
}

impl fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for AuthFailure {}

impl From<IdentityError> for AuthFailure {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::PasswordRejected(violations) => Self::password_rejected(violations),
            IdentityError::InvalidInput(detail) => {
                tracing::debug!(detail = %detail, "Rejected invalid input");
                Self::validation("The request could not be processed. Please check your input.")
            }
            IdentityError::InvalidCredentials => Self::credential("Invalid email or password."),
            IdentityError::InvalidResetToken => {
                Self::credential("This reset link is invalid or has expired.")
            }
            other => Self::system(&other.to_string()),
        }
    }
}

impl From<StoreError> for AuthFailure {
    fn from(err: StoreError) -> Self {
        IdentityError::from(err).into()
    }
}

fn reason_message(reason: FailureReason, retry_after: Option<i64>) -> String {
    match reason {
        // Deliberately indistinguishable from any other refusal
        FailureReason::IpBlacklisted => "Access denied.".to_string(),
        FailureReason::RateLimited => format!(
            "Too many attempts. Please try again in {} seconds.",
            retry_after.unwrap_or_default()
        ),
        FailureReason::InvalidInput => "Please enter a valid email address and password.".to_string(),
        FailureReason::UserNotFound | FailureReason::InvalidPassword => {
            "Invalid email or password.".to_string()
        }
        FailureReason::AccountLocked => "This account is locked. Please try again later.".to_string(),
        FailureReason::AccountSuspended => "This account is not active.".to_string(),
        FailureReason::SessionExpired => "Your session has expired. Please sign in again.".to_string(),
        FailureReason::FingerprintMismatch => {
            "Your session is no longer valid. Please sign in again.".to_string()
        }
    }
}
