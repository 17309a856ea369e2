//! Common error handling utilities for the Gatehouse authentication core
//!
//! Every failure that leaves the authentication core is classified into one of
//! five categories. The category decides how much the caller is told, which
//! status code a transport layer should use, and how loudly the event is
//! logged.
//!
//! # Error Categories
//!
//! - **PolicyDenial**: blacklisted IP, rate limit, locked or suspended account
//! - **CredentialFailure**: wrong password or unknown user
//! - **SecurityViolation**: session fingerprint mismatch
//! - **ValidationError**: malformed input
//! - **SystemFailure**: a store or collaborator is unavailable
//!
//! # Example
//!
//! ```rust
//! use error_common::{ErrorCategory, sanitize_for_client};
//!
//! let category = ErrorCategory::SystemFailure;
//! assert_eq!(category.status_code(), 503);
//!
//! // Internal detail never reaches the client
//! let message = sanitize_for_client(category, "connection refused: 10.0.0.12:5432");
//! assert!(!message.contains("10.0.0.12"));
//! ```

pub mod types;
pub mod codes;
pub mod sanitization;

pub use types::*;
pub use sanitization::*;
