//! Authentication and session-security core for Gatehouse
//!
//! This crate decides whether a login attempt or an authenticated request may
//! proceed:
//! - Password policy (complexity, strength, history, expiry)
//! - IP reputation and per-IP rate limiting
//! - Fingerprint-bound sessions with sliding idle expiry
//! - The ordered login gates and post-login routing
//! - Terms-of-service acceptance and its administrative triggers
//!
//! Persistence, mail delivery and the clock are injected.
//!
//! # Example
//!
//! ```rust,no_run
//! use auth_identity::{AuthenticationStateMachine, IdentityConfig, LoginRequest, RequestContext, Stores, SystemClock};
//! use audit_engine::{LoginAttemptAuditor, TracingAuditSink};
//! use email_service::LoggingEmailSender;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = IdentityConfig::load(None)?;
//!     let stores = Stores::in_memory(&config.terms.initial_version);
//!     let engine = AuthenticationStateMachine::new(
//!         config,
//!         &stores,
//!         Arc::new(SystemClock),
//!         LoginAttemptAuditor::new(Arc::new(TracingAuditSink::new())),
//!         Arc::new(LoggingEmailSender::new()),
//!     )?;
//!
//!     let ctx = RequestContext::new("203.0.113.7", "Mozilla/5.0");
//!     let outcome = engine.login(&LoginRequest::new("user@example.com", "Correct-Horse-9"), &ctx).await;
//!     println!("{:?}", outcome.map(|s| s.route));
//!     Ok(())
//! }
//! ```

pub mod capabilities;
pub mod clock;
pub mod config;
pub mod error;
pub mod gates;
pub mod handlers;
pub mod ip_guard;
pub mod models;
pub mod password;
pub mod rate_limit;
pub mod repository;
pub mod session;
pub mod state_machine;
pub mod terms;

pub use capabilities::{CapabilitySet, PermissionResolver, RoleCapabilityResolver};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::IdentityConfig;
pub use error::*;
pub use gates::PostLoginRoute;
pub use handlers::AuthHandlers;
pub use ip_guard::IpReputationGuard;
pub use models::*;
pub use password::{PasswordPolicy, PasswordValidation, PasswordViolation};
pub use rate_limit::RateLimiter;
pub use repository::Stores;
pub use session::{SessionCheck, SessionSecurityManager};
pub use state_machine::{AuthenticationStateMachine, AuthorizedRequest, LoginRequest, LoginSuccess, RequestDecision};
pub use terms::{AcceptanceStats, DeliveryReport, TermsService};
