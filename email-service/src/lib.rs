//! Outbound notifications for the authentication core
//!
//! The core only ever needs three kinds of mail: password-reset links,
//! temporary passwords, and policy notices (forced terms updates and
//! reminders). Delivery transport lives behind [`EmailSender`]; the core
//! treats every send except the reset link as fire-and-forget.
//!
//! # Example
//!
//! ```rust
//! use email_service::{EmailTemplate, TemplateEngine};
//! use serde_json::json;
//!
//! let engine = TemplateEngine::new().unwrap();
//! let message = engine
//!     .compose(
//!         EmailTemplate::PasswordReset,
//!         "ada@example.com",
//!         &json!({ "reset_link": "https://app.example.com/reset?token=abc", "expires_minutes": 60 }),
//!     )
//!     .unwrap();
//! assert!(message.body.contains("token=abc"));
//! ```

pub mod error;
pub mod service;
pub mod templates;

pub use error::*;
pub use service::*;
pub use templates::*;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub id: Uuid,
    pub to: String,
    pub subject: String,
    pub body: String,
    pub template: Option<EmailTemplate>,
    pub created_at: DateTime<Utc>,
}

impl EmailMessage {
    pub fn new(to: impl Into<String>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            to: to.into(),
            subject: subject.into(),
            body: body.into(),
            template: None,
            created_at: Utc::now(),
        }
    }
}

/// Delivery transport. Returns a provider message id.
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> EmailResult<String>;
}
