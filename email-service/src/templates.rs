// Handlebars templates for every notification the core sends
use handlebars::Handlebars;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{EmailError, EmailResult};
use crate::EmailMessage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailTemplate {
    PasswordReset,
    TemporaryPassword,
    PolicyUpdate,
    TermsReminder,
}

impl EmailTemplate {
    pub const ALL: [EmailTemplate; 4] = [
        Self::PasswordReset,
        Self::TemporaryPassword,
        Self::PolicyUpdate,
        Self::TermsReminder,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::PasswordReset => "password_reset",
            Self::TemporaryPassword => "temporary_password",
            Self::PolicyUpdate => "policy_update",
            Self::TermsReminder => "terms_reminder",
        }
    }

    fn subject(&self) -> &'static str {
        match self {
            Self::PasswordReset => "Reset your password",
            Self::TemporaryPassword => "Your temporary password",
            Self::PolicyUpdate => "Our terms have changed (version {{version}})",
            Self::TermsReminder => "Reminder: please review our updated terms",
        }
    }

    fn body(&self) -> &'static str {
        match self {
            Self::PasswordReset => {
                "Someone asked to reset the password for this account.\n\n\
                 Use the link below within {{expires_minutes}} minutes:\n{{reset_link}}\n\n\
                 If this was not you, ignore this message. Your password stays unchanged."
            }
            Self::TemporaryPassword => {
                "An administrator issued you a temporary password:\n\n    {{temporary_password}}\n\n\
                 You will be asked to choose a new password when you sign in."
            }
            Self::PolicyUpdate => {
                "We have published version {{version}} of our terms of service.\n\n\
                 You will be asked to accept it the next time you sign in."
            }
            Self::TermsReminder => {
                "You have not yet accepted version {{version}} of our terms of service.\n\n\
                 Access to your account is limited until you do."
            }
        }
    }

    fn subject_key(&self) -> String {
        format!("{}.subject", self.name())
    }

    fn body_key(&self) -> String {
        format!("{}.body", self.name())
    }
}

/// Pre-compiled template registry
pub struct TemplateEngine {
    registry: Handlebars<'static>,
}

impl TemplateEngine {
    pub fn new() -> EmailResult<Self> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        // Plain-text mail; links must survive unescaped
        registry.register_escape_fn(handlebars::no_escape);

        for template in EmailTemplate::ALL {
            registry.register_template_string(&template.subject_key(), template.subject())?;
            registry.register_template_string(&template.body_key(), template.body())?;
        }

        Ok(Self { registry })
    }

    /// Render `template` for `to`. Missing variables are an error (strict mode).
    pub fn compose(&self, template: EmailTemplate, to: &str, data: &Value) -> EmailResult<EmailMessage> {
        if !to.contains('@') {
            return Err(EmailError::InvalidRecipient(to.to_string()));
        }

        let subject = self.registry.render(&template.subject_key(), data)?;
        let body = self.registry.render(&template.body_key(), data)?;

        let mut message = EmailMessage::new(to, subject, body);
        message.template = Some(template);
        Ok(message)
    }
}

impl std::fmt::Debug for TemplateEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateEngine").finish_non_exhaustive()
    }
}
