use thiserror::Error;

#[derive(Error, Debug)]
pub enum EmailError {
    #[error("Send failed: {0}")]
    SendFailed(String),

    #[error("Template error: {0}")]
    TemplateError(String),

    #[error("Invalid recipient: {0}")]
    InvalidRecipient(String),
}

impl From<handlebars::RenderError> for EmailError {
    fn from(err: handlebars::RenderError) -> Self {
        Self::TemplateError(err.to_string())
    }
}

impl From<handlebars::TemplateError> for EmailError {
    fn from(err: handlebars::TemplateError) -> Self {
        Self::TemplateError(err.to_string())
    }
}

pub type EmailResult<T> = Result<T, EmailError>;
