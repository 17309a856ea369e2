// Client-facing message sanitization.
// Internal error text (hosts, SQL, hashes) is logged here and replaced.

use crate::types::ErrorCategory;

/// Coarse message shown to clients for a category when no gate-specific
/// message applies.
pub fn generic_message(category: ErrorCategory) -> &'static str {
    match category {
        ErrorCategory::PolicyDenial => "Access denied.",
        ErrorCategory::CredentialFailure => "These credentials do not match our records.",
        ErrorCategory::SecurityViolation => "Your session is no longer valid. Please sign in again.",
        ErrorCategory::ValidationError => "The submitted data is invalid.",
        ErrorCategory::SystemFailure => "Something went wrong. Please try again later.",
    }
}

/// Replace internal detail with the category's generic message.
///
/// The internal text is emitted on the `security` log target so that operators
/// keep full fidelity.
pub fn sanitize_for_client(category: ErrorCategory, internal: &str) -> String {
    tracing::error!(
        target: "security",
        category = %category,
        detail = internal,
        "Internal error replaced before reaching client"
    );
    generic_message(category).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_internal_detail_is_dropped() {
        let message = sanitize_for_client(ErrorCategory::SystemFailure, "pool timed out after 30s");
        assert_eq!(message, "Something went wrong. Please try again later.");
        assert!(!message.contains("pool"));
    }
}
