// JSON handlers for the authentication boundary.
// Framework agnostic: each returns an HTTP status and a JSON body.

use secrecy::SecretString;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::AuthFailure;
use crate::models::RequestContext;
use crate::state_machine::{AuthenticationStateMachine, LoginRequest, RequestDecision};
use crate::terms::TermsService;

/// Status used for post-login redirects
pub const REDIRECT_STATUS: u16 = 303;

#[derive(Deserialize)]
pub struct LoginPayload {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub target: Option<String>,
}

#[derive(Deserialize)]
pub struct ChangePasswordPayload {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Deserialize)]
pub struct ResetRequestPayload {
    pub email: String,
}

#[derive(Deserialize)]
pub struct ResetPasswordPayload {
    pub token: String,
    pub new_password: String,
}

pub struct AuthHandlers {
    engine: Arc<AuthenticationStateMachine>,
    terms: Arc<TermsService>,
}

impl AuthHandlers {
    pub fn new(engine: Arc<AuthenticationStateMachine>, terms: Arc<TermsService>) -> Self {
        Self { engine, terms }
    }

    pub async fn login(&self, payload: LoginPayload, ctx: &RequestContext) -> (u16, Value) {
        let mut request = LoginRequest::new(payload.email, payload.password);
        request.target = payload.target;

        match self.engine.login(&request, ctx).await {
            Ok(success) => (
                200,
                json!({
                    "success": true,
                    "session_id": success.session.id,
                    "expires_at": success.session.expires_at,
                    "redirect": success.route.path(),
                }),
            ),
            Err(failure) => failure_response(&failure),
        }
    }

    pub async fn logout(&self, session_id: &str, ctx: &RequestContext) -> (u16, Value) {
        match self.engine.logout(session_id, ctx).await {
            Ok(()) => (200, json!({ "success": true, "message": "Logged out." })),
            Err(failure) => failure_response(&failure),
        }
    }

    /// Gate a request for `route` carrying `session_id`
    pub async fn authorize(&self, session_id: &str, ctx: &RequestContext, route: &str) -> (u16, Value) {
        match self.engine.authorize_request(session_id, ctx, route).await {
            Ok(RequestDecision::Granted(request)) => (
                200,
                json!({
                    "success": true,
                    "account_id": request.account.id,
                    "expires_at": request.session.expires_at,
                    "capabilities": request.capabilities.iter().collect::<Vec<_>>(),
                }),
            ),
            Ok(RequestDecision::Redirect { to, .. }) => {
                (REDIRECT_STATUS, json!({ "success": false, "redirect": to.path() }))
            }
            Err(failure) => failure_response(&failure),
        }
    }

    pub async fn change_password(
        &self,
        account_id: Uuid,
        session_id: &str,
        payload: ChangePasswordPayload,
    ) -> (u16, Value) {
        let current = SecretString::new(payload.current_password);
        let new_password = SecretString::new(payload.new_password);

        match self
            .engine
            .change_password(account_id, &current, &new_password, Some(session_id))
            .await
        {
            Ok(()) => (200, json!({ "success": true, "message": "Password changed." })),
            Err(failure) => failure_response(&failure),
        }
    }

    pub async fn request_password_reset(&self, payload: ResetRequestPayload, ctx: &RequestContext) -> (u16, Value) {
        match self.engine.request_password_reset(&payload.email, ctx).await {
            Ok(()) => (
                202,
                json!({
                    "success": true,
                    "message": "If an account exists for this address, a reset link has been sent.",
                }),
            ),
            Err(failure) => failure_response(&failure),
        }
    }

    pub async fn reset_password(&self, payload: ResetPasswordPayload) -> (u16, Value) {
        let token = SecretString::new(payload.token);
        let new_password = SecretString::new(payload.new_password);

        match self.engine.reset_password(&token, &new_password).await {
            Ok(()) => (200, json!({ "success": true, "message": "Password updated. Please sign in." })),
            Err(failure) => failure_response(&failure),
        }
    }

    pub async fn accept_terms(&self, account_id: Uuid, version: &str) -> (u16, Value) {
        match self.terms.accept(account_id, version).await {
            Ok(account) => (
                200,
                json!({ "success": true, "accepted_version": account.accepted_terms_version() }),
            ),
            Err(e) => failure_response(&AuthFailure::from(e)),
        }
    }
}

/// Coarse error body; only rate limiting exposes a detail (retry_after)
pub fn failure_response(failure: &AuthFailure) -> (u16, Value) {
    let mut body = json!({
        "success": false,
        "error": {
            "code": failure.code(),
            "message": failure.message(),
        },
    });
    if let Some(retry_after) = failure.retry_after {
        body["retry_after"] = json!(retry_after);
    }
    if !failure.violations.is_empty() {
        body["violations"] = json!(failure.violations);
    }
    (failure.status_code(), body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use audit_engine::FailureReason;

    #[test]
    fn test_rate_limited_body_has_retry_after() {
        let (status, body) = failure_response(&AuthFailure::rate_limited(17));
        assert_eq!(status, 429);
        assert_eq!(body["retry_after"], 17);
        assert_eq!(body["success"], false);
    }

    #[test]
    fn test_blacklist_body_hides_reason() {
        let (status, body) = failure_response(&AuthFailure::from_reason(FailureReason::IpBlacklisted));
        assert_eq!(status, 403);
        assert!(body.get("retry_after").is_none());
        let text = body.to_string().to_lowercase();
        assert!(!text.contains("blacklist"));
    }
}
