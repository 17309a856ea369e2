mod common;

use auth_identity::handlers::{LoginPayload, ResetRequestPayload, REDIRECT_STATUS};
use auth_identity::*;
use common::*;

fn handlers(h: &Harness) -> AuthHandlers {
    AuthHandlers::new(h.engine.clone(), h.terms.clone())
}

fn payload(email: &str, password: &str) -> LoginPayload {
    LoginPayload {
        email: email.to_string(),
        password: password.to_string(),
        target: Some("/reports".to_string()),
    }
}

#[tokio::test]
async fn test_login_then_authorize_then_logout() {
    let h = Harness::new();
    h.settled_account("ada@example.com").await;
    let api = handlers(&h);
    let ctx = browser("192.0.2.60");

    let (status, body) = api.login(payload("ada@example.com", PASSWORD), &ctx).await;
    assert_eq!(status, 200);
    assert_eq!(body["redirect"], "/reports");
    let session_id = body["session_id"].as_str().unwrap().to_string();

    let (status, body) = api.authorize(&session_id, &ctx, "/reports").await;
    assert_eq!(status, 200);
    assert!(body["capabilities"]
        .as_array()
        .unwrap()
        .iter()
        .any(|c| c == "profile:read"));

    let (status, _) = api.logout(&session_id, &ctx).await;
    assert_eq!(status, 200);
    let (status, _) = api.authorize(&session_id, &ctx, "/reports").await;
    assert_eq!(status, 401);
}

#[tokio::test]
async fn test_terms_redirect_and_acceptance() {
    let h = Harness::new();
    let account = h.settled_account("ada@example.com").await;
    h.terms.force_policy_update("2", false).await.unwrap();
    let api = handlers(&h);
    let ctx = browser("192.0.2.61");

    let (_, body) = api.login(payload("ada@example.com", PASSWORD), &ctx).await;
    assert_eq!(body["redirect"], gates::TERMS_PATH);
    let session_id = body["session_id"].as_str().unwrap().to_string();

    let (status, body) = api.authorize(&session_id, &ctx, "/reports").await;
    assert_eq!(status, REDIRECT_STATUS);
    assert_eq!(body["redirect"], gates::TERMS_PATH);

    let (status, _) = api.accept_terms(account.id, "1").await;
    assert_eq!(status, 422);
    let (status, body) = api.accept_terms(account.id, "2").await;
    assert_eq!(status, 200);
    assert_eq!(body["accepted_version"], "2");
}

#[tokio::test]
async fn test_rate_limited_login_reports_retry_after() {
    let h = Harness::new();
    let api = handlers(&h);
    let ctx = browser("192.0.2.62");

    for _ in 0..5 {
        let (status, _) = api.login(payload("nobody@example.com", "Wrong-Pass-1"), &ctx).await;
        assert_eq!(status, 401);
    }
    let (status, body) = api.login(payload("nobody@example.com", "Wrong-Pass-1"), &ctx).await;
    assert_eq!(status, 429);
    assert_eq!(body["retry_after"], 60);
}

#[tokio::test]
async fn test_reset_request_answer_does_not_depend_on_existence() {
    let h = Harness::new();
    h.settled_account("ada@example.com").await;
    let api = handlers(&h);

    let known = api
        .request_password_reset(
            ResetRequestPayload {
                email: "ada@example.com".to_string(),
            },
            &browser("192.0.2.63"),
        )
        .await;
    let unknown = api
        .request_password_reset(
            ResetRequestPayload {
                email: "ghost@example.com".to_string(),
            },
            &browser("192.0.2.64"),
        )
        .await;
    assert_eq!(known, unknown);
    assert_eq!(known.0, 202);
}
