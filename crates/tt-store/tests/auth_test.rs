mod common;

use common::{RecordingPreferences, harness};
use serde_json::json;
use tt_api::ApiError;
use tt_store::Query;

fn unauthorized() -> ApiError {
    ApiError::Status {
        status: 401,
        message: "Invalid credentials".into(),
    }
}

#[tokio::test]
async fn test_first_start_generates_device_id() {
    let h = harness("/login", Query::new(), RecordingPreferences::default());

    h.app.initialize().await.unwrap();

    let did = h.app.state().auth.did.expect("device id assigned");
    assert_eq!(did.len(), 36);
    assert_eq!(h.prefs.writes_to("did"), vec![Some(did)]);
    assert!(h.api.requests().is_empty());
}

#[tokio::test]
async fn test_existing_device_id_is_kept() {
    let h = harness(
        "/login",
        Query::new(),
        RecordingPreferences::with_values(&[("did", "device-1")]),
    );

    h.app.initialize().await.unwrap();

    assert_eq!(h.app.state().auth.did.as_deref(), Some("device-1"));
    assert!(h.prefs.writes().is_empty());
}

#[tokio::test]
async fn test_stored_token_restores_session() {
    let h = harness(
        "/issues",
        Query::new(),
        RecordingPreferences::with_values(&[("did", "device-1"), ("token", "t0k3n")]),
    );
    h.api.respond("GET", "user/whoAmI", Ok(json!({ "user": { "login": "alice" } })));

    h.app.initialize().await.unwrap();

    let auth = h.app.state().auth;
    assert_eq!(auth.token.as_deref(), Some("t0k3n"));
    assert_eq!(auth.user, Some(json!({ "login": "alice" })));
    assert!(!auth.loading);
    assert_eq!(h.api.token().as_deref(), Some("t0k3n"));
    assert!(h.nav.history().is_empty());
}

#[tokio::test]
async fn test_rejected_token_logs_out() {
    let h = harness(
        "/issues",
        Query::new(),
        RecordingPreferences::with_values(&[("did", "device-1"), ("token", "expired")]),
    );
    h.api.respond("GET", "user/whoAmI", Err(unauthorized()));

    h.app.initialize().await.unwrap();

    let auth = h.app.state().auth;
    assert!(auth.token.is_none());
    assert!(auth.user.is_none());
    assert!(!auth.loading);
    assert_eq!(h.prefs.value("token"), None);
    assert_eq!(h.api.token(), None);
    assert_eq!(h.nav.path(), "/login");
}

#[tokio::test]
async fn test_login_success() {
    let h = harness(
        "/login",
        Query::new(),
        RecordingPreferences::with_values(&[("did", "device-1")]),
    );
    h.app.initialize().await.unwrap();
    h.api.respond("POST", "authentication/login", Ok(json!({ "token": "fresh" })));
    h.api.respond("GET", "user/whoAmI", Ok(json!({ "user": { "login": "bob" } })));

    h.app.login("bob", "hunter2", Some(true)).await.unwrap();

    let request = h.api.requests_to("authentication/login").pop().unwrap();
    assert_eq!(
        request.body,
        Some(json!({ "login": "bob", "password": "hunter2", "rememberMe": true, "did": "device-1" }))
    );
    let auth = h.app.state().auth;
    assert_eq!(auth.token.as_deref(), Some("fresh"));
    assert_eq!(auth.user, Some(json!({ "login": "bob" })));
    assert!(auth.error.is_none());
    assert!(!auth.loading);
    assert_eq!(h.prefs.value("token").as_deref(), Some("fresh"));
    assert_eq!(h.api.token().as_deref(), Some("fresh"));
    assert_eq!(h.nav.path(), "/");
}

#[tokio::test]
async fn test_login_stands_when_profile_fetch_fails() {
    let h = harness("/login", Query::new(), RecordingPreferences::default());
    h.api.respond("POST", "authentication/login", Ok(json!({ "token": "t" })));
    h.api.respond(
        "GET",
        "user/whoAmI",
        Err(ApiError::Status {
            status: 500,
            message: "Profile service down".into(),
        }),
    );

    h.app.login("bob", "hunter2", None).await.unwrap();

    let auth = h.app.state().auth;
    assert_eq!(auth.token.as_deref(), Some("t"));
    assert!(auth.user.is_none());
    assert!(auth.error.is_none());
    assert!(!auth.loading);
    assert_eq!(h.prefs.value("token").as_deref(), Some("t"));
    assert_eq!(h.nav.path(), "/");
}

#[tokio::test]
async fn test_login_failure_records_message() {
    let h = harness("/login", Query::new(), RecordingPreferences::default());
    h.api.respond("POST", "authentication/login", Err(unauthorized()));

    let err = h.app.login("bob", "wrong", None).await.unwrap_err();

    assert_eq!(err.to_string(), "Invalid credentials");
    let auth = h.app.state().auth;
    assert_eq!(auth.error.as_deref(), Some("Invalid credentials"));
    assert!(!auth.loading);
    assert!(auth.token.is_none());
    let body = h.api.requests_to("authentication/login")[0].body.clone().unwrap();
    assert!(body.get("rememberMe").is_none());
    assert_eq!(h.nav.path(), "/login");
}

#[tokio::test]
async fn test_login_response_without_token() {
    let h = harness("/login", Query::new(), RecordingPreferences::default());
    h.api.respond("POST", "authentication/login", Ok(json!({})));

    assert!(h.app.login("bob", "pw", None).await.is_err());
    assert!(h.app.state().auth.error.is_some());
    assert!(h.prefs.value("token").is_none());
}

#[tokio::test]
async fn test_logout_clears_session() {
    let h = harness(
        "/issues",
        Query::new(),
        RecordingPreferences::with_values(&[("did", "device-1"), ("token", "t0k3n")]),
    );
    h.api.respond("GET", "user/whoAmI", Ok(json!({ "user": { "login": "alice" } })));
    h.app.initialize().await.unwrap();

    h.app.logout().await;

    assert!(h.app.state().auth.user.is_none());
    assert_eq!(h.prefs.writes_to("token"), vec![None]);
    assert_eq!(h.prefs.value("did").as_deref(), Some("device-1"));
    assert_eq!(h.nav.path(), "/login");
}
