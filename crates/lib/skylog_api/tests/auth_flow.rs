//! Integration tests: account flows and bearer authentication over the router.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use chrono::{Duration, Utc};
use serde_json::json;
use skylog_api::config::ApiConfig;
use skylog_core::auth::jwt::TokenIssuer;
use skylog_core::auth::verification::MAX_CODE_ATTEMPTS;
use skylog_core::store::Stores;

use common::{SECRET, app, app_with, test_config};

#[tokio::test]
async fn health_is_public() {
    let app = app();
    let (status, body) = app.call("GET", "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn register_login_me() {
    let app = app();
    let token = app
        .register("Alice", "Alice@Example.com", "correct-horse")
        .await;

    let (status, me) = app.call("GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], "alice@example.com");
    assert_eq!(me["name"], "Alice");
    assert_eq!(me["role"], "user");
    assert_eq!(me["isVerified"], false);
    assert!(me.get("passwordHash").is_none());

    let (status, login) = app
        .call(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": "alice@example.com", "password": "correct-horse" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(login["tokenType"], "Bearer");
    assert_eq!(login["expiresIn"], 7 * 24 * 60 * 60);
    assert_eq!(login["user"]["id"], me["id"]);
}

#[tokio::test]
async fn duplicate_email_conflicts() {
    let app = app();
    app.register("Alice", "alice@example.com", "correct-horse").await;
    let (status, body) = app
        .call(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({ "name": "Other", "email": " ALICE@example.com", "password": "12345678" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");
}

#[tokio::test]
async fn register_validates_input() {
    let app = app();
    for body in [
        json!({ "name": "", "email": "a@b.io", "password": "12345678" }),
        json!({ "name": "A", "email": "not-an-email", "password": "12345678" }),
        json!({ "name": "A", "email": "a@b.io", "password": "short" }),
    ] {
        let (status, _) = app
            .call("POST", "/api/auth/register", None, Some(body))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let app = app();
    app.register("Alice", "alice@example.com", "correct-horse").await;

    let (wrong_pw_status, wrong_pw) = app
        .call(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": "alice@example.com", "password": "battery-staple" })),
        )
        .await;
    let (unknown_status, unknown) = app
        .call(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": "bob@example.com", "password": "correct-horse" })),
        )
        .await;
    assert_eq!(wrong_pw_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_pw, unknown);
}

#[tokio::test]
async fn missing_or_wrong_scheme_is_401() {
    let app = app();
    let (status, body) = app.call("GET", "/api/auth/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Missing credentials");

    let req = Request::builder()
        .uri("/api/auth/me")
        .header(header::AUTHORIZATION, "Basic YWxpY2U6cHc=")
        .body(Body::empty())
        .unwrap();
    let (status, body) = app.send(req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Missing credentials");
}

#[tokio::test]
async fn scheme_is_case_insensitive() {
    let app = app();
    let token = app.register("Alice", "alice@example.com", "correct-horse").await;
    let req = Request::builder()
        .uri("/api/auth/me")
        .header(header::AUTHORIZATION, format!("bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let (status, _) = app.send(req).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn tampered_token_is_401() {
    let app = app();
    let token = app.register("Alice", "alice@example.com", "correct-horse").await;

    let sig_start = token.rfind('.').unwrap() + 1;
    let mut tampered = token.clone();
    let first = &token[sig_start..sig_start + 1];
    let replacement = if first == "A" { "B" } else { "A" };
    tampered.replace_range(sig_start..sig_start + 1, replacement);

    let (status, body) = app.call("GET", "/api/auth/me", Some(&tampered), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid token");

    let (status, _) = app.call("GET", "/api/auth/me", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn token_with_altered_last_character_is_401() {
    let app = app();
    let token = app.register("Alice", "alice@example.com", "correct-horse").await;

    let mut tampered = token.clone();
    let last = tampered.pop().unwrap();
    tampered.push(if last == 'A' { 'B' } else { 'A' });

    let (status, body) = app.call("GET", "/api/auth/me", Some(&tampered), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid token");

    let (status, _) = app.call("GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn expired_token_is_401() {
    let app = app();
    app.register("Alice", "alice@example.com", "correct-horse").await;
    let identity = app
        .state
        .stores
        .credentials
        .find_by_email("alice@example.com")
        .await
        .unwrap()
        .unwrap();

    let issuer = TokenIssuer::new(SECRET.as_bytes(), Duration::days(7)).unwrap();
    let expired = issuer
        .issue_at(&identity, Utc::now() - Duration::hours(2), Duration::hours(1))
        .unwrap();

    let (status, body) = app.call("GET", "/api/auth/me", Some(&expired), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Token expired");
}

#[tokio::test]
async fn rotated_secret_still_verifies_old_tokens() {
    let stores = Stores::in_memory();
    let old = app_with(test_config(), stores.clone());
    let token = old.register("Alice", "alice@example.com", "correct-horse").await;

    let mut rotated = test_config();
    rotated.jwt_secret = "a-brand-new-primary-secret-0123456789".into();
    rotated.jwt_previous_secrets = vec![SECRET.into()];
    let rotated = app_with(rotated, stores.clone());
    let (status, _) = rotated.call("GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let mut retired = test_config();
    retired.jwt_secret = "a-brand-new-primary-secret-0123456789".into();
    let retired = app_with(retired, stores);
    let (status, _) = retired.call("GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn blank_secret_refuses_to_build_state() {
    let config = ApiConfig::new("");
    assert!(skylog_api::AppState::new(config, Stores::in_memory()).is_err());
}

#[tokio::test]
async fn profile_update_returns_fresh_token() {
    let app = app();
    let token = app.register("Alice", "alice@example.com", "correct-horse").await;

    let (status, body) = app
        .call(
            "PATCH",
            "/api/auth/profile",
            Some(&token),
            Some(json!({ "name": "Alice Liddell", "avatar": "https://img/a.png" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["name"], "Alice Liddell");

    let fresh = body["token"].as_str().unwrap();
    let (status, me) = app.call("GET", "/api/auth/me", Some(fresh), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["avatar"], "https://img/a.png");
}

#[tokio::test]
async fn verification_code_flow() {
    let app = app();
    let token = app.register("Alice", "alice@example.com", "correct-horse").await;

    let (status, _) = app
        .call(
            "POST",
            "/api/auth/send-code",
            None,
            Some(json!({ "email": "alice@example.com" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let code = app.delivery.last_code_for("alice@example.com").unwrap();
    assert_eq!(code.len(), 6);

    let wrong = if code == "000000" { "111111" } else { "000000" };
    let (status, _) = app
        .call(
            "POST",
            "/api/auth/verify-code",
            None,
            Some(json!({ "email": "alice@example.com", "code": wrong })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .call(
            "POST",
            "/api/auth/verify-code",
            None,
            Some(json!({ "email": "alice@example.com", "code": code })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, me) = app.call("GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(me["isVerified"], true);

    // Codes are single-use.
    let (status, _) = app
        .call(
            "POST",
            "/api/auth/verify-code",
            None,
            Some(json!({ "email": "alice@example.com", "code": code })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn send_code_for_unknown_email_is_404() {
    let app = app();
    let (status, _) = app
        .call(
            "POST",
            "/api/auth/send-code",
            None,
            Some(json!({ "email": "nobody@example.com" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn reset_password_requires_code() {
    let app = app();
    app.register("Alice", "alice@example.com", "correct-horse").await;

    let (status, _) = app
        .call(
            "POST",
            "/api/auth/reset-password",
            None,
            Some(json!({ "email": "alice@example.com", "code": "123456", "newPassword": "new-password" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    app.call(
        "POST",
        "/api/auth/send-code",
        None,
        Some(json!({ "email": "alice@example.com" })),
    )
    .await;
    let code = app.delivery.last_code_for("alice@example.com").unwrap();

    let (status, _) = app
        .call(
            "POST",
            "/api/auth/reset-password",
            None,
            Some(json!({ "email": "alice@example.com", "code": code, "newPassword": "new-password" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let login = |password: &'static str| {
        app.call(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": "alice@example.com", "password": password })),
        )
    };
    assert_eq!(login("correct-horse").await.0, StatusCode::UNAUTHORIZED);
    assert_eq!(login("new-password").await.0, StatusCode::OK);
}

#[tokio::test]
async fn reset_code_is_burned_after_repeated_wrong_guesses() {
    let app = app();
    app.register("Alice", "alice@example.com", "correct-horse").await;
    app.call(
        "POST",
        "/api/auth/send-code",
        None,
        Some(json!({ "email": "alice@example.com" })),
    )
    .await;
    let code = app.delivery.last_code_for("alice@example.com").unwrap();
    let wrong = if code == "000000" { "111111" } else { "000000" };

    let reset = |code: String| {
        app.call(
            "POST",
            "/api/auth/reset-password",
            None,
            Some(json!({ "email": "alice@example.com", "code": code, "newPassword": "taken-over" })),
        )
    };
    for _ in 0..MAX_CODE_ATTEMPTS {
        assert_eq!(reset(wrong.to_string()).await.0, StatusCode::BAD_REQUEST);
    }
    assert_eq!(reset(code).await.0, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .call(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": "alice@example.com", "password": "correct-horse" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}
