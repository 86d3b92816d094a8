mod common;

use axum::http::{Method, StatusCode};
use chrono::{DateTime, Duration, Utc};
use serde_json::json;
use taskboard_core::ports::SessionRepository;

use common::{app, PASSWORD};

#[tokio::test]
async fn login_sets_an_http_only_cookie_for_seven_days() {
    let app = app();
    let user = app.signup("maria").await;

    let response = app
        .send(
            Method::POST,
            "/api/v1/sessions",
            None,
            Some(json!({ "email": "maria@example.com", "password": PASSWORD })),
        )
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["userId"], user["id"]);
    let token = response.access_token().expect("cookie is set");
    assert_eq!(token.len(), 96);
    assert_eq!(response.body["token"], token.as_str());

    let cookie = &response.set_cookies[0];
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("Path=/"));
    assert!(cookie.contains("Max-Age=604800"));
    assert!(!cookie.contains("Secure"));

    let expires_at: DateTime<Utc> = response.body["expiresAt"].as_str().unwrap().parse().unwrap();
    let lifetime = expires_at - Utc::now();
    assert!(lifetime > Duration::days(7) - Duration::minutes(1));
    assert!(lifetime <= Duration::days(7));
}

#[tokio::test]
async fn wrong_credentials_share_one_public_message() {
    let app = app();
    app.signup("maria").await;

    for body in [
        json!({ "email": "maria@example.com", "password": "outrasenha99" }),
        json!({ "email": "ninguem@example.com", "password": PASSWORD }),
    ] {
        let response = app.send(Method::POST, "/api/v1/sessions", None, Some(body)).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert_eq!(response.body["error"], "UnauthorizedError");
        assert_eq!(response.body["message"], "E-mail ou senha incorretos.");
        assert_eq!(
            response.body["action"],
            "Verifique se as credenciais foram digitadas corretamente."
        );
    }
}

#[tokio::test]
async fn logout_expires_the_session_and_clears_the_cookie() {
    let app = app();
    app.signup("maria").await;
    let token = app.login("maria").await;

    let response = app.send(Method::DELETE, "/api/v1/sessions", Some(&token), None).await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);
    let cookie = &response.set_cookies[0];
    assert!(cookie.starts_with("access_token=invalid"));
    assert!(cookie.contains("Max-Age=-1"));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("Path=/"));

    let stored = app.store.find_by_token(&token).await.unwrap().unwrap();
    assert!(stored.expires_at <= Utc::now());
    assert!(stored.updated_at >= stored.created_at);
}

#[tokio::test]
async fn an_expired_token_is_rejected_and_cleared() {
    let app = app();
    app.signup("maria").await;
    let token = app.login("maria").await;
    app.send(Method::DELETE, "/api/v1/sessions", Some(&token), None).await;

    let response = app.send(Method::DELETE, "/api/v1/sessions", Some(&token), None).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.body["error"], "ForbiddenError");
    assert!(response.set_cookies[0].contains("Max-Age=-1"));

    let response = app.send(Method::GET, "/api/v1/tasks", Some(&token), None).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn a_never_issued_token_is_rejected_and_cleared() {
    let app = app();
    let token = "ab".repeat(48);

    let response = app.send(Method::DELETE, "/api/v1/sessions", Some(&token), None).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.body["error"], "ForbiddenError");
    let cookie = &response.set_cookies[0];
    assert!(cookie.starts_with("access_token=invalid"));
    assert!(cookie.contains("Max-Age=-1"));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("Path=/"));
}

#[tokio::test]
async fn expiring_twice_does_not_extend_the_session() {
    let app = app();
    app.signup("maria").await;
    let token = app.login("maria").await;
    let session = app.store.find_by_token(&token).await.unwrap().unwrap();

    let first = app.store.expire(session.id, Utc::now()).await.unwrap();
    let second = app.store.expire(session.id, Utc::now() + Duration::hours(1)).await.unwrap();
    assert_eq!(second.expires_at, first.expires_at);
}

#[tokio::test]
async fn anonymous_logout_is_forbidden_without_touching_cookies() {
    let app = app();
    let response = app.send(Method::DELETE, "/api/v1/sessions", None, None).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert!(response.set_cookies.is_empty());
}

#[tokio::test]
async fn unknown_methods_are_not_implemented_outside_production() {
    let app = app();
    let response = app.send(Method::PUT, "/api/v1/sessions", None, None).await;
    assert_eq!(response.status, StatusCode::NOT_IMPLEMENTED);
    assert_eq!(response.body["error"], "NotImplementedError");

    let production = common::app_in(api_lib::config::AppEnv::Production);
    let response = production.send(Method::PUT, "/api/v1/sessions", None, None).await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body["error"], "InternalServerError");
}

#[tokio::test]
async fn production_cookies_are_secure() {
    let app = common::app_in(api_lib::config::AppEnv::Production);
    app.signup("maria").await;
    let response = app
        .send(
            Method::POST,
            "/api/v1/sessions",
            None,
            Some(json!({ "email": "maria@example.com", "password": PASSWORD })),
        )
        .await;
    assert!(response.set_cookies[0].contains("Secure"));
}
