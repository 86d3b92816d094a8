mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::{app, PASSWORD};

#[tokio::test]
async fn registration_returns_the_public_projection() {
    let app = app();
    let user = app.signup("joao_1").await;

    assert_eq!(user["email"], "joao_1@example.com");
    assert_eq!(user["username"], "joao_1");
    assert_eq!(
        user["features"],
        json!(["create:session", "delete:session", "create:task", "view:task", "delete:task"])
    );
    assert!(user.get("password").is_none());
    assert!(user["createdAt"].as_str().unwrap().ends_with('Z'));
}

#[tokio::test]
async fn duplicate_email_and_username_are_rejected() {
    let app = app();
    app.signup("joao").await;

    let response = app
        .send(
            Method::POST,
            "/api/v1/users",
            None,
            Some(json!({ "email": "joao@example.com", "username": "outro", "password": PASSWORD })),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["message"], "E-mail já cadastrado no sistema.");

    let response = app
        .send(
            Method::POST,
            "/api/v1/users",
            None,
            Some(json!({ "email": "outro@example.com", "username": "joao", "password": PASSWORD })),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["message"], "Username já cadastrado no sistema.");
}

#[tokio::test]
async fn every_invalid_field_is_listed() {
    let app = app();
    let response = app
        .send(
            Method::POST,
            "/api/v1/users",
            None,
            Some(json!({ "email": "nope", "username": "x", "password": "curta" })),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "ValidationError");
    assert_eq!(response.body["status_code"], 400);
    let fields: Vec<&str> = response.body["issues"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, ["email", "username", "password"]);
}

#[tokio::test]
async fn non_object_body_is_a_validation_error() {
    let app = app();
    let response = app
        .send(Method::POST, "/api/v1/users", None, Some(json!("not an object")))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["issues"][0]["field"], "body");
}

#[tokio::test]
async fn signed_in_users_cannot_register_again() {
    let app = app();
    let (_, token) = app.signed_in("joao").await;

    let response = app
        .send(
            Method::POST,
            "/api/v1/users",
            Some(&token),
            Some(json!({ "email": "novo@example.com", "username": "novo", "password": PASSWORD })),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert!(response.set_cookies.is_empty());
}

#[tokio::test]
async fn status_is_public() {
    let app = app();
    let response = app.send(Method::GET, "/api/v1/status", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
}
