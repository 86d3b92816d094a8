//! Helpers shared by the HTTP-level tests. Every test gets its own app on top
//! of a fresh in-memory store.

#![allow(dead_code)]

use std::sync::Arc;

use api_lib::adapters::Argon2Hasher;
use api_lib::config::{AppEnv, Config};
use api_lib::web::{self, AppState};
use argon2::Params;
use axum::body::{self, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use taskboard_core::memory::InMemoryStore;
use tower::ServiceExt;

pub const PASSWORD: &str = "senhaforte123";

pub struct TestApp {
    pub router: Router,
    pub store: Arc<InMemoryStore>,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub set_cookies: Vec<String>,
    pub body: Value,
}

impl TestResponse {
    /// Value of the `access_token` cookie set by the response, if any.
    pub fn access_token(&self) -> Option<String> {
        self.set_cookies.iter().find_map(|c| {
            let pair = c.split(';').next()?;
            pair.strip_prefix("access_token=").map(str::to_string)
        })
    }
}

pub fn config(app_env: AppEnv) -> Config {
    Config {
        bind_address: ([127, 0, 0, 1], 0).into(),
        database_url: "postgres://unused".to_string(),
        database_max_connections: 1,
        log_level: tracing::Level::DEBUG,
        app_env,
        password_pepper: "pimenta".to_string(),
        cors_origin: None,
    }
}

pub fn app() -> TestApp {
    app_in(AppEnv::Test)
}

pub fn app_in(app_env: AppEnv) -> TestApp {
    let params = Params::new(8, 1, 1, None).expect("valid argon2 params");
    let hasher = Argon2Hasher::with_params("pimenta", params).expect("hasher builds");
    let (state, store) = AppState::in_memory(Arc::new(config(app_env)), Arc::new(hasher));
    TestApp {
        router: web::app(Arc::new(state)),
        store,
    }
}

impl TestApp {
    pub async fn send(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::COOKIE, format!("access_token={token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request builds");

        let response = self.router.clone().oneshot(request).await.expect("infallible");
        let status = response.status();
        let set_cookies = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok().map(str::to_string))
            .collect();
        let bytes = body::to_bytes(response.into_body(), usize::MAX).await.expect("body reads");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("body is json")
        };
        TestResponse {
            status,
            set_cookies,
            body,
        }
    }

    pub async fn signup(&self, username: &str) -> Value {
        let response = self
            .send(
                Method::POST,
                "/api/v1/users",
                None,
                Some(json!({
                    "email": format!("{username}@example.com"),
                    "username": username,
                    "password": PASSWORD,
                })),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.body
    }

    pub async fn login(&self, username: &str) -> String {
        let response = self
            .send(
                Method::POST,
                "/api/v1/sessions",
                None,
                Some(json!({ "email": format!("{username}@example.com"), "password": PASSWORD })),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.access_token().expect("login sets the cookie")
    }

    /// Registers and logs in; returns the user JSON and the session token.
    pub async fn signed_in(&self, username: &str) -> (Value, String) {
        let user = self.signup(username).await;
        let token = self.login(username).await;
        (user, token)
    }
}
