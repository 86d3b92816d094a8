//! services/api/src/web/router.rs
//!
//! Assembles the HTTP application: every endpoint under `/api/v1`, request
//! tracing, optional CORS and the Swagger UI.

use std::sync::Arc;

use axum::http::{
    header::{ACCEPT, CONTENT_TYPE},
    HeaderValue, Method,
};
use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::warn;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::web::rest::ApiDoc;
use crate::web::state::AppState;
use crate::web::{sessions, status, tasks, users};

pub fn app(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/api/v1/status", status::endpoint().into_route())
        .route("/api/v1/sessions", sessions::endpoint().into_route())
        .route("/api/v1/users", users::endpoint().into_route())
        .route("/api/v1/tasks", tasks::collection().into_route())
        .route("/api/v1/tasks/{id}", tasks::item().into_route())
        .with_state(state.clone());

    let app = Router::new()
        .merge(api)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri)
                })
                .on_response(
                    |res: &axum::http::Response<_>, _latency: std::time::Duration, _span: &tracing::Span| {
                        let status = res.status();
                        if status.is_server_error() {
                            tracing::error!(%status, "response");
                        } else {
                            tracing::info!(%status, "response");
                        }
                    },
                ),
        );

    match cors_layer(state.config.cors_origin.as_deref()) {
        Some(cors) => app.layer(cors),
        None => app,
    }
}

/// Credentialed CORS for the configured front-end origin.
fn cors_layer(origin: Option<&str>) -> Option<CorsLayer> {
    let origin = origin?;
    match origin.parse::<HeaderValue>() {
        Ok(origin) => Some(
            CorsLayer::new()
                .allow_origin(origin)
                .allow_credentials(true)
                .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE, Method::OPTIONS])
                .allow_headers([CONTENT_TYPE, ACCEPT]),
        ),
        Err(e) => {
            warn!("Ignoring CORS_ORIGIN '{}': {}", origin, e);
            None
        }
    }
}
