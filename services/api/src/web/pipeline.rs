//! services/api/src/web/pipeline.rs
//!
//! The endpoint builder. A route registers an ordered list of common
//! middlewares plus one list per HTTP method; each request runs
//! `[common..., method...]` strictly in sequence.
//!
//! A middleware either continues the chain, answers the request, or fails.
//! The first answer ends the chain. The first failure skips whatever is left
//! and is handed to the endpoint's single error handler. Since an answer always
//! ends the chain, no middleware is ever handed a previous middleware's
//! response, so `Middleware::handle` takes none.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body,
    extract::{FromRequestParts, Path, Request, State},
    http::{HeaderMap, Method, Uri},
    response::Response,
    routing::{any, MethodRouter},
};
use bytes::Bytes;
use futures::future::BoxFuture;
use serde_json::Value;
use taskboard_core::{schemas::Issues, schemas::RuleFailure, AppError, RequestUser};
use taskboard_core::schemas::session::SessionResponse;
use tracing::debug;

use crate::web::cookies::read_cookie;
use crate::web::state::AppState;

/// Request bodies larger than this are rejected before any middleware runs.
pub const BODY_LIMIT: usize = 1024 * 1024;

//=========================================================================================
// Request and Context
//=========================================================================================

/// The parts of the HTTP request every middleware may read.
#[derive(Debug, Clone)]
pub struct EndpointRequest {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl EndpointRequest {
    /// Parses the body as JSON. An empty body reads as `null`, which every
    /// schema treats like an empty object.
    pub fn json(&self) -> Result<Value, AppError> {
        if self.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&self.body).map_err(|e| {
            let mut issues = Issues::new();
            issues.push("body", RuleFailure::Raw(format!("Invalid JSON: {e}")));
            issues.into_error()
        })
    }

    pub fn cookie(&self, name: &str) -> Option<String> {
        read_cookie(&self.headers, name)
    }
}

/// Per-request state threaded through the chain.
#[derive(Debug, Default)]
pub struct RequestContext {
    pub params: HashMap<String, String>,
    /// Set by the identity middleware.
    pub user: Option<RequestUser>,
    /// The raw session cookie, when the request carried one.
    pub session_token: Option<String>,
    /// The valid session behind `session_token`, if there is one.
    pub session: Option<SessionResponse>,
}

impl RequestContext {
    pub fn new(params: HashMap<String, String>) -> Self {
        Self {
            params,
            ..Self::default()
        }
    }

    /// The resolved identity, or the anonymous one when none was attached.
    pub fn user(&self) -> RequestUser {
        self.user.clone().unwrap_or_else(RequestUser::anonymous)
    }

    pub fn param(&self, name: &str) -> &str {
        self.params.get(name).map(String::as_str).unwrap_or_default()
    }
}

//=========================================================================================
// Middleware Contract
//=========================================================================================

/// What a middleware decided about the request.
pub enum Flow {
    Continue,
    Respond(Response),
}

#[async_trait]
pub trait Middleware: Send + Sync {
    async fn handle(
        &self,
        state: &AppState,
        req: &EndpointRequest,
        ctx: &mut RequestContext,
    ) -> Result<Flow, AppError>;
}

/// A route handler written as a plain function.
pub type HandlerFn =
    for<'a> fn(&'a AppState, &'a EndpointRequest, &'a mut RequestContext) -> BoxFuture<'a, Result<Flow, AppError>>;

struct FnMiddleware(HandlerFn);

#[async_trait]
impl Middleware for FnMiddleware {
    async fn handle(
        &self,
        state: &AppState,
        req: &EndpointRequest,
        ctx: &mut RequestContext,
    ) -> Result<Flow, AppError> {
        (self.0)(state, req, ctx).await
    }
}

pub fn handler(f: HandlerFn) -> Arc<dyn Middleware> {
    Arc::new(FnMiddleware(f))
}

/// Maps any failure of the chain to the response sent to the client.
pub type ErrorHandler = fn(&AppState, AppError) -> Response;

//=========================================================================================
// Builder
//=========================================================================================

#[derive(Default)]
pub struct EndpointBuilder {
    common: Vec<Arc<dyn Middleware>>,
    methods: HashMap<Method, Vec<Arc<dyn Middleware>>>,
}

impl EndpointBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends middlewares that run for every method, before the method's own.
    pub fn use_middleware(mut self, middlewares: impl IntoIterator<Item = Arc<dyn Middleware>>) -> Self {
        self.common.extend(middlewares);
        self
    }

    /// Sets the chain for one method, replacing any earlier registration.
    pub fn method(mut self, method: Method, middlewares: impl IntoIterator<Item = Arc<dyn Middleware>>) -> Self {
        self.methods.insert(method, middlewares.into_iter().collect());
        self
    }

    pub fn get(self, middlewares: impl IntoIterator<Item = Arc<dyn Middleware>>) -> Self {
        self.method(Method::GET, middlewares)
    }

    pub fn post(self, middlewares: impl IntoIterator<Item = Arc<dyn Middleware>>) -> Self {
        self.method(Method::POST, middlewares)
    }

    pub fn patch(self, middlewares: impl IntoIterator<Item = Arc<dyn Middleware>>) -> Self {
        self.method(Method::PATCH, middlewares)
    }

    pub fn delete(self, middlewares: impl IntoIterator<Item = Arc<dyn Middleware>>) -> Self {
        self.method(Method::DELETE, middlewares)
    }

    pub fn build(self, on_error: ErrorHandler) -> Endpoint {
        Endpoint {
            common: self.common,
            methods: self.methods,
            on_error,
        }
    }
}

//=========================================================================================
// Endpoint
//=========================================================================================

pub struct Endpoint {
    common: Vec<Arc<dyn Middleware>>,
    methods: HashMap<Method, Vec<Arc<dyn Middleware>>>,
    on_error: ErrorHandler,
}

impl Endpoint {
    pub fn methods(&self) -> impl Iterator<Item = &Method> {
        self.methods.keys()
    }

    /// Runs the chain for one request and always produces a response.
    pub async fn dispatch(&self, state: &AppState, req: EndpointRequest, params: HashMap<String, String>) -> Response {
        let mut ctx = RequestContext::new(params);
        match self.run(state, &req, &mut ctx).await {
            Ok(response) => response,
            Err(error) => (self.on_error)(state, error),
        }
    }

    async fn run(&self, state: &AppState, req: &EndpointRequest, ctx: &mut RequestContext) -> Result<Response, AppError> {
        let Some(chain) = self.methods.get(&req.method) else {
            return Err(AppError::not_implemented());
        };

        for middleware in self.common.iter().chain(chain) {
            if let Flow::Respond(response) = middleware.handle(state, req, ctx).await? {
                return Ok(response);
            }
        }

        debug!(method = %req.method, uri = %req.uri, "Chain ended without a response");
        Err(AppError::not_implemented()
            .with_message("É necessário que o último middleware tenha um retorno.")
            .with_action(format!(
                "Confira os middlewares usados no endpoint [{}] {}",
                req.method, req.uri
            )))
    }

    /// Mounts the endpoint on an axum route. Every method reaches the chain,
    /// so unregistered ones are answered by the error handler too.
    pub fn into_route(self) -> MethodRouter<Arc<AppState>> {
        let endpoint = Arc::new(self);
        any(move |State(state): State<Arc<AppState>>, request: Request| {
            let endpoint = endpoint.clone();
            async move {
                let (mut parts, body) = request.into_parts();
                let params = Path::<HashMap<String, String>>::from_request_parts(&mut parts, &state)
                    .await
                    .map(|Path(params)| params)
                    .unwrap_or_default();
                let body = match body::to_bytes(body, BODY_LIMIT).await {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        let error = AppError::validation()
                            .with_message("Não foi possível ler o corpo da requisição.")
                            .with_cause(e);
                        return (endpoint.on_error)(&state, error);
                    }
                };
                let req = EndpointRequest {
                    method: parts.method,
                    uri: parts.uri,
                    headers: parts.headers,
                    body,
                };
                endpoint.dispatch(&state, req, params).await
            }
        })
    }
}
