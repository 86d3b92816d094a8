//! services/api/src/web/identity.rs
//!
//! Middlewares that establish who is calling and what they may do.

use std::sync::Arc;

use async_trait::async_trait;
use taskboard_core::{AppError, RequestUser};
use tracing::debug;

use crate::web::cookies::ACCESS_TOKEN;
use crate::web::pipeline::{EndpointBuilder, EndpointRequest, Flow, Middleware, RequestContext};
use crate::web::state::AppState;

/// Resolves the `access_token` cookie to a user. Missing, unknown and expired
/// sessions all leave the anonymous identity in the context.
pub struct InjectUser;

#[async_trait]
impl Middleware for InjectUser {
    async fn handle(&self, state: &AppState, req: &EndpointRequest, ctx: &mut RequestContext) -> Result<Flow, AppError> {
        ctx.session_token = req.cookie(ACCESS_TOKEN);

        if let Some(token) = ctx.session_token.as_deref() {
            if let Some(session) = state.services.sessions.find_valid_by_token(token).await? {
                if let Some(user) = state.services.users.find_by_id(session.user_id).await? {
                    ctx.user = Some(RequestUser::Authenticated(user));
                    ctx.session = Some(session);
                    return Ok(Flow::Continue);
                }
            }
            debug!("Session cookie did not resolve to a user");
        }

        ctx.user = Some(RequestUser::anonymous());
        Ok(Flow::Continue)
    }
}

/// Rejects callers lacking `feature`.
pub struct CanRequest {
    feature: &'static str,
}

#[async_trait]
impl Middleware for CanRequest {
    async fn handle(&self, state: &AppState, _req: &EndpointRequest, ctx: &mut RequestContext) -> Result<Flow, AppError> {
        let user = ctx.user();
        if state.services.authorization.can(&user, self.feature) {
            return Ok(Flow::Continue);
        }

        debug!(feature = self.feature, anonymous = user.is_anonymous(), "Feature denied");
        let denied = AppError::forbidden();
        // A cookie that resolved to nobody is stale; have the client drop it.
        if user.is_anonymous() && ctx.session_token.is_some() {
            return Err(denied.with_cause(AppError::unauthorized()));
        }
        Err(denied)
    }
}

pub fn can_request(feature: &'static str) -> Arc<dyn Middleware> {
    Arc::new(CanRequest { feature })
}

/// A builder whose every method first resolves the caller.
pub fn endpoint_with_user() -> EndpointBuilder {
    EndpointBuilder::new().use_middleware([Arc::new(InjectUser) as Arc<dyn Middleware>])
}
