//! Request context extraction.
//!
//! Every authenticated endpoint resolves the session cookie to the signed-in
//! account before touching the lifecycle. The resolved context is cached in
//! request extensions so layered extractors do not re-hit the session store.

use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::request::Parts;
use ulid::Ulid;

use crate::error::ApiError;
use crate::server::AppState;

/// Header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Per-request context derived from the session cookie.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Email of the signed-in account.
    pub email: String,
    /// Request ID for tracing/correlation.
    pub request_id: String,
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for RequestContext {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        if let Some(existing) = parts.extensions.get::<Self>() {
            return Ok(existing.clone());
        }

        let headers = &parts.headers;
        let request_id =
            request_id_from_headers(headers).unwrap_or_else(|| Ulid::new().to_string());

        let token = state
            .sessions
            .token_from_headers(headers)
            .ok_or_else(|| ApiError::missing_auth().with_request_id(request_id.clone()))?;

        let email = state
            .sessions
            .authenticate(&token)
            .map_err(ApiError::from)?
            .ok_or_else(|| {
                ApiError::unauthorized("session is invalid or expired")
                    .with_request_id(request_id.clone())
            })?;

        let ctx = Self { email, request_id };

        parts.extensions.insert(ctx.clone());
        Ok(ctx)
    }
}

fn request_id_from_headers(headers: &HeaderMap) -> Option<String> {
    let value = headers
        .get("X-Request-Id")
        .or_else(|| headers.get("X-Request-ID"))?;
    value.to_str().ok().map(str::to_string)
}
