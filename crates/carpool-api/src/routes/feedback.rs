//! Feedback route.
//!
//! Feedback is recorded in the structured log only; there is no feedback
//! store or review surface.

use std::sync::Arc;

use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::context::RequestContext;
use crate::error::ApiError;
use crate::routes::SuccessResponse;
use crate::server::AppState;

/// Feedback submitted by a signed-in user.
#[derive(Debug, Deserialize, ToSchema)]
pub struct FeedbackRequest {
    /// Free-form feedback text.
    pub feedback: Option<String>,
}

/// Creates feedback routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/feedback", post(submit_feedback))
}

/// Submit feedback.
///
/// POST /api/feedback
#[utoipa::path(
    post,
    path = "/api/feedback",
    tag = "feedback",
    request_body = FeedbackRequest,
    responses(
        (status = 200, description = "Feedback recorded", body = SuccessResponse),
        (status = 400, description = "Bad request", body = crate::error::ApiErrorBody),
        (status = 401, description = "Unauthorized", body = crate::error::ApiErrorBody),
    ),
    security(
        ("sessionCookie" = [])
    )
)]
pub(crate) async fn submit_feedback(
    ctx: RequestContext,
    Json(req): Json<FeedbackRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let feedback = req
        .feedback
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .ok_or_else(|| ApiError::bad_request("feedback is required"))?;

    tracing::info!(email = %ctx.email, feedback = %feedback, "Feedback received");

    Ok(Json(SuccessResponse::ok()))
}
