//! HTTP route handlers.

pub mod accounts;
pub mod feedback;
pub mod rides;

use std::sync::Arc;

use axum::Router;
use serde::Serialize;
use utoipa::ToSchema;

use crate::server::AppState;

/// Minimal acknowledgement body for mutating endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct SuccessResponse {
    /// Always `true` on success.
    pub success: bool,
}

impl SuccessResponse {
    pub(crate) const fn ok() -> Self {
        Self { success: true }
    }
}

/// `/api` routes.
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .merge(accounts::routes())
        .merge(rides::routes())
        .merge(feedback::routes())
}
