//! Ride lifecycle routes.
//!
//! ## Routes
//!
//! - `POST /rides/request` - Create a ride request
//! - `GET  /rides/current` - Own rides, grouped by stage
//! - `GET  /rides/available` - Requests acceptable as driver
//! - `POST /rides/accept-as-driver` - Accept a request as driver
//! - `POST /rides/accept-driver` - Confirm the accepted driver
//! - `POST /rides/delete` - Cancel a ride

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use carpool_core::{Ride, RideBoard, RideId};

use crate::context::RequestContext;
use crate::error::{ApiError, ApiErrorBody};
use crate::routes::SuccessResponse;
use crate::server::AppState;

/// Request to create a ride request.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRideRequest {
    /// What the ride is for.
    pub event: Option<String>,
    /// Free-form pick-up time.
    pub pick_up_time_date: Option<String>,
    /// Free-form pick-up location.
    pub pick_up_location: Option<String>,
    /// Offered payment amount.
    pub payment_amount: Option<f64>,
}

/// A ride on the wire.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RideResponse {
    /// Ride identifier.
    pub ride_id: u64,
    /// Email of the requesting rider.
    pub rider_email: String,
    /// Email of the accepted driver, empty until one accepts.
    pub driver_email: String,
    /// What the ride is for.
    pub event: String,
    /// Free-form pick-up time.
    pub time_date: String,
    /// Free-form pick-up location.
    pub location: String,
    /// Offered payment amount.
    pub payment: f64,
    /// Lifecycle stage.
    pub stage: String,
    /// Position within the stage's display order.
    pub position_index: usize,
}

impl From<Ride> for RideResponse {
    fn from(ride: Ride) -> Self {
        Self {
            ride_id: ride.ride_id.as_u64(),
            rider_email: ride.rider_email,
            driver_email: ride.driver_email.unwrap_or_default(),
            event: ride.event,
            time_date: ride.time_date,
            location: ride.location,
            payment: ride.payment,
            stage: ride.stage.as_str().to_string(),
            position_index: ride.position_index,
        }
    }
}

/// Response to creating a ride request.
#[derive(Debug, Serialize, ToSchema)]
pub struct CreateRideResponse {
    /// Always `true` on success.
    pub success: bool,
    /// The created ride.
    pub ride: RideResponse,
}

/// The caller's rides, grouped by stage.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CurrentRidesResponse {
    /// Confirmed rides where the caller is rider or driver.
    pub confirmed_rides: Vec<RideResponse>,
    /// The caller's own pending requests.
    pub requested_rides: Vec<RideResponse>,
    /// The caller's requests awaiting driver confirmation.
    pub accepted_rides: Vec<RideResponse>,
}

impl From<RideBoard> for CurrentRidesResponse {
    fn from(board: RideBoard) -> Self {
        Self {
            confirmed_rides: board.confirmed.into_iter().map(Into::into).collect(),
            requested_rides: board.requested.into_iter().map(Into::into).collect(),
            accepted_rides: board.accepted.into_iter().map(Into::into).collect(),
        }
    }
}

/// Request naming the ride an action targets.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RideActionRequest {
    /// Target ride identifier.
    pub ride_id: Option<u64>,
}

impl RideActionRequest {
    fn ride_id(&self) -> Result<RideId, ApiError> {
        self.ride_id
            .map(RideId::new)
            .ok_or_else(|| ApiError::bad_request("rideId is required"))
    }
}

/// Creates ride routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/rides/request", post(create_ride))
        .route("/rides/current", get(current_rides))
        .route("/rides/available", get(available_rides))
        .route("/rides/accept-as-driver", post(accept_as_driver))
        .route("/rides/accept-driver", post(accept_driver))
        .route("/rides/delete", post(delete_ride))
}

/// Create a ride request.
///
/// POST /api/rides/request
#[utoipa::path(
    post,
    path = "/api/rides/request",
    tag = "rides",
    request_body = CreateRideRequest,
    responses(
        (status = 201, description = "Ride request created", body = CreateRideResponse),
        (status = 400, description = "Bad request", body = ApiErrorBody),
        (status = 401, description = "Unauthorized", body = ApiErrorBody),
        (status = 500, description = "Internal error", body = ApiErrorBody),
    ),
    security(
        ("sessionCookie" = [])
    )
)]
pub(crate) async fn create_ride(
    ctx: RequestContext,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateRideRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let payment = req
        .payment_amount
        .ok_or_else(|| ApiError::bad_request("paymentAmount is required"))?;

    let ride = state
        .lifecycle
        .create_request(
            &ctx.email,
            req.event.as_deref().unwrap_or(""),
            req.pick_up_time_date.as_deref().unwrap_or(""),
            req.pick_up_location.as_deref().unwrap_or(""),
            payment,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateRideResponse {
            success: true,
            ride: ride.into(),
        }),
    ))
}

/// List the caller's rides, grouped by stage.
///
/// GET /api/rides/current
#[utoipa::path(
    get,
    path = "/api/rides/current",
    tag = "rides",
    responses(
        (status = 200, description = "Rides listed", body = CurrentRidesResponse),
        (status = 401, description = "Unauthorized", body = ApiErrorBody),
        (status = 500, description = "Internal error", body = ApiErrorBody),
    ),
    security(
        ("sessionCookie" = [])
    )
)]
pub(crate) async fn current_rides(
    ctx: RequestContext,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let board = state.lifecycle.list_visible_to(&ctx.email).await?;
    Ok(Json(CurrentRidesResponse::from(board)))
}

/// List requests the caller could accept as a driver.
///
/// GET /api/rides/available
#[utoipa::path(
    get,
    path = "/api/rides/available",
    tag = "rides",
    responses(
        (status = 200, description = "Available requests listed", body = Vec<RideResponse>),
        (status = 401, description = "Unauthorized", body = ApiErrorBody),
        (status = 500, description = "Internal error", body = ApiErrorBody),
    ),
    security(
        ("sessionCookie" = [])
    )
)]
pub(crate) async fn available_rides(
    ctx: RequestContext,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let rides = state.lifecycle.list_available_to(&ctx.email).await?;
    let rides: Vec<RideResponse> = rides.into_iter().map(Into::into).collect();
    Ok(Json(rides))
}

/// Accept a pending request as driver.
///
/// POST /api/rides/accept-as-driver
#[utoipa::path(
    post,
    path = "/api/rides/accept-as-driver",
    tag = "rides",
    request_body = RideActionRequest,
    responses(
        (status = 200, description = "Request accepted", body = SuccessResponse),
        (status = 400, description = "Bad request", body = ApiErrorBody),
        (status = 401, description = "Unauthorized", body = ApiErrorBody),
        (status = 403, description = "Own request", body = ApiErrorBody),
        (status = 404, description = "No pending request with this id", body = ApiErrorBody),
        (status = 500, description = "Internal error", body = ApiErrorBody),
    ),
    security(
        ("sessionCookie" = [])
    )
)]
pub(crate) async fn accept_as_driver(
    ctx: RequestContext,
    State(state): State<Arc<AppState>>,
    Json(req): Json<RideActionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let ride_id = req.ride_id()?;
    state.lifecycle.accept_as_driver(ride_id, &ctx.email).await?;
    Ok(Json(SuccessResponse::ok()))
}

/// Confirm the accepted driver.
///
/// POST /api/rides/accept-driver
#[utoipa::path(
    post,
    path = "/api/rides/accept-driver",
    tag = "rides",
    request_body = RideActionRequest,
    responses(
        (status = 200, description = "Driver confirmed", body = SuccessResponse),
        (status = 400, description = "Bad request", body = ApiErrorBody),
        (status = 401, description = "Unauthorized", body = ApiErrorBody),
        (status = 403, description = "Caller is not the rider", body = ApiErrorBody),
        (status = 404, description = "No accepted ride with this id", body = ApiErrorBody),
        (status = 500, description = "Internal error", body = ApiErrorBody),
    ),
    security(
        ("sessionCookie" = [])
    )
)]
pub(crate) async fn accept_driver(
    ctx: RequestContext,
    State(state): State<Arc<AppState>>,
    Json(req): Json<RideActionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let ride_id = req.ride_id()?;
    state.lifecycle.confirm_driver(ride_id, &ctx.email).await?;
    Ok(Json(SuccessResponse::ok()))
}

/// Cancel a ride.
///
/// POST /api/rides/delete
#[utoipa::path(
    post,
    path = "/api/rides/delete",
    tag = "rides",
    request_body = RideActionRequest,
    responses(
        (status = 200, description = "Ride cancelled", body = SuccessResponse),
        (status = 400, description = "Bad request", body = ApiErrorBody),
        (status = 401, description = "Unauthorized", body = ApiErrorBody),
        (status = 404, description = "No such ride for this caller", body = ApiErrorBody),
        (status = 500, description = "Internal error", body = ApiErrorBody),
    ),
    security(
        ("sessionCookie" = [])
    )
)]
pub(crate) async fn delete_ride(
    ctx: RequestContext,
    State(state): State<Arc<AppState>>,
    Json(req): Json<RideActionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let ride_id = req.ride_id()?;
    state.lifecycle.cancel(ride_id, &ctx.email).await?;
    Ok(Json(SuccessResponse::ok()))
}
