//! Account and session routes.
//!
//! ## Routes
//!
//! - `POST /signup` - Register an account and start a session
//! - `POST /signin` - Sign in with email and password
//! - `POST /logout` - Destroy the current session
//! - `GET  /session` - Report the signed-in account

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use carpool_core::UserAccount;
use carpool_core::user::normalize_email;

use crate::context::RequestContext;
use crate::error::{ApiError, ApiErrorBody};
use crate::server::AppState;

/// Request to register an account.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    /// Account email.
    pub email: Option<String>,
    /// Account password (plaintext over TLS; hashed before storage).
    pub password: Option<String>,
    /// Parent contact email.
    pub parent_email: Option<String>,
    /// Self-reported gender.
    pub gender: Option<String>,
    /// School-issued student number, checked against the roster.
    pub student_number: Option<String>,
}

/// Request to sign in.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SigninRequest {
    /// Account email.
    pub email: Option<String>,
    /// Account password.
    pub password: Option<String>,
}

/// The signed-in account.
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    /// Email of the signed-in account.
    pub email: String,
}

/// Acknowledgement returned by signup, signin, and logout.
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    /// Always `true` on success.
    pub success: bool,
    /// Email of the affected account, when one is signed in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Creates account routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/signup", post(signup))
        .route("/signin", post(signin))
        .route("/logout", post(logout))
        .route("/session", get(session))
}

fn required<'a>(field: &str, value: Option<&'a String>) -> Result<&'a str, ApiError> {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::bad_request(format!("{field} is required")))
}

/// Register an account.
///
/// POST /api/signup
#[utoipa::path(
    post,
    path = "/api/signup",
    tag = "accounts",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created and signed in", body = AuthResponse),
        (status = 400, description = "Bad request", body = ApiErrorBody),
        (status = 409, description = "Email already in use", body = ApiErrorBody),
        (status = 500, description = "Internal error", body = ApiErrorBody),
    )
)]
pub(crate) async fn signup(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SignupRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let email = required("email", req.email.as_ref())?;
    let password = required("password", req.password.as_ref())?;
    let parent_email = required("parentEmail", req.parent_email.as_ref())?;
    let gender = required("gender", req.gender.as_ref())?;
    let student_number = required("studentNumber", req.student_number.as_ref())?;

    if !state.config.roster.contains(student_number) {
        return Err(ApiError::bad_request("student number is not on the enrollment roster"));
    }

    let password_hash = state.hasher.hash(password)?;
    let account = UserAccount::new(email, password_hash, parent_email, gender, student_number);
    let email = account.email.clone();

    state.users.insert(account).await?;

    tracing::info!(email = %email, "Account registered");

    let session = state.sessions.create(&email)?;
    let cookie = state.sessions.set_cookie_header(&session);

    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, cookie)],
        Json(AuthResponse {
            success: true,
            email: Some(email),
        }),
    ))
}

/// Sign in.
///
/// POST /api/signin
#[utoipa::path(
    post,
    path = "/api/signin",
    tag = "accounts",
    request_body = SigninRequest,
    responses(
        (status = 200, description = "Signed in", body = AuthResponse),
        (status = 400, description = "Bad request", body = ApiErrorBody),
        (status = 401, description = "Wrong password", body = ApiErrorBody),
        (status = 404, description = "Unknown account", body = ApiErrorBody),
        (status = 500, description = "Internal error", body = ApiErrorBody),
    )
)]
pub(crate) async fn signin(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SigninRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let email = required("email", req.email.as_ref())?;
    let password = required("password", req.password.as_ref())?;

    let account = state
        .users
        .find(email)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("no account for {}", normalize_email(email))))?;

    if !state.hasher.verify(password, &account.password_hash)? {
        return Err(ApiError::unauthorized("wrong password"));
    }

    tracing::info!(email = %account.email, "Signed in");

    let session = state.sessions.create(&account.email)?;
    let cookie = state.sessions.set_cookie_header(&session);

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(AuthResponse {
            success: true,
            email: Some(account.email),
        }),
    ))
}

/// Sign out.
///
/// POST /api/logout
///
/// Destroying an absent or already-dead session is a success; the cookie is
/// cleared either way.
#[utoipa::path(
    post,
    path = "/api/logout",
    tag = "accounts",
    responses(
        (status = 200, description = "Signed out", body = AuthResponse),
        (status = 500, description = "Internal error", body = ApiErrorBody),
    )
)]
pub(crate) async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(token) = state.sessions.token_from_headers(&headers) {
        state.sessions.destroy(&token)?;
    }

    let cookie = state.sessions.clear_cookie_header();
    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(AuthResponse {
            success: true,
            email: None,
        }),
    ))
}

/// Report the signed-in account.
///
/// GET /api/session
#[utoipa::path(
    get,
    path = "/api/session",
    tag = "accounts",
    responses(
        (status = 200, description = "Signed in", body = SessionResponse),
        (status = 401, description = "Not signed in", body = ApiErrorBody),
    ),
    security(
        ("sessionCookie" = [])
    )
)]
pub(crate) async fn session(ctx: RequestContext) -> Json<SessionResponse> {
    Json(SessionResponse { email: ctx.email })
}
