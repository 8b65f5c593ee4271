//! `OpenAPI` (3.1) specification generation for `carpool-api`.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// `OpenAPI` documentation for the Carpool REST API (`/api/*`).
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Carpool API",
        version = env!("CARGO_PKG_VERSION"),
        description = "School carpooling ride-matching REST API"
    ),
    paths(
        crate::routes::accounts::signup,
        crate::routes::accounts::signin,
        crate::routes::accounts::logout,
        crate::routes::accounts::session,
        crate::routes::rides::create_ride,
        crate::routes::rides::current_rides,
        crate::routes::rides::available_rides,
        crate::routes::rides::accept_as_driver,
        crate::routes::rides::accept_driver,
        crate::routes::rides::delete_ride,
        crate::routes::feedback::submit_feedback,
    ),
    components(
        schemas(
            crate::error::ApiErrorBody,
            crate::routes::SuccessResponse,
            crate::routes::accounts::SignupRequest,
            crate::routes::accounts::SigninRequest,
            crate::routes::accounts::SessionResponse,
            crate::routes::accounts::AuthResponse,
            crate::routes::rides::CreateRideRequest,
            crate::routes::rides::RideResponse,
            crate::routes::rides::CreateRideResponse,
            crate::routes::rides::CurrentRidesResponse,
            crate::routes::rides::RideActionRequest,
            crate::routes::feedback::FeedbackRequest,
        )
    ),
    tags(
        (name = "accounts", description = "Account and session operations"),
        (name = "rides", description = "Ride lifecycle operations"),
        (name = "feedback", description = "User feedback"),
    ),
    modifiers(&SecurityAddon),
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "sessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new("carpool_session"))),
        );
    }
}

/// Returns the generated `OpenAPI` spec.
#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

/// Returns the generated `OpenAPI` spec serialized as pretty JSON.
///
/// # Errors
///
/// Returns an error if JSON serialization fails (should not happen).
pub fn openapi_json() -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_serializes_and_names_every_surface() {
        let json = openapi_json().unwrap();
        for path in [
            "/api/signup",
            "/api/signin",
            "/api/logout",
            "/api/session",
            "/api/rides/request",
            "/api/rides/current",
            "/api/rides/available",
            "/api/rides/accept-as-driver",
            "/api/rides/accept-driver",
            "/api/rides/delete",
            "/api/feedback",
        ] {
            assert!(json.contains(path), "missing path: {path}");
        }
        assert!(json.contains("sessionCookie"));
    }
}
