//! API integration tests.
//!
//! Tests the complete request flow: HTTP → routes → lifecycle → store.

use anyhow::{Context, Result};
use axum::http::StatusCode;
use serde_json::{Value, json};

use carpool_api::config::{Config, SeedAdminConfig};
use carpool_api::server::{Server, ServerBuilder};

use helpers::{get_json, post_json, signed_up};

async fn test_router() -> Result<axum::Router> {
    ServerBuilder::new()
        .debug(true)
        .build()
        .test_router()
        .await
        .context("build test router")
}

#[tokio::test]
async fn signup_creates_account_and_session() -> Result<()> {
    let router = test_router().await?;

    let response = post_json(
        router.clone(),
        "/api/signup",
        None,
        json!({
            "email": "rider@school.test",
            "password": "hunter2",
            "parentEmail": "parent@school.test",
            "gender": "female",
            "studentNumber": "12345678"
        }),
    )
    .await?;

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["success"], json!(true));
    assert_eq!(response.body["email"], json!("rider@school.test"));

    let cookie = response.cookie.context("expected a session cookie")?;
    let (status, body): (_, Value) =
        get_json(router, "/api/session", Some(cookie.as_str())).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], json!("rider@school.test"));

    Ok(())
}

#[tokio::test]
async fn signup_rejects_missing_fields_and_bad_student_numbers() -> Result<()> {
    let router = test_router().await?;

    let missing = post_json(
        router.clone(),
        "/api/signup",
        None,
        json!({ "email": "rider@school.test", "password": "hunter2" }),
    )
    .await?;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);

    let off_roster = post_json(
        router,
        "/api/signup",
        None,
        json!({
            "email": "rider@school.test",
            "password": "hunter2",
            "parentEmail": "parent@school.test",
            "gender": "female",
            "studentNumber": "99999999"
        }),
    )
    .await?;
    assert_eq!(off_roster.status, StatusCode::BAD_REQUEST);

    Ok(())
}

#[tokio::test]
async fn duplicate_signup_conflicts() -> Result<()> {
    let router = test_router().await?;
    signed_up(&router, "rider@school.test").await?;

    let duplicate = post_json(
        router,
        "/api/signup",
        None,
        json!({
            "email": "Rider@School.Test",
            "password": "other",
            "parentEmail": "parent@school.test",
            "gender": "male",
            "studentNumber": "1"
        }),
    )
    .await?;
    assert_eq!(duplicate.status, StatusCode::CONFLICT);

    Ok(())
}

#[tokio::test]
async fn signin_distinguishes_unknown_account_from_wrong_password() -> Result<()> {
    let router = test_router().await?;
    signed_up(&router, "rider@school.test").await?;

    let unknown = post_json(
        router.clone(),
        "/api/signin",
        None,
        json!({ "email": "nobody@school.test", "password": "hunter2" }),
    )
    .await?;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);

    let wrong = post_json(
        router.clone(),
        "/api/signin",
        None,
        json!({ "email": "rider@school.test", "password": "wrong" }),
    )
    .await?;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);

    let right = post_json(
        router,
        "/api/signin",
        None,
        json!({ "email": "rider@school.test", "password": "hunter2" }),
    )
    .await?;
    assert_eq!(right.status, StatusCode::OK);
    assert!(right.cookie.is_some());

    Ok(())
}

#[tokio::test]
async fn logout_ends_the_session() -> Result<()> {
    let router = test_router().await?;
    let cookie = signed_up(&router, "rider@school.test").await?;

    let logout = post_json(router.clone(), "/api/logout", Some(cookie.as_str()), json!({})).await?;
    assert_eq!(logout.status, StatusCode::OK);

    let (status, _): (_, Value) = get_json(router, "/api/session", Some(cookie.as_str())).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn seed_admin_can_sign_in() -> Result<()> {
    let config = Config {
        seed_admin: Some(SeedAdminConfig::default()),
        ..Config::default()
    };
    let router = Server::new(config).test_router().await?;

    let signin = post_json(
        router,
        "/api/signin",
        None,
        json!({ "email": "admin@gmail.com", "password": "admin" }),
    )
    .await?;
    assert_eq!(signin.status, StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn ride_endpoints_require_a_session() -> Result<()> {
    let router = test_router().await?;

    let (status, _): (_, Value) = get_json(router.clone(), "/api/rides/current", None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let create = post_json(
        router,
        "/api/rides/request",
        None,
        json!({
            "event": "Game Night",
            "pickUpTimeDate": "Friday 7pm",
            "pickUpLocation": "Gym",
            "paymentAmount": 5.0
        }),
    )
    .await?;
    assert_eq!(create.status, StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn create_ride_validates_input() -> Result<()> {
    let router = test_router().await?;
    let cookie = signed_up(&router, "rider@school.test").await?;

    let missing_event = post_json(
        router.clone(),
        "/api/rides/request",
        Some(cookie.as_str()),
        json!({
            "pickUpTimeDate": "Friday 7pm",
            "pickUpLocation": "Gym",
            "paymentAmount": 5.0
        }),
    )
    .await?;
    assert_eq!(missing_event.status, StatusCode::BAD_REQUEST);

    let negative_payment = post_json(
        router,
        "/api/rides/request",
        Some(cookie.as_str()),
        json!({
            "event": "Game Night",
            "pickUpTimeDate": "Friday 7pm",
            "pickUpLocation": "Gym",
            "paymentAmount": -1.0
        }),
    )
    .await?;
    assert_eq!(negative_payment.status, StatusCode::BAD_REQUEST);

    Ok(())
}

#[tokio::test]
async fn full_ride_lifecycle_over_http() -> Result<()> {
    let router = test_router().await?;
    let rider = signed_up(&router, "rider@school.test").await?;
    let driver = signed_up(&router, "driver@school.test").await?;

    // Rider requests a ride.
    let created = post_json(
        router.clone(),
        "/api/rides/request",
        Some(rider.as_str()),
        json!({
            "event": "Game Night",
            "pickUpTimeDate": "Friday 7pm",
            "pickUpLocation": "Gym",
            "paymentAmount": 5.0
        }),
    )
    .await?;
    assert_eq!(created.status, StatusCode::CREATED);
    let ride = &created.body["ride"];
    assert_eq!(ride["stage"], json!("requested"));
    assert_eq!(ride["driverEmail"], json!(""));
    let ride_id = ride["rideId"].as_u64().context("rideId in response")?;

    // The driver sees it as available; the rider does not.
    let (_, available): (_, Value) =
        get_json(router.clone(), "/api/rides/available", Some(driver.as_str())).await?;
    assert_eq!(available.as_array().map(Vec::len), Some(1));
    assert_eq!(available[0]["timeDate"], json!("Friday 7pm"));
    let (_, own_view): (_, Value) =
        get_json(router.clone(), "/api/rides/available", Some(rider.as_str())).await?;
    assert_eq!(own_view.as_array().map(Vec::len), Some(0));

    // Rider cannot accept their own request.
    let self_accept = post_json(
        router.clone(),
        "/api/rides/accept-as-driver",
        Some(rider.as_str()),
        json!({ "rideId": ride_id }),
    )
    .await?;
    assert_eq!(self_accept.status, StatusCode::FORBIDDEN);

    // The driver accepts.
    let accepted = post_json(
        router.clone(),
        "/api/rides/accept-as-driver",
        Some(driver.as_str()),
        json!({ "rideId": ride_id }),
    )
    .await?;
    assert_eq!(accepted.status, StatusCode::OK);

    // A second accept finds nothing at Requested.
    let late_accept = post_json(
        router.clone(),
        "/api/rides/accept-as-driver",
        Some(driver.as_str()),
        json!({ "rideId": ride_id }),
    )
    .await?;
    assert_eq!(late_accept.status, StatusCode::NOT_FOUND);

    // Only the rider may confirm.
    let driver_confirm = post_json(
        router.clone(),
        "/api/rides/accept-driver",
        Some(driver.as_str()),
        json!({ "rideId": ride_id }),
    )
    .await?;
    assert_eq!(driver_confirm.status, StatusCode::FORBIDDEN);

    let confirmed = post_json(
        router.clone(),
        "/api/rides/accept-driver",
        Some(rider.as_str()),
        json!({ "rideId": ride_id }),
    )
    .await?;
    assert_eq!(confirmed.status, StatusCode::OK);

    // Both parties see the confirmed ride.
    for cookie in [rider.as_str(), driver.as_str()] {
        let (_, current): (_, Value) =
            get_json(router.clone(), "/api/rides/current", Some(cookie)).await?;
        assert_eq!(current["confirmedRides"].as_array().map(Vec::len), Some(1));
        assert_eq!(
            current["confirmedRides"][0]["driverEmail"],
            json!("driver@school.test")
        );
    }

    // The driver cancels; the board empties for everyone.
    let cancelled = post_json(
        router.clone(),
        "/api/rides/delete",
        Some(driver.as_str()),
        json!({ "rideId": ride_id }),
    )
    .await?;
    assert_eq!(cancelled.status, StatusCode::OK);

    let (_, current): (_, Value) =
        get_json(router, "/api/rides/current", Some(rider.as_str())).await?;
    assert_eq!(current["confirmedRides"].as_array().map(Vec::len), Some(0));
    assert_eq!(current["requestedRides"].as_array().map(Vec::len), Some(0));
    assert_eq!(current["acceptedRides"].as_array().map(Vec::len), Some(0));

    Ok(())
}

#[tokio::test]
async fn cancel_by_stranger_looks_like_a_missing_ride() -> Result<()> {
    let router = test_router().await?;
    let rider = signed_up(&router, "rider@school.test").await?;
    let stranger = signed_up(&router, "stranger@school.test").await?;

    let created = post_json(
        router.clone(),
        "/api/rides/request",
        Some(rider.as_str()),
        json!({
            "event": "Game Night",
            "pickUpTimeDate": "Friday 7pm",
            "pickUpLocation": "Gym",
            "paymentAmount": 5.0
        }),
    )
    .await?;
    let ride_id = created.body["ride"]["rideId"]
        .as_u64()
        .context("rideId in response")?;

    let cancel = post_json(
        router.clone(),
        "/api/rides/delete",
        Some(stranger.as_str()),
        json!({ "rideId": ride_id }),
    )
    .await?;
    assert_eq!(cancel.status, StatusCode::NOT_FOUND);

    // The ride survives for its rider.
    let (_, current): (_, Value) =
        get_json(router, "/api/rides/current", Some(rider.as_str())).await?;
    assert_eq!(current["requestedRides"].as_array().map(Vec::len), Some(1));

    Ok(())
}

#[tokio::test]
async fn feedback_is_accepted_from_signed_in_users() -> Result<()> {
    let router = test_router().await?;
    let cookie = signed_up(&router, "rider@school.test").await?;

    let empty = post_json(
        router.clone(),
        "/api/feedback",
        Some(cookie.as_str()),
        json!({ "feedback": "  " }),
    )
    .await?;
    assert_eq!(empty.status, StatusCode::BAD_REQUEST);

    let ok = post_json(
        router,
        "/api/feedback",
        Some(cookie.as_str()),
        json!({ "feedback": "The available list is great" }),
    )
    .await?;
    assert_eq!(ok.status, StatusCode::OK);
    assert_eq!(ok.body["success"], json!(true));

    Ok(())
}

mod helpers {
    use super::*;
    use axum::body::Body;
    use axum::http::{Method, Request, header};
    use serde::de::DeserializeOwned;
    use tower::ServiceExt;

    /// A parsed response plus the session cookie it set, if any.
    pub struct ApiResponse {
        pub status: StatusCode,
        pub body: Value,
        pub cookie: Option<String>,
    }

    fn make_request(
        method: Method,
        uri: &str,
        cookie: Option<&str>,
        body: Option<Value>,
    ) -> Result<Request<Body>> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");

        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }

        let body = match body {
            Some(v) => Body::from(serde_json::to_vec(&v).context("serialize request body")?),
            None => Body::empty(),
        };

        builder.body(body).context("build request")
    }

    /// Extracts the `name=value` pair from a `Set-Cookie` header.
    pub fn session_cookie(response: &axum::response::Response) -> Option<String> {
        response
            .headers()
            .get(header::SET_COOKIE)?
            .to_str()
            .ok()?
            .split(';')
            .next()
            .map(str::to_string)
    }

    pub async fn post_json(
        router: axum::Router,
        uri: &str,
        cookie: Option<&str>,
        body: Value,
    ) -> Result<ApiResponse> {
        let request = make_request(Method::POST, uri, cookie, Some(body))?;
        let response = router
            .oneshot(request)
            .await
            .map_err(|err| -> anyhow::Error { match err {} })?;

        let status = response.status();
        let cookie = session_cookie(&response);
        let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .context("read response body")?;
        let body: Value = serde_json::from_slice(&bytes).with_context(|| {
            format!(
                "parse JSON response (status={status}): {}",
                String::from_utf8_lossy(&bytes)
            )
        })?;

        Ok(ApiResponse {
            status,
            body,
            cookie,
        })
    }

    pub async fn get_json<T: DeserializeOwned>(
        router: axum::Router,
        uri: &str,
        cookie: Option<&str>,
    ) -> Result<(StatusCode, T)> {
        let request = make_request(Method::GET, uri, cookie, None)?;
        let response = router
            .oneshot(request)
            .await
            .map_err(|err| -> anyhow::Error { match err {} })?;

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .context("read response body")?;
        let json = serde_json::from_slice(&bytes).with_context(|| {
            format!(
                "parse JSON response (status={status}): {}",
                String::from_utf8_lossy(&bytes)
            )
        })?;
        Ok((status, json))
    }

    /// Registers an account on the roster and returns its session cookie.
    pub async fn signed_up(router: &axum::Router, email: &str) -> Result<String> {
        let response = post_json(
            router.clone(),
            "/api/signup",
            None,
            json!({
                "email": email,
                "password": "hunter2",
                "parentEmail": "parent@school.test",
                "gender": "female",
                "studentNumber": "12345678"
            }),
        )
        .await?;

        anyhow::ensure!(
            response.status == StatusCode::CREATED,
            "signup failed with {}: {}",
            response.status,
            response.body
        );
        response.cookie.context("signup should set a session cookie")
    }
}
