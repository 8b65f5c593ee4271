//! # carpool-api
//!
//! HTTP composition layer for the Carpool ride-matching service.
//!
//! This crate provides the API surface for Carpool, handling:
//!
//! - **Authentication**: Password hashing, session cookies, request context
//! - **Routing**: HTTP endpoint configuration
//! - **Service Wiring**: Composition of the ride lifecycle and user directory
//! - **Observability**: Request tracing and health checks
//!
//! ## Design Principles
//!
//! This crate is a **thin composition layer** with no domain policy.
//! All business logic lives in `carpool-core`.
//!
//! ## Endpoints
//!
//! ```text
//! GET  /health                      - Health check
//! GET  /ready                       - Readiness check
//! GET  /openapi.json                - OpenAPI document
//! POST /api/signup                  - Register an account
//! POST /api/signin                  - Sign in
//! POST /api/logout                  - Sign out
//! GET  /api/session                 - Current session
//! POST /api/rides/request           - Create a ride request
//! GET  /api/rides/current           - Own rides, grouped by stage
//! GET  /api/rides/available         - Requests acceptable as driver
//! POST /api/rides/accept-as-driver  - Accept a request as driver
//! POST /api/rides/accept-driver     - Confirm the accepted driver
//! POST /api/rides/delete            - Cancel a ride
//! POST /api/feedback                - Submit feedback
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use carpool_api::server::Server;
//! use carpool_api::config::Config;
//!
//! let server = Server::new(Config::default());
//! server.serve().await?;
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]

pub mod auth;
pub mod config;
pub mod context;
pub mod error;
pub mod openapi;
pub mod routes;
pub mod server;
pub mod session;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::context::RequestContext;
    pub use crate::error::{ApiError, ApiResult};
    pub use crate::server::Server;
}
