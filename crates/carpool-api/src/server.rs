//! API server implementation.
//!
//! Provides health, ready, and API endpoints for the Carpool service.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use carpool_core::store::{MemoryRideStore, RideStore};
use carpool_core::user::{MemoryUserDirectory, UserAccount, UserDirectory};
use carpool_core::{Result, RideLifecycle};

use crate::auth::PasswordHasher;
use crate::config::{Config, CorsConfig};
use crate::error::ApiError;
use crate::session::SessionStore;

// ============================================================================
// Health and Ready Responses
// ============================================================================

/// Health check response.
#[derive(Debug, Serialize)]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
}

/// Readiness check response.
#[derive(Debug, Serialize)]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct ReadyResponse {
    /// Service readiness status.
    pub ready: bool,
    /// Optional message about readiness state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

// ============================================================================
// Application State
// ============================================================================

/// Shared application state for all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Config,
    /// Ride lifecycle manager.
    pub lifecycle: RideLifecycle,
    /// Registered account directory.
    pub users: Arc<dyn UserDirectory>,
    /// Live session store.
    pub sessions: Arc<SessionStore>,
    /// Password hasher.
    pub hasher: PasswordHasher,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("lifecycle", &self.lifecycle)
            .field("users", &"<UserDirectory>")
            .field("sessions", &"<SessionStore>")
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Creates new application state over the given stores.
    #[must_use]
    pub fn new(config: Config, store: Arc<dyn RideStore>, users: Arc<dyn UserDirectory>) -> Self {
        let sessions = Arc::new(SessionStore::new(
            config.session.ttl_hours,
            config.session.cookie_name.clone(),
        ));
        Self {
            config,
            lifecycle: RideLifecycle::new(store),
            users,
            sessions,
            hasher: PasswordHasher::new(),
        }
    }

    /// Creates new application state with in-memory stores (for testing).
    #[must_use]
    pub fn with_memory_stores(config: Config) -> Self {
        Self::new(
            config,
            Arc::new(MemoryRideStore::new()),
            Arc::new(MemoryUserDirectory::new()),
        )
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// Health check endpoint handler.
///
/// Returns 200 OK if the service is alive. This is a shallow check
/// that doesn't verify dependencies.
async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Readiness check endpoint handler.
///
/// All state is in-process, so readiness follows liveness.
async fn ready() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(ReadyResponse {
            ready: true,
            message: None,
        }),
    )
}

/// Serves the generated `OpenAPI` document.
async fn openapi_json() -> std::result::Result<Json<utoipa::openapi::OpenApi>, ApiError> {
    Ok(Json(crate::openapi::openapi()))
}

// ============================================================================
// Server
// ============================================================================

/// The Carpool API server.
pub struct Server {
    config: Config,
    store: Arc<dyn RideStore>,
    users: Arc<dyn UserDirectory>,
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("config", &self.config)
            .field("store", &"<RideStore>")
            .field("users", &"<UserDirectory>")
            .finish()
    }
}

impl Server {
    /// Creates a new server with the given configuration and in-memory stores.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            store: Arc::new(MemoryRideStore::new()),
            users: Arc::new(MemoryUserDirectory::new()),
        }
    }

    /// Creates a new `ServerBuilder`.
    #[must_use]
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    /// Returns the server configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Creates the router with all routes and middleware.
    fn create_router(&self) -> (Arc<AppState>, Router) {
        let state = Arc::new(AppState::new(
            self.config.clone(),
            Arc::clone(&self.store),
            Arc::clone(&self.users),
        ));

        let cors = self.build_cors_layer();

        let router = Router::new()
            // Health and ready endpoints (no auth required)
            .route("/health", get(health))
            .route("/ready", get(ready))
            .route("/openapi.json", get(openapi_json))
            // API routes (auth via RequestContext extractor where needed)
            .nest("/api", crate::routes::api_routes())
            .layer(cors)
            .layer(TraceLayer::new_for_http())
            .with_state(Arc::clone(&state));

        (state, router)
    }

    /// Builds the CORS layer from configuration.
    fn build_cors_layer(&self) -> CorsLayer {
        let cors_config = &self.config.cors;
        let cors = Self::build_cors_base(cors_config);
        Self::apply_cors_allowed_origins(cors, cors_config)
    }

    fn build_cors_base(cors_config: &CorsConfig) -> CorsLayer {
        CorsLayer::new()
            .allow_methods([
                Method::GET,
                Method::HEAD,
                Method::POST,
                Method::OPTIONS,
            ])
            .allow_headers([
                header::CONTENT_TYPE,
                header::ACCEPT,
                header::HeaderName::from_static("x-request-id"),
            ])
            .expose_headers([
                header::CONTENT_TYPE,
                header::CONTENT_LENGTH,
                header::HeaderName::from_static("x-request-id"),
            ])
            // Session cookies must travel with cross-origin requests.
            .allow_credentials(true)
            .max_age(Duration::from_secs(cors_config.max_age_seconds))
    }

    fn cors_allows_any_origin(cors_config: &CorsConfig) -> bool {
        cors_config.allowed_origins.len() == 1
            && cors_config
                .allowed_origins
                .first()
                .is_some_and(|origin| origin == "*")
    }

    fn parse_cors_origins(cors_config: &CorsConfig) -> Vec<HeaderValue> {
        let mut allowed = Vec::new();
        for origin in &cors_config.allowed_origins {
            match HeaderValue::from_str(origin) {
                Ok(value) => allowed.push(value),
                Err(_) => {
                    tracing::error!(
                        origin = %origin,
                        "Invalid CORS origin; expected a valid HeaderValue"
                    );
                }
            }
        }
        allowed
    }

    fn apply_cors_allowed_origins(cors: CorsLayer, cors_config: &CorsConfig) -> CorsLayer {
        if cors_config.allowed_origins.is_empty() {
            return cors;
        }

        if Self::cors_allows_any_origin(cors_config) {
            // `Any` cannot be combined with credentials; drop them for the
            // wildcard development posture.
            return cors.allow_credentials(false).allow_origin(Any);
        }

        if cors_config
            .allowed_origins
            .iter()
            .any(|origin| origin == "*")
        {
            tracing::error!(
                origins = ?cors_config.allowed_origins,
                "Invalid CORS config: '*' must be the only allowed origin"
            );
            return cors;
        }

        let allowed = Self::parse_cors_origins(cors_config);

        if allowed.is_empty() {
            tracing::warn!("All configured CORS origins were invalid; disabling CORS");
            cors
        } else {
            tracing::info!(origins = ?cors_config.allowed_origins, "CORS configured");
            cors.allow_origin(AllowOrigin::list(allowed))
        }
    }

    /// Starts the server and blocks until shutdown.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the server cannot
    /// bind to the port.
    pub async fn serve(&self) -> Result<()> {
        self.config.validate()?;

        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        let (state, router) = self.create_router();

        seed_accounts(&state).await?;

        tracing::info!(
            http_port = self.config.http_port,
            "Starting Carpool API server"
        );

        let listener =
            tokio::net::TcpListener::bind(addr)
                .await
                .map_err(|e| carpool_core::Error::Internal {
                    message: format!("failed to bind to {addr}: {e}"),
                })?;

        axum::serve(listener, router)
            .await
            .map_err(|e| carpool_core::Error::Internal {
                message: format!("server error: {e}"),
            })?;

        Ok(())
    }

    /// Creates a test router for the server.
    ///
    /// This is useful for integration tests where you want to test
    /// the routes without actually binding to a port. The seed account, if
    /// configured, is registered before the router is returned.
    ///
    /// # Errors
    ///
    /// Returns an error if seeding the admin account fails.
    #[doc(hidden)]
    pub async fn test_router(&self) -> Result<Router> {
        let (state, router) = self.create_router();
        seed_accounts(&state).await?;
        Ok(router)
    }
}

/// Registers the configured seed account, if any.
///
/// An already-registered seed email is left untouched so restarts do not
/// clobber a changed password.
async fn seed_accounts(state: &AppState) -> Result<()> {
    let Some(seed) = state.config.seed_admin.as_ref() else {
        return Ok(());
    };

    if state.users.find(&seed.email).await?.is_some() {
        return Ok(());
    }

    let password_hash = state.hasher.hash(&seed.password)?;
    let account = UserAccount::new(
        &seed.email,
        password_hash,
        seed.parent_email.clone(),
        seed.gender.clone(),
        seed.student_number.clone(),
    );

    tracing::info!(email = %account.email, "Seeding admin account");
    state.users.insert(account).await?;
    Ok(())
}

/// Builder for constructing a server.
pub struct ServerBuilder {
    config: Config,
    store: Arc<dyn RideStore>,
    users: Arc<dyn UserDirectory>,
}

impl std::fmt::Debug for ServerBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerBuilder")
            .field("config", &self.config)
            .field("store", &"<RideStore>")
            .field("users", &"<UserDirectory>")
            .finish()
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self {
            config: Config::default(),
            store: Arc::new(MemoryRideStore::new()),
            users: Arc::new(MemoryUserDirectory::new()),
        }
    }
}

impl ServerBuilder {
    /// Creates a new server builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the full configuration.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Sets the HTTP port.
    #[must_use]
    pub fn http_port(mut self, port: u16) -> Self {
        self.config.http_port = port;
        self
    }

    /// Enables debug mode.
    ///
    /// See `Config::debug` for behavior changes (seed account, wildcard CORS).
    #[must_use]
    pub fn debug(mut self, enabled: bool) -> Self {
        self.config.debug = enabled;
        self
    }

    /// Sets the ride store used by the lifecycle manager.
    ///
    /// By default, the server uses an in-memory store intended for tests/dev.
    #[must_use]
    pub fn ride_store(mut self, store: Arc<dyn RideStore>) -> Self {
        self.store = store;
        self
    }

    /// Sets the account directory.
    #[must_use]
    pub fn user_directory(mut self, users: Arc<dyn UserDirectory>) -> Self {
        self.users = users;
        self
    }

    /// Builds the server.
    #[must_use]
    pub fn build(self) -> Server {
        Server {
            config: self.config,
            store: self.store,
            users: self.users,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
