//! HTTP surface of the record service: routing, shared state, and the
//! translation of the error taxonomy into JSON responses.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRequest, Request},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use anyhow::Context;
use models::ValidationError;
use security::AuthError;
use store::{Store, StoreError};

mod auth;
mod doctors;
mod mappings;
mod patients;

pub mod config;

pub use auth::AuthUser;
pub use config::{load_api_config, ApiConfig};

// Define the REST API error enum
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid input")]
    Validation(#[from] ValidationError),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Auth(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => ApiError::NotFound(what),
            StoreError::Duplicate(message) => ApiError::Conflict(message.to_string()),
            StoreError::Sqlite(e) => ApiError::Internal(e.into()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            // Broken hashes and signing failures are server faults, not
            // credential problems.
            AuthError::PasswordHash(msg) | AuthError::Jwt(msg) => {
                ApiError::Internal(anyhow::anyhow!(msg))
            }
            other => ApiError::Auth(other.to_string()),
        }
    }
}

// Convert ApiError into an HTTP response; NotFound reads the same whether
// the row is absent or belongs to another account.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Validation(report) => {
                (StatusCode::BAD_REQUEST, json!({ "errors": report.errors }))
            }
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, json!({ "error": message }))
            }
            ApiError::Auth(message) => (StatusCode::UNAUTHORIZED, json!({ "error": message })),
            ApiError::NotFound(what) => (
                StatusCode::NOT_FOUND,
                json!({ "error": format!("{what} not found") }),
            ),
            ApiError::Conflict(message) => (StatusCode::BAD_REQUEST, json!({ "error": message })),
            ApiError::Internal(err) => {
                error!(error = %err, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "internal server error" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

// Shared state for the Axum application
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub config: Arc<ApiConfig>,
}

impl AppState {
    pub fn new(config: ApiConfig, store: Store) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }
}

/// `Json<T>` with every rejection turned into a 400 JSON body, so malformed
/// requests read like any other validation failure.
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<T> FromRequest<AppState> for ApiJson<T>
where
    T: serde::de::DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => Err(ApiError::BadRequest(rejection.body_text())),
        }
    }
}

// Handler for the /api/health endpoint
async fn health_check_handler() -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({ "status": "ok", "message": "record service is healthy" })),
    )
}

/// Builds the full application router over the shared state.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any)
        .allow_origin(Any);

    Router::new()
        .route("/api/health", get(health_check_handler))
        .route("/api/auth/register", post(auth::register_handler))
        .route("/api/auth/login", post(auth::login_handler))
        .route(
            "/api/patients",
            post(patients::create_handler).get(patients::list_handler),
        )
        .route(
            "/api/patients/:id",
            get(patients::get_handler)
                .put(patients::update_handler)
                .delete(patients::delete_handler),
        )
        .route(
            "/api/doctors",
            post(doctors::create_handler).get(doctors::list_handler),
        )
        .route(
            "/api/doctors/:id",
            get(doctors::get_handler)
                .put(doctors::update_handler)
                .delete(doctors::delete_handler),
        )
        .route(
            "/api/mappings",
            post(mappings::assign_handler).get(mappings::list_handler),
        )
        .route(
            "/api/mappings/:id",
            get(mappings::patient_mappings_handler).delete(mappings::unassign_handler),
        )
        .with_state(state)
        .layer(cors)
}

// Main function to start the REST API server
pub async fn start_server(
    config: ApiConfig,
    store: Store,
    shutdown_rx: oneshot::Receiver<()>,
) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("invalid listen address")?;

    let router = app(AppState::new(config, store));

    let listener = TcpListener::bind(&addr)
        .await
        .context(format!("failed to bind to address: {}", addr))?;
    info!(%addr, "record service listening");

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(async {
            let _ = shutdown_rx.await;
        })
        .await
        .context("server failed to start or run")?;

    info!("record service stopped");
    Ok(())
}
