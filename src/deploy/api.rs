use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info, warn};

use super::flow::{DeployRequest, Deployer, MISSING_NOMBRE};
use crate::errors::DeployError;

// ── Shared application state ──────────────────────────────────────────

pub struct AppState {
    pub deployer: Deployer,
}

pub type SharedState = Arc<AppState>;

// ── Request payload types ─────────────────────────────────────────────

/// Body of `POST /desplegar`. `puerto` may arrive as a number or a string.
#[derive(Debug, Default, Deserialize)]
pub struct DeployParams {
    pub nombre: Option<String>,
    pub link: Option<String>,
    pub puerto: Option<serde_json::Value>,
}

/// Body of `POST /stop` and query of `GET /status`.
#[derive(Debug, Default, Deserialize)]
pub struct NombreParams {
    pub nombre: Option<String>,
}

/// Decode a JSON body, treating a missing or malformed body as `{}`.
fn lenient_json<T: serde::de::DeserializeOwned + Default>(body: &Bytes) -> T {
    serde_json::from_slice(body).unwrap_or_default()
}

fn require_nombre(params: NombreParams) -> Result<String, ApiError> {
    params
        .nombre
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ApiError::bad_request(MISSING_NOMBRE))
}

// ── Error handling ────────────────────────────────────────────────────

/// JSON error body: `{"error": ..., "details": ...}`.
#[derive(Debug)]
pub enum ApiError {
    BadRequest {
        error: String,
        details: Option<String>,
    },
    Internal {
        error: String,
        details: String,
    },
}

impl ApiError {
    pub fn bad_request(error: impl Into<String>) -> Self {
        ApiError::BadRequest {
            error: error.into(),
            details: None,
        }
    }

    /// Classify a deploy failure.
    fn from_deploy(err: DeployError) -> Self {
        match err {
            DeployError::InvalidRequest(msg) => ApiError::bad_request(msg),
            DeployError::NothingToDeploy { .. } => ApiError::BadRequest {
                error: "No compose file or Dockerfile found in the cloned project".to_string(),
                details: Some("Add one of the two to deploy automatically".to_string()),
            },
            err @ DeployError::CommandFailed { .. } => ApiError::Internal {
                error: "System command failed".to_string(),
                details: err.details(),
            },
            err => ApiError::Internal {
                error: "Unexpected error".to_string(),
                details: err.details(),
            },
        }
    }

    /// Classify a status/list/stop failure under an endpoint-specific message.
    fn from_query(err: DeployError, message: &str) -> Self {
        match err {
            DeployError::InvalidRequest(msg) => ApiError::bad_request(msg),
            err => ApiError::Internal {
                error: message.to_string(),
                details: err.details(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::BadRequest { error, details } => {
                warn!(error = %error, "rejected request");
                let body = match details {
                    Some(details) => json!({"error": error, "details": details}),
                    None => json!({"error": error}),
                };
                (StatusCode::BAD_REQUEST, body)
            }
            ApiError::Internal { error, details } => {
                error!(error = %error, details = %details, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({"error": error, "details": details}),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

// ── Router ────────────────────────────────────────────────────────────

pub fn api_router() -> Router<SharedState> {
    Router::new()
        .route("/desplegar", post(deploy))
        .route("/status", get(status))
        .route("/list", get(list_containers))
        .route("/stop", post(stop_container))
        .route("/health", get(health_check))
}

// ── Handlers ──────────────────────────────────────────────────────────

async fn health_check() -> &'static str {
    "ok"
}

async fn deploy(State(state): State<SharedState>, body: Bytes) -> Result<impl IntoResponse, ApiError> {
    let params: DeployParams = lenient_json(&body);
    let req = DeployRequest::from_params(
        params.nombre.as_deref(),
        params.link.as_deref(),
        params.puerto.as_ref(),
    )
    .map_err(ApiError::from_deploy)?;

    info!(nombre = %req.nombre, link = %req.link, puerto = req.puerto, "deploy requested");
    let outcome = state
        .deployer
        .deploy(&req)
        .await
        .map_err(ApiError::from_deploy)?;

    Ok((
        StatusCode::ACCEPTED,
        Json(json!({
            "message": outcome.message(),
            "details": outcome.details(),
        })),
    ))
}

async fn status(
    State(state): State<SharedState>,
    Query(params): Query<NombreParams>,
) -> Result<impl IntoResponse, ApiError> {
    let nombre = require_nombre(params)?;
    let report = state
        .deployer
        .status(&nombre)
        .await
        .map_err(|e| ApiError::from_query(e, "Error querying status"))?;
    Ok(Json(report))
}

async fn list_containers(State(state): State<SharedState>) -> Result<impl IntoResponse, ApiError> {
    let containers = state
        .deployer
        .list()
        .await
        .map_err(|e| ApiError::from_query(e, "Error listing containers"))?;
    Ok(Json(json!({"containers": containers})))
}

async fn stop_container(State(state): State<SharedState>, body: Bytes) -> Result<impl IntoResponse, ApiError> {
    let nombre = require_nombre(lenient_json(&body))?;
    state
        .deployer
        .stop(&nombre)
        .await
        .map_err(|e| ApiError::from_query(e, "Failed to stop container"))?;
    Ok((
        StatusCode::OK,
        Json(json!({"message": format!("Container {} stopped and removed", nombre)})),
    ))
}

// ── Tests ─────────────────────────────────────────────────────────────
