//! JSON-over-HTTP adapter around the optimization pipeline.
//!
//! A thin layer: one `POST /optimize` route that deserializes the raw
//! payload, runs the pipeline on a blocking worker, and serializes the
//! report. Each request builds its own model; requests share nothing but
//! the immutable solve options.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::json;

use crate::input::RawProblem;
use crate::report::Report;
use crate::solve::SolveOptions;
use crate::Error;

pub struct AppState {
    pub options: SolveOptions,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/optimize", post(optimize))
        .with_state(state)
}

async fn optimize(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RawProblem>,
) -> Result<Json<Report>, ApiError> {
    tracing::info!(
        items = payload.items.len(),
        tiers = payload.tiers.len(),
        lanes = payload.lanes.len(),
        "optimize request"
    );

    // CBC blocks; keep it off the async workers.
    let options = state.options;
    let report = tokio::task::spawn_blocking(move || crate::optimize(payload, &options))
        .await
        .map_err(|join_error| ApiError::Internal(join_error.to_string()))??;

    Ok(Json(report))
}

enum ApiError {
    Pipeline(Error),
    Internal(String),
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        ApiError::Pipeline(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Pipeline(Error::Input(error)) => {
                (StatusCode::UNPROCESSABLE_ENTITY, error.to_string())
            }
            ApiError::Pipeline(Error::Solver(error)) => {
                (StatusCode::BAD_GATEWAY, error.to_string())
            }
            ApiError::Internal(message) => {
                (StatusCode::INTERNAL_SERVER_ERROR, message.clone())
            }
        };
        tracing::warn!(%message, "optimize request failed");
        (status, Json(json!({ "error": message }))).into_response()
    }
}
