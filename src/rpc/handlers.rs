use axum::{
    Extension, Json, Router,
    extract::DefaultBodyLimit,
    http::StatusCode,
    routing::{get, post},
};
use std::sync::Arc;

use super::protocol::{
    ComputeRequest, ComputeResult, ENDPOINT_HANDLE, ENDPOINT_HEALTH, ErrorResponse, HealthReply,
    MAX_BODY_BYTES,
};
use crate::dispatch::handler::Handler;

/// Routes for one node, bound to its dispatch engine.
pub fn router(handler: Arc<Handler>) -> Router {
    Router::new()
        .route(ENDPOINT_HANDLE, post(handle_compute))
        .route(ENDPOINT_HEALTH, get(handle_health))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(Extension(handler))
}

pub async fn handle_compute(
    Extension(handler): Extension<Arc<Handler>>,
    Json(req): Json<ComputeRequest>,
) -> Result<Json<ComputeResult>, (StatusCode, Json<ErrorResponse>)> {
    match handler.handle(req).await {
        Ok(result) => Ok(Json(result)),
        Err(e) => Err((
            e.status(),
            Json(ErrorResponse {
                code: e.code(),
                message: e.message(),
            }),
        )),
    }
}

pub async fn handle_health(Extension(handler): Extension<Arc<Handler>>) -> Json<HealthReply> {
    Json(handler.health())
}
