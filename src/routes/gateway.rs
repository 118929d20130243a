use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use serde_json::Value;

use crate::context::GatewayContext;
use crate::error::AppError;

/// POST /add
///
/// Admits one write request: header check, remote credential check, body
/// decode, publish. Each request is handled independently; no state is
/// shared between requests and no step is retried here.
pub async fn add_data(
    State(context): State<Arc<GatewayContext>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    // Only the apiKey header is consulted; everything else about the
    // request is opaque until the body decode below.
    let api_key = headers
        .get("apiKey")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::validation("missing apiKey header"))?;

    let decision = context.credentials.check_api_key(api_key).await;
    context.policy.admit(decision)?;

    let document: Value = serde_json::from_slice(&body)?;

    context.publisher.publish(&document).await.map_err(|e| {
        tracing::error!(error = %e, "failed to forward envelope");
        AppError::downstream("failed to process request")
    })?;

    Ok((StatusCode::OK, "processed"))
}

/// GET /health
pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
