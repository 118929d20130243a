use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use crate::context::AccountContext;
use crate::credentials::Account;
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct CheckParams {
    #[serde(rename = "apiKey")]
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GetParams {
    id: Option<String>,
}

/// POST /addAPIKey
///
/// Issues (or re-issues) the API key carried in the `apiKey` header.
pub async fn add_api_key(
    State(context): State<Arc<AccountContext>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let api_key = headers
        .get("apiKey")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::validation("missing apiKey header"))?;

    context.store.add_api_key(api_key).await?;
    Ok(StatusCode::OK)
}

/// GET /checkAPIKey?apiKey=
///
/// 200 if the key is live, 404 if absent or expired.
pub async fn check_api_key(
    State(context): State<Arc<AccountContext>>,
    Query(params): Query<CheckParams>,
) -> Result<impl IntoResponse, AppError> {
    let api_key = params
        .api_key
        .ok_or_else(|| AppError::validation("apiKey param not provided"))?;

    if context.store.check_api_key(&api_key).await? {
        Ok(StatusCode::OK)
    } else {
        Err(AppError::not_found("API key not found"))
    }
}

/// POST /add
///
/// Caches an account record from a `{id, name}` JSON body.
pub async fn add_account(
    State(context): State<Arc<AccountContext>>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let account: Account = serde_json::from_slice(&body)?;

    context.store.add_account(&account.id, &account.name).await?;
    Ok((
        StatusCode::OK,
        format!("added account '{}' with id '{}'", account.name, account.id),
    ))
}

/// GET /get?id=
pub async fn get_account(
    State(context): State<Arc<AccountContext>>,
    Query(params): Query<GetParams>,
) -> Result<impl IntoResponse, AppError> {
    let id = params
        .id
        .ok_or_else(|| AppError::validation("id param not provided"))?;

    let account = context.store.get_account(&id).await?;
    Ok(Json(account))
}

/// GET /health
pub async fn health(
    State(context): State<Arc<AccountContext>>,
) -> Result<impl IntoResponse, AppError> {
    match context.store.ping().await {
        Ok(_) => Ok((StatusCode::OK, "OK")),
        Err(e) => {
            tracing::error!(error = %e, "health check failed");
            Ok((StatusCode::SERVICE_UNAVAILABLE, "Service Unavailable"))
        }
    }
}
