// ============================================================================
// Axum Routes
// ============================================================================
//
// Router assembly for both HTTP services. Dependencies arrive through the
// context structs in `crate::context`; nothing is looked up globally.
//
// - account.rs: credential store endpoints (account service)
// - gateway.rs: admission-control endpoint (edge gateway)
// - middleware.rs: request logging
//
// ============================================================================

mod account;
mod gateway;
mod middleware;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::context::{AccountContext, GatewayContext};

/// Create the edge gateway router
pub fn gateway_router(context: Arc<GatewayContext>) -> Router {
    Router::new()
        .route("/add", post(gateway::add_data))
        .route("/health", get(gateway::health))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(axum::middleware::from_fn(middleware::request_logging))
                .into_inner(),
        )
        .with_state(context)
}

/// Create the account service router
pub fn account_router(context: Arc<AccountContext>) -> Router {
    Router::new()
        .route("/addAPIKey", post(account::add_api_key))
        .route("/checkAPIKey", get(account::check_api_key))
        .route("/add", post(account::add_account))
        .route("/get", get(account::get_account))
        .route("/health", get(account::health))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(axum::middleware::from_fn(middleware::request_logging))
                .into_inner(),
        )
        .with_state(context)
}
