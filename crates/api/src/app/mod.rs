//! HTTP application wiring (axum router + service wiring).
//!
//! Layout:
//! - `services.rs`: store/adapter wiring behind `AppServices`
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};

use stocklens_infra::AppConfig;

use crate::middleware::{self, AuthState, TokenSet};

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full application from configuration (entrypoint used by `main`).
pub async fn build_app(config: &AppConfig) -> anyhow::Result<Router> {
    let services = Arc::new(services::build_services(config).await?);
    Ok(router_with(services, TokenSet::new(&config.api_tokens)))
}

/// Assemble the router around pre-built services (used directly by tests).
pub fn router_with(services: Arc<services::AppServices>, tokens: TokenSet) -> Router {
    let auth_state = AuthState {
        tokens: Arc::new(tokens),
    };

    // Protected routes: everything except the health probe.
    let protected = routes::router()
        .layer(Extension(services))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_middleware,
        ));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(protected)
}
