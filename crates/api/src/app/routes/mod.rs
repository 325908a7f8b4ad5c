use axum::{
    Router,
    routing::{get, post},
};

pub mod assistant;
pub mod products;
pub mod scan;
pub mod system;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .nest("/products", products::router())
        .route("/scan", post(scan::submit))
        .route("/assistant", post(assistant::ask))
        .route("/reports", post(assistant::report))
}
