use std::sync::Arc;

use axum::{Json, body::Bytes, extract::Extension, http::StatusCode, response::IntoResponse};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

/// Submit raw image bytes (`application/octet-stream`) for the scan pipeline.
pub async fn submit(
    Extension(services): Extension<Arc<AppServices>>,
    body: Bytes,
) -> axum::response::Response {
    if body.is_empty() {
        return errors::json_error(StatusCode::BAD_REQUEST, "empty_image", "image body is empty");
    }

    match services.pipeline().submit_image(&body).await {
        Ok(outcome) => {
            let status = if outcome.created {
                StatusCode::CREATED
            } else {
                StatusCode::OK
            };
            (status, Json(dto::scan_outcome_to_json(&outcome))).into_response()
        }
        Err(e) => errors::scan_error_to_response(e),
    }
}
