use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use stocklens_insight::InsightError;
use stocklens_inventory::StoreError;
use stocklens_scan::ScanError;
use stocklens_vision::VisionError;

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    match err {
        StoreError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        StoreError::Validation(msg) => {
            json_error(StatusCode::BAD_REQUEST, "validation_error", msg)
        }
        StoreError::ConstraintViolation(msg) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "constraint_violation", msg)
        }
        StoreError::Backend(msg) => {
            tracing::error!(error = %msg, "store backend failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", msg)
        }
    }
}

pub fn vision_error_to_response(err: VisionError) -> axum::response::Response {
    match err {
        VisionError::Unavailable(_) | VisionError::Service { .. } | VisionError::MalformedResponse(_) => {
            json_error(StatusCode::BAD_GATEWAY, "recognition_unavailable", err.to_string())
        }
        VisionError::NoLabels | VisionError::BelowConfidence { .. } => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "scan_rejected", err.to_string())
        }
    }
}

pub fn insight_error_to_response(err: InsightError) -> axum::response::Response {
    json_error(StatusCode::BAD_GATEWAY, "insight_unavailable", err.to_string())
}

pub fn scan_error_to_response(err: ScanError) -> axum::response::Response {
    match err {
        ScanError::Recognition(e) => vision_error_to_response(e),
        ScanError::Store(e) => store_error_to_response(e),
    }
}
