use std::sync::Arc;

use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

const REPORT_HISTORY_LIMIT: u32 = 20;

pub async fn ask(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::AssistantRequest>,
) -> axum::response::Response {
    if body.question.trim().is_empty() {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "question cannot be empty",
        );
    }

    let snapshot = match services.inventory_snapshot().await {
        Ok(snapshot) => snapshot,
        Err(e) => return errors::store_error_to_response(e),
    };

    match services.insight().ask(&body.question, &snapshot).await {
        Ok(answer) => (StatusCode::OK, Json(serde_json::json!({ "answer": answer }))).into_response(),
        Err(e) => errors::insight_error_to_response(e),
    }
}

pub async fn report(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::ReportRequest>,
) -> axum::response::Response {
    let snapshot = match services.inventory_snapshot().await {
        Ok(snapshot) => snapshot,
        Err(e) => return errors::store_error_to_response(e),
    };

    let history = match services.usage_snapshot(REPORT_HISTORY_LIMIT).await {
        Ok(history) => history,
        Err(e) => return errors::store_error_to_response(e),
    };

    match services.insight().report(body.kind, &snapshot, &history).await {
        Ok(report) => (
            StatusCode::OK,
            Json(serde_json::json!({ "kind": body.kind.as_str(), "report": report })),
        )
            .into_response(),
        Err(e) => errors::insight_error_to_response(e),
    }
}
