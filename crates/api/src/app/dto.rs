use serde::Deserialize;

use stocklens_insight::ReportKind;
use stocklens_inventory::{Product, UsageEvent};
use stocklens_scan::ScanOutcome;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default)]
    pub unit_cost_cents: i64,
}

#[derive(Debug, Deserialize)]
pub struct AdjustQuantityRequest {
    pub delta: i64,
}

#[derive(Debug, Deserialize)]
pub struct ListProductsQuery {
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LowStockQuery {
    pub threshold: i64,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct AssistantRequest {
    pub question: String,
}

#[derive(Debug, Deserialize)]
pub struct ReportRequest {
    pub kind: ReportKind,
}

// -------------------------
// JSON mapping helpers
// -------------------------

pub fn product_to_json(product: &Product) -> serde_json::Value {
    serde_json::json!({
        "id": product.id.to_string(),
        "name": product.name,
        "category": product.category,
        "quantity": product.quantity,
        "unit_cost_cents": product.unit_cost_cents,
        "created_at": product.created_at.to_rfc3339(),
        "updated_at": product.updated_at.to_rfc3339(),
    })
}

pub fn usage_event_to_json(event: &UsageEvent) -> serde_json::Value {
    serde_json::json!({
        "id": event.id.to_string(),
        "product_id": event.product_id.to_string(),
        "delta": event.delta,
        "source": event.source.as_str(),
        "occurred_at": event.occurred_at.to_rfc3339(),
    })
}

pub fn scan_outcome_to_json(outcome: &ScanOutcome) -> serde_json::Value {
    serde_json::json!({
        "product": product_to_json(&outcome.product),
        "created": outcome.created,
        "scan": {
            "label": outcome.scan.label,
            "confidence": outcome.scan.confidence,
            "image_ref": outcome.scan.image_ref,
        },
    })
}
