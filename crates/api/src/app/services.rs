//! Service wiring: store selection + external-service adapters.

use std::sync::Arc;

use stocklens_infra::{AppConfig, SqliteInventoryStore, db};
use stocklens_insight::{
    ChatModel, InsightService, OpenAiChatClient, ProductSnapshot, UsageSnapshot,
    chat::{DEFAULT_BASE_URL, DEFAULT_MODEL},
};
use stocklens_inventory::{
    InMemoryInventoryStore, InventoryStore, Product, StoreError, UsageWithProduct,
};
use stocklens_scan::ScanPipeline;
use stocklens_vision::{
    DEFAULT_MIN_CONFIDENCE, GoogleVisionClient, LabelRecognizer, VisionCredentials,
};

type DynStore = Arc<dyn InventoryStore>;
type DynRecognizer = Arc<dyn LabelRecognizer>;
type DynModel = Arc<dyn ChatModel>;

pub struct AppServices {
    store: DynStore,
    pipeline: ScanPipeline<DynRecognizer, DynStore>,
    insight: InsightService<DynModel>,
}

impl AppServices {
    pub fn new(store: DynStore, recognizer: DynRecognizer, model: DynModel) -> Self {
        let pipeline = ScanPipeline::new(recognizer, store.clone());
        let insight = InsightService::new(model);
        Self {
            store,
            pipeline,
            insight,
        }
    }

    pub fn store(&self) -> &DynStore {
        &self.store
    }

    pub fn pipeline(&self) -> &ScanPipeline<DynRecognizer, DynStore> {
        &self.pipeline
    }

    pub fn insight(&self) -> &InsightService<DynModel> {
        &self.insight
    }

    /// Current inventory as the snapshot values the insight adapter consumes.
    pub async fn inventory_snapshot(&self) -> Result<Vec<ProductSnapshot>, StoreError> {
        let products = self.store.list_products(Default::default()).await?;
        Ok(products.iter().map(product_snapshot).collect())
    }

    /// Recent usage as insight snapshot values.
    pub async fn usage_snapshot(&self, limit: u32) -> Result<Vec<UsageSnapshot>, StoreError> {
        let recent = self.store.recent_usage(limit).await?;
        Ok(recent.iter().map(usage_snapshot).collect())
    }
}

fn product_snapshot(product: &Product) -> ProductSnapshot {
    ProductSnapshot {
        name: product.name.clone(),
        category: product.category.clone(),
        quantity: product.quantity,
        unit_cost_cents: product.unit_cost_cents,
    }
}

fn usage_snapshot(usage: &UsageWithProduct) -> UsageSnapshot {
    UsageSnapshot {
        product_name: usage.product_name.clone(),
        delta: usage.event.delta,
        source: usage.event.source.as_str().to_string(),
        occurred_at: usage.event.occurred_at.to_rfc3339(),
    }
}

pub async fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    let store: DynStore = match &config.database_path {
        Some(path) => {
            let pool = db::connect(path).await?;
            Arc::new(SqliteInventoryStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_PATH not set; using volatile in-memory store");
            Arc::new(InMemoryInventoryStore::new())
        }
    };

    let credentials = VisionCredentials::load(&config.vision.credentials_path)?;
    let recognizer: DynRecognizer = Arc::new(GoogleVisionClient::new(
        credentials,
        config.vision.min_confidence.unwrap_or(DEFAULT_MIN_CONFIDENCE),
    )?);

    let model: DynModel = Arc::new(OpenAiChatClient::new(
        config.insight.api_key.clone(),
        config
            .insight
            .model
            .clone()
            .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        config
            .insight
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
    )?);

    Ok(AppServices::new(store, recognizer, model))
}
