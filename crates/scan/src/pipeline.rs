use thiserror::Error;

use stocklens_inventory::{
    InventoryStore, NewProduct, Product, ProductFilter, StoreError, UsageSource, match_label,
};
use stocklens_vision::{LabelRecognizer, ScanResult, VisionError};

/// Quantity added to a matched product per scan.
pub const SCAN_STEP: i64 = 1;

/// Seed quantity for a product created from an unmatched scan.
pub const DEFAULT_SCAN_QUANTITY: i64 = 1;

/// Category assigned to products created from a scan; the user can recategorize
/// through a manual edit afterwards.
pub const DEFAULT_SCAN_CATEGORY: &str = "uncategorized";

#[derive(Debug, Error)]
pub enum ScanError {
    #[error(transparent)]
    Recognition(#[from] VisionError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A single scan interaction.
///
/// `AwaitingImage → Recognized → Resolved`; a failure in any transition aborts
/// the scan with the store untouched.
#[derive(Debug, Clone)]
pub enum Scan {
    AwaitingImage,
    Recognized(ScanResult),
    Resolved(ScanOutcome),
}

impl Scan {
    pub fn outcome(self) -> Option<ScanOutcome> {
        match self {
            Scan::Resolved(outcome) => Some(outcome),
            _ => None,
        }
    }
}

/// Terminal report of a resolved scan.
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub product: Product,
    /// true when the scan created a new product, false when it incremented an
    /// existing one.
    pub created: bool,
    pub scan: ScanResult,
}

/// Orchestrates recognizer → label matching → store write.
///
/// Both terminal paths perform exactly one store operation, so there is no
/// partial state to roll back.
pub struct ScanPipeline<R, S> {
    recognizer: R,
    store: S,
}

impl<R, S> ScanPipeline<R, S>
where
    R: LabelRecognizer,
    S: InventoryStore,
{
    pub fn new(recognizer: R, store: S) -> Self {
        Self { recognizer, store }
    }

    /// Run a full scan from submitted image bytes to a resolved outcome.
    pub async fn submit_image(&self, image: &[u8]) -> Result<ScanOutcome, ScanError> {
        let mut scan = Scan::AwaitingImage;
        loop {
            scan = self.advance(scan, image).await?;
            if let Scan::Resolved(outcome) = scan {
                return Ok(outcome);
            }
        }
    }

    /// Drive the scan one transition forward. `Resolved` is absorbing; a
    /// failed transition aborts the scan with the store untouched.
    pub async fn advance(&self, scan: Scan, image: &[u8]) -> Result<Scan, ScanError> {
        match scan {
            Scan::AwaitingImage => {
                let result = self.recognizer.recognize(image).await?;
                tracing::debug!(label = %result.label, confidence = result.confidence, "scan recognized");
                Ok(Scan::Recognized(result))
            }
            Scan::Recognized(result) => Ok(Scan::Resolved(self.resolve(result).await?)),
            resolved @ Scan::Resolved(_) => Ok(resolved),
        }
    }

    /// `Recognized → Resolved`: match the label and apply the single store
    /// operation for the chosen path.
    async fn resolve(&self, result: ScanResult) -> Result<ScanOutcome, ScanError> {
        let products = self.store.list_products(ProductFilter::all()).await?;
        let outcome = match match_label(&products, &result.label) {
            Some(matched) => {
                let product = self
                    .store
                    .update_quantity(matched.id, SCAN_STEP, UsageSource::Scan)
                    .await?;
                tracing::info!(
                    product = %product.id,
                    label = %result.label,
                    quantity = product.quantity,
                    "scan incremented existing product"
                );
                ScanOutcome {
                    product,
                    created: false,
                    scan: result,
                }
            }
            None => {
                let product = self
                    .store
                    .create_product(NewProduct {
                        name: result.label.clone(),
                        category: DEFAULT_SCAN_CATEGORY.to_string(),
                        quantity: DEFAULT_SCAN_QUANTITY,
                        unit_cost_cents: 0,
                    })
                    .await?;
                tracing::info!(
                    product = %product.id,
                    label = %result.label,
                    "scan created new product"
                );
                ScanOutcome {
                    product,
                    created: true,
                    scan: result,
                }
            }
        };

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use stocklens_inventory::InMemoryInventoryStore;
    use std::sync::Arc;

    enum StubBehavior {
        Label(&'static str, f64),
        Fail,
    }

    struct StubRecognizer(StubBehavior);

    #[async_trait]
    impl LabelRecognizer for StubRecognizer {
        async fn recognize(&self, image: &[u8]) -> Result<ScanResult, VisionError> {
            match &self.0 {
                StubBehavior::Label(label, confidence) => Ok(ScanResult {
                    label: (*label).to_string(),
                    confidence: *confidence,
                    image_ref: format!("stub-{}", image.len()),
                }),
                StubBehavior::Fail => {
                    Err(VisionError::Unavailable("connection refused".to_string()))
                }
            }
        }
    }

    async fn seeded_store() -> Arc<InMemoryInventoryStore> {
        let store = Arc::new(InMemoryInventoryStore::new());
        store
            .create_product(NewProduct {
                name: "Widget".to_string(),
                category: "grocery".to_string(),
                quantity: 5,
                unit_cost_cents: 250,
            })
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn matched_scan_increments_by_one_and_records_event() {
        let store = seeded_store().await;
        let pipeline = ScanPipeline::new(
            StubRecognizer(StubBehavior::Label("Widget", 0.93)),
            store.clone(),
        );

        let outcome = pipeline.submit_image(b"image-bytes").await.unwrap();

        assert!(!outcome.created);
        assert_eq!(outcome.product.quantity, 6);

        let history = store.usage_history(outcome.product.id, 10).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].delta, 1);
        assert_eq!(history[0].source, UsageSource::Scan);
    }

    #[tokio::test]
    async fn match_is_case_insensitive() {
        let store = seeded_store().await;
        let pipeline = ScanPipeline::new(
            StubRecognizer(StubBehavior::Label("widget", 0.9)),
            store.clone(),
        );

        let outcome = pipeline.submit_image(b"image-bytes").await.unwrap();
        assert!(!outcome.created);
        assert_eq!(outcome.product.name, "Widget");
        assert_eq!(outcome.product.quantity, 6);
    }

    #[tokio::test]
    async fn unmatched_scan_creates_product_without_events() {
        let store = seeded_store().await;
        let pipeline = ScanPipeline::new(
            StubRecognizer(StubBehavior::Label("Sprocket", 0.88)),
            store.clone(),
        );

        let outcome = pipeline.submit_image(b"image-bytes").await.unwrap();

        assert!(outcome.created);
        assert_eq!(outcome.product.name, "Sprocket");
        assert_eq!(outcome.product.quantity, DEFAULT_SCAN_QUANTITY);
        assert_eq!(outcome.product.category, DEFAULT_SCAN_CATEGORY);

        let history = store.usage_history(outcome.product.id, 10).await.unwrap();
        assert!(history.is_empty());

        let products = store.list_products(ProductFilter::all()).await.unwrap();
        assert_eq!(products.len(), 2);
    }

    #[tokio::test]
    async fn failed_recognition_leaves_store_unchanged() {
        let store = seeded_store().await;
        let pipeline = ScanPipeline::new(StubRecognizer(StubBehavior::Fail), store.clone());

        let err = pipeline.submit_image(b"image-bytes").await.unwrap_err();
        assert!(matches!(err, ScanError::Recognition(_)));

        let products = store.list_products(ProductFilter::all()).await.unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].quantity, 5);
        assert!(store.recent_usage(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn advance_steps_through_all_states() {
        let store = seeded_store().await;
        let pipeline = ScanPipeline::new(
            StubRecognizer(StubBehavior::Label("Widget", 0.93)),
            store,
        );

        let scan = pipeline.advance(Scan::AwaitingImage, b"img").await.unwrap();
        assert!(matches!(scan, Scan::Recognized(_)));

        let scan = pipeline.advance(scan, b"img").await.unwrap();
        let outcome = scan.clone().outcome().unwrap();
        assert_eq!(outcome.product.quantity, 6);

        // Resolved is absorbing.
        let again = pipeline.advance(scan, b"img").await.unwrap();
        assert!(matches!(again, Scan::Resolved(_)));
    }

    #[tokio::test]
    async fn scan_outcome_carries_the_scan_result() {
        let store = seeded_store().await;
        let pipeline = ScanPipeline::new(
            StubRecognizer(StubBehavior::Label("Widget", 0.93)),
            store,
        );

        let outcome = pipeline.submit_image(b"image-bytes").await.unwrap();
        assert_eq!(outcome.scan.label, "Widget");
        assert!((outcome.scan.confidence - 0.93).abs() < f64::EPSILON);
    }
}
