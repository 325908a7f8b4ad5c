//! In-memory inventory store for development and tests.

use chrono::Utc;
use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use stocklens_core::ProductId;

use crate::product::{NewProduct, Product};
use crate::store::{InventoryStore, ProductFilter, StoreError, UsageWithProduct};
use crate::usage::{UsageEvent, UsageSource};

#[derive(Debug, Default)]
struct State {
    products: HashMap<ProductId, Product>,
    events: Vec<UsageEvent>,
}

/// Volatile `InventoryStore`. Not durable; a restart loses everything.
#[derive(Debug, Default)]
pub struct InMemoryInventoryStore {
    inner: RwLock<State>,
}

impl InMemoryInventoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn locked<T>(&self, f: impl FnOnce(&mut State) -> Result<T, StoreError>) -> Result<T, StoreError> {
        let mut state = self
            .inner
            .write()
            .map_err(|_| StoreError::backend("store lock poisoned"))?;
        f(&mut state)
    }
}

#[async_trait]
impl InventoryStore for InMemoryInventoryStore {
    async fn create_product(&self, new: NewProduct) -> Result<Product, StoreError> {
        let product = Product::create(new, Utc::now())?;
        self.locked(|state| {
            state.products.insert(product.id, product.clone());
            Ok(product)
        })
    }

    async fn get_product(&self, id: ProductId) -> Result<Product, StoreError> {
        self.locked(|state| state.products.get(&id).cloned().ok_or(StoreError::NotFound))
    }

    async fn list_products(&self, filter: ProductFilter) -> Result<Vec<Product>, StoreError> {
        self.locked(|state| {
            let mut products: Vec<Product> = state
                .products
                .values()
                .filter(|p| filter.matches(p))
                .cloned()
                .collect();
            products.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
            Ok(products)
        })
    }

    async fn update_quantity(
        &self,
        id: ProductId,
        delta: i64,
        source: UsageSource,
    ) -> Result<Product, StoreError> {
        let now = Utc::now();
        self.locked(|state| {
            let product = state.products.get_mut(&id).ok_or(StoreError::NotFound)?;
            let updated = product.checked_quantity(delta)?;

            product.quantity = updated;
            product.updated_at = now;
            let snapshot = product.clone();

            state
                .events
                .push(UsageEvent::record(id, delta, source, now));
            Ok(snapshot)
        })
    }

    async fn delete_product(&self, id: ProductId) -> Result<(), StoreError> {
        self.locked(|state| {
            state.products.remove(&id).ok_or(StoreError::NotFound)?;
            state.events.retain(|e| e.product_id != id);
            Ok(())
        })
    }

    async fn list_low_stock(&self, threshold: i64) -> Result<Vec<Product>, StoreError> {
        self.locked(|state| {
            let mut products: Vec<Product> = state
                .products
                .values()
                .filter(|p| p.is_low_stock(threshold))
                .cloned()
                .collect();
            products.sort_by_key(|p| p.quantity);
            Ok(products)
        })
    }

    async fn usage_history(
        &self,
        id: ProductId,
        limit: u32,
    ) -> Result<Vec<UsageEvent>, StoreError> {
        self.locked(|state| {
            if !state.products.contains_key(&id) {
                return Err(StoreError::NotFound);
            }

            let mut events: Vec<UsageEvent> = state
                .events
                .iter()
                .filter(|e| e.product_id == id)
                .cloned()
                .collect();
            events.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));
            events.truncate(limit as usize);
            Ok(events)
        })
    }

    async fn recent_usage(&self, limit: u32) -> Result<Vec<UsageWithProduct>, StoreError> {
        self.locked(|state| {
            let mut events: Vec<UsageWithProduct> = state
                .events
                .iter()
                .filter_map(|e| {
                    state.products.get(&e.product_id).map(|p| UsageWithProduct {
                        event: e.clone(),
                        product_name: p.name.clone(),
                    })
                })
                .collect();
            events.sort_by(|a, b| b.event.occurred_at.cmp(&a.event.occurred_at));
            events.truncate(limit as usize);
            Ok(events)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widget(quantity: i64) -> NewProduct {
        NewProduct {
            name: "Widget".to_string(),
            category: "grocery".to_string(),
            quantity,
            unit_cost_cents: 250,
        }
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let store = InMemoryInventoryStore::new();
        let created = store.create_product(widget(5)).await.unwrap();
        let fetched = store.get_product(created.id).await.unwrap();
        assert_eq!(created, fetched);
    }

    #[tokio::test]
    async fn create_appends_no_usage_event() {
        let store = InMemoryInventoryStore::new();
        let created = store.create_product(widget(5)).await.unwrap();
        let history = store.usage_history(created.id, 10).await.unwrap();
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn update_quantity_appends_exactly_one_event() {
        let store = InMemoryInventoryStore::new();
        let created = store.create_product(widget(5)).await.unwrap();

        let updated = store
            .update_quantity(created.id, 1, UsageSource::Scan)
            .await
            .unwrap();
        assert_eq!(updated.quantity, 6);

        let history = store.usage_history(created.id, 10).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].delta, 1);
        assert_eq!(history[0].source, UsageSource::Scan);
    }

    #[tokio::test]
    async fn rejected_update_leaves_store_unchanged() {
        let store = InMemoryInventoryStore::new();
        let created = store.create_product(widget(5)).await.unwrap();

        let err = store
            .update_quantity(created.id, -10, UsageSource::Manual)
            .await
            .unwrap_err();
        match err {
            StoreError::ConstraintViolation(_) => {}
            other => panic!("expected ConstraintViolation, got {other:?}"),
        }

        let product = store.get_product(created.id).await.unwrap();
        assert_eq!(product.quantity, 5);
        assert!(store.usage_history(created.id, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_removes_product_and_history() {
        let store = InMemoryInventoryStore::new();
        let created = store.create_product(widget(5)).await.unwrap();
        store
            .update_quantity(created.id, -1, UsageSource::Manual)
            .await
            .unwrap();

        store.delete_product(created.id).await.unwrap();

        assert!(matches!(
            store.get_product(created.id).await,
            Err(StoreError::NotFound)
        ));
        assert!(store.recent_usage(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn low_stock_filters_by_inclusive_threshold() {
        let store = InMemoryInventoryStore::new();
        store.create_product(widget(5)).await.unwrap();
        store
            .create_product(NewProduct {
                name: "Sprocket".to_string(),
                category: "hardware".to_string(),
                quantity: 2,
                unit_cost_cents: 0,
            })
            .await
            .unwrap();

        let low = store.list_low_stock(2).await.unwrap();
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].name, "Sprocket");
    }

    #[tokio::test]
    async fn list_products_filters_by_category() {
        let store = InMemoryInventoryStore::new();
        store.create_product(widget(5)).await.unwrap();
        store
            .create_product(NewProduct {
                name: "Sprocket".to_string(),
                category: "hardware".to_string(),
                quantity: 2,
                unit_cost_cents: 0,
            })
            .await
            .unwrap();

        let grocery = store
            .list_products(ProductFilter::by_category("grocery"))
            .await
            .unwrap();
        assert_eq!(grocery.len(), 1);
        assert_eq!(grocery[0].name, "Widget");
    }

    #[tokio::test]
    async fn recent_usage_joins_product_names() {
        let store = InMemoryInventoryStore::new();
        let created = store.create_product(widget(5)).await.unwrap();
        store
            .update_quantity(created.id, -2, UsageSource::Manual)
            .await
            .unwrap();

        let recent = store.recent_usage(10).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].product_name, "Widget");
        assert_eq!(recent[0].event.delta, -2);
    }
}
