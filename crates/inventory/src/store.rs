//! Inventory store port.
//!
//! The store owns the product table and the append-only usage-event log:
//! `update_quantity` records its own usage event so the two can never drift
//! apart. Implementations must make each operation atomic; there is no
//! cross-operation transaction discipline (single-user-at-a-time access).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use stocklens_core::{DomainError, ProductId};

use crate::product::{NewProduct, Product};
use crate::usage::{UsageEvent, UsageSource};

/// Store-level error.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("product not found")]
    NotFound,

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("constraint violated: {0}")]
    ConstraintViolation(String),

    /// Failure of the underlying storage medium.
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}

impl From<DomainError> for StoreError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) | DomainError::InvalidId(msg) => Self::Validation(msg),
            DomainError::ConstraintViolation(msg) => Self::ConstraintViolation(msg),
            DomainError::NotFound => Self::NotFound,
        }
    }
}

/// Optional listing filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductFilter {
    pub category: Option<String>,
}

impl ProductFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn by_category(category: impl Into<String>) -> Self {
        Self {
            category: Some(category.into()),
        }
    }

    pub fn matches(&self, product: &Product) -> bool {
        match &self.category {
            Some(category) => product.category == *category,
            None => true,
        }
    }
}

/// A usage event joined with the name of the product it belongs to,
/// for cross-product history views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageWithProduct {
    pub event: UsageEvent,
    pub product_name: String,
}

#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// Create a product. Appends no usage event.
    async fn create_product(&self, new: NewProduct) -> Result<Product, StoreError>;

    async fn get_product(&self, id: ProductId) -> Result<Product, StoreError>;

    /// List products, newest-updated first.
    async fn list_products(&self, filter: ProductFilter) -> Result<Vec<Product>, StoreError>;

    /// Apply a signed quantity change and append exactly one usage event,
    /// atomically. Rejected outright (store unchanged) if the resulting
    /// quantity would be negative.
    async fn update_quantity(
        &self,
        id: ProductId,
        delta: i64,
        source: UsageSource,
    ) -> Result<Product, StoreError>;

    /// Delete a product together with its usage history.
    async fn delete_product(&self, id: ProductId) -> Result<(), StoreError>;

    /// Products with `quantity <= threshold`, lowest quantity first.
    async fn list_low_stock(&self, threshold: i64) -> Result<Vec<Product>, StoreError>;

    /// A product's usage events, most recent first.
    async fn usage_history(
        &self,
        id: ProductId,
        limit: u32,
    ) -> Result<Vec<UsageEvent>, StoreError>;

    /// Most recent usage events across all products, joined with product names.
    async fn recent_usage(&self, limit: u32) -> Result<Vec<UsageWithProduct>, StoreError>;
}

#[async_trait]
impl<S> InventoryStore for Arc<S>
where
    S: InventoryStore + ?Sized,
{
    async fn create_product(&self, new: NewProduct) -> Result<Product, StoreError> {
        (**self).create_product(new).await
    }

    async fn get_product(&self, id: ProductId) -> Result<Product, StoreError> {
        (**self).get_product(id).await
    }

    async fn list_products(&self, filter: ProductFilter) -> Result<Vec<Product>, StoreError> {
        (**self).list_products(filter).await
    }

    async fn update_quantity(
        &self,
        id: ProductId,
        delta: i64,
        source: UsageSource,
    ) -> Result<Product, StoreError> {
        (**self).update_quantity(id, delta, source).await
    }

    async fn delete_product(&self, id: ProductId) -> Result<(), StoreError> {
        (**self).delete_product(id).await
    }

    async fn list_low_stock(&self, threshold: i64) -> Result<Vec<Product>, StoreError> {
        (**self).list_low_stock(threshold).await
    }

    async fn usage_history(
        &self,
        id: ProductId,
        limit: u32,
    ) -> Result<Vec<UsageEvent>, StoreError> {
        (**self).usage_history(id, limit).await
    }

    async fn recent_usage(&self, limit: u32) -> Result<Vec<UsageWithProduct>, StoreError> {
        (**self).recent_usage(limit).await
    }
}
