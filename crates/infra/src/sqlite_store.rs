//! SQLite-backed inventory store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use stocklens_core::ProductId;
use stocklens_inventory::{
    InventoryStore, NewProduct, Product, ProductFilter, StoreError, UsageEvent, UsageSource,
    UsageWithProduct,
};

const PRODUCT_COLUMNS: &str =
    "id, name, category, quantity, unit_cost_cents, created_at, updated_at";

pub struct SqliteInventoryStore {
    pool: SqlitePool,
}

impl SqliteInventoryStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn backend(err: sqlx::Error) -> StoreError {
    StoreError::backend(err.to_string())
}

fn row_to_product(row: &SqliteRow) -> Result<Product, StoreError> {
    let id: String = row.try_get("id").map_err(backend)?;
    let id: ProductId = id
        .parse()
        .map_err(|e| StoreError::backend(format!("corrupt product id: {e}")))?;

    Ok(Product {
        id,
        name: row.try_get("name").map_err(backend)?,
        category: row.try_get("category").map_err(backend)?,
        quantity: row.try_get("quantity").map_err(backend)?,
        unit_cost_cents: row.try_get("unit_cost_cents").map_err(backend)?,
        created_at: row
            .try_get::<DateTime<Utc>, _>("created_at")
            .map_err(backend)?,
        updated_at: row
            .try_get::<DateTime<Utc>, _>("updated_at")
            .map_err(backend)?,
    })
}

fn row_to_event(row: &SqliteRow) -> Result<UsageEvent, StoreError> {
    let id: String = row.try_get("id").map_err(backend)?;
    let product_id: String = row.try_get("product_id").map_err(backend)?;
    let source: String = row.try_get("source").map_err(backend)?;

    Ok(UsageEvent {
        id: id
            .parse()
            .map_err(|e| StoreError::backend(format!("corrupt event id: {e}")))?,
        product_id: product_id
            .parse()
            .map_err(|e| StoreError::backend(format!("corrupt product id: {e}")))?,
        delta: row.try_get("delta").map_err(backend)?,
        source: source
            .parse::<UsageSource>()
            .map_err(|e| StoreError::backend(format!("corrupt usage source: {e}")))?,
        occurred_at: row
            .try_get::<DateTime<Utc>, _>("occurred_at")
            .map_err(backend)?,
    })
}

#[async_trait]
impl InventoryStore for SqliteInventoryStore {
    async fn create_product(&self, new: NewProduct) -> Result<Product, StoreError> {
        let product = Product::create(new, Utc::now())?;

        sqlx::query(
            r#"
            INSERT INTO products (id, name, category, quantity, unit_cost_cents, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(product.id.to_string())
        .bind(&product.name)
        .bind(&product.category)
        .bind(product.quantity)
        .bind(product.unit_cost_cents)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        Ok(product)
    }

    async fn get_product(&self, id: ProductId) -> Result<Product, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?"
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        match row {
            Some(row) => row_to_product(&row),
            None => Err(StoreError::NotFound),
        }
    }

    async fn list_products(&self, filter: ProductFilter) -> Result<Vec<Product>, StoreError> {
        let rows = match filter.category {
            Some(category) => {
                sqlx::query(&format!(
                    "SELECT {PRODUCT_COLUMNS} FROM products WHERE category = ? ORDER BY updated_at DESC"
                ))
                .bind(category)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(&format!(
                    "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY updated_at DESC"
                ))
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(backend)?;

        rows.iter().map(row_to_product).collect()
    }

    async fn update_quantity(
        &self,
        id: ProductId,
        delta: i64,
        source: UsageSource,
    ) -> Result<Product, StoreError> {
        let mut tx = self.pool.begin().await.map_err(backend)?;

        let row = sqlx::query(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?"
        ))
        .bind(id.to_string())
        .fetch_optional(&mut *tx)
        .await
        .map_err(backend)?;

        let product = match row {
            Some(row) => row_to_product(&row)?,
            None => return Err(StoreError::NotFound),
        };

        // Invariant checked in Rust; a violating delta rolls the transaction
        // back untouched and surfaces as a typed error.
        let quantity = product.checked_quantity(delta)?;
        let now = Utc::now();

        sqlx::query("UPDATE products SET quantity = ?, updated_at = ? WHERE id = ?")
            .bind(quantity)
            .bind(now)
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(backend)?;

        let event = UsageEvent::record(id, delta, source, now);
        sqlx::query(
            "INSERT INTO usage_events (id, product_id, delta, source, occurred_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(event.id.to_string())
        .bind(event.product_id.to_string())
        .bind(event.delta)
        .bind(event.source.as_str())
        .bind(event.occurred_at)
        .execute(&mut *tx)
        .await
        .map_err(backend)?;

        tx.commit().await.map_err(backend)?;

        Ok(Product {
            quantity,
            updated_at: now,
            ..product
        })
    }

    async fn delete_product(&self, id: ProductId) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await.map_err(backend)?;

        let result = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(backend)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        sqlx::query("DELETE FROM usage_events WHERE product_id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(backend)?;

        tx.commit().await.map_err(backend)
    }

    async fn list_low_stock(&self, threshold: i64) -> Result<Vec<Product>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE quantity <= ? ORDER BY quantity ASC"
        ))
        .bind(threshold)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        rows.iter().map(row_to_product).collect()
    }

    async fn usage_history(
        &self,
        id: ProductId,
        limit: u32,
    ) -> Result<Vec<UsageEvent>, StoreError> {
        // Distinguish "no history" from "no such product".
        self.get_product(id).await?;

        let rows = sqlx::query(
            r#"
            SELECT id, product_id, delta, source, occurred_at
            FROM usage_events
            WHERE product_id = ?
            ORDER BY occurred_at DESC
            LIMIT ?
            "#,
        )
        .bind(id.to_string())
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        rows.iter().map(row_to_event).collect()
    }

    async fn recent_usage(&self, limit: u32) -> Result<Vec<UsageWithProduct>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT e.id, e.product_id, e.delta, e.source, e.occurred_at, p.name AS product_name
            FROM usage_events e
            JOIN products p ON p.id = e.product_id
            ORDER BY e.occurred_at DESC
            LIMIT ?
            "#,
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        rows.iter()
            .map(|row| {
                Ok(UsageWithProduct {
                    event: row_to_event(row)?,
                    product_name: row.try_get("product_name").map_err(backend)?,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connect_in_memory;

    async fn store() -> SqliteInventoryStore {
        SqliteInventoryStore::new(connect_in_memory().await.unwrap())
    }

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
        let store = store().await;
        let created = store.create_product(widget(5)).await.unwrap();
        let fetched = store.get_product(created.id).await.unwrap();

        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.name, "Widget");
        assert_eq!(fetched.quantity, 5);
        assert_eq!(fetched.unit_cost_cents, 250);
    }

    #[tokio::test]
    async fn get_missing_product_is_not_found() {
        let store = store().await;
        assert!(matches!(
            store.get_product(ProductId::new()).await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn update_quantity_persists_delta_and_event() {
        let store = store().await;
        let created = store.create_product(widget(5)).await.unwrap();

        let updated = store
            .update_quantity(created.id, 1, UsageSource::Scan)
            .await
            .unwrap();
        assert_eq!(updated.quantity, 6);

        let fetched = store.get_product(created.id).await.unwrap();
        assert_eq!(fetched.quantity, 6);

        let history = store.usage_history(created.id, 10).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].delta, 1);
        assert_eq!(history[0].source, UsageSource::Scan);
    }

    #[tokio::test]
    async fn rejected_update_rolls_back_completely() {
        let store = store().await;
        let created = store.create_product(widget(5)).await.unwrap();

        let err = store
            .update_quantity(created.id, -10, UsageSource::Manual)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::ConstraintViolation(_)));

        let fetched = store.get_product(created.id).await.unwrap();
        assert_eq!(fetched.quantity, 5);
        assert!(store.usage_history(created.id, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_removes_product_and_history() {
        let store = store().await;
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
        assert!(matches!(
            store.delete_product(created.id).await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn low_stock_and_category_queries_filter() {
        let store = store().await;
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

        let grocery = store
            .list_products(ProductFilter::by_category("grocery"))
            .await
            .unwrap();
        assert_eq!(grocery.len(), 1);
        assert_eq!(grocery[0].name, "Widget");

        let all = store.list_products(ProductFilter::all()).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn recent_usage_joins_product_names() {
        let store = store().await;
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
