use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stocklens_core::{DomainError, DomainResult, ProductId};

/// A tracked inventory item.
///
/// Invariant: `quantity >= 0`. Mutations that would break it are rejected
/// outright (no clamping), leaving the record unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub category: String,
    pub quantity: i64,
    /// Unit cost in minor currency units (cents).
    pub unit_cost_cents: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a product (manual entry or scan pipeline).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub category: String,
    pub quantity: i64,
    pub unit_cost_cents: i64,
}

impl Product {
    /// Validate `new` and build the record with a fresh identifier.
    ///
    /// Creation never appends a usage event; the log records quantity
    /// *changes*, not initial stock.
    pub fn create(new: NewProduct, now: DateTime<Utc>) -> DomainResult<Self> {
        if new.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if new.quantity < 0 {
            return Err(DomainError::validation("initial quantity cannot be negative"));
        }

        Ok(Self {
            id: ProductId::new(),
            name: new.name,
            category: new.category,
            quantity: new.quantity,
            unit_cost_cents: new.unit_cost_cents,
            created_at: now,
            updated_at: now,
        })
    }

    /// Compute the quantity after applying `delta`, enforcing the invariant.
    ///
    /// Zero deltas are rejected as validation failures; deltas that would take
    /// the quantity negative are rejected as constraint violations.
    pub fn checked_quantity(&self, delta: i64) -> DomainResult<i64> {
        if delta == 0 {
            return Err(DomainError::validation("delta cannot be zero"));
        }

        let updated = self.quantity.checked_add(delta).ok_or_else(|| {
            DomainError::constraint("quantity arithmetic overflow")
        })?;
        if updated < 0 {
            return Err(DomainError::constraint(format!(
                "quantity cannot go negative ({} {:+})",
                self.quantity, delta
            )));
        }

        Ok(updated)
    }

    pub fn is_low_stock(&self, threshold: i64) -> bool {
        self.quantity <= threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn widget(quantity: i64) -> Product {
        Product::create(
            NewProduct {
                name: "Widget".to_string(),
                category: "grocery".to_string(),
                quantity,
                unit_cost_cents: 250,
            },
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn create_rejects_empty_name() {
        let err = Product::create(
            NewProduct {
                name: "   ".to_string(),
                category: "grocery".to_string(),
                quantity: 1,
                unit_cost_cents: 0,
            },
            Utc::now(),
        )
        .unwrap_err();

        match err {
            DomainError::Validation(_) => {}
            _ => panic!("expected Validation error for empty name"),
        }
    }

    #[test]
    fn create_rejects_negative_initial_quantity() {
        let err = Product::create(
            NewProduct {
                name: "Widget".to_string(),
                category: "grocery".to_string(),
                quantity: -1,
                unit_cost_cents: 0,
            },
            Utc::now(),
        )
        .unwrap_err();

        match err {
            DomainError::Validation(_) => {}
            _ => panic!("expected Validation error for negative quantity"),
        }
    }

    #[test]
    fn checked_quantity_applies_signed_deltas() {
        let product = widget(5);
        assert_eq!(product.checked_quantity(1).unwrap(), 6);
        assert_eq!(product.checked_quantity(-5).unwrap(), 0);
    }

    #[test]
    fn checked_quantity_rejects_going_negative() {
        let product = widget(5);
        let err = product.checked_quantity(-10).unwrap_err();
        match err {
            DomainError::ConstraintViolation(_) => {}
            _ => panic!("expected ConstraintViolation"),
        }
        // Rejection leaves the record untouched.
        assert_eq!(product.quantity, 5);
    }

    #[test]
    fn checked_quantity_rejects_zero_delta() {
        let product = widget(5);
        let err = product.checked_quantity(0).unwrap_err();
        match err {
            DomainError::Validation(_) => {}
            _ => panic!("expected Validation error for zero delta"),
        }
    }

    #[test]
    fn low_stock_uses_inclusive_threshold() {
        let product = widget(3);
        assert!(product.is_low_stock(3));
        assert!(product.is_low_stock(10));
        assert!(!product.is_low_stock(2));
    }

    proptest! {
        /// No accepted sequence of deltas ever produces a negative quantity.
        #[test]
        fn quantity_never_negative(start in 0i64..10_000, deltas in proptest::collection::vec(-100i64..100, 0..50)) {
            let mut product = widget(start);
            for delta in deltas {
                if let Ok(updated) = product.checked_quantity(delta) {
                    product.quantity = updated;
                }
                prop_assert!(product.quantity >= 0);
            }
        }
    }
}
