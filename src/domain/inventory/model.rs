use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Stock Keeping Units
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum InventoryError {
    #[error("Insufficient stock for {sku}: requested {requested}, available {available}")]
    InsufficientStock {
        sku: String,
        requested: i32,
        available: i32,
    },

    #[error("Invalid unit count: {0}")]
    InvalidUnits(i32),
}

/// A purchasable variant of a product, tracked with its own stock count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sku {
    pub id: Uuid,
    pub code: String,
    pub stock_quantity: i32,
    pub updated_at: DateTime<Utc>,
}

impl Sku {
    pub fn new(code: impl Into<String>, stock_quantity: i32, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            code: code.into(),
            stock_quantity,
            updated_at: now,
        }
    }

    /// Return units to stock, e.g. when a cancelled order releases them.
    /// Callers pass the ordered quantity, which is positive by the order-item
    /// invariant.
    pub fn restock(&mut self, units: i32, now: DateTime<Utc>) {
        self.stock_quantity += units;
        self.updated_at = now;
    }

    /// Take units out of stock for a placed order. Never goes negative.
    pub fn reserve(&mut self, units: i32, now: DateTime<Utc>) -> Result<(), InventoryError> {
        if units <= 0 {
            return Err(InventoryError::InvalidUnits(units));
        }
        if units > self.stock_quantity {
            return Err(InventoryError::InsufficientStock {
                sku: self.code.clone(),
                requested: units,
                available: self.stock_quantity,
            });
        }

        self.stock_quantity -= units;
        self.updated_at = now;
        Ok(())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_restock_adds_units() {
        let mut sku = Sku::new("SKU-A", 5, Utc::now());
        sku.restock(3, Utc::now());
        assert_eq!(sku.stock_quantity, 8);
    }

    #[test]
    fn test_reserve_takes_units() {
        let mut sku = Sku::new("SKU-A", 5, Utc::now());
        sku.reserve(4, Utc::now()).unwrap();
        assert_eq!(sku.stock_quantity, 1);
    }

    #[test]
    fn test_reserve_rejects_overdraw() {
        let mut sku = Sku::new("SKU-A", 2, Utc::now());
        let err = sku.reserve(3, Utc::now()).unwrap_err();
        assert!(matches!(
            err,
            InventoryError::InsufficientStock {
                requested: 3,
                available: 2,
                ..
            }
        ));
        assert_eq!(sku.stock_quantity, 2);
    }

    #[test]
    fn test_reserve_rejects_non_positive_units() {
        let mut sku = Sku::new("SKU-A", 2, Utc::now());
        assert!(matches!(
            sku.reserve(0, Utc::now()).unwrap_err(),
            InventoryError::InvalidUnits(0)
        ));
    }
}
