use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Order Value Objects
// ============================================================================

/// One line of an order: which SKU, how many units, and the unit price that
/// was in effect when the order was placed. Immutable after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: Uuid,
    pub sku_id: Uuid,
    pub quantity: i32,
    pub unit_price_cents: i64,
}

/// Payment progress. Tracked on its own axis, never derived from the
/// fulfilment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "payment_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Refunded,
    Failed,
}

/// Fulfilment status of an order.
///
/// Orders are created as `Pending`. `Delivered` and `Cancelled` are terminal:
/// nothing transitions out of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "order_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    /// Statuses reachable from `self` in a single transition. Empty for
    /// terminal statuses. A status never appears in its own row.
    pub fn valid_next(self) -> &'static [OrderStatus] {
        use OrderStatus::*;
        match self {
            Pending => &[Confirmed, Cancelled],
            Confirmed => &[Processing, Cancelled],
            Processing => &[Shipped, Cancelled],
            Shipped => &[Delivered],
            Delivered | Cancelled => &[],
        }
    }

    pub fn is_valid_transition(self, target: OrderStatus) -> bool {
        self.valid_next().contains(&target)
    }

    /// Cancellation is only open while the order is still in the warehouse.
    pub fn can_cancel(self) -> bool {
        matches!(
            self,
            OrderStatus::Pending | OrderStatus::Confirmed | OrderStatus::Processing
        )
    }

    pub fn can_update_status(self) -> bool {
        !self.valid_next().is_empty()
    }

    /// Human-readable label, used only in user-facing messages.
    pub fn display_name(self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Confirmed => "Confirmed",
            OrderStatus::Processing => "Processing",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_table_rows() {
        assert_eq!(
            OrderStatus::Pending.valid_next(),
            &[OrderStatus::Confirmed, OrderStatus::Cancelled]
        );
        assert_eq!(
            OrderStatus::Confirmed.valid_next(),
            &[OrderStatus::Processing, OrderStatus::Cancelled]
        );
        assert_eq!(
            OrderStatus::Processing.valid_next(),
            &[OrderStatus::Shipped, OrderStatus::Cancelled]
        );
        assert_eq!(OrderStatus::Shipped.valid_next(), &[OrderStatus::Delivered]);
        assert!(OrderStatus::Delivered.valid_next().is_empty());
        assert!(OrderStatus::Cancelled.valid_next().is_empty());
    }

    #[test]
    fn test_every_pair_outside_the_table_is_rejected() {
        for current in OrderStatus::ALL {
            for target in OrderStatus::ALL {
                let allowed = current.valid_next().contains(&target);
                assert_eq!(
                    current.is_valid_transition(target),
                    allowed,
                    "{:?} -> {:?}",
                    current,
                    target
                );
            }
        }
    }

    #[test]
    fn test_no_self_transitions() {
        for status in OrderStatus::ALL {
            assert!(!status.is_valid_transition(status), "{:?}", status);
        }
    }

    #[test]
    fn test_row_cardinalities() {
        assert_eq!(OrderStatus::Pending.valid_next().len(), 2);
        assert_eq!(OrderStatus::Confirmed.valid_next().len(), 2);
        assert_eq!(OrderStatus::Processing.valid_next().len(), 2);
        assert_eq!(OrderStatus::Shipped.valid_next().len(), 1);
        assert_eq!(OrderStatus::Delivered.valid_next().len(), 0);
        assert_eq!(OrderStatus::Cancelled.valid_next().len(), 0);
    }

    #[test]
    fn test_can_cancel_exact_set() {
        assert!(OrderStatus::Pending.can_cancel());
        assert!(OrderStatus::Confirmed.can_cancel());
        assert!(OrderStatus::Processing.can_cancel());
        assert!(!OrderStatus::Shipped.can_cancel());
        assert!(!OrderStatus::Delivered.can_cancel());
        assert!(!OrderStatus::Cancelled.can_cancel());
    }

    #[test]
    fn test_can_update_status_is_false_only_for_terminal() {
        for status in OrderStatus::ALL {
            let terminal = matches!(status, OrderStatus::Delivered | OrderStatus::Cancelled);
            assert_eq!(status.can_update_status(), !terminal, "{:?}", status);
        }
    }

    #[test]
    fn test_display_names() {
        assert_eq!(OrderStatus::Pending.display_name(), "Pending");
        assert_eq!(OrderStatus::Shipped.display_name(), "Shipped");
        assert_eq!(OrderStatus::Cancelled.display_name(), "Cancelled");
    }

    #[test]
    fn test_order_status_serialization() {
        let status = OrderStatus::Processing;
        let json = serde_json::to_string(&status).unwrap();
        assert_eq!(json, "\"processing\"");
        let back: OrderStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(status, back);
    }

    #[test]
    fn test_order_item_serialization() {
        let item = OrderItem {
            id: Uuid::new_v4(),
            sku_id: Uuid::new_v4(),
            quantity: 3,
            unit_price_cents: 1499,
        };

        let json = serde_json::to_string(&item).unwrap();
        let back: OrderItem = serde_json::from_str(&json).unwrap();
        assert_eq!(item, back);
    }
}
