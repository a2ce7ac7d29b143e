use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::OrderError;
use super::value_objects::{OrderItem, OrderStatus, PaymentStatus};

// ============================================================================
// Order Aggregate - Domain Logic
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    // Identity
    pub id: Uuid,
    /// Human-readable reference, immutable once assigned.
    pub order_number: String,
    pub user_id: Uuid,

    // Current state
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub items: Vec<OrderItem>,

    // Money, in cents. total = subtotal + shipping - discount.
    pub subtotal_cents: i64,
    pub shipping_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,

    // Shipping and cancellation metadata
    pub tracking_number: Option<String>,
    pub carrier: Option<String>,
    pub cancelled_reason: Option<String>,

    // Audit trail. The optional timestamps are set at most once, by the
    // matching transition and nothing else.
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub shipped_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Create a new `Pending` order. The grand total is derived here so it
    /// can never disagree with its parts.
    pub fn new(
        user_id: Uuid,
        order_number: impl Into<String>,
        items: Vec<OrderItem>,
        subtotal_cents: i64,
        shipping_cents: i64,
        discount_cents: i64,
        now: DateTime<Utc>,
    ) -> Result<Self, OrderError> {
        Self::validate_items(&items)?;

        if subtotal_cents < 0 || shipping_cents < 0 || discount_cents < 0 {
            return Err(OrderError::InconsistentTotals);
        }
        let total_cents = subtotal_cents + shipping_cents - discount_cents;
        if total_cents < 0 {
            return Err(OrderError::InconsistentTotals);
        }

        Ok(Self {
            id: Uuid::new_v4(),
            order_number: order_number.into(),
            user_id,
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
            items,
            subtotal_cents,
            shipping_cents,
            discount_cents,
            total_cents,
            tracking_number: None,
            carrier: None,
            cancelled_reason: None,
            created_at: now,
            updated_at: now,
            shipped_at: None,
            delivered_at: None,
            cancelled_at: None,
        })
    }

    fn validate_items(items: &[OrderItem]) -> Result<(), OrderError> {
        if items.is_empty() {
            return Err(OrderError::EmptyItems);
        }

        for item in items {
            if item.quantity <= 0 {
                return Err(OrderError::InvalidQuantity(item.quantity));
            }
        }

        Ok(())
    }

    /// Move the order to `Cancelled`, recording when and why.
    pub fn cancel(&mut self, reason: Option<String>, now: DateTime<Utc>) -> Result<(), OrderError> {
        if !self.status.can_cancel() {
            return Err(OrderError::CannotCancel(self.status));
        }

        self.status = OrderStatus::Cancelled;
        self.cancelled_at = Some(now);
        self.cancelled_reason = reason;
        self.updated_at = now;
        Ok(())
    }

    /// Advance along the happy path. The timestamp field written is chosen by
    /// the target status, never by the caller.
    pub fn advance(&mut self, target: OrderStatus, now: DateTime<Utc>) -> Result<(), OrderError> {
        if !self.status.can_update_status() || !self.status.is_valid_transition(target) {
            return Err(OrderError::InvalidTransition {
                from: self.status,
                to: target,
            });
        }

        self.status = target;
        match target {
            OrderStatus::Shipped => self.shipped_at = Some(now),
            OrderStatus::Delivered => self.delivered_at = Some(now),
            _ => {}
        }
        self.updated_at = now;
        Ok(())
    }

    /// Attach shipping metadata. Both fields must be present and non-blank;
    /// anything less leaves the previously stored values untouched.
    pub fn attach_tracking(&mut self, tracking_number: Option<&str>, carrier: Option<&str>) {
        if let (Some(tracking), Some(carrier)) = (tracking_number, carrier) {
            if !tracking.trim().is_empty() && !carrier.trim().is_empty() {
                self.tracking_number = Some(tracking.to_string());
                self.carrier = Some(carrier.to_string());
            }
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn item(quantity: i32) -> OrderItem {
        OrderItem {
            id: Uuid::new_v4(),
            sku_id: Uuid::new_v4(),
            quantity,
            unit_price_cents: 999,
        }
    }

    fn pending_order() -> Order {
        Order::new(
            Uuid::new_v4(),
            "ORD-1001",
            vec![item(2)],
            1998,
            499,
            0,
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn test_new_order_starts_pending_with_derived_total() {
        let order = pending_order();
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.payment_status, PaymentStatus::Pending);
        assert_eq!(order.total_cents, 2497);
        assert!(order.shipped_at.is_none());
        assert!(order.delivered_at.is_none());
        assert!(order.cancelled_at.is_none());
    }

    #[test]
    fn test_new_order_rejects_empty_items() {
        let err = Order::new(Uuid::new_v4(), "ORD-1", vec![], 0, 0, 0, Utc::now()).unwrap_err();
        assert!(matches!(err, OrderError::EmptyItems));
    }

    #[test]
    fn test_new_order_rejects_non_positive_quantity() {
        let err =
            Order::new(Uuid::new_v4(), "ORD-1", vec![item(0)], 0, 0, 0, Utc::now()).unwrap_err();
        assert!(matches!(err, OrderError::InvalidQuantity(0)));
    }

    #[test]
    fn test_new_order_rejects_negative_totals() {
        let err = Order::new(Uuid::new_v4(), "ORD-1", vec![item(1)], 100, 0, 500, Utc::now())
            .unwrap_err();
        assert!(matches!(err, OrderError::InconsistentTotals));
    }

    #[test]
    fn test_cancel_sets_status_timestamp_and_reason() {
        let mut order = pending_order();
        let now = Utc::now();
        order.cancel(Some("changed my mind".to_string()), now).unwrap();

        assert_eq!(order.status, OrderStatus::Cancelled);
        assert_eq!(order.cancelled_at, Some(now));
        assert_eq!(order.cancelled_reason.as_deref(), Some("changed my mind"));
        assert_eq!(order.updated_at, now);
    }

    #[test]
    fn test_cancel_rejected_once_shipped() {
        let mut order = pending_order();
        order.advance(OrderStatus::Confirmed, Utc::now()).unwrap();
        order.advance(OrderStatus::Processing, Utc::now()).unwrap();
        order.advance(OrderStatus::Shipped, Utc::now()).unwrap();

        let err = order.cancel(None, Utc::now()).unwrap_err();
        assert!(matches!(err, OrderError::CannotCancel(OrderStatus::Shipped)));
        assert_eq!(order.status, OrderStatus::Shipped);
        assert!(order.cancelled_at.is_none());
    }

    #[test]
    fn test_advance_into_shipped_sets_shipped_at_only() {
        let mut order = pending_order();
        order.advance(OrderStatus::Confirmed, Utc::now()).unwrap();
        order.advance(OrderStatus::Processing, Utc::now()).unwrap();

        let now = Utc::now();
        order.advance(OrderStatus::Shipped, now).unwrap();
        assert_eq!(order.shipped_at, Some(now));
        assert!(order.delivered_at.is_none());
    }

    #[test]
    fn test_advance_into_delivered_sets_delivered_at() {
        let mut order = pending_order();
        order.advance(OrderStatus::Confirmed, Utc::now()).unwrap();
        order.advance(OrderStatus::Processing, Utc::now()).unwrap();
        order.advance(OrderStatus::Shipped, Utc::now()).unwrap();

        let now = Utc::now();
        order.advance(OrderStatus::Delivered, now).unwrap();
        assert_eq!(order.delivered_at, Some(now));
    }

    #[test]
    fn test_advance_rejects_skipping_states() {
        let mut order = pending_order();
        order.advance(OrderStatus::Confirmed, Utc::now()).unwrap();

        let err = order.advance(OrderStatus::Delivered, Utc::now()).unwrap_err();
        assert!(matches!(
            err,
            OrderError::InvalidTransition {
                from: OrderStatus::Confirmed,
                to: OrderStatus::Delivered,
            }
        ));
        assert_eq!(order.status, OrderStatus::Confirmed);
        assert!(order.delivered_at.is_none());
    }

    #[test]
    fn test_attach_tracking_requires_both_fields() {
        let mut order = pending_order();

        order.attach_tracking(Some("1Z999"), None);
        assert!(order.tracking_number.is_none());

        order.attach_tracking(Some("1Z999"), Some("   "));
        assert!(order.tracking_number.is_none());
        assert!(order.carrier.is_none());

        order.attach_tracking(Some("1Z999"), Some("UPS"));
        assert_eq!(order.tracking_number.as_deref(), Some("1Z999"));
        assert_eq!(order.carrier.as_deref(), Some("UPS"));

        // Partial input afterwards must not clobber what is already there.
        order.attach_tracking(None, Some("FedEx"));
        assert_eq!(order.tracking_number.as_deref(), Some("1Z999"));
        assert_eq!(order.carrier.as_deref(), Some("UPS"));
    }
}
