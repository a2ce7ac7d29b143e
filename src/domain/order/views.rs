use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::aggregate::Order;
use super::value_objects::{OrderStatus, PaymentStatus};

// ============================================================================
// Order Read Models
// ============================================================================

/// Status projection returned by both lifecycle workflows and the read side.
#[derive(Debug, Clone, Serialize)]
pub struct OrderStatusView {
    pub order_id: Uuid,
    pub order_number: String,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub shipped_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub tracking_number: Option<String>,
    pub carrier: Option<String>,
}

impl From<&Order> for OrderStatusView {
    fn from(order: &Order) -> Self {
        Self {
            order_id: order.id,
            order_number: order.order_number.clone(),
            status: order.status,
            payment_status: order.payment_status,
            shipped_at: order.shipped_at,
            delivered_at: order.delivered_at,
            cancelled_at: order.cancelled_at,
            tracking_number: order.tracking_number.clone(),
            carrier: order.carrier.clone(),
        }
    }
}
