use super::value_objects::OrderStatus;

// ============================================================================
// Order Commands - Represent caller intent
// ============================================================================

#[derive(Debug, Clone)]
pub enum OrderCommand {
    /// Customer-initiated cancellation. `requested_by` is the external
    /// authentication subject, resolved to an internal user before anything
    /// else happens.
    Cancel {
        requested_by: String,
        reason: Option<String>,
    },
    /// Operator-side lifecycle advance, optionally attaching shipping
    /// metadata when the target is `Shipped`.
    UpdateStatus {
        target: OrderStatus,
        tracking_number: Option<String>,
        carrier: Option<String>,
    },
}

impl OrderCommand {
    /// Stable name used for logging and metrics labels.
    pub fn workflow_name(&self) -> &'static str {
        match self {
            OrderCommand::Cancel { .. } => "cancel_order",
            OrderCommand::UpdateStatus { .. } => "update_order_status",
        }
    }
}
