use super::value_objects::OrderStatus;
use crate::store::StoreError;

// ============================================================================
// Order Workflow Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    /// Covers a genuinely missing order, a missing requester, and an order
    /// owned by somebody else. The three are deliberately indistinguishable
    /// to the caller.
    #[error("Order not found")]
    NotFound,

    #[error("Order can no longer be cancelled while it is {}", .0.display_name())]
    CannotCancel(OrderStatus),

    #[error("Order cannot move from {} to {}", .from.display_name(), .to.display_name())]
    InvalidTransition {
        from: OrderStatus,
        to: OrderStatus,
    },

    #[error("Order items cannot be empty")]
    EmptyItems,

    #[error("Invalid item quantity: {0}")]
    InvalidQuantity(i32),

    #[error("Order totals do not add up")]
    InconsistentTotals,

    #[error("Storage failure")]
    Store(#[from] StoreError),
}
