use std::sync::Arc;

use uuid::Uuid;

use crate::store::Store;

use super::errors::OrderError;
use super::views::OrderStatusView;

// ============================================================================
// Order Query Handler - read side
// ============================================================================

pub struct OrderQueryHandler {
    store: Arc<dyn Store>,
}

impl OrderQueryHandler {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Current status projection for one order. Read-only; the transaction
    /// is dropped without commit.
    pub async fn status(&self, order_id: Uuid) -> Result<OrderStatusView, OrderError> {
        let mut tx = self.store.begin().await?;
        let order = tx
            .find_order(order_id)
            .await?
            .ok_or(OrderError::NotFound)?;

        Ok(OrderStatusView::from(&order))
    }
}
