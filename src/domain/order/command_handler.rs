use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use uuid::Uuid;

use crate::metrics::Metrics;
use crate::store::{Store, UserDirectory};

use super::commands::OrderCommand;
use super::errors::OrderError;
use super::value_objects::OrderStatus;
use super::views::OrderStatusView;

// ============================================================================
// Order Command Handler
// ============================================================================
//
// Orchestrates: Command -> Aggregate -> Store, one transaction per command.
//
// Every early return before commit() drops the transaction handle, which
// rolls the whole unit of work back. Partial state is never observable.
//
// ============================================================================

pub struct OrderCommandHandler {
    store: Arc<dyn Store>,
    users: Arc<dyn UserDirectory>,
    metrics: Arc<Metrics>,
}

impl OrderCommandHandler {
    pub fn new(store: Arc<dyn Store>, users: Arc<dyn UserDirectory>, metrics: Arc<Metrics>) -> Self {
        Self {
            store,
            users,
            metrics,
        }
    }

    /// Handle a command against one order and return its status projection.
    pub async fn handle(
        &self,
        order_id: Uuid,
        command: OrderCommand,
    ) -> Result<OrderStatusView, OrderError> {
        let workflow = command.workflow_name();
        let started = Instant::now();

        let result = match command {
            OrderCommand::Cancel {
                requested_by,
                reason,
            } => self.cancel_order(order_id, &requested_by, reason).await,
            OrderCommand::UpdateStatus {
                target,
                tracking_number,
                carrier,
            } => {
                self.update_status(order_id, target, tracking_number, carrier)
                    .await
            }
        };

        self.metrics
            .observe_workflow(workflow, started.elapsed().as_secs_f64());
        if let Err(err) = &result {
            self.metrics.record_workflow_failure(workflow, failure_reason(err));
        }

        result
    }

    /// Cancel an order on behalf of its owner and put the stock back.
    async fn cancel_order(
        &self,
        order_id: Uuid,
        requested_by: &str,
        reason: Option<String>,
    ) -> Result<OrderStatusView, OrderError> {
        let user = self
            .users
            .resolve(requested_by)
            .await?
            .ok_or(OrderError::NotFound)?;

        let mut tx = self.store.begin().await?;

        // An order owned by somebody else is reported exactly like a missing
        // one, so callers cannot probe for other users' order ids.
        let mut order = match tx.find_order(order_id).await? {
            Some(order) if order.user_id == user.id => order,
            _ => return Err(OrderError::NotFound),
        };

        if !order.status.can_cancel() {
            return Err(OrderError::CannotCancel(order.status));
        }

        let mut restored_units: i64 = 0;
        for item in &order.items {
            match tx.find_sku(item.sku_id).await? {
                Some(mut sku) => {
                    sku.restock(item.quantity, Utc::now());
                    tx.save_sku(&sku).await?;
                    restored_units += i64::from(item.quantity);
                }
                None => {
                    // Best effort per item; a vanished SKU must not hold the
                    // cancellation hostage.
                    tracing::warn!(
                        order_id = %order_id,
                        sku_id = %item.sku_id,
                        "SKU missing during cancellation, stock not restored"
                    );
                }
            }
        }

        let from = order.status;
        order.cancel(reason, Utc::now())?;

        tx.save_order(&order).await?;
        tx.commit().await?;

        self.metrics
            .record_transition(from.display_name(), OrderStatus::Cancelled.display_name());
        self.metrics.record_cancellation(restored_units);

        tracing::info!(
            order_id = %order_id,
            user_id = %user.id,
            restored_units,
            "Order cancelled"
        );

        Ok(OrderStatusView::from(&order))
    }

    /// Advance an order along the happy path, attaching shipping metadata
    /// when provided.
    async fn update_status(
        &self,
        order_id: Uuid,
        target: OrderStatus,
        tracking_number: Option<String>,
        carrier: Option<String>,
    ) -> Result<OrderStatusView, OrderError> {
        let mut tx = self.store.begin().await?;

        let mut order = tx
            .find_order(order_id)
            .await?
            .ok_or(OrderError::NotFound)?;

        let from = order.status;
        order.advance(target, Utc::now())?;

        if target == OrderStatus::Shipped {
            order.attach_tracking(tracking_number.as_deref(), carrier.as_deref());
        }

        tx.save_order(&order).await?;
        tx.commit().await?;

        self.metrics
            .record_transition(from.display_name(), target.display_name());

        tracing::info!(
            order_id = %order_id,
            from = from.display_name(),
            to = target.display_name(),
            "Order status updated"
        );

        Ok(OrderStatusView::from(&order))
    }
}

fn failure_reason(err: &OrderError) -> &'static str {
    match err {
        OrderError::NotFound => "not_found",
        OrderError::CannotCancel(_) => "invalid_state",
        OrderError::InvalidTransition { .. } => "invalid_transition",
        OrderError::Store(_) => "storage",
        OrderError::EmptyItems | OrderError::InvalidQuantity(_) | OrderError::InconsistentTotals => {
            "validation"
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
