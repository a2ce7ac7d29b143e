// Private module declaration
mod server;

use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry};

// Re-export for public API
pub use server::start_metrics_server;

// ============================================================================
// Metrics Module - Prometheus metrics for observability
// ============================================================================
//
// Tracks the order lifecycle workflows:
// - Status transitions (labelled from/to)
// - Cancellations and the inventory units they restore
// - Workflow failures by reason
// - Workflow latency
//
// All metrics are registered with Prometheus and scraped via /metrics.
// ============================================================================

pub struct Metrics {
    registry: Registry,

    pub status_transitions: IntCounterVec,
    pub orders_cancelled: IntCounter,
    pub inventory_units_restored: IntCounter,
    pub workflow_failures: IntCounterVec,
    pub workflow_duration: HistogramVec,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let status_transitions = IntCounterVec::new(
            Opts::new(
                "order_status_transitions_total",
                "Order status transitions applied",
            ),
            &["from", "to"],
        )?;
        registry.register(Box::new(status_transitions.clone()))?;

        let orders_cancelled = IntCounter::new(
            "orders_cancelled_total",
            "Orders moved to the cancelled status",
        )?;
        registry.register(Box::new(orders_cancelled.clone()))?;

        let inventory_units_restored = IntCounter::new(
            "inventory_units_restored_total",
            "Stock units returned by cancellations",
        )?;
        registry.register(Box::new(inventory_units_restored.clone()))?;

        let workflow_failures = IntCounterVec::new(
            Opts::new("workflow_failures_total", "Order workflows that failed"),
            &["workflow", "reason"],
        )?;
        registry.register(Box::new(workflow_failures.clone()))?;

        let workflow_duration = HistogramVec::new(
            HistogramOpts::new("workflow_duration_seconds", "Order workflow duration")
                .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
            &["workflow"],
        )?;
        registry.register(Box::new(workflow_duration.clone()))?;

        Ok(Self {
            registry,
            status_transitions,
            orders_cancelled,
            inventory_units_restored,
            workflow_failures,
            workflow_duration,
        })
    }

    /// Get the Prometheus registry for exposing metrics via HTTP
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn record_transition(&self, from: &str, to: &str) {
        self.status_transitions.with_label_values(&[from, to]).inc();
    }

    pub fn record_cancellation(&self, restored_units: i64) {
        self.orders_cancelled.inc();
        if restored_units > 0 {
            self.inventory_units_restored.inc_by(restored_units as u64);
        }
    }

    pub fn record_workflow_failure(&self, workflow: &str, reason: &str) {
        self.workflow_failures
            .with_label_values(&[workflow, reason])
            .inc();
    }

    pub fn observe_workflow(&self, workflow: &str, seconds: f64) {
        self.workflow_duration
            .with_label_values(&[workflow])
            .observe(seconds);
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new().expect("Failed to create metrics")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new().unwrap();
        assert!(metrics.registry.gather().len() > 0);
    }

    #[test]
    fn test_record_transition() {
        let metrics = Metrics::new().unwrap();
        metrics.record_transition("Processing", "Shipped");

        let gathered = metrics.registry.gather();
        let transitions = gathered
            .iter()
            .find(|m| m.name() == "order_status_transitions_total")
            .unwrap();
        assert_eq!(transitions.metric[0].counter.value, Some(1.0));
    }

    #[test]
    fn test_record_cancellation_counts_units() {
        let metrics = Metrics::new().unwrap();
        metrics.record_cancellation(4);
        metrics.record_cancellation(0);

        let gathered = metrics.registry.gather();
        let cancelled = gathered
            .iter()
            .find(|m| m.name() == "orders_cancelled_total")
            .unwrap();
        assert_eq!(cancelled.metric[0].counter.value, Some(2.0));

        let restored = gathered
            .iter()
            .find(|m| m.name() == "inventory_units_restored_total")
            .unwrap();
        assert_eq!(restored.metric[0].counter.value, Some(4.0));
    }

    #[test]
    fn test_record_workflow_failure() {
        let metrics = Metrics::new().unwrap();
        metrics.record_workflow_failure("cancel_order", "invalid_state");
        metrics.record_workflow_failure("cancel_order", "not_found");

        let gathered = metrics.registry.gather();
        let failures = gathered
            .iter()
            .find(|m| m.name() == "workflow_failures_total")
            .unwrap();
        assert_eq!(failures.metric.len(), 2);
    }
}
