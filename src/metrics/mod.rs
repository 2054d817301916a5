use prometheus::{Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry};

// ============================================================================
// Metrics Module - Prometheus metrics for observability
// ============================================================================
//
// Provides metrics for:
// - Checkout throughput and order value distribution
// - Order status updates
// - Wishlist activity
// - Notifications recorded
//
// All metrics are registered with Prometheus and can be scraped via /metrics
// ============================================================================

/// Central metrics registry for the entire application
pub struct Metrics {
    registry: Registry,

    // Order Workflow Metrics
    pub orders_created: IntCounter,
    pub order_total_amount: Histogram,
    pub order_status_updates: IntCounterVec,

    // Wishlist Workflow Metrics
    pub wishlist_additions: IntCounter,
    pub wishlist_removals: IntCounter,

    // Notification Metrics
    pub notifications_recorded: IntCounter,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        // Order Workflow Metrics
        let orders_created = IntCounter::new(
            "orders_created_total",
            "Total orders created from carts",
        )?;
        registry.register(Box::new(orders_created.clone()))?;

        let order_total_amount = Histogram::with_opts(
            HistogramOpts::new("order_total_amount", "Distribution of order totals")
                .buckets(vec![100.0, 250.0, 500.0, 1000.0, 2500.0, 5000.0, 10000.0]),
        )?;
        registry.register(Box::new(order_total_amount.clone()))?;

        let order_status_updates = IntCounterVec::new(
            Opts::new("order_status_updates_total", "Total order status updates"),
            &["status"],
        )?;
        registry.register(Box::new(order_status_updates.clone()))?;

        // Wishlist Workflow Metrics
        let wishlist_additions = IntCounter::new(
            "wishlist_additions_total",
            "Total products added to wishlists",
        )?;
        registry.register(Box::new(wishlist_additions.clone()))?;

        let wishlist_removals = IntCounter::new(
            "wishlist_removals_total",
            "Total products removed from wishlists",
        )?;
        registry.register(Box::new(wishlist_removals.clone()))?;

        // Notification Metrics
        let notifications_recorded = IntCounter::new(
            "notifications_recorded_total",
            "Total notifications recorded",
        )?;
        registry.register(Box::new(notifications_recorded.clone()))?;

        Ok(Self {
            registry,
            orders_created,
            order_total_amount,
            order_status_updates,
            wishlist_additions,
            wishlist_removals,
            notifications_recorded,
        })
    }

    /// Get the Prometheus registry for exposing metrics via HTTP
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Helper to record a successful checkout
    pub fn record_order_created(&self, total_amount: f64) {
        self.orders_created.inc();
        self.order_total_amount.observe(total_amount);
    }

    /// Helper to record an order status update
    pub fn record_status_update(&self, status: &str) {
        self.order_status_updates.with_label_values(&[status]).inc();
    }

    /// Helper to record wishlist activity
    pub fn record_wishlist_addition(&self) {
        self.wishlist_additions.inc();
    }

    pub fn record_wishlist_removal(&self) {
        self.wishlist_removals.inc();
    }

    /// Helper to record a stored notification
    pub fn record_notification(&self) {
        self.notifications_recorded.inc();
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
    fn test_record_order_created() {
        let metrics = Metrics::new().unwrap();
        metrics.record_order_created(1000.0);

        let gathered = metrics.registry.gather();
        let created = gathered.iter().find(|m| m.name() == "orders_created_total").unwrap();
        assert_eq!(created.metric[0].counter.value, Some(1.0));

        let totals = gathered.iter().find(|m| m.name() == "order_total_amount").unwrap();
        assert_eq!(totals.metric[0].histogram.sample_count, Some(1));
    }

    #[test]
    fn test_record_status_update() {
        let metrics = Metrics::new().unwrap();
        metrics.record_status_update("Shipped");
        metrics.record_status_update("Shipped");
        metrics.record_status_update("Delivered");

        let gathered = metrics.registry.gather();
        let updates = gathered.iter().find(|m| m.name() == "order_status_updates_total").unwrap();
        assert_eq!(updates.metric.len(), 2); // Two different status labels
    }

    #[test]
    fn test_record_wishlist_activity() {
        let metrics = Metrics::new().unwrap();
        metrics.record_wishlist_addition();
        metrics.record_wishlist_addition();
        metrics.record_wishlist_removal();

        let gathered = metrics.registry.gather();
        let additions = gathered.iter().find(|m| m.name() == "wishlist_additions_total").unwrap();
        assert_eq!(additions.metric[0].counter.value, Some(2.0));
        let removals = gathered.iter().find(|m| m.name() == "wishlist_removals_total").unwrap();
        assert_eq!(removals.metric[0].counter.value, Some(1.0));
    }
}
