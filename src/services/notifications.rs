use std::sync::Arc;

use tracing::debug;

use crate::error::ShopError;
use crate::metrics::Metrics;
use crate::models::Notification;
use crate::store::Stores;

// ============================================================================
// Notification Workflow
// ============================================================================
//
// The sink the order workflow writes to, plus the read side the customer's
// notification panel polls. Delivery beyond storage is out of scope.
//
// ============================================================================

#[derive(Clone)]
pub struct NotificationService {
    stores: Stores,
    metrics: Arc<Metrics>,
}

impl NotificationService {
    pub fn new(stores: Stores, metrics: Arc<Metrics>) -> Self {
        Self { stores, metrics }
    }

    /// Stores an unread notification for the customer.
    pub async fn record(
        &self,
        customer_id: i64,
        order_id: Option<i64>,
        message: &str,
    ) -> Result<Notification, ShopError> {
        let stored = self
            .stores
            .notifications
            .record(customer_id, order_id, message)
            .await?;

        self.metrics.record_notification();
        debug!(customer_id = %customer_id, notification_id = %stored.id, "Notification recorded");
        Ok(stored)
    }

    /// Newest first.
    pub async fn list(&self, customer_id: i64) -> Result<Vec<Notification>, ShopError> {
        self.stores.notifications.for_customer(customer_id).await
    }

    pub async fn unread_count(&self, customer_id: i64) -> Result<i64, ShopError> {
        self.stores.notifications.unread_count(customer_id).await
    }

    pub async fn mark_all_read(&self, customer_id: i64) -> Result<(), ShopError> {
        self.stores.notifications.mark_all_read(customer_id).await
    }

    pub async fn delete(&self, id: i64) -> Result<(), ShopError> {
        self.stores.notifications.delete(id).await
    }

    pub async fn delete_for_customer(&self, customer_id: i64) -> Result<(), ShopError> {
        self.stores.notifications.delete_for_customer(customer_id).await
    }
}
