use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::error::ShopError;
use crate::metrics::Metrics;
use crate::models::{NewOrder, NewOrderLine, NewPayment, OrderLine, OrderWithLines, Product};
use crate::services::NotificationService;
use crate::store::Stores;

// ============================================================================
// Order Workflow
// ============================================================================
//
// Turns a customer's cart into a persisted order with price/image snapshots,
// stock decrements, a payment record and a notification, and serves the
// customer-history and admin read sides.
//
// ============================================================================

/// One order as the customer history endpoint reports it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderHistoryItem {
    pub order_id: i64,
    pub total_amount: f64,
    pub status: String,
    pub products: Vec<ProductLine>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductLine {
    pub product_id: Option<i64>,
    pub product_name: String,
    pub quantity: Option<i32>,
    pub product_image: Option<String>,
    pub unit_price: f64,
}

impl ProductLine {
    /// Projects a stored line for display. The snapshot wins where it was
    /// taken; otherwise the current catalog fills in, then "Unknown"/0.0.
    fn project(line: &OrderLine, product: Option<&Product>) -> Self {
        let unit_price = line
            .unit_price
            .or_else(|| product.map(|p| p.price))
            .unwrap_or(0.0);

        let product_image = match line.product_image.as_deref() {
            Some(image) if !image.is_empty() => Some(image.to_string()),
            _ => product.and_then(|p| p.image_url.clone()),
        };

        Self {
            product_id: product.map(|p| p.id),
            product_name: product
                .map(|p| p.name.clone())
                .unwrap_or_else(|| "Unknown".to_string()),
            quantity: line.quantity,
            product_image,
            unit_price,
        }
    }
}

/// One order as the admin listing reports it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminOrderItem {
    pub id: i64,
    pub customer_name: String,
    pub total_amount: f64,
    pub status: String,
    pub created_at: String,
    pub items_count: i32,
}

#[derive(Clone)]
pub struct OrderService {
    stores: Stores,
    notifications: NotificationService,
    metrics: Arc<Metrics>,
}

impl OrderService {
    pub fn new(stores: Stores, notifications: NotificationService, metrics: Arc<Metrics>) -> Self {
        Self { stores, notifications, metrics }
    }

    /// Order history for one customer. Empty list when there are no orders.
    pub async fn history(&self, customer_id: i64) -> Result<Vec<OrderHistoryItem>, ShopError> {
        let orders = self.stores.orders.for_customer(customer_id).await?;
        let mut result = Vec::with_capacity(orders.len());
        for order in orders {
            result.push(self.project_history_item(order).await?);
        }
        Ok(result)
    }

    /// Creates an order from the customer's cart.
    ///
    /// Side effects run in this order: stock decrements per line, order +
    /// lines (one transaction), payment record, cart clear, notification.
    /// There is no compensating rollback across these steps.
    pub async fn checkout(
        &self,
        customer_id: i64,
        payment_method: Option<String>,
    ) -> Result<OrderHistoryItem, ShopError> {
        let cart_items = self.stores.cart.items_for_customer(customer_id).await?;
        if cart_items.is_empty() {
            return Err(ShopError::validation("Cart is empty; cannot create order."));
        }

        self.stores
            .customers
            .find(customer_id)
            .await?
            .ok_or_else(|| ShopError::not_found("Customer not found."))?;

        let mut lines = Vec::with_capacity(cart_items.len());
        let mut total = 0.0;

        for item in &cart_items {
            let quantity = item.quantity.unwrap_or(1);

            // The cart references products loosely, by name.
            let product = match item.product_name.as_deref() {
                Some(name) => self.stores.products.find_by_name(name).await?,
                None => None,
            };

            let unit_price = item
                .unit_price
                .or_else(|| product.as_ref().map(|p| p.price))
                .unwrap_or(0.0);
            let product_image = item
                .product_image
                .clone()
                .or_else(|| product.as_ref().and_then(|p| p.image_url.clone()));

            if let Some(product) = product.as_ref().filter(|p| p.stock.is_some()) {
                self.stores.products.decrement_stock(product.id, quantity).await?;
            }

            let line_amount = match item.amount {
                Some(amount) if amount > 0.0 => amount,
                _ => unit_price * f64::from(quantity),
            };
            total += line_amount;

            lines.push(NewOrderLine {
                product_id: product.as_ref().map(|p| p.id),
                quantity: Some(quantity),
                unit_price: Some(unit_price),
                product_image,
            });
        }

        let stored = self
            .stores
            .orders
            .insert(NewOrder {
                customer_id,
                status: "Pending".to_string(),
                total_amount: total,
                lines,
            })
            .await?;
        let order_id = stored.order.id;

        self.stores
            .payments
            .insert(NewPayment {
                order_id,
                method: payment_method.unwrap_or_else(|| "Unknown".to_string()),
                status: "Completed".to_string(),
            })
            .await?;

        self.stores.cart.clear(customer_id).await?;

        self.notifications
            .record(
                customer_id,
                Some(order_id),
                &format!("Your order #{order_id} has been placed."),
            )
            .await?;

        self.metrics.record_order_created(total);
        info!(order_id = %order_id, customer_id = %customer_id, total = %total, "✅ Order created from cart");

        self.project_history_item(stored).await
    }

    /// Every order, for the admin view.
    pub async fn admin_list(&self) -> Result<Vec<AdminOrderItem>, ShopError> {
        let orders = self.stores.orders.all().await?;
        let mut result = Vec::with_capacity(orders.len());

        for OrderWithLines { order, lines } in orders {
            let customer_name = match order.customer_id {
                Some(id) => self
                    .stores
                    .customers
                    .find(id)
                    .await?
                    .map(|c| c.display_name())
                    .unwrap_or_default(),
                None => String::new(),
            };

            let items_count: i32 = lines.iter().filter_map(|line| line.quantity).sum();

            result.push(AdminOrderItem {
                id: order.id,
                customer_name,
                total_amount: order.total_amount,
                status: order.status,
                created_at: order.created_at.format("%m/%d/%y %H:%M").to_string(),
                items_count,
            });
        }

        Ok(result)
    }

    /// Overwrites the order's status. Any string is accepted; the customer,
    /// when the order has one, is notified of the change.
    pub async fn update_status(&self, order_id: i64, status: &str) -> Result<(), ShopError> {
        let order = self
            .stores
            .orders
            .find(order_id)
            .await?
            .ok_or_else(|| ShopError::not_found("Order not found."))?;

        self.stores.orders.update_status(order_id, status).await?;

        if let Some(customer_id) = order.customer_id {
            self.notifications
                .record(
                    customer_id,
                    Some(order_id),
                    &format!("Your order #{order_id} is now {status}"),
                )
                .await?;
        }

        self.metrics.record_status_update(status);
        info!(order_id = %order_id, status = %status, "Order status updated");
        Ok(())
    }

    async fn project_history_item(
        &self,
        order: OrderWithLines,
    ) -> Result<OrderHistoryItem, ShopError> {
        let mut products = Vec::with_capacity(order.lines.len());
        for line in &order.lines {
            let product = match line.product_id {
                Some(id) => self.stores.products.find(id).await?,
                None => None,
            };
            products.push(ProductLine::project(line, product.as_ref()));
        }

        Ok(OrderHistoryItem {
            order_id: order.order.id,
            total_amount: order.order.total_amount,
            status: order.order.status,
            products,
        })
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewCartItem;
    use crate::store::{CartStore, MemoryStore, NotificationStore, ProductStore};

    fn harness() -> (OrderService, Arc<MemoryStore>) {
        let backend = Arc::new(MemoryStore::new());
        let stores = Stores::from_backend(backend.clone());
        let metrics = Arc::new(Metrics::new().unwrap());
        let notifications = NotificationService::new(stores.clone(), metrics.clone());
        (OrderService::new(stores, notifications, metrics), backend)
    }

    fn cart_item(
        name: Option<&str>,
        quantity: Option<i32>,
        unit_price: Option<f64>,
        amount: Option<f64>,
    ) -> NewCartItem {
        NewCartItem {
            product_name: name.map(str::to_string),
            quantity,
            unit_price,
            amount,
            product_image: None,
        }
    }

    #[tokio::test]
    async fn history_is_empty_without_orders() {
        let (service, store) = harness();
        let customer = store.add_customer("Maria", "Santos");

        assert!(service.history(customer.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn checkout_with_empty_cart_creates_nothing() {
        let (service, store) = harness();
        let customer = store.add_customer("Maria", "Santos");

        let err = service.checkout(customer.id, None).await.unwrap_err();
        assert!(matches!(err, ShopError::Validation(_)));

        assert!(service.history(customer.id).await.unwrap().is_empty());
        assert!(store.payments().is_empty());
        assert!(NotificationStore::for_customer(&*store, customer.id)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn checkout_requires_a_known_customer() {
        let (service, store) = harness();
        store
            .add_item(99, cart_item(Some("Barong"), Some(1), Some(500.0), None))
            .await
            .unwrap();

        let err = service.checkout(99, None).await.unwrap_err();
        assert!(matches!(err, ShopError::NotFound(_)));
        assert_eq!(err.to_string(), "Customer not found.");
    }

    #[tokio::test]
    async fn checkout_matches_the_barong_example() {
        let (service, store) = harness();
        let customer = store.add_customer("Maria", "Santos");
        store.add_product("Barong", 500.0, Some("barong.png"), Some(10));
        store
            .add_item(customer.id, cart_item(Some("Barong"), Some(2), Some(500.0), None))
            .await
            .unwrap();

        let receipt = service.checkout(customer.id, None).await.unwrap();

        assert_eq!(receipt.total_amount, 1000.0);
        assert_eq!(receipt.status, "Pending");
        assert_eq!(receipt.products.len(), 1);
        assert_eq!(receipt.products[0].product_name, "Barong");
        assert_eq!(receipt.products[0].quantity, Some(2));
        assert_eq!(receipt.products[0].unit_price, 500.0);

        let payments = store.payments();
        assert_eq!(payments.len(), 1);
        assert_eq!(payments[0].order_id, receipt.order_id);
        assert_eq!(payments[0].method, "Unknown");
        assert_eq!(payments[0].status, "Completed");
    }

    #[tokio::test]
    async fn checkout_decrements_stock_floored_at_zero() {
        let (service, store) = harness();
        let customer = store.add_customer("Maria", "Santos");
        let scarce = store.add_product("Banig", 150.0, None, Some(3));
        store
            .add_item(customer.id, cart_item(Some("Banig"), Some(5), None, None))
            .await
            .unwrap();

        service.checkout(customer.id, None).await.unwrap();

        let product = ProductStore::find(&*store, scarce.id).await.unwrap().unwrap();
        assert_eq!(product.stock, Some(0));
    }

    #[tokio::test]
    async fn checkout_sums_line_amounts_with_overrides() {
        let (service, store) = harness();
        let customer = store.add_customer("Maria", "Santos");
        store.add_product("Barong", 500.0, None, None);

        // Line 1: positive override wins. Line 2: zero override is ignored,
        // price falls back to the catalog. Line 3: unknown product, price 0.
        store
            .add_item(customer.id, cart_item(Some("Barong"), Some(2), Some(500.0), Some(750.0)))
            .await
            .unwrap();
        store
            .add_item(customer.id, cart_item(Some("Barong"), Some(3), None, Some(0.0)))
            .await
            .unwrap();
        store
            .add_item(customer.id, cart_item(Some("Tinalak"), None, None, None))
            .await
            .unwrap();

        let receipt = service.checkout(customer.id, None).await.unwrap();

        assert_eq!(receipt.total_amount, 750.0 + 1500.0 + 0.0);
        assert_eq!(receipt.products[1].unit_price, 500.0);
        assert_eq!(receipt.products[2].product_name, "Unknown");
        assert_eq!(receipt.products[2].quantity, Some(1));
    }

    #[tokio::test]
    async fn checkout_clears_cart_and_notifies_once() {
        let (service, store) = harness();
        let customer = store.add_customer("Maria", "Santos");
        store.add_product("Barong", 500.0, None, Some(10));
        store
            .add_item(customer.id, cart_item(Some("Barong"), Some(1), None, None))
            .await
            .unwrap();

        let receipt = service.checkout(customer.id, Some("GCash".to_string())).await.unwrap();

        assert!(store.items_for_customer(customer.id).await.unwrap().is_empty());

        let notifications = NotificationStore::for_customer(&*store, customer.id).await.unwrap();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].order_id, Some(receipt.order_id));
        assert_eq!(
            notifications[0].message,
            format!("Your order #{} has been placed.", receipt.order_id)
        );
        assert_eq!(store.payments()[0].method, "GCash");
    }

    #[tokio::test]
    async fn status_update_notifies_the_orders_customer() {
        let (service, store) = harness();
        let customer = store.add_customer("Maria", "Santos");
        store.add_product("Barong", 500.0, None, None);
        store
            .add_item(customer.id, cart_item(Some("Barong"), Some(1), None, None))
            .await
            .unwrap();
        let receipt = service.checkout(customer.id, None).await.unwrap();

        service.update_status(receipt.order_id, "Shipped").await.unwrap();

        let history = service.history(customer.id).await.unwrap();
        assert_eq!(history[0].status, "Shipped");

        let notifications = NotificationStore::for_customer(&*store, customer.id).await.unwrap();
        assert_eq!(notifications.len(), 2);
        assert_eq!(
            notifications[0].message,
            format!("Your order #{} is now Shipped", receipt.order_id)
        );
    }

    #[tokio::test]
    async fn status_update_without_customer_stays_silent() {
        let (service, store) = harness();
        let order = store.add_order(None, "Pending", 100.0);

        service.update_status(order.id, "Shipped").await.unwrap();

        // No customer on the order, so nobody to notify.
        assert!(store.notification_count() == 0);
    }

    #[tokio::test]
    async fn status_update_rejects_unknown_orders() {
        let (service, _) = harness();

        let err = service.update_status(12345, "Shipped").await.unwrap_err();
        assert!(matches!(err, ShopError::NotFound(_)));
        assert_eq!(err.to_string(), "Order not found.");
    }

    #[tokio::test]
    async fn admin_listing_derives_names_and_item_counts() {
        let (service, store) = harness();
        let customer = store.add_customer("Maria", "Santos");
        store.add_product("Barong", 500.0, None, None);
        store
            .add_item(customer.id, cart_item(Some("Barong"), Some(2), None, None))
            .await
            .unwrap();
        store
            .add_item(customer.id, cart_item(Some("Barong"), Some(3), None, None))
            .await
            .unwrap();
        service.checkout(customer.id, None).await.unwrap();
        store.add_order(None, "Pending", 50.0);

        let listing = service.admin_list().await.unwrap();
        assert_eq!(listing.len(), 2);
        assert_eq!(listing[0].customer_name, "Maria Santos");
        assert_eq!(listing[0].items_count, 5);
        assert_eq!(listing[1].customer_name, "");
        assert_eq!(listing[1].items_count, 0);
    }

    #[tokio::test]
    async fn admin_count_ignores_lines_without_quantity() {
        let (service, store) = harness();
        let customer = store.add_customer("Maria", "Santos");
        let order = store.add_order(Some(customer.id), "Pending", 500.0);
        store.add_order_line(order.id, None, Some(2), Some(250.0), None);
        store.add_order_line(order.id, None, None, None, None);

        let listing = service.admin_list().await.unwrap();
        assert_eq!(listing[0].items_count, 2);
    }

    #[tokio::test]
    async fn history_falls_back_from_snapshot_to_catalog() {
        let (service, store) = harness();
        let customer = store.add_customer("Maria", "Santos");
        let product = store.add_product("Barong", 650.0, Some("barong.png"), None);

        // A line whose snapshots were never taken: empty image, no price.
        store.add_order_line(
            store.add_order(Some(customer.id), "Pending", 650.0).id,
            Some(product.id),
            Some(1),
            None,
            Some(""),
        );

        let history = service.history(customer.id).await.unwrap();
        let line = &history[0].products[0];
        assert_eq!(line.unit_price, 650.0);
        assert_eq!(line.product_image.as_deref(), Some("barong.png"));
        assert_eq!(line.product_name, "Barong");
    }
}
