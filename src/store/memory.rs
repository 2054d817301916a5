use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use crate::error::ShopError;
use crate::models::{
    CartItem, Customer, NewCartItem, NewOrder, NewPayment, Notification, Order, OrderLine,
    OrderWithLines, Payment, Product, WishlistEntry,
};

use super::{
    CartStore, CustomerStore, NotificationStore, OrderStore, PaymentStore, ProductStore,
    WishlistStore,
};

// ============================================================================
// In-Memory Store
// ============================================================================
//
// Backs local runs without a database, and all of the workflow tests. A
// single lock over the whole state keeps multi-row operations (checkout,
// the wishlist duplicate check) atomic without a transaction API.
//
// ============================================================================

#[derive(Default)]
struct State {
    customers: HashMap<i64, Customer>,
    products: HashMap<i64, Product>,
    cart_items: HashMap<i64, CartItem>,
    orders: HashMap<i64, Order>,
    order_lines: HashMap<i64, OrderLine>,
    payments: HashMap<i64, Payment>,
    wishlist: HashMap<i64, WishlistEntry>,
    notifications: HashMap<i64, Notification>,
}

pub struct MemoryStore {
    state: RwLock<State>,
    next_id: AtomicI64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(State::default()),
            next_id: AtomicI64::new(1),
        }
    }

    /// Ids are unique across all tables, like one shared sequence.
    fn next_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    /// Inserts a customer and hands back the stored row. Seeds local runs
    /// and tests; the HTTP surface has no customer creation.
    pub fn add_customer(&self, first_name: &str, last_name: &str) -> Customer {
        let customer = Customer {
            id: self.next_id(),
            first_name: Some(first_name.to_string()),
            last_name: Some(last_name.to_string()),
        };
        let mut state = self.state.write().expect("lock poisoned");
        state.customers.insert(customer.id, customer.clone());
        customer
    }

    /// Inserts a catalog product and hands back the stored row.
    pub fn add_product(
        &self,
        name: &str,
        price: f64,
        image_url: Option<&str>,
        stock: Option<i32>,
    ) -> Product {
        let product = Product {
            id: self.next_id(),
            name: name.to_string(),
            price,
            image_url: image_url.map(str::to_string),
            stock,
        };
        let mut state = self.state.write().expect("lock poisoned");
        state.products.insert(product.id, product.clone());
        product
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
impl MemoryStore {
    /// Inserts an order row directly, bypassing checkout. Tests use this for
    /// shapes checkout never produces, like orders without a customer.
    pub fn add_order(&self, customer_id: Option<i64>, status: &str, total_amount: f64) -> Order {
        let order = Order {
            id: self.next_id(),
            customer_id,
            status: status.to_string(),
            total_amount,
            created_at: Utc::now(),
        };
        let mut state = self.state.write().expect("lock poisoned");
        state.orders.insert(order.id, order.clone());
        order
    }

    pub fn add_order_line(
        &self,
        order_id: i64,
        product_id: Option<i64>,
        quantity: Option<i32>,
        unit_price: Option<f64>,
        product_image: Option<&str>,
    ) -> OrderLine {
        let line = OrderLine {
            id: self.next_id(),
            order_id,
            product_id,
            quantity,
            unit_price,
            product_image: product_image.map(str::to_string),
        };
        let mut state = self.state.write().expect("lock poisoned");
        state.order_lines.insert(line.id, line.clone());
        line
    }

    pub fn payments(&self) -> Vec<Payment> {
        let state = self.state.read().expect("lock poisoned");
        let mut payments: Vec<Payment> = state.payments.values().cloned().collect();
        payments.sort_by_key(|p| p.id);
        payments
    }

    pub fn notification_count(&self) -> usize {
        let state = self.state.read().expect("lock poisoned");
        state.notifications.len()
    }
}

fn lines_for(state: &State, order_id: i64) -> Vec<OrderLine> {
    let mut lines: Vec<OrderLine> = state
        .order_lines
        .values()
        .filter(|line| line.order_id == order_id)
        .cloned()
        .collect();
    lines.sort_by_key(|line| line.id);
    lines
}

#[async_trait]
impl CustomerStore for MemoryStore {
    async fn find(&self, id: i64) -> Result<Option<Customer>, ShopError> {
        let state = self.state.read().expect("lock poisoned");
        Ok(state.customers.get(&id).cloned())
    }
}

#[async_trait]
impl ProductStore for MemoryStore {
    async fn find(&self, id: i64) -> Result<Option<Product>, ShopError> {
        let state = self.state.read().expect("lock poisoned");
        Ok(state.products.get(&id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Product>, ShopError> {
        let state = self.state.read().expect("lock poisoned");
        Ok(state.products.values().find(|p| p.name == name).cloned())
    }

    async fn decrement_stock(&self, id: i64, quantity: i32) -> Result<(), ShopError> {
        let mut state = self.state.write().expect("lock poisoned");
        if let Some(stock) = state.products.get_mut(&id).and_then(|p| p.stock.as_mut()) {
            *stock = (*stock - quantity).max(0);
        }
        Ok(())
    }
}

#[async_trait]
impl CartStore for MemoryStore {
    async fn items_for_customer(&self, customer_id: i64) -> Result<Vec<CartItem>, ShopError> {
        let state = self.state.read().expect("lock poisoned");
        let mut items: Vec<CartItem> = state
            .cart_items
            .values()
            .filter(|item| item.customer_id == customer_id)
            .cloned()
            .collect();
        items.sort_by_key(|item| item.id);
        Ok(items)
    }

    async fn add_item(
        &self,
        customer_id: i64,
        item: NewCartItem,
    ) -> Result<CartItem, ShopError> {
        let stored = CartItem {
            id: self.next_id(),
            customer_id,
            product_name: item.product_name,
            quantity: item.quantity,
            unit_price: item.unit_price,
            amount: item.amount,
            product_image: item.product_image,
        };
        let mut state = self.state.write().expect("lock poisoned");
        state.cart_items.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn remove_item(&self, customer_id: i64, item_id: i64) -> Result<(), ShopError> {
        let mut state = self.state.write().expect("lock poisoned");
        let owned = state
            .cart_items
            .get(&item_id)
            .is_some_and(|item| item.customer_id == customer_id);
        if owned {
            state.cart_items.remove(&item_id);
        }
        Ok(())
    }

    async fn clear(&self, customer_id: i64) -> Result<(), ShopError> {
        let mut state = self.state.write().expect("lock poisoned");
        state.cart_items.retain(|_, item| item.customer_id != customer_id);
        Ok(())
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn insert(&self, order: NewOrder) -> Result<OrderWithLines, ShopError> {
        let mut state = self.state.write().expect("lock poisoned");

        let stored = Order {
            id: self.next_id(),
            customer_id: Some(order.customer_id),
            status: order.status,
            total_amount: order.total_amount,
            created_at: Utc::now(),
        };
        state.orders.insert(stored.id, stored.clone());

        let mut lines = Vec::with_capacity(order.lines.len());
        for line in order.lines {
            let stored_line = OrderLine {
                id: self.next_id(),
                order_id: stored.id,
                product_id: line.product_id,
                quantity: line.quantity,
                unit_price: line.unit_price,
                product_image: line.product_image,
            };
            state.order_lines.insert(stored_line.id, stored_line.clone());
            lines.push(stored_line);
        }

        Ok(OrderWithLines { order: stored, lines })
    }

    async fn find(&self, id: i64) -> Result<Option<Order>, ShopError> {
        let state = self.state.read().expect("lock poisoned");
        Ok(state.orders.get(&id).cloned())
    }

    async fn for_customer(&self, customer_id: i64) -> Result<Vec<OrderWithLines>, ShopError> {
        let state = self.state.read().expect("lock poisoned");
        let mut orders: Vec<Order> = state
            .orders
            .values()
            .filter(|order| order.customer_id == Some(customer_id))
            .cloned()
            .collect();
        orders.sort_by_key(|order| order.id);
        Ok(orders
            .into_iter()
            .map(|order| {
                let lines = lines_for(&state, order.id);
                OrderWithLines { order, lines }
            })
            .collect())
    }

    async fn all(&self) -> Result<Vec<OrderWithLines>, ShopError> {
        let state = self.state.read().expect("lock poisoned");
        let mut orders: Vec<Order> = state.orders.values().cloned().collect();
        orders.sort_by_key(|order| order.id);
        Ok(orders
            .into_iter()
            .map(|order| {
                let lines = lines_for(&state, order.id);
                OrderWithLines { order, lines }
            })
            .collect())
    }

    async fn update_status(&self, id: i64, status: &str) -> Result<(), ShopError> {
        let mut state = self.state.write().expect("lock poisoned");
        if let Some(order) = state.orders.get_mut(&id) {
            order.status = status.to_string();
        }
        Ok(())
    }
}

#[async_trait]
impl PaymentStore for MemoryStore {
    async fn insert(&self, payment: NewPayment) -> Result<Payment, ShopError> {
        let stored = Payment {
            id: self.next_id(),
            order_id: payment.order_id,
            method: payment.method,
            status: payment.status,
        };
        let mut state = self.state.write().expect("lock poisoned");
        state.payments.insert(stored.id, stored.clone());
        Ok(stored)
    }
}

#[async_trait]
impl WishlistStore for MemoryStore {
    async fn add(&self, customer_id: i64, product_id: i64) -> Result<WishlistEntry, ShopError> {
        // Check and insert under one write guard, mirroring the database's
        // unique constraint.
        let mut state = self.state.write().expect("lock poisoned");
        let duplicate = state
            .wishlist
            .values()
            .any(|entry| entry.customer_id == customer_id && entry.product_id == product_id);
        if duplicate {
            return Err(ShopError::conflict("Product already in wishlist"));
        }

        let entry = WishlistEntry {
            id: self.next_id(),
            customer_id,
            product_id,
            added_date: Utc::now(),
        };
        state.wishlist.insert(entry.id, entry.clone());
        Ok(entry)
    }

    async fn remove(&self, customer_id: i64, product_id: i64) -> Result<(), ShopError> {
        let mut state = self.state.write().expect("lock poisoned");
        state
            .wishlist
            .retain(|_, entry| !(entry.customer_id == customer_id && entry.product_id == product_id));
        Ok(())
    }

    async fn entries_with_products(
        &self,
        customer_id: i64,
    ) -> Result<Vec<(WishlistEntry, Product)>, ShopError> {
        let state = self.state.read().expect("lock poisoned");
        let mut entries: Vec<WishlistEntry> = state
            .wishlist
            .values()
            .filter(|entry| entry.customer_id == customer_id)
            .cloned()
            .collect();
        entries.sort_by_key(|entry| entry.id);
        Ok(entries
            .into_iter()
            .filter_map(|entry| {
                let product = state.products.get(&entry.product_id).cloned()?;
                Some((entry, product))
            })
            .collect())
    }

    async fn contains(&self, customer_id: i64, product_id: i64) -> Result<bool, ShopError> {
        let state = self.state.read().expect("lock poisoned");
        Ok(state
            .wishlist
            .values()
            .any(|entry| entry.customer_id == customer_id && entry.product_id == product_id))
    }

    async fn count(&self, customer_id: i64) -> Result<i64, ShopError> {
        let state = self.state.read().expect("lock poisoned");
        Ok(state
            .wishlist
            .values()
            .filter(|entry| entry.customer_id == customer_id)
            .count() as i64)
    }

    async fn clear(&self, customer_id: i64) -> Result<(), ShopError> {
        let mut state = self.state.write().expect("lock poisoned");
        state.wishlist.retain(|_, entry| entry.customer_id != customer_id);
        Ok(())
    }
}

#[async_trait]
impl NotificationStore for MemoryStore {
    async fn record(
        &self,
        customer_id: i64,
        order_id: Option<i64>,
        message: &str,
    ) -> Result<Notification, ShopError> {
        let stored = Notification {
            id: self.next_id(),
            customer_id,
            order_id,
            message: message.to_string(),
            read: false,
            created_at: Utc::now(),
        };
        let mut state = self.state.write().expect("lock poisoned");
        state.notifications.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn for_customer(&self, customer_id: i64) -> Result<Vec<Notification>, ShopError> {
        let state = self.state.read().expect("lock poisoned");
        let mut notifications: Vec<Notification> = state
            .notifications
            .values()
            .filter(|n| n.customer_id == customer_id)
            .cloned()
            .collect();
        notifications.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(notifications)
    }

    async fn unread_count(&self, customer_id: i64) -> Result<i64, ShopError> {
        let state = self.state.read().expect("lock poisoned");
        Ok(state
            .notifications
            .values()
            .filter(|n| n.customer_id == customer_id && !n.read)
            .count() as i64)
    }

    async fn mark_all_read(&self, customer_id: i64) -> Result<(), ShopError> {
        let mut state = self.state.write().expect("lock poisoned");
        state
            .notifications
            .values_mut()
            .filter(|n| n.customer_id == customer_id)
            .for_each(|n| n.read = true);
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), ShopError> {
        let mut state = self.state.write().expect("lock poisoned");
        state.notifications.remove(&id);
        Ok(())
    }

    async fn delete_for_customer(&self, customer_id: i64) -> Result<(), ShopError> {
        let mut state = self.state.write().expect("lock poisoned");
        state.notifications.retain(|_, n| n.customer_id != customer_id);
        Ok(())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
