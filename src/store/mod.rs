mod memory;
mod postgres;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ShopError;
use crate::models::{
    CartItem, Customer, NewCartItem, NewOrder, NewPayment, Notification, Order, OrderWithLines,
    Payment, Product, WishlistEntry,
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

// ============================================================================
// Store Traits - the persistence seam
// ============================================================================
//
// One trait per backing store. The workflows only ever talk to these; the
// Postgres and in-memory backends below implement all of them on a single
// struct each.
//
// ============================================================================

#[async_trait]
pub trait CustomerStore: Send + Sync {
    async fn find(&self, id: i64) -> Result<Option<Customer>, ShopError>;
}

#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn find(&self, id: i64) -> Result<Option<Product>, ShopError>;

    async fn find_by_name(&self, name: &str) -> Result<Option<Product>, ShopError>;

    /// Atomically lowers tracked stock by `quantity`, never below zero.
    /// Products without a tracked stock count are left untouched.
    async fn decrement_stock(&self, id: i64, quantity: i32) -> Result<(), ShopError>;
}

#[async_trait]
pub trait CartStore: Send + Sync {
    async fn items_for_customer(&self, customer_id: i64) -> Result<Vec<CartItem>, ShopError>;

    async fn add_item(
        &self,
        customer_id: i64,
        item: NewCartItem,
    ) -> Result<CartItem, ShopError>;

    /// Deletes one cart row by id; a miss is not an error.
    async fn remove_item(&self, customer_id: i64, item_id: i64) -> Result<(), ShopError>;

    async fn clear(&self, customer_id: i64) -> Result<(), ShopError>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persists the order together with its lines in one transaction and
    /// hands back the stored rows with their generated ids.
    async fn insert(&self, order: NewOrder) -> Result<OrderWithLines, ShopError>;

    async fn find(&self, id: i64) -> Result<Option<Order>, ShopError>;

    async fn for_customer(&self, customer_id: i64) -> Result<Vec<OrderWithLines>, ShopError>;

    async fn all(&self) -> Result<Vec<OrderWithLines>, ShopError>;

    async fn update_status(&self, id: i64, status: &str) -> Result<(), ShopError>;
}

#[async_trait]
pub trait PaymentStore: Send + Sync {
    async fn insert(&self, payment: NewPayment) -> Result<Payment, ShopError>;
}

#[async_trait]
pub trait WishlistStore: Send + Sync {
    /// Inserts the pair. The storage layer's uniqueness guarantee is what
    /// refuses duplicates; a second insert of the same pair surfaces as
    /// `ShopError::Conflict`.
    async fn add(&self, customer_id: i64, product_id: i64) -> Result<WishlistEntry, ShopError>;

    /// Deletes the pair if present; a miss is not an error.
    async fn remove(&self, customer_id: i64, product_id: i64) -> Result<(), ShopError>;

    async fn entries_with_products(
        &self,
        customer_id: i64,
    ) -> Result<Vec<(WishlistEntry, Product)>, ShopError>;

    async fn contains(&self, customer_id: i64, product_id: i64) -> Result<bool, ShopError>;

    async fn count(&self, customer_id: i64) -> Result<i64, ShopError>;

    async fn clear(&self, customer_id: i64) -> Result<(), ShopError>;
}

/// The notification sink of the order and wishlist workflows, plus the read
/// side the notifications API serves.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn record(
        &self,
        customer_id: i64,
        order_id: Option<i64>,
        message: &str,
    ) -> Result<Notification, ShopError>;

    /// Newest first.
    async fn for_customer(&self, customer_id: i64) -> Result<Vec<Notification>, ShopError>;

    async fn unread_count(&self, customer_id: i64) -> Result<i64, ShopError>;

    async fn mark_all_read(&self, customer_id: i64) -> Result<(), ShopError>;

    async fn delete(&self, id: i64) -> Result<(), ShopError>;

    async fn delete_for_customer(&self, customer_id: i64) -> Result<(), ShopError>;
}

// ============================================================================
// Stores - one handle the services carry around
// ============================================================================

#[derive(Clone)]
pub struct Stores {
    pub customers: Arc<dyn CustomerStore>,
    pub products: Arc<dyn ProductStore>,
    pub cart: Arc<dyn CartStore>,
    pub orders: Arc<dyn OrderStore>,
    pub payments: Arc<dyn PaymentStore>,
    pub wishlist: Arc<dyn WishlistStore>,
    pub notifications: Arc<dyn NotificationStore>,
}

impl Stores {
    /// Connects the Postgres backend, applying the idempotent schema first.
    pub async fn postgres(pool: sqlx::PgPool) -> Result<Self, ShopError> {
        let store = PgStore::new(pool);
        store.apply_schema().await?;
        Ok(Self::from_backend(Arc::new(store)))
    }

    pub fn from_backend<S>(backend: Arc<S>) -> Self
    where
        S: CustomerStore
            + ProductStore
            + CartStore
            + OrderStore
            + PaymentStore
            + WishlistStore
            + NotificationStore
            + 'static,
    {
        Self {
            customers: backend.clone(),
            products: backend.clone(),
            cart: backend.clone(),
            orders: backend.clone(),
            payments: backend.clone(),
            wishlist: backend.clone(),
            notifications: backend,
        }
    }
}
