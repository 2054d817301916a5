use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

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
// Postgres Store
// ============================================================================
//
// All queries are plain runtime-bound statements; the schema below is applied
// idempotently on boot, so a fresh database becomes usable without separate
// migration tooling.
//
// ============================================================================

const SCHEMA: &str = include_str!("schema.sql");

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies the idempotent schema. Safe to run on every boot.
    pub async fn apply_schema(&self) -> Result<(), ShopError> {
        sqlx::raw_sql(SCHEMA).execute(&self.pool).await?;
        Ok(())
    }

    async fn with_lines(&self, orders: Vec<Order>) -> Result<Vec<OrderWithLines>, ShopError> {
        let mut result = Vec::with_capacity(orders.len());
        for order in orders {
            let lines = sqlx::query_as::<_, OrderLine>(
                "SELECT id, order_id, product_id, quantity, unit_price, product_image \
                 FROM order_lines WHERE order_id = $1 ORDER BY id",
            )
            .bind(order.id)
            .fetch_all(&self.pool)
            .await?;
            result.push(OrderWithLines { order, lines });
        }
        Ok(result)
    }
}

#[async_trait]
impl CustomerStore for PgStore {
    async fn find(&self, id: i64) -> Result<Option<Customer>, ShopError> {
        let customer = sqlx::query_as::<_, Customer>(
            "SELECT id, first_name, last_name FROM customers WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(customer)
    }
}

#[async_trait]
impl ProductStore for PgStore {
    async fn find(&self, id: i64) -> Result<Option<Product>, ShopError> {
        let product = sqlx::query_as::<_, Product>(
            "SELECT id, name, price, image_url, stock FROM products WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(product)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Product>, ShopError> {
        let product = sqlx::query_as::<_, Product>(
            "SELECT id, name, price, image_url, stock FROM products WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(product)
    }

    async fn decrement_stock(&self, id: i64, quantity: i32) -> Result<(), ShopError> {
        // One conditional update; two concurrent checkouts can never drive
        // stock below zero or lose a decrement.
        sqlx::query(
            "UPDATE products SET stock = GREATEST(stock - $2, 0) \
             WHERE id = $1 AND stock IS NOT NULL",
        )
        .bind(id)
        .bind(quantity)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl CartStore for PgStore {
    async fn items_for_customer(&self, customer_id: i64) -> Result<Vec<CartItem>, ShopError> {
        let items = sqlx::query_as::<_, CartItem>(
            "SELECT id, customer_id, product_name, quantity, unit_price, amount, product_image \
             FROM cart_items WHERE customer_id = $1 ORDER BY id",
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    async fn add_item(
        &self,
        customer_id: i64,
        item: NewCartItem,
    ) -> Result<CartItem, ShopError> {
        let stored = sqlx::query_as::<_, CartItem>(
            "INSERT INTO cart_items \
             (customer_id, product_name, quantity, unit_price, amount, product_image) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING id, customer_id, product_name, quantity, unit_price, amount, product_image",
        )
        .bind(customer_id)
        .bind(item.product_name.as_deref())
        .bind(item.quantity)
        .bind(item.unit_price)
        .bind(item.amount)
        .bind(item.product_image.as_deref())
        .fetch_one(&self.pool)
        .await?;
        Ok(stored)
    }

    async fn remove_item(&self, customer_id: i64, item_id: i64) -> Result<(), ShopError> {
        sqlx::query("DELETE FROM cart_items WHERE customer_id = $1 AND id = $2")
            .bind(customer_id)
            .bind(item_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn clear(&self, customer_id: i64) -> Result<(), ShopError> {
        sqlx::query("DELETE FROM cart_items WHERE customer_id = $1")
            .bind(customer_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl OrderStore for PgStore {
    async fn insert(&self, order: NewOrder) -> Result<OrderWithLines, ShopError> {
        let mut tx = self.pool.begin().await?;

        let stored = sqlx::query_as::<_, Order>(
            "INSERT INTO orders (customer_id, status, total_amount) VALUES ($1, $2, $3) \
             RETURNING id, customer_id, status, total_amount, created_at",
        )
        .bind(order.customer_id)
        .bind(&order.status)
        .bind(order.total_amount)
        .fetch_one(&mut *tx)
        .await?;

        let mut lines = Vec::with_capacity(order.lines.len());
        for line in &order.lines {
            let stored_line = sqlx::query_as::<_, OrderLine>(
                "INSERT INTO order_lines \
                 (order_id, product_id, quantity, unit_price, product_image) \
                 VALUES ($1, $2, $3, $4, $5) \
                 RETURNING id, order_id, product_id, quantity, unit_price, product_image",
            )
            .bind(stored.id)
            .bind(line.product_id)
            .bind(line.quantity)
            .bind(line.unit_price)
            .bind(line.product_image.as_deref())
            .fetch_one(&mut *tx)
            .await?;
            lines.push(stored_line);
        }

        tx.commit().await?;

        Ok(OrderWithLines { order: stored, lines })
    }

    async fn find(&self, id: i64) -> Result<Option<Order>, ShopError> {
        let order = sqlx::query_as::<_, Order>(
            "SELECT id, customer_id, status, total_amount, created_at FROM orders WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(order)
    }

    async fn for_customer(&self, customer_id: i64) -> Result<Vec<OrderWithLines>, ShopError> {
        let orders = sqlx::query_as::<_, Order>(
            "SELECT id, customer_id, status, total_amount, created_at \
             FROM orders WHERE customer_id = $1 ORDER BY id",
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;
        self.with_lines(orders).await
    }

    async fn all(&self) -> Result<Vec<OrderWithLines>, ShopError> {
        let orders = sqlx::query_as::<_, Order>(
            "SELECT id, customer_id, status, total_amount, created_at FROM orders ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        self.with_lines(orders).await
    }

    async fn update_status(&self, id: i64, status: &str) -> Result<(), ShopError> {
        sqlx::query("UPDATE orders SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl PaymentStore for PgStore {
    async fn insert(&self, payment: NewPayment) -> Result<Payment, ShopError> {
        let stored = sqlx::query_as::<_, Payment>(
            "INSERT INTO payments (order_id, method, status) VALUES ($1, $2, $3) \
             RETURNING id, order_id, method, status",
        )
        .bind(payment.order_id)
        .bind(&payment.method)
        .bind(&payment.status)
        .fetch_one(&self.pool)
        .await?;
        Ok(stored)
    }
}

/// Joined row for the wishlist listing; split into entry + product below.
#[derive(sqlx::FromRow)]
struct WishlistProductRow {
    id: i64,
    customer_id: i64,
    product_id: i64,
    added_date: DateTime<Utc>,
    p_id: i64,
    p_name: String,
    p_price: f64,
    p_image_url: Option<String>,
    p_stock: Option<i32>,
}

#[async_trait]
impl WishlistStore for PgStore {
    async fn add(&self, customer_id: i64, product_id: i64) -> Result<WishlistEntry, ShopError> {
        let inserted = sqlx::query_as::<_, WishlistEntry>(
            "INSERT INTO wishlist_items (customer_id, product_id) VALUES ($1, $2) \
             RETURNING id, customer_id, product_id, added_date",
        )
        .bind(customer_id)
        .bind(product_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                ShopError::conflict("Product already in wishlist")
            }
            other => ShopError::Database(other),
        })?;
        Ok(inserted)
    }

    async fn remove(&self, customer_id: i64, product_id: i64) -> Result<(), ShopError> {
        sqlx::query("DELETE FROM wishlist_items WHERE customer_id = $1 AND product_id = $2")
            .bind(customer_id)
            .bind(product_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn entries_with_products(
        &self,
        customer_id: i64,
    ) -> Result<Vec<(WishlistEntry, Product)>, ShopError> {
        let rows = sqlx::query_as::<_, WishlistProductRow>(
            "SELECT w.id, w.customer_id, w.product_id, w.added_date, \
                    p.id AS p_id, p.name AS p_name, p.price AS p_price, \
                    p.image_url AS p_image_url, p.stock AS p_stock \
             FROM wishlist_items w \
             JOIN products p ON p.id = w.product_id \
             WHERE w.customer_id = $1 ORDER BY w.id",
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                (
                    WishlistEntry {
                        id: row.id,
                        customer_id: row.customer_id,
                        product_id: row.product_id,
                        added_date: row.added_date,
                    },
                    Product {
                        id: row.p_id,
                        name: row.p_name,
                        price: row.p_price,
                        image_url: row.p_image_url,
                        stock: row.p_stock,
                    },
                )
            })
            .collect())
    }

    async fn contains(&self, customer_id: i64, product_id: i64) -> Result<bool, ShopError> {
        let present = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM wishlist_items \
             WHERE customer_id = $1 AND product_id = $2)",
        )
        .bind(customer_id)
        .bind(product_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(present)
    }

    async fn count(&self, customer_id: i64) -> Result<i64, ShopError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM wishlist_items WHERE customer_id = $1",
        )
        .bind(customer_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn clear(&self, customer_id: i64) -> Result<(), ShopError> {
        sqlx::query("DELETE FROM wishlist_items WHERE customer_id = $1")
            .bind(customer_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl NotificationStore for PgStore {
    async fn record(
        &self,
        customer_id: i64,
        order_id: Option<i64>,
        message: &str,
    ) -> Result<Notification, ShopError> {
        let stored = sqlx::query_as::<_, Notification>(
            "INSERT INTO notifications (customer_id, order_id, message) VALUES ($1, $2, $3) \
             RETURNING id, customer_id, order_id, message, is_read, created_at",
        )
        .bind(customer_id)
        .bind(order_id)
        .bind(message)
        .fetch_one(&self.pool)
        .await?;
        Ok(stored)
    }

    async fn for_customer(&self, customer_id: i64) -> Result<Vec<Notification>, ShopError> {
        let notifications = sqlx::query_as::<_, Notification>(
            "SELECT id, customer_id, order_id, message, is_read, created_at \
             FROM notifications WHERE customer_id = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(notifications)
    }

    async fn unread_count(&self, customer_id: i64) -> Result<i64, ShopError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM notifications WHERE customer_id = $1 AND is_read = FALSE",
        )
        .bind(customer_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn mark_all_read(&self, customer_id: i64) -> Result<(), ShopError> {
        sqlx::query("UPDATE notifications SET is_read = TRUE WHERE customer_id = $1")
            .bind(customer_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), ShopError> {
        sqlx::query("DELETE FROM notifications WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_for_customer(&self, customer_id: i64) -> Result<(), ShopError> {
        sqlx::query("DELETE FROM notifications WHERE customer_id = $1")
            .bind(customer_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
