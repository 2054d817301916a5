use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::error::ShopError;
use crate::metrics::Metrics;
use crate::models::WishlistEntry;
use crate::store::Stores;

// ============================================================================
// Wishlist Workflow
// ============================================================================

/// One wishlist entry joined with its product, as the list endpoint reports
/// it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistItem {
    pub id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub product_price: f64,
    pub product_image: Option<String>,
    pub added_date: DateTime<Utc>,
}

#[derive(Clone)]
pub struct WishlistService {
    stores: Stores,
    metrics: Arc<Metrics>,
}

impl WishlistService {
    pub fn new(stores: Stores, metrics: Arc<Metrics>) -> Self {
        Self { stores, metrics }
    }

    /// Saves a product to the customer's wishlist and returns the new entry
    /// with the updated count. The store's uniqueness guarantee turns a
    /// repeat save into `ShopError::Conflict`.
    pub async fn add(
        &self,
        customer_id: i64,
        product_id: i64,
    ) -> Result<(WishlistEntry, i64), ShopError> {
        self.require_customer(customer_id).await?;
        self.require_product(product_id).await?;

        let entry = self.stores.wishlist.add(customer_id, product_id).await?;
        let count = self.stores.wishlist.count(customer_id).await?;

        self.metrics.record_wishlist_addition();
        debug!(customer_id = %customer_id, product_id = %product_id, "Product added to wishlist");
        Ok((entry, count))
    }

    /// Removes the pair if present and returns the updated count. Removing
    /// an absent pair is a no-op.
    pub async fn remove(&self, customer_id: i64, product_id: i64) -> Result<i64, ShopError> {
        self.stores.wishlist.remove(customer_id, product_id).await?;
        let count = self.stores.wishlist.count(customer_id).await?;

        self.metrics.record_wishlist_removal();
        debug!(customer_id = %customer_id, product_id = %product_id, "Product removed from wishlist");
        Ok(count)
    }

    pub async fn list(&self, customer_id: i64) -> Result<Vec<WishlistItem>, ShopError> {
        let entries = self.stores.wishlist.entries_with_products(customer_id).await?;
        Ok(entries
            .into_iter()
            .map(|(entry, product)| WishlistItem {
                id: entry.id,
                product_id: product.id,
                product_name: product.name,
                product_price: product.price,
                product_image: product.image_url,
                added_date: entry.added_date,
            })
            .collect())
    }

    pub async fn contains(&self, customer_id: i64, product_id: i64) -> Result<bool, ShopError> {
        self.require_customer(customer_id).await?;
        self.require_product(product_id).await?;
        self.stores.wishlist.contains(customer_id, product_id).await
    }

    pub async fn count(&self, customer_id: i64) -> Result<i64, ShopError> {
        self.stores.wishlist.count(customer_id).await
    }

    pub async fn clear(&self, customer_id: i64) -> Result<(), ShopError> {
        self.stores.wishlist.clear(customer_id).await
    }

    /// Moves a wishlist entry toward the cart. Today this only removes the
    /// entry.
    // TODO: insert the product into the cart here; needs a cart add keyed by
    // product id rather than the free-form item the cart API takes.
    pub async fn move_to_cart(&self, customer_id: i64, product_id: i64) -> Result<(), ShopError> {
        if !self.contains(customer_id, product_id).await? {
            return Err(ShopError::conflict("Product not in wishlist"));
        }

        self.stores.wishlist.remove(customer_id, product_id).await?;
        self.metrics.record_wishlist_removal();
        Ok(())
    }

    async fn require_customer(&self, customer_id: i64) -> Result<(), ShopError> {
        self.stores
            .customers
            .find(customer_id)
            .await?
            .ok_or_else(|| ShopError::not_found("Customer not found"))?;
        Ok(())
    }

    async fn require_product(&self, product_id: i64) -> Result<(), ShopError> {
        self.stores
            .products
            .find(product_id)
            .await?
            .ok_or_else(|| ShopError::not_found("Product not found"))?;
        Ok(())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
