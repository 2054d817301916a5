use tracing::debug;

use crate::error::ShopError;
use crate::models::{CartItem, NewCartItem};
use crate::store::Stores;

// ============================================================================
// Cart Workflow
// ============================================================================
//
// The cart is write-through storage for the frontend: items are persisted as
// posted, with no catalog validation. Checkout is where products get
// resolved.
//
// ============================================================================

#[derive(Clone)]
pub struct CartService {
    stores: Stores,
}

impl CartService {
    pub fn new(stores: Stores) -> Self {
        Self { stores }
    }

    pub async fn items(&self, customer_id: i64) -> Result<Vec<CartItem>, ShopError> {
        self.stores.cart.items_for_customer(customer_id).await
    }

    pub async fn add_item(
        &self,
        customer_id: i64,
        item: NewCartItem,
    ) -> Result<CartItem, ShopError> {
        let stored = self.stores.cart.add_item(customer_id, item).await?;
        debug!(customer_id = %customer_id, cart_item_id = %stored.id, "Cart item added");
        Ok(stored)
    }

    /// Removing an unknown item id is a no-op.
    pub async fn remove_item(&self, customer_id: i64, item_id: i64) -> Result<(), ShopError> {
        self.stores.cart.remove_item(customer_id, item_id).await
    }
}
