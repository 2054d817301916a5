use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ============================================================================
// Persisted Entities
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: i64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl Customer {
    /// First and last name joined and trimmed; empty when both are absent.
    pub fn display_name(&self) -> String {
        format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or(""),
            self.last_name.as_deref().unwrap_or("")
        )
        .trim()
        .to_string()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub price: f64,
    pub image_url: Option<String>,
    /// `None` means inventory is not tracked for this product.
    pub stock: Option<i32>,
}

/// One row of a customer's cart. Coupled to the catalog only by product
/// name; price/image/amount act as overrides at checkout when present.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: i64,
    pub customer_id: i64,
    pub product_name: Option<String>,
    pub quantity: Option<i32>,
    pub unit_price: Option<f64>,
    pub amount: Option<f64>,
    pub product_image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    pub customer_id: Option<i64>,
    pub status: String,
    pub total_amount: f64,
    pub created_at: DateTime<Utc>,
}

/// One line of a persisted order. `unit_price` and `product_image` are
/// snapshots taken at checkout so later catalog edits do not rewrite history.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub id: i64,
    pub order_id: i64,
    pub product_id: Option<i64>,
    pub quantity: Option<i32>,
    pub unit_price: Option<f64>,
    pub product_image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: i64,
    pub order_id: i64,
    pub method: String,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct WishlistEntry {
    pub id: i64,
    pub customer_id: i64,
    pub product_id: i64,
    pub added_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: i64,
    pub customer_id: i64,
    pub order_id: Option<i64>,
    pub message: String,
    #[sqlx(rename = "is_read")]
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Insert Payloads
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCartItem {
    pub product_name: Option<String>,
    pub quantity: Option<i32>,
    pub unit_price: Option<f64>,
    pub amount: Option<f64>,
    pub product_image: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewOrder {
    pub customer_id: i64,
    pub status: String,
    pub total_amount: f64,
    pub lines: Vec<NewOrderLine>,
}

#[derive(Debug, Clone)]
pub struct NewOrderLine {
    pub product_id: Option<i64>,
    pub quantity: Option<i32>,
    pub unit_price: Option<f64>,
    pub product_image: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewPayment {
    pub order_id: i64,
    pub method: String,
    pub status: String,
}

/// An order together with its lines, as the order store hands it back.
#[derive(Debug, Clone)]
pub struct OrderWithLines {
    pub order: Order,
    pub lines: Vec<OrderLine>,
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn customer(first: Option<&str>, last: Option<&str>) -> Customer {
        Customer {
            id: 1,
            first_name: first.map(str::to_string),
            last_name: last.map(str::to_string),
        }
    }

    #[test]
    fn display_name_joins_and_trims() {
        assert_eq!(customer(Some("Maria"), Some("Santos")).display_name(), "Maria Santos");
        assert_eq!(customer(Some("Maria"), None).display_name(), "Maria");
        assert_eq!(customer(None, Some("Santos")).display_name(), "Santos");
        assert_eq!(customer(None, None).display_name(), "");
    }

    #[test]
    fn cart_item_uses_camel_case_on_the_wire() {
        let item = CartItem {
            id: 7,
            customer_id: 1,
            product_name: Some("Barong".into()),
            quantity: Some(2),
            unit_price: Some(500.0),
            amount: None,
            product_image: None,
        };

        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["productName"], "Barong");
        assert_eq!(json["unitPrice"], 500.0);
        assert!(json["amount"].is_null());
    }

    #[test]
    fn new_cart_item_ignores_unknown_fields() {
        // The frontend posts extra fields (size, category) the backend
        // does not persist.
        let body = serde_json::json!({
            "productName": "Barong",
            "quantity": 2,
            "unitPrice": 500.0,
            "amount": 1000.0,
            "size": "M",
            "category": {"id": 3}
        });

        let item: NewCartItem = serde_json::from_value(body).unwrap();
        assert_eq!(item.product_name.as_deref(), Some("Barong"));
        assert_eq!(item.quantity, Some(2));
        assert_eq!(item.amount, Some(1000.0));
    }
}
