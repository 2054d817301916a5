// Private module declarations
mod cart;
mod notifications;
mod orders;
mod wishlist;

use std::future::{ready, Ready};
use std::sync::Arc;

use actix_web::dev::Payload;
use actix_web::{web, FromRequest, HttpRequest, HttpResponse, Responder};
use prometheus::{Encoder, TextEncoder};

use crate::error::ShopError;
use crate::metrics::Metrics;

// ============================================================================
// HTTP Surface
// ============================================================================
//
// One actix-web App serves the storefront API plus the /health and /metrics
// probes. Handlers stay thin: extract, call the service, shape the JSON the
// frontend expects. Error statuses come from ShopError's ResponseError impl
// uniformly across all routes.
//
// ============================================================================

/// Customer id carried in the `userId` header on wishlist requests.
pub struct UserId(pub i64);

impl FromRequest for UserId {
    type Error = ShopError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let parsed = req
            .headers()
            .get("userId")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<i64>().ok())
            .map(UserId)
            .ok_or_else(|| ShopError::validation("Missing or invalid userId header"));
        ready(parsed)
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/orders")
            .route("/customer/{customer_id}", web::get().to(orders::history))
            .route("/customer/{customer_id}/from-cart", web::post().to(orders::checkout))
            .route("/admin", web::get().to(orders::admin))
            .route("/{order_id}/status", web::put().to(orders::update_status)),
    )
    .service(
        web::scope("/api/wishlist")
            .route("/add", web::post().to(wishlist::add))
            .route("/remove/{product_id}", web::delete().to(wishlist::remove))
            .route("/check/{product_id}", web::get().to(wishlist::check))
            .route("/count", web::get().to(wishlist::count))
            .route("/clear", web::delete().to(wishlist::clear))
            .route("", web::get().to(wishlist::list)),
    )
    .service(
        web::scope("/api/cart")
            .route("/customer/{customer_id}/items", web::get().to(cart::items))
            .route("/customer/{customer_id}/items", web::post().to(cart::add_item))
            .route(
                "/customer/{customer_id}/items/{item_id}",
                web::delete().to(cart::remove_item),
            ),
    )
    .service(
        web::scope("/api/notifications")
            .route("/customer/{customer_id}", web::get().to(notifications::list))
            .route(
                "/customer/{customer_id}/unread-count",
                web::get().to(notifications::unread_count),
            )
            .route(
                "/customer/{customer_id}/mark-all-read",
                web::post().to(notifications::mark_all_read),
            )
            .route("/customer/{customer_id}", web::delete().to(notifications::delete_all))
            .route("/{notification_id}", web::delete().to(notifications::delete_one)),
    )
    .route("/metrics", web::get().to(metrics_handler))
    .route("/health", web::get().to(health_handler));
}

async fn metrics_handler(metrics: web::Data<Arc<Metrics>>) -> impl Responder {
    let encoder = TextEncoder::new();
    let metric_families = metrics.registry().gather();

    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer).unwrap();

    HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(buffer)
}

async fn health_handler() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "storefront"
    }))
}

// ============================================================================
// Handler Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use serde_json::Value;

    use super::*;
    use crate::services::{CartService, NotificationService, OrderService, WishlistService};
    use crate::store::{MemoryStore, Stores};

    struct Harness {
        store: Arc<MemoryStore>,
        orders: OrderService,
        wishlist: WishlistService,
        cart: CartService,
        notifications: NotificationService,
        metrics: Arc<Metrics>,
    }

    fn harness() -> Harness {
        let store = Arc::new(MemoryStore::new());
        let stores = Stores::from_backend(store.clone());
        let metrics = Arc::new(Metrics::new().unwrap());
        let notifications = NotificationService::new(stores.clone(), metrics.clone());
        Harness {
            store,
            orders: OrderService::new(stores.clone(), notifications.clone(), metrics.clone()),
            wishlist: WishlistService::new(stores.clone(), metrics.clone()),
            cart: CartService::new(stores),
            notifications,
            metrics,
        }
    }

    macro_rules! app {
        ($h:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($h.orders.clone()))
                    .app_data(web::Data::new($h.wishlist.clone()))
                    .app_data(web::Data::new($h.cart.clone()))
                    .app_data(web::Data::new($h.notifications.clone()))
                    .app_data(web::Data::new($h.metrics.clone()))
                    .configure(configure),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn missing_user_id_header_is_a_400() {
        let h = harness();
        let app = app!(h);

        let req = test::TestRequest::get().uri("/api/wishlist/count").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Missing or invalid userId header");
    }

    #[actix_web::test]
    async fn wishlist_add_returns_the_envelope_and_maps_conflicts() {
        let h = harness();
        let customer = h.store.add_customer("Maria", "Santos");
        let product = h.store.add_product("Barong", 500.0, None, None);
        let app = app!(h);

        let add = || {
            test::TestRequest::post()
                .uri("/api/wishlist/add")
                .insert_header(("userId", customer.id.to_string()))
                .set_json(serde_json::json!({ "productId": product.id }))
                .to_request()
        };

        let resp = test::call_service(&app, add()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Product added to wishlist");
        assert_eq!(body["wishlistCount"], 1);
        assert!(body["wishlistItemId"].is_i64());

        let resp = test::call_service(&app, add()).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Product already in wishlist");

        let req = test::TestRequest::post()
            .uri("/api/wishlist/add")
            .insert_header(("userId", customer.id.to_string()))
            .set_json(serde_json::json!({ "productId": 9999 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Product not found");
    }

    #[actix_web::test]
    async fn order_routes_share_the_error_mapping() {
        let h = harness();
        let customer = h.store.add_customer("Maria", "Santos");
        let app = app!(h);

        let req = test::TestRequest::post()
            .uri(&format!("/api/orders/customer/{}/from-cart", customer.id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Cart is empty; cannot create order.");

        let req = test::TestRequest::put()
            .uri("/api/orders/777/status")
            .set_json(serde_json::json!({ "status": "Shipped" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Order not found.");
    }

    #[actix_web::test]
    async fn checkout_round_trips_over_http() {
        let h = harness();
        let customer = h.store.add_customer("Maria", "Santos");
        h.store.add_product("Barong", 500.0, Some("barong.png"), Some(10));
        let app = app!(h);

        let req = test::TestRequest::post()
            .uri(&format!("/api/cart/customer/{}/items", customer.id))
            .set_json(serde_json::json!({
                "productName": "Barong",
                "quantity": 2,
                "unitPrice": 500.0,
                "size": "M"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let req = test::TestRequest::post()
            .uri(&format!("/api/orders/customer/{}/from-cart", customer.id))
            .set_json(serde_json::json!({ "method": "GCash" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let receipt: Value = test::read_body_json(resp).await;
        assert_eq!(receipt["totalAmount"], 1000.0);
        assert_eq!(receipt["status"], "Pending");
        assert_eq!(receipt["products"][0]["productName"], "Barong");

        let req = test::TestRequest::get()
            .uri(&format!("/api/orders/customer/{}", customer.id))
            .to_request();
        let history: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(history.as_array().unwrap().len(), 1);
        assert_eq!(history[0]["orderId"], receipt["orderId"]);

        let req = test::TestRequest::get().uri("/api/orders/admin").to_request();
        let admin: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(admin[0]["customerName"], "Maria Santos");
        assert_eq!(admin[0]["itemsCount"], 2);
    }

    #[actix_web::test]
    async fn notification_routes_round_trip() {
        let h = harness();
        let customer = h.store.add_customer("Maria", "Santos");
        h.notifications.record(customer.id, Some(1), "Your order #1 has been placed.").await.unwrap();
        let app = app!(h);

        let base = format!("/api/notifications/customer/{}", customer.id);

        let req = test::TestRequest::get().uri(&base).to_request();
        let listed: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(listed.as_array().unwrap().len(), 1);
        assert_eq!(listed[0]["read"], false);

        let req = test::TestRequest::get().uri(&format!("{base}/unread-count")).to_request();
        let count: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(count["count"], 1);

        let req = test::TestRequest::post().uri(&format!("{base}/mark-all-read")).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);

        let req = test::TestRequest::get().uri(&format!("{base}/unread-count")).to_request();
        let count: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(count["count"], 0);

        let req = test::TestRequest::delete().uri(&base).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);

        let req = test::TestRequest::get().uri(&base).to_request();
        let listed: Value = test::call_and_read_body_json(&app, req).await;
        assert!(listed.as_array().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn probes_respond() {
        let h = harness();
        h.metrics.record_order_created(100.0);
        let app = app!(h);

        let req = test::TestRequest::get().uri("/health").to_request();
        let health: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(health["status"], "healthy");

        let req = test::TestRequest::get().uri("/metrics").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = test::read_body(resp).await;
        let text = std::str::from_utf8(&body).unwrap();
        assert!(text.contains("orders_created_total"));
    }
}
