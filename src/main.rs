use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod models;
mod error;
mod config;
mod store;
mod services;
mod metrics;
mod api;

use config::Config;
use services::{CartService, NotificationService, OrderService, WishlistService};
use store::{MemoryStore, Stores};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured logging with environment-based filtering
    // Default to INFO level, can be overridden with RUST_LOG env var
    // Example: RUST_LOG=debug cargo run
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,storefront=debug")),
        )
        .init();

    tracing::info!("🚀 Starting storefront backend");

    let config = Config::from_env();

    // === 1. Connect storage ===
    let stores = match config.database_url.as_deref() {
        Some(url) => {
            tracing::info!("Connecting to Postgres...");
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(10)
                .connect(url)
                .await?;
            let stores = Stores::postgres(pool).await?;
            tracing::info!("Schema applied, database ready");
            stores
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using the in-memory store (state is volatile)");
            let backend = Arc::new(MemoryStore::new());
            let customer = backend.add_customer("Maria", "Santos");
            backend.add_product("Barong Tagalog", 1499.0, Some("/images/barong.png"), Some(25));
            backend.add_product("Banig Mat", 349.0, Some("/images/banig.png"), Some(40));
            backend.add_product("Tinalak Weave", 899.0, Some("/images/tinalak.png"), None);
            tracing::info!(customer_id = %customer.id, "Seeded demo catalog for development");
            Stores::from_backend(backend)
        }
    };

    // === 2. Initialize Prometheus metrics ===
    tracing::info!("Initializing metrics");
    let metrics = Arc::new(metrics::Metrics::new()?);
    tracing::info!("📊 Metrics registry created with {} metrics", metrics.registry().gather().len());

    // === 3. Wire the workflows ===
    let notifications = NotificationService::new(stores.clone(), metrics.clone());
    let orders = OrderService::new(stores.clone(), notifications.clone(), metrics.clone());
    let wishlist = WishlistService::new(stores.clone(), metrics.clone());
    let cart = CartService::new(stores);

    // === 4. Serve the HTTP surface ===
    tracing::info!("Listening on http://{}:{}", config.http_host, config.http_port);
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(orders.clone()))
            .app_data(web::Data::new(wishlist.clone()))
            .app_data(web::Data::new(cart.clone()))
            .app_data(web::Data::new(notifications.clone()))
            .app_data(web::Data::new(metrics.clone()))
            .configure(api::configure)
    })
    .bind((config.http_host.as_str(), config.http_port))?
    .run()
    .await?;

    Ok(())
}
