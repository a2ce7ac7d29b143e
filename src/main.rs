use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod api;
mod config;
mod domain;
mod metrics;
mod store;

use api::AppState;
use config::{AppConfig, StoreBackend};
use domain::order::{OrderCommandHandler, OrderQueryHandler};
use store::{MemoryStore, PgStore, PgUserDirectory, Store, UserDirectory};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured logging with environment-based filtering.
    // Default to INFO level, can be overridden with RUST_LOG env var.
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,marketplace_orders=debug")),
        )
        .init();

    let config = AppConfig::from_env()?;
    tracing::info!(backend = ?config.backend, "Starting marketplace orders service");

    let app_metrics = Arc::new(metrics::Metrics::new()?);

    // === Storage backend ===
    let (order_store, user_directory): (Arc<dyn Store>, Arc<dyn UserDirectory>) =
        match config.backend {
            StoreBackend::Postgres => {
                let url = config.database_url.as_deref().ok_or_else(|| {
                    anyhow::anyhow!("DATABASE_URL is required for the postgres backend")
                })?;
                let pg = PgStore::connect(url, config.db_max_connections).await?;
                let users = PgUserDirectory::new(pg.pool().clone());
                (Arc::new(pg), Arc::new(users))
            }
            StoreBackend::Memory => {
                let mem = MemoryStore::new();
                if config.seed_demo_data {
                    seed_demo_data(&mem);
                }
                (Arc::new(mem.clone()), Arc::new(mem))
            }
        };

    // === Handlers ===
    let commands = Arc::new(OrderCommandHandler::new(
        order_store.clone(),
        user_directory,
        app_metrics.clone(),
    ));
    let queries = Arc::new(OrderQueryHandler::new(order_store));
    let state = AppState { commands, queries };

    // === Metrics server, on its own thread and runtime ===
    let registry = Arc::new(app_metrics.registry().clone());
    let metrics_port = config.metrics_port;
    std::thread::spawn(move || {
        let rt = tokio::runtime::Runtime::new().expect("metrics runtime");
        rt.block_on(async {
            if let Err(e) = metrics::start_metrics_server(registry, metrics_port).await {
                tracing::error!(error = %e, "Metrics server error");
            }
        });
    });

    // === Public API ===
    let bind_addr = (config.server_host.clone(), config.server_port);
    tracing::info!(host = %bind_addr.0, port = bind_addr.1, "Listening");

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .configure(api::configure_routes)
    })
    .bind(bind_addr)?
    .run()
    .await?;

    Ok(())
}

/// Memory backend convenience: one buyer, one SKU and one pending order so
/// the lifecycle endpoints can be exercised immediately.
fn seed_demo_data(store: &MemoryStore) {
    use chrono::Utc;
    use uuid::Uuid;

    use crate::domain::identity::User;
    use crate::domain::inventory::Sku;
    use crate::domain::order::{Order, OrderItem};

    let user = User::new("demo-user", "demo@example.com");
    let sku = Sku::new("SKU-RED-MUG", 12, Utc::now());
    let item = OrderItem {
        id: Uuid::new_v4(),
        sku_id: sku.id,
        quantity: 2,
        unit_price_cents: 1499,
    };
    let order = Order::new(user.id, "ORD-10001", vec![item], 2998, 499, 0, Utc::now())
        .expect("demo order is valid");

    tracing::info!(
        order_id = %order.id,
        subject = %user.subject,
        sku = %sku.code,
        "Seeded demo data"
    );

    store.insert_user(user);
    store.insert_sku(sku);
    store.insert_order(order);
}
