use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::TryStreamExt;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::{Store, StoreResult, StoreTx, UserDirectory};
use crate::domain::identity::User;
use crate::domain::inventory::Sku;
use crate::domain::order::{Order, OrderItem, OrderStatus, PaymentStatus};

// ============================================================================
// PostgreSQL Store
// ============================================================================
//
// Schema lives in schema.sql. Orders and their items are written inside the
// caller's transaction; the `FOR UPDATE` on the order row is the
// serialization point that keeps two concurrent cancellations of the same
// order from both restoring inventory.
//
// ============================================================================

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str, max_connections: u32) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        tracing::info!(max_connections, "Connected to PostgreSQL");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    async fn begin(&self) -> StoreResult<Box<dyn StoreTx>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgStoreTx { tx }))
    }
}

struct PgStoreTx {
    tx: Transaction<'static, Postgres>,
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    order_number: String,
    user_id: Uuid,
    status: OrderStatus,
    payment_status: PaymentStatus,
    subtotal_cents: i64,
    shipping_cents: i64,
    discount_cents: i64,
    total_cents: i64,
    tracking_number: Option<String>,
    carrier: Option<String>,
    cancelled_reason: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    shipped_at: Option<DateTime<Utc>>,
    delivered_at: Option<DateTime<Utc>>,
    cancelled_at: Option<DateTime<Utc>>,
}

impl OrderRow {
    fn into_order(self, items: Vec<OrderItem>) -> Order {
        Order {
            id: self.id,
            order_number: self.order_number,
            user_id: self.user_id,
            status: self.status,
            payment_status: self.payment_status,
            items,
            subtotal_cents: self.subtotal_cents,
            shipping_cents: self.shipping_cents,
            discount_cents: self.discount_cents,
            total_cents: self.total_cents,
            tracking_number: self.tracking_number,
            carrier: self.carrier,
            cancelled_reason: self.cancelled_reason,
            created_at: self.created_at,
            updated_at: self.updated_at,
            shipped_at: self.shipped_at,
            delivered_at: self.delivered_at,
            cancelled_at: self.cancelled_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct OrderItemRow {
    id: Uuid,
    sku_id: Uuid,
    quantity: i32,
    unit_price_cents: i64,
}

#[derive(sqlx::FromRow)]
struct SkuRow {
    id: Uuid,
    code: String,
    stock_quantity: i32,
    updated_at: DateTime<Utc>,
}

#[async_trait]
impl StoreTx for PgStoreTx {
    async fn find_order(&mut self, id: Uuid) -> StoreResult<Option<Order>> {
        let row = sqlx::query_as::<_, OrderRow>(
            "SELECT id, order_number, user_id, status, payment_status,
                    subtotal_cents, shipping_cents, discount_cents, total_cents,
                    tracking_number, carrier, cancelled_reason,
                    created_at, updated_at, shipped_at, delivered_at, cancelled_at
             FROM orders
             WHERE id = $1
             FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut items = Vec::new();
        {
            let mut item_rows = sqlx::query_as::<_, OrderItemRow>(
                "SELECT id, sku_id, quantity, unit_price_cents
                 FROM order_items
                 WHERE order_id = $1
                 ORDER BY id",
            )
            .bind(id)
            .fetch(&mut *self.tx);

            while let Some(item) = item_rows.try_next().await? {
                items.push(OrderItem {
                    id: item.id,
                    sku_id: item.sku_id,
                    quantity: item.quantity,
                    unit_price_cents: item.unit_price_cents,
                });
            }
        }

        Ok(Some(row.into_order(items)))
    }

    async fn save_order(&mut self, order: &Order) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO orders (id, order_number, user_id, status, payment_status,
                                 subtotal_cents, shipping_cents, discount_cents, total_cents,
                                 tracking_number, carrier, cancelled_reason,
                                 created_at, updated_at, shipped_at, delivered_at, cancelled_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
             ON CONFLICT (id) DO UPDATE SET
                 status = EXCLUDED.status,
                 payment_status = EXCLUDED.payment_status,
                 tracking_number = EXCLUDED.tracking_number,
                 carrier = EXCLUDED.carrier,
                 cancelled_reason = EXCLUDED.cancelled_reason,
                 updated_at = EXCLUDED.updated_at,
                 shipped_at = EXCLUDED.shipped_at,
                 delivered_at = EXCLUDED.delivered_at,
                 cancelled_at = EXCLUDED.cancelled_at",
        )
        .bind(order.id)
        .bind(&order.order_number)
        .bind(order.user_id)
        .bind(order.status)
        .bind(order.payment_status)
        .bind(order.subtotal_cents)
        .bind(order.shipping_cents)
        .bind(order.discount_cents)
        .bind(order.total_cents)
        .bind(&order.tracking_number)
        .bind(&order.carrier)
        .bind(&order.cancelled_reason)
        .bind(order.created_at)
        .bind(order.updated_at)
        .bind(order.shipped_at)
        .bind(order.delivered_at)
        .bind(order.cancelled_at)
        .execute(&mut *self.tx)
        .await?;

        // Items never change after creation; only fill gaps.
        for item in &order.items {
            sqlx::query(
                "INSERT INTO order_items (id, order_id, sku_id, quantity, unit_price_cents)
                 VALUES ($1, $2, $3, $4, $5)
                 ON CONFLICT (id) DO NOTHING",
            )
            .bind(item.id)
            .bind(order.id)
            .bind(item.sku_id)
            .bind(item.quantity)
            .bind(item.unit_price_cents)
            .execute(&mut *self.tx)
            .await?;
        }

        Ok(())
    }

    async fn find_sku(&mut self, id: Uuid) -> StoreResult<Option<Sku>> {
        let row = sqlx::query_as::<_, SkuRow>(
            "SELECT id, code, stock_quantity, updated_at
             FROM skus
             WHERE id = $1
             FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(row.map(|r| Sku {
            id: r.id,
            code: r.code,
            stock_quantity: r.stock_quantity,
            updated_at: r.updated_at,
        }))
    }

    async fn save_sku(&mut self, sku: &Sku) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO skus (id, code, stock_quantity, updated_at)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (id) DO UPDATE SET
                 stock_quantity = EXCLUDED.stock_quantity,
                 updated_at = EXCLUDED.updated_at",
        )
        .bind(sku.id)
        .bind(&sku.code)
        .bind(sku.stock_quantity)
        .bind(sku.updated_at)
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        self.tx.commit().await?;
        Ok(())
    }
}

// ============================================================================
// User Directory
// ============================================================================

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    subject: String,
    email: String,
}

pub struct PgUserDirectory {
    pool: PgPool,
}

impl PgUserDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn resolve(&self, subject: &str) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, subject, email FROM users WHERE subject = $1",
        )
        .bind(subject)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| User {
            id: r.id,
            subject: r.subject,
            email: r.email,
        }))
    }
}
