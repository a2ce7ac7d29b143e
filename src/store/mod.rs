use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::identity::User;
use crate::domain::inventory::Sku;
use crate::domain::order::Order;

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::{PgStore, PgUserDirectory};

// ============================================================================
// Storage Layer - narrow contracts over the relational store
// ============================================================================
//
// Workflows open one transaction per logical unit of work. Dropping an
// uncommitted handle rolls everything back, so every early-exit path in a
// workflow is a rollback path without extra bookkeeping.
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// One open transaction against the backing store.
#[async_trait]
pub trait StoreTx: Send {
    async fn find_order(&mut self, id: Uuid) -> StoreResult<Option<Order>>;

    /// Upsert the order and its items.
    async fn save_order(&mut self, order: &Order) -> StoreResult<()>;

    async fn find_sku(&mut self, id: Uuid) -> StoreResult<Option<Sku>>;

    async fn save_sku(&mut self, sku: &Sku) -> StoreResult<()>;

    /// Make every write in this transaction durable at once. Consumes the
    /// handle; a handle dropped without commit rolls back instead.
    async fn commit(self: Box<Self>) -> StoreResult<()>;
}

#[async_trait]
pub trait Store: Send + Sync {
    async fn begin(&self) -> StoreResult<Box<dyn StoreTx>>;
}

/// Resolves an external authentication subject to an internal user record.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn resolve(&self, subject: &str) -> StoreResult<Option<User>>;
}
