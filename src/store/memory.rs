use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use uuid::Uuid;

use super::{Store, StoreError, StoreResult, StoreTx, UserDirectory};
use crate::domain::identity::User;
use crate::domain::inventory::Sku;
use crate::domain::order::Order;

// ============================================================================
// In-Memory Store
// ============================================================================
//
// Backs unit tests and local development without a database. Transactions
// stage their writes privately and only touch the shared maps on commit, so
// a handle dropped mid-workflow observes nothing - the same rollback
// contract the PostgreSQL backend gets from its transaction.
//
// ============================================================================

#[derive(Default)]
struct Shared {
    orders: HashMap<Uuid, Order>,
    skus: HashMap<Uuid, Sku>,
    users: HashMap<String, User>,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    shared: Arc<Mutex<Shared>>,
    fail_commits: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_order(&self, order: Order) {
        self.lock().orders.insert(order.id, order);
    }

    pub fn insert_sku(&self, sku: Sku) {
        self.lock().skus.insert(sku.id, sku);
    }

    pub fn insert_user(&self, user: User) {
        self.lock().users.insert(user.subject.clone(), user);
    }

    /// Committed view of an order, if any.
    pub fn order(&self, id: Uuid) -> Option<Order> {
        self.lock().orders.get(&id).cloned()
    }

    /// Committed view of a SKU, if any.
    pub fn sku(&self, id: Uuid) -> Option<Sku> {
        self.lock().skus.get(&id).cloned()
    }

    /// Make every subsequent commit fail, which drives the rollback path in
    /// callers without a real database outage.
    pub fn set_fail_commits(&self, fail: bool) {
        self.fail_commits.store(fail, Ordering::SeqCst);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Shared> {
        self.shared.lock().expect("memory store lock poisoned")
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn begin(&self) -> StoreResult<Box<dyn StoreTx>> {
        Ok(Box::new(MemoryTx {
            store: self.clone(),
            staged_orders: HashMap::new(),
            staged_skus: HashMap::new(),
        }))
    }
}

#[async_trait]
impl UserDirectory for MemoryStore {
    async fn resolve(&self, subject: &str) -> StoreResult<Option<User>> {
        Ok(self.lock().users.get(subject).cloned())
    }
}

struct MemoryTx {
    store: MemoryStore,
    staged_orders: HashMap<Uuid, Order>,
    staged_skus: HashMap<Uuid, Sku>,
}

#[async_trait]
impl StoreTx for MemoryTx {
    async fn find_order(&mut self, id: Uuid) -> StoreResult<Option<Order>> {
        if let Some(order) = self.staged_orders.get(&id) {
            return Ok(Some(order.clone()));
        }
        Ok(self.store.order(id))
    }

    async fn save_order(&mut self, order: &Order) -> StoreResult<()> {
        self.staged_orders.insert(order.id, order.clone());
        Ok(())
    }

    async fn find_sku(&mut self, id: Uuid) -> StoreResult<Option<Sku>> {
        if let Some(sku) = self.staged_skus.get(&id) {
            return Ok(Some(sku.clone()));
        }
        Ok(self.store.sku(id))
    }

    async fn save_sku(&mut self, sku: &Sku) -> StoreResult<()> {
        self.staged_skus.insert(sku.id, sku.clone());
        Ok(())
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        let MemoryTx {
            store,
            staged_orders,
            staged_skus,
        } = *self;

        if store.fail_commits.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("commit failures enabled".to_string()));
        }

        let mut shared = store.shared.lock().expect("memory store lock poisoned");
        shared.orders.extend(staged_orders);
        shared.skus.extend(staged_skus);
        Ok(())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
