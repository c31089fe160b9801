//! In-memory collaborators for tests and local simulation.
//!
//! Each store can be told to fail, so callers can exercise error
//! propagation without a real ledger.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use dealmatch_types::{
    AccountId, Deal, DealMatchError, IdentityLevel, MarketConfig, Order, OrderId, OrderStatus,
    Result,
};
use ed25519_dalek::SigningKey;
use tokio::sync::RwLock;
use tracing::debug;

use crate::store::{BlacklistStore, OrderStore, ProfileRegistry};

// ---------------------------------------------------------------------------
// Order store
// ---------------------------------------------------------------------------

/// Order ledger held in memory.
///
/// Opening a deal deactivates both orders, as the ledger does.
pub struct InMemoryOrderStore {
    config: MarketConfig,
    orders: RwLock<HashMap<OrderId, Order>>,
    masters: RwLock<HashMap<AccountId, AccountId>>,
    deals: RwLock<Vec<Deal>>,
    order_failure: RwLock<Option<String>>,
    master_failure: RwLock<Option<String>>,
    open_deal_calls: AtomicUsize,
}

impl InMemoryOrderStore {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(MarketConfig::default())
    }

    #[must_use]
    pub fn with_config(config: MarketConfig) -> Self {
        Self {
            config,
            orders: RwLock::new(HashMap::new()),
            masters: RwLock::new(HashMap::new()),
            deals: RwLock::new(Vec::new()),
            order_failure: RwLock::new(None),
            master_failure: RwLock::new(None),
            open_deal_calls: AtomicUsize::new(0),
        }
    }

    /// Validate and store an order, replacing any order with the same ID.
    pub async fn insert_order(&self, order: Order) -> Result<()> {
        order.validate(&self.config)?;
        self.orders.write().await.insert(order.id, order);
        Ok(())
    }

    pub async fn set_master(&self, author: AccountId, master: AccountId) {
        self.masters.write().await.insert(author, master);
    }

    /// Make every order lookup fail with `reason`.
    pub async fn fail_order_lookups(&self, reason: &str) {
        *self.order_failure.write().await = Some(reason.to_string());
    }

    /// Make every master lookup fail with `reason`.
    pub async fn fail_master_lookups(&self, reason: &str) {
        *self.master_failure.write().await = Some(reason.to_string());
    }

    /// How many times `open_deal` was called, successful or not.
    #[must_use]
    pub fn open_deal_calls(&self) -> usize {
        self.open_deal_calls.load(Ordering::SeqCst)
    }

    pub async fn deals(&self) -> Vec<Deal> {
        self.deals.read().await.clone()
    }

    async fn injected(failure: &RwLock<Option<String>>) -> Result<()> {
        match failure.read().await.as_ref() {
            Some(reason) => Err(DealMatchError::Collaborator {
                service: "order store",
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }
}

impl Default for InMemoryOrderStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn get_order_info(&self, id: OrderId) -> Result<Order> {
        Self::injected(&self.order_failure).await?;
        self.orders
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(DealMatchError::OrderNotFound(id))
    }

    async fn get_master(&self, author: AccountId) -> Result<AccountId> {
        Self::injected(&self.master_failure).await?;
        Ok(self
            .masters
            .read()
            .await
            .get(&author)
            .copied()
            .unwrap_or(author))
    }

    async fn get_num_benchmarks(&self) -> Result<u64> {
        Ok(self.config.min_num_benchmarks as u64)
    }

    async fn open_deal(&self, key: &SigningKey, ask_id: OrderId, bid_id: OrderId) -> Result<Deal> {
        self.open_deal_calls.fetch_add(1, Ordering::SeqCst);

        let mut orders = self.orders.write().await;
        let ask = orders
            .get(&ask_id)
            .cloned()
            .ok_or(DealMatchError::OrderNotFound(ask_id))?;
        let bid = orders
            .get(&bid_id)
            .cloned()
            .ok_or(DealMatchError::OrderNotFound(bid_id))?;
        let master = self
            .masters
            .read()
            .await
            .get(&ask.author_id)
            .copied()
            .unwrap_or(ask.author_id);

        let deal = Deal::from_orders(&ask, &bid, master);
        for id in [ask_id, bid_id] {
            if let Some(order) = orders.get_mut(&id) {
                order.order_status = OrderStatus::Inactive;
            }
        }
        drop(orders);

        debug!(
            deal_id = %deal.id,
            signer = %AccountId::from_verifying_key(&key.verifying_key()),
            "Deal recorded"
        );
        self.deals.write().await.push(deal.clone());
        Ok(deal)
    }
}

// ---------------------------------------------------------------------------
// Profile registry
// ---------------------------------------------------------------------------

/// Identity registry held in memory. Unknown accounts are anonymous.
pub struct InMemoryProfileRegistry {
    levels: RwLock<HashMap<AccountId, IdentityLevel>>,
    failure: RwLock<Option<String>>,
}

impl InMemoryProfileRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            levels: RwLock::new(HashMap::new()),
            failure: RwLock::new(None),
        }
    }

    pub async fn set_level(&self, account: AccountId, level: IdentityLevel) {
        self.levels.write().await.insert(account, level);
    }

    pub async fn fail_with(&self, reason: &str) {
        *self.failure.write().await = Some(reason.to_string());
    }
}

impl Default for InMemoryProfileRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProfileRegistry for InMemoryProfileRegistry {
    async fn get_profile_level(&self, account: AccountId) -> Result<IdentityLevel> {
        if let Some(reason) = self.failure.read().await.as_ref() {
            return Err(DealMatchError::Collaborator {
                service: "profile registry",
                reason: reason.clone(),
            });
        }
        Ok(self
            .levels
            .read()
            .await
            .get(&account)
            .copied()
            .unwrap_or(IdentityLevel::Anonymous))
    }
}

// ---------------------------------------------------------------------------
// Blacklist store
// ---------------------------------------------------------------------------

/// Blacklists held in memory, keyed by owner.
pub struct InMemoryBlacklistStore {
    lists: RwLock<HashMap<AccountId, HashSet<AccountId>>>,
    failure: RwLock<Option<String>>,
    checks: AtomicUsize,
}

impl InMemoryBlacklistStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            lists: RwLock::new(HashMap::new()),
            failure: RwLock::new(None),
            checks: AtomicUsize::new(0),
        }
    }

    /// `owner` blacklists `candidate`.
    pub async fn add(&self, owner: AccountId, candidate: AccountId) {
        self.lists
            .write()
            .await
            .entry(owner)
            .or_default()
            .insert(candidate);
    }

    pub async fn remove(&self, owner: AccountId, candidate: AccountId) {
        if let Some(list) = self.lists.write().await.get_mut(&owner) {
            list.remove(&candidate);
        }
    }

    pub async fn fail_with(&self, reason: &str) {
        *self.failure.write().await = Some(reason.to_string());
    }

    /// Number of lookups served, failed ones included.
    #[must_use]
    pub fn check_count(&self) -> usize {
        self.checks.load(Ordering::SeqCst)
    }
}

impl Default for InMemoryBlacklistStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BlacklistStore for InMemoryBlacklistStore {
    async fn check(&self, owner: AccountId, candidate: AccountId) -> Result<bool> {
        self.checks.fetch_add(1, Ordering::SeqCst);
        if let Some(reason) = self.failure.read().await.as_ref() {
            return Err(DealMatchError::Collaborator {
                service: "blacklist",
                reason: reason.clone(),
            });
        }
        Ok(self
            .lists
            .read()
            .await
            .get(&owner)
            .is_some_and(|list| list.contains(&candidate)))
    }
}
