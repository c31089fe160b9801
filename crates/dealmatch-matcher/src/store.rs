//! External collaborators of the matcher.
//!
//! All three are remote services in production (ledger, identity
//! registry, blacklist contract). They are shared as `Arc<dyn Trait>` and
//! must tolerate concurrent calls.

use async_trait::async_trait;
use dealmatch_types::{AccountId, Deal, IdentityLevel, Order, OrderId, Result};
use ed25519_dalek::SigningKey;

/// Order and deal ledger.
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn get_order_info(&self, id: OrderId) -> Result<Order>;

    /// Account that `author` delegated operational control to. An author
    /// without a master is its own master.
    async fn get_master(&self, author: AccountId) -> Result<AccountId>;

    /// Number of benchmark dimensions the marketplace compares.
    async fn get_num_benchmarks(&self) -> Result<u64>;

    /// Create a deal from two orders, signed with `key`.
    async fn open_deal(&self, key: &SigningKey, ask_id: OrderId, bid_id: OrderId) -> Result<Deal>;
}

/// Identity registry.
#[async_trait]
pub trait ProfileRegistry: Send + Sync {
    async fn get_profile_level(&self, account: AccountId) -> Result<IdentityLevel>;
}

/// Per-account blacklists.
#[async_trait]
pub trait BlacklistStore: Send + Sync {
    /// Whether `owner` has blacklisted `candidate`.
    async fn check(&self, owner: AccountId, candidate: AccountId) -> Result<bool>;
}
