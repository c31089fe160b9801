//! Concurrent batch lookups.
//!
//! Each helper issues one request per input, all at once, and returns the
//! results in input order. The first error wins; the remaining requests
//! are dropped.

use dealmatch_types::{AccountId, IdentityLevel, Order, OrderId, Result};
use futures::future::try_join_all;

use crate::store::{OrderStore, ProfileRegistry};

pub async fn get_order_info_multi(store: &dyn OrderStore, ids: &[OrderId]) -> Result<Vec<Order>> {
    try_join_all(ids.iter().map(|id| store.get_order_info(*id))).await
}

/// Masters of each order's author.
pub async fn get_master_multi(store: &dyn OrderStore, orders: &[&Order]) -> Result<Vec<AccountId>> {
    try_join_all(orders.iter().map(|order| store.get_master(order.author_id))).await
}

pub async fn get_profile_level_multi(
    registry: &dyn ProfileRegistry,
    accounts: &[AccountId],
) -> Result<Vec<IdentityLevel>> {
    try_join_all(
        accounts
            .iter()
            .map(|account| registry.get_profile_level(*account)),
    )
    .await
}
