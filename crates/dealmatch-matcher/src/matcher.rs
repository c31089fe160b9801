//! ASK/BID deal matcher.
//!
//! [`DealMatcher`] wraps an [`OrderStore`] and guards its `open_deal`: the
//! wrapped store is only asked to create a deal after the pair has passed
//! every compatibility rule.
//!
//! # Pipeline
//!
//! 1. Fetch both orders (concurrently)
//! 2. Type: ask is ASK, bid is BID
//! 3. Status: both ACTIVE
//! 4. Price: bid >= ask
//! 5. Duration: bid <= ask
//! 6. Net flags: every flag the bid needs is offered by the ask
//! 7. Benchmarks: bid <= ask on every compared dimension
//! 8. Resolve both authors' masters (concurrently)
//! 9. Counterparty pins match the other side's master
//! 10. Identity levels (concurrently) meet the other side's requirement
//! 11. Mutual blacklist check (concurrently, see [`BlacklistVerifier`])
//! 12. Delegate to the wrapped store
//!
//! The pipeline stops at the first failing step. Nothing is retried.

use std::sync::Arc;

use async_trait::async_trait;
use dealmatch_types::{
    AccountId, BlacklistParties, Deal, DealMatchError, IdentityLevel, Order, OrderId, OrderType,
    Result,
};
use ed25519_dalek::SigningKey;
use tracing::{debug, info, warn};

use crate::blacklist::BlacklistVerifier;
use crate::multi::{get_master_multi, get_order_info_multi, get_profile_level_multi};
use crate::store::{BlacklistStore, OrderStore, ProfileRegistry};

/// Check type, status, price, duration and net flags of a candidate pair.
pub fn check_order_terms(ask: &Order, bid: &Order) -> Result<()> {
    if ask.order_type != OrderType::Ask {
        return Err(DealMatchError::AskTypeMismatch(ask.order_type));
    }
    if bid.order_type != OrderType::Bid {
        return Err(DealMatchError::BidTypeMismatch(bid.order_type));
    }
    if !ask.is_active() {
        return Err(DealMatchError::AskInactive(ask.order_status));
    }
    if !bid.is_active() {
        return Err(DealMatchError::BidInactive(bid.order_status));
    }
    if ask.price > bid.price {
        return Err(DealMatchError::PriceMismatch {
            bid: bid.price,
            ask: ask.price,
        });
    }
    if ask.duration < bid.duration {
        return Err(DealMatchError::DurationMismatch {
            bid: bid.duration,
            ask: ask.duration,
        });
    }
    if !ask.net_flags.converse_implication(bid.net_flags) {
        return Err(DealMatchError::NetFlagsMismatch {
            bid: bid.net_flags,
            ask: ask.net_flags,
        });
    }
    Ok(())
}

/// Compare the first `num_benchmarks` dimensions. Missing values count as 0.
pub fn check_benchmarks(ask: &Order, bid: &Order, num_benchmarks: u64) -> Result<()> {
    let count = usize::try_from(num_benchmarks).map_err(|_| {
        DealMatchError::Internal(format!("benchmark count {num_benchmarks} out of range"))
    })?;
    for id in 0..count {
        let (bid_value, ask_value) = (bid.benchmarks.get(id), ask.benchmarks.get(id));
        if bid_value > ask_value {
            return Err(DealMatchError::BenchmarkMismatch {
                id,
                bid: bid_value,
                ask: ask_value,
            });
        }
    }
    Ok(())
}

/// A non-zero counterparty pin must name the other side's master.
pub fn check_counterparties(
    ask: &Order,
    bid: &Order,
    ask_master: AccountId,
    bid_master: AccountId,
) -> Result<()> {
    if !ask.counterparty_id.is_zero() && ask.counterparty_id != bid_master {
        return Err(DealMatchError::AskCounterpartyMismatch {
            counterparty: ask.counterparty_id,
            master: bid_master,
        });
    }
    if !bid.counterparty_id.is_zero() && bid.counterparty_id != ask_master {
        return Err(DealMatchError::BidCounterpartyMismatch {
            counterparty: bid.counterparty_id,
            master: ask_master,
        });
    }
    Ok(())
}

/// Each author's level must meet the level the other order demands.
pub fn check_identities(
    ask: &Order,
    bid: &Order,
    ask_author_level: IdentityLevel,
    bid_author_level: IdentityLevel,
) -> Result<()> {
    if bid_author_level < ask.identity_level {
        return Err(DealMatchError::BidIdentityTooLow {
            actual: bid_author_level,
            required: ask.identity_level,
        });
    }
    if ask_author_level < bid.identity_level {
        return Err(DealMatchError::AskIdentityTooLow {
            actual: ask_author_level,
            required: bid.identity_level,
        });
    }
    Ok(())
}

/// Validating front for an [`OrderStore`].
///
/// Every method other than `open_deal` is forwarded unchanged.
pub struct DealMatcher {
    store: Arc<dyn OrderStore>,
    registry: Arc<dyn ProfileRegistry>,
    blacklist: BlacklistVerifier,
}

impl DealMatcher {
    #[must_use]
    pub fn new(
        store: Arc<dyn OrderStore>,
        registry: Arc<dyn ProfileRegistry>,
        blacklist: Arc<dyn BlacklistStore>,
    ) -> Self {
        Self {
            store,
            registry,
            blacklist: BlacklistVerifier::new(blacklist),
        }
    }

    /// Steps 1-11. Returns the verified orders.
    async fn verify_pair(&self, ask_id: OrderId, bid_id: OrderId) -> Result<(Order, Order)> {
        let mut orders = get_order_info_multi(&*self.store, &[ask_id, bid_id]).await?;
        let (Some(bid), Some(ask)) = (orders.pop(), orders.pop()) else {
            return Err(DealMatchError::Internal(
                "order lookup returned fewer orders than requested".into(),
            ));
        };

        check_order_terms(&ask, &bid)?;
        let num_benchmarks = self.store.get_num_benchmarks().await?;
        check_benchmarks(&ask, &bid, num_benchmarks)?;
        debug!(%ask_id, %bid_id, num_benchmarks, "Order terms compatible");

        let masters = get_master_multi(&*self.store, &[&ask, &bid]).await?;
        let (ask_master, bid_master) = (masters[0], masters[1]);
        check_counterparties(&ask, &bid, ask_master, bid_master)?;
        debug!(%ask_master, %bid_master, "Counterparties verified");

        let levels =
            get_profile_level_multi(&*self.registry, &[ask.author_id, bid.author_id]).await?;
        check_identities(&ask, &bid, levels[0], levels[1])?;
        debug!(ask_level = %levels[0], bid_level = %levels[1], "Identities verified");

        let parties = BlacklistParties {
            ask_author: ask.author_id,
            ask_master,
            ask_blacklist: ask.blacklist,
            bid_author: bid.author_id,
            bid_blacklist: bid.blacklist,
        };
        self.blacklist.verify(&parties).await?;
        debug!(%ask_id, %bid_id, "Blacklists verified");

        Ok((ask, bid))
    }
}

#[async_trait]
impl OrderStore for DealMatcher {
    async fn get_order_info(&self, id: OrderId) -> Result<Order> {
        self.store.get_order_info(id).await
    }

    async fn get_master(&self, author: AccountId) -> Result<AccountId> {
        self.store.get_master(author).await
    }

    async fn get_num_benchmarks(&self) -> Result<u64> {
        self.store.get_num_benchmarks().await
    }

    async fn open_deal(&self, key: &SigningKey, ask_id: OrderId, bid_id: OrderId) -> Result<Deal> {
        if let Err(err) = self.verify_pair(ask_id, bid_id).await {
            if err.is_rejection() {
                warn!(%ask_id, %bid_id, code = err.code(), error = %err, "Deal rejected");
            } else {
                warn!(%ask_id, %bid_id, code = err.code(), error = %err, "Deal matching failed");
            }
            return Err(err);
        }

        info!(%ask_id, %bid_id, "Pair matched, opening deal");
        let deal = self.store.open_deal(key, ask_id, bid_id).await?;
        info!(
            deal_id = %deal.id,
            deal_type = deal.type_name(),
            price = %deal.price,
            duration = deal.duration,
            "Deal opened"
        );
        Ok(deal)
    }
}
