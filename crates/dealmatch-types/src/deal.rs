//! Deal types produced by a successful ASK/BID match.
//!
//! A [`Deal`] is created by the order store only after every matching
//! rule has passed. Once created it is immutable; closing and billing are
//! handled elsewhere.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::SECONDS_PER_HOUR;
use crate::{AccountId, Benchmarks, DealId, Order, OrderId};

/// A binding agreement between a supplier (ASK author) and a consumer
/// (BID author).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deal {
    pub id: DealId,
    pub ask_id: OrderId,
    pub bid_id: OrderId,
    /// ASK author.
    pub supplier_id: AccountId,
    /// BID author.
    pub consumer_id: AccountId,
    /// Account the supplier delegated operational control to.
    pub master_id: AccountId,
    /// Price per second; the ASK price.
    pub price: Decimal,
    /// Duration in seconds; the BID duration. Zero for spot deals.
    pub duration: u64,
    /// Benchmarks the supplier committed to.
    pub benchmarks: Benchmarks,
    pub start_time: DateTime<Utc>,
}

impl Deal {
    /// Build the deal record for a matched pair.
    #[must_use]
    pub fn from_orders(ask: &Order, bid: &Order, ask_master: AccountId) -> Self {
        Self {
            id: DealId::new(),
            ask_id: ask.id,
            bid_id: bid.id,
            supplier_id: ask.author_id,
            consumer_id: bid.author_id,
            master_id: ask_master,
            price: ask.price,
            duration: bid.duration,
            benchmarks: ask.benchmarks.clone(),
            start_time: Utc::now(),
        }
    }

    #[must_use]
    pub fn is_spot(&self) -> bool {
        self.duration == 0
    }

    #[must_use]
    pub fn type_name(&self) -> &'static str {
        if self.is_spot() { "Spot" } else { "Forward" }
    }

    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.price * Decimal::from(self.duration)
    }

    #[must_use]
    pub fn price_per_hour(&self) -> Decimal {
        self.price * Decimal::from(SECONDS_PER_HOUR)
    }
}
