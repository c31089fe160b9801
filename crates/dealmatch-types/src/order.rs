//! Order types for the DealMatch marketplace.
//!
//! Sellers publish ASK orders describing the capacity they offer; buyers
//! publish BID orders describing the capacity they need. An ASK/BID pair
//! becomes a [`Deal`](crate::Deal) only after every matching rule passes.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::SECONDS_PER_HOUR;
use crate::{AccountId, Benchmarks, DealMatchError, MarketConfig, NetFlags, OrderId, Result};

/// Which side of the market this order is on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderType {
    #[default]
    Any,
    Bid,
    Ask,
}

impl std::fmt::Display for OrderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Any => write!(f, "ANY"),
            Self::Bid => write!(f, "BID"),
            Self::Ask => write!(f, "ASK"),
        }
    }
}

/// Lifecycle status of an order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    #[default]
    Unknown,
    Inactive,
    Active,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown => write!(f, "ORDER_UNKNOWN"),
            Self::Inactive => write!(f, "ORDER_INACTIVE"),
            Self::Active => write!(f, "ORDER_ACTIVE"),
        }
    }
}

/// Trust tier of an account, as recorded by the profile registry.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize,
)]
pub enum IdentityLevel {
    #[default]
    Unknown,
    Anonymous,
    Registered,
    Identified,
    Professional,
}

impl std::fmt::Display for IdentityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown => write!(f, "UNKNOWN"),
            Self::Anonymous => write!(f, "ANONYMOUS"),
            Self::Registered => write!(f, "REGISTERED"),
            Self::Identified => write!(f, "IDENTIFIED"),
            Self::Professional => write!(f, "PROFESSIONAL"),
        }
    }
}

/// A marketplace order as stored on the ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub order_type: OrderType,
    pub order_status: OrderStatus,
    pub author_id: AccountId,
    /// Pinned counterparty; [`AccountId::ZERO`] accepts anyone.
    pub counterparty_id: AccountId,
    /// Price per second.
    pub price: Decimal,
    /// Duration in seconds; zero for spot orders.
    pub duration: u64,
    pub net_flags: NetFlags,
    /// Minimum identity level required from the other side.
    pub identity_level: IdentityLevel,
    /// Owner of the blacklist this order refers to.
    pub blacklist: AccountId,
    pub benchmarks: Benchmarks,
    pub tag: Vec<u8>,
}

impl Order {
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.order_status == OrderStatus::Active
    }

    #[must_use]
    pub fn is_spot(&self) -> bool {
        self.duration == 0
    }

    /// Price for the whole duration.
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.price * Decimal::from(self.duration)
    }

    #[must_use]
    pub fn price_per_hour(&self) -> Decimal {
        self.price * Decimal::from(SECONDS_PER_HOUR)
    }

    /// Structural validation against marketplace limits.
    pub fn validate(&self, config: &MarketConfig) -> Result<()> {
        if self.tag.len() > config.max_tag_length {
            return Err(DealMatchError::InvalidOrder {
                reason: format!(
                    "tag value is too long: {} > {}",
                    self.tag.len(),
                    config.max_tag_length
                ),
            });
        }

        if self.price.is_sign_negative() {
            return Err(DealMatchError::InvalidOrder {
                reason: format!("price must not be negative, got {}", self.price),
            });
        }

        if !self.is_spot() && self.duration < config.min_deal_duration_secs {
            return Err(DealMatchError::InvalidOrder {
                reason: format!(
                    "duration {} is shorter than minimum {}",
                    self.duration, config.min_deal_duration_secs
                ),
            });
        }

        self.benchmarks.validate(config.min_num_benchmarks)
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl Order {
    /// An active ASK with 12 zero benchmarks and a random author.
    pub fn dummy_ask(id: u64, price: Decimal, duration: u64) -> Self {
        Self {
            id: OrderId(id),
            order_type: OrderType::Ask,
            order_status: OrderStatus::Active,
            author_id: AccountId(rand::random()),
            price,
            duration,
            benchmarks: Benchmarks::new(vec![0; crate::constants::MIN_NUM_BENCHMARKS]),
            ..Self::default()
        }
    }

    /// An active BID with 12 zero benchmarks and a random author.
    pub fn dummy_bid(id: u64, price: Decimal, duration: u64) -> Self {
        Self {
            order_type: OrderType::Bid,
            ..Self::dummy_ask(id, price, duration)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names() {
        assert_eq!(OrderType::Ask.to_string(), "ASK");
        assert_eq!(OrderType::Bid.to_string(), "BID");
        assert_eq!(OrderStatus::Inactive.to_string(), "ORDER_INACTIVE");
        assert_eq!(OrderStatus::Active.to_string(), "ORDER_ACTIVE");
        assert_eq!(IdentityLevel::Registered.to_string(), "REGISTERED");
    }

    #[test]
    fn identity_ordering() {
        assert!(IdentityLevel::Unknown < IdentityLevel::Anonymous);
        assert!(IdentityLevel::Anonymous < IdentityLevel::Registered);
        assert!(IdentityLevel::Identified < IdentityLevel::Professional);
    }

    #[test]
    fn only_active_status_is_active() {
        let mut order = Order::dummy_ask(1, Decimal::ONE, 3600);
        assert!(order.is_active());
        for status in [OrderStatus::Inactive, OrderStatus::Unknown] {
            order.order_status = status;
            assert!(!order.is_active());
        }
    }

    #[test]
    fn price_helpers() {
        let order = Order::dummy_ask(1, Decimal::new(2, 0), 7200);
        assert_eq!(order.total_price(), Decimal::new(14400, 0));
        assert_eq!(order.price_per_hour(), Decimal::new(7200, 0));
        assert!(!order.is_spot());
    }

    #[test]
    fn validate_accepts_dummy() {
        let order = Order::dummy_bid(2, Decimal::ONE, 3600);
        assert!(order.validate(&MarketConfig::default()).is_ok());
    }

    #[test]
    fn validate_rejects_long_tag() {
        let mut order = Order::dummy_bid(2, Decimal::ONE, 3600);
        order.tag = vec![b'x'; 33];
        let err = order.validate(&MarketConfig::default()).unwrap_err();
        assert!(matches!(err, DealMatchError::InvalidOrder { .. }));
    }

    #[test]
    fn validate_rejects_short_benchmarks() {
        let mut order = Order::dummy_bid(2, Decimal::ONE, 3600);
        order.benchmarks = Benchmarks::new(vec![1; 5]);
        let err = order.validate(&MarketConfig::default()).unwrap_err();
        assert!(err.to_string().contains("expected at least 12 benchmarks"));
    }

    #[test]
    fn validate_short_forward_rejected_but_spot_allowed() {
        let mut order = Order::dummy_ask(3, Decimal::ONE, 60);
        assert!(order.validate(&MarketConfig::default()).is_err());
        order.duration = 0;
        assert!(order.validate(&MarketConfig::default()).is_ok());
    }

    #[test]
    fn order_serde_roundtrip() {
        let order = Order::dummy_ask(9, Decimal::new(12345, 2), 3600);
        let json = serde_json::to_string(&order).unwrap();
        let back: Order = serde_json::from_str(&json).unwrap();
        assert_eq!(order, back);
    }
}
