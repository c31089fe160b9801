//! Error types for DealMatch.
//!
//! Every variant has a stable `DM_ERR_` code, available through
//! [`DealMatchError::code`], for easy grepping in logs. The `Display` text
//! is the bare human-readable message: callers and operators match on the
//! exact wording (e.g. `bid price 499 must be >= ask price 500`), so codes
//! are kept out of it and logged as a separate field instead.
//!
//! Codes are grouped by subsystem:
//! - 1xx: Order validation errors
//! - 2xx: Counterparty / identity errors
//! - 3xx: Blacklist errors
//! - 4xx: Resource accounting errors
//! - 9xx: Collaborator / general errors

use rust_decimal::Decimal;
use thiserror::Error;

use crate::{
    AccountId, BlacklistViolation, IdentityLevel, NetFlags, OrderId, OrderStatus, OrderType,
    Shortfall,
};

/// Central error enum for all DealMatch operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DealMatchError {
    // =================================================================
    // Order Validation Errors (1xx)
    // =================================================================
    /// The ASK side of a match is not an ASK order.
    #[error("ask must have ASK type, but it is {0}")]
    AskTypeMismatch(OrderType),

    /// The BID side of a match is not a BID order.
    #[error("bid must have BID type, but it is {0}")]
    BidTypeMismatch(OrderType),

    #[error("ask order must be active, but it is {0}")]
    AskInactive(OrderStatus),

    #[error("bid order must be active, but it is {0}")]
    BidInactive(OrderStatus),

    /// The buyer offers less than the seller asks.
    #[error("bid price {bid} must be >= ask price {ask}")]
    PriceMismatch { bid: Decimal, ask: Decimal },

    /// The buyer needs longer than the seller offers.
    #[error("bid duration {bid} must be <= ask duration {ask}")]
    DurationMismatch { bid: u64, ask: u64 },

    /// The buyer requires a network capability the seller does not offer.
    #[error("bid netflags {bid} must fit in ask netflags {ask}")]
    NetFlagsMismatch { bid: NetFlags, ask: NetFlags },

    /// A benchmark dimension required by the buyer exceeds the seller's.
    #[error(
        "benchmark matching failed: id={id} bid benchmark {bid} must be <= ask benchmark {ask}"
    )]
    BenchmarkMismatch { id: usize, bid: u64, ask: u64 },

    /// The order failed structural validation (tag, benchmarks, ...).
    #[error("invalid order: {reason}")]
    InvalidOrder { reason: String },

    // =================================================================
    // Counterparty / Identity Errors (2xx)
    // =================================================================
    #[error("ask counterparty {counterparty} doesn't match with bid master {master}")]
    AskCounterpartyMismatch {
        counterparty: AccountId,
        master: AccountId,
    },

    #[error("bid counterparty {counterparty} doesn't match with ask master {master}")]
    BidCounterpartyMismatch {
        counterparty: AccountId,
        master: AccountId,
    },

    /// The bid author's identity is below the level the ask demands.
    #[error("bid identity {actual} must be >= ask author identity {required}")]
    BidIdentityTooLow {
        actual: IdentityLevel,
        required: IdentityLevel,
    },

    /// The ask author's identity is below the level the bid demands.
    #[error("ask identity {actual} must be >= bid author identity {required}")]
    AskIdentityTooLow {
        actual: IdentityLevel,
        required: IdentityLevel,
    },

    // =================================================================
    // Blacklist Errors (3xx)
    // =================================================================
    /// One of the seven party pairs is blacklisted.
    #[error("blacklist check failed: {0}")]
    Blacklisted(BlacklistViolation),

    /// A blacklist lookup itself failed; the inner error is the first
    /// failure among the concurrent checks.
    #[error("blacklist check failed: {0}")]
    BlacklistCheckFailed(Box<DealMatchError>),

    // =================================================================
    // Resource Accounting Errors (4xx)
    // =================================================================
    /// A GPU is already part of the receiving set (double pledge).
    #[error("GPU {0} is already present in the set")]
    GpuOverlap(String),

    /// A GPU to be released is not part of the set.
    #[error("GPU {0} is not present in the set")]
    GpuNotHeld(String),

    /// A GPU set carries both local indices and hashes.
    #[error("GPU set mixes local indices and content hashes")]
    GpuMixedRepresentation,

    /// The GPU hasher produced the same hash for two devices.
    #[error("GPU hash {0} is produced by more than one device")]
    GpuDuplicateHash(String),

    /// The GPU hasher does not know a local device index.
    #[error("unknown GPU index {0}")]
    UnknownGpuIndex(u64),

    /// The subtrahend is not contained in the minuend.
    #[error("resources are not contained: {0}")]
    NotContained(Shortfall),

    /// Adding two vectors overflows a scalar dimension.
    #[error("resource overflow in {dimension}")]
    ResourceOverflow { dimension: &'static str },

    /// Used resources exceed the pool capacity.
    #[error("resource pool inconsistency: {reason}")]
    PoolInconsistency { reason: String },

    #[error("resources with ID {0} have already been consumed")]
    AlreadyConsumed(String),

    #[error("could not release resources with ID {0}: no such consumer")]
    UnknownConsumer(String),

    #[error("ask plan {0} not found")]
    UnknownAskPlan(String),

    /// No ask plan is recorded for the task.
    #[error("ask plan for task {0} is not found")]
    UnknownTask(String),

    // =================================================================
    // Collaborator / General Errors (9xx)
    // =================================================================
    #[error("order {0} not found")]
    OrderNotFound(OrderId),

    /// An external service (order store, registry, blacklist) failed.
    #[error("{service} failure: {reason}")]
    Collaborator {
        service: &'static str,
        reason: String,
    },

    #[error("internal error: {0}")]
    Internal(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("configuration error: {0}")]
    Configuration(String),
}

impl DealMatchError {
    /// Stable grep code for this error.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::AskTypeMismatch(_) => "DM_ERR_100",
            Self::BidTypeMismatch(_) => "DM_ERR_101",
            Self::AskInactive(_) => "DM_ERR_102",
            Self::BidInactive(_) => "DM_ERR_103",
            Self::PriceMismatch { .. } => "DM_ERR_104",
            Self::DurationMismatch { .. } => "DM_ERR_105",
            Self::NetFlagsMismatch { .. } => "DM_ERR_106",
            Self::BenchmarkMismatch { .. } => "DM_ERR_107",
            Self::InvalidOrder { .. } => "DM_ERR_108",
            Self::AskCounterpartyMismatch { .. } => "DM_ERR_200",
            Self::BidCounterpartyMismatch { .. } => "DM_ERR_201",
            Self::BidIdentityTooLow { .. } => "DM_ERR_202",
            Self::AskIdentityTooLow { .. } => "DM_ERR_203",
            Self::Blacklisted(_) => "DM_ERR_300",
            Self::BlacklistCheckFailed(_) => "DM_ERR_301",
            Self::GpuOverlap(_) => "DM_ERR_400",
            Self::GpuNotHeld(_) => "DM_ERR_401",
            Self::GpuMixedRepresentation => "DM_ERR_402",
            Self::GpuDuplicateHash(_) => "DM_ERR_403",
            Self::UnknownGpuIndex(_) => "DM_ERR_404",
            Self::NotContained(_) => "DM_ERR_405",
            Self::ResourceOverflow { .. } => "DM_ERR_406",
            Self::PoolInconsistency { .. } => "DM_ERR_407",
            Self::AlreadyConsumed(_) => "DM_ERR_408",
            Self::UnknownConsumer(_) => "DM_ERR_409",
            Self::UnknownAskPlan(_) => "DM_ERR_410",
            Self::UnknownTask(_) => "DM_ERR_411",
            Self::OrderNotFound(_) => "DM_ERR_900",
            Self::Collaborator { .. } => "DM_ERR_901",
            Self::Internal(_) => "DM_ERR_902",
            Self::Serialization(_) => "DM_ERR_903",
            Self::Configuration(_) => "DM_ERR_904",
        }
    }

    /// Whether this error is a matching-rule rejection rather than an
    /// infrastructure failure.
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::AskTypeMismatch(_)
                | Self::BidTypeMismatch(_)
                | Self::AskInactive(_)
                | Self::BidInactive(_)
                | Self::PriceMismatch { .. }
                | Self::DurationMismatch { .. }
                | Self::NetFlagsMismatch { .. }
                | Self::BenchmarkMismatch { .. }
                | Self::AskCounterpartyMismatch { .. }
                | Self::BidCounterpartyMismatch { .. }
                | Self::BidIdentityTooLow { .. }
                | Self::AskIdentityTooLow { .. }
                | Self::Blacklisted(_)
        )
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, DealMatchError>;

impl From<serde_json::Error> for DealMatchError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
