//! # dealmatch-matcher
//!
//! **Deal matching**: decides whether an ASK/BID pair may become a deal and,
//! if so, asks the order ledger to open it.
//!
//! ## Architecture
//!
//! - **store**: async collaborator traits (`OrderStore`, `ProfileRegistry`,
//!   `BlacklistStore`)
//! - **multi**: concurrent batch lookups over those traits
//! - **blacklist**: `BlacklistVerifier`, seven concurrent fail-fast lookups
//! - **matcher**: `DealMatcher`, the twelve-step compatibility pipeline
//! - **memory**: in-memory collaborators for tests and simulation
//!
//! ## Flow
//!
//! ```text
//! open_deal → fetch orders → terms → benchmarks → masters → counterparties
//!           → identities → blacklists → OrderStore::open_deal
//! ```
//!
//! Lookups inside one stage run concurrently; stages run in sequence.

pub mod blacklist;
pub mod matcher;
pub mod memory;
pub mod multi;
pub mod store;

pub use blacklist::BlacklistVerifier;
pub use matcher::DealMatcher;
pub use memory::{InMemoryBlacklistStore, InMemoryOrderStore, InMemoryProfileRegistry};
pub use store::{BlacklistStore, OrderStore, ProfileRegistry};
