//! # dealmatch-types
//!
//! Shared types, errors, and configuration for the **DealMatch** compute
//! marketplace core.
//!
//! This crate is the leaf dependency of the workspace; every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`OrderId`], [`DealId`], [`AccountId`]
//! - **Order model**: [`Order`], [`OrderType`], [`OrderStatus`], [`IdentityLevel`]
//! - **Matching attributes**: [`NetFlags`], [`Benchmarks`]
//! - **Resource accounting**: [`ResourceVector`], [`GpuSet`], [`Shortfall`], [`GpuHasher`]
//! - **Worker plans**: [`AskPlan`]
//! - **Deal model**: [`Deal`]
//! - **Blacklist verdict**: [`BlacklistVerdict`], [`BlacklistParties`]
//! - **Configuration**: [`MarketConfig`], [`PoolConfig`]
//! - **Errors**: [`DealMatchError`] with `DM_ERR_` codes
//! - **Constants**: marketplace-wide limits and defaults

pub mod benchmarks;
pub mod blacklist;
pub mod config;
pub mod constants;
pub mod deal;
pub mod error;
pub mod gpu;
pub mod ids;
pub mod netflags;
pub mod order;
pub mod plan;
pub mod resources;

// Re-export all primary types at crate root for ergonomic imports:
//   use dealmatch_types::{Order, OrderType, ResourceVector, GpuSet, ...};

pub use benchmarks::*;
pub use blacklist::*;
pub use config::*;
pub use deal::*;
pub use error::*;
pub use gpu::*;
pub use ids::*;
pub use netflags::*;
pub use order::*;
pub use plan::*;
pub use resources::*;

// Constants are accessed via `dealmatch_types::constants::FOO`
// (not re-exported to avoid name collisions).
