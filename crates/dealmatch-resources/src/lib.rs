//! # dealmatch-resources
//!
//! Worker-side resource accounting on top of [`ResourceVector`] arithmetic.
//!
//! 1. **ResourcePool**: a capacity plus a ledger of consumed vectors keyed
//!    by consumer ID (ask plans, tasks)
//! 2. **PlanPool**: ask plans split into spot and forward sets, with
//!    spot ejection when a plan is committed to a deal
//! 3. **Scheduler**: the plan pool plus one task pool per ask plan
//! 4. **DeviceGpuHasher**: turns worker-local GPU indices into content
//!    hashes that can be compared across workers
//!
//! ```text
//! hardware → DeviceGpuHasher ─┐
//!                             ▼
//! capacity ──────────→ Scheduler.consume(plan) → make_room_and_commit(plan)
//!                             │
//!                             └→ plan task pool → consume_task() / release_task()
//! ```
//!
//! [`ResourceVector`]: dealmatch_types::ResourceVector

pub mod hasher;
pub mod plan_pool;
pub mod pool;
pub mod scheduler;

pub use hasher::{DeviceGpuHasher, GpuDevice};
pub use plan_pool::PlanPool;
pub use pool::ResourcePool;
pub use scheduler::Scheduler;
