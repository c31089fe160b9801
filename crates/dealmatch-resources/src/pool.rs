//! Resource pool for worker-side capacity accounting.
//!
//! Tracks a fixed capacity and the vectors handed out from it, keyed by
//! consumer ID. All mutations are atomic: either the full operation
//! succeeds or the pool is unchanged.

use std::collections::BTreeMap;

use dealmatch_types::{DealMatchError, GpuHasher, PoolConfig, ResourceVector, Result};
use tracing::debug;

/// Capacity plus a ledger of consumed resources.
///
/// Free capacity is never stored; it is recomputed from the capacity and
/// the ledger on every query, so the two cannot drift apart.
#[derive(Debug, Clone, Default)]
pub struct ResourcePool {
    all: ResourceVector,
    used: BTreeMap<String, ResourceVector>,
}

impl ResourcePool {
    /// Create an empty pool over `all`.
    #[must_use]
    pub fn new(all: ResourceVector) -> Self {
        Self {
            all,
            used: BTreeMap::new(),
        }
    }

    /// Create a pool, normalizing its GPUs first if `config` asks for it.
    pub fn with_config(
        all: ResourceVector,
        config: &PoolConfig,
        hasher: &dyn GpuHasher,
    ) -> Result<Self> {
        let mut pool = Self::new(all);
        if config.normalize_on_create {
            pool.normalize(hasher)?;
        }
        Ok(pool)
    }

    /// Total capacity.
    #[must_use]
    pub fn capacity(&self) -> &ResourceVector {
        &self.all
    }

    /// Resources recorded for `id`, if any.
    #[must_use]
    pub fn consumed(&self, id: &str) -> Option<&ResourceVector> {
        self.used.get(id)
    }

    /// Number of recorded consumers.
    #[must_use]
    pub fn consumer_count(&self) -> usize {
        self.used.len()
    }

    /// Sum of every recorded vector.
    pub fn usage(&self) -> Result<ResourceVector> {
        let mut sum = ResourceVector::default();
        for resources in self.used.values() {
            sum.add(resources)?;
        }
        Ok(sum)
    }

    /// Capacity minus usage.
    ///
    /// # Errors
    /// Returns `PoolInconsistency` if usage exceeds the capacity.
    pub fn free(&self) -> Result<ResourceVector> {
        let usage = self.usage()?;
        let mut free = self.all.clone();
        free.sub(&usage)
            .map_err(|err| DealMatchError::PoolInconsistency {
                reason: format!("used resources are greater than available for scheduling ({err})"),
            })?;
        Ok(free)
    }

    /// Check whether `resources` would fit, without recording anything.
    pub fn poll_consume(&self, resources: &ResourceVector) -> Result<()> {
        let free = self.free()?;
        free.check_contains(resources)
            .map_err(DealMatchError::NotContained)
    }

    /// Record `resources` under `id`. Does nothing on error.
    ///
    /// # Errors
    /// Returns `NotContained` if the pool cannot fit `resources`, or
    /// `AlreadyConsumed` if `id` is already recorded.
    pub fn consume(&mut self, id: &str, resources: ResourceVector) -> Result<()> {
        self.poll_consume(&resources)?;
        if self.used.contains_key(id) {
            return Err(DealMatchError::AlreadyConsumed(id.to_string()));
        }

        debug!(
            consumer = id,
            cpu = resources.cpu_core_percents,
            ram = resources.ram_bytes,
            gpus = resources.gpu.len(),
            "Resources consumed"
        );
        self.used.insert(id.to_string(), resources);
        Ok(())
    }

    /// Drop the record for `id`, returning what it held.
    ///
    /// # Errors
    /// Returns `UnknownConsumer` if `id` is not recorded.
    pub fn release(&mut self, id: &str) -> Result<ResourceVector> {
        let released = self
            .used
            .remove(id)
            .ok_or_else(|| DealMatchError::UnknownConsumer(id.to_string()))?;
        debug!(consumer = id, "Resources released");
        Ok(released)
    }

    /// Normalize the capacity and every recorded vector.
    pub fn normalize(&mut self, hasher: &dyn GpuHasher) -> Result<()> {
        let mut all = self.all.clone();
        all.normalize(hasher)?;
        let mut used = self.used.clone();
        for resources in used.values_mut() {
            resources.normalize(hasher)?;
        }

        self.all = all;
        self.used = used;
        Ok(())
    }
}
