//! Benchmark vectors: per-dimension hardware performance scores.

use serde::{Deserialize, Serialize};

use crate::constants::MIN_NUM_BENCHMARKS;
use crate::{DealMatchError, Result};

/// Fixed-meaning vector of benchmark values.
///
/// Reading past the end yields `0`, so a short vector behaves as if padded
/// with zeros.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Benchmarks {
    pub values: Vec<u64>,
}

impl Benchmarks {
    #[must_use]
    pub fn new(values: Vec<u64>) -> Self {
        Self { values }
    }

    #[must_use]
    pub fn get(&self, idx: usize) -> u64 {
        self.values.get(idx).copied().unwrap_or(0)
    }

    /// Copy of the values, zero-padded or truncated to `target_size`.
    #[must_use]
    pub fn n_values(&self, target_size: usize) -> Vec<u64> {
        (0..target_size).map(|idx| self.get(idx)).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn validate(&self, min: usize) -> Result<()> {
        if self.values.len() < min {
            return Err(DealMatchError::InvalidOrder {
                reason: format!(
                    "expected at least {min} benchmarks, got {}",
                    self.values.len()
                ),
            });
        }
        Ok(())
    }

    /// Validate against the marketplace minimum.
    pub fn validate_default(&self) -> Result<()> {
        self.validate(MIN_NUM_BENCHMARKS)
    }

    #[must_use]
    pub fn cpu_sysbench_multi(&self) -> u64 {
        self.get(0)
    }

    #[must_use]
    pub fn cpu_sysbench_one(&self) -> u64 {
        self.get(1)
    }

    #[must_use]
    pub fn cpu_cores(&self) -> u64 {
        self.get(2)
    }

    #[must_use]
    pub fn ram_size(&self) -> u64 {
        self.get(3)
    }

    #[must_use]
    pub fn storage_size(&self) -> u64 {
        self.get(4)
    }

    #[must_use]
    pub fn net_traffic_in(&self) -> u64 {
        self.get(5)
    }

    #[must_use]
    pub fn net_traffic_out(&self) -> u64 {
        self.get(6)
    }

    #[must_use]
    pub fn gpu_count(&self) -> u64 {
        self.get(7)
    }

    #[must_use]
    pub fn gpu_mem(&self) -> u64 {
        self.get(8)
    }

    #[must_use]
    pub fn gpu_eth_hashrate(&self) -> u64 {
        self.get(9)
    }

    #[must_use]
    pub fn gpu_cash_hashrate(&self) -> u64 {
        self.get(10)
    }

    #[must_use]
    pub fn gpu_redshift(&self) -> u64 {
        self.get(11)
    }
}

impl From<Vec<u64>> for Benchmarks {
    fn from(values: Vec<u64>) -> Self {
        Self { values }
    }
}
