//! GPU inventory as a set of device identities.
//!
//! A freshly enumerated set names devices by their worker-local index.
//! Local indices are meaningless on any other machine, so before a set is
//! published or compared across workers it is *normalized*: every index is
//! replaced by a content hash obtained from a [`GpuHasher`].
//!
//! A set holds exactly one representation at a time. Sets carrying both
//! indices and hashes are rejected by [`GpuSet::validate`] and by every
//! arithmetic operation.

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::{DealMatchError, Result};

/// Maps worker-local GPU indices to globally comparable content hashes.
///
/// Supplied by the hardware inventory subsystem.
pub trait GpuHasher: Send + Sync {
    /// Hash each index, preserving input order.
    fn hash_gpu(&self, indices: &[u64]) -> Result<Vec<String>>;
}

/// A set of GPU devices, identified by local index or by content hash.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GpuSet {
    /// Worker-local device indices. Must not leave the worker.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub indices: BTreeSet<u64>,
    /// Content hashes of normalized devices.
    #[serde(default, skip_serializing_if = "HashSet::is_empty")]
    pub hashes: HashSet<String>,
}

impl GpuSet {
    /// Un-normalized set of local device indices.
    pub fn from_indices(indices: impl IntoIterator<Item = u64>) -> Self {
        Self {
            indices: indices.into_iter().collect(),
            hashes: HashSet::new(),
        }
    }

    /// Normalized set of device hashes.
    pub fn from_hashes<S: Into<String>>(hashes: impl IntoIterator<Item = S>) -> Self {
        Self {
            indices: BTreeSet::new(),
            hashes: hashes.into_iter().map(Into::into).collect(),
        }
    }

    /// A set is normalized iff it carries no local indices.
    #[must_use]
    pub fn is_normalized(&self) -> bool {
        self.indices.is_empty()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty() && self.hashes.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.indices.len() + self.hashes.len()
    }

    /// Hashes in lexicographic order, for stable display and logging.
    #[must_use]
    pub fn sorted_hashes(&self) -> Vec<&str> {
        let mut hashes: Vec<&str> = self.hashes.iter().map(String::as_str).collect();
        hashes.sort_unstable();
        hashes
    }

    pub fn validate(&self) -> Result<()> {
        if !self.indices.is_empty() && !self.hashes.is_empty() {
            return Err(DealMatchError::GpuMixedRepresentation);
        }
        Ok(())
    }

    /// Union. Fails without modifying `self` if any device of `other` is
    /// already present.
    pub fn add(&mut self, other: &Self) -> Result<()> {
        self.validate()?;
        other.validate()?;
        let self_local = !self.indices.is_empty();
        let self_hashed = !self.hashes.is_empty();
        if (self_local && !other.hashes.is_empty()) || (self_hashed && !other.indices.is_empty()) {
            return Err(DealMatchError::GpuMixedRepresentation);
        }

        if let Some(idx) = other.indices.iter().find(|idx| self.indices.contains(*idx)) {
            return Err(DealMatchError::GpuOverlap(format!("#{idx}")));
        }
        if let Some(hash) = other.hashes.iter().find(|hash| self.hashes.contains(*hash)) {
            return Err(DealMatchError::GpuOverlap(hash.clone()));
        }

        self.indices.extend(other.indices.iter().copied());
        self.hashes.extend(other.hashes.iter().cloned());
        Ok(())
    }

    /// Difference. Fails without modifying `self` unless `other` is a subset.
    pub fn sub(&mut self, other: &Self) -> Result<()> {
        self.validate()?;
        other.validate()?;

        if let Some(idx) = other.indices.iter().find(|idx| !self.indices.contains(*idx)) {
            return Err(DealMatchError::GpuNotHeld(format!("#{idx}")));
        }
        if let Some(hash) = other.hashes.iter().find(|hash| !self.hashes.contains(*hash)) {
            return Err(DealMatchError::GpuNotHeld(hash.clone()));
        }

        for idx in &other.indices {
            self.indices.remove(idx);
        }
        for hash in &other.hashes {
            self.hashes.remove(hash);
        }
        Ok(())
    }

    /// True iff every device of `other` is present in `self`.
    #[must_use]
    pub fn contains(&self, other: &Self) -> bool {
        other.indices.is_subset(&self.indices) && other.hashes.is_subset(&self.hashes)
    }

    /// Replace local indices with content hashes. No-op on a normalized set.
    pub fn normalize(&mut self, hasher: &dyn GpuHasher) -> Result<()> {
        self.validate()?;
        if self.is_normalized() {
            return Ok(());
        }

        let indices: Vec<u64> = self.indices.iter().copied().collect();
        let hashes = hasher.hash_gpu(&indices)?;
        if hashes.len() != indices.len() {
            return Err(DealMatchError::Internal(format!(
                "GPU hasher returned {} hashes for {} devices",
                hashes.len(),
                indices.len()
            )));
        }

        let mut normalized = HashSet::with_capacity(hashes.len());
        for hash in hashes {
            if normalized.contains(&hash) {
                return Err(DealMatchError::GpuDuplicateHash(hash));
            }
            normalized.insert(hash);
        }

        self.hashes = normalized;
        self.indices.clear();
        Ok(())
    }
}
