//! Content hashing of GPU devices.
//!
//! A device hash depends only on what the hardware *is* (vendor, model,
//! memory, bus position), never on the order in which the worker happened
//! to enumerate it. Two workers reporting the same card produce the same
//! hash.

use std::collections::BTreeMap;

use dealmatch_types::constants::GPU_HASH_DOMAIN;
use dealmatch_types::{DealMatchError, GpuHasher, GpuSet, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A GPU as reported by the worker's hardware inventory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GpuDevice {
    /// Bus position, e.g. `PCI:0001:0`.
    pub pci_id: String,
    pub vendor_id: u64,
    #[serde(default)]
    pub vendor_name: String,
    pub device_id: u64,
    #[serde(default)]
    pub device_name: String,
    /// Memory in bytes.
    pub memory: u64,
    /// Cached content hash. Ignored when hashing.
    #[serde(default)]
    pub hash: String,
}

impl GpuDevice {
    /// Hex-encoded SHA-256 over the identifying fields.
    #[must_use]
    pub fn content_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(GPU_HASH_DOMAIN);
        hasher.update(self.vendor_id.to_le_bytes());
        hasher.update(self.device_id.to_le_bytes());
        hasher.update(self.memory.to_le_bytes());
        hasher.update((self.pci_id.len() as u64).to_le_bytes());
        hasher.update(self.pci_id.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Recompute and store [`GpuDevice::hash`].
    pub fn fill_hash(&mut self) {
        self.hash = self.content_hash();
    }
}

/// [`GpuHasher`] backed by the worker's device inventory.
#[derive(Debug, Clone, Default)]
pub struct DeviceGpuHasher {
    devices: BTreeMap<u64, GpuDevice>,
}

impl DeviceGpuHasher {
    /// Index devices by their enumeration position.
    #[must_use]
    pub fn new(devices: Vec<GpuDevice>) -> Self {
        Self {
            devices: (0u64..).zip(devices).collect(),
        }
    }

    /// Index devices explicitly.
    pub fn with_indices(devices: impl IntoIterator<Item = (u64, GpuDevice)>) -> Self {
        Self {
            devices: devices.into_iter().collect(),
        }
    }

    /// Load an inventory from a JSON array of devices.
    pub fn from_json(data: &str) -> Result<Self> {
        let devices: Vec<GpuDevice> = serde_json::from_str(data)?;
        Ok(Self::new(devices))
    }

    #[must_use]
    pub fn device(&self, index: u64) -> Option<&GpuDevice> {
        self.devices.get(&index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Un-normalized set naming every known device.
    #[must_use]
    pub fn all_devices(&self) -> GpuSet {
        GpuSet::from_indices(self.devices.keys().copied())
    }
}

impl GpuHasher for DeviceGpuHasher {
    fn hash_gpu(&self, indices: &[u64]) -> Result<Vec<String>> {
        indices
            .iter()
            .map(|idx| {
                self.devices
                    .get(idx)
                    .map(GpuDevice::content_hash)
                    .ok_or(DealMatchError::UnknownGpuIndex(*idx))
            })
            .collect()
    }
}
