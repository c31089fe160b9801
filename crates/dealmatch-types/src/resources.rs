//! Multi-dimensional resource vectors and their bin-packing arithmetic.
//!
//! A [`ResourceVector`] describes a bundle of worker capacity: CPU, RAM,
//! storage, GPUs and network. Vectors are added when plans are combined,
//! subtracted when capacity is handed out, and compared with
//! [`ResourceVector::check_contains`] to decide whether a request fits.
//!
//! ## Network flags
//!
//! Capability flags combine with logical AND: a sum of two vectors can
//! serve a request only if both parts could. Subtraction keeps the
//! receiver's flags and does not require the operand's flags to be
//! offered: handing out capacity does not revoke a capability. The zero
//! vector is the identity for `add`: adding it, or adding to it, leaves
//! the other operand unchanged, flags included.
//!
//! Flags are therefore lossy under `add` then `sub`: scalars and GPUs are
//! restored exactly, while the flags stay at the AND of both operands.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{DealMatchError, GpuHasher, GpuSet, NetFlags, Result};

/// Network part of a resource vector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkResources {
    /// Incoming throughput, bits per second.
    pub throughput_in: u64,
    /// Outbound throughput, bits per second.
    pub throughput_out: u64,
    pub net_flags: NetFlags,
}

/// A bundle of worker capacity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceVector {
    /// CPU share; 100 is one full core.
    pub cpu_core_percents: u64,
    pub ram_bytes: u64,
    pub storage_bytes: u64,
    pub gpu: GpuSet,
    pub network: NetworkResources,
}

/// First dimension along which a vector fails to contain another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shortfall {
    Cpu { required: u64, available: u64 },
    Ram { required: u64, available: u64 },
    Storage { required: u64, available: u64 },
    Gpu,
    IncomingNotAllowed,
    OutboundNotAllowed,
    OverlayNotAllowed,
    ThroughputIn { required: u64, available: u64 },
    ThroughputOut { required: u64, available: u64 },
}

impl fmt::Display for Shortfall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cpu {
                required,
                available,
            } => write!(
                f,
                "not enough CPU: required {required} core-percent, available {available}"
            ),
            Self::Ram {
                required,
                available,
            } => write!(
                f,
                "not enough RAM: required {required} bytes, available {available}"
            ),
            Self::Storage {
                required,
                available,
            } => write!(
                f,
                "not enough storage: required {required} bytes, available {available}"
            ),
            Self::Gpu => write!(f, "required GPUs are not a subset of available GPUs"),
            Self::IncomingNotAllowed => {
                write!(f, "incoming connections are required but not allowed")
            }
            Self::OutboundNotAllowed => {
                write!(f, "outbound connections are required but not allowed")
            }
            Self::OverlayNotAllowed => {
                write!(f, "overlay networking is required but not allowed")
            }
            Self::ThroughputIn {
                required,
                available,
            } => write!(
                f,
                "not enough incoming throughput: required {required} bit/s, available {available}"
            ),
            Self::ThroughputOut {
                required,
                available,
            } => write!(
                f,
                "not enough outbound throughput: required {required} bit/s, available {available}"
            ),
        }
    }
}

fn checked(lhs: u64, rhs: u64, dimension: &'static str) -> Result<u64> {
    lhs.checked_add(rhs)
        .ok_or(DealMatchError::ResourceOverflow { dimension })
}

impl ResourceVector {
    /// True for the additive identity: no capacity, no GPUs, no flags.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }

    #[must_use]
    pub fn is_normalized(&self) -> bool {
        self.gpu.is_normalized()
    }

    /// Normalize the GPU set through `hasher`.
    pub fn normalize(&mut self, hasher: &dyn GpuHasher) -> Result<()> {
        self.gpu.normalize(hasher)
    }

    /// Component-wise sum. Leaves `self` untouched on error.
    pub fn add(&mut self, other: &Self) -> Result<()> {
        if other.is_zero() {
            return Ok(());
        }
        if self.is_zero() {
            other.gpu.validate()?;
            *self = other.clone();
            return Ok(());
        }

        let cpu = checked(self.cpu_core_percents, other.cpu_core_percents, "cpu")?;
        let ram = checked(self.ram_bytes, other.ram_bytes, "ram")?;
        let storage = checked(self.storage_bytes, other.storage_bytes, "storage")?;
        let throughput_in = checked(
            self.network.throughput_in,
            other.network.throughput_in,
            "throughput_in",
        )?;
        let throughput_out = checked(
            self.network.throughput_out,
            other.network.throughput_out,
            "throughput_out",
        )?;
        let mut gpu = self.gpu.clone();
        gpu.add(&other.gpu)?;

        self.cpu_core_percents = cpu;
        self.ram_bytes = ram;
        self.storage_bytes = storage;
        self.gpu = gpu;
        self.network = NetworkResources {
            throughput_in,
            throughput_out,
            net_flags: NetFlags::new(self.network.net_flags.flags & other.network.net_flags.flags),
        };
        Ok(())
    }

    /// Component-wise difference. Fails unless `self` has at least as much
    /// of every scalar and holds every GPU of `other`; network flags are
    /// not compared. Leaves `self` untouched on error.
    pub fn sub(&mut self, other: &Self) -> Result<()> {
        self.check_capacity(other)
            .map_err(DealMatchError::NotContained)?;

        let mut gpu = self.gpu.clone();
        gpu.sub(&other.gpu)?;

        self.cpu_core_percents -= other.cpu_core_percents;
        self.ram_bytes -= other.ram_bytes;
        self.storage_bytes -= other.storage_bytes;
        self.gpu = gpu;
        self.network.throughput_in -= other.network.throughput_in;
        self.network.throughput_out -= other.network.throughput_out;
        Ok(())
    }

    /// Whether `self` has at least as much capacity as `other` along every
    /// dimension and offers every network capability `other` requires.
    ///
    /// Dimensions are checked in a fixed order and the first failing one is
    /// reported.
    pub fn check_contains(&self, other: &Self) -> std::result::Result<(), Shortfall> {
        self.compare(other, true)
    }

    /// Like [`check_contains`](Self::check_contains), but ignores network
    /// flags: only scalars and GPUs are compared.
    pub fn check_capacity(&self, other: &Self) -> std::result::Result<(), Shortfall> {
        self.compare(other, false)
    }

    fn compare(&self, other: &Self, with_flags: bool) -> std::result::Result<(), Shortfall> {
        if self.cpu_core_percents < other.cpu_core_percents {
            return Err(Shortfall::Cpu {
                required: other.cpu_core_percents,
                available: self.cpu_core_percents,
            });
        }
        if self.ram_bytes < other.ram_bytes {
            return Err(Shortfall::Ram {
                required: other.ram_bytes,
                available: self.ram_bytes,
            });
        }
        if self.storage_bytes < other.storage_bytes {
            return Err(Shortfall::Storage {
                required: other.storage_bytes,
                available: self.storage_bytes,
            });
        }
        if !self.gpu.contains(&other.gpu) {
            return Err(Shortfall::Gpu);
        }

        if with_flags {
            let offered = self.network.net_flags;
            let required = other.network.net_flags;
            if required.incoming() && !offered.incoming() {
                return Err(Shortfall::IncomingNotAllowed);
            }
            if required.outbound() && !offered.outbound() {
                return Err(Shortfall::OutboundNotAllowed);
            }
            if required.overlay() && !offered.overlay() {
                return Err(Shortfall::OverlayNotAllowed);
            }
        }

        if self.network.throughput_in < other.network.throughput_in {
            return Err(Shortfall::ThroughputIn {
                required: other.network.throughput_in,
                available: self.network.throughput_in,
            });
        }
        if self.network.throughput_out < other.network.throughput_out {
            return Err(Shortfall::ThroughputOut {
                required: other.network.throughput_out,
                available: self.network.throughput_out,
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn contains(&self, other: &Self) -> bool {
        self.check_contains(other).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GIB: u64 = 1024 * 1024 * 1024;

    fn vector(cpu: u64, ram_gib: u64, gpus: &[&str], flags: u64) -> ResourceVector {
        ResourceVector {
            cpu_core_percents: cpu,
            ram_bytes: ram_gib * GIB,
            storage_bytes: 10 * GIB,
            gpu: GpuSet::from_hashes(gpus.iter().copied()),
            network: NetworkResources {
                throughput_in: 25_000_000,
                throughput_out: 40_000_000,
                net_flags: NetFlags::new(flags),
            },
        }
    }

    #[test]
    fn add_sums_scalars_and_unions_gpus() {
        let mut lhs = vector(150, 2, &["a"], 7);
        lhs.add(&vector(50, 1, &["b"], 7)).unwrap();
        assert_eq!(lhs.cpu_core_percents, 200);
        assert_eq!(lhs.ram_bytes, 3 * GIB);
        assert_eq!(lhs.storage_bytes, 20 * GIB);
        assert_eq!(lhs.network.throughput_in, 50_000_000);
        assert_eq!(lhs.gpu.sorted_hashes(), vec!["a", "b"]);
    }

    #[test]
    fn add_ands_network_flags() {
        let mut lhs = vector(100, 1, &[], 0b111);
        lhs.add(&vector(100, 1, &[], 0b011)).unwrap();
        assert_eq!(lhs.network.net_flags, NetFlags::new(0b011));
    }

    #[test]
    fn zero_is_additive_identity() {
        let original = vector(100, 1, &["a"], 0b101);

        let mut lhs = original.clone();
        lhs.add(&ResourceVector::default()).unwrap();
        assert_eq!(lhs, original);

        let mut zero = ResourceVector::default();
        zero.add(&original).unwrap();
        assert_eq!(zero, original);
    }

    #[test]
    fn add_overlapping_gpu_fails_atomically() {
        let mut lhs = vector(100, 1, &["a", "b"], 7);
        let before = lhs.clone();
        let err = lhs.add(&vector(100, 1, &["b"], 7)).unwrap_err();
        assert_eq!(err, DealMatchError::GpuOverlap("b".into()));
        assert_eq!(lhs, before);
    }

    #[test]
    fn add_overflow_fails() {
        let mut lhs = vector(u64::MAX, 1, &[], 7);
        let err = lhs.add(&vector(1, 1, &[], 7)).unwrap_err();
        assert_eq!(err, DealMatchError::ResourceOverflow { dimension: "cpu" });
    }

    #[test]
    fn add_then_sub_roundtrips() {
        let original = vector(150, 2, &["a", "b"], 0b110);
        let operand = vector(50, 1, &["c"], 0b110);
        let mut v = original.clone();
        v.add(&operand).unwrap();
        v.sub(&operand).unwrap();
        assert_eq!(v, original);
    }

    #[test]
    fn add_then_sub_with_differing_flags_restores_scalars() {
        let original = vector(100, 1, &["a"], 0b001);
        let operand = vector(50, 1, &["b"], 0b100);
        let mut v = original.clone();
        v.add(&operand).unwrap();
        assert_eq!(v.network.net_flags, NetFlags::new(0));

        v.sub(&operand).unwrap();
        assert_eq!(v.cpu_core_percents, 100);
        assert_eq!(v.ram_bytes, GIB);
        assert_eq!(v.storage_bytes, original.storage_bytes);
        assert_eq!(v.gpu, original.gpu);
        assert_eq!(v.network.throughput_in, original.network.throughput_in);
        assert_eq!(v.network.throughput_out, original.network.throughput_out);
        // Flags stay at the AND of both operands.
        assert_eq!(v.network.net_flags, NetFlags::new(0));
    }

    #[test]
    fn capacity_check_skips_flags() {
        let available = vector(100, 1, &[], 0b000);
        let required = vector(100, 1, &[], 0b111);
        assert_eq!(
            available.check_contains(&required),
            Err(Shortfall::IncomingNotAllowed)
        );
        assert_eq!(available.check_capacity(&required), Ok(()));
    }

    #[test]
    fn sub_ignores_operand_flags() {
        let mut lhs = vector(200, 2, &[], 0b000);
        lhs.sub(&vector(100, 1, &[], 0b111)).unwrap();
        assert_eq!(lhs.cpu_core_percents, 100);
        assert_eq!(lhs.network.net_flags, NetFlags::new(0));
    }

    #[test]
    fn sub_not_contained_fails_with_reason() {
        let mut lhs = vector(100, 1, &[], 7);
        let err = lhs.sub(&vector(150, 1, &[], 7)).unwrap_err();
        assert_eq!(
            err,
            DealMatchError::NotContained(Shortfall::Cpu {
                required: 150,
                available: 100
            })
        );
        assert_eq!(lhs.cpu_core_percents, 100);
    }

    #[test]
    fn sub_keeps_receiver_flags() {
        let mut lhs = vector(200, 2, &[], 0b111);
        lhs.sub(&vector(100, 1, &[], 0b001)).unwrap();
        assert_eq!(lhs.network.net_flags, NetFlags::new(0b111));
        assert_eq!(lhs.cpu_core_percents, 100);
    }

    #[test]
    fn larger_vector_contains_smaller() {
        let big = vector(400, 8, &["a", "b"], 7);
        let small = vector(100, 1, &["a"], 1);
        assert!(big.contains(&small));
        assert!(!small.contains(&big));
        assert!(big.contains(&big));
    }

    #[test]
    fn contains_reports_dimensions_in_order() {
        let available = vector(100, 1, &["a"], 0b000);

        let mut required = available.clone();
        required.cpu_core_percents = 101;
        required.ram_bytes = 2 * GIB;
        assert!(matches!(
            available.check_contains(&required),
            Err(Shortfall::Cpu { .. })
        ));

        let mut required = available.clone();
        required.ram_bytes = 2 * GIB;
        assert!(matches!(
            available.check_contains(&required),
            Err(Shortfall::Ram { .. })
        ));

        let mut required = available.clone();
        required.storage_bytes += 1;
        assert!(matches!(
            available.check_contains(&required),
            Err(Shortfall::Storage { .. })
        ));

        let mut required = available.clone();
        required.gpu = GpuSet::from_hashes(["z"]);
        assert_eq!(available.check_contains(&required), Err(Shortfall::Gpu));

        let mut required = available.clone();
        required.network.net_flags = NetFlags::new(0b111);
        assert_eq!(
            available.check_contains(&required),
            Err(Shortfall::IncomingNotAllowed)
        );
        required.network.net_flags = NetFlags::new(0b011);
        assert_eq!(
            available.check_contains(&required),
            Err(Shortfall::OutboundNotAllowed)
        );
        required.network.net_flags = NetFlags::new(0b001);
        assert_eq!(
            available.check_contains(&required),
            Err(Shortfall::OverlayNotAllowed)
        );

        let mut required = available.clone();
        required.network.throughput_in += 1;
        required.network.throughput_out += 1;
        assert!(matches!(
            available.check_contains(&required),
            Err(Shortfall::ThroughputIn { .. })
        ));
        required.network.throughput_in -= 1;
        assert!(matches!(
            available.check_contains(&required),
            Err(Shortfall::ThroughputOut { .. })
        ));
    }

    #[test]
    fn offered_flag_not_required_is_fine() {
        let available = vector(100, 1, &[], 0b100);
        let required = vector(100, 1, &[], 0b000);
        assert!(available.contains(&required));
    }

    #[test]
    fn shortfall_display() {
        let reason = Shortfall::Ram {
            required: 2,
            available: 1,
        };
        assert_eq!(
            reason.to_string(),
            "not enough RAM: required 2 bytes, available 1"
        );
    }

    #[test]
    fn normalization_delegates_to_gpu_set() {
        struct Hasher;
        impl GpuHasher for Hasher {
            fn hash_gpu(&self, indices: &[u64]) -> Result<Vec<String>> {
                Ok(indices.iter().map(|idx| format!("h{idx}")).collect())
            }
        }

        let mut v = ResourceVector {
            gpu: GpuSet::from_indices([3, 5]),
            ..ResourceVector::default()
        };
        assert!(!v.is_normalized());
        v.normalize(&Hasher).unwrap();
        assert!(v.is_normalized());
        assert_eq!(v.gpu.sorted_hashes(), vec!["h3", "h5"]);
    }
}
