//! Network capability flags carried by orders and resource vectors.
//!
//! Bit layout: bit 0 = overlay, bit 1 = outbound, bit 2 = incoming.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::NET_FLAGS_COUNT;

const OVERLAY: u64 = 1 << 0;
const OUTBOUND: u64 = 1 << 1;
const INCOMING: u64 = 1 << 2;

/// 3-bit network capability vector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NetFlags {
    pub flags: u64,
}

impl NetFlags {
    #[must_use]
    pub fn new(flags: u64) -> Self {
        Self { flags }
    }

    /// Build from `[overlay, outbound, incoming]`. Missing trailing entries
    /// are treated as `false`, extra entries are ignored.
    #[must_use]
    pub fn from_bool_slice(values: &[bool]) -> Self {
        let flags = values
            .iter()
            .take(NET_FLAGS_COUNT)
            .enumerate()
            .filter(|(_, set)| **set)
            .fold(0u64, |acc, (bit, _)| acc | (1 << bit));
        Self { flags }
    }

    #[must_use]
    pub fn to_bool_slice(self) -> [bool; NET_FLAGS_COUNT] {
        [self.overlay(), self.outbound(), self.incoming()]
    }

    #[must_use]
    pub fn overlay(self) -> bool {
        self.flags & OVERLAY != 0
    }

    #[must_use]
    pub fn outbound(self) -> bool {
        self.flags & OUTBOUND != 0
    }

    #[must_use]
    pub fn incoming(self) -> bool {
        self.flags & INCOMING != 0
    }

    #[must_use]
    pub fn with_overlay(self, value: bool) -> Self {
        self.with_bit(OVERLAY, value)
    }

    #[must_use]
    pub fn with_outbound(self, value: bool) -> Self {
        self.with_bit(OUTBOUND, value)
    }

    #[must_use]
    pub fn with_incoming(self, value: bool) -> Self {
        self.with_bit(INCOMING, value)
    }

    /// `rhs → self` for every flag: true iff everything `rhs` requires is
    /// offered by `self`.
    #[must_use]
    pub fn converse_implication(self, rhs: Self) -> bool {
        rhs.flags & !self.flags & (OVERLAY | OUTBOUND | INCOMING) == 0
    }

    fn with_bit(self, bit: u64, value: bool) -> Self {
        if value {
            Self {
                flags: self.flags | bit,
            }
        } else {
            Self {
                flags: self.flags & !bit,
            }
        }
    }
}

impl fmt::Display for NetFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [overlay, outbound, incoming] = self.to_bool_slice();
        write!(f, "[{overlay} {outbound} {incoming}]")
    }
}
