//! Identifiers used throughout DealMatch.
//!
//! Order IDs are ledger-assigned sequence numbers, deal IDs are UUIDv7, and
//! accounts are 20-byte addresses.

use std::fmt;
use std::str::FromStr;

use ed25519_dalek::VerifyingKey;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::constants::ACCOUNT_ID_LEN;
use crate::{DealMatchError, Result};

// ---------------------------------------------------------------------------
// OrderId
// ---------------------------------------------------------------------------

/// Ledger-assigned order identifier.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize,
)]
pub struct OrderId(pub u64);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// DealId
// ---------------------------------------------------------------------------

/// Globally unique deal identifier. Uses UUIDv7 for time-ordered sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct DealId(pub Uuid);

impl DealId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for DealId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DealId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "deal:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// AccountId
// ---------------------------------------------------------------------------

/// A 20-byte account address.
///
/// The all-zero address is the "any account" value: an order whose
/// counterparty is zero accepts every counterparty.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize,
)]
pub struct AccountId(pub [u8; ACCOUNT_ID_LEN]);

impl AccountId {
    /// The "any account" address.
    pub const ZERO: Self = Self([0u8; ACCOUNT_ID_LEN]);

    /// Account controlled by an ed25519 key: the first 20 bytes of the
    /// SHA-256 of the public key.
    #[must_use]
    pub fn from_verifying_key(key: &VerifyingKey) -> Self {
        let hash = Sha256::digest(key.as_bytes());
        let mut bytes = [0u8; ACCOUNT_ID_LEN];
        bytes.copy_from_slice(&hash[..ACCOUNT_ID_LEN]);
        Self(bytes)
    }

    /// Address whose low-order bytes encode `value` (big-endian).
    #[must_use]
    pub fn from_low_u64(value: u64) -> Self {
        let mut bytes = [0u8; ACCOUNT_ID_LEN];
        bytes[ACCOUNT_ID_LEN - 8..].copy_from_slice(&value.to_be_bytes());
        Self(bytes)
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; ACCOUNT_ID_LEN]
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; ACCOUNT_ID_LEN] {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for AccountId {
    type Err = DealMatchError;

    fn from_str(s: &str) -> Result<Self> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let decoded = hex::decode(digits)
            .map_err(|err| DealMatchError::Serialization(format!("invalid account {s}: {err}")))?;
        let bytes: [u8; ACCOUNT_ID_LEN] = decoded.try_into().map_err(|_| {
            DealMatchError::Serialization(format!(
                "invalid account {s}: expected {ACCOUNT_ID_LEN} bytes"
            ))
        })?;
        Ok(Self(bytes))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use ed25519_dalek::SigningKey;

    use super::*;

    #[test]
    fn deal_id_uniqueness() {
        let a = DealId::new();
        let b = DealId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn account_display_is_prefixed_hex() {
        let account = AccountId::from_low_u64(0x42);
        assert_eq!(
            account.to_string(),
            "0x0000000000000000000000000000000000000042"
        );
    }

    #[test]
    fn account_parse_roundtrip() {
        let account: AccountId = "0x8125721c2413d99a33e351e1f6bb4e56b6b633fd".parse().unwrap();
        assert_eq!(
            account.to_string(),
            "0x8125721c2413d99a33e351e1f6bb4e56b6b633fd"
        );
        assert!("0x1234".parse::<AccountId>().is_err());
        assert!("zz".parse::<AccountId>().is_err());
    }

    #[test]
    fn zero_account() {
        assert!(AccountId::ZERO.is_zero());
        assert!(AccountId::default().is_zero());
        assert!(!AccountId::from_low_u64(1).is_zero());
    }

    #[test]
    fn account_from_key_is_stable() {
        let key = SigningKey::generate(&mut rand::rngs::OsRng);
        let a = AccountId::from_verifying_key(&key.verifying_key());
        let b = AccountId::from_verifying_key(&key.verifying_key());
        assert_eq!(a, b);
        assert!(!a.is_zero());
    }

    #[test]
    fn serde_roundtrips() {
        let account = AccountId::from_low_u64(88);
        let json = serde_json::to_string(&account).unwrap();
        let back: AccountId = serde_json::from_str(&json).unwrap();
        assert_eq!(account, back);

        let deal = DealId::new();
        let json = serde_json::to_string(&deal).unwrap();
        let back: DealId = serde_json::from_str(&json).unwrap();
        assert_eq!(deal, back);
    }
}
