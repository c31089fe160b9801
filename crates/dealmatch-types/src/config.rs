//! Configuration types for order validation and resource pools.

use serde::{Deserialize, Serialize};

use crate::{DealMatchError, Result, constants};

/// Marketplace-wide order limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    /// Minimum number of benchmark dimensions per order.
    pub min_num_benchmarks: usize,
    /// Maximum tag length in bytes.
    pub max_tag_length: usize,
    /// Minimum duration of a forward deal, in seconds.
    pub min_deal_duration_secs: u64,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            min_num_benchmarks: constants::MIN_NUM_BENCHMARKS,
            max_tag_length: constants::MAX_TAG_LENGTH,
            min_deal_duration_secs: constants::MIN_DEAL_DURATION_SECS,
        }
    }
}

impl MarketConfig {
    /// Parse from JSON; missing fields take their defaults.
    pub fn from_json(data: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(data)
            .map_err(|err| DealMatchError::Configuration(err.to_string()))?;
        if config.min_num_benchmarks == 0 {
            return Err(DealMatchError::Configuration(
                "min_num_benchmarks must be positive".into(),
            ));
        }
        Ok(config)
    }
}

/// Worker-side resource pool settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Normalize the pool capacity's GPU indices into content hashes as
    /// soon as the pool is created.
    pub normalize_on_create: bool,
}

impl PoolConfig {
    pub fn from_json(data: &str) -> Result<Self> {
        serde_json::from_str(data).map_err(|err| DealMatchError::Configuration(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn market_config_defaults() {
        let cfg = MarketConfig::default();
        assert_eq!(cfg.min_num_benchmarks, 12);
        assert_eq!(cfg.max_tag_length, 32);
        assert_eq!(cfg.min_deal_duration_secs, 600);
    }

    #[test]
    fn market_config_partial_json() {
        let cfg = MarketConfig::from_json(r#"{"max_tag_length": 16}"#).unwrap();
        assert_eq!(cfg.max_tag_length, 16);
        assert_eq!(cfg.min_num_benchmarks, 12);
    }

    #[test]
    fn market_config_rejects_zero_benchmarks() {
        let err = MarketConfig::from_json(r#"{"min_num_benchmarks": 0}"#).unwrap_err();
        assert!(matches!(err, DealMatchError::Configuration(_)));
    }

    #[test]
    fn pool_config_json() {
        let cfg = PoolConfig::from_json(r#"{"normalize_on_create": true}"#).unwrap();
        assert!(cfg.normalize_on_create);
        assert!(!PoolConfig::from_json("{}").unwrap().normalize_on_create);
        assert!(PoolConfig::from_json("not json").is_err());
    }
}
