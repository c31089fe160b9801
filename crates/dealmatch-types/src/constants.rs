//! Marketplace-wide constants for DealMatch.

/// Minimum number of benchmark dimensions every order must carry.
pub const MIN_NUM_BENCHMARKS: usize = 12;

/// Maximum length of an order tag, in bytes.
pub const MAX_TAG_LENGTH: usize = 32;

/// Minimum duration of a forward (non-spot) deal, in seconds.
pub const MIN_DEAL_DURATION_SECS: u64 = 600;

/// Number of network capability flags (overlay, outbound, incoming).
pub const NET_FLAGS_COUNT: usize = 3;

/// Seconds in an hour, used for per-hour price rendering.
pub const SECONDS_PER_HOUR: u64 = 3600;

/// Size of an account address in bytes.
pub const ACCOUNT_ID_LEN: usize = 20;

/// Domain separator for GPU device content hashes.
pub const GPU_HASH_DOMAIN: &[u8] = b"dealmatch:gpu_device:v1:";
