//! Ask plans: resource slices a worker offers on the market.

use serde::{Deserialize, Serialize};

use crate::ResourceVector;

/// A slice of worker capacity put up for sale.
///
/// Spot plans (`duration == 0`) may be evicted to make room for forward
/// plans once those are committed to a deal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AskPlan {
    pub id: String,
    pub resources: ResourceVector,
    /// Duration in seconds. Zero for spot plans.
    pub duration: u64,
}

impl AskPlan {
    #[must_use]
    pub fn new(id: impl Into<String>, resources: ResourceVector, duration: u64) -> Self {
        Self {
            id: id.into(),
            resources,
            duration,
        }
    }

    #[must_use]
    pub fn is_spot(&self) -> bool {
        self.duration == 0
    }
}
