//! Concurrent mutual blacklist verification.
//!
//! All seven lookups of [`BlacklistPair::ALL`] are issued at once. The
//! first lookup error aborts the group and drops the remaining lookups;
//! otherwise the collected [`BlacklistVerdict`] is evaluated in pair order.

use std::sync::Arc;

use dealmatch_types::{
    BlacklistPair, BlacklistParties, BlacklistVerdict, DealMatchError, Result,
};
use tracing::debug;

use crate::store::BlacklistStore;

/// Runs the seven blacklist lookups of a prospective deal.
#[derive(Clone)]
pub struct BlacklistVerifier {
    store: Arc<dyn BlacklistStore>,
}

impl BlacklistVerifier {
    #[must_use]
    pub fn new(store: Arc<dyn BlacklistStore>) -> Self {
        Self { store }
    }

    /// Perform every lookup and collect the flags.
    ///
    /// # Errors
    /// Returns `BlacklistCheckFailed` wrapping the first lookup error.
    pub async fn collect(&self, parties: &BlacklistParties) -> Result<BlacklistVerdict> {
        let store = &*self.store;
        let check = move |pair: BlacklistPair| {
            let (owner, candidate) = pair.accounts(parties);
            store.check(owner, candidate)
        };

        let (a, b, c, d, e, f, g) = tokio::try_join!(
            check(BlacklistPair::AskMasterInBidBlacklist),
            check(BlacklistPair::AskAuthorInBidBlacklist),
            check(BlacklistPair::AskMasterInBidAuthorBlacklist),
            check(BlacklistPair::AskAuthorInBidAuthorBlacklist),
            check(BlacklistPair::BidAuthorInAskBlacklist),
            check(BlacklistPair::BidAuthorInAskMasterBlacklist),
            check(BlacklistPair::BidAuthorInAskAuthorBlacklist),
        )
        .map_err(|err| DealMatchError::BlacklistCheckFailed(Box::new(err)))?;

        Ok(BlacklistVerdict::from_flags([a, b, c, d, e, f, g]))
    }

    /// Collect the verdict and fail on the first blacklisted pair.
    pub async fn verify(&self, parties: &BlacklistParties) -> Result<()> {
        let verdict = self.collect(parties).await?;
        debug!(clear = verdict.is_clear(), "Blacklist verdict collected");
        verdict.verify(parties).map_err(DealMatchError::Blacklisted)
    }
}
