//! Mutual blacklist verdicts.
//!
//! Before a deal is opened, seven (owner, candidate) pairs are looked up
//! in the blacklist store. Four ask whether the ASK side is excluded by
//! the BID side; three ask whether the BID author is excluded by the ASK
//! side. The lookups produce a [`BlacklistVerdict`], which is evaluated in
//! the fixed order of [`BlacklistPair::ALL`].

use std::fmt;

use crate::AccountId;

/// The accounts taking part in a blacklist verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlacklistParties {
    pub ask_author: AccountId,
    pub ask_master: AccountId,
    /// Owner of the blacklist the ASK order refers to.
    pub ask_blacklist: AccountId,
    pub bid_author: AccountId,
    /// Owner of the blacklist the BID order refers to.
    pub bid_blacklist: AccountId,
}

/// One of the seven checked (accuser, accused) pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlacklistPair {
    AskMasterInBidBlacklist,
    AskAuthorInBidBlacklist,
    AskMasterInBidAuthorBlacklist,
    AskAuthorInBidAuthorBlacklist,
    BidAuthorInAskBlacklist,
    BidAuthorInAskMasterBlacklist,
    BidAuthorInAskAuthorBlacklist,
}

impl BlacklistPair {
    /// Every pair, in evaluation order.
    pub const ALL: [Self; 7] = [
        Self::AskMasterInBidBlacklist,
        Self::AskAuthorInBidBlacklist,
        Self::AskMasterInBidAuthorBlacklist,
        Self::AskAuthorInBidAuthorBlacklist,
        Self::BidAuthorInAskBlacklist,
        Self::BidAuthorInAskMasterBlacklist,
        Self::BidAuthorInAskAuthorBlacklist,
    ];

    /// `(owner, candidate)` to look up for this pair.
    #[must_use]
    pub fn accounts(self, parties: &BlacklistParties) -> (AccountId, AccountId) {
        match self {
            Self::AskMasterInBidBlacklist => (parties.bid_blacklist, parties.ask_master),
            Self::AskAuthorInBidBlacklist => (parties.bid_blacklist, parties.ask_author),
            Self::AskMasterInBidAuthorBlacklist => (parties.bid_author, parties.ask_master),
            Self::AskAuthorInBidAuthorBlacklist => (parties.bid_author, parties.ask_author),
            Self::BidAuthorInAskBlacklist => (parties.ask_blacklist, parties.bid_author),
            Self::BidAuthorInAskMasterBlacklist => (parties.ask_master, parties.bid_author),
            Self::BidAuthorInAskAuthorBlacklist => (parties.ask_author, parties.bid_author),
        }
    }

    fn slot(self) -> usize {
        match self {
            Self::AskMasterInBidBlacklist => 0,
            Self::AskAuthorInBidBlacklist => 1,
            Self::AskMasterInBidAuthorBlacklist => 2,
            Self::AskAuthorInBidAuthorBlacklist => 3,
            Self::BidAuthorInAskBlacklist => 4,
            Self::BidAuthorInAskMasterBlacklist => 5,
            Self::BidAuthorInAskAuthorBlacklist => 6,
        }
    }
}

/// Outcome of the seven lookups. `true` means "blacklisted".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlacklistVerdict {
    flags: [bool; 7],
}

impl BlacklistVerdict {
    /// Build from flags in [`BlacklistPair::ALL`] order.
    #[must_use]
    pub fn from_flags(flags: [bool; 7]) -> Self {
        Self { flags }
    }

    #[must_use]
    pub fn get(&self, pair: BlacklistPair) -> bool {
        self.flags[pair.slot()]
    }

    pub fn set(&mut self, pair: BlacklistPair, blacklisted: bool) {
        self.flags[pair.slot()] = blacklisted;
    }

    #[must_use]
    pub fn is_clear(&self) -> bool {
        !self.flags.iter().any(|flag| *flag)
    }

    /// Fails on the first blacklisted pair, in evaluation order.
    pub fn verify(&self, parties: &BlacklistParties) -> Result<(), BlacklistViolation> {
        match BlacklistPair::ALL.into_iter().find(|pair| self.get(*pair)) {
            Some(pair) => {
                let (owner, candidate) = pair.accounts(parties);
                Err(BlacklistViolation {
                    pair,
                    owner,
                    candidate,
                })
            }
            None => Ok(()),
        }
    }
}

/// A blacklisted pair, with the accounts involved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlacklistViolation {
    pub pair: BlacklistPair,
    /// Blacklist owner.
    pub owner: AccountId,
    /// Blacklisted account.
    pub candidate: AccountId,
}

impl fmt::Display for BlacklistViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (owner, candidate) = (self.owner, self.candidate);
        match self.pair {
            BlacklistPair::AskMasterInBidBlacklist => {
                write!(f, "ASK master {candidate} is in BID blacklist {owner}")
            }
            BlacklistPair::AskAuthorInBidBlacklist => {
                write!(f, "ASK author {candidate} is in BID blacklist {owner}")
            }
            BlacklistPair::AskMasterInBidAuthorBlacklist => {
                write!(f, "ASK master {candidate} is in BID author blacklist {owner}")
            }
            BlacklistPair::AskAuthorInBidAuthorBlacklist => {
                write!(f, "ASK author {candidate} is in BID author blacklist {owner}")
            }
            BlacklistPair::BidAuthorInAskBlacklist => {
                write!(f, "BID author {candidate} is in ASK blacklist {owner}")
            }
            BlacklistPair::BidAuthorInAskMasterBlacklist => {
                write!(f, "BID author {candidate} is in ASK master blacklist {owner}")
            }
            BlacklistPair::BidAuthorInAskAuthorBlacklist => {
                write!(f, "BID author {candidate} is in ASK author blacklist {owner}")
            }
        }
    }
}
