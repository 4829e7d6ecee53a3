//! Journal of ledger state changes

use jibjib_core::{Timestamp, TokenId, UserId};
use serde::{Deserialize, Serialize};

use crate::session::Outcome;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
    SessionStarted {
        user: UserId,
        token: Option<TokenId>,
        timestamp: Timestamp,
    },
    SessionCompleted {
        user: UserId,
        token: TokenId,
        outcome: Outcome,
        auto_finalized: bool,
        timestamp: Timestamp,
    },
    RewardPaid {
        user: UserId,
        token: TokenId,
        amount: u64,
        timestamp: Timestamp,
    },
    PendingRewardStored {
        user: UserId,
        token: TokenId,
        amount: u64,
        timestamp: Timestamp,
    },
    PendingRewardClaimed {
        user: UserId,
        token: TokenId,
        amount: u64,
        timestamp: Timestamp,
    },
    Donated {
        donor: Option<UserId>,
        token: TokenId,
        amount: u64,
        timestamp: Timestamp,
    },
    Withdrawn {
        to: UserId,
        token: TokenId,
        amount: u64,
        timestamp: Timestamp,
    },
    RewardAmountSet {
        token: TokenId,
        amount: u64,
        timestamp: Timestamp,
    },
}

impl LedgerEvent {
    pub fn timestamp(&self) -> Timestamp {
        match self {
            LedgerEvent::SessionStarted { timestamp, .. }
            | LedgerEvent::SessionCompleted { timestamp, .. }
            | LedgerEvent::RewardPaid { timestamp, .. }
            | LedgerEvent::PendingRewardStored { timestamp, .. }
            | LedgerEvent::PendingRewardClaimed { timestamp, .. }
            | LedgerEvent::Donated { timestamp, .. }
            | LedgerEvent::Withdrawn { timestamp, .. }
            | LedgerEvent::RewardAmountSet { timestamp, .. } => *timestamp,
        }
    }

    /// User the event concerns, if any
    pub fn user(&self) -> Option<&UserId> {
        match self {
            LedgerEvent::SessionStarted { user, .. }
            | LedgerEvent::SessionCompleted { user, .. }
            | LedgerEvent::RewardPaid { user, .. }
            | LedgerEvent::PendingRewardStored { user, .. }
            | LedgerEvent::PendingRewardClaimed { user, .. } => Some(user),
            LedgerEvent::Withdrawn { to, .. } => Some(to),
            LedgerEvent::Donated { donor, .. } => donor.as_ref(),
            LedgerEvent::RewardAmountSet { .. } => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            LedgerEvent::SessionStarted { .. } => "SessionStarted",
            LedgerEvent::SessionCompleted { .. } => "SessionCompleted",
            LedgerEvent::RewardPaid { .. } => "RewardPaid",
            LedgerEvent::PendingRewardStored { .. } => "PendingRewardStored",
            LedgerEvent::PendingRewardClaimed { .. } => "PendingRewardClaimed",
            LedgerEvent::Donated { .. } => "Donated",
            LedgerEvent::Withdrawn { .. } => "Withdrawn",
            LedgerEvent::RewardAmountSet { .. } => "RewardAmountSet",
        }
    }
}
