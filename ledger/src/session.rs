//! Session state machine
//!
//! Each user is either idle or meditating. A session opens on start and
//! closes on complete, or on the next start once it has run past the
//! required duration (auto-finalization).

use jibjib_core::{Timestamp, TokenId, UserId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::eligibility::Ineligibility;
use crate::error::{LedgerError, Result};
use crate::user::UserRecord;

/// How a closed session was classified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// Reward paid in full from the treasury
    Rewarded { amount: u64, bonus: bool },
    /// Treasury could not pay; the full amount is owed as a pending reward
    PendingStored { amount: u64, bonus: bool },
    /// Session counted, no reward attempted
    RecordedOnly { reason: Ineligibility },
}

impl Outcome {
    /// Reward amount earned (paid or owed)
    pub fn amount(&self) -> u64 {
        match self {
            Outcome::Rewarded { amount, .. } | Outcome::PendingStored { amount, .. } => *amount,
            Outcome::RecordedOnly { .. } => 0,
        }
    }

    /// True if this outcome uses up the user's daily slot and cooldown
    pub fn consumes_budget(&self) -> bool {
        !matches!(self, Outcome::RecordedOnly { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Rewarded { .. } => "Rewarded",
            Outcome::PendingStored { .. } => "PendingStored",
            Outcome::RecordedOnly { .. } => "RecordedOnly",
        }
    }
}

/// Record of one closed session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
    pub user: UserId,
    pub token: TokenId,
    pub outcome: Outcome,
    pub started_at: Timestamp,
    pub completed_at: Timestamp,
    /// Closed by a later start rather than an explicit complete
    pub auto_finalized: bool,
}

/// Result of a successful start
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStart {
    pub started_at: Timestamp,
    pub token: Option<TokenId>,
    /// Stale session closed before this one opened
    pub finalized: Option<Completion>,
}

/// What a start must do before opening a new session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartCheck {
    Idle,
    /// A session ran past its duration without being completed
    Stale,
}

/// Owner of all `UserRecord`s
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionTracker {
    users: BTreeMap<UserId, UserRecord>,
}

impl SessionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, user: &UserId) -> Option<&UserRecord> {
        self.users.get(user)
    }

    /// Record of `user`, or an empty one if the user was never seen
    pub fn record_or_default(&self, user: &UserId) -> UserRecord {
        self.users.get(user).cloned().unwrap_or_default()
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    pub fn open_sessions(&self) -> usize {
        self.users.values().filter(|r| r.is_meditating).count()
    }

    pub fn check_start(&self, user: &UserId, now: Timestamp, duration: u64) -> Result<StartCheck> {
        let record = match self.users.get(user) {
            Some(record) if record.is_meditating => record,
            _ => return Ok(StartCheck::Idle),
        };

        let elapsed = record.elapsed(now);
        if elapsed < duration {
            return Err(LedgerError::AlreadyMeditating {
                remaining: duration - elapsed,
            });
        }
        Ok(StartCheck::Stale)
    }

    pub fn check_complete(&self, user: &UserId, now: Timestamp, duration: u64) -> Result<()> {
        let record = self
            .users
            .get(user)
            .filter(|r| r.is_meditating)
            .ok_or(LedgerError::NotMeditating)?;

        let elapsed = record.elapsed(now);
        if elapsed < duration {
            return Err(LedgerError::TooEarly {
                remaining: duration - elapsed,
            });
        }
        Ok(())
    }

    pub fn open(&mut self, user: &UserId, now: Timestamp, token: Option<TokenId>) {
        let record = self.users.entry(user.clone()).or_default();
        record.is_meditating = true;
        record.last_session_time = now;
        record.session_token = token;
    }

    /// Close the open session of `user` with a classified outcome
    pub fn close(&mut self, user: &UserId, now: Timestamp, outcome: &Outcome) {
        let record = self.users.entry(user.clone()).or_default();
        record.roll_day(now);

        record.total_sessions += 1;
        if outcome.consumes_budget() {
            record.today_session_count += 1;
            record.last_reward_time = Some(now);
            record.total_rewarded += 1;
        }

        record.is_meditating = false;
        record.session_token = None;
    }
}
