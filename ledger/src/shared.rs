//! Thread-safe handle to a ledger
//!
//! Every call holds the lock for the whole operation, so two operations on
//! the same ledger never interleave their reads and writes.

use jibjib_core::{Clock, SystemClock, TokenId, UserId};
use parking_lot::Mutex;
use std::sync::Arc;

use crate::error::Result;
use crate::gateway::Donation;
use crate::ledger::{LedgerState, MeditationLedger};
use crate::session::{Completion, SessionStart};
use crate::user::UserStats;
use crate::eligibility::RewardEligibility;

pub struct SharedLedger<C: Clock = SystemClock> {
    inner: Arc<Mutex<MeditationLedger<C>>>,
}

impl<C: Clock> Clone for SharedLedger<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: Clock> SharedLedger<C> {
    pub fn new(ledger: MeditationLedger<C>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ledger)),
        }
    }

    /// Run `f` with exclusive access to the ledger
    pub fn with<R>(&self, f: impl FnOnce(&mut MeditationLedger<C>) -> R) -> R {
        let mut ledger = self.inner.lock();
        f(&mut ledger)
    }

    pub fn start_meditation(&self, user: &UserId, token: Option<TokenId>) -> Result<SessionStart> {
        self.inner.lock().start_meditation(user, token)
    }

    pub fn complete_meditation(&self, user: &UserId, token: &TokenId) -> Result<Completion> {
        self.inner.lock().complete_meditation(user, token)
    }

    pub fn claim_pending_reward(&self, user: &UserId, token: &TokenId) -> Result<u64> {
        self.inner.lock().claim_pending_reward(user, token)
    }

    pub fn donate(&self, donor: Option<&UserId>, donation: &Donation) -> Result<u64> {
        self.inner.lock().donate(donor, donation)
    }

    pub fn get_user_stats(&self, user: &UserId) -> UserStats {
        self.inner.lock().get_user_stats(user)
    }

    pub fn get_reward_eligibility(&self, user: &UserId) -> RewardEligibility {
        self.inner.lock().get_reward_eligibility(user)
    }

    pub fn get_pending_reward(&self, user: &UserId, token: &TokenId) -> u64 {
        self.inner.lock().get_pending_reward(user, token)
    }

    pub fn get_token_balance(&self, token: &TokenId) -> u64 {
        self.inner.lock().get_token_balance(token)
    }

    /// Copy of the current state, e.g. for persisting
    pub fn snapshot(&self) -> LedgerState {
        self.inner.lock().state().clone()
    }
}
