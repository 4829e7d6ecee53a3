//! Meditation reward ledger
//!
//! Public call surface over the session tracker, the eligibility rules,
//! the treasury and the pending-reward ledger. Each method is one
//! indivisible operation: it either fails with no state change or commits
//! all of its effects.

use jibjib_core::{Clock, LedgerConfig, SystemClock, Timestamp, TokenId, UserId};
use jibjib_treasury::{PayoutKind, PendingRewardLedger, TreasuryError, TreasuryPool, TreasuryReport};
use serde::{Deserialize, Serialize};

use crate::eligibility::{self, Ineligibility, RewardEligibility};
use crate::error::{LedgerError, Result};
use crate::events::LedgerEvent;
use crate::gateway::{self, Donation};
use crate::session::{Completion, Outcome, SessionStart, SessionTracker, StartCheck};
use crate::user::{UserRecord, UserStats};

/// Everything the ledger persists
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LedgerState {
    pub sessions: SessionTracker,
    pub treasury: TreasuryPool,
    pub pending: PendingRewardLedger,
    pub events: Vec<LedgerEvent>,
}

impl LedgerState {
    /// Latest timestamp the ledger has recorded, 0 when empty
    pub fn latest_timestamp(&self) -> Timestamp {
        self.events
            .iter()
            .map(LedgerEvent::timestamp)
            .max()
            .unwrap_or(0)
    }
}

pub struct MeditationLedger<C: Clock = SystemClock> {
    state: LedgerState,
    config: LedgerConfig,
    clock: C,
}

impl<C: Clock> MeditationLedger<C> {
    pub fn new(config: LedgerConfig, clock: C) -> Result<Self> {
        Self::with_state(LedgerState::default(), config, clock)
    }

    /// Resume from a previously saved state
    pub fn with_state(state: LedgerState, config: LedgerConfig, clock: C) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            state,
            config,
            clock,
        })
    }

    pub fn state(&self) -> &LedgerState {
        &self.state
    }

    pub fn into_state(self) -> LedgerState {
        self.state
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Append to the journal, keeping both the event journal and the
    /// treasury audit trail within `journal_limit`
    fn record(&mut self, event: LedgerEvent) {
        let limit = self.config.journal_limit;
        self.state.events.push(event);
        if self.state.events.len() > limit {
            let excess = self.state.events.len() - limit;
            self.state.events.drain(..excess);
        }
        self.state.treasury.trim_transactions(limit);
    }

    // ------------------------------------------------------------------
    // Session lifecycle
    // ------------------------------------------------------------------

    /// Open a session for `user`.
    ///
    /// A session still within its duration blocks the start. A session that
    /// ran past its duration without being completed is finalized first and
    /// its completion is returned in `SessionStart::finalized`.
    pub fn start_meditation(&mut self, user: &UserId, token: Option<TokenId>) -> Result<SessionStart> {
        let now = self.clock.now();
        let duration = self.config.session_duration_secs;

        let finalized = match self.state.sessions.check_start(user, now, duration)? {
            StartCheck::Idle => None,
            StartCheck::Stale => {
                let token = self.finalization_token(user, token.as_ref());
                log::info!("auto-finalizing stale session of {} in {}", user, token);
                Some(self.finalize(user, token, now, true)?)
            }
        };

        self.state.sessions.open(user, now, token.clone());
        self.record(LedgerEvent::SessionStarted {
            user: user.clone(),
            token: token.clone(),
            timestamp: now,
        });
        log::info!("{} started meditating at {}", user, now);

        Ok(SessionStart {
            started_at: now,
            token,
            finalized,
        })
    }

    /// Close the open session of `user` and settle its reward in `token`
    pub fn complete_meditation(&mut self, user: &UserId, token: &TokenId) -> Result<Completion> {
        let now = self.clock.now();
        self.state
            .sessions
            .check_complete(user, now, self.config.session_duration_secs)?;

        if !self.state.treasury.is_supported(token) {
            return Err(LedgerError::UnsupportedToken(token.clone()));
        }

        self.finalize(user, token.clone(), now, false)
    }

    /// Token a stale session is settled in: the new start's token, else the
    /// token the stale session was started with, else the configured default.
    fn finalization_token(&self, user: &UserId, requested: Option<&TokenId>) -> TokenId {
        requested
            .cloned()
            .or_else(|| {
                self.state
                    .sessions
                    .record(user)
                    .and_then(|r| r.session_token.clone())
            })
            .unwrap_or_else(|| self.config.default_token.clone())
    }

    fn finalize(
        &mut self,
        user: &UserId,
        token: TokenId,
        now: Timestamp,
        auto_finalized: bool,
    ) -> Result<Completion> {
        let record = self.state.sessions.record_or_default(user);

        let outcome = match eligibility::check(&record, &self.config, now) {
            Err(reason) => {
                log::debug!("{} not eligible for a reward: {:?}", user, reason);
                Outcome::RecordedOnly { reason }
            }
            Ok(()) => match self.state.treasury.reward_amount(&token) {
                0 => Outcome::RecordedOnly {
                    reason: Ineligibility::UnsupportedToken,
                },
                base => self.pay_reward(user, &token, base, now)?,
            },
        };

        self.state.sessions.close(user, now, &outcome);
        self.record(LedgerEvent::SessionCompleted {
            user: user.clone(),
            token: token.clone(),
            outcome,
            auto_finalized,
            timestamp: now,
        });
        log::info!(
            "{} completed a session: {} {} {}",
            user,
            outcome.label(),
            outcome.amount(),
            token
        );

        Ok(Completion {
            user: user.clone(),
            token,
            outcome,
            started_at: record.last_session_time,
            completed_at: now,
            auto_finalized,
        })
    }

    /// Pay an eligible completion, falling back to a pending reward
    fn pay_reward(&mut self, user: &UserId, token: &TokenId, base: u64, now: Timestamp) -> Result<Outcome> {
        let (amount, bonus) = eligibility::reward_for(base, &self.config, now)?;

        match self
            .state
            .treasury
            .try_pay(token, amount, user, PayoutKind::Reward, now)
        {
            Ok(()) => {
                self.record(LedgerEvent::RewardPaid {
                    user: user.clone(),
                    token: token.clone(),
                    amount,
                    timestamp: now,
                });
                Ok(Outcome::Rewarded { amount, bonus })
            }
            Err(TreasuryError::InsufficientFunds { available, .. }) => {
                self.state.pending.credit(user, token, amount)?;
                self.record(LedgerEvent::PendingRewardStored {
                    user: user.clone(),
                    token: token.clone(),
                    amount,
                    timestamp: now,
                });
                log::warn!(
                    "treasury short for {}: needed {} {}, had {}",
                    user,
                    amount,
                    token,
                    available
                );
                Ok(Outcome::PendingStored { amount, bonus })
            }
            Err(e) => Err(e.into()),
        }
    }

    // ------------------------------------------------------------------
    // Pending rewards and funding
    // ------------------------------------------------------------------

    /// Pay out everything `user` is owed in `token`, or nothing
    pub fn claim_pending_reward(&mut self, user: &UserId, token: &TokenId) -> Result<u64> {
        let now = self.clock.now();

        let paid = self
            .state
            .pending
            .claim(&mut self.state.treasury, user, token, now)
            .inspect_err(|e| log::warn!("claim by {} failed: {}", user, e))?;

        self.record(LedgerEvent::PendingRewardClaimed {
            user: user.clone(),
            token: token.clone(),
            amount: paid,
            timestamp: now,
        });
        Ok(paid)
    }

    /// Credit a donation to the treasury. Returns the credited amount.
    pub fn donate(&mut self, donor: Option<&UserId>, donation: &Donation) -> Result<u64> {
        let now = self.clock.now();
        let amount = gateway::credited_amount(donation, &self.config, &self.state.treasury)?;

        self.state
            .treasury
            .deposit(&donation.token, amount, donor.cloned(), now)?;
        self.record(LedgerEvent::Donated {
            donor: donor.cloned(),
            token: donation.token.clone(),
            amount,
            timestamp: now,
        });
        log::info!("donation of {} {} received", amount, donation.token);

        Ok(amount)
    }

    // ------------------------------------------------------------------
    // Owner administration
    // ------------------------------------------------------------------

    fn require_owner(&self, caller: &UserId) -> Result<()> {
        if self.config.is_owner(caller) {
            Ok(())
        } else {
            Err(LedgerError::Unauthorized)
        }
    }

    /// Set the base reward of `token`; 0 withdraws support
    pub fn set_reward_amount(&mut self, caller: &UserId, token: &TokenId, amount: u64) -> Result<()> {
        self.require_owner(caller)?;
        self.register_token(token, amount, None);
        Ok(())
    }

    pub fn set_token_symbol(&mut self, caller: &UserId, token: &TokenId, symbol: &str) -> Result<()> {
        self.require_owner(caller)?;
        self.state.treasury.set_symbol(token, symbol);
        Ok(())
    }

    /// Owner pulls funds out of the treasury (e.g. to migrate them)
    pub fn withdraw(&mut self, caller: &UserId, token: &TokenId, amount: u64) -> Result<()> {
        self.require_owner(caller)?;
        let now = self.clock.now();

        self.state.treasury.withdraw(token, amount, caller, now)?;
        self.record(LedgerEvent::Withdrawn {
            to: caller.clone(),
            token: token.clone(),
            amount,
            timestamp: now,
        });
        Ok(())
    }

    /// Configure a token's reward and symbol on behalf of the host at
    /// bootstrap, without an owner check
    pub fn register_token(&mut self, token: &TokenId, reward_amount: u64, symbol: Option<&str>) {
        let now = self.clock.now();
        self.state.treasury.set_reward_amount(token, reward_amount);
        if let Some(symbol) = symbol {
            self.state.treasury.set_symbol(token, symbol);
        }
        self.record(LedgerEvent::RewardAmountSet {
            token: token.clone(),
            amount: reward_amount,
            timestamp: now,
        });
        log::info!("reward for {} set to {}", token, reward_amount);
    }

    // ------------------------------------------------------------------
    // Read-only views
    // ------------------------------------------------------------------

    pub fn get_user_record(&self, user: &UserId) -> UserRecord {
        self.state.sessions.record_or_default(user)
    }

    pub fn get_user_stats(&self, user: &UserId) -> UserStats {
        let now = self.clock.now();
        let record = self.state.sessions.record_or_default(user);
        UserStats {
            total_sessions: record.total_sessions,
            last_session_time: record.last_session_time,
            is_meditating: record.is_meditating,
            today_session_count: record.today_count_at(now),
            can_claim: self.state.pending.has_pending(user),
            total_rewarded: record.total_rewarded,
        }
    }

    pub fn get_reward_eligibility(&self, user: &UserId) -> RewardEligibility {
        let record = self.state.sessions.record_or_default(user);
        eligibility::assess(&record, &self.config, self.clock.now())
    }

    pub fn get_reward_amount(&self, token: &TokenId) -> u64 {
        self.state.treasury.reward_amount(token)
    }

    pub fn get_pending_reward(&self, user: &UserId, token: &TokenId) -> u64 {
        self.state.pending.pending(user, token)
    }

    pub fn get_token_balance(&self, token: &TokenId) -> u64 {
        self.state.treasury.balance(token)
    }

    pub fn get_meditation_duration(&self) -> u64 {
        self.config.session_duration_secs
    }

    pub fn treasury_report(&self) -> TreasuryReport {
        self.state.treasury.report()
    }

    pub fn events(&self) -> &[LedgerEvent] {
        &self.state.events
    }

    pub fn events_for<'a>(&'a self, user: &'a UserId) -> impl Iterator<Item = &'a LedgerEvent> + 'a {
        self.state
            .events
            .iter()
            .filter(move |event| event.user() == Some(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jibjib_core::ManualClock;
    use std::sync::Arc;

    // 2024-01-01 08:00:00 UTC, outside the bonus hour
    const MORNING: Timestamp = 1_704_067_200 + 8 * 3600;

    fn ledger() -> (MeditationLedger<Arc<ManualClock>>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(MORNING));
        let config = LedgerConfig::default().with_owner(UserId::new("owner"));
        let mut ledger = MeditationLedger::new(config, clock.clone()).unwrap();
        ledger.register_token(&TokenId::Native, 10, Some("JBC"));
        (ledger, clock)
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = LedgerConfig {
            bonus_hour_utc: 30,
            ..Default::default()
        };
        assert!(matches!(
            MeditationLedger::new(config, ManualClock::new(0)),
            Err(LedgerError::Config(_))
        ));
    }

    #[test]
    fn test_complete_pays_reward() {
        let (mut ledger, clock) = ledger();
        let user = UserId::new("alice");
        ledger.donate(None, &Donation::native(100)).unwrap();

        ledger.start_meditation(&user, None).unwrap();
        clock.advance(300);
        let completion = ledger.complete_meditation(&user, &TokenId::Native).unwrap();

        assert_eq!(
            completion.outcome,
            Outcome::Rewarded {
                amount: 10,
                bonus: false
            }
        );
        assert_eq!(completion.started_at, MORNING);
        assert_eq!(ledger.get_token_balance(&TokenId::Native), 90);
        assert_eq!(ledger.get_user_stats(&user).total_sessions, 1);
    }

    #[test]
    fn test_complete_unsupported_token_keeps_session() {
        let (mut ledger, clock) = ledger();
        let user = UserId::new("alice");
        let unknown = TokenId::contract("0x440bb674a2e443d600396a69c4c46362148699a2").unwrap();

        ledger.start_meditation(&user, None).unwrap();
        clock.advance(300);

        assert_eq!(
            ledger.complete_meditation(&user, &unknown),
            Err(LedgerError::UnsupportedToken(unknown))
        );
        assert!(ledger.get_user_stats(&user).is_meditating);
        assert_eq!(ledger.get_user_stats(&user).total_sessions, 0);
    }

    #[test]
    fn test_owner_only_administration() {
        let (mut ledger, _clock) = ledger();
        let owner = UserId::new("owner");
        let mallory = UserId::new("mallory");

        assert_eq!(
            ledger.set_reward_amount(&mallory, &TokenId::Native, 1_000),
            Err(LedgerError::Unauthorized)
        );
        assert_eq!(ledger.get_reward_amount(&TokenId::Native), 10);

        ledger.set_reward_amount(&owner, &TokenId::Native, 25).unwrap();
        assert_eq!(ledger.get_reward_amount(&TokenId::Native), 25);

        ledger.donate(None, &Donation::native(100)).unwrap();
        assert_eq!(
            ledger.withdraw(&mallory, &TokenId::Native, 100),
            Err(LedgerError::Unauthorized)
        );
        assert!(matches!(
            ledger.withdraw(&owner, &TokenId::Native, 101),
            Err(LedgerError::InsufficientFunds { .. })
        ));
        ledger.withdraw(&owner, &TokenId::Native, 100).unwrap();
        assert_eq!(ledger.get_token_balance(&TokenId::Native), 0);
    }

    #[test]
    fn test_events_for_user() {
        let (mut ledger, clock) = ledger();
        let user = UserId::new("alice");

        ledger.start_meditation(&user, Some(TokenId::Native)).unwrap();
        clock.advance(300);
        ledger.complete_meditation(&user, &TokenId::Native).unwrap();

        let names: Vec<&str> = ledger.events_for(&user).map(|e| e.name()).collect();
        assert_eq!(
            names,
            vec!["SessionStarted", "PendingRewardStored", "SessionCompleted"]
        );
    }

    #[test]
    fn test_journal_keeps_most_recent_entries() {
        let clock = Arc::new(ManualClock::new(MORNING));
        let config = LedgerConfig {
            journal_limit: 3,
            ..Default::default()
        };
        let mut ledger = MeditationLedger::new(config, clock.clone()).unwrap();
        ledger.register_token(&TokenId::Native, 10, None);

        for amount in 1..=6 {
            clock.advance(60);
            ledger.donate(None, &Donation::native(amount)).unwrap();
        }

        assert_eq!(ledger.events().len(), 3);
        assert_eq!(ledger.state().treasury.transactions().len(), 3);
        assert_eq!(ledger.state().latest_timestamp(), MORNING + 6 * 60);
        assert!(matches!(
            ledger.events().last(),
            Some(LedgerEvent::Donated { amount: 6, .. })
        ));

        // Balances are unaffected by trimming the history
        assert_eq!(ledger.get_token_balance(&TokenId::Native), 21);
        assert_eq!(ledger.treasury_report().funds[0].total_deposited, 21);
    }

    #[test]
    fn test_latest_timestamp_of_empty_state() {
        assert_eq!(LedgerState::default().latest_timestamp(), 0);
    }

    #[test]
    fn test_meditation_duration() {
        let (ledger, _clock) = ledger();
        assert_eq!(ledger.get_meditation_duration(), 300);
    }
}
