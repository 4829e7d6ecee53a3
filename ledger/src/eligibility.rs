//! Reward eligibility and bonus-window rules
//!
//! Pure functions over a `UserRecord`, the rule configuration and the
//! current time. Nothing here touches balances.

use jibjib_core::{hour_of_day, LedgerConfig, Timestamp};
use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, Result};
use crate::user::UserRecord;

/// Why a completion was recorded without a reward
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ineligibility {
    /// Daily cap of reward-eligible completions already used
    DailyCapReached,
    /// Cooldown since the last reward has not elapsed
    CoolingDown { remaining: u64 },
    /// Auto-finalized against a token with no reward configured
    UnsupportedToken,
}

/// Snapshot returned by `get_reward_eligibility`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardEligibility {
    pub can_get_reward: bool,
    pub seconds_until_reward: u64,
    pub today_session_count: u32,
    pub is_meditating: bool,
}

/// Seconds left before the cooldown allows another reward
pub fn cooldown_remaining(record: &UserRecord, config: &LedgerConfig, now: Timestamp) -> u64 {
    match record.last_reward_time {
        // Never rewarded: no cooldown applies
        None => 0,
        Some(last) => config.cooldown_secs.saturating_sub(now.saturating_sub(last)),
    }
}

/// Decide whether a completion at `now` may be rewarded
pub fn check(record: &UserRecord, config: &LedgerConfig, now: Timestamp) -> std::result::Result<(), Ineligibility> {
    if record.today_count_at(now) >= config.daily_cap {
        return Err(Ineligibility::DailyCapReached);
    }

    let remaining = cooldown_remaining(record, config, now);
    if remaining > 0 {
        return Err(Ineligibility::CoolingDown { remaining });
    }

    Ok(())
}

pub fn assess(record: &UserRecord, config: &LedgerConfig, now: Timestamp) -> RewardEligibility {
    RewardEligibility {
        can_get_reward: check(record, config, now).is_ok(),
        seconds_until_reward: cooldown_remaining(record, config, now),
        today_session_count: record.today_count_at(now),
        is_meditating: record.is_meditating,
    }
}

pub fn in_bonus_window(config: &LedgerConfig, now: Timestamp) -> bool {
    hour_of_day(now) == config.bonus_hour_utc
}

/// Amount to pay for one eligible completion and whether the bonus applied
pub fn reward_for(base: u64, config: &LedgerConfig, now: Timestamp) -> Result<(u64, bool)> {
    if !in_bonus_window(config, now) {
        return Ok((base, false));
    }

    let amount = base.checked_mul(config.bonus_multiplier).ok_or_else(|| {
        LedgerError::ArithmeticOverflow(format!(
            "bonus reward {} x {}",
            base, config.bonus_multiplier
        ))
    })?;
    Ok((amount, true))
}
