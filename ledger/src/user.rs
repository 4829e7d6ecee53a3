//! Per-user session and reward history

use jibjib_core::{day_bucket, Timestamp, TokenId};
use serde::{Deserialize, Serialize};

/// Everything the ledger remembers about one user. Created on first
/// interaction and never deleted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Completed or auto-finalized sessions, rewarded or not
    pub total_sessions: u64,

    /// Start time of the most recent session, open or closed
    pub last_session_time: Timestamp,

    pub is_meditating: bool,

    /// Token named when the open session was started
    pub session_token: Option<TokenId>,

    /// Reward-eligible completions during `day_bucket`
    pub today_session_count: u32,

    pub day_bucket: u64,

    /// Last reward-eligible completion; `None` until the first one
    pub last_reward_time: Option<Timestamp>,

    /// Lifetime reward-eligible completions (paid or stored as pending)
    pub total_rewarded: u64,
}

impl UserRecord {
    /// Seconds since the current (or last) session started
    pub fn elapsed(&self, now: Timestamp) -> u64 {
        now.saturating_sub(self.last_session_time)
    }

    /// Today's eligible count as seen at `now`, without rolling the record
    pub fn today_count_at(&self, now: Timestamp) -> u32 {
        if day_bucket(now) > self.day_bucket {
            0
        } else {
            self.today_session_count
        }
    }

    /// Reset the daily counter if `now` falls on a later UTC day. An earlier
    /// day (clock stepped back) keeps the current count.
    pub fn roll_day(&mut self, now: Timestamp) {
        let today = day_bucket(now);
        if today > self.day_bucket {
            self.day_bucket = today;
            self.today_session_count = 0;
        }
    }
}

/// Read-only summary returned by `get_user_stats`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStats {
    pub total_sessions: u64,
    pub last_session_time: Timestamp,
    pub is_meditating: bool,
    pub today_session_count: u32,
    /// True if any pending reward is owed in any token
    pub can_claim: bool,
    pub total_rewarded: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use jibjib_core::constants::SECONDS_PER_DAY;

    const DAY_START: Timestamp = 1_704_067_200;

    #[test]
    fn test_roll_day_resets_once() {
        let mut record = UserRecord {
            day_bucket: day_bucket(DAY_START),
            today_session_count: 3,
            ..Default::default()
        };

        record.roll_day(DAY_START + 100);
        assert_eq!(record.today_session_count, 3);

        record.roll_day(DAY_START + SECONDS_PER_DAY);
        assert_eq!(record.today_session_count, 0);
        assert_eq!(record.day_bucket, day_bucket(DAY_START) + 1);
    }

    #[test]
    fn test_earlier_day_does_not_reset() {
        let mut record = UserRecord {
            day_bucket: day_bucket(DAY_START),
            today_session_count: 3,
            ..Default::default()
        };

        let yesterday = DAY_START - 60;
        assert_eq!(record.today_count_at(yesterday), 3);

        record.roll_day(yesterday);
        assert_eq!(record.today_session_count, 3);
        assert_eq!(record.day_bucket, day_bucket(DAY_START));
    }

    #[test]
    fn test_today_count_at_is_pure() {
        let record = UserRecord {
            day_bucket: day_bucket(DAY_START),
            today_session_count: 2,
            ..Default::default()
        };

        assert_eq!(record.today_count_at(DAY_START + 5), 2);
        assert_eq!(record.today_count_at(DAY_START + SECONDS_PER_DAY), 0);
        assert_eq!(record.today_session_count, 2);
    }

    #[test]
    fn test_elapsed_saturates() {
        let record = UserRecord {
            last_session_time: 1000,
            ..Default::default()
        };
        assert_eq!(record.elapsed(1300), 300);
        assert_eq!(record.elapsed(900), 0);
    }
}
