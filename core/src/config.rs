//! Ledger rule configuration

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    BONUS_HOUR_UTC, BONUS_MULTIPLIER, DAILY_REWARD_CAP, JOURNAL_LIMIT, MEDITATION_DURATION_SECS,
    REWARD_COOLDOWN_SECS,
};
use crate::ids::{TokenId, UserId};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid configuration: {field}: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
}

/// Rules the ledger enforces. Every field has a default, so an empty
/// `[ledger]` table is a valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Seconds a session must run before it can be completed
    pub session_duration_secs: u64,

    /// Seconds between two reward-eligible completions
    pub cooldown_secs: u64,

    /// Reward-eligible completions per user per UTC day
    pub daily_cap: u32,

    /// UTC hour whose completions are multiplied
    pub bonus_hour_utc: u8,

    pub bonus_multiplier: u64,

    /// Reject donations of tokens that have no reward amount configured
    pub require_registered_tokens: bool,

    /// Token used to finalize a stale session when no other token is known
    pub default_token: TokenId,

    /// Account allowed to configure rewards and withdraw funds
    pub owner: Option<UserId>,

    /// Most recent events and treasury transactions retained; older
    /// entries are dropped
    pub journal_limit: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            session_duration_secs: MEDITATION_DURATION_SECS,
            cooldown_secs: REWARD_COOLDOWN_SECS,
            daily_cap: DAILY_REWARD_CAP,
            bonus_hour_utc: BONUS_HOUR_UTC,
            bonus_multiplier: BONUS_MULTIPLIER,
            require_registered_tokens: true,
            default_token: TokenId::Native,
            owner: None,
            journal_limit: JOURNAL_LIMIT,
        }
    }
}

impl LedgerConfig {
    pub fn with_owner(mut self, owner: UserId) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.session_duration_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "session_duration_secs",
                message: "must be greater than zero".to_string(),
            });
        }
        if self.bonus_hour_utc > 23 {
            return Err(ConfigError::Invalid {
                field: "bonus_hour_utc",
                message: format!("{} is not an hour of day", self.bonus_hour_utc),
            });
        }
        if self.bonus_multiplier == 0 {
            return Err(ConfigError::Invalid {
                field: "bonus_multiplier",
                message: "must be at least 1".to_string(),
            });
        }
        if self.daily_cap == 0 {
            return Err(ConfigError::Invalid {
                field: "daily_cap",
                message: "must be at least 1".to_string(),
            });
        }
        if self.journal_limit == 0 {
            return Err(ConfigError::Invalid {
                field: "journal_limit",
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    pub fn is_owner(&self, caller: &UserId) -> bool {
        self.owner.as_ref() == Some(caller)
    }
}
