//! Protocol constants

/// Seconds in one UTC calendar day
pub const SECONDS_PER_DAY: u64 = 86_400;

/// Seconds in one hour
pub const SECONDS_PER_HOUR: u64 = 3_600;

/// Required meditation length (5 minutes)
pub const MEDITATION_DURATION_SECS: u64 = 300;

/// Minimum time between two reward-eligible completions (3 hours)
pub const REWARD_COOLDOWN_SECS: u64 = 3 * SECONDS_PER_HOUR;

/// Reward-eligible completions allowed per user per UTC day
pub const DAILY_REWARD_CAP: u32 = 3;

/// Hour of day (UTC) during which rewards are multiplied
pub const BONUS_HOUR_UTC: u8 = 22;

/// Multiplier applied inside the bonus window
pub const BONUS_MULTIPLIER: u64 = 2;

/// Entries kept in the event journal and the treasury audit trail
pub const JOURNAL_LIMIT: usize = 10_000;

/// Reserved identifier for the chain's native coin
pub const NATIVE_TOKEN: &str = "native";

/// Zero address, accepted as an alias of the native coin
pub const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";
