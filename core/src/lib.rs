//! JIBJIB Core Library
//!
//! Shared vocabulary for the meditation reward ledger: identifiers,
//! protocol constants, the injected clock and the rule configuration.

pub mod clock;
pub mod config;
pub mod constants;
pub mod ids;

// Re-export main types
pub use clock::{day_bucket, format_timestamp, hour_of_day, Clock, ManualClock, SystemClock, Timestamp};
pub use config::{ConfigError, LedgerConfig};
pub use ids::{IdError, TokenId, UserId};
