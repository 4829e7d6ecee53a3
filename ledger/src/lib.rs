//! JIBJIB Meditation Reward Ledger
//!
//! Authoritative record of meditation sessions and the rewards they earn:
//! - session state machine with auto-finalization of stale sessions
//! - daily cap, cooldown and bonus-hour eligibility rules
//! - treasury payouts that degrade to pending rewards on shortfall
//! - donations, owner administration and an event journal

pub mod eligibility;
pub mod error;
pub mod events;
pub mod gateway;
pub mod ledger;
pub mod session;
pub mod shared;
pub mod user;

pub use eligibility::{Ineligibility, RewardEligibility};
pub use error::{LedgerError, Result};
pub use events::LedgerEvent;
pub use gateway::Donation;
pub use ledger::{LedgerState, MeditationLedger};
pub use session::{Completion, Outcome, SessionStart, SessionTracker};
pub use shared::SharedLedger;
pub use user::{UserRecord, UserStats};
