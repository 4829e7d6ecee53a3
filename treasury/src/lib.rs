//! JIBJIB Treasury
//!
//! Multi-token reward treasury fed by donations:
//! - one fund per token with its configured base reward
//! - atomic check-and-debit payouts that fail softly on shortfall
//! - pending rewards (IOUs) for payouts the treasury could not cover
//! - a complete audit trail of deposits, payouts and withdrawals

pub mod error;
pub mod pending;
pub mod pool;

pub use pool::{
    FundReport, PayoutKind, TokenFund, TransactionKind, TreasuryPool, TreasuryReport,
    TreasuryTransaction,
};

pub use pending::PendingRewardLedger;

pub use error::{Result, TreasuryError};
