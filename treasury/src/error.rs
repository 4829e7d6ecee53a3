//! Treasury error types

use jibjib_core::TokenId;
use thiserror::Error;

/// Treasury and pending-reward errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreasuryError {
    #[error("Insufficient {token} balance: requested {requested}, available {available}")]
    InsufficientFunds {
        token: TokenId,
        requested: u64,
        available: u64,
    },

    #[error("Amount must be greater than zero")]
    ZeroAmount,

    #[error("Nothing to claim in {0}")]
    NothingToClaim(TokenId),

    #[error("Arithmetic overflow: {0}")]
    Overflow(String),
}

pub type Result<T> = std::result::Result<T, TreasuryError>;
