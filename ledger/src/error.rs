//! Ledger error types

use jibjib_core::{ConfigError, TokenId};
use jibjib_treasury::TreasuryError;
use thiserror::Error;

/// Errors returned by ledger operations.
///
/// Every variant is a deterministic function of state and input: no
/// operation mutates state before returning one of these.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Session already in progress: {remaining}s remaining")]
    AlreadyMeditating { remaining: u64 },

    #[error("No session in progress")]
    NotMeditating,

    #[error("Session not finished: {remaining}s remaining")]
    TooEarly { remaining: u64 },

    #[error("Nothing to claim in {0}")]
    NothingToClaim(TokenId),

    #[error("Token not supported: {0}")]
    UnsupportedToken(TokenId),

    #[error("Amount mismatch: declared {declared}, attached {attached}")]
    AmountMismatch { declared: u64, attached: u64 },

    #[error("Insufficient {token} balance: requested {requested}, available {available}")]
    InsufficientFunds {
        token: TokenId,
        requested: u64,
        available: u64,
    },

    #[error("Amount must be greater than zero")]
    ZeroAmount,

    #[error("Caller is not the ledger owner")]
    Unauthorized,

    #[error("Arithmetic overflow: {0}")]
    ArithmeticOverflow(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl From<TreasuryError> for LedgerError {
    fn from(err: TreasuryError) -> Self {
        match err {
            TreasuryError::InsufficientFunds {
                token,
                requested,
                available,
            } => LedgerError::InsufficientFunds {
                token,
                requested,
                available,
            },
            TreasuryError::ZeroAmount => LedgerError::ZeroAmount,
            TreasuryError::NothingToClaim(token) => LedgerError::NothingToClaim(token),
            TreasuryError::Overflow(what) => LedgerError::ArithmeticOverflow(what),
        }
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
