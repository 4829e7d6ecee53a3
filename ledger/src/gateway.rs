//! Donation validation
//!
//! Native coin donations carry their value attached to the call; the
//! declared amount is either zero or must equal it. Token donations declare
//! the amount and carry no value (the token transfer itself is authorised
//! outside the ledger).

use jibjib_core::{LedgerConfig, TokenId};
use jibjib_treasury::TreasuryPool;
use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Donation {
    pub token: TokenId,
    /// Declared amount
    pub amount: u64,
    /// Native value attached to the call
    pub attached_value: u64,
}

impl Donation {
    pub fn native(value: u64) -> Self {
        Self {
            token: TokenId::Native,
            amount: 0,
            attached_value: value,
        }
    }

    pub fn token(token: TokenId, amount: u64) -> Self {
        Self {
            token,
            amount,
            attached_value: 0,
        }
    }
}

/// Amount the treasury should be credited with for `donation`
pub fn credited_amount(
    donation: &Donation,
    config: &LedgerConfig,
    treasury: &TreasuryPool,
) -> Result<u64> {
    if donation.token.is_native() {
        if donation.amount != 0 && donation.amount != donation.attached_value {
            return Err(LedgerError::AmountMismatch {
                declared: donation.amount,
                attached: donation.attached_value,
            });
        }
        if donation.attached_value == 0 {
            return Err(LedgerError::ZeroAmount);
        }
        return Ok(donation.attached_value);
    }

    if donation.attached_value != 0 {
        return Err(LedgerError::AmountMismatch {
            declared: donation.amount,
            attached: donation.attached_value,
        });
    }
    if donation.amount == 0 {
        return Err(LedgerError::ZeroAmount);
    }
    if config.require_registered_tokens && !treasury.is_supported(&donation.token) {
        return Err(LedgerError::UnsupportedToken(donation.token.clone()));
    }

    Ok(donation.amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jibjib() -> TokenId {
        TokenId::contract("0xebe937ee67e3219d176965cc08110a258f925e01").unwrap()
    }

    #[test]
    fn test_native_uses_attached_value() {
        let config = LedgerConfig::default();
        let treasury = TreasuryPool::new();

        assert_eq!(credited_amount(&Donation::native(50), &config, &treasury), Ok(50));

        let matching = Donation {
            token: TokenId::Native,
            amount: 50,
            attached_value: 50,
        };
        assert_eq!(credited_amount(&matching, &config, &treasury), Ok(50));
    }

    #[test]
    fn test_native_mismatch() {
        let config = LedgerConfig::default();
        let treasury = TreasuryPool::new();
        let donation = Donation {
            token: TokenId::Native,
            amount: 40,
            attached_value: 50,
        };

        assert_eq!(
            credited_amount(&donation, &config, &treasury),
            Err(LedgerError::AmountMismatch {
                declared: 40,
                attached: 50
            })
        );
        assert_eq!(
            credited_amount(&Donation::native(0), &config, &treasury),
            Err(LedgerError::ZeroAmount)
        );
    }

    #[test]
    fn test_token_requires_registration() {
        let config = LedgerConfig::default();
        let mut treasury = TreasuryPool::new();

        assert_eq!(
            credited_amount(&Donation::token(jibjib(), 100), &config, &treasury),
            Err(LedgerError::UnsupportedToken(jibjib()))
        );

        treasury.set_reward_amount(&jibjib(), 10);
        assert_eq!(
            credited_amount(&Donation::token(jibjib(), 100), &config, &treasury),
            Ok(100)
        );
    }

    #[test]
    fn test_open_policy_accepts_unregistered() {
        let config = LedgerConfig {
            require_registered_tokens: false,
            ..Default::default()
        };
        let treasury = TreasuryPool::new();

        assert_eq!(
            credited_amount(&Donation::token(jibjib(), 100), &config, &treasury),
            Ok(100)
        );
    }

    #[test]
    fn test_token_with_value_attached() {
        let config = LedgerConfig::default();
        let treasury = TreasuryPool::new();
        let donation = Donation {
            token: jibjib(),
            amount: 100,
            attached_value: 1,
        };

        assert!(matches!(
            credited_amount(&donation, &config, &treasury),
            Err(LedgerError::AmountMismatch { .. })
        ));
    }
}
