//! Pending rewards owed per (user, token)
//!
//! An entry is created when a reward is earned but the treasury cannot pay
//! it. Entries only grow until a claim settles them in full.

use jibjib_core::{Timestamp, TokenId, UserId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{Result, TreasuryError};
use crate::pool::{PayoutKind, TreasuryPool};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PendingRewardLedger {
    owed: BTreeMap<UserId, BTreeMap<TokenId, u64>>,
}

impl PendingRewardLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self, user: &UserId, token: &TokenId) -> u64 {
        self.owed
            .get(user)
            .and_then(|tokens| tokens.get(token))
            .copied()
            .unwrap_or(0)
    }

    /// True if the user is owed anything in any token
    pub fn has_pending(&self, user: &UserId) -> bool {
        self.owed
            .get(user)
            .map(|tokens| tokens.values().any(|&amount| amount > 0))
            .unwrap_or(false)
    }

    /// All non-zero entries of one user
    pub fn pending_for(&self, user: &UserId) -> Vec<(TokenId, u64)> {
        self.owed
            .get(user)
            .map(|tokens| {
                tokens
                    .iter()
                    .filter(|(_, amount)| **amount > 0)
                    .map(|(token, &amount)| (token.clone(), amount))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Sum owed to all users in `token`
    pub fn total_owed(&self, token: &TokenId) -> u64 {
        self.owed
            .values()
            .filter_map(|tokens| tokens.get(token))
            .fold(0u64, |acc, &amount| acc.saturating_add(amount))
    }

    /// Add `amount` to what `user` is owed in `token`. Returns the new total.
    pub fn credit(&mut self, user: &UserId, token: &TokenId, amount: u64) -> Result<u64> {
        if amount == 0 {
            return Err(TreasuryError::ZeroAmount);
        }

        let current = self.pending(user, token);
        let total = current.checked_add(amount).ok_or_else(|| {
            TreasuryError::Overflow(format!("pending {} for {}", token, user))
        })?;

        self.owed
            .entry(user.clone())
            .or_default()
            .insert(token.clone(), total);

        log::debug!(
            "stored pending reward: {} {} for {} (owed {})",
            amount,
            token,
            user,
            total
        );
        Ok(total)
    }

    /// Settle everything `user` is owed in `token` against the treasury.
    ///
    /// Pays the whole amount or nothing: on shortfall the entry is left
    /// untouched and the treasury error is returned.
    pub fn claim(
        &mut self,
        treasury: &mut TreasuryPool,
        user: &UserId,
        token: &TokenId,
        timestamp: Timestamp,
    ) -> Result<u64> {
        let owed = self.pending(user, token);
        if owed == 0 {
            return Err(TreasuryError::NothingToClaim(token.clone()));
        }

        treasury.try_pay(token, owed, user, PayoutKind::PendingSettlement, timestamp)?;

        if let Some(tokens) = self.owed.get_mut(user) {
            tokens.remove(token);
            if tokens.is_empty() {
                self.owed.remove(user);
            }
        }

        Ok(owed)
    }
}
