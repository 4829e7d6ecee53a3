//! Treasury Pool Management
//!
//! One fund per token. A fund carries the configured base reward and the
//! balance available to pay it. Every credit and debit is recorded in the
//! audit trail.

use jibjib_core::{Timestamp, TokenId, UserId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{Result, TreasuryError};

/// Holdings and reward configuration of a single token
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenFund {
    /// Base payout per eligible completion; 0 means the token is not supported
    pub reward_amount: u64,
    pub balance: u64,
    /// Display symbol (JIBJIB, JBC, tKUB, ...)
    pub symbol: Option<String>,
    pub total_deposited: u64,
    pub total_paid: u64,
    pub total_withdrawn: u64,
}

impl TokenFund {
    pub fn is_supported(&self) -> bool {
        self.reward_amount > 0
    }
}

/// Why funds left the treasury
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PayoutKind {
    /// Paid directly on session completion
    Reward,
    /// Settlement of a previously stored pending reward
    PendingSettlement,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionKind {
    Deposit { donor: Option<UserId> },
    Payout { recipient: UserId, kind: PayoutKind },
    Withdrawal { recipient: UserId },
}

/// Audit trail entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreasuryTransaction {
    pub token: TokenId,
    pub amount: u64,
    pub kind: TransactionKind,
    pub timestamp: Timestamp,
    /// Fund balance right after this transaction
    pub balance_after: u64,
}

/// Per-token summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundReport {
    pub token: TokenId,
    pub symbol: Option<String>,
    pub reward_amount: u64,
    pub balance: u64,
    pub total_deposited: u64,
    pub total_paid: u64,
    pub total_withdrawn: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreasuryReport {
    pub funds: Vec<FundReport>,
    /// Transactions retained in the audit trail
    pub transaction_count: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TreasuryPool {
    funds: BTreeMap<TokenId, TokenFund>,
    transactions: Vec<TreasuryTransaction>,
}

impl TreasuryPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fund for `token`, created on first use
    fn fund_mut(&mut self, token: &TokenId) -> &mut TokenFund {
        self.funds.entry(token.clone()).or_default()
    }

    pub fn fund(&self, token: &TokenId) -> Option<&TokenFund> {
        self.funds.get(token)
    }

    pub fn balance(&self, token: &TokenId) -> u64 {
        self.funds.get(token).map(|f| f.balance).unwrap_or(0)
    }

    pub fn reward_amount(&self, token: &TokenId) -> u64 {
        self.funds.get(token).map(|f| f.reward_amount).unwrap_or(0)
    }

    pub fn is_supported(&self, token: &TokenId) -> bool {
        self.reward_amount(token) > 0
    }

    pub fn set_reward_amount(&mut self, token: &TokenId, amount: u64) {
        self.fund_mut(token).reward_amount = amount;
    }

    pub fn set_symbol(&mut self, token: &TokenId, symbol: impl Into<String>) {
        self.fund_mut(token).symbol = Some(symbol.into());
    }

    pub fn symbol(&self, token: &TokenId) -> Option<&str> {
        self.funds.get(token).and_then(|f| f.symbol.as_deref())
    }

    /// Credit `amount` to the fund of `token`
    pub fn deposit(
        &mut self,
        token: &TokenId,
        amount: u64,
        donor: Option<UserId>,
        timestamp: Timestamp,
    ) -> Result<()> {
        if amount == 0 {
            return Err(TreasuryError::ZeroAmount);
        }

        let fund = self.fund_mut(token);
        let balance = fund
            .balance
            .checked_add(amount)
            .ok_or_else(|| TreasuryError::Overflow(format!("{} balance", token)))?;
        fund.balance = balance;
        fund.total_deposited = fund.total_deposited.saturating_add(amount);

        self.transactions.push(TreasuryTransaction {
            token: token.clone(),
            amount,
            kind: TransactionKind::Deposit { donor },
            timestamp,
            balance_after: balance,
        });

        log::debug!("treasury deposit: {} {} (balance {})", amount, token, balance);
        Ok(())
    }

    /// Pay `amount` out of the fund in one check-and-debit.
    ///
    /// On shortfall nothing is mutated and `InsufficientFunds` is returned;
    /// the caller decides what to do with the unpaid amount.
    pub fn try_pay(
        &mut self,
        token: &TokenId,
        amount: u64,
        recipient: &UserId,
        kind: PayoutKind,
        timestamp: Timestamp,
    ) -> Result<()> {
        if amount == 0 {
            return Err(TreasuryError::ZeroAmount);
        }

        let balance_after = self.debit(token, amount)?;
        if let Some(fund) = self.funds.get_mut(token) {
            fund.total_paid = fund.total_paid.saturating_add(amount);
        }

        self.transactions.push(TreasuryTransaction {
            token: token.clone(),
            amount,
            kind: TransactionKind::Payout {
                recipient: recipient.clone(),
                kind,
            },
            timestamp,
            balance_after,
        });

        log::info!("paid {} {} to {} ({:?})", amount, token, recipient, kind);
        Ok(())
    }

    /// Move funds out of the treasury to `recipient`
    pub fn withdraw(
        &mut self,
        token: &TokenId,
        amount: u64,
        recipient: &UserId,
        timestamp: Timestamp,
    ) -> Result<()> {
        if amount == 0 {
            return Err(TreasuryError::ZeroAmount);
        }

        let balance_after = self.debit(token, amount)?;
        if let Some(fund) = self.funds.get_mut(token) {
            fund.total_withdrawn = fund.total_withdrawn.saturating_add(amount);
        }

        self.transactions.push(TreasuryTransaction {
            token: token.clone(),
            amount,
            kind: TransactionKind::Withdrawal {
                recipient: recipient.clone(),
            },
            timestamp,
            balance_after,
        });

        log::info!("withdrew {} {} to {}", amount, token, recipient);
        Ok(())
    }

    fn debit(&mut self, token: &TokenId, amount: u64) -> Result<u64> {
        let available = self.balance(token);
        if available < amount {
            return Err(TreasuryError::InsufficientFunds {
                token: token.clone(),
                requested: amount,
                available,
            });
        }

        let fund = self.fund_mut(token);
        fund.balance = available - amount;
        Ok(fund.balance)
    }

    /// Audit trail, oldest first
    pub fn transactions(&self) -> &[TreasuryTransaction] {
        &self.transactions
    }

    /// Drop the oldest transactions so at most `keep` remain
    pub fn trim_transactions(&mut self, keep: usize) {
        if self.transactions.len() > keep {
            let excess = self.transactions.len() - keep;
            self.transactions.drain(..excess);
        }
    }

    pub fn tokens(&self) -> impl Iterator<Item = &TokenId> {
        self.funds.keys()
    }

    pub fn report(&self) -> TreasuryReport {
        TreasuryReport {
            funds: self
                .funds
                .iter()
                .map(|(token, fund)| FundReport {
                    token: token.clone(),
                    symbol: fund.symbol.clone(),
                    reward_amount: fund.reward_amount,
                    balance: fund.balance,
                    total_deposited: fund.total_deposited,
                    total_paid: fund.total_paid,
                    total_withdrawn: fund.total_withdrawn,
                })
                .collect(),
            transaction_count: self.transactions.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> UserId {
        UserId::new("alice")
    }

    #[test]
    fn test_deposit_and_balance() {
        let mut pool = TreasuryPool::new();
        pool.deposit(&TokenId::Native, 100, None, 1000).unwrap();
        pool.deposit(&TokenId::Native, 50, Some(alice()), 1001).unwrap();

        assert_eq!(pool.balance(&TokenId::Native), 150);
        assert_eq!(pool.transactions().len(), 2);
        assert_eq!(pool.transactions()[1].balance_after, 150);
    }

    #[test]
    fn test_zero_deposit_rejected() {
        let mut pool = TreasuryPool::new();
        assert_eq!(
            pool.deposit(&TokenId::Native, 0, None, 1000),
            Err(TreasuryError::ZeroAmount)
        );
        assert!(pool.transactions().is_empty());
    }

    #[test]
    fn test_try_pay_exact_balance() {
        let mut pool = TreasuryPool::new();
        pool.deposit(&TokenId::Native, 10, None, 1000).unwrap();

        pool.try_pay(&TokenId::Native, 10, &alice(), PayoutKind::Reward, 1001)
            .unwrap();
        assert_eq!(pool.balance(&TokenId::Native), 0);
        assert_eq!(pool.fund(&TokenId::Native).unwrap().total_paid, 10);
    }

    #[test]
    fn test_try_pay_shortfall_leaves_balance() {
        let mut pool = TreasuryPool::new();
        pool.deposit(&TokenId::Native, 10, None, 1000).unwrap();

        let result = pool.try_pay(&TokenId::Native, 20, &alice(), PayoutKind::Reward, 1001);
        assert_eq!(
            result,
            Err(TreasuryError::InsufficientFunds {
                token: TokenId::Native,
                requested: 20,
                available: 10,
            })
        );
        assert_eq!(pool.balance(&TokenId::Native), 10);
        assert_eq!(pool.transactions().len(), 1);
    }

    #[test]
    fn test_unknown_token_has_nothing() {
        let mut pool = TreasuryPool::new();
        let token = TokenId::contract("0x440bb674a2e443d600396a69c4c46362148699a2").unwrap();

        assert_eq!(pool.balance(&token), 0);
        assert!(!pool.is_supported(&token));
        assert!(pool
            .try_pay(&token, 1, &alice(), PayoutKind::Reward, 1000)
            .is_err());
    }

    #[test]
    fn test_reward_amount_registration() {
        let mut pool = TreasuryPool::new();
        pool.set_reward_amount(&TokenId::Native, 10);
        pool.set_symbol(&TokenId::Native, "JBC");

        assert!(pool.is_supported(&TokenId::Native));
        assert_eq!(pool.symbol(&TokenId::Native), Some("JBC"));
        assert_eq!(pool.balance(&TokenId::Native), 0);
    }

    #[test]
    fn test_withdraw_and_report() {
        let mut pool = TreasuryPool::new();
        pool.deposit(&TokenId::Native, 100, None, 1000).unwrap();
        pool.withdraw(&TokenId::Native, 40, &alice(), 1001).unwrap();
        assert!(pool.withdraw(&TokenId::Native, 61, &alice(), 1002).is_err());

        let report = pool.report();
        assert_eq!(report.funds.len(), 1);
        assert_eq!(report.funds[0].balance, 60);
        assert_eq!(report.funds[0].total_deposited, 100);
        assert_eq!(report.funds[0].total_withdrawn, 40);
        assert_eq!(report.transaction_count, 2);
    }

    #[test]
    fn test_trim_keeps_newest_transactions() {
        let mut pool = TreasuryPool::new();
        for ts in 1..=5 {
            pool.deposit(&TokenId::Native, 10, None, ts).unwrap();
        }

        pool.trim_transactions(2);
        let kept: Vec<u64> = pool.transactions().iter().map(|t| t.timestamp).collect();
        assert_eq!(kept, vec![4, 5]);
        assert_eq!(pool.balance(&TokenId::Native), 50);

        pool.trim_transactions(10);
        assert_eq!(pool.transactions().len(), 2);
    }
}
