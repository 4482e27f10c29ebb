use chrono::{DateTime, Utc};
use hourglass_rs::SafeTimeProvider;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::Money;
use crate::errors::{LendingError, Result};
use crate::types::{MemberId, UserId};

/// direction of a savings entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryKind {
    Deposit,
    Withdrawal,
}

/// single posted savings transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavingsEntry {
    pub entry_id: Uuid,
    pub member_id: MemberId,
    pub kind: EntryKind,
    pub amount: Money,
    pub reference: String,
    pub recorded_by: UserId,
    pub recorded_at: DateTime<Utc>,
}

/// append-only ledger of member savings transactions.
///
/// Balances are derived by summing entries, never stored, so the ledger
/// and the balance cannot disagree.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SavingsLedger {
    entries: Vec<SavingsEntry>,
}

impl SavingsLedger {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// post a deposit for a member
    pub fn record_deposit(
        &mut self,
        member_id: MemberId,
        amount: Money,
        reference: impl Into<String>,
        recorded_by: UserId,
        time_provider: &SafeTimeProvider,
    ) -> Result<Money> {
        if !amount.is_positive() {
            return Err(LendingError::validation(vec![format!(
                "deposit amount must be greater than zero, got {}",
                amount
            )]));
        }

        self.entries.push(SavingsEntry {
            entry_id: Uuid::new_v4(),
            member_id,
            kind: EntryKind::Deposit,
            amount,
            reference: reference.into(),
            recorded_by,
            recorded_at: time_provider.now(),
        });

        Ok(self.balance_of(member_id))
    }

    /// post a withdrawal for a member, refusing to overdraw
    pub fn record_withdrawal(
        &mut self,
        member_id: MemberId,
        amount: Money,
        reference: impl Into<String>,
        recorded_by: UserId,
        time_provider: &SafeTimeProvider,
    ) -> Result<Money> {
        if !amount.is_positive() {
            return Err(LendingError::validation(vec![format!(
                "withdrawal amount must be greater than zero, got {}",
                amount
            )]));
        }

        let balance = self.balance_of(member_id);
        if amount > balance {
            return Err(LendingError::InsufficientSavings {
                balance,
                requested: amount,
            });
        }

        self.entries.push(SavingsEntry {
            entry_id: Uuid::new_v4(),
            member_id,
            kind: EntryKind::Withdrawal,
            amount,
            reference: reference.into(),
            recorded_by,
            recorded_at: time_provider.now(),
        });

        Ok(self.balance_of(member_id))
    }

    /// derived savings balance for a member
    pub fn balance_of(&self, member_id: MemberId) -> Money {
        self.entries
            .iter()
            .filter(|e| e.member_id == member_id)
            .fold(Money::ZERO, |acc, e| match e.kind {
                EntryKind::Deposit => acc + e.amount,
                EntryKind::Withdrawal => acc - e.amount,
            })
    }

    /// all entries for a member, oldest first
    pub fn statement_of(&self, member_id: MemberId) -> Vec<&SavingsEntry> {
        self.entries
            .iter()
            .filter(|e| e.member_id == member_id)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
