use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use hourglass_rs::SafeTimeProvider;

use crate::decimal::Money;
use crate::errors::{LendingError, Result};
use crate::loans::{ApprovalTerms, LoanApplication, Rejection};
use crate::members::Member;
use crate::savings::SavingsLedger;
use crate::types::{LoanId, MemberId, UserId};

/// state-changing command applied to a stored loan.
///
/// Each command carries its own precondition on the current status; a
/// backing database renders the decision commands as a conditional
/// `UPDATE ... WHERE status = 'pending'` and treats zero affected rows as
/// the conflict.
#[derive(Debug, Clone)]
pub enum LoanCommand {
    Approve(ApprovalTerms),
    Reject(Rejection),
    Activate,
    Complete,
    MarkDefaulted,
}

/// persistence boundary for the lending desk.
///
/// `commit` must check the transition precondition against the *stored*
/// status at write time, not a status read earlier, and must apply the
/// outcome record and the status change together or not at all.
pub trait LoanStore {
    fn fetch_loan(&self, id: LoanId) -> Result<LoanApplication>;
    fn insert_loan(&self, loan: &LoanApplication) -> Result<()>;

    fn fetch_member(&self, id: MemberId) -> Result<Member>;
    fn insert_member(&self, member: &Member) -> Result<()>;

    /// aggregate savings balance of a member
    fn savings_balance(&self, member_id: MemberId) -> Result<Money>;
    fn record_deposit(
        &self,
        member_id: MemberId,
        amount: Money,
        reference: &str,
        recorded_by: UserId,
        time_provider: &SafeTimeProvider,
    ) -> Result<Money>;
    fn record_withdrawal(
        &self,
        member_id: MemberId,
        amount: Money,
        reference: &str,
        recorded_by: UserId,
        time_provider: &SafeTimeProvider,
    ) -> Result<Money>;

    /// apply a lifecycle command atomically, returning the stored loan
    /// after the transition
    fn commit(&self, id: LoanId, command: LoanCommand) -> Result<LoanApplication>;
}

impl<S: LoanStore + ?Sized> LoanStore for Arc<S> {
    fn fetch_loan(&self, id: LoanId) -> Result<LoanApplication> {
        (**self).fetch_loan(id)
    }

    fn insert_loan(&self, loan: &LoanApplication) -> Result<()> {
        (**self).insert_loan(loan)
    }

    fn fetch_member(&self, id: MemberId) -> Result<Member> {
        (**self).fetch_member(id)
    }

    fn insert_member(&self, member: &Member) -> Result<()> {
        (**self).insert_member(member)
    }

    fn savings_balance(&self, member_id: MemberId) -> Result<Money> {
        (**self).savings_balance(member_id)
    }

    fn record_deposit(
        &self,
        member_id: MemberId,
        amount: Money,
        reference: &str,
        recorded_by: UserId,
        time_provider: &SafeTimeProvider,
    ) -> Result<Money> {
        (**self).record_deposit(member_id, amount, reference, recorded_by, time_provider)
    }

    fn record_withdrawal(
        &self,
        member_id: MemberId,
        amount: Money,
        reference: &str,
        recorded_by: UserId,
        time_provider: &SafeTimeProvider,
    ) -> Result<Money> {
        (**self).record_withdrawal(member_id, amount, reference, recorded_by, time_provider)
    }

    fn commit(&self, id: LoanId, command: LoanCommand) -> Result<LoanApplication> {
        (**self).commit(id, command)
    }
}

/// in-memory reference store.
///
/// One mutex guards loans, members and the savings ledger, so `commit`
/// holds the lock across the precondition check and both writes, the
/// in-process analogue of a single short-lived transaction.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<StoreInner>,
}

#[derive(Debug, Default)]
struct StoreInner {
    loans: HashMap<LoanId, LoanApplication>,
    members: HashMap<MemberId, Member>,
    savings: SavingsLedger,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn locked(&self) -> Result<std::sync::MutexGuard<'_, StoreInner>> {
        self.inner.lock().map_err(|_| LendingError::Storage {
            message: "store lock poisoned".to_string(),
        })
    }
}

impl LoanStore for MemoryStore {
    fn fetch_loan(&self, id: LoanId) -> Result<LoanApplication> {
        self.locked()?
            .loans
            .get(&id)
            .cloned()
            .ok_or(LendingError::LoanNotFound { id })
    }

    fn insert_loan(&self, loan: &LoanApplication) -> Result<()> {
        let mut inner = self.locked()?;
        if inner.loans.contains_key(&loan.loan_id) {
            return Err(LendingError::Storage {
                message: format!("duplicate loan id {}", loan.loan_id),
            });
        }
        inner.loans.insert(loan.loan_id, loan.clone());
        Ok(())
    }

    fn fetch_member(&self, id: MemberId) -> Result<Member> {
        self.locked()?
            .members
            .get(&id)
            .cloned()
            .ok_or(LendingError::MemberNotFound { id })
    }

    fn insert_member(&self, member: &Member) -> Result<()> {
        let mut inner = self.locked()?;
        if inner.members.contains_key(&member.member_id) {
            return Err(LendingError::Storage {
                message: format!("duplicate member id {}", member.member_id),
            });
        }
        inner.members.insert(member.member_id, member.clone());
        Ok(())
    }

    fn savings_balance(&self, member_id: MemberId) -> Result<Money> {
        Ok(self.locked()?.savings.balance_of(member_id))
    }

    fn record_deposit(
        &self,
        member_id: MemberId,
        amount: Money,
        reference: &str,
        recorded_by: UserId,
        time_provider: &SafeTimeProvider,
    ) -> Result<Money> {
        let mut inner = self.locked()?;
        if !inner.members.contains_key(&member_id) {
            return Err(LendingError::MemberNotFound { id: member_id });
        }
        inner
            .savings
            .record_deposit(member_id, amount, reference, recorded_by, time_provider)
    }

    fn record_withdrawal(
        &self,
        member_id: MemberId,
        amount: Money,
        reference: &str,
        recorded_by: UserId,
        time_provider: &SafeTimeProvider,
    ) -> Result<Money> {
        let mut inner = self.locked()?;
        if !inner.members.contains_key(&member_id) {
            return Err(LendingError::MemberNotFound { id: member_id });
        }
        inner
            .savings
            .record_withdrawal(member_id, amount, reference, recorded_by, time_provider)
    }

    fn commit(&self, id: LoanId, command: LoanCommand) -> Result<LoanApplication> {
        let mut inner = self.locked()?;
        let loan = inner
            .loans
            .get_mut(&id)
            .ok_or(LendingError::LoanNotFound { id })?;

        match command {
            LoanCommand::Approve(terms) => loan.approve(terms)?,
            LoanCommand::Reject(rejection) => loan.reject(rejection)?,
            LoanCommand::Activate => loan.activate()?,
            LoanCommand::Complete => loan.complete()?,
            LoanCommand::MarkDefaulted => loan.mark_defaulted()?,
        }

        Ok(loan.clone())
    }
}
