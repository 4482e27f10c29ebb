pub mod eligibility;
pub mod repayment;
pub mod summary;

use chrono::{DateTime, NaiveDate, Utc};
use hourglass_rs::SafeTimeProvider;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::{Money, Rate};
use crate::errors::{LendingError, Result};
use crate::types::{LoanId, LoanStatus, MemberId, UserId};

pub use eligibility::EligibilitySignal;
pub use repayment::{Installment, RepaymentQuote, RepaymentSchedule};
pub use summary::LoanSummary;

/// terms recorded when a loan is approved, fixed for the life of the loan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalTerms {
    pub amount_approved: Money,
    pub annual_rate: Rate,
    pub term_months: u32,
    pub repayment_start: NaiveDate,
    pub monthly_payment: Money,
    pub total_repayment: Money,
    pub approved_by: UserId,
    pub approved_at: DateTime<Utc>,
}

impl ApprovalTerms {
    /// expand the terms into the full installment schedule
    pub fn schedule(&self, loan_id: LoanId) -> Result<RepaymentSchedule> {
        RepaymentSchedule::generate(
            loan_id,
            self.amount_approved,
            self.annual_rate,
            self.term_months,
            self.repayment_start,
        )
    }
}

/// record of a declined application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rejection {
    pub reason: Option<String>,
    pub processed_by: UserId,
    pub processed_at: DateTime<Utc>,
}

/// decision state of a loan.
///
/// Approval terms and a rejection can never coexist; the variant carries
/// whichever record applies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoanOutcome {
    Pending,
    Approved(ApprovalTerms),
    Rejected(Rejection),
}

impl LoanOutcome {
    pub fn approval(&self) -> Option<&ApprovalTerms> {
        match self {
            LoanOutcome::Approved(terms) => Some(terms),
            _ => None,
        }
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            LoanOutcome::Rejected(rejection) => Some(rejection),
            _ => None,
        }
    }
}

/// member loan application, the aggregate root of the lending workflow.
///
/// Created by `submit`, mutated only through the transition methods,
/// never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanApplication {
    pub loan_id: LoanId,
    pub member_id: MemberId,
    pub amount_requested: Money,
    pub purpose: String,
    /// co-signing members, at most two
    pub referees: Vec<MemberId>,
    pub application_date: DateTime<Utc>,
    pub status: LoanStatus,
    pub outcome: LoanOutcome,
}

impl LoanApplication {
    /// create a pending application
    pub fn submit(
        member_id: MemberId,
        amount_requested: Money,
        purpose: impl Into<String>,
        referees: Vec<MemberId>,
        time_provider: &SafeTimeProvider,
    ) -> Self {
        Self {
            loan_id: Uuid::new_v4(),
            member_id,
            amount_requested,
            purpose: purpose.into(),
            referees,
            application_date: time_provider.now(),
            status: LoanStatus::Pending,
            outcome: LoanOutcome::Pending,
        }
    }

    /// record an approval. Only a pending loan can be approved.
    pub fn approve(&mut self, terms: ApprovalTerms) -> Result<()> {
        match self.status {
            LoanStatus::Pending => {
                self.status = LoanStatus::Approved;
                self.outcome = LoanOutcome::Approved(terms);
                Ok(())
            }
            status => Err(LendingError::AlreadyProcessed { status }),
        }
    }

    /// record a rejection. Only a pending loan can be rejected; the
    /// outcome variant guarantees no approval data survives.
    pub fn reject(&mut self, rejection: Rejection) -> Result<()> {
        match self.status {
            LoanStatus::Pending => {
                self.status = LoanStatus::Rejected;
                self.outcome = LoanOutcome::Rejected(rejection);
                Ok(())
            }
            status => Err(LendingError::AlreadyProcessed { status }),
        }
    }

    /// mark the approved loan as disbursed and running
    pub fn activate(&mut self) -> Result<()> {
        match self.status {
            LoanStatus::Approved => {
                self.status = LoanStatus::Active;
                Ok(())
            }
            from => Err(LendingError::InvalidTransition {
                from,
                to: LoanStatus::Active,
            }),
        }
    }

    /// mark the running loan as fully repaid
    pub fn complete(&mut self) -> Result<()> {
        match self.status {
            LoanStatus::Active => {
                self.status = LoanStatus::Completed;
                Ok(())
            }
            from => Err(LendingError::InvalidTransition {
                from,
                to: LoanStatus::Completed,
            }),
        }
    }

    /// write the running loan off
    pub fn mark_defaulted(&mut self) -> Result<()> {
        match self.status {
            LoanStatus::Active => {
                self.status = LoanStatus::Defaulted;
                Ok(())
            }
            from => Err(LendingError::InvalidTransition {
                from,
                to: LoanStatus::Defaulted,
            }),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status.is_pending()
    }

    pub fn approval(&self) -> Option<&ApprovalTerms> {
        self.outcome.approval()
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        self.outcome.rejection()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use hourglass_rs::TimeSource;
    use rust_decimal_macros::dec;

    fn test_time() -> SafeTimeProvider {
        SafeTimeProvider::new(TimeSource::Test(
            Utc.with_ymd_and_hms(2024, 6, 10, 9, 30, 0).unwrap(),
        ))
    }

    fn pending_loan(time: &SafeTimeProvider) -> LoanApplication {
        LoanApplication::submit(
            Uuid::new_v4(),
            Money::from_major(500_000),
            "school fees",
            vec![Uuid::new_v4()],
            time,
        )
    }

    fn terms(time: &SafeTimeProvider) -> ApprovalTerms {
        let quote = RepaymentQuote::compute(
            Money::from_major(500_000),
            Rate::from_percent(dec!(12)),
            24,
        );
        ApprovalTerms {
            amount_approved: Money::from_major(500_000),
            annual_rate: Rate::from_percent(dec!(12)),
            term_months: 24,
            repayment_start: NaiveDate::from_ymd_opt(2024, 8, 1).unwrap(),
            monthly_payment: quote.monthly_payment,
            total_repayment: quote.total_repayment,
            approved_by: Uuid::new_v4(),
            approved_at: time.now(),
        }
    }

    #[test]
    fn test_submit_starts_pending() {
        let time = test_time();
        let loan = pending_loan(&time);
        assert!(loan.is_pending());
        assert_eq!(loan.outcome, LoanOutcome::Pending);
        assert_eq!(loan.application_date, time.now());
    }

    #[test]
    fn test_approve_pending_loan() {
        let time = test_time();
        let mut loan = pending_loan(&time);

        loan.approve(terms(&time)).unwrap();

        assert_eq!(loan.status, LoanStatus::Approved);
        let recorded = loan.approval().unwrap();
        assert_eq!(recorded.amount_approved, Money::from_major(500_000));
        assert!(loan.rejection().is_none());
    }

    #[test]
    fn test_approve_is_not_repeatable() {
        let time = test_time();
        let mut loan = pending_loan(&time);
        loan.approve(terms(&time)).unwrap();

        let first_terms = loan.approval().unwrap().clone();
        let err = loan.approve(terms(&time)).unwrap_err();

        assert!(matches!(
            err,
            LendingError::AlreadyProcessed {
                status: LoanStatus::Approved
            }
        ));
        // first decision stands untouched
        assert_eq!(loan.approval().unwrap(), &first_terms);
    }

    #[test]
    fn test_reject_pending_loan_leaves_no_approval_data() {
        let time = test_time();
        let mut loan = pending_loan(&time);

        loan.reject(Rejection {
            reason: Some("insufficient collateral".to_string()),
            processed_by: Uuid::new_v4(),
            processed_at: time.now(),
        })
        .unwrap();

        assert_eq!(loan.status, LoanStatus::Rejected);
        assert!(loan.approval().is_none());
        assert_eq!(
            loan.rejection().unwrap().reason.as_deref(),
            Some("insufficient collateral")
        );
    }

    #[test]
    fn test_reject_is_not_repeatable() {
        let time = test_time();
        let mut loan = pending_loan(&time);
        loan.reject(Rejection {
            reason: Some("first reason".to_string()),
            processed_by: Uuid::new_v4(),
            processed_at: time.now(),
        })
        .unwrap();

        let err = loan
            .reject(Rejection {
                reason: Some("second reason".to_string()),
                processed_by: Uuid::new_v4(),
                processed_at: time.now(),
            })
            .unwrap_err();

        assert!(err.is_conflict());
        assert_eq!(
            loan.rejection().unwrap().reason.as_deref(),
            Some("first reason")
        );
    }

    #[test]
    fn test_decisions_blocked_in_every_non_pending_status() {
        let time = test_time();

        let mut approved = pending_loan(&time);
        approved.approve(terms(&time)).unwrap();
        approved.activate().unwrap();
        assert!(approved.approve(terms(&time)).unwrap_err().is_conflict());
        assert!(approved
            .reject(Rejection {
                reason: None,
                processed_by: Uuid::new_v4(),
                processed_at: time.now(),
            })
            .unwrap_err()
            .is_conflict());

        approved.complete().unwrap();
        assert!(approved.approve(terms(&time)).unwrap_err().is_conflict());
    }

    #[test]
    fn test_servicing_transitions() {
        let time = test_time();
        let mut loan = pending_loan(&time);

        // cannot activate before approval
        assert!(matches!(
            loan.activate().unwrap_err(),
            LendingError::InvalidTransition {
                from: LoanStatus::Pending,
                to: LoanStatus::Active
            }
        ));

        loan.approve(terms(&time)).unwrap();
        loan.activate().unwrap();
        assert_eq!(loan.status, LoanStatus::Active);

        let mut defaulted = loan.clone();
        defaulted.mark_defaulted().unwrap();
        assert_eq!(defaulted.status, LoanStatus::Defaulted);
        // approval terms survive servicing transitions
        assert!(defaulted.approval().is_some());

        loan.complete().unwrap();
        assert_eq!(loan.status, LoanStatus::Completed);
        assert!(loan.complete().is_err());
    }

    #[test]
    fn test_terms_expand_to_schedule() {
        let time = test_time();
        let mut loan = pending_loan(&time);
        loan.approve(terms(&time)).unwrap();

        let schedule = loan.approval().unwrap().schedule(loan.loan_id).unwrap();
        assert_eq!(schedule.installments.len(), 24);
        assert_eq!(schedule.principal, Money::from_major(500_000));
    }

    #[test]
    fn test_loan_json_round_trip() {
        let time = test_time();
        let mut loan = pending_loan(&time);
        loan.approve(terms(&time)).unwrap();

        let json = serde_json::to_string(&loan).unwrap();
        let restored: LoanApplication = serde_json::from_str(&json).unwrap();

        assert_eq!(restored, loan);
        assert_eq!(
            restored.approval().unwrap().monthly_payment,
            loan.approval().unwrap().monthly_payment
        );
    }
}
