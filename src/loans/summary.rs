/// reporting views of a loan for the hosting layer
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::loans::LoanApplication;
use crate::types::{LoanId, LoanStatus, MemberId, UserId};

/// flat, serializable summary of a loan application.
///
/// Decision fields are optional and populated from whichever outcome the
/// loan reached, so a rendering layer never matches on the sum type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanSummary {
    pub loan_id: LoanId,
    pub member_id: MemberId,
    pub status: LoanStatus,
    pub amount_requested: Money,
    pub purpose: String,
    pub referee_count: usize,
    pub application_date: DateTime<Utc>,

    // approval terms, when approved
    pub amount_approved: Option<Money>,
    pub annual_rate: Option<Rate>,
    pub term_months: Option<u32>,
    pub repayment_start: Option<NaiveDate>,
    pub monthly_payment: Option<Money>,
    pub total_repayment: Option<Money>,
    pub approved_by: Option<UserId>,

    // rejection record, when rejected
    pub rejection_reason: Option<String>,
    pub processed_by: Option<UserId>,
    pub processed_at: Option<DateTime<Utc>>,
}

impl LoanSummary {
    pub fn from_loan(loan: &LoanApplication) -> Self {
        let approval = loan.approval();
        let rejection = loan.rejection();

        Self {
            loan_id: loan.loan_id,
            member_id: loan.member_id,
            status: loan.status,
            amount_requested: loan.amount_requested,
            purpose: loan.purpose.clone(),
            referee_count: loan.referees.len(),
            application_date: loan.application_date,
            amount_approved: approval.map(|a| a.amount_approved),
            annual_rate: approval.map(|a| a.annual_rate),
            term_months: approval.map(|a| a.term_months),
            repayment_start: approval.map(|a| a.repayment_start),
            monthly_payment: approval.map(|a| a.monthly_payment),
            total_repayment: approval.map(|a| a.total_repayment),
            approved_by: approval.map(|a| a.approved_by),
            rejection_reason: rejection.and_then(|r| r.reason.clone()),
            processed_by: approval
                .map(|a| a.approved_by)
                .or(rejection.map(|r| r.processed_by)),
            processed_at: approval
                .map(|a| a.approved_at)
                .or(rejection.map(|r| r.processed_at)),
        }
    }
}
