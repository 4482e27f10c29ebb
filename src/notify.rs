use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::loans::{ApprovalTerms, Rejection};
use crate::members::Member;

/// delivery failure reported by a notifier
#[derive(Debug, Error)]
#[error("notification failed: {message}")]
pub struct NotifyError {
    pub message: String,
}

impl NotifyError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// what became of the best-effort notice attached to a committed decision.
///
/// A failed delivery is a warning on the receipt, never a failure of the
/// decision itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationOutcome {
    Delivered,
    Failed { warning: String },
    /// member left no contact address
    Skipped,
}

impl NotificationOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, NotificationOutcome::Delivered)
    }

    pub fn warning(&self) -> Option<&str> {
        match self {
            NotificationOutcome::Failed { warning } => Some(warning),
            _ => None,
        }
    }
}

/// rendered decision notice ready for dispatch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionNotice {
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

impl DecisionNotice {
    /// render an approval notice, or nothing if the member is unreachable
    pub fn approval(member: &Member, terms: &ApprovalTerms) -> Option<Self> {
        let recipient = member.notice_address()?.to_string();
        let body = format!(
            "Dear {},\n\nYour loan application has been approved.\n\n\
             Amount approved: {}\nAnnual interest rate: {}\nTerm: {} months\n\
             Monthly payment: {}\nTotal repayment: {}\nFirst payment due: {}\n\n\
             Please visit the office to complete disbursement.",
            member.full_name,
            terms.amount_approved,
            terms.annual_rate,
            terms.term_months,
            terms.monthly_payment,
            terms.total_repayment,
            terms.repayment_start,
        );

        Some(Self {
            recipient,
            subject: "Loan application approved".to_string(),
            body,
        })
    }

    /// render a rejection notice, or nothing if the member is unreachable
    pub fn rejection(member: &Member, rejection: &Rejection) -> Option<Self> {
        let recipient = member.notice_address()?.to_string();
        let reason = rejection
            .reason
            .as_deref()
            .unwrap_or("not stated; contact the office for details");
        let body = format!(
            "Dear {},\n\nWe regret that your loan application was not approved.\n\n\
             Reason: {}\n\nYou are welcome to apply again.",
            member.full_name, reason,
        );

        Some(Self {
            recipient,
            subject: "Loan application declined".to_string(),
            body,
        })
    }
}

/// outbound notification channel, called after the decision is committed
pub trait Notifier {
    fn deliver(&self, notice: &DecisionNotice) -> Result<(), NotifyError>;
}

/// notifier that accepts and discards every notice
#[derive(Debug, Default, Clone, Copy)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn deliver(&self, _notice: &DecisionNotice) -> Result<(), NotifyError> {
        Ok(())
    }
}
