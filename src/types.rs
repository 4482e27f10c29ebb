use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// unique identifier for a loan application
pub type LoanId = Uuid;

/// unique identifier for a cooperative member
pub type MemberId = Uuid;

/// unique identifier for a back-office user
pub type UserId = Uuid;

/// loan application status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoanStatus {
    /// submitted, awaiting a decision
    Pending,
    /// approved with repayment terms, not yet disbursed
    Approved,
    /// declined by an administrator
    Rejected,
    /// disbursed and being repaid
    Active,
    /// fully repaid
    Completed,
    /// written off after missed repayments
    Defaulted,
}

impl LoanStatus {
    /// check if a decision can still be taken
    pub fn is_pending(&self) -> bool {
        matches!(self, LoanStatus::Pending)
    }

    /// check if the loan reached a state it can never leave
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            LoanStatus::Rejected | LoanStatus::Completed | LoanStatus::Defaulted
        )
    }

    /// check if money is owed on the loan
    pub fn is_outstanding(&self) -> bool {
        matches!(self, LoanStatus::Active | LoanStatus::Defaulted)
    }
}

impl std::fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            LoanStatus::Pending => "pending",
            LoanStatus::Approved => "approved",
            LoanStatus::Rejected => "rejected",
            LoanStatus::Active => "active",
            LoanStatus::Completed => "completed",
            LoanStatus::Defaulted => "defaulted",
        };
        write!(f, "{}", label)
    }
}
