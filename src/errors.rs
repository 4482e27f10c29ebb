use thiserror::Error;

use crate::access::Role;
use crate::decimal::Money;
use crate::types::{LoanId, LoanStatus, MemberId};

#[derive(Error, Debug)]
pub enum LendingError {
    #[error("validation failed: {}", .errors.join("; "))]
    Validation {
        errors: Vec<String>,
    },

    #[error("loan is no longer pending: current status is {status}")]
    AlreadyProcessed {
        status: LoanStatus,
    },

    #[error("invalid transition: {from} loans cannot become {to}")]
    InvalidTransition {
        from: LoanStatus,
        to: LoanStatus,
    },

    #[error("loan not found: {id}")]
    LoanNotFound {
        id: LoanId,
    },

    #[error("member not found: {id}")]
    MemberNotFound {
        id: MemberId,
    },

    #[error("permission denied: {role} role cannot process loan decisions")]
    PermissionDenied {
        role: Role,
    },

    #[error("insufficient savings: balance {balance}, requested {requested}")]
    InsufficientSavings {
        balance: Money,
        requested: Money,
    },

    #[error("storage failure: {message}")]
    Storage {
        message: String,
    },
}

impl LendingError {
    /// build a validation error from collected messages
    pub fn validation(errors: Vec<String>) -> Self {
        LendingError::Validation { errors }
    }

    /// check if the error is a lost-race conflict
    pub fn is_conflict(&self) -> bool {
        matches!(self, LendingError::AlreadyProcessed { .. })
    }
}

pub type Result<T> = std::result::Result<T, LendingError>;
