use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::types::{LoanId, MemberId, UserId};

/// all events emitted by back-office operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // membership events
    MemberRegistered {
        member_id: MemberId,
        member_no: String,
        timestamp: DateTime<Utc>,
    },

    // savings events
    DepositRecorded {
        member_id: MemberId,
        amount: Money,
        new_balance: Money,
        timestamp: DateTime<Utc>,
    },
    WithdrawalRecorded {
        member_id: MemberId,
        amount: Money,
        new_balance: Money,
        timestamp: DateTime<Utc>,
    },

    // application events
    LoanSubmitted {
        loan_id: LoanId,
        member_id: MemberId,
        amount_requested: Money,
        timestamp: DateTime<Utc>,
    },
    EligibilityFlagged {
        loan_id: LoanId,
        amount_requested: Money,
        max_eligible: Money,
        timestamp: DateTime<Utc>,
    },

    // decision events
    LoanApproved {
        loan_id: LoanId,
        amount_approved: Money,
        monthly_payment: Money,
        term_months: u32,
        approved_by: UserId,
        timestamp: DateTime<Utc>,
    },
    LoanRejected {
        loan_id: LoanId,
        reason: Option<String>,
        processed_by: UserId,
        timestamp: DateTime<Utc>,
    },

    // servicing events
    LoanDisbursed {
        loan_id: LoanId,
        amount: Money,
        timestamp: DateTime<Utc>,
    },
    LoanCompleted {
        loan_id: LoanId,
        timestamp: DateTime<Utc>,
    },
    LoanWrittenOff {
        loan_id: LoanId,
        timestamp: DateTime<Utc>,
    },

    // notification events
    NotificationFailed {
        loan_id: LoanId,
        recipient: String,
        warning: String,
        timestamp: DateTime<Utc>,
    },
}

/// event store for collecting events during operations
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
        }
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
