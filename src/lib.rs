pub mod access;
pub mod config;
pub mod decimal;
pub mod desk;
pub mod errors;
pub mod events;
pub mod loans;
pub mod members;
pub mod notify;
pub mod savings;
pub mod store;
pub mod types;

// re-export key types
pub use access::{Principal, Role};
pub use config::LendingPolicy;
pub use decimal::{Money, Rate};
pub use desk::{ApprovalForm, ApprovalReceipt, LoanDesk, RejectionForm, RejectionReceipt};
pub use errors::{LendingError, Result};
pub use events::{Event, EventStore};
pub use loans::{
    ApprovalTerms, EligibilitySignal, Installment, LoanApplication, LoanOutcome, LoanSummary,
    Rejection, RepaymentQuote, RepaymentSchedule,
};
pub use members::Member;
pub use notify::{DecisionNotice, NotificationOutcome, Notifier, NotifyError, NullNotifier};
pub use savings::{EntryKind, SavingsEntry, SavingsLedger};
pub use store::{LoanCommand, LoanStore, MemoryStore};
pub use types::{LoanId, LoanStatus, MemberId, UserId};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
