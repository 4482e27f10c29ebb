use chrono::NaiveDate;
use hourglass_rs::SafeTimeProvider;

use crate::access::Principal;
use crate::config::LendingPolicy;
use crate::decimal::{Money, Rate};
use crate::errors::{LendingError, Result};
use crate::events::{Event, EventStore};
use crate::loans::{ApprovalTerms, EligibilitySignal, LoanApplication, Rejection, RepaymentQuote};
use crate::members::Member;
use crate::notify::{DecisionNotice, NotificationOutcome, Notifier};
use crate::store::{LoanCommand, LoanStore};
use crate::types::{LoanId, MemberId};

/// approval form as posted by the hosting layer.
///
/// The start date arrives as the raw string the administrator typed and is
/// parsed during validation.
#[derive(Debug, Clone)]
pub struct ApprovalForm {
    pub loan_id: LoanId,
    pub amount_approved: Money,
    pub annual_rate: Rate,
    pub term_months: u32,
    pub repayment_start: String,
}

/// rejection form as posted by the hosting layer
#[derive(Debug, Clone)]
pub struct RejectionForm {
    pub loan_id: LoanId,
    pub reason: Option<String>,
}

/// result of a committed approval
#[derive(Debug, Clone)]
pub struct ApprovalReceipt {
    pub loan: LoanApplication,
    pub quote: RepaymentQuote,
    pub notification: NotificationOutcome,
}

/// result of a committed rejection
#[derive(Debug, Clone)]
pub struct RejectionReceipt {
    pub loan: LoanApplication,
    pub notification: NotificationOutcome,
}

/// back-office service for the lending workflow.
///
/// Every operation takes the acting `Principal` explicitly; nothing is
/// read from ambient state. Decisions are committed through the store's
/// conditional update, so a stale page or a racing administrator gets a
/// conflict, never a second decision.
pub struct LoanDesk<S, N> {
    store: S,
    notifier: N,
    policy: LendingPolicy,
    events: EventStore,
}

impl<S: LoanStore, N: Notifier> LoanDesk<S, N> {
    pub fn new(store: S, notifier: N, policy: LendingPolicy) -> Self {
        Self {
            store,
            notifier,
            policy,
            events: EventStore::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// drain events collected since the last call
    pub fn take_events(&mut self) -> Vec<Event> {
        self.events.take_events()
    }

    /// register a member
    pub fn register_member(
        &mut self,
        principal: &Principal,
        member_no: &str,
        full_name: &str,
        email: Option<String>,
        phone: Option<String>,
        time_provider: &SafeTimeProvider,
    ) -> Result<Member> {
        if !principal.role.can_manage_members() {
            return Err(LendingError::PermissionDenied {
                role: principal.role,
            });
        }

        let member = Member::register(member_no, full_name, email, phone, time_provider);
        self.store.insert_member(&member)?;

        self.events.emit(Event::MemberRegistered {
            member_id: member.member_id,
            member_no: member.member_no.clone(),
            timestamp: time_provider.now(),
        });

        Ok(member)
    }

    /// post a savings deposit
    pub fn record_deposit(
        &mut self,
        principal: &Principal,
        member_id: MemberId,
        amount: Money,
        reference: &str,
        time_provider: &SafeTimeProvider,
    ) -> Result<Money> {
        if !principal.role.can_record_savings() {
            return Err(LendingError::PermissionDenied {
                role: principal.role,
            });
        }

        let new_balance = self.store.record_deposit(
            member_id,
            amount,
            reference,
            principal.user_id,
            time_provider,
        )?;

        self.events.emit(Event::DepositRecorded {
            member_id,
            amount,
            new_balance,
            timestamp: time_provider.now(),
        });

        Ok(new_balance)
    }

    /// post a savings withdrawal
    pub fn record_withdrawal(
        &mut self,
        principal: &Principal,
        member_id: MemberId,
        amount: Money,
        reference: &str,
        time_provider: &SafeTimeProvider,
    ) -> Result<Money> {
        if !principal.role.can_record_savings() {
            return Err(LendingError::PermissionDenied {
                role: principal.role,
            });
        }

        let new_balance = self.store.record_withdrawal(
            member_id,
            amount,
            reference,
            principal.user_id,
            time_provider,
        )?;

        self.events.emit(Event::WithdrawalRecorded {
            member_id,
            amount,
            new_balance,
            timestamp: time_provider.now(),
        });

        Ok(new_balance)
    }

    /// file a loan application for a member.
    ///
    /// The returned eligibility signal is advisory; an application above
    /// the ceiling is stored and flagged, not blocked.
    pub fn submit_application(
        &mut self,
        member_id: MemberId,
        amount_requested: Money,
        purpose: &str,
        referees: Vec<MemberId>,
        time_provider: &SafeTimeProvider,
    ) -> Result<(LoanApplication, EligibilitySignal)> {
        self.store.fetch_member(member_id)?;

        let mut errors = Vec::new();
        if !amount_requested.is_positive() {
            errors.push("requested amount must be greater than zero".to_string());
        }
        if purpose.trim().is_empty() {
            errors.push("purpose is required".to_string());
        } else if purpose.len() > self.policy.max_purpose_len {
            errors.push(format!(
                "purpose exceeds {} characters",
                self.policy.max_purpose_len
            ));
        }
        if referees.len() > self.policy.max_referees {
            errors.push(format!(
                "at most {} referees may be named",
                self.policy.max_referees
            ));
        }
        for (index, referee) in referees.iter().enumerate() {
            if *referee == member_id {
                errors.push("a member cannot referee their own application".to_string());
            } else if referees[..index].contains(referee) {
                errors.push("referees must be distinct members".to_string());
            } else if self.store.fetch_member(*referee).is_err() {
                errors.push(format!("referee {} is not a registered member", referee));
            }
        }
        if !errors.is_empty() {
            return Err(LendingError::validation(errors));
        }

        let loan = LoanApplication::submit(
            member_id,
            amount_requested,
            purpose.trim(),
            referees,
            time_provider,
        );
        self.store.insert_loan(&loan)?;

        self.events.emit(Event::LoanSubmitted {
            loan_id: loan.loan_id,
            member_id,
            amount_requested,
            timestamp: time_provider.now(),
        });

        let signal = self.eligibility(loan.loan_id)?;
        if signal.exceeds_ceiling() {
            self.events.emit(Event::EligibilityFlagged {
                loan_id: loan.loan_id,
                amount_requested,
                max_eligible: signal.max_eligible,
                timestamp: time_provider.now(),
            });
        }

        Ok((loan, signal))
    }

    /// advisory savings ceiling for a stored application
    pub fn eligibility(&self, loan_id: LoanId) -> Result<EligibilitySignal> {
        let loan = self.store.fetch_loan(loan_id)?;
        let applicant_savings = self.store.savings_balance(loan.member_id)?;
        let referee_savings = loan
            .referees
            .iter()
            .map(|referee| self.store.savings_balance(*referee))
            .collect::<Result<Vec<_>>>()?;

        Ok(EligibilitySignal::assess(
            loan.amount_requested,
            applicant_savings,
            referee_savings,
        ))
    }

    /// approve a pending application.
    ///
    /// Validation failures report every problem at once and change
    /// nothing. The commit is conditional on the stored status still
    /// being pending; losing that race yields a conflict error. The
    /// notice to the applicant is attempted only after the commit and
    /// its failure is reported as a warning on the receipt.
    pub fn approve(
        &mut self,
        loan_id: LoanId,
        form: &ApprovalForm,
        principal: &Principal,
        time_provider: &SafeTimeProvider,
    ) -> Result<ApprovalReceipt> {
        if !principal.can_process_loans() {
            return Err(LendingError::PermissionDenied {
                role: principal.role,
            });
        }

        let loan = self.store.fetch_loan(loan_id)?;
        if !loan.is_pending() {
            return Err(LendingError::AlreadyProcessed {
                status: loan.status,
            });
        }

        let mut errors = Vec::new();
        if form.loan_id != loan_id {
            errors.push(format!(
                "approval form is for loan {}, not loan {}",
                form.loan_id, loan_id
            ));
        }
        if !form.amount_approved.is_positive() {
            errors.push("approved amount must be greater than zero".to_string());
        }
        if form.annual_rate.is_negative() {
            errors.push("interest rate cannot be negative".to_string());
        } else if form.annual_rate > self.policy.max_annual_rate {
            errors.push(format!(
                "interest rate exceeds the policy maximum of {}",
                self.policy.max_annual_rate
            ));
        }
        if form.term_months == 0 {
            errors.push("term must be at least one month".to_string());
        } else if form.term_months > self.policy.max_term_months {
            errors.push(format!(
                "term exceeds the policy maximum of {} months",
                self.policy.max_term_months
            ));
        }
        let repayment_start = match NaiveDate::parse_from_str(&form.repayment_start, "%Y-%m-%d") {
            Ok(date) => Some(date),
            Err(_) => {
                errors.push(format!(
                    "repayment start date '{}' is not a valid date (expected YYYY-MM-DD)",
                    form.repayment_start
                ));
                None
            }
        };
        if !errors.is_empty() {
            return Err(LendingError::validation(errors));
        }
        let repayment_start = repayment_start.ok_or_else(|| {
            // unreachable: a missing date was pushed onto errors above
            LendingError::validation(vec!["repayment start date missing".to_string()])
        })?;

        let quote =
            RepaymentQuote::compute(form.amount_approved, form.annual_rate, form.term_months);
        let terms = ApprovalTerms {
            amount_approved: form.amount_approved,
            annual_rate: form.annual_rate,
            term_months: form.term_months,
            repayment_start,
            monthly_payment: quote.monthly_payment,
            total_repayment: quote.total_repayment,
            approved_by: principal.user_id,
            approved_at: time_provider.now(),
        };

        let loan = self
            .store
            .commit(loan_id, LoanCommand::Approve(terms.clone()))?;

        self.events.emit(Event::LoanApproved {
            loan_id,
            amount_approved: terms.amount_approved,
            monthly_payment: terms.monthly_payment,
            term_months: terms.term_months,
            approved_by: terms.approved_by,
            timestamp: time_provider.now(),
        });

        let notification =
            self.notify_decision(&loan, |member| DecisionNotice::approval(member, &terms), time_provider);

        Ok(ApprovalReceipt {
            loan,
            quote,
            notification,
        })
    }

    /// reject a pending application
    pub fn reject(
        &mut self,
        loan_id: LoanId,
        form: &RejectionForm,
        principal: &Principal,
        time_provider: &SafeTimeProvider,
    ) -> Result<RejectionReceipt> {
        if !principal.can_process_loans() {
            return Err(LendingError::PermissionDenied {
                role: principal.role,
            });
        }

        let loan = self.store.fetch_loan(loan_id)?;
        if !loan.is_pending() {
            return Err(LendingError::AlreadyProcessed {
                status: loan.status,
            });
        }

        let mut errors = Vec::new();
        if form.loan_id != loan_id {
            errors.push(format!(
                "rejection form is for loan {}, not loan {}",
                form.loan_id, loan_id
            ));
        }
        let reason = form
            .reason
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string);
        if let Some(reason) = &reason {
            if reason.len() > self.policy.max_rejection_reason_len {
                errors.push(format!(
                    "rejection reason exceeds {} characters",
                    self.policy.max_rejection_reason_len
                ));
            }
        }
        if !errors.is_empty() {
            return Err(LendingError::validation(errors));
        }

        let rejection = Rejection {
            reason,
            processed_by: principal.user_id,
            processed_at: time_provider.now(),
        };

        let loan = self
            .store
            .commit(loan_id, LoanCommand::Reject(rejection.clone()))?;

        self.events.emit(Event::LoanRejected {
            loan_id,
            reason: rejection.reason.clone(),
            processed_by: rejection.processed_by,
            timestamp: time_provider.now(),
        });

        let notification = self.notify_decision(
            &loan,
            |member| DecisionNotice::rejection(member, &rejection),
            time_provider,
        );

        Ok(RejectionReceipt { loan, notification })
    }

    /// record disbursement of an approved loan
    pub fn disburse(
        &mut self,
        loan_id: LoanId,
        principal: &Principal,
        time_provider: &SafeTimeProvider,
    ) -> Result<LoanApplication> {
        if !principal.can_process_loans() {
            return Err(LendingError::PermissionDenied {
                role: principal.role,
            });
        }

        let loan = self.store.commit(loan_id, LoanCommand::Activate)?;
        let amount = loan
            .approval()
            .map(|terms| terms.amount_approved)
            .unwrap_or(loan.amount_requested);

        self.events.emit(Event::LoanDisbursed {
            loan_id,
            amount,
            timestamp: time_provider.now(),
        });

        Ok(loan)
    }

    /// mark an active loan fully repaid
    pub fn complete_loan(
        &mut self,
        loan_id: LoanId,
        principal: &Principal,
        time_provider: &SafeTimeProvider,
    ) -> Result<LoanApplication> {
        if !principal.can_process_loans() {
            return Err(LendingError::PermissionDenied {
                role: principal.role,
            });
        }

        let loan = self.store.commit(loan_id, LoanCommand::Complete)?;
        self.events.emit(Event::LoanCompleted {
            loan_id,
            timestamp: time_provider.now(),
        });

        Ok(loan)
    }

    /// write an active loan off
    pub fn write_off(
        &mut self,
        loan_id: LoanId,
        principal: &Principal,
        time_provider: &SafeTimeProvider,
    ) -> Result<LoanApplication> {
        if !principal.can_process_loans() {
            return Err(LendingError::PermissionDenied {
                role: principal.role,
            });
        }

        let loan = self.store.commit(loan_id, LoanCommand::MarkDefaulted)?;
        self.events.emit(Event::LoanWrittenOff {
            loan_id,
            timestamp: time_provider.now(),
        });

        Ok(loan)
    }

    /// best-effort notice after a committed decision; never fails the
    /// operation
    fn notify_decision<F>(
        &mut self,
        loan: &LoanApplication,
        render: F,
        time_provider: &SafeTimeProvider,
    ) -> NotificationOutcome
    where
        F: FnOnce(&Member) -> Option<DecisionNotice>,
    {
        let member = match self.store.fetch_member(loan.member_id) {
            Ok(member) => member,
            Err(err) => {
                let warning = format!("decision saved but applicant lookup failed: {}", err);
                self.events.emit(Event::NotificationFailed {
                    loan_id: loan.loan_id,
                    recipient: String::new(),
                    warning: warning.clone(),
                    timestamp: time_provider.now(),
                });
                return NotificationOutcome::Failed { warning };
            }
        };

        let Some(notice) = render(&member) else {
            return NotificationOutcome::Skipped;
        };

        match self.notifier.deliver(&notice) {
            Ok(()) => NotificationOutcome::Delivered,
            Err(err) => {
                let warning = format!("decision saved but notification failed: {}", err);
                self.events.emit(Event::NotificationFailed {
                    loan_id: loan.loan_id,
                    recipient: notice.recipient.clone(),
                    warning: warning.clone(),
                    timestamp: time_provider.now(),
                });
                NotificationOutcome::Failed { warning }
            }
        }
    }
}
