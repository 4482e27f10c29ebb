use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::errors::{LendingError, Result};
use crate::types::LoanId;

/// closed-form repayment figures for an amortizing loan.
///
/// Inputs are validated by the caller; this computation never fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepaymentQuote {
    pub monthly_payment: Money,
    pub total_repayment: Money,
    pub total_interest: Money,
}

impl RepaymentQuote {
    /// compute monthly payment, total repayment and total interest
    /// via the standard annuity formula
    pub fn compute(principal: Money, annual_rate: Rate, term_months: u32) -> Self {
        if term_months == 0 {
            // degenerate, callers validate term > 0 first
            return Self {
                monthly_payment: Money::ZERO,
                total_repayment: principal,
                total_interest: Money::ZERO,
            };
        }

        let monthly_rate = annual_rate.monthly().as_decimal();
        if monthly_rate.is_zero() {
            return Self::level_split(principal, term_months);
        }

        // EMI = P * r * (1 + r)^n / ((1 + r)^n - 1)
        let factor = compound_factor(monthly_rate, term_months);
        if factor == Decimal::ONE {
            return Self::level_split(principal, term_months);
        }

        let monthly_payment = Money::from_decimal(
            principal.as_decimal() * monthly_rate * factor / (factor - Decimal::ONE),
        );
        let total_repayment = monthly_payment * Decimal::from(term_months);

        Self {
            monthly_payment,
            total_repayment,
            total_interest: total_repayment - principal,
        }
    }

    /// interest-free case: the principal split over the term
    fn level_split(principal: Money, term_months: u32) -> Self {
        Self {
            monthly_payment: principal / Decimal::from(term_months),
            total_repayment: principal,
            total_interest: Money::ZERO,
        }
    }
}

/// single row of a repayment schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Installment {
    pub number: u32,
    pub due_date: NaiveDate,
    pub beginning_balance: Money,
    pub payment_amount: Money,
    pub principal_portion: Money,
    pub interest_portion: Money,
    pub ending_balance: Money,
}

/// full equal-installment repayment schedule for an approved loan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepaymentSchedule {
    pub loan_id: LoanId,
    pub principal: Money,
    pub annual_rate: Rate,
    pub term_months: u32,
    pub start_date: NaiveDate,
    pub installments: Vec<Installment>,
    pub total_interest: Money,
    pub total_repayment: Money,
}

impl RepaymentSchedule {
    /// generate the schedule; the start date is the first due date
    pub fn generate(
        loan_id: LoanId,
        principal: Money,
        annual_rate: Rate,
        term_months: u32,
        start_date: NaiveDate,
    ) -> Result<Self> {
        let monthly_rate = annual_rate.monthly().as_decimal();
        let emi = RepaymentQuote::compute(principal, annual_rate, term_months).monthly_payment;

        let mut installments = Vec::with_capacity(term_months as usize);
        let mut balance = principal;

        for number in 1..=term_months {
            let due_date = start_date
                .checked_add_months(Months::new(number - 1))
                .ok_or_else(|| {
                    LendingError::validation(vec![
                        "repayment schedule exceeds the supported date range".to_string(),
                    ])
                })?;

            let interest_portion = Money::from_decimal(balance.as_decimal() * monthly_rate);
            let principal_portion = emi - interest_portion;
            let ending_balance = (balance - principal_portion).max(Money::ZERO);

            installments.push(Installment {
                number,
                due_date,
                beginning_balance: balance,
                payment_amount: emi,
                principal_portion,
                interest_portion,
                ending_balance,
            });

            balance = ending_balance;
        }

        // fold any rounding residue into the final installment
        if let Some(last) = installments.last_mut() {
            if last.ending_balance.is_positive() {
                last.principal_portion += last.ending_balance;
                last.payment_amount += last.ending_balance;
                last.ending_balance = Money::ZERO;
            }
        }

        let total_interest = installments
            .iter()
            .map(|i| i.interest_portion)
            .fold(Money::ZERO, |acc, x| acc + x);

        let total_repayment = installments
            .iter()
            .map(|i| i.payment_amount)
            .fold(Money::ZERO, |acc, x| acc + x);

        Ok(Self {
            loan_id,
            principal,
            annual_rate,
            term_months,
            start_date,
            installments,
            total_interest,
            total_repayment,
        })
    }

    /// get installment by number
    pub fn installment(&self, number: u32) -> Option<&Installment> {
        self.installments.get(number.checked_sub(1)? as usize)
    }
}

/// (1 + r)^n by repeated multiplication, exact in decimal
fn compound_factor(monthly_rate: Decimal, term_months: u32) -> Decimal {
    let base = Decimal::ONE + monthly_rate;
    let mut factor = Decimal::ONE;
    for _ in 0..term_months {
        factor *= base;
    }
    factor
}
