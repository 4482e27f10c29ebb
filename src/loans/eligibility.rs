use serde::{Deserialize, Serialize};

use crate::decimal::Money;

/// advisory savings-based ceiling for a loan application.
///
/// The ceiling is the applicant's savings plus the savings of any referees
/// named on the application. Exceeding it flags the application for closer
/// review; it never blocks submission or approval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilitySignal {
    pub amount_requested: Money,
    pub applicant_savings: Money,
    pub referee_savings: Money,
    pub max_eligible: Money,
}

impl EligibilitySignal {
    /// assess a requested amount against the pooled savings
    pub fn assess(
        amount_requested: Money,
        applicant_savings: Money,
        referee_savings: impl IntoIterator<Item = Money>,
    ) -> Self {
        let referee_savings = referee_savings
            .into_iter()
            .fold(Money::ZERO, |acc, x| acc + x);

        Self {
            amount_requested,
            applicant_savings,
            referee_savings,
            max_eligible: applicant_savings + referee_savings,
        }
    }

    /// true when the request is above the advisory ceiling
    pub fn exceeds_ceiling(&self) -> bool {
        self.amount_requested > self.max_eligible
    }
}
