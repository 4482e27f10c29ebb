use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::decimal::Rate;

/// limits the desk enforces when validating applications and decisions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LendingPolicy {
    /// longest rejection reason the loan record will hold
    pub max_rejection_reason_len: usize,
    /// longest free-text purpose accepted on an application
    pub max_purpose_len: usize,
    /// referees an applicant may name
    pub max_referees: usize,
    /// longest repayment term offered
    pub max_term_months: u32,
    /// highest annual rate the desk will accept on an approval
    pub max_annual_rate: Rate,
}

impl LendingPolicy {
    /// standard cooperative policy
    pub fn standard() -> Self {
        Self {
            max_rejection_reason_len: 2000,
            max_purpose_len: 500,
            max_referees: 2,
            max_term_months: 120,
            max_annual_rate: Rate::from_percent(dec!(100)),
        }
    }
}

impl Default for LendingPolicy {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_policy_limits() {
        let policy = LendingPolicy::standard();
        assert_eq!(policy.max_rejection_reason_len, 2000);
        assert_eq!(policy.max_referees, 2);
        assert!(policy.max_term_months >= 12);
    }
}
