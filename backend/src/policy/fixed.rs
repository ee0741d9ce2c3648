//! Fixed spending policy
//!
//! Spends the same nominal amount every cycle regardless of results. The
//! amount tracks inflation through [`SpendingMode::inflate`](super::SpendingMode::inflate).

use super::{SpendingContext, SpendingPolicy};

/// Spend a fixed nominal amount
///
/// # Example
/// ```
/// use euro_economy_core::policy::{FixedSpending, SpendingContext, SpendingPolicy};
///
/// let policy = FixedSpending::new(250.0);
/// assert_eq!(policy.candidate_expense(&SpendingContext::default()), 250.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedSpending {
    amount: f64,
}

impl FixedSpending {
    pub fn new(amount: f64) -> Self {
        Self { amount }
    }
}

impl SpendingPolicy for FixedSpending {
    fn candidate_expense(&self, _context: &SpendingContext) -> f64 {
        self.amount
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}
