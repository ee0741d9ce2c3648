//! Proportional spending policies
//!
//! Spend a percentage of some measure of the bank's results: this cycle's
//! profit, its equity, or its capital (equity plus securities equity).

use super::{SpendingContext, SpendingPolicy};

/// Spend a percentage of this cycle's profit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfitSpending {
    percentage: f64,
}

impl ProfitSpending {
    pub fn new(percentage: f64) -> Self {
        Self { percentage }
    }
}

impl SpendingPolicy for ProfitSpending {
    fn candidate_expense(&self, context: &SpendingContext) -> f64 {
        self.percentage * context.profit
    }

    fn name(&self) -> &'static str {
        "profit"
    }
}

/// Spend a percentage of equity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquitySpending {
    percentage: f64,
}

impl EquitySpending {
    pub fn new(percentage: f64) -> Self {
        Self { percentage }
    }
}

impl SpendingPolicy for EquitySpending {
    fn candidate_expense(&self, context: &SpendingContext) -> f64 {
        self.percentage * context.equity
    }

    fn name(&self) -> &'static str {
        "equity"
    }
}

/// Spend a percentage of capital (equity plus securities equity)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapitalSpending {
    percentage: f64,
}

impl CapitalSpending {
    pub fn new(percentage: f64) -> Self {
        Self { percentage }
    }
}

impl SpendingPolicy for CapitalSpending {
    fn candidate_expense(&self, context: &SpendingContext) -> f64 {
        self.percentage * (context.equity + context.securities_equity)
    }

    fn name(&self) -> &'static str {
        "capital"
    }
}
