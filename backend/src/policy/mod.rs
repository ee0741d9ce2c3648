//! Bank Spending Policy Module
//!
//! Each cycle a bank may spend part of its equity into the real economy
//! (wages, dividends, operating costs). The spending policy decides how much.
//!
//! # Overview
//!
//! Spending is a two-step decision:
//! 1. The configured [`SpendingPolicy`] proposes a candidate expense from the
//!    bank's profit, equity and securities equity.
//! 2. [`SpendingLimits::clamp`] caps the candidate: with `retain_profit` the
//!    bank keeps at least `retain_profit_percentage` of this cycle's profit,
//!    and with `no_loss` it never spends more than its profit.
//!
//! The final expense is booked by the bank as Equity -x / Deposits +x.
//!
//! # Policy Interface
//!
//! ```rust
//! use euro_economy_core::policy::{SpendingContext, SpendingPolicy};
//!
//! struct HalfOfEquity;
//!
//! impl SpendingPolicy for HalfOfEquity {
//!     fn candidate_expense(&self, context: &SpendingContext) -> f64 {
//!         context.equity * 0.5
//!     }
//!
//!     fn name(&self) -> &'static str {
//!         "half_of_equity"
//!     }
//! }
//! ```
//!
//! Available policies (selected through [`SpendingMode`]):
//! 1. **Fixed**: a fixed nominal amount, inflated every cycle
//! 2. **Profit**: a percentage of this cycle's profit
//! 3. **Equity**: a percentage of equity
//! 4. **Capital**: a percentage of equity plus securities equity

use serde::{Deserialize, Serialize};

pub mod fixed;
pub mod proportional;

pub use fixed::FixedSpending;
pub use proportional::{CapitalSpending, EquitySpending, ProfitSpending};

/// Figures a spending policy may base its decision on
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SpendingContext {
    /// Change in equity since the last committed cycle
    pub profit: f64,
    /// Current equity
    pub equity: f64,
    /// Current unrealized securities revaluation
    pub securities_equity: f64,
}

/// Proposes a bank's discretionary expense for the cycle
pub trait SpendingPolicy {
    /// Unclamped expense proposal (may be negative, clamped later)
    fn candidate_expense(&self, context: &SpendingContext) -> f64;

    /// Short policy identifier for logs
    fn name(&self) -> &'static str;
}

/// Spending policy selection for a bank
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SpendingMode {
    /// Spend a fixed nominal amount each cycle
    Fixed { amount: f64 },

    /// Spend a percentage of this cycle's profit
    Profit { percentage: f64 },

    /// Spend a percentage of equity
    Equity { percentage: f64 },

    /// Spend a percentage of equity plus securities equity
    ///
    /// May require the bank to realize securities gains first by selling
    /// securities to its clients.
    Capital { percentage: f64 },
}

impl Default for SpendingMode {
    fn default() -> Self {
        SpendingMode::Fixed { amount: 0.0 }
    }
}

impl SpendingMode {
    /// Build the policy object for this mode
    pub fn policy(&self) -> Box<dyn SpendingPolicy> {
        match self {
            SpendingMode::Fixed { amount } => Box::new(FixedSpending::new(*amount)),
            SpendingMode::Profit { percentage } => Box::new(ProfitSpending::new(*percentage)),
            SpendingMode::Equity { percentage } => Box::new(EquitySpending::new(*percentage)),
            SpendingMode::Capital { percentage } => Box::new(CapitalSpending::new(*percentage)),
        }
    }

    /// Scale nominal amounts by `(1 + inflation)`; percentages are untouched
    pub fn inflate(&mut self, inflation: f64) {
        if let SpendingMode::Fixed { amount } = self {
            *amount *= 1.0 + inflation;
        }
    }

    /// Whether this mode draws on securities equity
    pub fn uses_capital(&self) -> bool {
        matches!(self, SpendingMode::Capital { .. })
    }
}

/// Caps applied to every candidate expense
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SpendingLimits {
    /// Never spend more than this cycle's profit
    pub no_loss: bool,
    /// Fraction of profit that must be retained, if enabled
    pub retain_profit_percentage: Option<f64>,
}

impl SpendingLimits {
    /// Clamp `candidate` to the limits; the result is never negative
    ///
    /// # Example
    /// ```
    /// use euro_economy_core::policy::SpendingLimits;
    ///
    /// let limits = SpendingLimits { no_loss: true, retain_profit_percentage: Some(0.25) };
    /// assert_eq!(limits.clamp(500.0, 100.0), 75.0);
    /// assert_eq!(limits.clamp(500.0, -20.0), 0.0);
    /// ```
    pub fn clamp(&self, candidate: f64, profit: f64) -> f64 {
        let mut expense = candidate;

        if let Some(retained) = self.retain_profit_percentage {
            let spendable = profit.max(0.0) * (1.0 - retained.clamp(0.0, 1.0));
            expense = expense.min(spendable);
        }

        if self.no_loss {
            expense = expense.min(profit.max(0.0));
        }

        expense.max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(profit: f64, equity: f64, securities_equity: f64) -> SpendingContext {
        SpendingContext {
            profit,
            equity,
            securities_equity,
        }
    }

    #[test]
    fn test_modes_build_matching_policies() {
        let ctx = context(100.0, 1_000.0, 500.0);

        assert_eq!(SpendingMode::Fixed { amount: 30.0 }.policy().candidate_expense(&ctx), 30.0);
        assert_eq!(SpendingMode::Profit { percentage: 0.5 }.policy().candidate_expense(&ctx), 50.0);
        assert_eq!(SpendingMode::Equity { percentage: 0.1 }.policy().candidate_expense(&ctx), 100.0);
        assert_eq!(SpendingMode::Capital { percentage: 0.1 }.policy().candidate_expense(&ctx), 150.0);
    }

    #[test]
    fn test_inflate_only_scales_fixed_amounts() {
        let mut fixed = SpendingMode::Fixed { amount: 100.0 };
        fixed.inflate(0.02);
        assert_eq!(fixed, SpendingMode::Fixed { amount: 102.0 });

        let mut profit = SpendingMode::Profit { percentage: 0.5 };
        profit.inflate(0.02);
        assert_eq!(profit, SpendingMode::Profit { percentage: 0.5 });
    }

    #[test]
    fn test_no_limits_only_floors_at_zero() {
        let limits = SpendingLimits::default();
        assert_eq!(limits.clamp(250.0, 10.0), 250.0);
        assert_eq!(limits.clamp(-5.0, 10.0), 0.0);
    }

    #[test]
    fn test_no_loss_caps_at_profit() {
        let limits = SpendingLimits {
            no_loss: true,
            retain_profit_percentage: None,
        };
        assert_eq!(limits.clamp(250.0, 100.0), 100.0);
        assert_eq!(limits.clamp(250.0, 0.0), 0.0);
    }

    #[test]
    fn test_retain_profit_keeps_share() {
        let limits = SpendingLimits {
            no_loss: false,
            retain_profit_percentage: Some(0.4),
        };
        assert!((limits.clamp(1_000.0, 100.0) - 60.0).abs() < 1e-12);
    }

    #[test]
    fn test_mode_deserializes_from_tagged_json() {
        let mode: SpendingMode =
            serde_json::from_str(r#"{"type": "capital", "percentage": 0.05}"#).unwrap();
        assert_eq!(mode, SpendingMode::Capital { percentage: 0.05 });
    }
}
