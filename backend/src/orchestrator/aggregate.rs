//! System-level aggregates over an actor graph

use crate::core::allocation::ratio;

/// Read-only aggregates of a whole economy
pub trait AggregateEconomy {
    /// Inside money: Deposits + Savings over every bank
    fn im(&self) -> f64;

    /// Client Debt still being serviced
    fn total_private_debt(&self) -> f64;

    /// Client debt that defaulted and was not resolved
    fn total_unresolved_debt(&self) -> f64;

    fn total_reserves(&self) -> f64;

    fn total_bank_equity(&self) -> f64;

    /// Relative IM change since the start of the running cycle
    fn im_growth(&self) -> f64;

    /// Private debt per unit of inside money (0 when IM is not positive)
    fn debt_ratio(&self) -> f64 {
        ratio(self.total_private_debt(), self.im())
    }

    fn is_collapsed(&self) -> bool {
        self.im() <= 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed {
        im: f64,
        debt: f64,
    }

    impl AggregateEconomy for Fixed {
        fn im(&self) -> f64 {
            self.im
        }
        fn total_private_debt(&self) -> f64 {
            self.debt
        }
        fn total_unresolved_debt(&self) -> f64 {
            0.0
        }
        fn total_reserves(&self) -> f64 {
            0.0
        }
        fn total_bank_equity(&self) -> f64 {
            0.0
        }
        fn im_growth(&self) -> f64 {
            0.0
        }
    }

    #[test]
    fn test_debt_ratio() {
        assert_eq!(Fixed { im: 200.0, debt: 100.0 }.debt_ratio(), 0.5);
        assert_eq!(Fixed { im: 0.0, debt: 100.0 }.debt_ratio(), 0.0);
    }

    #[test]
    fn test_collapse_threshold() {
        assert!(Fixed { im: 0.0, debt: 0.0 }.is_collapsed());
        assert!(Fixed { im: -1.0, debt: 0.0 }.is_collapsed());
        assert!(!Fixed { im: 1.0, debt: 0.0 }.is_collapsed());
    }
}
