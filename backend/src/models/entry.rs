//! Entry kinds shared by every balance sheet in the economy
//!
//! Each actor type declares which of these it may hold as assets and which as
//! liabilities. Booking anything outside that declaration is rejected by
//! [`EconomicActor`](crate::models::actor::EconomicActor).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of a balance sheet line
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Reserves,
    Loans,
    /// Mortgage-backed securities
    Mbs,
    Securities,
    Deposits,
    Savings,
    Debt,
    /// Defaulted principal that is still owed
    UnresolvedDebt,
    Equity,
    /// Unrealized revaluation of securities holdings
    SecuritiesEquity,
    /// Unrealized revaluation of MBS holdings
    MbsEquity,
    HelicopterMoney,
    Interest,
    Qe,
}

impl EntryKind {
    /// All entry kinds, in ledger order
    pub const ALL: [EntryKind; 14] = [
        EntryKind::Reserves,
        EntryKind::Loans,
        EntryKind::Mbs,
        EntryKind::Securities,
        EntryKind::Deposits,
        EntryKind::Savings,
        EntryKind::Debt,
        EntryKind::UnresolvedDebt,
        EntryKind::Equity,
        EntryKind::SecuritiesEquity,
        EntryKind::MbsEquity,
        EntryKind::HelicopterMoney,
        EntryKind::Interest,
        EntryKind::Qe,
    ];

    /// Canonical upper-case label (e.g. `"SECURITIES_EQUITY"`)
    pub fn label(&self) -> &'static str {
        match self {
            EntryKind::Reserves => "RESERVES",
            EntryKind::Loans => "LOANS",
            EntryKind::Mbs => "MBS",
            EntryKind::Securities => "SECURITIES",
            EntryKind::Deposits => "DEPOSITS",
            EntryKind::Savings => "SAVINGS",
            EntryKind::Debt => "DEBT",
            EntryKind::UnresolvedDebt => "UNRESOLVED_DEBT",
            EntryKind::Equity => "EQUITY",
            EntryKind::SecuritiesEquity => "SECURITIES_EQUITY",
            EntryKind::MbsEquity => "MBS_EQUITY",
            EntryKind::HelicopterMoney => "HELICOPTER_MONEY",
            EntryKind::Interest => "INTEREST",
            EntryKind::Qe => "QE",
        }
    }

    /// The equity line that carries unrealized revaluation for a tradable asset
    ///
    /// Returns `None` for kinds that are not traded between actors.
    pub fn revaluation_kind(&self) -> Option<EntryKind> {
        match self {
            EntryKind::Securities => Some(EntryKind::SecuritiesEquity),
            EntryKind::Mbs => Some(EntryKind::MbsEquity),
            _ => None,
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_are_unique() {
        let labels: std::collections::HashSet<_> =
            EntryKind::ALL.iter().map(|k| k.label()).collect();
        assert_eq!(labels.len(), EntryKind::ALL.len());
    }

    #[test]
    fn test_revaluation_kind() {
        assert_eq!(
            EntryKind::Securities.revaluation_kind(),
            Some(EntryKind::SecuritiesEquity)
        );
        assert_eq!(EntryKind::Mbs.revaluation_kind(), Some(EntryKind::MbsEquity));
        assert_eq!(EntryKind::Deposits.revaluation_kind(), None);
    }
}
