//! Private actor (bank client) model
//!
//! A private actor is a household or firm registered to exactly one bank. It
//! borrows, saves, services its debt and trades securities with its bank.
//! Every operation books both sides: the client's own sheet and, through the
//! passed-in [`Bank`], the bank's sheet.
//!
//! # Critical Invariants
//!
//! 1. **Symmetric bookings**: each operation leaves both the client and the
//!    bank balanced if they were balanced before.
//! 2. **Tranches match debt**: the sum of pending installment tranches equals
//!    the client's Debt liability.

use crate::core::allocation::{ratio, schedule_tranches};
use crate::models::actor::{BankId, EconomicActor};
use crate::models::bank::Bank;
use crate::models::entry::EntryKind;
use crate::models::timeline::BalanceSheetTimeline;
use crate::rng::RngManager;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

const CLIENT_ASSETS: &[EntryKind] = &[
    EntryKind::Deposits,
    EntryKind::Savings,
    EntryKind::Securities,
    EntryKind::Mbs,
];

const CLIENT_LIABILITIES: &[EntryKind] = &[
    EntryKind::Debt,
    EntryKind::UnresolvedDebt,
    EntryKind::Equity,
    EntryKind::SecuritiesEquity,
    EntryKind::MbsEquity,
];

/// How a client fails to pay its scheduled debt service
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DefaultingMode {
    /// Always pays what it can
    #[default]
    None,

    /// Fails to pay a fixed fraction every cycle
    Fixed { rate: f64 },

    /// Fails to pay a fraction drawn uniformly from `[0, max_rate)` each cycle
    Random { max_rate: f64 },
}

impl DefaultingMode {
    /// This cycle's defaulting rate, clamped to `[0, 1]`
    pub fn draw(&self, rng: &mut RngManager) -> f64 {
        let rate = match self {
            DefaultingMode::None => 0.0,
            DefaultingMode::Fixed { rate } => *rate,
            DefaultingMode::Random { max_rate } => rng.uniform(0.0, *max_rate),
        };
        rate.clamp(0.0, 1.0)
    }
}

/// Behavioural parameters of a private actor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientParams {
    /// Fraction of deposits moved to savings each cycle
    pub savings_rate: f64,
    pub defaulting: DefaultingMode,
}

impl Default for ClientParams {
    fn default() -> Self {
        Self {
            savings_rate: 0.0,
            defaulting: DefaultingMode::None,
        }
    }
}

/// Funds taken from a client's accounts, deposits first
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Withdrawal {
    pub from_deposits: f64,
    pub from_savings: f64,
}

impl Withdrawal {
    pub fn total(&self) -> f64 {
        self.from_deposits + self.from_savings
    }
}

/// Result of one cycle of client debt service
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DebtService {
    /// Tranche that fell due this cycle
    pub installment_due: f64,
    /// Interest on outstanding debt this cycle
    pub interest_due: f64,
    /// Principal moved to UnresolvedDebt by defaulting
    pub defaulted: f64,
    /// Installment still owed after defaulting
    pub installment_owed: f64,
    /// Interest still owed after defaulting
    pub interest_owed: f64,
    pub installment_paid: f64,
    pub interest_paid: f64,
    /// Total taken from deposits (interest and installment)
    pub from_deposits: f64,
    /// Total taken from savings (interest and installment)
    pub from_savings: f64,
}

impl DebtService {
    /// Owed installment the client could not pay
    pub fn installment_shortage(&self) -> f64 {
        (self.installment_owed - self.installment_paid).max(0.0)
    }

    /// All interest not received: defaulted plus unpaid
    pub fn interest_shortage(&self) -> f64 {
        (self.interest_due - self.interest_paid).max(0.0)
    }
}

/// A bank client holding deposits, savings, securities and debt
///
/// # Example
/// ```
/// use euro_economy_core::models::{Bank, BankParams, BankId, ClientParams, EconomicActor, PrivateActor};
/// use euro_economy_core::EntryKind;
///
/// let mut bank = Bank::new("bank", BankParams::default());
/// let mut client = PrivateActor::new("client", BankId(0), ClientParams::default());
///
/// client.borrow(&mut bank, 100.0);
/// assert_eq!(client.asset(EntryKind::Deposits), 100.0);
/// assert_eq!(bank.asset(EntryKind::Loans), 100.0);
/// assert!(client.validate_balance() && bank.validate_balance());
/// ```
#[derive(Debug, Clone)]
pub struct PrivateActor {
    name: String,
    bank: BankId,
    params: ClientParams,
    /// Pending principal tranches, index = cycles until due
    installments: VecDeque<f64>,
    timeline: BalanceSheetTimeline,
}

impl PrivateActor {
    /// Create a client registered to `bank`
    ///
    /// The bank side of the registration is done by [`Bank::register`].
    pub fn new(name: impl Into<String>, bank: BankId, params: ClientParams) -> Self {
        Self {
            name: name.into(),
            bank,
            params,
            installments: VecDeque::new(),
            timeline: BalanceSheetTimeline::new(),
        }
    }

    pub fn bank(&self) -> BankId {
        self.bank
    }

    pub fn params(&self) -> &ClientParams {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut ClientParams {
        &mut self.params
    }

    pub fn installments(&self) -> &VecDeque<f64> {
        &self.installments
    }

    /// Deposits plus savings
    pub fn inside_money(&self) -> f64 {
        self.asset(EntryKind::Deposits) + self.asset(EntryKind::Savings)
    }

    /// Borrow `amount` from the bank, repayable over the bank's loan duration
    pub fn borrow(&mut self, bank: &mut Bank, amount: f64) {
        self.book_asset(EntryKind::Deposits, amount);
        self.book_liability(EntryKind::Debt, amount);
        bank.book_loan(amount);
        schedule_tranches(&mut self.installments, amount, bank.params().loan_duration);
    }

    /// Move `amount` from deposits into savings
    pub fn save(&mut self, bank: &mut Bank, amount: f64) {
        self.book_asset(EntryKind::Deposits, -amount);
        self.book_asset(EntryKind::Savings, amount);
        bank.book_savings_transfer(amount);
    }

    /// Pay interest, then the installment that falls due this cycle
    ///
    /// The defaulted share `defaulting_rate` of the installment is moved from
    /// Debt to UnresolvedDebt on both books; the defaulted share of interest
    /// is simply not paid. What remains is paid from deposits, then savings,
    /// for as far as the client's funds go.
    pub fn pay_debt(&mut self, bank: &mut Bank, ir: f64, defaulting_rate: f64) -> DebtService {
        let rate = defaulting_rate.clamp(0.0, 1.0);
        let installment_due = self.installments.pop_front().unwrap_or(0.0);
        let interest_due = ir * self.liability(EntryKind::Debt).max(0.0);

        let defaulted = rate * installment_due;
        if defaulted > 0.0 {
            self.book_liability(EntryKind::Debt, -defaulted);
            self.book_liability(EntryKind::UnresolvedDebt, defaulted);
            bank.book_default(defaulted);
        }

        let interest_owed = (1.0 - rate) * interest_due;
        let installment_owed = (1.0 - rate) * installment_due;

        let interest = self.withdraw(bank, interest_owed);
        self.book_liability(EntryKind::Equity, -interest.total());
        bank.book_interest_income(interest.total());

        let installment = self.withdraw(bank, installment_owed);
        self.book_liability(EntryKind::Debt, -installment.total());
        bank.book_installment_income(installment.total());

        DebtService {
            installment_due,
            interest_due,
            defaulted,
            installment_owed,
            interest_owed,
            installment_paid: installment.total(),
            interest_paid: interest.total(),
            from_deposits: interest.from_deposits + installment.from_deposits,
            from_savings: interest.from_savings + installment.from_savings,
        }
    }

    /// Trade `amount` of `kind` (Securities or MBS) with the bank
    ///
    /// Positive amounts sell to the bank, negative amounts buy from it. The
    /// seller realizes its proportional revaluation gain into Equity. Sales
    /// are capped by holdings, purchases by the client's deposits and the
    /// bank's holdings.
    ///
    /// # Returns
    ///
    /// The signed amount actually traded (positive = sold to the bank).
    pub fn trade_securities_with_bank(&mut self, bank: &mut Bank, amount: f64, kind: EntryKind) -> f64 {
        let Some(revaluation) = kind.revaluation_kind() else {
            tracing::debug!(client = %self.name, %kind, "not a tradable kind");
            return 0.0;
        };

        if amount > 0.0 {
            let held = self.asset(kind).max(0.0);
            let sold = amount.min(held);
            if sold <= 0.0 {
                return 0.0;
            }
            let realized = sold * ratio(self.liability(revaluation), held);

            self.book_asset(kind, -sold);
            self.book_asset(EntryKind::Deposits, sold);
            self.book_liability(revaluation, -realized);
            self.book_liability(EntryKind::Equity, realized);
            bank.buy_from_client(kind, sold);
            sold
        } else if amount < 0.0 {
            let bought = (-amount)
                .min(self.asset(EntryKind::Deposits).max(0.0))
                .min(bank.asset(kind).max(0.0));
            if bought <= 0.0 {
                return 0.0;
            }

            self.book_asset(EntryKind::Deposits, -bought);
            self.book_asset(kind, bought);
            bank.sell_to_client(kind, bought);
            -bought
        } else {
            0.0
        }
    }

    /// Revalue holdings of `kind` by `rate`, booking the gain as unrealized equity
    pub fn revalue(&mut self, kind: EntryKind, rate: f64) -> f64 {
        let Some(revaluation) = kind.revaluation_kind() else {
            return 0.0;
        };
        let gain = self.asset(kind) * rate;
        if gain != 0.0 {
            self.book_asset(kind, gain);
            self.book_liability(revaluation, gain);
        }
        gain
    }

    /// Receive newly credited deposits as income (spending, QE, transfers)
    ///
    /// The bank books its Deposits side.
    pub fn receive_income(&mut self, amount: f64) {
        self.book_asset(EntryKind::Deposits, amount);
        self.book_liability(EntryKind::Equity, amount);
    }

    /// Extinguish `amount` of debt the bank has written off
    pub fn forgive_debt(&mut self, amount: f64) {
        self.book_liability(EntryKind::Debt, -amount);
        self.book_liability(EntryKind::Equity, amount);
    }

    /// Take up to `amount` from deposits, then savings
    fn withdraw(&mut self, bank: &mut Bank, amount: f64) -> Withdrawal {
        if amount <= 0.0 {
            return Withdrawal::default();
        }

        let from_deposits = amount.min(self.asset(EntryKind::Deposits).max(0.0));
        let from_savings = (amount - from_deposits).min(self.asset(EntryKind::Savings).max(0.0));

        self.book_asset(EntryKind::Deposits, -from_deposits);
        self.book_asset(EntryKind::Savings, -from_savings);
        bank.book_withdrawal(from_deposits, from_savings);

        Withdrawal {
            from_deposits,
            from_savings,
        }
    }
}

impl EconomicActor for PrivateActor {
    fn name(&self) -> &str {
        &self.name
    }

    fn asset_kinds(&self) -> &'static [EntryKind] {
        CLIENT_ASSETS
    }

    fn liability_kinds(&self) -> &'static [EntryKind] {
        CLIENT_LIABILITIES
    }

    fn timeline(&self) -> &BalanceSheetTimeline {
        &self.timeline
    }

    fn timeline_mut(&mut self) -> &mut BalanceSheetTimeline {
        &mut self.timeline
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::bank::BankParams;

    fn setup(loan_duration: usize) -> (Bank, PrivateActor) {
        let bank = Bank::new(
            "bank",
            BankParams {
                loan_duration,
                ..BankParams::default()
            },
        );
        let client = PrivateActor::new("client", BankId(0), ClientParams::default());
        (bank, client)
    }

    #[test]
    fn test_installments_accumulate_per_due_cycle() {
        let (mut bank, mut client) = setup(4);
        client.borrow(&mut bank, 400.0);
        client.borrow(&mut bank, 200.0);

        let tranches: Vec<f64> = client.installments().iter().copied().collect();
        assert_eq!(tranches, vec![150.0, 150.0, 150.0, 150.0]);
        let total: f64 = tranches.iter().sum();
        assert_eq!(total, client.liability(EntryKind::Debt));
    }

    #[test]
    fn test_pay_debt_prefers_deposits_then_savings() {
        let (mut bank, mut client) = setup(1);
        bank.params_mut().loan_ir = 0.1;
        client.borrow(&mut bank, 100.0);
        client.save(&mut bank, 60.0);

        let service = client.pay_debt(&mut bank, 0.1, 0.0);

        assert_eq!(service.interest_paid, 10.0);
        assert_eq!(service.installment_paid, 90.0);
        assert_eq!(service.from_deposits, 40.0);
        assert_eq!(service.from_savings, 60.0);
        assert_eq!(service.installment_shortage(), 10.0);
        assert!(client.validate_balance());
        assert!(bank.validate_balance());
    }

    #[test]
    fn test_selling_realizes_revaluation_gain() {
        let (mut bank, mut client) = setup(1);
        client.book_asset(EntryKind::Securities, 100.0);
        client.book_liability(EntryKind::Equity, 100.0);
        client.revalue(EntryKind::Securities, 0.1);

        let traded = client.trade_securities_with_bank(&mut bank, 55.0, EntryKind::Securities);

        assert_eq!(traded, 55.0);
        assert!((client.liability(EntryKind::SecuritiesEquity) - 5.0).abs() < 1e-9);
        assert!((client.liability(EntryKind::Equity) - 105.0).abs() < 1e-9);
        assert_eq!(bank.asset(EntryKind::Securities), 55.0);
        assert!(client.validate_balance());
        assert!(bank.validate_balance());
    }

    #[test]
    fn test_untradable_kind_is_refused() {
        let (mut bank, mut client) = setup(1);
        assert_eq!(
            client.trade_securities_with_bank(&mut bank, 10.0, EntryKind::Loans),
            0.0
        );
    }

    #[test]
    fn test_undeclared_kind_rejected() {
        let mut client = PrivateActor::new("client", BankId(0), ClientParams::default());
        assert!(!client.book_asset(EntryKind::Reserves, 10.0));
        assert!(!client.book_liability(EntryKind::Deposits, 10.0));
        assert_eq!(client.asset(EntryKind::Reserves), 0.0);
    }
}
