//! Central bank model
//!
//! The central bank lends reserves to its registered banks, pays interest on
//! reserves and injects money through quantitative easing and helicopter
//! money. It also fans each cycle stage out to its banks, which fan out to
//! their clients, so that a whole branch of the actor graph is driven from
//! here.
//!
//! # Critical Invariants
//!
//! 1. **Loans mirror bank debt**: central bank Loans equal the sum of its
//!    banks' Debt.
//! 2. **Injections are balanced**: QE and helicopter money raise assets and
//!    Reserves by the same amount.

use crate::core::allocation::pro_rata;
use crate::models::actor::{BankId, EconomicActor};
use crate::models::bank::{Bank, BankDebtService, IncomeOutcome, ReserveAdjustment, SpendingOutcome};
use crate::models::entry::EntryKind;
use crate::models::private_actor::PrivateActor;
use crate::models::timeline::BalanceSheetTimeline;
use crate::rng::RngManager;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

const CENTRAL_BANK_ASSETS: &[EntryKind] = &[
    EntryKind::Loans,
    EntryKind::Securities,
    EntryKind::HelicopterMoney,
];

const CENTRAL_BANK_LIABILITIES: &[EntryKind] = &[EntryKind::Reserves, EntryKind::Equity];

/// How much money the central bank injects per cycle
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InjectionMode {
    #[default]
    None,

    /// A fixed nominal amount, inflated every cycle
    Fixed { amount: f64 },

    /// A rate applied to total private debt
    DebtRelated { rate: f64 },
}

impl InjectionMode {
    /// Amount to inject this cycle given total private debt
    pub fn amount(&self, private_debt: f64) -> f64 {
        match self {
            InjectionMode::None => 0.0,
            InjectionMode::Fixed { amount } => *amount,
            InjectionMode::DebtRelated { rate } => rate * private_debt.max(0.0),
        }
    }

    fn inflate(&mut self, inflation: f64) {
        if let InjectionMode::Fixed { amount } = self {
            *amount *= 1.0 + inflation;
        }
    }
}

/// Monetary policy parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CentralBankParams {
    /// Interest on required reserves per cycle
    pub reserve_ir: f64,

    /// Interest on reserves above the requirement per cycle
    pub surplus_reserve_ir: f64,

    /// Interest on bank loans per cycle
    pub loan_ir: f64,

    /// Cycles over which bank loans are repaid
    pub loan_duration: usize,

    /// Required reserves as a share of deposits plus savings
    pub min_reserve_ratio: f64,

    /// Share of MBS holdings that counts toward the reserve requirement
    pub mbs_reserve_ratio: f64,

    /// Share of securities holdings that counts toward the reserve requirement
    pub securities_reserve_ratio: f64,

    pub qe_mode: InjectionMode,

    pub helicopter_mode: InjectionMode,
}

impl Default for CentralBankParams {
    fn default() -> Self {
        Self {
            reserve_ir: 0.0,
            surplus_reserve_ir: 0.0,
            loan_ir: 0.0,
            loan_duration: 20,
            min_reserve_ratio: 0.0,
            mbs_reserve_ratio: 0.0,
            securities_reserve_ratio: 0.0,
            qe_mode: InjectionMode::None,
            helicopter_mode: InjectionMode::None,
        }
    }
}

/// Result of one QE round
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct QeOutcome {
    pub amount: f64,
    /// Met by buying securities from banks
    pub absorbed_securities: f64,
    /// Met by creating new client deposits
    pub new_money: f64,
}

/// A central bank and the banks registered to it
#[derive(Debug, Clone)]
pub struct CentralBank {
    name: String,
    params: CentralBankParams,
    banks: BTreeSet<BankId>,
    timeline: BalanceSheetTimeline,
}

impl CentralBank {
    pub fn new(name: impl Into<String>, params: CentralBankParams) -> Self {
        Self {
            name: name.into(),
            params,
            banks: BTreeSet::new(),
            timeline: BalanceSheetTimeline::new(),
        }
    }

    /// Register a bank; returns `false` if it was already registered
    pub fn register(&mut self, bank: BankId) -> bool {
        self.banks.insert(bank)
    }

    pub fn banks(&self) -> impl Iterator<Item = BankId> + '_ {
        self.banks.iter().copied()
    }

    pub fn params(&self) -> &CentralBankParams {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut CentralBankParams {
        &mut self.params
    }

    /// Scale fixed injection amounts (and bank fixed spending) by `1 + inflation`
    pub fn inflate_parameters(&mut self, banks: &mut [Bank], inflation: f64) {
        self.params.qe_mode.inflate(inflation);
        self.params.helicopter_mode.inflate(inflation);
        for id in self.banks.iter() {
            if let Some(bank) = banks.get_mut(id.0) {
                bank.inflate_parameters(inflation);
            }
        }
    }

    /// Bank borrowed reserves: Loans +x / Reserves +x
    pub fn book_loan(&mut self, amount: f64) {
        self.book_asset(EntryKind::Loans, amount);
        self.book_liability(EntryKind::Reserves, amount);
    }

    /// Bank repaid principal: Loans -x / Reserves -x
    pub fn book_repayment(&mut self, amount: f64) {
        self.book_asset(EntryKind::Loans, -amount);
        self.book_liability(EntryKind::Reserves, -amount);
    }

    /// Deposits plus savings over all registered banks
    pub fn inside_money(&self, banks: &[Bank]) -> f64 {
        self.banks
            .iter()
            .filter_map(|id| banks.get(id.0))
            .map(|bank| bank.inside_money())
            .sum()
    }

    /// Debt of every client of every registered bank
    pub fn total_private_debt(&self, banks: &[Bank], clients: &[PrivateActor]) -> f64 {
        self.banks
            .iter()
            .filter_map(|id| banks.get(id.0))
            .flat_map(|bank| bank.clients())
            .filter_map(|id| clients.get(id.0))
            .map(|client| client.liability(EntryKind::Debt))
            .sum()
    }

    // ========================================================================
    // Cycle bracket
    // ========================================================================

    pub fn start_transactions(&mut self, banks: &mut [Bank]) {
        for id in self.banks.iter() {
            if let Some(bank) = banks.get_mut(id.0) {
                bank.start_transactions();
            }
        }
    }

    /// Commit every bank and client of this branch, then the central bank
    ///
    /// Returns the logical AND of all commits: one unbalanced sheet fails
    /// the cycle.
    pub fn end_transactions(&mut self, banks: &mut [Bank], clients: &mut [PrivateActor]) -> bool {
        let mut valid = true;
        for id in self.banks.iter() {
            if let Some(bank) = banks.get_mut(id.0) {
                valid &= bank.end_transactions(clients);
            }
        }
        valid &= self.save_state();
        valid
    }

    // ========================================================================
    // Money injection
    // ========================================================================

    /// Pay interest on reserves to every bank
    ///
    /// Required reserves earn `reserve_ir`, the surplus earns
    /// `surplus_reserve_ir`. Central bank Equity -x / Reserves +x, bank
    /// Reserves +x / Equity +x.
    pub fn process_reserve_interest(&mut self, banks: &mut [Bank]) -> f64 {
        let ids: Vec<BankId> = self.banks.iter().copied().collect();
        let mut total = 0.0;
        for id in ids {
            let Some(bank) = banks.get_mut(id.0) else {
                continue;
            };
            let reserves = bank.asset(EntryKind::Reserves).max(0.0);
            let required = self.params.min_reserve_ratio * bank.inside_money();
            let interest = self.params.reserve_ir * reserves.min(required).max(0.0)
                + self.params.surplus_reserve_ir * (reserves - required).max(0.0);
            if interest == 0.0 {
                continue;
            }
            self.book_liability(EntryKind::Equity, -interest);
            self.book_liability(EntryKind::Reserves, interest);
            bank.book_reserve_interest(interest);
            total += interest;
        }
        total
    }

    /// Quantitative easing for this cycle
    ///
    /// Books Securities +q / Reserves +q. The purchase is first met from
    /// banks' own securities (bank Securities -s / Reserves +s); the rest
    /// becomes new deposits, spread over banks by inside money and on to
    /// their clients.
    pub fn process_qe(&mut self, banks: &mut [Bank], clients: &mut [PrivateActor]) -> QeOutcome {
        let amount = self
            .params
            .qe_mode
            .amount(self.total_private_debt(banks, clients));
        if amount <= 0.0 {
            return QeOutcome::default();
        }

        self.book_asset(EntryKind::Securities, amount);
        self.book_liability(EntryKind::Reserves, amount);

        let mut remaining = amount;
        for id in self.banks.iter() {
            if remaining <= 0.0 {
                break;
            }
            if let Some(bank) = banks.get_mut(id.0) {
                remaining -= bank.sell_securities_to_central_bank(remaining);
            }
        }

        let new_money = remaining.max(0.0);
        if new_money > 0.0 {
            self.distribute_new_money(banks, clients, new_money);
        }

        tracing::debug!(
            central_bank = %self.name,
            amount,
            new_money,
            "quantitative easing"
        );

        QeOutcome {
            amount,
            absorbed_securities: amount - new_money,
            new_money,
        }
    }

    /// Helicopter money for this cycle
    ///
    /// Books HelicopterMoney +h / Reserves +h and passes the whole amount to
    /// clients as new deposits and equity. Never offset elsewhere.
    pub fn process_helicopter_money(&mut self, banks: &mut [Bank], clients: &mut [PrivateActor]) -> f64 {
        let amount = self
            .params
            .helicopter_mode
            .amount(self.total_private_debt(banks, clients));
        if amount <= 0.0 {
            return 0.0;
        }

        self.book_asset(EntryKind::HelicopterMoney, amount);
        self.book_liability(EntryKind::Reserves, amount);
        self.distribute_new_money(banks, clients, amount);
        amount
    }

    // ========================================================================
    // Stage fan-out to registered banks
    // ========================================================================

    pub fn grow_assets(&mut self, banks: &mut [Bank], clients: &mut [PrivateActor], security_growth: f64, mbs_growth: f64) {
        for id in self.banks.iter() {
            if let Some(bank) = banks.get_mut(id.0) {
                bank.grow_assets(clients, security_growth, mbs_growth);
            }
        }
    }

    /// New client savings, then savings interest; returns interest paid
    pub fn process_savings(&mut self, banks: &mut [Bank], clients: &mut [PrivateActor]) -> f64 {
        let mut interest = 0.0;
        for id in self.banks.iter() {
            if let Some(bank) = banks.get_mut(id.0) {
                bank.collect_savings(clients);
                interest += bank.process_savings(clients);
            }
        }
        interest
    }

    /// Client debt service at every bank, then each bank's own debt service
    pub fn process_income(
        &mut self,
        banks: &mut [Bank],
        clients: &mut [PrivateActor],
        rng: &mut RngManager,
    ) -> Vec<(BankId, IncomeOutcome, BankDebtService)> {
        let ids: Vec<BankId> = self.banks.iter().copied().collect();
        let mut outcomes = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(bank) = banks.get_mut(id.0) {
                let income = bank.process_income(clients, rng);
                let debt = bank.pay_debt(self, clients);
                outcomes.push((id, income, debt));
            }
        }
        outcomes
    }

    pub fn process_spending(&mut self, banks: &mut [Bank], clients: &mut [PrivateActor]) -> Vec<(BankId, SpendingOutcome)> {
        self.banks
            .iter()
            .filter_map(|id| banks.get_mut(id.0).map(|bank| (*id, bank.spend(clients))))
            .collect()
    }

    /// Spread new lending over banks by inside money; returns amount lent
    pub fn process_lending(&mut self, banks: &mut [Bank], clients: &mut [PrivateActor], amount: f64) -> f64 {
        if amount <= 0.0 {
            return 0.0;
        }
        let ids: Vec<BankId> = self.banks.iter().copied().collect();
        let weights: Vec<f64> = ids
            .iter()
            .map(|id| banks.get(id.0).map(|b| b.inside_money()).unwrap_or(0.0))
            .collect();

        let mut lent = 0.0;
        for (id, share) in ids.iter().zip(pro_rata(amount, &weights)) {
            if let Some(bank) = banks.get_mut(id.0) {
                lent += bank.lend_to_clients(clients, share);
            }
        }
        lent
    }

    pub fn update_reserves(&mut self, banks: &mut [Bank], clients: &mut [PrivateActor]) -> Vec<(BankId, ReserveAdjustment)> {
        let ids: Vec<BankId> = self.banks.iter().copied().collect();
        let mut adjustments = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(bank) = banks.get_mut(id.0) {
                adjustments.push((id, bank.update_reserves(self, clients)));
            }
        }
        adjustments
    }

    fn distribute_new_money(&mut self, banks: &mut [Bank], clients: &mut [PrivateActor], amount: f64) {
        let ids: Vec<BankId> = self.banks.iter().copied().collect();
        let weights: Vec<f64> = ids
            .iter()
            .map(|id| banks.get(id.0).map(|b| b.inside_money()).unwrap_or(0.0))
            .collect();

        for (id, share) in ids.iter().zip(pro_rata(amount, &weights)) {
            if let Some(bank) = banks.get_mut(id.0) {
                bank.receive_new_money(clients, share);
            }
        }
    }
}

impl EconomicActor for CentralBank {
    fn name(&self) -> &str {
        &self.name
    }

    fn asset_kinds(&self) -> &'static [EntryKind] {
        CENTRAL_BANK_ASSETS
    }

    fn liability_kinds(&self) -> &'static [EntryKind] {
        CENTRAL_BANK_LIABILITIES
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

    #[test]
    fn test_injection_amounts() {
        assert_eq!(InjectionMode::None.amount(1_000.0), 0.0);
        assert_eq!(InjectionMode::Fixed { amount: 50.0 }.amount(1_000.0), 50.0);
        assert_eq!(InjectionMode::DebtRelated { rate: 0.01 }.amount(1_000.0), 10.0);
    }

    #[test]
    fn test_inflate_scales_fixed_modes() {
        let mut cb = CentralBank::new(
            "ecb",
            CentralBankParams {
                qe_mode: InjectionMode::Fixed { amount: 100.0 },
                helicopter_mode: InjectionMode::DebtRelated { rate: 0.1 },
                ..CentralBankParams::default()
            },
        );
        cb.inflate_parameters(&mut [], 0.1);

        match cb.params().qe_mode {
            InjectionMode::Fixed { amount } => assert!((amount - 110.0).abs() < 1e-9),
            other => panic!("unexpected mode {:?}", other),
        }
        assert_eq!(cb.params().helicopter_mode, InjectionMode::DebtRelated { rate: 0.1 });
    }

    #[test]
    fn test_bank_borrowing_mirrors_on_both_books() {
        let mut cb = CentralBank::new("ecb", CentralBankParams::default());
        let mut bank = Bank::new("bank", BankParams::default());

        bank.borrow(&mut cb, 250.0);

        assert_eq!(cb.asset(EntryKind::Loans), 250.0);
        assert_eq!(cb.liability(EntryKind::Reserves), 250.0);
        assert_eq!(bank.asset(EntryKind::Reserves), 250.0);
        assert_eq!(bank.liability(EntryKind::Debt), 250.0);
        assert!(cb.validate_balance() && bank.validate_balance());
    }
}
