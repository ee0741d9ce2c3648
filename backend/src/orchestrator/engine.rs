//! Economy Engine
//!
//! Owns the actor graph and runs the per-cycle pipeline across it.
//!
//! # Architecture
//!
//! Actors live in three arenas (central banks, banks, clients) and refer to
//! each other by index handles. Each stage is fanned out top-down: the
//! economy drives every central bank, which drives its registered banks,
//! which drive their clients.
//!
//! ```text
//! For each cycle k:
//! 0. begin_cycle: k += 1, record IM at cycle start, start transactions
//! 1. Inflate                  (fixed nominal amounts scale by 1 + inflation)
//! 2. GrowAssets               (securities and MBS revaluation)
//! 3. CentralBankInjections    (reserve interest, QE, helicopter money)
//! 4. Savings                  (new savings, savings interest)
//! 5. Income                   (client debt service, bank debt service)
//! 6. Spending                 (bank discretionary spending)
//! 7. Borrowing                (new client loans toward the IM target)
//! 8. ReserveRebalancing       (reserve requirement, MBS, risk band)
//! 9. Validate                 (commit every sheet, collapse check)
//! ```
//!
//! # Critical Invariants
//!
//! 1. **Order is fixed**: spending must see final income, lending must see
//!    final spending, rebalancing must see every other flow. `run_cycle`
//!    always runs [`CycleStage::ALL`] in order.
//! 2. **Validate is the commit point**: a cycle whose sheets do not balance
//!    is reported as unbalanced; its mutations are not rolled back.

use crate::core::allocation::{pro_rata, ratio};
use crate::models::actor::{BankId, CentralBankId, ClientId, EconomicActor};
use crate::models::bank::{Bank, BankParams, ShortfallLedger};
use crate::models::central_bank::{CentralBank, CentralBankParams};
use crate::models::entry::EntryKind;
use crate::models::event::{Event, EventLog};
use crate::models::private_actor::{ClientParams, PrivateActor};
use crate::models::timeline::LedgerError;
use crate::orchestrator::aggregate::AggregateEconomy;
use crate::orchestrator::config::{compute_config_hash, EconomyConfig, EconomyParams};
use crate::rng::RngManager;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Errors when building or addressing an economy
///
/// Domain failures (shortfalls, unbalanced sheets, collapse) are not errors;
/// they are reported through [`CycleResult`].
#[derive(Debug, Error, PartialEq)]
pub enum EconomyError {
    #[error("Unknown central bank: {0}")]
    UnknownCentralBank(usize),

    #[error("Unknown bank: {0}")]
    UnknownBank(usize),

    #[error("Unknown client: {0}")]
    UnknownClient(usize),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

// ============================================================================
// Cycle Pipeline
// ============================================================================

/// One stage of the cycle pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CycleStage {
    Inflate,
    GrowAssets,
    CentralBankInjections,
    Savings,
    Income,
    Spending,
    Borrowing,
    ReserveRebalancing,
    Validate,
}

impl CycleStage {
    /// Every stage, in execution order
    pub const ALL: [CycleStage; 9] = [
        CycleStage::Inflate,
        CycleStage::GrowAssets,
        CycleStage::CentralBankInjections,
        CycleStage::Savings,
        CycleStage::Income,
        CycleStage::Spending,
        CycleStage::Borrowing,
        CycleStage::ReserveRebalancing,
        CycleStage::Validate,
    ];
}

/// What happened during one cycle
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CycleResult {
    pub cycle: usize,

    /// Every sheet balanced and was committed
    pub balanced: bool,

    /// Inside money fell to zero or below
    pub collapsed: bool,

    pub inside_money: f64,
    pub im_growth: f64,

    // Central bank injections
    pub reserve_interest: f64,
    pub qe: f64,
    pub helicopter_money: f64,

    // Client flows
    pub savings_interest: f64,
    pub interest_collected: f64,
    pub installments_collected: f64,
    pub defaulted: f64,
    pub shortfall: ShortfallLedger,

    // Bank flows
    pub bank_interest_paid: f64,
    pub bank_installments_paid: f64,
    pub spending: f64,
    pub lending: f64,
    pub reserves_borrowed: f64,
}

// ============================================================================
// Economy
// ============================================================================

/// A complete monetary economy
///
/// # Example
///
/// ```rust
/// use euro_economy_core::orchestrator::{AggregateEconomy, EconomyParams, EuroEconomy};
/// use euro_economy_core::models::{BankParams, CentralBankParams, ClientParams};
///
/// let mut economy = EuroEconomy::new(EconomyParams::default(), 42);
/// let ecb = economy.add_central_bank("ecb", CentralBankParams::default());
/// let bank = economy.add_bank(ecb, "bank", BankParams::default()).unwrap();
/// let client = economy.add_client(bank, "household", ClientParams::default()).unwrap();
///
/// economy.lend(client, 1_000.0).unwrap();
/// assert_eq!(economy.im(), 1_000.0);
///
/// let result = economy.run_cycle();
/// assert!(result.balanced);
/// ```
#[derive(Debug, Clone)]
pub struct EuroEconomy {
    params: EconomyParams,
    central_banks: Vec<CentralBank>,
    banks: Vec<Bank>,
    clients: Vec<PrivateActor>,
    rng: RngManager,
    cycle: usize,
    im_at_cycle_start: f64,
    current: CycleResult,
    event_log: EventLog,
    config_hash: Option<String>,
}

impl EuroEconomy {
    pub fn new(params: EconomyParams, rng_seed: u64) -> Self {
        Self {
            params,
            central_banks: Vec::new(),
            banks: Vec::new(),
            clients: Vec::new(),
            rng: RngManager::new(rng_seed),
            cycle: 0,
            im_at_cycle_start: 0.0,
            current: CycleResult::default(),
            event_log: EventLog::new(),
            config_hash: None,
        }
    }

    /// Build the actor graph of `config` and commit it as cycle 0
    ///
    /// Initial loans are booked, every bank then rebalances its reserves
    /// once, and all sheets are saved so the first cycle has a baseline.
    pub fn from_config(config: &EconomyConfig) -> Result<Self, EconomyError> {
        let mut economy = Self::new(config.params, config.rng_seed);
        economy.config_hash = Some(compute_config_hash(config)?);

        for cb_config in &config.central_banks {
            let cb = economy.add_central_bank(cb_config.name.clone(), cb_config.params.clone());
            for bank_config in &cb_config.banks {
                let bank = economy.add_bank(cb, bank_config.name.clone(), bank_config.params.clone())?;
                for client_config in &bank_config.clients {
                    let client = economy.add_client(
                        bank,
                        client_config.name.clone(),
                        client_config.params.clone(),
                    )?;
                    if client_config.initial_loan > 0.0 {
                        economy.lend(client, client_config.initial_loan)?;
                    }
                }
            }
        }

        for cb in economy.central_banks.iter_mut() {
            cb.update_reserves(&mut economy.banks, &mut economy.clients);
        }

        let committed = economy.commit();
        tracing::info!(
            central_banks = economy.central_banks.len(),
            banks = economy.banks.len(),
            clients = economy.clients.len(),
            inside_money = economy.im(),
            committed,
            "economy initialized"
        );
        Ok(economy)
    }

    // ========================================================================
    // Graph construction
    // ========================================================================

    pub fn add_central_bank(&mut self, name: impl Into<String>, params: CentralBankParams) -> CentralBankId {
        self.central_banks.push(CentralBank::new(name, params));
        CentralBankId(self.central_banks.len() - 1)
    }

    /// Add a bank registered to `central_bank`
    pub fn add_bank(
        &mut self,
        central_bank: CentralBankId,
        name: impl Into<String>,
        params: BankParams,
    ) -> Result<BankId, EconomyError> {
        let id = BankId(self.banks.len());
        let cb = self
            .central_banks
            .get_mut(central_bank.0)
            .ok_or(EconomyError::UnknownCentralBank(central_bank.0))?;
        cb.register(id);

        let mut bank = Bank::new(name, params);
        bank.set_central_bank(central_bank);
        self.banks.push(bank);
        Ok(id)
    }

    /// Add a client registered to `bank`
    pub fn add_client(
        &mut self,
        bank: BankId,
        name: impl Into<String>,
        params: ClientParams,
    ) -> Result<ClientId, EconomyError> {
        let id = ClientId(self.clients.len());
        self.banks
            .get_mut(bank.0)
            .ok_or(EconomyError::UnknownBank(bank.0))?
            .register(id);
        self.clients.push(PrivateActor::new(name, bank, params));
        Ok(id)
    }

    /// Book a loan from a client's own bank to the client
    pub fn lend(&mut self, client: ClientId, amount: f64) -> Result<(), EconomyError> {
        let actor = self
            .clients
            .get_mut(client.0)
            .ok_or(EconomyError::UnknownClient(client.0))?;
        let bank = self
            .banks
            .get_mut(actor.bank().0)
            .ok_or(EconomyError::UnknownBank(actor.bank().0))?;
        actor.borrow(bank, amount);
        Ok(())
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn params(&self) -> &EconomyParams {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut EconomyParams {
        &mut self.params
    }

    pub fn central_bank(&self, id: CentralBankId) -> Result<&CentralBank, EconomyError> {
        self.central_banks
            .get(id.0)
            .ok_or(EconomyError::UnknownCentralBank(id.0))
    }

    pub fn central_bank_mut(&mut self, id: CentralBankId) -> Result<&mut CentralBank, EconomyError> {
        self.central_banks
            .get_mut(id.0)
            .ok_or(EconomyError::UnknownCentralBank(id.0))
    }

    pub fn bank(&self, id: BankId) -> Result<&Bank, EconomyError> {
        self.banks.get(id.0).ok_or(EconomyError::UnknownBank(id.0))
    }

    pub fn bank_mut(&mut self, id: BankId) -> Result<&mut Bank, EconomyError> {
        self.banks.get_mut(id.0).ok_or(EconomyError::UnknownBank(id.0))
    }

    pub fn client(&self, id: ClientId) -> Result<&PrivateActor, EconomyError> {
        self.clients.get(id.0).ok_or(EconomyError::UnknownClient(id.0))
    }

    pub fn client_mut(&mut self, id: ClientId) -> Result<&mut PrivateActor, EconomyError> {
        self.clients
            .get_mut(id.0)
            .ok_or(EconomyError::UnknownClient(id.0))
    }

    pub fn central_banks(&self) -> &[CentralBank] {
        &self.central_banks
    }

    pub fn banks(&self) -> &[Bank] {
        &self.banks
    }

    pub fn clients(&self) -> &[PrivateActor] {
        &self.clients
    }

    /// Index of the last started cycle (0 before the first one)
    pub fn cycle(&self) -> usize {
        self.cycle
    }

    pub fn im_at_cycle_start(&self) -> f64 {
        self.im_at_cycle_start
    }

    pub fn event_log(&self) -> &EventLog {
        &self.event_log
    }

    /// Hash of the config this economy was built from, if any
    pub fn config_hash(&self) -> Option<&str> {
        self.config_hash.as_deref()
    }

    /// Inside money target of the running cycle
    pub fn lending_target(&self) -> f64 {
        self.im_at_cycle_start * (1.0 + self.params.growth_rate) * (1.0 + self.params.inflation_rate)
    }

    // ========================================================================
    // Cycle execution
    // ========================================================================

    /// Run every stage of one cycle
    pub fn run_cycle(&mut self) -> CycleResult {
        self.begin_cycle();
        for stage in CycleStage::ALL {
            self.run_stage(stage);
        }
        self.current.clone()
    }

    /// Open a new cycle; stages run after this belong to it
    pub fn begin_cycle(&mut self) {
        self.cycle += 1;
        self.im_at_cycle_start = self.im();
        self.current = CycleResult {
            cycle: self.cycle,
            ..CycleResult::default()
        };
        for cb in self.central_banks.iter_mut() {
            cb.start_transactions(&mut self.banks);
        }
    }

    /// Result accumulated so far in the running cycle
    pub fn current_result(&self) -> &CycleResult {
        &self.current
    }

    /// Run a single stage of the running cycle
    ///
    /// Stages are independently callable for testing; only
    /// [`run_cycle`](Self::run_cycle) guarantees the full order.
    pub fn run_stage(&mut self, stage: CycleStage) {
        match stage {
            CycleStage::Inflate => self.inflate(),
            CycleStage::GrowAssets => self.grow_assets(),
            CycleStage::CentralBankInjections => self.inject_money(),
            CycleStage::Savings => self.process_savings(),
            CycleStage::Income => self.process_income(),
            CycleStage::Spending => self.process_spending(),
            CycleStage::Borrowing => self.process_borrowing(),
            CycleStage::ReserveRebalancing => self.update_reserves(),
            CycleStage::Validate => self.validate(),
        }
    }

    fn inflate(&mut self) {
        let inflation = self.params.inflation_rate;
        if inflation == 0.0 {
            return;
        }
        for cb in self.central_banks.iter_mut() {
            cb.inflate_parameters(&mut self.banks, inflation);
        }
    }

    fn grow_assets(&mut self) {
        let security_growth = self.params.security_growth_rate;
        let mbs_growth = self.params.mbs_growth_rate;
        if security_growth == 0.0 && mbs_growth == 0.0 {
            return;
        }
        for cb in self.central_banks.iter_mut() {
            cb.grow_assets(&mut self.banks, &mut self.clients, security_growth, mbs_growth);
        }
    }

    fn inject_money(&mut self) {
        let cycle = self.cycle;
        for cb in self.central_banks.iter_mut() {
            let interest = cb.process_reserve_interest(&mut self.banks);
            let qe = cb.process_qe(&mut self.banks, &mut self.clients);
            let helicopter = cb.process_helicopter_money(&mut self.banks, &mut self.clients);

            self.current.reserve_interest += interest;
            self.current.qe += qe.amount;
            self.current.helicopter_money += helicopter;

            if interest > 0.0 {
                self.event_log.log(Event::ReserveInterest {
                    cycle,
                    central_bank: cb.name().to_string(),
                    amount: interest,
                });
            }
            if qe.amount > 0.0 {
                self.event_log.log(Event::QuantitativeEasing {
                    cycle,
                    central_bank: cb.name().to_string(),
                    amount: qe.amount,
                    new_money: qe.new_money,
                });
            }
            if helicopter > 0.0 {
                self.event_log.log(Event::HelicopterMoney {
                    cycle,
                    central_bank: cb.name().to_string(),
                    amount: helicopter,
                });
            }
        }
    }

    fn process_savings(&mut self) {
        let cycle = self.cycle;
        for cb in self.central_banks.iter_mut() {
            let interest = cb.process_savings(&mut self.banks, &mut self.clients);
            self.current.savings_interest += interest;
            if interest != 0.0 {
                self.event_log.log(Event::SavingsInterest {
                    cycle,
                    central_bank: cb.name().to_string(),
                    amount: interest,
                });
            }
        }
    }

    fn process_income(&mut self) {
        let cycle = self.cycle;
        for cb in self.central_banks.iter_mut() {
            let outcomes = cb.process_income(&mut self.banks, &mut self.clients, &mut self.rng);
            for (id, income, debt) in outcomes {
                let name = self
                    .banks
                    .get(id.0)
                    .map(|b| b.name().to_string())
                    .unwrap_or_default();

                self.current.interest_collected += income.interest_collected;
                self.current.installments_collected += income.installments_collected;
                self.current.defaulted += income.defaulted;
                self.current.shortfall.income_shortage += income.shortfall.income_shortage;
                self.current.shortfall.client_installment_shortage +=
                    income.shortfall.client_installment_shortage;
                self.current.shortfall.debt_collector_losses += income.shortfall.debt_collector_losses;
                self.current.bank_interest_paid += debt.interest_paid;
                self.current.bank_installments_paid += debt.installment_paid;
                self.current.reserves_borrowed += debt.borrowed;

                self.event_log.log(Event::DebtCollected {
                    cycle,
                    bank: name.clone(),
                    interest: income.interest_collected,
                    installments: income.installments_collected,
                    defaulted: income.defaulted,
                    written_off: income.shortfall.client_installment_shortage,
                });
                if debt.installment_paid > 0.0 || debt.interest_paid > 0.0 {
                    self.event_log.log(Event::CentralBankDebtServiced {
                        cycle,
                        bank: name,
                        installment: debt.installment_paid,
                        interest: debt.interest_paid,
                        borrowed: debt.borrowed,
                    });
                }
            }
        }
    }

    fn process_spending(&mut self) {
        let cycle = self.cycle;
        for cb in self.central_banks.iter_mut() {
            for (id, outcome) in cb.process_spending(&mut self.banks, &mut self.clients) {
                self.current.spending += outcome.expense;
                if outcome.expense > 0.0 {
                    self.event_log.log(Event::BankSpending {
                        cycle,
                        bank: self
                            .banks
                            .get(id.0)
                            .map(|b| b.name().to_string())
                            .unwrap_or_default(),
                        profit: outcome.profit,
                        expense: outcome.expense,
                    });
                }
            }
        }
    }

    /// Lend `(target - IM) * lending_satisfaction_rate` when IM is short of
    /// the target, spread over central banks by their inside money
    fn process_borrowing(&mut self) {
        let gap = self.lending_target() - self.im();
        let amount = gap * self.params.lending_satisfaction_rate;
        if amount <= 0.0 {
            return;
        }

        let weights: Vec<f64> = self
            .central_banks
            .iter()
            .map(|cb| cb.inside_money(&self.banks))
            .collect();
        let shares = pro_rata(amount, &weights);

        let cycle = self.cycle;
        for (cb, share) in self.central_banks.iter_mut().zip(shares) {
            let lent = cb.process_lending(&mut self.banks, &mut self.clients, share);
            self.current.lending += lent;
            if lent > 0.0 {
                self.event_log.log(Event::Lending {
                    cycle,
                    central_bank: cb.name().to_string(),
                    amount: lent,
                });
            }
        }
    }

    fn update_reserves(&mut self) {
        let cycle = self.cycle;
        for cb in self.central_banks.iter_mut() {
            for (id, adjustment) in cb.update_reserves(&mut self.banks, &mut self.clients) {
                self.current.reserves_borrowed += adjustment.borrowed;
                let traded = adjustment.risk_trade + adjustment.excess_reserve_trade;
                if adjustment.borrowed > 0.0 || adjustment.securitized > 0.0 || traded != 0.0 {
                    self.event_log.log(Event::ReservesRebalanced {
                        cycle,
                        bank: self
                            .banks
                            .get(id.0)
                            .map(|b| b.name().to_string())
                            .unwrap_or_default(),
                        borrowed: adjustment.borrowed,
                        securitized: adjustment.securitized,
                        securities_traded: traded,
                    });
                }
            }
        }
    }

    /// Commit every sheet, then check for collapse
    fn validate(&mut self) {
        let balanced = self.commit();
        let inside_money = self.im();

        self.current.balanced = balanced;
        self.current.inside_money = inside_money;
        self.current.im_growth = self.im_growth();
        self.current.collapsed = inside_money <= 0.0;

        self.event_log.log(Event::CycleCommitted {
            cycle: self.cycle,
            balanced,
            inside_money,
        });

        if !balanced {
            tracing::warn!(cycle = self.cycle, "cycle failed balance validation");
        }
        if self.current.collapsed {
            self.event_log.log(Event::Collapse {
                cycle: self.cycle,
                inside_money,
            });
            tracing::warn!(cycle = self.cycle, inside_money, "inside money collapsed");
        } else {
            tracing::info!(
                cycle = self.cycle,
                inside_money,
                growth = self.current.im_growth,
                balanced,
                "cycle complete"
            );
        }
    }

    /// `end_transactions` on every central bank; AND of all commits
    fn commit(&mut self) -> bool {
        let mut balanced = true;
        for cb in self.central_banks.iter_mut() {
            balanced &= cb.end_transactions(&mut self.banks, &mut self.clients);
        }
        balanced
    }
}

// ============================================================================
// Aggregates
// ============================================================================

impl AggregateEconomy for EuroEconomy {
    fn im(&self) -> f64 {
        self.banks.iter().map(|bank| bank.inside_money()).sum()
    }

    fn total_private_debt(&self) -> f64 {
        self.clients
            .iter()
            .map(|client| client.liability(EntryKind::Debt))
            .sum()
    }

    fn total_unresolved_debt(&self) -> f64 {
        self.clients
            .iter()
            .map(|client| client.liability(EntryKind::UnresolvedDebt))
            .sum()
    }

    fn total_reserves(&self) -> f64 {
        self.banks
            .iter()
            .map(|bank| bank.asset(EntryKind::Reserves))
            .sum()
    }

    fn total_bank_equity(&self) -> f64 {
        self.banks
            .iter()
            .map(|bank| bank.liability(EntryKind::Equity))
            .sum()
    }

    fn im_growth(&self) -> f64 {
        if self.im_at_cycle_start == 0.0 {
            return 0.0;
        }
        ratio(self.im() - self.im_at_cycle_start, self.im_at_cycle_start.abs())
    }
}
