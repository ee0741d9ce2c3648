//! Commercial bank model
//!
//! A bank is registered to one central bank and serves a set of private
//! actors. Per cycle it:
//! - pays interest on its clients' savings
//! - collects interest and installments, absorbing client shortfalls as
//!   write-downs and selling defaulted claims to debt collectors
//! - spends part of its results according to its [`SpendingMode`]
//! - services its own central bank debt
//! - rebalances reserves and risk assets
//!
//! Client collections are bounded by what clients hold; nothing here fails.
//! Shortfalls are tracked in [`ShortfallLedger`] for reporting.
//!
//! CRITICAL: every method books both sides of each flow it causes.

use crate::core::allocation::{pro_rata, ratio, schedule_tranches};
use crate::models::actor::{CentralBankId, ClientId, EconomicActor};
use crate::models::central_bank::CentralBank;
use crate::models::entry::EntryKind;
use crate::models::private_actor::PrivateActor;
use crate::models::timeline::BalanceSheetTimeline;
use crate::policy::{SpendingContext, SpendingLimits, SpendingMode};
use crate::rng::RngManager;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, VecDeque};

const BANK_ASSETS: &[EntryKind] = &[
    EntryKind::Reserves,
    EntryKind::Loans,
    EntryKind::Mbs,
    EntryKind::Securities,
    EntryKind::UnresolvedDebt,
];

const BANK_LIABILITIES: &[EntryKind] = &[
    EntryKind::Deposits,
    EntryKind::Savings,
    EntryKind::Debt,
    EntryKind::Equity,
    EntryKind::SecuritiesEquity,
    EntryKind::MbsEquity,
];

/// Policy parameters of a commercial bank
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BankParams {
    /// Reserves above this share of deposits+savings are put to work
    /// (zero or less disables the check)
    pub max_reserve_ratio: f64,

    /// Lower bound of (MBS + Securities) / total assets
    pub min_risk_asset_ratio: f64,

    /// Upper bound of (MBS + Securities) / total assets
    pub max_risk_asset_ratio: f64,

    /// Cap of MBS / total assets when securitizing loans
    pub max_mbs_ratio: f64,

    /// Cap of Securities / total assets when buying from clients
    pub max_securities_ratio: f64,

    /// Interest paid on client savings per cycle
    pub savings_ir: f64,

    /// Interest charged on client debt per cycle
    pub loan_ir: f64,

    /// Number of cycles over which client loans are repaid
    pub loan_duration: usize,

    pub spending: SpendingMode,

    /// Never spend more than this cycle's profit
    pub no_loss: bool,

    /// Keep at least `retain_profit_percentage` of profit when spending
    pub retain_profit: bool,
    pub retain_profit_percentage: f64,

    /// Share of unresolved debt sold to debt collectors each cycle
    pub defaults_bought_by_debt_collectors: f64,
}

impl Default for BankParams {
    fn default() -> Self {
        Self {
            max_reserve_ratio: 0.0,
            min_risk_asset_ratio: 0.0,
            max_risk_asset_ratio: 1.0,
            max_mbs_ratio: 0.0,
            max_securities_ratio: 0.0,
            savings_ir: 0.0,
            loan_ir: 0.0,
            loan_duration: 20,
            spending: SpendingMode::default(),
            no_loss: false,
            retain_profit: false,
            retain_profit_percentage: 0.0,
            defaults_bought_by_debt_collectors: 0.0,
        }
    }
}

impl BankParams {
    pub fn spending_limits(&self) -> SpendingLimits {
        SpendingLimits {
            no_loss: self.no_loss,
            retain_profit_percentage: self.retain_profit.then_some(self.retain_profit_percentage),
        }
    }
}

/// Collection shortfalls of one bank
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ShortfallLedger {
    /// Interest not received (defaulted or unpaid)
    pub income_shortage: f64,
    /// Owed installments clients could not pay (written off)
    pub client_installment_shortage: f64,
    /// Unresolved debt sold to debt collectors (realized loss)
    pub debt_collector_losses: f64,
}

impl ShortfallLedger {
    fn add(&mut self, other: &ShortfallLedger) {
        self.income_shortage += other.income_shortage;
        self.client_installment_shortage += other.client_installment_shortage;
        self.debt_collector_losses += other.debt_collector_losses;
    }
}

/// Result of one cycle of income collection
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct IncomeOutcome {
    pub interest_collected: f64,
    pub installments_collected: f64,
    /// Principal moved into UnresolvedDebt this cycle
    pub defaulted: f64,
    pub shortfall: ShortfallLedger,
}

/// Result of one spending decision
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SpendingOutcome {
    pub profit: f64,
    pub candidate: f64,
    pub expense: f64,
    /// Securities sold to clients to realize gains first (capital mode)
    pub securities_sold: f64,
}

/// Result of one cycle of central bank debt service
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BankDebtService {
    pub installment_paid: f64,
    pub interest_paid: f64,
    /// Extra borrowing needed to cover the installment
    pub borrowed: f64,
}

/// Result of the capital-structure rebalancing
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ReserveAdjustment {
    /// Borrowed from the central bank to meet the reserve requirement
    pub borrowed: f64,
    /// Loans securitized into MBS
    pub securitized: f64,
    /// Signed securities trade with clients for the risk-asset band
    /// (positive = bought from clients)
    pub risk_trade: f64,
    /// Securities bought from clients to absorb excess reserves
    pub excess_reserve_trade: f64,
}

/// A commercial bank
///
/// # Example
/// ```
/// use euro_economy_core::models::{Bank, BankParams, BankId, ClientId, ClientParams, EconomicActor, PrivateActor};
/// use euro_economy_core::EntryKind;
///
/// let mut bank = Bank::new("bank", BankParams { savings_ir: 0.1, ..BankParams::default() });
/// let mut clients = vec![PrivateActor::new("client", BankId(0), ClientParams::default())];
/// bank.register(ClientId(0));
///
/// clients[0].borrow(&mut bank, 1000.0);
/// clients[0].save(&mut bank, 100.0);
/// bank.process_savings(&mut clients);
///
/// assert_eq!(clients[0].asset(EntryKind::Savings), 110.0);
/// assert_eq!(bank.liability(EntryKind::Equity), -10.0);
/// ```
#[derive(Debug, Clone)]
pub struct Bank {
    name: String,
    central_bank: Option<CentralBankId>,
    clients: BTreeSet<ClientId>,
    params: BankParams,
    /// Pending central bank principal tranches, index = cycles until due
    installments: VecDeque<f64>,
    cycle_shortfall: ShortfallLedger,
    total_shortfall: ShortfallLedger,
    timeline: BalanceSheetTimeline,
}

impl Bank {
    pub fn new(name: impl Into<String>, params: BankParams) -> Self {
        Self {
            name: name.into(),
            central_bank: None,
            clients: BTreeSet::new(),
            params,
            installments: VecDeque::new(),
            cycle_shortfall: ShortfallLedger::default(),
            total_shortfall: ShortfallLedger::default(),
            timeline: BalanceSheetTimeline::new(),
        }
    }

    // ========================================================================
    // Registration and accessors
    // ========================================================================

    /// Register a client; returns `false` if it was already registered
    pub fn register(&mut self, client: ClientId) -> bool {
        self.clients.insert(client)
    }

    pub fn clients(&self) -> impl Iterator<Item = ClientId> + '_ {
        self.clients.iter().copied()
    }

    pub fn num_clients(&self) -> usize {
        self.clients.len()
    }

    pub fn central_bank(&self) -> Option<CentralBankId> {
        self.central_bank
    }

    pub fn set_central_bank(&mut self, central_bank: CentralBankId) {
        self.central_bank = Some(central_bank);
    }

    pub fn params(&self) -> &BankParams {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut BankParams {
        &mut self.params
    }

    pub fn installments(&self) -> &VecDeque<f64> {
        &self.installments
    }

    /// Shortfalls of the cycle in progress
    pub fn cycle_shortfall(&self) -> &ShortfallLedger {
        &self.cycle_shortfall
    }

    /// Shortfalls accumulated over the whole run
    pub fn total_shortfall(&self) -> &ShortfallLedger {
        &self.total_shortfall
    }

    /// Deposits plus savings owed to clients
    pub fn inside_money(&self) -> f64 {
        self.liability(EntryKind::Deposits) + self.liability(EntryKind::Savings)
    }

    pub fn total_assets(&self) -> f64 {
        self.balance_sheet().total_assets()
    }

    /// (MBS + Securities) / total assets
    pub fn risk_asset_ratio(&self) -> f64 {
        ratio(
            self.asset(EntryKind::Mbs) + self.asset(EntryKind::Securities),
            self.total_assets(),
        )
    }

    // ========================================================================
    // Cycle bracket
    // ========================================================================

    pub fn inflate_parameters(&mut self, inflation: f64) {
        self.params.spending.inflate(inflation);
    }

    /// Reset per-cycle accounting
    pub fn start_transactions(&mut self) {
        self.cycle_shortfall = ShortfallLedger::default();
    }

    /// Commit every client, then the bank itself
    ///
    /// Returns `true` only if all of them balanced.
    pub fn end_transactions(&mut self, clients: &mut [PrivateActor]) -> bool {
        let mut valid = true;
        for id in self.clients.iter() {
            if let Some(client) = clients.get_mut(id.0) {
                valid &= client.save_state();
            }
        }
        valid &= self.save_state();
        valid
    }

    // ========================================================================
    // Bank-side bookings driven by clients
    // ========================================================================

    /// Client took a loan: Loans +x / Deposits +x
    pub fn book_loan(&mut self, amount: f64) {
        self.book_asset(EntryKind::Loans, amount);
        self.book_liability(EntryKind::Deposits, amount);
    }

    /// Client moved deposits to savings
    pub fn book_savings_transfer(&mut self, amount: f64) {
        self.book_liability(EntryKind::Deposits, -amount);
        self.book_liability(EntryKind::Savings, amount);
    }

    /// Client paid out of its accounts
    pub fn book_withdrawal(&mut self, from_deposits: f64, from_savings: f64) {
        self.book_liability(EntryKind::Deposits, -from_deposits);
        self.book_liability(EntryKind::Savings, -from_savings);
    }

    /// Interest received, paired with a withdrawal
    pub fn book_interest_income(&mut self, amount: f64) {
        self.book_liability(EntryKind::Equity, amount);
    }

    /// Principal received, paired with a withdrawal
    pub fn book_installment_income(&mut self, amount: f64) {
        self.reduce_credit_assets(amount);
    }

    /// Defaulted principal: Loans/MBS -x / UnresolvedDebt +x
    pub fn book_default(&mut self, amount: f64) {
        self.reduce_credit_assets(amount);
        self.book_asset(EntryKind::UnresolvedDebt, amount);
    }

    /// Bought `amount` of `kind` from a client, paying in new deposits
    pub fn buy_from_client(&mut self, kind: EntryKind, amount: f64) {
        self.book_asset(kind, amount);
        self.book_liability(EntryKind::Deposits, amount);
    }

    /// Sold `amount` of `kind` to a client, realizing the proportional
    /// revaluation gain; returns the realized gain
    pub fn sell_to_client(&mut self, kind: EntryKind, amount: f64) -> f64 {
        let realized = self.realize_revaluation(kind, amount);
        self.book_asset(kind, -amount);
        self.book_liability(EntryKind::Deposits, -amount);
        realized
    }

    /// Reduce Loans and MBS proportionally to their holdings
    ///
    /// Securitized loans still amortize, so repayments and write-downs hit
    /// both lines. Neither line goes below zero: any part of `amount` beyond
    /// the credit assets still held is booked to Equity. Returns the amount
    /// taken off Loans and MBS.
    pub fn reduce_credit_assets(&mut self, amount: f64) -> f64 {
        if amount <= 0.0 {
            return 0.0;
        }
        let loans = self.asset(EntryKind::Loans).max(0.0);
        let mbs = self.asset(EntryKind::Mbs).max(0.0);
        let reduced = amount.min(loans + mbs).max(0.0);

        if reduced > 0.0 {
            let shares = pro_rata(reduced, &[loans, mbs]);
            self.book_asset(EntryKind::Loans, -shares[0]);
            self.book_asset(EntryKind::Mbs, -shares[1]);
        }

        let unbacked = amount - reduced;
        if unbacked > 0.0 {
            tracing::debug!(bank = %self.name, unbacked, "credit assets exhausted");
            self.book_liability(EntryKind::Equity, unbacked);
        }
        reduced
    }

    // ========================================================================
    // Bank-side bookings driven by the central bank
    // ========================================================================

    /// Interest on reserves: Reserves +x / Equity +x
    pub fn book_reserve_interest(&mut self, amount: f64) {
        self.book_asset(EntryKind::Reserves, amount);
        self.book_liability(EntryKind::Equity, amount);
    }

    /// Sell up to `max_amount` securities to the central bank for reserves
    ///
    /// Returns the amount sold.
    pub fn sell_securities_to_central_bank(&mut self, max_amount: f64) -> f64 {
        let sold = max_amount.min(self.asset(EntryKind::Securities).max(0.0));
        if sold <= 0.0 {
            return 0.0;
        }
        self.realize_revaluation(EntryKind::Securities, sold);
        self.book_asset(EntryKind::Securities, -sold);
        self.book_asset(EntryKind::Reserves, sold);
        sold
    }

    /// Newly created central bank money passed through to clients
    ///
    /// Reserves +x / Deposits +x on the bank, Deposits +x / Equity +x spread
    /// over the clients.
    pub fn receive_new_money(&mut self, clients: &mut [PrivateActor], amount: f64) {
        self.book_asset(EntryKind::Reserves, amount);
        self.credit_clients(clients, amount);
    }

    // ========================================================================
    // Per-cycle processing
    // ========================================================================

    /// Revalue bank and client securities and bank MBS
    pub fn grow_assets(&mut self, clients: &mut [PrivateActor], security_growth: f64, mbs_growth: f64) {
        for id in self.clients.iter() {
            if let Some(client) = clients.get_mut(id.0) {
                client.revalue(EntryKind::Securities, security_growth);
                client.revalue(EntryKind::Mbs, mbs_growth);
            }
        }

        let securities_gain = self.asset(EntryKind::Securities) * security_growth;
        self.book_asset(EntryKind::Securities, securities_gain);
        self.book_liability(EntryKind::SecuritiesEquity, securities_gain);

        let mbs_gain = self.asset(EntryKind::Mbs) * mbs_growth;
        self.book_asset(EntryKind::Mbs, mbs_gain);
        self.book_liability(EntryKind::MbsEquity, mbs_gain);
    }

    /// Each client moves `savings_rate` of its deposits to savings
    pub fn collect_savings(&mut self, clients: &mut [PrivateActor]) -> f64 {
        let mut total = 0.0;
        for id in self.client_ids() {
            if let Some(client) = clients.get_mut(id.0) {
                let amount = client.params().savings_rate * client.asset(EntryKind::Deposits).max(0.0);
                if amount > 0.0 {
                    client.save(self, amount);
                    total += amount;
                }
            }
        }
        total
    }

    /// Pay savings interest to every client
    ///
    /// Client Savings +i / Equity +i, bank Savings +i / Equity -i.
    /// Returns the total interest paid.
    pub fn process_savings(&mut self, clients: &mut [PrivateActor]) -> f64 {
        let mut total = 0.0;
        for id in self.client_ids() {
            if let Some(client) = clients.get_mut(id.0) {
                let interest = self.params.savings_ir * client.asset(EntryKind::Savings);
                if interest == 0.0 {
                    continue;
                }
                client.book_asset(EntryKind::Savings, interest);
                client.book_liability(EntryKind::Equity, interest);
                self.book_liability(EntryKind::Savings, interest);
                self.book_liability(EntryKind::Equity, -interest);
                total += interest;
            }
        }
        total
    }

    /// Collect interest and installments from every client
    ///
    /// First sells the configured share of existing unresolved debt to debt
    /// collectors (a realized loss). Then, per client, draws its defaulting
    /// rate and collects debt service. An owed installment the client cannot
    /// pay is written off on both books.
    pub fn process_income(&mut self, clients: &mut [PrivateActor], rng: &mut RngManager) -> IncomeOutcome {
        let mut outcome = IncomeOutcome::default();
        outcome.shortfall.debt_collector_losses = self.sell_defaults_to_collectors();

        let ir = self.params.loan_ir;
        for id in self.client_ids() {
            let Some(client) = clients.get_mut(id.0) else {
                continue;
            };

            let rate = client.params().defaulting.draw(rng);
            let service = client.pay_debt(self, ir, rate);

            outcome.interest_collected += service.interest_paid;
            outcome.installments_collected += service.installment_paid;
            outcome.defaulted += service.defaulted;
            outcome.shortfall.income_shortage += service.interest_shortage();

            let shortage = service.installment_shortage();
            if shortage > 0.0 {
                self.reduce_credit_assets(shortage);
                self.book_liability(EntryKind::Equity, -shortage);
                client.forgive_debt(shortage);
                outcome.shortfall.client_installment_shortage += shortage;
            }
        }

        self.cycle_shortfall.add(&outcome.shortfall);
        self.total_shortfall.add(&outcome.shortfall);

        if outcome.defaulted > 0.0 || outcome.shortfall.client_installment_shortage > 0.0 {
            tracing::debug!(
                bank = %self.name,
                defaulted = outcome.defaulted,
                installment_shortage = outcome.shortfall.client_installment_shortage,
                income_shortage = outcome.shortfall.income_shortage,
                "client shortfalls absorbed"
            );
        }

        outcome
    }

    /// Discretionary spending into the real economy
    ///
    /// Profit is the equity change since the last committed cycle. In
    /// capital mode the bank first sells securities to clients when its
    /// equity alone cannot cover the candidate. The clamped expense is booked
    /// as Equity -x / Deposits +x and credited to clients.
    pub fn spend(&mut self, clients: &mut [PrivateActor]) -> SpendingOutcome {
        let policy = self.params.spending.policy();
        let context = self.spending_context();
        let candidate = policy.candidate_expense(&context);

        let mut securities_sold = 0.0;
        if self.params.spending.uses_capital() && candidate > context.equity.max(0.0) {
            let missing = candidate - context.equity.max(0.0);
            let held = self.asset(EntryKind::Securities).max(0.0);
            let unrealized = self.liability(EntryKind::SecuritiesEquity);
            if held > 0.0 && unrealized > 0.0 {
                let to_sell = (missing / unrealized * held).min(held);
                securities_sold = -self.trade_securities_with_clients(clients, -to_sell, EntryKind::Securities);
            }
        }

        let profit = self.spending_context().profit;
        let expense = self.params.spending_limits().clamp(candidate, profit);

        if expense > 0.0 {
            self.book_liability(EntryKind::Equity, -expense);
            self.credit_clients(clients, expense);
        }

        tracing::debug!(
            bank = %self.name,
            policy = policy.name(),
            profit,
            candidate,
            expense,
            "bank spending"
        );

        SpendingOutcome {
            profit,
            candidate,
            expense,
            securities_sold,
        }
    }

    /// Lend `amount` to clients pro-rata to their deposits plus savings
    pub fn lend_to_clients(&mut self, clients: &mut [PrivateActor], amount: f64) -> f64 {
        if amount <= 0.0 || self.clients.is_empty() {
            return 0.0;
        }

        let ids = self.client_ids();
        let weights = Self::client_weights(clients, &ids);

        let mut lent = 0.0;
        for (id, share) in ids.iter().zip(pro_rata(amount, &weights)) {
            if let Some(client) = clients.get_mut(id.0) {
                client.borrow(self, share);
                lent += share;
            }
        }
        lent
    }

    /// Borrow reserves from the central bank
    ///
    /// Reserves +x / Debt +x here, Loans +x / Reserves +x at the central
    /// bank. Repayable in equal tranches over the central bank's loan
    /// duration.
    pub fn borrow(&mut self, central_bank: &mut CentralBank, amount: f64) {
        if amount <= 0.0 {
            return;
        }
        self.book_asset(EntryKind::Reserves, amount);
        self.book_liability(EntryKind::Debt, amount);
        central_bank.book_loan(amount);

        let duration = central_bank.params().loan_duration;
        schedule_tranches(&mut self.installments, amount, duration);
    }

    /// Service central bank debt for this cycle
    ///
    /// The due tranche is repaid from reserves, borrowing the gap first when
    /// reserves are short. Interest at the central bank's loan rate ends up
    /// redistributed to the real economy, so it is booked net as bank
    /// Equity -r / Deposits +r with the deposits credited to clients.
    pub fn pay_debt(&mut self, central_bank: &mut CentralBank, clients: &mut [PrivateActor]) -> BankDebtService {
        let installment = self.installments.pop_front().unwrap_or(0.0);
        let interest = central_bank.params().loan_ir * self.liability(EntryKind::Debt).max(0.0);

        let reserves = self.asset(EntryKind::Reserves);
        let borrowed = if reserves < installment {
            let gap = installment - reserves.max(0.0);
            self.borrow(central_bank, gap);
            gap
        } else {
            0.0
        };

        if installment > 0.0 {
            self.book_asset(EntryKind::Reserves, -installment);
            self.book_liability(EntryKind::Debt, -installment);
            central_bank.book_repayment(installment);
        }

        if interest != 0.0 {
            self.book_liability(EntryKind::Equity, -interest);
            self.credit_clients(clients, interest);
        }

        BankDebtService {
            installment_paid: installment,
            interest_paid: interest,
            borrowed,
        }
    }

    /// Rebalance reserves and risk assets; runs after every other flow
    ///
    /// 1. Borrow up to the central bank's minimum reserve ratio, counting
    ///    MBS and securities at the central bank's eligibility ratios.
    /// 2. Securitize loans into MBS up to `max_mbs_ratio` of total assets.
    /// 3. Trade securities with clients to bring the risk-asset ratio inside
    ///    `[min_risk_asset_ratio, max_risk_asset_ratio]`.
    /// 4. Buy securities from clients while reserves exceed
    ///    `max_reserve_ratio` of deposits plus savings.
    pub fn update_reserves(&mut self, central_bank: &mut CentralBank, clients: &mut [PrivateActor]) -> ReserveAdjustment {
        let mut adjustment = ReserveAdjustment::default();
        let cb = central_bank.params().clone();

        // Step 1: reserve requirement
        let required = cb.min_reserve_ratio * self.inside_money();
        let eligible = self.asset(EntryKind::Reserves)
            + cb.mbs_reserve_ratio * self.asset(EntryKind::Mbs).max(0.0)
            + cb.securities_reserve_ratio * self.asset(EntryKind::Securities).max(0.0);
        if eligible < required {
            adjustment.borrowed = required - eligible;
            self.borrow(central_bank, adjustment.borrowed);
        }

        // Step 2: securitization
        let mbs_cap = self.params.max_mbs_ratio * self.total_assets();
        let mbs = self.asset(EntryKind::Mbs);
        if mbs < mbs_cap {
            let shift = (mbs_cap - mbs).min(self.asset(EntryKind::Loans).max(0.0));
            if shift > 0.0 {
                self.book_asset(EntryKind::Loans, -shift);
                self.book_asset(EntryKind::Mbs, shift);
                adjustment.securitized = shift;
            }
        }

        // Step 3: risk-asset band
        let total = self.total_assets();
        let risk = self.asset(EntryKind::Mbs) + self.asset(EntryKind::Securities);
        let min_risk = self.params.min_risk_asset_ratio;
        let max_risk = self.params.max_risk_asset_ratio;
        if total > 0.0 && risk < min_risk * total && min_risk < 1.0 {
            let wanted = (min_risk * total - risk) / (1.0 - min_risk);
            let purchase = wanted.min(self.securities_headroom());
            if purchase > 0.0 {
                adjustment.risk_trade =
                    self.trade_securities_with_clients(clients, purchase, EntryKind::Securities);
            }
        } else if total > 0.0 && risk > max_risk * total && max_risk < 1.0 {
            // MBS stay on the books: they amortize with the client loans behind them
            let excess = (risk - max_risk * total) / (1.0 - max_risk);
            adjustment.risk_trade =
                self.trade_securities_with_clients(clients, -excess, EntryKind::Securities);
        }

        // Step 4: excess reserves
        let max_reserve = self.params.max_reserve_ratio;
        let reserves = self.asset(EntryKind::Reserves);
        if max_reserve > 0.0 && reserves > max_reserve * self.inside_money() {
            let wanted = reserves / max_reserve - self.inside_money();
            let purchase = wanted.min(self.securities_headroom());
            if purchase > 0.0 {
                adjustment.excess_reserve_trade =
                    self.trade_securities_with_clients(clients, purchase, EntryKind::Securities);
            }
        }

        adjustment
    }

    /// Trade `kind` with all clients, pro-rata to their deposits plus savings
    ///
    /// Positive `amount` buys from clients, negative sells to them. Each
    /// client trade is capped by what the client can deliver or pay, so the
    /// returned signed total may fall short of `amount`.
    pub fn trade_securities_with_clients(&mut self, clients: &mut [PrivateActor], amount: f64, kind: EntryKind) -> f64 {
        if amount == 0.0 || self.clients.is_empty() {
            return 0.0;
        }

        let ids = self.client_ids();
        let weights = Self::client_weights(clients, &ids);

        let mut traded = 0.0;
        for (id, share) in ids.iter().zip(pro_rata(amount.abs(), &weights)) {
            if let Some(client) = clients.get_mut(id.0) {
                // Client sells when the bank buys
                let client_amount = if amount > 0.0 { share } else { -share };
                traded += client.trade_securities_with_bank(self, client_amount, kind);
            }
        }
        traded
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn client_ids(&self) -> Vec<ClientId> {
        self.clients.iter().copied().collect()
    }

    /// Deposits plus savings of each client, in `ids` order
    fn client_weights(clients: &[PrivateActor], ids: &[ClientId]) -> Vec<f64> {
        ids.iter()
            .map(|id| clients.get(id.0).map(|c| c.inside_money()).unwrap_or(0.0))
            .collect()
    }

    fn spending_context(&self) -> SpendingContext {
        let equity = self.liability(EntryKind::Equity);
        SpendingContext {
            profit: equity - self.committed_liability(EntryKind::Equity),
            equity,
            securities_equity: self.liability(EntryKind::SecuritiesEquity),
        }
    }

    /// Room left under `max_securities_ratio` of total assets
    fn securities_headroom(&self) -> f64 {
        let cap = self.params.max_securities_ratio;
        if cap >= 1.0 {
            return f64::INFINITY;
        }
        // Buying x raises both securities and total assets by x
        let room = (cap * self.total_assets() - self.asset(EntryKind::Securities)) / (1.0 - cap);
        room.max(0.0)
    }

    /// Sell the configured share of unresolved debt to debt collectors
    fn sell_defaults_to_collectors(&mut self) -> f64 {
        let share = self.params.defaults_bought_by_debt_collectors.clamp(0.0, 1.0);
        let sold = share * self.asset(EntryKind::UnresolvedDebt).max(0.0);
        if sold > 0.0 {
            self.book_asset(EntryKind::UnresolvedDebt, -sold);
            self.book_liability(EntryKind::Equity, -sold);
        }
        sold
    }

    /// Move the proportional revaluation of `amount` of `kind` into Equity
    fn realize_revaluation(&mut self, kind: EntryKind, amount: f64) -> f64 {
        let Some(revaluation) = kind.revaluation_kind() else {
            return 0.0;
        };
        let realized = amount * ratio(self.liability(revaluation), self.asset(kind));
        if realized != 0.0 {
            self.book_liability(revaluation, -realized);
            self.book_liability(EntryKind::Equity, realized);
        }
        realized
    }

    /// Book Deposits +x and credit clients pro-rata as income
    fn credit_clients(&mut self, clients: &mut [PrivateActor], amount: f64) {
        self.book_liability(EntryKind::Deposits, amount);

        let ids = self.client_ids();
        let weights = Self::client_weights(clients, &ids);

        for (id, share) in ids.iter().zip(pro_rata(amount, &weights)) {
            if let Some(client) = clients.get_mut(id.0) {
                client.receive_income(share);
            }
        }
    }
}

impl EconomicActor for Bank {
    fn name(&self) -> &str {
        &self.name
    }

    fn asset_kinds(&self) -> &'static [EntryKind] {
        BANK_ASSETS
    }

    fn liability_kinds(&self) -> &'static [EntryKind] {
        BANK_LIABILITIES
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
    use crate::models::actor::BankId;
    use crate::models::private_actor::ClientParams;

    fn bank_with_clients(params: BankParams, n: usize) -> (Bank, Vec<PrivateActor>) {
        let mut bank = Bank::new("bank", params);
        let clients = (0..n)
            .map(|i| {
                bank.register(ClientId(i));
                PrivateActor::new(format!("client_{i}"), BankId(0), ClientParams::default())
            })
            .collect();
        (bank, clients)
    }

    #[test]
    fn test_register_is_idempotent() {
        let mut bank = Bank::new("bank", BankParams::default());
        assert!(bank.register(ClientId(3)));
        assert!(!bank.register(ClientId(3)));
        assert_eq!(bank.num_clients(), 1);
    }

    #[test]
    fn test_reduce_credit_assets_splits_over_mbs() {
        let mut bank = Bank::new("bank", BankParams::default());
        bank.book_asset(EntryKind::Loans, 300.0);
        bank.book_asset(EntryKind::Mbs, 100.0);

        bank.reduce_credit_assets(40.0);

        assert_eq!(bank.asset(EntryKind::Loans), 270.0);
        assert_eq!(bank.asset(EntryKind::Mbs), 90.0);
    }

    #[test]
    fn test_reduce_credit_assets_stops_at_zero() {
        let mut bank = Bank::new("bank", BankParams::default());
        bank.book_asset(EntryKind::Loans, 30.0);
        bank.book_liability(EntryKind::Deposits, 30.0);

        // Repayment of 50 against 30 of loans still held
        bank.book_liability(EntryKind::Deposits, -50.0);
        let reduced = bank.reduce_credit_assets(50.0);

        assert_eq!(reduced, 30.0);
        assert_eq!(bank.asset(EntryKind::Loans), 0.0);
        assert_eq!(bank.liability(EntryKind::Equity), 20.0);
        assert!(bank.validate_balance());
    }

    #[test]
    fn test_credit_clients_pro_rata() {
        let (mut bank, mut clients) = bank_with_clients(BankParams::default(), 2);
        clients[0].borrow(&mut bank, 100.0);
        clients[1].borrow(&mut bank, 300.0);

        bank.book_liability(EntryKind::Equity, -40.0);
        bank.credit_clients(&mut clients, 40.0);

        assert_eq!(clients[0].asset(EntryKind::Deposits), 110.0);
        assert_eq!(clients[1].asset(EntryKind::Deposits), 330.0);
        assert!(bank.validate_balance());
    }

    #[test]
    fn test_debt_collectors_realize_loss() {
        let (mut bank, mut clients) = bank_with_clients(
            BankParams {
                defaults_bought_by_debt_collectors: 0.5,
                ..BankParams::default()
            },
            1,
        );
        bank.book_asset(EntryKind::UnresolvedDebt, 80.0);
        bank.book_liability(EntryKind::Equity, 80.0);

        let outcome = bank.process_income(&mut clients, &mut RngManager::new(1));

        assert_eq!(outcome.shortfall.debt_collector_losses, 40.0);
        assert_eq!(bank.asset(EntryKind::UnresolvedDebt), 40.0);
        assert_eq!(bank.liability(EntryKind::Equity), 40.0);
    }

    #[test]
    fn test_securities_headroom_respects_cap() {
        let mut bank = Bank::new(
            "bank",
            BankParams {
                max_securities_ratio: 0.5,
                ..BankParams::default()
            },
        );
        bank.book_asset(EntryKind::Loans, 100.0);
        bank.book_liability(EntryKind::Deposits, 100.0);

        assert!((bank.securities_headroom() - 100.0).abs() < 1e-9);
    }
}
