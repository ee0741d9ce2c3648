//! Multi-cycle driver and time-series collection
//!
//! [`Simulator::run`] executes cycles until the requested count is reached,
//! a cycle fails to balance, or inside money collapses. Every executed cycle
//! is handed to the registered [`DataCollector`]s; the built-in
//! [`TimeSeriesCollector`] feeds the returned [`SimulationReport`].

use crate::orchestrator::aggregate::AggregateEconomy;
use crate::orchestrator::engine::{CycleResult, EuroEconomy};
use crate::orchestrator::EconomyError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One row of the time series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleRecord {
    pub cycle: usize,
    pub inside_money: f64,
    pub im_growth: f64,
    pub private_debt: f64,
    pub unresolved_debt: f64,
    pub debt_ratio: f64,
    pub reserves: f64,
    pub bank_equity: f64,
    pub qe: f64,
    pub helicopter_money: f64,
    pub spending: f64,
    pub lending: f64,
    pub defaulted: f64,
    pub balanced: bool,
}

impl CycleRecord {
    pub fn capture(economy: &EuroEconomy, result: &CycleResult) -> Self {
        Self {
            cycle: result.cycle,
            inside_money: economy.im(),
            im_growth: result.im_growth,
            private_debt: economy.total_private_debt(),
            unresolved_debt: economy.total_unresolved_debt(),
            debt_ratio: economy.debt_ratio(),
            reserves: economy.total_reserves(),
            bank_equity: economy.total_bank_equity(),
            qe: result.qe,
            helicopter_money: result.helicopter_money,
            spending: result.spending,
            lending: result.lending,
            defaulted: result.defaulted,
            balanced: result.balanced,
        }
    }
}

/// Observer of completed cycles
pub trait DataCollector {
    fn collect(&mut self, economy: &EuroEconomy, result: &CycleResult);
}

/// Records one [`CycleRecord`] per cycle
#[derive(Debug, Clone, Default)]
pub struct TimeSeriesCollector {
    records: Vec<CycleRecord>,
}

impl TimeSeriesCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[CycleRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<CycleRecord> {
        self.records
    }

    pub fn to_json(&self) -> Result<String, EconomyError> {
        serde_json::to_string(&self.records)
            .map_err(|e| EconomyError::Serialization(format!("Time series serialization failed: {}", e)))
    }
}

impl DataCollector for TimeSeriesCollector {
    fn collect(&mut self, economy: &EuroEconomy, result: &CycleResult) {
        self.records.push(CycleRecord::capture(economy, result));
    }
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RunOutcome {
    /// Every requested cycle ran
    Completed,
    /// Inside money fell to zero or below in `cycle`
    Collapsed { cycle: usize },
    /// A sheet failed to balance in `cycle`
    Unbalanced { cycle: usize },
}

/// Summary of a simulator run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    pub run_id: String,
    pub config_hash: Option<String>,
    pub outcome: RunOutcome,
    /// Cycles that finished balanced and without collapse
    pub cycles_completed: usize,
    /// Index of the last such cycle (the starting cycle if none did)
    pub last_valid_cycle: usize,
    /// Every executed cycle, including a failing last one
    pub records: Vec<CycleRecord>,
}

impl SimulationReport {
    pub fn is_completed(&self) -> bool {
        self.outcome == RunOutcome::Completed
    }
}

/// Drives an economy for a number of cycles
#[derive(Default)]
pub struct Simulator {
    collectors: Vec<Box<dyn DataCollector>>,
}

impl Simulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an extra observer of every executed cycle
    pub fn add_collector(&mut self, collector: Box<dyn DataCollector>) {
        self.collectors.push(collector);
    }

    /// Run up to `cycles` cycles
    ///
    /// Stops at the first unbalanced or collapsed cycle and reports the last
    /// cycle before it as the last valid one.
    pub fn run(&mut self, economy: &mut EuroEconomy, cycles: usize) -> SimulationReport {
        let run_id = Uuid::new_v4().to_string();
        let mut series = TimeSeriesCollector::new();
        let mut last_valid_cycle = economy.cycle();
        let mut cycles_completed = 0;
        let mut outcome = RunOutcome::Completed;

        tracing::info!(run_id = %run_id, cycles, "simulation started");

        for _ in 0..cycles {
            let result = economy.run_cycle();
            series.collect(economy, &result);
            for collector in self.collectors.iter_mut() {
                collector.collect(economy, &result);
            }

            if !result.balanced {
                outcome = RunOutcome::Unbalanced { cycle: result.cycle };
                break;
            }
            if result.collapsed {
                outcome = RunOutcome::Collapsed { cycle: result.cycle };
                break;
            }
            last_valid_cycle = result.cycle;
            cycles_completed += 1;
        }

        match outcome {
            RunOutcome::Completed => {
                tracing::info!(run_id = %run_id, cycles_completed, "simulation completed")
            }
            _ => tracing::warn!(
                run_id = %run_id,
                ?outcome,
                last_valid_cycle,
                "simulation stopped early"
            ),
        }

        SimulationReport {
            run_id,
            config_hash: economy.config_hash().map(str::to_string),
            outcome,
            cycles_completed,
            last_valid_cycle,
            records: series.into_records(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BankParams, CentralBankParams, ClientParams};
    use crate::orchestrator::EconomyParams;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Counter(Rc<RefCell<usize>>);

    impl DataCollector for Counter {
        fn collect(&mut self, _economy: &EuroEconomy, _result: &CycleResult) {
            *self.0.borrow_mut() += 1;
        }
    }

    fn stable_economy() -> EuroEconomy {
        let mut economy = EuroEconomy::new(EconomyParams::default(), 3);
        let cb = economy.add_central_bank("ecb", CentralBankParams::default());
        let bank = economy.add_bank(cb, "bank", BankParams::default()).unwrap();
        let client = economy
            .add_client(bank, "client", ClientParams::default())
            .unwrap();
        economy.lend(client, 100.0).unwrap();
        economy
    }

    #[test]
    fn test_run_completes_and_records_every_cycle() {
        let mut economy = stable_economy();
        let mut simulator = Simulator::new();
        let report = simulator.run(&mut economy, 3);

        assert!(report.is_completed());
        assert_eq!(report.cycles_completed, 3);
        assert_eq!(report.last_valid_cycle, 3);
        assert_eq!(report.records.len(), 3);
        assert_eq!(report.records[2].cycle, 3);
        assert!(Uuid::parse_str(&report.run_id).is_ok());
    }

    #[test]
    fn test_extra_collectors_see_every_cycle() {
        let count = Rc::new(RefCell::new(0));
        let mut simulator = Simulator::new();
        simulator.add_collector(Box::new(Counter(Rc::clone(&count))));

        simulator.run(&mut stable_economy(), 4);
        assert_eq!(*count.borrow(), 4);
    }

    #[test]
    fn test_empty_economy_collapses_immediately() {
        let mut economy = EuroEconomy::new(EconomyParams::default(), 1);
        let report = Simulator::new().run(&mut economy, 5);

        assert_eq!(report.outcome, RunOutcome::Collapsed { cycle: 1 });
        assert_eq!(report.cycles_completed, 0);
        assert_eq!(report.last_valid_cycle, 0);
    }

    #[test]
    fn test_time_series_json() {
        let mut collector = TimeSeriesCollector::new();
        let mut economy = stable_economy();
        let result = economy.run_cycle();
        collector.collect(&economy, &result);

        let json = collector.to_json().unwrap();
        // one 5.0 installment of the 20-cycle loan repaid
        assert!(json.contains("\"inside_money\":95.0"));
    }
}
