//! Orchestrator - economy construction and the cycle loop
//!
//! See `engine.rs` for the cycle pipeline and `simulator.rs` for multi-cycle
//! runs.

pub mod aggregate;
pub mod config;
pub mod engine;
pub mod simulator;

// Re-export main types for convenience
pub use aggregate::AggregateEconomy;
pub use config::{
    compute_config_hash, BankConfig, CentralBankConfig, ClientConfig, EconomyConfig, EconomyParams,
};
pub use engine::{CycleResult, CycleStage, EconomyError, EuroEconomy};
pub use simulator::{
    CycleRecord, DataCollector, RunOutcome, SimulationReport, Simulator, TimeSeriesCollector,
};
