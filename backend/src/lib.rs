//! Euro Economy Core - Rust Engine
//!
//! Cycle-based simulation of a monetary economy built from balance-sheet
//! holding actors: central banks, commercial banks and private clients.
//!
//! # Architecture
//!
//! - **core**: Pro-rata allocation helpers
//! - **models**: Balance sheets, timelines and the actors
//! - **policy**: Bank spending policies
//! - **orchestrator**: Economy construction, cycle pipeline, simulator
//! - **rng**: Deterministic random number generation
//! - **logging**: Tracing subscriber setup
//!
//! # Critical Invariants
//!
//! 1. Every committed balance sheet balances (within tolerance)
//! 2. All randomness is deterministic (seeded RNG)
//! 3. Cycle stages run in a fixed order

// Module declarations
pub mod core;
pub mod logging;
pub mod models;
pub mod orchestrator;
pub mod policy;
pub mod rng;

// Re-exports for convenience
pub use models::{
    balance_sheet::{BalanceSheet, DEFAULT_TOLERANCE},
    entry::EntryKind,
    event::{Event, EventLog},
    timeline::{BalanceSheetTimeline, LedgerError},
    Bank, BankId, CentralBank, CentralBankId, ClientId, EconomicActor, PrivateActor,
};
pub use orchestrator::{
    AggregateEconomy, CycleResult, CycleStage, EconomyConfig, EconomyError, EuroEconomy,
    SimulationReport, Simulator,
};
pub use rng::RngManager;

// FFI module (when feature enabled)
#[cfg(feature = "pyo3")]
pub mod ffi;

// PyO3 exports (when feature enabled)
#[cfg(feature = "pyo3")]
use pyo3::prelude::*;

#[cfg(feature = "pyo3")]
#[pymodule]
fn euro_economy_core_rs(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<ffi::economy::PyEconomy>()?;
    Ok(())
}
