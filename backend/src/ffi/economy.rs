//! PyO3 wrapper for the economy
//!
//! # Example (from Python)
//!
//! ```python
//! from euro_economy_core_rs import Economy
//!
//! economy = Economy('{"central_banks": [{"banks": [{"clients": [{"initial_loan": 1000.0}]}]}]}')
//! result = economy.run_cycle()
//! print(result["inside_money"], economy.im())
//! ```

use pyo3::prelude::*;
use pyo3::types::PyDict;

use super::types::{cycle_result_to_py, economy_error_to_py, report_to_py};
use crate::orchestrator::{
    AggregateEconomy, CycleRecord, EconomyConfig, EuroEconomy, Simulator,
};

#[pyclass(name = "Economy", unsendable)]
pub struct PyEconomy {
    inner: EuroEconomy,
    history: Vec<CycleRecord>,
}

#[pymethods]
impl PyEconomy {
    /// Build an economy from a JSON config string
    #[new]
    fn new(config_json: &str) -> PyResult<Self> {
        crate::logging::init_tracing();
        let config = EconomyConfig::from_json(config_json).map_err(economy_error_to_py)?;
        let inner = EuroEconomy::from_config(&config).map_err(economy_error_to_py)?;
        Ok(Self {
            inner,
            history: Vec::new(),
        })
    }

    /// Run one cycle and return its result as a dict
    fn run_cycle(&mut self, py: Python<'_>) -> PyResult<Py<PyDict>> {
        let result = self.inner.run_cycle();
        self.history.push(CycleRecord::capture(&self.inner, &result));
        cycle_result_to_py(py, &result)
    }

    /// Run up to `cycles` cycles, stopping on collapse or imbalance
    fn run(&mut self, py: Python<'_>, cycles: usize) -> PyResult<Py<PyDict>> {
        let mut simulator = Simulator::new();
        let report = simulator.run(&mut self.inner, cycles);
        self.history.extend(report.records.iter().cloned());
        report_to_py(py, &report)
    }

    fn im(&self) -> f64 {
        self.inner.im()
    }

    fn cycle(&self) -> usize {
        self.inner.cycle()
    }

    fn total_private_debt(&self) -> f64 {
        self.inner.total_private_debt()
    }

    /// Every recorded cycle as a JSON array
    fn history_json(&self) -> PyResult<String> {
        serde_json::to_string(&self.history).map_err(|e| {
            PyErr::new::<pyo3::exceptions::PyValueError, _>(format!(
                "History serialization failed: {}",
                e
            ))
        })
    }
}
