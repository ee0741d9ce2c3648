//! Conversions across the FFI boundary

use pyo3::exceptions::{PyKeyError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyDict;

use crate::orchestrator::{CycleResult, EconomyError, SimulationReport};

/// Map an economy error onto the matching Python exception
pub fn economy_error_to_py(err: EconomyError) -> PyErr {
    match err {
        EconomyError::UnknownCentralBank(_)
        | EconomyError::UnknownBank(_)
        | EconomyError::UnknownClient(_) => PyKeyError::new_err(err.to_string()),
        EconomyError::Serialization(_) | EconomyError::Ledger(_) => {
            PyValueError::new_err(err.to_string())
        }
    }
}

pub fn cycle_result_to_py(py: Python<'_>, result: &CycleResult) -> PyResult<Py<PyDict>> {
    let dict = PyDict::new_bound(py);
    dict.set_item("cycle", result.cycle)?;
    dict.set_item("balanced", result.balanced)?;
    dict.set_item("collapsed", result.collapsed)?;
    dict.set_item("inside_money", result.inside_money)?;
    dict.set_item("im_growth", result.im_growth)?;
    dict.set_item("reserve_interest", result.reserve_interest)?;
    dict.set_item("qe", result.qe)?;
    dict.set_item("helicopter_money", result.helicopter_money)?;
    dict.set_item("savings_interest", result.savings_interest)?;
    dict.set_item("interest_collected", result.interest_collected)?;
    dict.set_item("installments_collected", result.installments_collected)?;
    dict.set_item("defaulted", result.defaulted)?;
    dict.set_item("income_shortage", result.shortfall.income_shortage)?;
    dict.set_item(
        "client_installment_shortage",
        result.shortfall.client_installment_shortage,
    )?;
    dict.set_item("debt_collector_losses", result.shortfall.debt_collector_losses)?;
    dict.set_item("bank_interest_paid", result.bank_interest_paid)?;
    dict.set_item("spending", result.spending)?;
    dict.set_item("lending", result.lending)?;
    Ok(dict.unbind())
}

pub fn report_to_py(py: Python<'_>, report: &SimulationReport) -> PyResult<Py<PyDict>> {
    let dict = PyDict::new_bound(py);
    dict.set_item("run_id", &report.run_id)?;
    dict.set_item("config_hash", report.config_hash.as_deref())?;
    dict.set_item("completed", report.is_completed())?;
    dict.set_item("cycles_completed", report.cycles_completed)?;
    dict.set_item("last_valid_cycle", report.last_valid_cycle)?;
    let outcome = serde_json::to_string(&report.outcome)
        .map_err(|e| PyValueError::new_err(format!("Report serialization failed: {}", e)))?;
    dict.set_item("outcome", outcome)?;
    Ok(dict.unbind())
}
