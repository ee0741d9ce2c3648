//! Python bindings (feature `pyo3`)

pub mod economy;
pub mod types;
