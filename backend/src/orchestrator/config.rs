//! Economy configuration
//!
//! Describes a whole actor graph plus its economy-wide rates. Every struct
//! deserializes with defaults for missing fields, so a JSON config only needs
//! to name what differs from the defaults.
//!
//! # Example
//!
//! ```rust
//! use euro_economy_core::orchestrator::EconomyConfig;
//!
//! let config = EconomyConfig::from_json(r#"{
//!     "rng_seed": 7,
//!     "params": { "growth_rate": 0.01 },
//!     "central_banks": [{
//!         "name": "ecb",
//!         "params": { "min_reserve_ratio": 0.04 },
//!         "banks": [{
//!             "name": "bank",
//!             "clients": [{ "name": "household", "initial_loan": 1000.0 }]
//!         }]
//!     }]
//! }"#).unwrap();
//!
//! assert_eq!(config.central_banks[0].banks[0].clients.len(), 1);
//! ```

use crate::models::bank::BankParams;
use crate::models::central_bank::CentralBankParams;
use crate::models::private_actor::ClientParams;
use crate::orchestrator::EconomyError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

// ============================================================================
// Configuration Types
// ============================================================================

/// Economy-wide rates, applied once per cycle
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyParams {
    /// Real growth target of inside money per cycle
    pub growth_rate: f64,

    /// Inflation per cycle; also scales fixed nominal amounts
    pub inflation_rate: f64,

    /// Revaluation of securities holdings per cycle
    pub security_growth_rate: f64,

    /// Revaluation of bank MBS holdings per cycle
    pub mbs_growth_rate: f64,

    /// Share of the gap to the inside money target that clients borrow
    pub lending_satisfaction_rate: f64,
}

/// Complete economy configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    pub params: EconomyParams,

    /// Seed for defaulting draws
    pub rng_seed: u64,

    pub central_banks: Vec<CentralBankConfig>,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            params: EconomyParams::default(),
            rng_seed: 12345,
            central_banks: Vec::new(),
        }
    }
}

impl EconomyConfig {
    pub fn from_json(json: &str) -> Result<Self, EconomyError> {
        serde_json::from_str(json)
            .map_err(|e| EconomyError::Serialization(format!("Config parsing failed: {}", e)))
    }

    pub fn to_json(&self) -> Result<String, EconomyError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| EconomyError::Serialization(format!("Config serialization failed: {}", e)))
    }
}

/// A central bank and the banks registered to it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CentralBankConfig {
    pub name: String,
    pub params: CentralBankParams,
    pub banks: Vec<BankConfig>,
}

impl Default for CentralBankConfig {
    fn default() -> Self {
        Self {
            name: "central_bank".to_string(),
            params: CentralBankParams::default(),
            banks: Vec::new(),
        }
    }
}

/// A commercial bank and its clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BankConfig {
    pub name: String,
    pub params: BankParams,
    pub clients: Vec<ClientConfig>,
}

impl Default for BankConfig {
    fn default() -> Self {
        Self {
            name: "bank".to_string(),
            params: BankParams::default(),
            clients: Vec::new(),
        }
    }
}

/// A private actor and its opening position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub name: String,
    pub params: ClientParams,

    /// Borrowed from the bank before the first cycle
    pub initial_loan: f64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            name: "client".to_string(),
            params: ClientParams::default(),
            initial_loan: 0.0,
        }
    }
}

// ============================================================================
// Config Hashing
// ============================================================================

/// SHA-256 of the canonical JSON form of a config
///
/// Object keys are sorted recursively, so two equal configs hash the same
/// whatever order their maps were built in.
pub fn compute_config_hash<T: Serialize>(config: &T) -> Result<String, EconomyError> {
    use serde_json::Value;
    use std::collections::BTreeMap;

    let value = serde_json::to_value(config)
        .map_err(|e| EconomyError::Serialization(format!("Config serialization failed: {}", e)))?;

    fn canonicalize(value: Value) -> Value {
        match value {
            Value::Object(map) => {
                let sorted: BTreeMap<String, Value> =
                    map.into_iter().map(|(k, v)| (k, canonicalize(v))).collect();
                Value::Object(sorted.into_iter().collect())
            }
            Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
            other => other,
        }
    }

    let json = serde_json::to_string(&canonicalize(value))
        .map_err(|e| EconomyError::Serialization(format!("Config serialization failed: {}", e)))?;

    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}
