//! Event logging for economy runs
//!
//! Every cycle stage that moves money records what it did as an [`Event`].
//! The log is append-only and ordered by occurrence; events carry the cycle
//! they happened in and the name of the actor that acted.
//!
//! # Example
//!
//! ```rust
//! use euro_economy_core::models::{Event, EventLog};
//!
//! let mut log = EventLog::new();
//! log.log(Event::HelicopterMoney {
//!     cycle: 3,
//!     central_bank: "ecb".to_string(),
//!     amount: 100.0,
//! });
//!
//! assert_eq!(log.events_in_cycle(3).len(), 1);
//! ```

use serde::{Deserialize, Serialize};

/// A state change of the economy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// Interest paid by a central bank on bank reserves
    ReserveInterest {
        cycle: usize,
        central_bank: String,
        amount: f64,
    },

    /// Quantitative easing round
    QuantitativeEasing {
        cycle: usize,
        central_bank: String,
        amount: f64,
        new_money: f64,
    },

    HelicopterMoney {
        cycle: usize,
        central_bank: String,
        amount: f64,
    },

    /// Interest credited on client savings across one central bank's banks
    SavingsInterest {
        cycle: usize,
        central_bank: String,
        amount: f64,
    },

    /// Client debt service collected by a bank
    DebtCollected {
        cycle: usize,
        bank: String,
        interest: f64,
        installments: f64,
        defaulted: f64,
        written_off: f64,
    },

    /// A bank's own debt service to its central bank
    CentralBankDebtServiced {
        cycle: usize,
        bank: String,
        installment: f64,
        interest: f64,
        borrowed: f64,
    },

    BankSpending {
        cycle: usize,
        bank: String,
        profit: f64,
        expense: f64,
    },

    /// New loans granted to clients in one central bank's branch
    Lending {
        cycle: usize,
        central_bank: String,
        amount: f64,
    },

    ReservesRebalanced {
        cycle: usize,
        bank: String,
        borrowed: f64,
        securitized: f64,
        securities_traded: f64,
    },

    /// End of cycle commit
    CycleCommitted {
        cycle: usize,
        balanced: bool,
        inside_money: f64,
    },

    /// Inside money fell to zero or below
    Collapse { cycle: usize, inside_money: f64 },
}

impl Event {
    pub fn cycle(&self) -> usize {
        match self {
            Event::ReserveInterest { cycle, .. }
            | Event::QuantitativeEasing { cycle, .. }
            | Event::HelicopterMoney { cycle, .. }
            | Event::SavingsInterest { cycle, .. }
            | Event::DebtCollected { cycle, .. }
            | Event::CentralBankDebtServiced { cycle, .. }
            | Event::BankSpending { cycle, .. }
            | Event::Lending { cycle, .. }
            | Event::ReservesRebalanced { cycle, .. }
            | Event::CycleCommitted { cycle, .. }
            | Event::Collapse { cycle, .. } => *cycle,
        }
    }

    pub fn event_type(&self) -> &'static str {
        match self {
            Event::ReserveInterest { .. } => "ReserveInterest",
            Event::QuantitativeEasing { .. } => "QuantitativeEasing",
            Event::HelicopterMoney { .. } => "HelicopterMoney",
            Event::SavingsInterest { .. } => "SavingsInterest",
            Event::DebtCollected { .. } => "DebtCollected",
            Event::CentralBankDebtServiced { .. } => "CentralBankDebtServiced",
            Event::BankSpending { .. } => "BankSpending",
            Event::Lending { .. } => "Lending",
            Event::ReservesRebalanced { .. } => "ReservesRebalanced",
            Event::CycleCommitted { .. } => "CycleCommitted",
            Event::Collapse { .. } => "Collapse",
        }
    }

    /// Name of the acting actor, if the event has one
    pub fn actor(&self) -> Option<&str> {
        match self {
            Event::ReserveInterest { central_bank, .. }
            | Event::QuantitativeEasing { central_bank, .. }
            | Event::HelicopterMoney { central_bank, .. }
            | Event::SavingsInterest { central_bank, .. }
            | Event::Lending { central_bank, .. } => Some(central_bank),
            Event::DebtCollected { bank, .. }
            | Event::CentralBankDebtServiced { bank, .. }
            | Event::BankSpending { bank, .. }
            | Event::ReservesRebalanced { bank, .. } => Some(bank),
            Event::CycleCommitted { .. } | Event::Collapse { .. } => None,
        }
    }
}

/// Append-only event log
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn events_in_cycle(&self, cycle: usize) -> Vec<&Event> {
        self.events.iter().filter(|e| e.cycle() == cycle).collect()
    }

    pub fn events_of_type(&self, event_type: &str) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    pub fn events_for_actor(&self, name: &str) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.actor() == Some(name))
            .collect()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
