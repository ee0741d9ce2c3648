//! Domain models for the monetary economy

pub mod actor;
pub mod balance_sheet;
pub mod bank;
pub mod central_bank;
pub mod entry;
pub mod event;
pub mod private_actor;
pub mod timeline;

// Re-exports
pub use actor::{BankId, CentralBankId, ClientId, EconomicActor};
pub use balance_sheet::{BalanceSheet, DEFAULT_TOLERANCE};
pub use bank::{
    Bank, BankDebtService, BankParams, IncomeOutcome, ReserveAdjustment, ShortfallLedger,
    SpendingOutcome,
};
pub use central_bank::{CentralBank, CentralBankParams, InjectionMode, QeOutcome};
pub use entry::EntryKind;
pub use event::{Event, EventLog};
pub use private_actor::{ClientParams, DebtService, DefaultingMode, PrivateActor, Withdrawal};
pub use timeline::{BalanceSheetTimeline, HistoryEntry, LedgerError};
