//! Balance sheet timeline
//!
//! Wraps the current [`BalanceSheet`] of one actor and an append-only history
//! of committed cycles. Each commit stores a snapshot of the sheet together
//! with its delta against the previous commit.
//!
//! # Critical Invariants
//!
//! 1. **Only balanced sheets are committed**: `save_state` refuses (returns
//!    `false`) when the current sheet does not validate.
//! 2. **History is immutable**: entries are appended, never edited. Only
//!    [`BalanceSheetTimeline::clear`] drops them.

use crate::models::balance_sheet::BalanceSheet;
use crate::models::entry::EntryKind;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when reading ledger history
#[derive(Debug, Error, PartialEq)]
pub enum LedgerError {
    #[error("History index {index} out of range (history length {len})")]
    IndexOutOfRange { index: isize, len: usize },
}

/// One committed cycle: the sheet as it was, and what changed since the
/// previous commit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub snapshot: BalanceSheet,
    pub delta: BalanceSheet,
}

/// Current balance sheet plus its committed history
///
/// # Example
/// ```
/// use euro_economy_core::{BalanceSheetTimeline, EntryKind};
///
/// let mut timeline = BalanceSheetTimeline::new();
/// timeline.book_asset(EntryKind::Deposits, 100.0);
/// timeline.book_liability(EntryKind::Equity, 100.0);
/// assert!(timeline.save_state());
///
/// timeline.book_asset(EntryKind::Deposits, 50.0);
/// timeline.book_liability(EntryKind::Equity, 50.0);
/// assert!(timeline.save_state());
///
/// let delta = timeline.delta_history(-1).unwrap();
/// assert_eq!(delta.asset(EntryKind::Deposits), 50.0);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BalanceSheetTimeline {
    current: BalanceSheet,
    history: Vec<HistoryEntry>,
}

impl BalanceSheetTimeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Timeline whose sheets validate with a custom tolerance
    pub fn with_tolerance(tolerance: f64) -> Self {
        Self {
            current: BalanceSheet::with_tolerance(tolerance),
            history: Vec::new(),
        }
    }

    pub fn book_asset(&mut self, kind: EntryKind, amount: f64) {
        self.current.book_asset(kind, amount);
    }

    pub fn book_liability(&mut self, kind: EntryKind, amount: f64) {
        self.current.book_liability(kind, amount);
    }

    pub fn asset(&self, kind: EntryKind) -> f64 {
        self.current.asset(kind)
    }

    pub fn liability(&self, kind: EntryKind) -> f64 {
        self.current.liability(kind)
    }

    /// The sheet being booked into this cycle
    pub fn current(&self) -> &BalanceSheet {
        &self.current
    }

    pub fn validate(&self) -> bool {
        self.current.validate()
    }

    /// Commit the current sheet into history
    ///
    /// # Returns
    ///
    /// * `true` - snapshot and delta appended
    /// * `false` - current sheet is unbalanced, nothing appended
    pub fn save_state(&mut self) -> bool {
        if !self.current.validate() {
            return false;
        }

        let delta = match self.history.last() {
            Some(previous) => self.current.delta_from(&previous.snapshot),
            None => self
                .current
                .delta_from(&BalanceSheet::with_tolerance(self.current.tolerance())),
        };

        self.history.push(HistoryEntry {
            snapshot: self.current.clone(),
            delta,
        });
        true
    }

    /// Committed snapshot at `index` (negative counts from the end)
    pub fn balance_history(&self, index: isize) -> Result<&BalanceSheet, LedgerError> {
        self.entry(index).map(|entry| &entry.snapshot)
    }

    /// Committed delta at `index` (negative counts from the end)
    pub fn delta_history(&self, index: isize) -> Result<&BalanceSheet, LedgerError> {
        self.entry(index).map(|entry| &entry.delta)
    }

    /// Most recent commit, if any
    pub fn last_committed(&self) -> Option<&BalanceSheet> {
        self.history.last().map(|entry| &entry.snapshot)
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Drop both the current sheet and all history
    pub fn clear(&mut self) {
        self.current.clear();
        self.history.clear();
    }

    fn entry(&self, index: isize) -> Result<&HistoryEntry, LedgerError> {
        let len = self.history.len();
        let resolved = if index < 0 {
            len.checked_sub(index.unsigned_abs())
        } else {
            Some(index as usize)
        };

        resolved
            .and_then(|i| self.history.get(i))
            .ok_or(LedgerError::IndexOutOfRange { index, len })
    }
}
