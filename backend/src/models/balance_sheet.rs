//! Balance sheet - the atomic unit of bookkeeping
//!
//! A balance sheet is two maps from [`EntryKind`] to a signed amount, one for
//! assets and one for liabilities. Booking is additive and never fails at
//! this layer; which kinds an actor may book is enforced one layer up.
//!
//! # Critical Invariants
//!
//! 1. **Balance**: once a cycle is committed, total assets equal total
//!    liabilities within [`DEFAULT_TOLERANCE`]. Mid-cycle imbalance is allowed.
//! 2. **Unknown reads are zero**: reading a kind that was never booked yields
//!    `0.0`, never an error.

use crate::models::entry::EntryKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Relative tolerance used by [`BalanceSheet::validate`]
///
/// Compared against `max(1.0, |assets|, |liabilities|)`, so small sheets use
/// it as an absolute bound and large sheets as a relative one.
pub const DEFAULT_TOLERANCE: f64 = 1e-9;

/// In-memory ledger of asset and liability amounts for one period
///
/// # Example
/// ```
/// use euro_economy_core::{BalanceSheet, EntryKind};
///
/// let mut sheet = BalanceSheet::new();
/// sheet.book_asset(EntryKind::Deposits, 100.0);
/// sheet.book_liability(EntryKind::Equity, 100.0);
/// assert!(sheet.validate());
///
/// // Never-booked entries read as zero
/// assert_eq!(sheet.asset(EntryKind::Securities), 0.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceSheet {
    assets: BTreeMap<EntryKind, f64>,
    liabilities: BTreeMap<EntryKind, f64>,
    tolerance: f64,
}

impl Default for BalanceSheet {
    fn default() -> Self {
        Self::new()
    }
}

impl BalanceSheet {
    /// Create an empty sheet using [`DEFAULT_TOLERANCE`]
    pub fn new() -> Self {
        Self::with_tolerance(DEFAULT_TOLERANCE)
    }

    /// Create an empty sheet with a custom validation tolerance
    pub fn with_tolerance(tolerance: f64) -> Self {
        Self {
            assets: BTreeMap::new(),
            liabilities: BTreeMap::new(),
            tolerance,
        }
    }

    /// Add `amount` to an asset line (negative amounts decrease it)
    pub fn book_asset(&mut self, kind: EntryKind, amount: f64) {
        *self.assets.entry(kind).or_insert(0.0) += amount;
    }

    /// Add `amount` to a liability line (negative amounts decrease it)
    pub fn book_liability(&mut self, kind: EntryKind, amount: f64) {
        *self.liabilities.entry(kind).or_insert(0.0) += amount;
    }

    /// Current value of an asset line, `0.0` if never booked
    pub fn asset(&self, kind: EntryKind) -> f64 {
        self.assets.get(&kind).copied().unwrap_or(0.0)
    }

    /// Current value of a liability line, `0.0` if never booked
    pub fn liability(&self, kind: EntryKind) -> f64 {
        self.liabilities.get(&kind).copied().unwrap_or(0.0)
    }

    /// Whether an asset line has ever been booked
    pub fn has_asset(&self, kind: EntryKind) -> bool {
        self.assets.contains_key(&kind)
    }

    /// Whether a liability line has ever been booked
    pub fn has_liability(&self, kind: EntryKind) -> bool {
        self.liabilities.contains_key(&kind)
    }

    /// All booked asset lines
    pub fn assets(&self) -> &BTreeMap<EntryKind, f64> {
        &self.assets
    }

    /// All booked liability lines
    pub fn liabilities(&self) -> &BTreeMap<EntryKind, f64> {
        &self.liabilities
    }

    pub fn total_assets(&self) -> f64 {
        self.assets.values().sum()
    }

    pub fn total_liabilities(&self) -> f64 {
        self.liabilities.values().sum()
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Check that total assets equal total liabilities within tolerance
    pub fn validate(&self) -> bool {
        let assets = self.total_assets();
        let liabilities = self.total_liabilities();
        let scale = 1.0_f64.max(assets.abs()).max(liabilities.abs());
        (assets - liabilities).abs() <= self.tolerance * scale
    }

    /// Remove every line from both sides
    pub fn clear(&mut self) {
        self.assets.clear();
        self.liabilities.clear();
    }

    /// Per-line difference `self - previous`
    ///
    /// Covers every kind present on either sheet; a kind missing on one side
    /// counts as zero there.
    pub fn delta_from(&self, previous: &BalanceSheet) -> BalanceSheet {
        let mut delta = BalanceSheet::with_tolerance(self.tolerance);

        for kind in self.assets.keys().chain(previous.assets.keys()) {
            delta
                .assets
                .insert(*kind, self.asset(*kind) - previous.asset(*kind));
        }
        for kind in self.liabilities.keys().chain(previous.liabilities.keys()) {
            delta
                .liabilities
                .insert(*kind, self.liability(*kind) - previous.liability(*kind));
        }

        delta
    }
}
