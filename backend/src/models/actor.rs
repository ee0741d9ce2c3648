//! Economic actor capability model
//!
//! Every actor owns exactly one [`BalanceSheetTimeline`] and declares the
//! entry kinds it may hold on each side. Bookings outside that declaration are
//! refused with `false` instead of panicking, so policy code can attempt a
//! booking speculatively.

use crate::models::balance_sheet::BalanceSheet;
use crate::models::entry::EntryKind;
use crate::models::timeline::{BalanceSheetTimeline, LedgerError};

/// Arena handle of a central bank inside an economy
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CentralBankId(pub usize);

/// Arena handle of a commercial bank inside an economy
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BankId(pub usize);

/// Arena handle of a private actor (bank client) inside an economy
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClientId(pub usize);

/// An actor holding a balance sheet
///
/// Implementors supply the declared kinds and access to their timeline; the
/// booking, reading and commit operations are provided.
pub trait EconomicActor {
    /// Human-readable actor name (for logs)
    fn name(&self) -> &str;

    /// Kinds this actor may book as assets
    fn asset_kinds(&self) -> &'static [EntryKind];

    /// Kinds this actor may book as liabilities
    fn liability_kinds(&self) -> &'static [EntryKind];

    fn timeline(&self) -> &BalanceSheetTimeline;

    fn timeline_mut(&mut self) -> &mut BalanceSheetTimeline;

    /// Book an asset change, refusing undeclared kinds
    fn book_asset(&mut self, kind: EntryKind, amount: f64) -> bool {
        if !self.asset_kinds().contains(&kind) {
            tracing::debug!(actor = self.name(), %kind, amount, "rejected asset booking");
            return false;
        }
        self.timeline_mut().book_asset(kind, amount);
        true
    }

    /// Book a liability change, refusing undeclared kinds
    fn book_liability(&mut self, kind: EntryKind, amount: f64) -> bool {
        if !self.liability_kinds().contains(&kind) {
            tracing::debug!(actor = self.name(), %kind, amount, "rejected liability booking");
            return false;
        }
        self.timeline_mut().book_liability(kind, amount);
        true
    }

    fn asset(&self, kind: EntryKind) -> f64 {
        self.timeline().asset(kind)
    }

    fn liability(&self, kind: EntryKind) -> f64 {
        self.timeline().liability(kind)
    }

    fn balance_sheet(&self) -> &BalanceSheet {
        self.timeline().current()
    }

    fn validate_balance(&self) -> bool {
        self.timeline().validate()
    }

    /// Commit the current sheet; the only way history advances
    fn save_state(&mut self) -> bool {
        let saved = self.timeline_mut().save_state();
        if !saved {
            let sheet = self.timeline().current();
            tracing::warn!(
                actor = self.name(),
                assets = sheet.total_assets(),
                liabilities = sheet.total_liabilities(),
                "balance sheet does not balance, state not saved"
            );
        }
        saved
    }

    fn balance_history(&self, index: isize) -> Result<&BalanceSheet, LedgerError> {
        self.timeline().balance_history(index)
    }

    fn delta_history(&self, index: isize) -> Result<&BalanceSheet, LedgerError> {
        self.timeline().delta_history(index)
    }

    /// Value of a liability at the last commit, `0.0` before the first one
    fn committed_liability(&self, kind: EntryKind) -> f64 {
        self.timeline()
            .last_committed()
            .map(|sheet| sheet.liability(kind))
            .unwrap_or(0.0)
    }
}
