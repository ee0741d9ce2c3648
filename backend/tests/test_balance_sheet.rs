//! Tests for BalanceSheet and BalanceSheetTimeline
//!
//! Covers the ledger invariants: balance validation, delta correctness and
//! the zero-read policy for entries never booked.

use euro_economy_core::{BalanceSheet, BalanceSheetTimeline, EntryKind, LedgerError};
use proptest::prelude::*;

// ============================================================================
// BalanceSheet
// ============================================================================

#[test]
fn test_unknown_entry_reads_as_zero() {
    let sheet = BalanceSheet::new();

    for kind in EntryKind::ALL {
        assert_eq!(sheet.asset(kind), 0.0);
        assert_eq!(sheet.liability(kind), 0.0);
    }
    assert!(!sheet.has_asset(EntryKind::Deposits));
}

#[test]
fn test_negative_booking_decreases() {
    let mut sheet = BalanceSheet::new();
    sheet.book_asset(EntryKind::Loans, 100.0);
    sheet.book_asset(EntryKind::Loans, -30.0);

    assert_eq!(sheet.asset(EntryKind::Loans), 70.0);
}

#[test]
fn test_validation_tolerates_float_accumulation() {
    let mut sheet = BalanceSheet::new();
    for _ in 0..10 {
        sheet.book_asset(EntryKind::Deposits, 0.1);
    }
    sheet.book_liability(EntryKind::Equity, 1.0);

    assert!(sheet.validate());
}

#[test]
fn test_validation_detects_real_imbalance() {
    let mut sheet = BalanceSheet::new();
    sheet.book_asset(EntryKind::Deposits, 1_000_000.0);
    sheet.book_liability(EntryKind::Equity, 999_999.0);

    assert!(!sheet.validate());
}

#[test]
fn test_clear_resets_sheet() {
    let mut sheet = BalanceSheet::new();
    sheet.book_asset(EntryKind::Deposits, 5.0);
    sheet.clear();

    assert_eq!(sheet.total_assets(), 0.0);
    assert!(sheet.assets().is_empty());
}

// ============================================================================
// BalanceSheetTimeline
// ============================================================================

#[test]
fn test_delta_between_commits() {
    let mut timeline = BalanceSheetTimeline::new();
    timeline.book_asset(EntryKind::Deposits, 100.0);
    timeline.book_liability(EntryKind::Equity, 100.0);
    assert!(timeline.save_state());

    timeline.book_asset(EntryKind::Deposits, 50.0);
    timeline.book_asset(EntryKind::Securities, 50.0);
    timeline.book_liability(EntryKind::Equity, 100.0);
    assert!(timeline.save_state());

    let delta = timeline.delta_history(-1).unwrap();
    assert_eq!(delta.asset(EntryKind::Deposits), 50.0);
    assert_eq!(delta.asset(EntryKind::Securities), 50.0);
    assert_eq!(delta.liability(EntryKind::Equity), 100.0);
}

#[test]
fn test_clear_restarts_history() {
    let mut timeline = BalanceSheetTimeline::new();
    timeline.book_asset(EntryKind::Securities, 10.0);
    timeline.book_liability(EntryKind::Equity, 10.0);
    assert!(timeline.save_state());

    timeline.clear();
    timeline.book_asset(EntryKind::Deposits, 4.0);
    timeline.book_liability(EntryKind::Equity, 4.0);
    assert!(timeline.save_state());

    // clear() also dropped history, so the delta is against an empty sheet
    let delta = timeline.delta_history(-1).unwrap();
    assert_eq!(delta.asset(EntryKind::Securities), 0.0);
    assert_eq!(delta.asset(EntryKind::Deposits), 4.0);
    assert_eq!(timeline.history_len(), 1);
}

#[test]
fn test_refused_commit_keeps_history() {
    let mut timeline = BalanceSheetTimeline::new();
    timeline.book_asset(EntryKind::Deposits, 1.0);
    timeline.book_liability(EntryKind::Equity, 1.0);
    assert!(timeline.save_state());

    timeline.book_asset(EntryKind::Deposits, 1.0);
    assert!(!timeline.save_state());
    assert_eq!(timeline.history_len(), 1);
    assert_eq!(
        timeline.balance_history(-1).unwrap().asset(EntryKind::Deposits),
        1.0
    );
}

#[test]
fn test_history_index_errors() {
    let mut timeline = BalanceSheetTimeline::new();
    assert_eq!(
        timeline.delta_history(-1).unwrap_err(),
        LedgerError::IndexOutOfRange { index: -1, len: 0 }
    );

    assert!(timeline.save_state());
    assert!(timeline.balance_history(0).is_ok());
    assert!(timeline.balance_history(-1).is_ok());
    assert_eq!(
        timeline.balance_history(1).unwrap_err(),
        LedgerError::IndexOutOfRange { index: 1, len: 1 }
    );
}

// ============================================================================
// Properties
// ============================================================================

fn kind() -> impl Strategy<Value = EntryKind> {
    (0..EntryKind::ALL.len()).prop_map(|i| EntryKind::ALL[i])
}

/// Integer-valued amounts keep the arithmetic exact
fn amount() -> impl Strategy<Value = f64> {
    (-1_000_000i64..1_000_000i64).prop_map(|v| v as f64)
}

fn bookings() -> impl Strategy<Value = Vec<(EntryKind, EntryKind, f64)>> {
    prop::collection::vec((kind(), kind(), amount()), 0..20)
}

proptest! {
    #[test]
    fn prop_balanced_bookings_validate(ops in bookings()) {
        let mut sheet = BalanceSheet::new();
        for (asset, liability, value) in ops {
            sheet.book_asset(asset, value);
            sheet.book_liability(liability, value);
        }
        prop_assert!(sheet.validate());
    }

    #[test]
    fn prop_unbalanced_bookings_fail(ops in bookings(), extra in 1i64..1_000i64, side in any::<bool>()) {
        let mut sheet = BalanceSheet::new();
        for (asset, liability, value) in ops {
            sheet.book_asset(asset, value);
            sheet.book_liability(liability, value);
        }
        if side {
            sheet.book_asset(EntryKind::Reserves, extra as f64);
        } else {
            sheet.book_liability(EntryKind::Equity, extra as f64);
        }
        prop_assert!(!sheet.validate());
    }

    #[test]
    fn prop_delta_is_current_minus_previous(first in bookings(), second in bookings()) {
        let mut timeline = BalanceSheetTimeline::new();
        for (asset, liability, value) in first {
            timeline.book_asset(asset, value);
            timeline.book_liability(liability, value);
        }
        prop_assert!(timeline.save_state());
        let previous = timeline.current().clone();

        for (asset, liability, value) in second {
            timeline.book_asset(asset, value);
            timeline.book_liability(liability, value);
        }
        prop_assert!(timeline.save_state());

        let delta = timeline.delta_history(-1).unwrap();
        for kind in EntryKind::ALL {
            prop_assert_eq!(delta.asset(kind), timeline.asset(kind) - previous.asset(kind));
            prop_assert_eq!(delta.liability(kind), timeline.liability(kind) - previous.liability(kind));
        }
    }
}
