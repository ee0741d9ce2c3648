//! Tests for the EuroEconomy cycle pipeline
//!
//! Builds economies from JSON configs and checks the stage order, the
//! lending target, balance preservation, determinism and collapse.

use euro_economy_core::models::{BankId, CentralBankId, ClientId, EconomicActor};
use euro_economy_core::orchestrator::{AggregateEconomy, EconomyConfig, EuroEconomy};
use euro_economy_core::policy::SpendingMode;
use euro_economy_core::{CycleStage, EntryKind, Event};

/// Two central banks, three banks, every mechanism switched on
const RICH_CONFIG: &str = r#"{
    "params": {
        "growth_rate": 0.02,
        "inflation_rate": 0.01,
        "security_growth_rate": 0.03,
        "mbs_growth_rate": 0.01,
        "lending_satisfaction_rate": 0.8
    },
    "rng_seed": 7,
    "central_banks": [
        {
            "name": "ecb",
            "params": {
                "reserve_ir": 0.01,
                "surplus_reserve_ir": 0.002,
                "loan_ir": 0.015,
                "loan_duration": 10,
                "min_reserve_ratio": 0.04,
                "mbs_reserve_ratio": 0.5,
                "securities_reserve_ratio": 0.5,
                "qe_mode": { "type": "debt_related", "rate": 0.005 },
                "helicopter_mode": { "type": "fixed", "amount": 5.0 }
            },
            "banks": [
                {
                    "name": "alpha",
                    "params": {
                        "loan_ir": 0.03,
                        "savings_ir": 0.01,
                        "loan_duration": 12,
                        "max_mbs_ratio": 0.1,
                        "min_risk_asset_ratio": 0.05,
                        "max_risk_asset_ratio": 0.4,
                        "max_securities_ratio": 0.3,
                        "spending": { "type": "profit", "percentage": 0.5 },
                        "no_loss": true,
                        "defaults_bought_by_debt_collectors": 0.5
                    },
                    "clients": [
                        {
                            "name": "household",
                            "params": {
                                "savings_rate": 0.05,
                                "defaulting": { "type": "random", "max_rate": 0.05 }
                            },
                            "initial_loan": 1000.0
                        },
                        {
                            "name": "firm",
                            "params": { "defaulting": { "type": "fixed", "rate": 0.01 } },
                            "initial_loan": 3000.0
                        }
                    ]
                },
                {
                    "name": "beta",
                    "params": {
                        "loan_ir": 0.025,
                        "max_reserve_ratio": 0.2,
                        "max_securities_ratio": 0.5,
                        "spending": { "type": "equity", "percentage": 0.1 }
                    },
                    "clients": [
                        { "name": "pensioner", "params": { "savings_rate": 0.1 }, "initial_loan": 500.0 }
                    ]
                }
            ]
        },
        {
            "name": "fed",
            "params": { "min_reserve_ratio": 0.1, "loan_ir": 0.02 },
            "banks": [
                {
                    "name": "gamma",
                    "params": {
                        "loan_ir": 0.04,
                        "spending": { "type": "fixed", "amount": 10.0 },
                        "retain_profit": true,
                        "retain_profit_percentage": 0.2
                    },
                    "clients": [
                        { "name": "startup", "initial_loan": 2000.0 }
                    ]
                }
            ]
        }
    ]
}"#;

fn rich_economy() -> EuroEconomy {
    let config = EconomyConfig::from_json(RICH_CONFIG).expect("config parses");
    EuroEconomy::from_config(&config).expect("economy builds")
}

/// One bank, one client repaying 1000 over two cycles at 5%, no new lending
fn repaying_economy() -> EuroEconomy {
    let config = EconomyConfig::from_json(
        r#"{
            "central_banks": [{
                "name": "ecb",
                "banks": [{
                    "name": "bank",
                    "params": { "loan_ir": 0.05, "loan_duration": 2 },
                    "clients": [{ "name": "client", "initial_loan": 1000.0 }]
                }]
            }]
        }"#,
    )
    .unwrap();
    EuroEconomy::from_config(&config).unwrap()
}

fn assert_every_sheet_balanced(economy: &EuroEconomy) {
    for cb in economy.central_banks() {
        assert!(cb.validate_balance(), "{} unbalanced", cb.name());
    }
    for bank in economy.banks() {
        assert!(bank.validate_balance(), "{} unbalanced: {:?}", bank.name(), bank.balance_sheet());
    }
    for client in economy.clients() {
        assert!(client.validate_balance(), "{} unbalanced", client.name());
    }
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn test_from_config_commits_cycle_zero() {
    let economy = rich_economy();

    assert_eq!(economy.cycle(), 0);
    assert_eq!(economy.central_banks().len(), 2);
    assert_eq!(economy.banks().len(), 3);
    assert_eq!(economy.clients().len(), 4);
    assert_eq!(economy.im(), 6500.0);
    assert_eq!(economy.config_hash().map(str::len), Some(64));

    for bank in economy.banks() {
        assert_eq!(bank.timeline().history_len(), 1);
    }
    for client in economy.clients() {
        assert_eq!(client.timeline().history_len(), 1);
    }
    assert_every_sheet_balanced(&economy);
}

#[test]
fn test_graph_registration_follows_config() {
    let economy = rich_economy();

    let ecb = economy.central_bank(CentralBankId(0)).unwrap();
    assert_eq!(ecb.banks().collect::<Vec<_>>(), vec![BankId(0), BankId(1)]);

    let alpha = economy.bank(BankId(0)).unwrap();
    assert_eq!(alpha.central_bank(), Some(CentralBankId(0)));
    assert_eq!(alpha.clients().collect::<Vec<_>>(), vec![ClientId(0), ClientId(1)]);

    assert_eq!(economy.client(ClientId(3)).unwrap().bank(), BankId(2));
}

#[test]
fn test_initial_reserve_requirement_is_met() {
    let economy = rich_economy();

    // fed requires 10% of gamma's 2000 and counts nothing but reserves
    let gamma = economy.bank(BankId(2)).unwrap();
    assert!((gamma.asset(EntryKind::Reserves) - 200.0).abs() < 1e-9);
    assert!((economy.central_banks()[1].asset(EntryKind::Loans) - 200.0).abs() < 1e-9);
}

// ============================================================================
// Pipeline
// ============================================================================

#[test]
fn test_stage_order() {
    assert_eq!(CycleStage::ALL.first(), Some(&CycleStage::Inflate));
    assert_eq!(CycleStage::ALL.last(), Some(&CycleStage::Validate));

    let position = |stage: CycleStage| CycleStage::ALL.iter().position(|s| *s == stage).unwrap();
    assert!(position(CycleStage::CentralBankInjections) < position(CycleStage::Income));
    assert!(position(CycleStage::Income) < position(CycleStage::Spending));
    assert!(position(CycleStage::Spending) < position(CycleStage::Borrowing));
    assert!(position(CycleStage::Borrowing) < position(CycleStage::ReserveRebalancing));
}

#[test]
fn test_stage_by_stage_matches_run_cycle() {
    let mut whole = rich_economy();
    let mut staged = whole.clone();

    let expected = whole.run_cycle();

    staged.begin_cycle();
    for stage in CycleStage::ALL {
        staged.run_stage(stage);
    }

    assert_eq!(staged.current_result(), &expected);
    assert_eq!(staged.im(), whole.im());
}

#[test]
fn test_cycles_stay_balanced_with_every_mechanism() {
    let mut economy = rich_economy();

    for cycle in 1..=15 {
        let result = economy.run_cycle();
        assert_eq!(result.cycle, cycle);
        assert!(result.balanced, "cycle {} unbalanced", cycle);
        assert!(!result.collapsed);
        assert_every_sheet_balanced(&economy);
    }

    assert!(economy.total_reserves() > 0.0);
    assert!(economy.central_banks()[0].asset(EntryKind::HelicopterMoney) > 0.0);
    assert!(economy.central_banks()[0].asset(EntryKind::Securities) > 0.0);
}

#[test]
fn test_borrowing_closes_share_of_gap_to_target() {
    let mut economy = rich_economy();
    economy.begin_cycle();

    let start = economy.im_at_cycle_start();
    let target = economy.lending_target();
    assert!((target - start * 1.02 * 1.01).abs() < 1e-9);

    let before = economy.im();
    economy.run_stage(CycleStage::Borrowing);

    let lent = economy.current_result().lending;
    assert!((lent - (target - before) * 0.8).abs() < 1e-9);
    assert!((economy.im() - before - lent).abs() < 1e-9);
}

#[test]
fn test_inflation_scales_fixed_spending_every_cycle() {
    let mut economy = rich_economy();
    economy.run_cycle();
    economy.run_cycle();

    match &economy.bank(BankId(2)).unwrap().params().spending {
        SpendingMode::Fixed { amount } => assert!((amount - 10.0 * 1.01 * 1.01).abs() < 1e-9),
        other => panic!("unexpected spending mode {:?}", other),
    }
    match economy.central_banks()[0].params().helicopter_mode {
        euro_economy_core::models::InjectionMode::Fixed { amount } => {
            assert!((amount - 5.0 * 1.01 * 1.01).abs() < 1e-9)
        }
        other => panic!("unexpected helicopter mode {:?}", other),
    }
}

#[test]
fn test_events_are_logged_per_cycle() {
    let mut economy = rich_economy();
    economy.run_cycle();

    let log = economy.event_log();
    assert_eq!(log.events_of_type("CycleCommitted").len(), 1);
    assert_eq!(log.events_of_type("HelicopterMoney").len(), 1);
    assert_eq!(log.events_of_type("QuantitativeEasing").len(), 1);
    assert_eq!(log.events_of_type("DebtCollected").len(), 3);
    assert!(!log.events_for_actor("alpha").is_empty());
    assert!(log.events_in_cycle(1).len() >= 6);
    assert!(log.events_of_type("Collapse").is_empty());
}

#[test]
fn test_same_seed_same_run() {
    let mut a = rich_economy();
    let mut b = rich_economy();

    for _ in 0..8 {
        assert_eq!(a.run_cycle(), b.run_cycle());
    }
    assert_eq!(a.im(), b.im());
    assert_eq!(a.total_unresolved_debt(), b.total_unresolved_debt());
}

#[test]
fn test_different_seed_changes_random_defaults() {
    let mut config = EconomyConfig::from_json(RICH_CONFIG).unwrap();
    let mut a = EuroEconomy::from_config(&config).unwrap();
    config.rng_seed = 8;
    let mut b = EuroEconomy::from_config(&config).unwrap();

    assert_ne!(a.config_hash(), b.config_hash());
    assert_ne!(a.run_cycle().defaulted, b.run_cycle().defaulted);
}

// ============================================================================
// Collapse
// ============================================================================

#[test]
fn test_repayment_drains_inside_money_to_collapse() {
    let mut economy = repaying_economy();

    // 50 interest and a 500 installment
    let first = economy.run_cycle();
    assert!(first.balanced);
    assert!(!first.collapsed);
    assert_eq!(first.inside_money, 450.0);
    assert_eq!(first.interest_collected, 50.0);
    assert_eq!(first.installments_collected, 500.0);

    // 25 interest, 425 of the last 500 paid, 75 written off
    let second = economy.run_cycle();
    assert!(second.balanced);
    assert!(second.collapsed);
    assert_eq!(second.inside_money, 0.0);
    assert_eq!(second.shortfall.client_installment_shortage, 75.0);
    assert_eq!(economy.total_private_debt(), 0.0);

    let collapses = economy.event_log().events_of_type("Collapse");
    assert_eq!(collapses.len(), 1);
    assert!(matches!(collapses[0], Event::Collapse { cycle: 2, .. }));
    assert!(economy.is_collapsed());
}
