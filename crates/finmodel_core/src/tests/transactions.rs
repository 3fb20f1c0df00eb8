//! Tests for transaction semantics
//!
//! These tests verify that:
//! - Transfers move money and respect overdraft policy
//! - Debt payments stop at the outstanding balance
//! - Auto top-ups move only the shortfall
//! - Revaluations reset assets, debts and flows
//! - Bonds pay out their principal grown by CPI
//! - Unknown item names are rejected

use jiff::civil::date;

use crate::config::{AssetBuilder, FlowBuilder, ModelBuilder, TransactionBuilder};
use crate::error::{EvaluationError, InvariantError};
use crate::evaluate::evaluate;
use crate::summary::{history, value_at};

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

fn savings(value: f64) -> AssetBuilder {
    AssetBuilder::new("Savings")
        .start("1 Jan 2018")
        .value(value)
        .cpi_immune()
}

fn base() -> ModelBuilder {
    ModelBuilder::new().view_range("1 Jan 2018", "1 Jan 2019")
}

#[test]
fn test_transfer_moves_money() {
    let model = base()
        .cash("1 Jan 2018", 0.0)
        .asset(savings(1_000.0))
        .transaction(
            TransactionBuilder::custom("Withdraw")
                .date("1 Feb 2018")
                .from("Savings")
                .from_absolute(300.0)
                .to("Cash"),
        )
        .build();
    let ledger = evaluate(&model).unwrap();
    let d = date(2018, 2, 1);
    assert!(close(value_at(&ledger, "Savings", d).unwrap(), 700.0));
    assert!(close(value_at(&ledger, "Cash", d).unwrap(), 300.0));
}

#[test]
fn test_transfer_with_fee() {
    // Proportional to-side: only 90% arrives
    let model = base()
        .cash("1 Jan 2018", 0.0)
        .asset(savings(1_000.0))
        .transaction(
            TransactionBuilder::custom("Withdraw")
                .date("1 Feb 2018")
                .from("Savings")
                .from_proportion(0.5)
                .to("Cash")
                .to_proportion(0.9),
        )
        .build();
    let ledger = evaluate(&model).unwrap();
    let d = date(2018, 2, 1);
    assert!(close(value_at(&ledger, "Savings", d).unwrap(), 500.0));
    assert!(close(value_at(&ledger, "Cash", d).unwrap(), 450.0));
}

#[test]
fn test_overdraw_is_skipped() {
    let model = base()
        .cash("1 Jan 2018", 0.0)
        .asset(savings(100.0))
        .transaction(
            TransactionBuilder::custom("Too much")
                .date("1 Feb 2018")
                .from("Savings")
                .from_absolute(500.0)
                .to("Cash"),
        )
        .build();
    let ledger = evaluate(&model).unwrap();
    assert!(close(value_at(&ledger, "Savings", date(2018, 12, 1)).unwrap(), 100.0));
    assert!(close(value_at(&ledger, "Cash", date(2018, 12, 1)).unwrap(), 0.0));
    assert!(history(&ledger, "Cash").all(|e| e.source != "Too much"));
}

#[test]
fn test_transfer_into_unstarted_asset_is_skipped() {
    let model = base()
        .cash("1 Jan 2018", 1_000.0)
        .asset(
            AssetBuilder::new("ISA")
                .start("1 Jun 2018")
                .value(0.0)
                .cpi_immune(),
        )
        .transaction(
            TransactionBuilder::custom("Early deposit")
                .date("1 Feb 2018")
                .from("Cash")
                .from_absolute(400.0)
                .to("ISA"),
        )
        .build();
    let ledger = evaluate(&model).unwrap();
    assert!(close(value_at(&ledger, "Cash", date(2018, 12, 1)).unwrap(), 1_000.0));
    assert!(close(value_at(&ledger, "ISA", date(2018, 12, 1)).unwrap(), 0.0));
}

#[test]
fn test_recurring_transfer_stops_before_stop_date() {
    let model = base()
        .cash("1 Jan 2018", 1_000.0)
        .asset(savings(0.0))
        .transaction(
            TransactionBuilder::custom("Save")
                .date("1 Feb 2018")
                .from("Cash")
                .from_absolute(100.0)
                .to("Savings")
                .recurrence("1m")
                .stop("1 May 2018"),
        )
        .build();
    let ledger = evaluate(&model).unwrap();
    assert!(close(value_at(&ledger, "Savings", date(2018, 12, 1)).unwrap(), 300.0));
    assert!(close(value_at(&ledger, "Cash", date(2018, 12, 1)).unwrap(), 700.0));
}

#[test]
fn test_pay_off_debt_is_capped() {
    let model = base()
        .cash("1 Jan 2018", 5_000.0)
        .asset(AssetBuilder::debt("Loan", 1_000.0).start("1 Jan 2018"))
        .transaction(
            TransactionBuilder::pay_off_debt("Clear loan")
                .date("1 Feb 2018")
                .from("Cash")
                .from_absolute(3_000.0)
                .to("Loan"),
        )
        .build();
    let ledger = evaluate(&model).unwrap();
    let d = date(2018, 2, 1);
    assert!(close(value_at(&ledger, "Loan", d).unwrap(), 0.0));
    assert!(close(value_at(&ledger, "Cash", d).unwrap(), 4_000.0));
}

#[test]
fn test_debt_stored_negative() {
    let model = base()
        .asset(AssetBuilder::debt("Loan", 1_000.0).start("1 Jan 2018"))
        .transaction(
            TransactionBuilder::revalue_debt("Rate change")
                .date("1 Mar 2018")
                .to("Loan")
                .to_absolute(600.0),
        )
        .build();
    let ledger = evaluate(&model).unwrap();
    assert!(close(value_at(&ledger, "Loan", date(2018, 1, 1)).unwrap(), -1_000.0));
    assert!(close(value_at(&ledger, "Loan", date(2018, 3, 1)).unwrap(), -600.0));
}

#[test]
fn test_auto_top_up_moves_shortfall() {
    let model = base()
        .cash("1 Jan 2018", -200.0)
        .asset(savings(1_000.0))
        .transaction(
            TransactionBuilder::auto("Top up")
                .date("1 Feb 2018")
                .from("Savings")
                .to("Cash"),
        )
        .build();
    let ledger = evaluate(&model).unwrap();
    let d = date(2018, 2, 1);
    assert!(close(value_at(&ledger, "Cash", d).unwrap(), 0.0));
    assert!(close(value_at(&ledger, "Savings", d).unwrap(), 800.0));
}

#[test]
fn test_auto_top_up_ignores_positive_target() {
    let model = base()
        .cash("1 Jan 2018", 50.0)
        .asset(savings(1_000.0))
        .transaction(
            TransactionBuilder::auto("Top up")
                .date("1 Feb 2018")
                .from("Savings")
                .to("Cash")
                .recurrence("1m"),
        )
        .build();
    let ledger = evaluate(&model).unwrap();
    assert!(history(&ledger, "Savings").all(|e| close(e.value, 1_000.0)));
}

#[test]
fn test_revalue_asset_proportional() {
    let model = base()
        .asset(savings(1_000.0))
        .transaction(
            TransactionBuilder::revalue_asset("Crash")
                .date("1 Mar 2018")
                .to("Savings")
                .to_proportion(0.5),
        )
        .build();
    let ledger = evaluate(&model).unwrap();
    assert!(close(value_at(&ledger, "Savings", date(2018, 3, 1)).unwrap(), 500.0));
}

#[test]
fn test_revalue_income_applies_to_later_payments() {
    let model = base()
        .cash("1 Jan 2018", 0.0)
        .flow(
            FlowBuilder::income("Salary")
                .start("1 Jan 2018")
                .value(1_000.0)
                .cpi_immune(),
        )
        .transaction(
            TransactionBuilder::revalue_income("Pay rise")
                .date("15 Feb 2018")
                .to("Salary")
                .to_absolute(2_000.0),
        )
        .build();
    let ledger = evaluate(&model).unwrap();
    let payments: Vec<f64> = history(&ledger, "Salary").map(|e| e.value).take(3).collect();
    assert_eq!(payments, vec![1_000.0, 1_000.0, 2_000.0]);
    assert!(close(value_at(&ledger, "Cash", date(2018, 3, 1)).unwrap(), 4_000.0));
}

#[test]
fn test_revalue_expense_proportional() {
    let model = base()
        .cash("1 Jan 2018", 0.0)
        .flow(
            FlowBuilder::expense("Rent")
                .start("1 Jan 2018")
                .value(500.0)
                .cpi_immune(),
        )
        .transaction(
            TransactionBuilder::revalue_expense("Rent rise")
                .date("15 Jan 2018")
                .to("Rent")
                .to_proportion(1.2),
        )
        .build();
    let ledger = evaluate(&model).unwrap();
    let payments: Vec<f64> = history(&ledger, "Rent").map(|e| e.value).take(2).collect();
    assert!(close(payments[0], 500.0));
    assert!(close(payments[1], 600.0));
}

#[test]
fn test_bond_matures_with_cpi() {
    let model = ModelBuilder::new()
        .view_range("1 Jan 2018", "1 Jan 2021")
        .cpi(2.0)
        .cash("1 Jan 2018", 5_000.0)
        .asset(AssetBuilder::new("Bond").start("1 Jan 2018").value(0.0))
        .transaction(
            TransactionBuilder::bond_invest("Buy bond")
                .date("1 Jan 2018")
                .from("Cash")
                .from_absolute(1_000.0)
                .to("Bond"),
        )
        .transaction(
            TransactionBuilder::bond_mature("Bond matures")
                .date("1 Jan 2020")
                .from("Bond")
                .to("Cash"),
        )
        .build();
    let ledger = evaluate(&model).unwrap();
    let d = date(2020, 1, 1);
    assert!(close(value_at(&ledger, "Cash", d).unwrap(), 5_040.4));
    assert!(value_at(&ledger, "Bond", d).unwrap().abs() < 1e-6);
}

#[test]
fn test_unknown_item_is_an_error() {
    let model = base()
        .cash("1 Jan 2018", 0.0)
        .transaction(
            TransactionBuilder::custom("Move")
                .date("1 Feb 2018")
                .from("Nowhere")
                .from_absolute(10.0)
                .to("Cash"),
        )
        .build();
    let err = evaluate(&model).unwrap_err();
    assert!(matches!(
        err,
        EvaluationError::Invariant(InvariantError::UnknownItem { ref item, .. }) if item == "Nowhere"
    ));
}
