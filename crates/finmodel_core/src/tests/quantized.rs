//! Tests for quantized holdings and capital gains
//!
//! These tests verify that:
//! - Selling units realises a gain against the proportional cost basis
//! - Selling part of an unquantized asset removes the same share of its basis
//! - CGT is charged at the tax-year boundary above the annual exemption
//! - Unit prices driven by a setting follow `revalueSetting`
//! - A setting-driven purchase price is read when units are sold
//! - Buying units converts money at the current unit price

use jiff::civil::date;

use crate::config::{AssetBuilder, ModelBuilder, TransactionBuilder};
use crate::evaluate::evaluate;
use crate::model::{Evaluation, cgt_name, net_gain_name};
use crate::summary::{history, value_at};

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

fn find<'a>(ledger: &'a [Evaluation], name: &str) -> Option<&'a Evaluation> {
    ledger.iter().find(|e| e.name == name)
}

fn shares_model(sell_units: f64) -> ModelBuilder {
    ModelBuilder::new()
        .view_range("1 Jan 2018", "1 Jan 2020")
        .cash("1 Jan 2018", 0.0)
        .asset(
            AssetBuilder::new("Shares")
                .start("1 Jan 2018")
                .value(150_000.0)
                .quantity(3.0)
                .purchase_price(150_000.0)
                .liability("Joe(CGT)"),
        )
        .transaction(
            TransactionBuilder::liquidate("Sell shares")
                .date("1 Jun 2018")
                .from("Shares")
                .from_absolute(sell_units)
                .to("Cash"),
        )
}

#[test]
fn test_selling_units_moves_money() {
    let ledger = evaluate(&shares_model(2.0).build()).unwrap();
    let sold = date(2018, 6, 1);
    assert!(close(value_at(&ledger, "Shares", sold).unwrap(), 150_000.0));
    assert!(close(value_at(&ledger, "Cash", sold).unwrap(), 300_000.0));
}

#[test]
fn test_gain_on_sale_is_taxed_at_year_end() {
    let ledger = evaluate(&shares_model(2.0).build()).unwrap();

    // Gain 300000 - 100000; 188300 chargeable after the exemption
    let cgt = find(&ledger, &cgt_name("Joe")).unwrap();
    assert_eq!(cgt.date, date(2019, 4, 5));
    assert!(close(cgt.value, 37_500.0 * 0.1 + 150_800.0 * 0.2));

    let net = find(&ledger, &net_gain_name("Joe")).unwrap();
    assert!(close(net.value, 200_000.0 - 33_910.0));

    assert!(close(
        value_at(&ledger, "Cash", date(2019, 4, 5)).unwrap(),
        266_090.0
    ));
}

#[test]
fn test_selling_more_units_than_held_is_skipped() {
    let ledger = evaluate(&shares_model(5.0).build()).unwrap();
    assert!(close(
        value_at(&ledger, "Shares", date(2019, 1, 1)).unwrap(),
        450_000.0
    ));
    assert!(close(value_at(&ledger, "Cash", date(2019, 1, 1)).unwrap(), 0.0));
    assert!(find(&ledger, &cgt_name("Joe")).is_none());
}

#[test]
fn test_setting_price_follows_revaluation() {
    let model = ModelBuilder::new()
        .view_range("1 Jan 2018", "1 Jan 2019")
        .setting("sharePrice", "100", "const")
        .asset(
            AssetBuilder::new("Fund")
                .start("1 Jan 2018")
                .value_text("sharePrice")
                .quantity(10.0),
        )
        .transaction(
            TransactionBuilder::revalue_setting("Price rise")
                .date("1 Mar 2018")
                .to("sharePrice")
                .to_absolute(150.0),
        )
        .build();
    let ledger = evaluate(&model).unwrap();

    assert!(close(value_at(&ledger, "Fund", date(2018, 2, 28)).unwrap(), 1_000.0));
    assert!(close(value_at(&ledger, "Fund", date(2018, 3, 1)).unwrap(), 1_500.0));
    assert!(close(value_at(&ledger, "Fund", date(2018, 12, 1)).unwrap(), 1_500.0));

    let setting: Vec<_> = history(&ledger, "sharePrice").collect();
    assert_eq!(setting.len(), 1);
    assert!(close(setting[0].value, 150.0));
}

#[test]
fn test_proportional_setting_revaluation() {
    let model = ModelBuilder::new()
        .view_range("1 Jan 2018", "1 Jan 2021")
        .setting("sharePrice", "100", "const")
        .asset(
            AssetBuilder::new("Fund")
                .start("1 Jan 2018")
                .value_text("sharePrice")
                .quantity(10.0),
        )
        .transaction(
            TransactionBuilder::revalue_setting("Price rise")
                .date("1 Jan 2019")
                .to("sharePrice")
                .to_proportion(1.1)
                .recurrence("1y"),
        )
        .build();
    let ledger = evaluate(&model).unwrap();
    assert!(close(value_at(&ledger, "Fund", date(2019, 6, 1)).unwrap(), 1_100.0));
    assert!(close(value_at(&ledger, "Fund", date(2020, 6, 1)).unwrap(), 1_210.0));
}

#[test]
fn test_setting_purchase_price_read_at_sale() {
    let model = ModelBuilder::new()
        .view_range("1 Jan 2018", "1 Jan 2019")
        .setting("costPrice", "1000", "const")
        .cash("1 Jan 2018", 0.0)
        .asset(
            AssetBuilder::new("Holding")
                .start("1 Jan 2018")
                .value(5_000.0)
                .quantity(2.0)
                .purchase_price_text("costPrice")
                .liability("Ann(CGT)"),
        )
        .transaction(
            TransactionBuilder::revalue_setting("Cost revised")
                .date("1 Feb 2018")
                .to("costPrice")
                .to_absolute(3_000.0),
        )
        .transaction(
            TransactionBuilder::liquidate("Sell one")
                .date("1 Mar 2018")
                .from("Holding")
                .from_absolute(1.0)
                .to("Cash"),
        )
        .build();
    let ledger = evaluate(&model).unwrap();

    // Half of the revised 3000 basis leaves with the unit
    let net = find(&ledger, &net_gain_name("Ann")).unwrap();
    assert_eq!(net.date, date(2018, 4, 5));
    assert!(close(net.value, 3_500.0));
    assert!(find(&ledger, &cgt_name("Ann")).is_none());
}

#[test]
fn test_deposit_buys_units_at_current_price() {
    let model = ModelBuilder::new()
        .view_range("1 Jan 2018", "1 Jan 2019")
        .cash("1 Jan 2018", 1_000.0)
        .asset(
            AssetBuilder::new("Fund")
                .start("1 Jan 2018")
                .value(100.0)
                .quantity(0.0),
        )
        .transaction(
            TransactionBuilder::custom("Invest")
                .date("1 Feb 2018")
                .from("Cash")
                .from_absolute(500.0)
                .to("Fund"),
        )
        .build();
    let ledger = evaluate(&model).unwrap();
    let invested = date(2018, 2, 1);
    assert!(close(value_at(&ledger, "Fund", invested).unwrap(), 500.0));
    assert!(close(value_at(&ledger, "Cash", invested).unwrap(), 500.0));
}

#[test]
fn test_unit_price_grows() {
    let model = ModelBuilder::new()
        .view_range("1 Jan 2018", "1 Jan 2019")
        .asset(
            AssetBuilder::new("Fund")
                .start("1 Jan 2018")
                .value(100.0)
                .quantity(10.0)
                .growth(12.0)
                .cpi_immune(),
        )
        .build();
    let ledger = evaluate(&model).unwrap();
    let end = value_at(&ledger, "Fund", date(2019, 1, 1)).unwrap();
    assert!((end - 1_120.0).abs() < 1e-6, "{end}");
}

#[test]
fn test_proportional_sale_of_unquantized_asset() {
    let model = ModelBuilder::new()
        .view_range("1 Jan 2018", "1 Jan 2021")
        .cash("1 Jan 2018", 0.0)
        .asset(
            AssetBuilder::new("Flat")
                .start("1 Jan 2018")
                .value(200_000.0)
                .purchase_price(100_000.0)
                .cpi_immune()
                .liability("Joe(CGT)"),
        )
        .transaction(
            TransactionBuilder::liquidate("Sell half")
                .date("1 Jun 2018")
                .from("Flat")
                .from_proportion(0.5)
                .to("Cash"),
        )
        .transaction(
            TransactionBuilder::liquidate("Sell the rest")
                .date("1 Jun 2019")
                .from("Flat")
                .from_proportion(1.0)
                .to("Cash"),
        )
        .build();
    let ledger = evaluate(&model).unwrap();
    assert!(close(value_at(&ledger, "Flat", date(2018, 6, 1)).unwrap(), 100_000.0));
    assert!(close(value_at(&ledger, "Flat", date(2019, 6, 1)).unwrap(), 0.0));

    // Each half carries half the 100000 basis, so each sale gains 50000
    let cgt_key = cgt_name("Joe");
    let cgt: Vec<&Evaluation> = history(&ledger, &cgt_key).collect();
    assert_eq!(cgt.len(), 2);
    assert_eq!(cgt[0].date, date(2019, 4, 5));
    assert!(close(cgt[0].value, 37_500.0 * 0.1 + (50_000.0 - 11_700.0 - 37_500.0) * 0.2));
    assert_eq!(cgt[1].date, date(2020, 4, 5));
    assert!(close(cgt[1].value, 37_500.0 * 0.1 + (50_000.0 - 12_000.0 - 37_500.0) * 0.2));

    let net: Vec<f64> = history(&ledger, &net_gain_name("Joe")).map(|e| e.value).collect();
    assert_eq!(net.len(), 2);
    assert!(close(net[0], 50_000.0 - 3_910.0));
    assert!(close(net[1], 50_000.0 - 3_850.0));

    assert!(close(
        value_at(&ledger, "Cash", date(2020, 4, 5)).unwrap(),
        200_000.0 - 3_910.0 - 3_850.0
    ));
}
