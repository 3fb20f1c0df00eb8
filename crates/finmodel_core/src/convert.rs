//! Parse boundary: `ModelData` (authored strings) to `ParsedModel`
//!
//! Every string field is parsed exactly once here. Nothing downstream
//! re-splits or re-matches model text.

use rustc_hash::FxHashSet;

use crate::error::{EvaluationError, InvariantError, ResolveError};
use crate::model::{
    Asset, BOND_MARKER_PREFIX, CURRENT_SCHEMA_VERSION, DateExpr, Expense, FlowKind, Income,
    Liability, ModelData, ParsedAsset, ParsedFlow, ParsedModel, ParsedSetting, ParsedTransaction,
    ParsedTrigger, SettingKind, Transaction, TransactionSide, TransactionType, ValueExpr,
    parse_flag, parse_number,
};
use crate::recurrence::Recurrence;

/// Convert an authored model into typed items
pub fn parse_model(data: &ModelData) -> Result<ParsedModel, EvaluationError> {
    if data.version != CURRENT_SCHEMA_VERSION {
        return Err(InvariantError::UnsupportedVersion {
            found: data.version,
            expected: CURRENT_SCHEMA_VERSION,
        }
        .into());
    }

    let setting_names: FxHashSet<&str> = data.settings.iter().map(|s| s.name.as_str()).collect();
    let is_setting = |name: &str| setting_names.contains(name);

    let triggers = data
        .triggers
        .iter()
        .map(|t| {
            Ok(ParsedTrigger {
                name: t.name.clone(),
                date: required_date(&t.date)?,
            })
        })
        .collect::<Result<Vec<_>, ResolveError>>()?;

    let settings = data
        .settings
        .iter()
        .map(|s| {
            let kind = SettingKind::parse(&s.kind).ok_or_else(|| {
                InvariantError::UnknownSettingType {
                    setting: s.name.clone(),
                    kind: s.kind.clone(),
                }
            })?;
            let value = ValueExpr::parse(&s.value, is_setting)
                .unwrap_or_else(|| ValueExpr::WordValue(String::new()));
            Ok(ParsedSetting {
                name: s.name.clone(),
                value,
                kind,
            })
        })
        .collect::<Result<Vec<_>, EvaluationError>>()?;

    let assets = data
        .assets
        .iter()
        .map(|a| parse_asset(a, &is_setting))
        .collect::<Result<Vec<_>, _>>()?;

    let incomes = data
        .incomes
        .iter()
        .map(|i| parse_income(i, &is_setting))
        .collect::<Result<Vec<_>, _>>()?;

    let expenses = data
        .expenses
        .iter()
        .map(|e| parse_expense(e, &is_setting))
        .collect::<Result<Vec<_>, _>>()?;

    let transactions = data
        .transactions
        .iter()
        .map(|t| parse_transaction(t, &is_setting))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ParsedModel {
        triggers,
        settings,
        assets,
        incomes,
        expenses,
        transactions,
    })
}

fn required_date(text: &str) -> Result<DateExpr, ResolveError> {
    DateExpr::parse(text).ok_or_else(|| ResolveError::UnresolvedDate(text.to_string()))
}

/// Parse an optional item value field. Unknown names are rejected: only
/// settings and `BMV` bond markers may hold a plain word.
fn optional_value(
    field: String,
    expr: Option<ValueExpr>,
) -> Result<Option<ValueExpr>, ResolveError> {
    match expr {
        Some(ValueExpr::WordValue(word)) if !word.starts_with(BOND_MARKER_PREFIX) => {
            Err(ResolveError::UnresolvedValue { field, text: word })
        }
        other => Ok(other),
    }
}

fn required_value(
    field: String,
    text: &str,
    is_setting: &impl Fn(&str) -> bool,
) -> Result<ValueExpr, ResolveError> {
    optional_value(field.clone(), ValueExpr::parse(text, is_setting))?.ok_or_else(|| {
        ResolveError::UnresolvedValue {
            field,
            text: text.to_string(),
        }
    })
}

fn optional_number(
    field: String,
    text: &str,
    is_setting: &impl Fn(&str) -> bool,
) -> Result<Option<ValueExpr>, ResolveError> {
    optional_value(field, ValueExpr::parse(text, is_setting))
}

fn parse_asset(a: &Asset, is_setting: &impl Fn(&str) -> bool) -> Result<ParsedAsset, ResolveError> {
    let quantity = if a.quantity.trim().is_empty() {
        None
    } else {
        Some(
            parse_number(&a.quantity).ok_or_else(|| ResolveError::UnresolvedValue {
                field: format!("{} quantity", a.name),
                text: a.quantity.clone(),
            })?,
        )
    };

    Ok(ParsedAsset {
        name: a.name.clone(),
        category: a.category.clone(),
        start: required_date(&a.start)?,
        value: required_value(format!("{} value", a.name), &a.value, is_setting)?,
        quantity,
        growth: optional_number(format!("{} growth", a.name), &a.growth, is_setting)?,
        cpi_immune: parse_flag(&a.cpi_immune),
        can_be_negative: parse_flag(&a.can_be_negative),
        is_a_debt: parse_flag(&a.is_a_debt),
        liability: Liability::parse(&a.liability)?,
        purchase_price: optional_number(
            format!("{} purchase price", a.name),
            &a.purchase_price,
            is_setting,
        )?,
    })
}

fn parse_income(i: &Income, is_setting: &impl Fn(&str) -> bool) -> Result<ParsedFlow, ResolveError> {
    Ok(ParsedFlow {
        kind: FlowKind::Income,
        name: i.name.clone(),
        category: i.category.clone(),
        start: required_date(&i.start)?,
        end: DateExpr::parse(&i.end),
        value: required_value(format!("{} value", i.name), &i.value, is_setting)?,
        value_set: DateExpr::parse(&i.value_set),
        growth: optional_number(format!("{} growth", i.name), &i.growth, is_setting)?,
        cpi_immune: parse_flag(&i.cpi_immune),
        recurrence: Recurrence::parse_required(&i.recurrence)?,
        liability: Liability::parse(&i.liability)?,
    })
}

fn parse_expense(
    e: &Expense,
    is_setting: &impl Fn(&str) -> bool,
) -> Result<ParsedFlow, ResolveError> {
    Ok(ParsedFlow {
        kind: FlowKind::Expense,
        name: e.name.clone(),
        category: e.category.clone(),
        start: required_date(&e.start)?,
        end: DateExpr::parse(&e.end),
        value: required_value(format!("{} value", e.name), &e.value, is_setting)?,
        value_set: DateExpr::parse(&e.value_set),
        growth: optional_number(format!("{} growth", e.name), &e.growth, is_setting)?,
        cpi_immune: parse_flag(&e.cpi_immune),
        recurrence: Recurrence::parse_required(&e.recurrence)?,
        liability: Liability::default(),
    })
}

/// Proportional sides read `50%` as 0.5. A word is only kept where
/// `allow_word` is set, i.e. the new value of a setting.
fn parse_side(
    field: String,
    item: &str,
    absolute: &str,
    value: &str,
    allow_word: bool,
    is_setting: &impl Fn(&str) -> bool,
) -> Result<TransactionSide, ResolveError> {
    let item = item.trim();
    let absolute = parse_flag(absolute);
    let value = if absolute {
        ValueExpr::parse(value, is_setting)
    } else {
        ValueExpr::parse_proportion(value, is_setting)
    };
    let value = match value {
        Some(expr) if allow_word && expr.is_word() => Some(expr),
        other => optional_value(field, other)?,
    };
    Ok(TransactionSide {
        item: (!item.is_empty()).then(|| item.to_string()),
        absolute,
        value,
    })
}

fn parse_transaction(
    t: &Transaction,
    is_setting: &impl Fn(&str) -> bool,
) -> Result<ParsedTransaction, EvaluationError> {
    let kind =
        TransactionType::parse(&t.kind).ok_or_else(|| InvariantError::UnknownTransactionType {
            transaction: t.name.clone(),
            kind: t.kind.clone(),
        })?;

    Ok(ParsedTransaction {
        name: t.name.clone(),
        category: t.category.clone(),
        date: required_date(&t.date)?,
        from: parse_side(
            format!("{} from", t.name),
            &t.from,
            &t.from_absolute,
            &t.from_value,
            false,
            is_setting,
        )?,
        to: parse_side(
            format!("{} to", t.name),
            &t.to,
            &t.to_absolute,
            &t.to_value,
            kind == TransactionType::RevalueSetting,
            is_setting,
        )?,
        stop_date: DateExpr::parse(&t.stop_date),
        recurrence: Recurrence::parse(&t.recurrence)?,
        kind,
    })
}
