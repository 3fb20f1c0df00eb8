//! Apply due events to the EvaluationState
//!
//! Each function here mutates the state for one queued event and appends an
//! `Evaluation` for every item it changed. Policy checks (overdrawing an
//! asset that cannot go negative, selling units that are not held, paying a
//! debt past zero) skip or cap the movement and log at debug level; they
//! never fail the run.

use tracing::{debug, trace};

use jiff::civil::Date;

use crate::cost_basis::{CostBasis, Disposal};
use crate::date_math::{days_between, tax_year_of};
use crate::error::{DisposalError, Result};
use crate::evaluation_state::{BondTranche, EvaluationState, unknown_item};
use crate::growth::growth_multiplier;
use crate::model::{
    ParsedTransaction, SOURCE_TAX, TransactionSide, TransactionType, ValueExpr, cgt_name,
    income_tax_name, net_gain_name, net_income_name, ni_name, settings,
};
use crate::resolve::Resolved;
use crate::taxes::settle;

const EPSILON: f64 = 1e-9;

/// Money (and for quantized assets, units) leaving an asset
#[derive(Debug, Clone, Copy, PartialEq)]
struct Outflow {
    money: f64,
    units: Option<f64>,
}

// ============================================================================
// Incomes and expenses
// ============================================================================

/// Pay income `idx` into cash and accrue it for tax.
pub fn apply_income(state: &mut EvaluationState, idx: usize, date: Date) -> Result<()> {
    let amount = state.incomes[idx].advance(date, &state.settings, &state.triggers)?;
    let flow = &state.incomes[idx];
    let (name, liability) = (flow.name.clone(), flow.liability.clone());

    state.record(&name, date, amount, &name);
    if !liability.is_empty() {
        state.accrue_income(&liability, tax_year_of(date), amount);
    }
    move_cash(state, amount, date, &name)
}

/// Pay expense `idx` out of cash.
pub fn apply_expense(state: &mut EvaluationState, idx: usize, date: Date) -> Result<()> {
    let amount = state.expenses[idx].advance(date, &state.settings, &state.triggers)?;
    let name = state.expenses[idx].name.clone();

    state.record(&name, date, amount, &name);
    move_cash(state, -amount, date, &name)
}

/// Credit (or with a negative amount, debit) the cash asset. Cash may go
/// negative.
fn move_cash(state: &mut EvaluationState, amount: f64, date: Date, source: &str) -> Result<()> {
    let Some(cash) = state
        .asset_idx(settings::CASH_ASSET)
        .filter(|&i| state.assets[i].started)
    else {
        debug!(source, amount, "no live cash asset, payment dropped");
        return Ok(());
    };
    state.grow_to(cash, date)?;
    state.assets[cash].value += amount;
    state.record_asset(cash, date, source);
    Ok(())
}

// ============================================================================
// Tax settlement
// ============================================================================

/// Settle every accrual up to and including the tax year ending on `date`
/// and pay the total from cash.
pub fn settle_tax_year(state: &mut EvaluationState, date: Date) -> Result<()> {
    let year = tax_year_of(date);
    let cpi = state.settings.cpi()?;

    let later = state.accruals.split_off(&(year + 1, String::new()));
    let due = std::mem::replace(&mut state.accruals, later);

    let mut total = 0.0;
    for ((tax_year, person), accrual) in due {
        let rates = state.tax_table.rates_for(tax_year, cpi);
        let s = settle(&accrual, &rates);
        trace!(
            tax_year,
            person = person.as_str(),
            income_tax = s.income_tax,
            ni = s.national_insurance,
            cgt = s.capital_gains_tax,
            "settled tax year"
        );

        if s.income_tax > 0.0 {
            state.record(&income_tax_name(&person), date, s.income_tax, SOURCE_TAX);
        }
        if s.national_insurance > 0.0 {
            state.record(&ni_name(&person), date, s.national_insurance, SOURCE_TAX);
        }
        if s.capital_gains_tax > 0.0 {
            state.record(&cgt_name(&person), date, s.capital_gains_tax, SOURCE_TAX);
        }
        if accrual.had_income {
            state.record(&net_income_name(&person), date, s.net_income, SOURCE_TAX);
        }
        if accrual.had_gains {
            state.record(&net_gain_name(&person), date, s.net_gain, SOURCE_TAX);
        }
        total += s.total();
    }

    if total > 0.0 {
        move_cash(state, -total, date, SOURCE_TAX)?;
    }
    Ok(())
}

// ============================================================================
// Transactions
// ============================================================================

/// Apply one occurrence of a transaction.
pub fn apply_transaction(
    state: &mut EvaluationState,
    tx: &ParsedTransaction,
    date: Date,
) -> Result<()> {
    state.grow_named(tx.from.item.as_deref(), date)?;
    state.grow_named(tx.to.item.as_deref(), date)?;
    match tx.kind {
        TransactionType::Custom | TransactionType::LiquidateAsset => {
            transfer(state, tx, date)?;
        }
        TransactionType::BondInvest => {
            if let Some(received) = transfer(state, tx, date)?
                && received > 0.0
                && let Some(item) = &tx.to.item
            {
                let idx = state.require_asset(&tx.name, item)?;
                state.assets[idx].tranches.push_back(BondTranche {
                    date,
                    principal: received,
                });
            }
        }
        TransactionType::PayOffDebt => pay_off_debt(state, tx, date)?,
        TransactionType::RevalueAsset | TransactionType::RevalueDebt => {
            revalue_asset(state, tx, date)?;
        }
        TransactionType::RevalueIncome | TransactionType::RevalueExpense => {
            revalue_flow(state, tx, date)?;
        }
        TransactionType::RevalueSetting => revalue_setting(state, tx, date)?,
        TransactionType::BondMature => bond_mature(state, tx, date)?,
        TransactionType::Auto => auto_top_up(state, tx, date)?,
    }
    Ok(())
}

fn side_value(state: &EvaluationState, tx: &ParsedTransaction, side: &TransactionSide) -> Result<Option<f64>> {
    side.value
        .as_ref()
        .map(|v| state.settings.resolve_number(&tx.name, v))
        .transpose()
}

/// What the from side of a transaction takes out of asset `idx`
fn planned_outflow(state: &EvaluationState, idx: usize, side: &TransactionSide, amount: f64) -> Outflow {
    let asset = &state.assets[idx];
    match (asset.quantity, side.absolute) {
        (Some(_), true) => Outflow {
            money: amount * asset.unit_price,
            units: Some(amount),
        },
        (Some(held), false) => Outflow {
            money: amount * held * asset.unit_price,
            units: Some(amount * held),
        },
        (None, true) => Outflow {
            money: amount,
            units: None,
        },
        (None, false) => Outflow {
            money: amount * asset.total(),
            units: None,
        },
    }
}

/// Outflow worth `money` from asset `idx`
fn outflow_for_money(state: &EvaluationState, idx: usize, money: f64) -> Outflow {
    let asset = &state.assets[idx];
    match asset.quantity {
        Some(_) if asset.unit_price > 0.0 => Outflow {
            money,
            units: Some(money / asset.unit_price),
        },
        _ => Outflow { money, units: None },
    }
}

/// Take `out` from asset `idx`, realising any gain. Returns false when a
/// policy check skipped the withdrawal.
fn withdraw(
    state: &mut EvaluationState,
    tx: &ParsedTransaction,
    idx: usize,
    out: Outflow,
    date: Date,
) -> Result<bool> {
    let asset = &state.assets[idx];
    if !asset.started {
        debug!(transaction = tx.name.as_str(), asset = asset.name.as_str(), "asset not started, skipped");
        return Ok(false);
    }
    match (out.units, asset.quantity) {
        (Some(units), Some(held)) if units > held + EPSILON => {
            debug!(transaction = tx.name.as_str(), units, held, "not enough units held, skipped");
            return Ok(false);
        }
        (None, _) if asset.would_overdraw(out.money) => {
            debug!(
                transaction = tx.name.as_str(),
                amount = out.money,
                available = asset.total(),
                "would overdraw asset, skipped"
            );
            return Ok(false);
        }
        _ => {}
    }

    let mut basis = asset.cost_basis.clone();
    let mut gain = None;
    if let Some(basis) = basis.as_mut() {
        let disposal = dispose(basis, asset.total(), out, |name| state.settings.number(name));
        match disposal {
            Ok(d) => gain = Some(d.gain(out.money)),
            Err(DisposalError::Lookup(e)) => return Err(e),
            Err(other) => {
                debug!(transaction = tx.name.as_str(), reason = %other, "disposal refused, skipped");
                return Ok(false);
            }
        }
    }
    let person = asset.cgt_person().map(str::to_string);

    let asset = &mut state.assets[idx];
    asset.cost_basis = basis;
    match (asset.quantity.as_mut(), out.units) {
        (Some(held), Some(units)) => *held = (*held - units).max(0.0),
        _ => asset.value -= out.money,
    }
    if let (Some(person), Some(gain)) = (person, gain) {
        state.accrue_gain(&person, tax_year_of(date), gain);
    }
    state.record_asset(idx, date, &tx.name);
    Ok(true)
}

fn dispose<L>(
    basis: &mut CostBasis,
    total: f64,
    out: Outflow,
    lookup: L,
) -> std::result::Result<Disposal, DisposalError>
where
    L: Fn(&str) -> Result<f64>,
{
    match out.units {
        Some(units) => basis.dispose_units(units, lookup),
        None if total > 0.0 => basis.dispose_proportion((out.money / total).min(1.0), lookup),
        None => Ok(Disposal::default()),
    }
}

/// Put `amount` into asset `idx`. Quantized assets buy units at the
/// current unit price.
fn deposit(state: &mut EvaluationState, tx: &ParsedTransaction, idx: usize, amount: f64, date: Date) {
    let asset = &mut state.assets[idx];
    if !asset.started {
        debug!(transaction = tx.name.as_str(), asset = asset.name.as_str(), "asset not started, skipped");
        return;
    }
    match asset.quantity.as_mut() {
        Some(held) => {
            if asset.unit_price <= 0.0 {
                debug!(transaction = tx.name.as_str(), "no unit price to buy at, skipped");
                return;
            }
            let units = amount / asset.unit_price;
            *held += units;
            if let Some(basis) = asset.cost_basis.as_mut() {
                basis.acquire(units, amount);
            }
        }
        None => {
            asset.value += amount;
            if let Some(basis) = asset.cost_basis.as_mut() {
                basis.acquire(0.0, amount);
            }
        }
    }
    state.record_asset(idx, date, &tx.name);
}

/// Amount the to side receives given what left the from side
fn received_amount(to: &TransactionSide, to_value: Option<f64>, money_out: Option<f64>) -> Option<f64> {
    match (to.absolute, to_value, money_out) {
        (true, Some(v), _) => Some(v),
        (false, v, Some(out)) => Some(v.unwrap_or(1.0) * out),
        _ => None,
    }
}

/// Move value from one side to the other. Returns what the to side
/// received, or `None` when nothing moved.
fn transfer(state: &mut EvaluationState, tx: &ParsedTransaction, date: Date) -> Result<Option<f64>> {
    let from_value = side_value(state, tx, &tx.from)?;
    let to_value = side_value(state, tx, &tx.to)?;

    if let Some(item) = &tx.to.item {
        let idx = state.require_asset(&tx.name, item)?;
        if !state.assets[idx].started {
            debug!(transaction = tx.name.as_str(), asset = item.as_str(), "asset not started, skipped");
            return Ok(None);
        }
    }

    let money_out = match &tx.from.item {
        Some(item) => {
            let idx = state.require_asset(&tx.name, item)?;
            let amount = from_value.unwrap_or(0.0);
            if amount == 0.0 {
                return Ok(None);
            }
            let out = planned_outflow(state, idx, &tx.from, amount);
            if !withdraw(state, tx, idx, out, date)? {
                return Ok(None);
            }
            Some(out.money)
        }
        None => None,
    };

    let Some(received) = received_amount(&tx.to, to_value, money_out) else {
        return Ok(money_out.map(|_| 0.0));
    };
    if let Some(item) = &tx.to.item {
        let idx = state.require_asset(&tx.name, item)?;
        deposit(state, tx, idx, received, date);
    }
    Ok(Some(received))
}

fn pay_off_debt(state: &mut EvaluationState, tx: &ParsedTransaction, date: Date) -> Result<()> {
    let Some(debt_name) = &tx.to.item else {
        debug!(transaction = tx.name.as_str(), "no debt named, skipped");
        return Ok(());
    };
    let debt = state.require_asset(&tx.name, debt_name)?;
    let outstanding = (-state.assets[debt].total()).max(0.0);

    let amount = side_value(state, tx, &tx.from)?.unwrap_or(0.0);
    let payer = tx
        .from
        .item
        .as_ref()
        .map(|item| state.require_asset(&tx.name, item))
        .transpose()?;
    let offered = match payer {
        Some(p) if !tx.from.absolute => amount * state.assets[p].total(),
        _ => amount,
    };

    let payment = offered.min(outstanding);
    if payment <= 0.0 {
        debug!(transaction = tx.name.as_str(), outstanding, "nothing to pay, skipped");
        return Ok(());
    }
    if let Some(p) = payer {
        let out = outflow_for_money(state, p, payment);
        if !withdraw(state, tx, p, out, date)? {
            return Ok(());
        }
    }
    deposit(state, tx, debt, payment, date);
    Ok(())
}

fn revalue_asset(state: &mut EvaluationState, tx: &ParsedTransaction, date: Date) -> Result<()> {
    let Some(item) = &tx.to.item else {
        debug!(transaction = tx.name.as_str(), "nothing to revalue, skipped");
        return Ok(());
    };
    let idx = state.require_asset(&tx.name, item)?;
    let Some(v) = side_value(state, tx, &tx.to)? else {
        return Ok(());
    };

    let asset = &mut state.assets[idx];
    if !asset.started {
        debug!(transaction = tx.name.as_str(), asset = item.as_str(), "asset not started, skipped");
        return Ok(());
    }
    let total = if !tx.to.absolute {
        asset.total() * v
    } else if asset.is_a_debt {
        -v.abs()
    } else {
        v
    };
    asset.word = None;
    asset.set_total(total);
    state.record_asset(idx, date, &tx.name);
    Ok(())
}

fn revalue_flow(state: &mut EvaluationState, tx: &ParsedTransaction, date: Date) -> Result<()> {
    let Some(item) = &tx.to.item else {
        debug!(transaction = tx.name.as_str(), "nothing to revalue, skipped");
        return Ok(());
    };
    let Some(v) = side_value(state, tx, &tx.to)? else {
        return Ok(());
    };
    let flows = match tx.kind {
        TransactionType::RevalueIncome => {
            let idx = state.income_idx(item).ok_or_else(|| unknown_item(&tx.name, item))?;
            &mut state.incomes[idx]
        }
        _ => {
            let idx = state.expense_idx(item).ok_or_else(|| unknown_item(&tx.name, item))?;
            &mut state.expenses[idx]
        }
    };

    let amount = if tx.to.absolute {
        v
    } else {
        flows.advance(date, &state.settings, &state.triggers)? * v
    };
    flows.reset(amount, date);
    Ok(())
}

fn revalue_setting(state: &mut EvaluationState, tx: &ParsedTransaction, date: Date) -> Result<()> {
    let Some(name) = &tx.to.item else {
        debug!(transaction = tx.name.as_str(), "no setting named, skipped");
        return Ok(());
    };
    if !state.settings.contains(name) {
        return Err(unknown_item(&tx.name, name));
    }
    let Some(expr) = &tx.to.value else {
        return Ok(());
    };

    let new_value = if tx.to.absolute {
        match state.settings.resolve(expr)? {
            Resolved::Number(n) => ValueExpr::Literal(n),
            Resolved::Word(w) => ValueExpr::WordValue(w),
        }
    } else {
        let scale = state.settings.resolve_number(&tx.name, expr)?;
        ValueExpr::Literal(state.settings.number(name)? * scale)
    };
    state.settings.set(name, new_value.clone());

    let ValueExpr::Literal(price) = new_value else {
        return Ok(());
    };
    state.record(name, date, price, &tx.name);
    let tracking: Vec<usize> = state
        .assets
        .iter()
        .enumerate()
        .filter(|(_, a)| a.started && a.price_setting.as_deref() == Some(name.as_str()))
        .map(|(i, _)| i)
        .collect();
    for idx in tracking {
        state.grow_to(idx, date)?;
        state.assets[idx].unit_price = price;
        state.record_asset(idx, date, &tx.name);
    }
    Ok(())
}

/// Release bond principal first-in first-out, paying it out grown by CPI.
fn bond_mature(state: &mut EvaluationState, tx: &ParsedTransaction, date: Date) -> Result<()> {
    let Some(bond_name) = &tx.from.item else {
        debug!(transaction = tx.name.as_str(), "no bond named, skipped");
        return Ok(());
    };
    let bond = state.require_asset(&tx.name, bond_name)?;
    let cpi = state.settings.cpi()?;
    let from_value = side_value(state, tx, &tx.from)?;
    let to_value = side_value(state, tx, &tx.to)?;

    let mut tranches = state.assets[bond].tranches.clone();
    let outstanding: f64 = tranches.iter().map(|t| t.principal).sum();
    let mut remaining = match (tx.from.absolute, from_value) {
        (true, Some(v)) => v.min(outstanding),
        (false, Some(p)) => p * outstanding,
        (_, None) => outstanding,
    };

    let mut payout = 0.0;
    while remaining > EPSILON {
        let Some(front) = tranches.front_mut() else {
            break;
        };
        let take = front.principal.min(remaining);
        payout += take * growth_multiplier(0.0, cpi, false, days_between(front.date, date));
        front.principal -= take;
        remaining -= take;
        if front.principal <= EPSILON {
            tranches.pop_front();
        }
    }
    if payout <= 0.0 {
        debug!(transaction = tx.name.as_str(), "no matured principal, skipped");
        return Ok(());
    }

    let asset = &state.assets[bond];
    if !asset.can_be_negative {
        payout = payout.min(asset.total().max(0.0));
    }
    let out = outflow_for_money(state, bond, payout);
    if !withdraw(state, tx, bond, out, date)? {
        return Ok(());
    }
    state.assets[bond].tranches = tranches;

    if let Some(item) = &tx.to.item
        && let Some(received) = received_amount(&tx.to, to_value, Some(payout))
    {
        let idx = state.require_asset(&tx.name, item)?;
        deposit(state, tx, idx, received, date);
    }
    Ok(())
}

/// Top up a negative target from a source, moving only what is needed.
fn auto_top_up(state: &mut EvaluationState, tx: &ParsedTransaction, date: Date) -> Result<()> {
    let (Some(source_name), Some(target_name)) = (&tx.from.item, &tx.to.item) else {
        debug!(transaction = tx.name.as_str(), "auto transaction needs both sides, skipped");
        return Ok(());
    };
    let source = state.require_asset(&tx.name, source_name)?;
    let target = state.require_asset(&tx.name, target_name)?;

    let shortfall = -state.assets[target].total();
    if !state.assets[target].started || shortfall <= 0.0 {
        return Ok(());
    }

    let available = state.assets[source].total();
    let mut cap = match (tx.from.absolute, side_value(state, tx, &tx.from)?) {
        (true, Some(v)) => v,
        (false, Some(p)) => p * available,
        (_, None) => available,
    };
    if !state.assets[source].can_be_negative {
        cap = cap.min(available.max(0.0));
    }

    let amount = shortfall.min(cap);
    if amount <= 0.0 {
        debug!(transaction = tx.name.as_str(), shortfall, "source has nothing to give, skipped");
        return Ok(());
    }
    let out = outflow_for_money(state, source, amount);
    if withdraw(state, tx, source, out, date)? {
        deposit(state, tx, target, amount, date);
    }
    Ok(())
}
