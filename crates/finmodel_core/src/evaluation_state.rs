//! Mutable evaluation state: per-asset and per-flow running values, the
//! settings table, tax accruals and the evaluation record.

use std::collections::{BTreeMap, VecDeque};

use jiff::civil::Date;
use rustc_hash::FxHashMap;

use crate::cost_basis::CostBasis;
use crate::date_math::days_between;
use crate::error::{EvaluationError, InvariantError, Result};
use crate::growth::growth_multiplier;
use crate::model::{
    Evaluation, FlowKind, Liability, ParsedAsset, ParsedFlow, ParsedModel, TaxKind, TaxTable,
    ValueExpr,
};
use crate::resolve::{Resolved, SettingsTable, TriggerTable};
use crate::taxes::TaxAccrual;

/// Principal put into a bond on `date`, not yet matured
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BondTranche {
    pub date: Date,
    pub principal: f64,
}

/// Running state of one asset or debt
#[derive(Debug, Clone)]
pub struct AssetState {
    pub name: String,
    pub category: String,
    pub started: bool,
    /// Total value of an unquantized asset; negative for a debt
    pub value: f64,
    /// Units held, for quantized assets
    pub quantity: Option<f64>,
    pub unit_price: f64,
    /// Setting the unit price follows on `revalueSetting`
    pub price_setting: Option<String>,
    pub growth: Option<ValueExpr>,
    pub cpi_immune: bool,
    pub can_be_negative: bool,
    pub is_a_debt: bool,
    /// Word the asset is pinned to; its value is zero
    pub word: Option<String>,
    pub liability: Liability,
    pub cost_basis: Option<CostBasis>,
    pub tranches: VecDeque<BondTranche>,
    pub last_grown: Option<Date>,
    spec: ParsedAsset,
}

impl AssetState {
    fn new(spec: &ParsedAsset) -> Self {
        Self {
            name: spec.name.clone(),
            category: spec.category.clone(),
            started: false,
            value: 0.0,
            quantity: spec.quantity,
            unit_price: 0.0,
            price_setting: None,
            growth: spec.growth.clone(),
            cpi_immune: spec.cpi_immune,
            can_be_negative: spec.can_be_negative,
            is_a_debt: spec.is_a_debt,
            word: None,
            liability: spec.liability.clone(),
            cost_basis: None,
            tranches: VecDeque::new(),
            last_grown: None,
            spec: spec.clone(),
        }
    }

    pub fn total(&self) -> f64 {
        match self.quantity {
            Some(units) => units * self.unit_price,
            None => self.value,
        }
    }

    /// Replace the total value, rescaling the unit price of a quantized
    /// asset.
    pub fn set_total(&mut self, total: f64) {
        match self.quantity {
            Some(units) if units > 0.0 => self.unit_price = total / units,
            Some(_) => {}
            None => self.value = total,
        }
    }

    /// Whether withdrawing `amount` would take the asset below zero when
    /// it is not allowed to go there
    pub fn would_overdraw(&self, amount: f64) -> bool {
        !self.can_be_negative && !self.is_a_debt && amount > self.total() + 1e-9
    }

    pub fn cgt_person(&self) -> Option<&str> {
        self.liability.person(TaxKind::CapitalGains)
    }

    /// Resolve the opening value and basis on the asset's start date.
    fn open(&mut self, date: Date, settings: &SettingsTable) -> Result<()> {
        let resolved = settings.resolve(&self.spec.value)?;
        let opening = match resolved {
            Resolved::Number(v) => v,
            Resolved::Word(word) => {
                check_wordless_growth(&self.name, &word, self.growth.as_ref(), settings)?;
                self.word = Some(word);
                0.0
            }
        };

        match self.quantity {
            Some(units) => {
                self.unit_price = opening;
                if let ValueExpr::SettingRef(name) = &self.spec.value {
                    self.price_setting = Some(name.clone());
                }
                self.cost_basis = self.opening_basis(units, settings)?;
            }
            None => {
                self.value = if self.is_a_debt { -opening.abs() } else { opening };
                self.cost_basis = self.opening_basis(1.0, settings)?;
            }
        }
        self.started = true;
        self.last_grown = Some(date);
        Ok(())
    }

    fn opening_basis(&self, units: f64, settings: &SettingsTable) -> Result<Option<CostBasis>> {
        let Some(price) = &self.spec.purchase_price else {
            return Ok(None);
        };
        let basis = match price {
            ValueExpr::SettingRef(name) => CostBasis::from_setting(units, name.clone()),
            other => CostBasis::fixed(units, settings.resolve_number(&self.name, other)?),
        };
        Ok(Some(basis))
    }
}

/// Running state of one income or expense
#[derive(Debug, Clone)]
pub struct FlowState {
    pub kind: FlowKind,
    pub name: String,
    pub category: String,
    /// Amount per occurrence as of `amount_date`
    pub amount: f64,
    pub amount_date: Option<Date>,
    pub growth: Option<ValueExpr>,
    pub cpi_immune: bool,
    pub word: Option<String>,
    pub liability: Liability,
    spec: ParsedFlow,
}

impl FlowState {
    fn new(spec: &ParsedFlow) -> Self {
        Self {
            kind: spec.kind,
            name: spec.name.clone(),
            category: spec.category.clone(),
            amount: 0.0,
            amount_date: None,
            growth: spec.growth.clone(),
            cpi_immune: spec.cpi_immune,
            word: None,
            liability: spec.liability.clone(),
            spec: spec.clone(),
        }
    }

    /// Grow the amount to `date` and return it.
    ///
    /// The first call resolves the authored value as of `value_set`
    /// (default the start date). Growth is re-resolved on each call so a
    /// revalued CPI or growth setting takes effect from then on.
    pub fn advance(
        &mut self,
        date: Date,
        settings: &SettingsTable,
        triggers: &TriggerTable,
    ) -> Result<f64> {
        let from = match self.amount_date {
            Some(from) => from,
            None => self.open(settings, triggers)?,
        };
        if self.word.is_some() {
            return Ok(0.0);
        }
        let growth = settings.resolve_or_zero(&self.name, self.growth.as_ref())?;
        let cpi = settings.cpi()?;
        self.amount *= growth_multiplier(growth, cpi, self.cpi_immune, days_between(from, date));
        self.amount_date = Some(date);
        Ok(self.amount)
    }

    /// Replace the amount from `date` onwards.
    pub fn reset(&mut self, amount: f64, date: Date) {
        self.word = None;
        self.amount = amount;
        self.amount_date = Some(date);
    }

    fn open(&mut self, settings: &SettingsTable, triggers: &TriggerTable) -> Result<Date> {
        let set_at = match &self.spec.value_set {
            Some(expr) => triggers.resolve(expr)?,
            None => triggers.resolve(&self.spec.start)?,
        };
        match settings.resolve(&self.spec.value)? {
            Resolved::Number(v) => self.amount = v,
            Resolved::Word(word) => {
                check_wordless_growth(&self.name, &word, self.growth.as_ref(), settings)?;
                self.word = Some(word);
                self.amount = 0.0;
            }
        }
        self.amount_date = Some(set_at);
        Ok(set_at)
    }
}

/// An item pinned to a word cannot grow.
fn check_wordless_growth(
    item: &str,
    word: &str,
    growth: Option<&ValueExpr>,
    settings: &SettingsTable,
) -> Result<()> {
    let rate = settings.resolve_or_zero(item, growth)?;
    if rate != 0.0 {
        return Err(InvariantError::WordValueWithGrowth {
            item: item.to_string(),
            value: word.to_string(),
        }
        .into());
    }
    Ok(())
}

/// Resolved, per-run state of an evaluation
#[derive(Debug, Clone)]
pub struct EvaluationState {
    pub settings: SettingsTable,
    pub triggers: TriggerTable,
    pub tax_table: TaxTable,
    pub assets: Vec<AssetState>,
    pub incomes: Vec<FlowState>,
    pub expenses: Vec<FlowState>,
    asset_index: FxHashMap<String, usize>,
    income_index: FxHashMap<String, usize>,
    expense_index: FxHashMap<String, usize>,
    /// Accrued tax bases keyed by (tax year, person)
    pub accruals: BTreeMap<(i16, String), TaxAccrual>,
    pub ledger: Vec<Evaluation>,
}

impl EvaluationState {
    pub fn new(model: &ParsedModel, tax_table: TaxTable) -> Self {
        let assets: Vec<AssetState> = model.assets.iter().map(AssetState::new).collect();
        let incomes: Vec<FlowState> = model.incomes.iter().map(FlowState::new).collect();
        let expenses: Vec<FlowState> = model.expenses.iter().map(FlowState::new).collect();
        let index = |names: Vec<&str>| -> FxHashMap<String, usize> {
            names
                .into_iter()
                .enumerate()
                .map(|(i, n)| (n.to_string(), i))
                .collect()
        };

        Self {
            settings: SettingsTable::new(&model.settings),
            triggers: TriggerTable::new(&model.triggers),
            tax_table,
            asset_index: index(assets.iter().map(|a| a.name.as_str()).collect()),
            income_index: index(incomes.iter().map(|f| f.name.as_str()).collect()),
            expense_index: index(expenses.iter().map(|f| f.name.as_str()).collect()),
            assets,
            incomes,
            expenses,
            accruals: BTreeMap::new(),
            ledger: Vec::new(),
        }
    }

    pub fn asset_idx(&self, name: &str) -> Option<usize> {
        self.asset_index.get(name).copied()
    }

    pub fn income_idx(&self, name: &str) -> Option<usize> {
        self.income_index.get(name).copied()
    }

    pub fn expense_idx(&self, name: &str) -> Option<usize> {
        self.expense_index.get(name).copied()
    }

    /// Asset `item` named by transaction `transaction`
    pub fn require_asset(&self, transaction: &str, item: &str) -> Result<usize> {
        self.asset_idx(item).ok_or_else(|| unknown_item(transaction, item))
    }

    pub fn record(&mut self, name: &str, date: Date, value: f64, source: &str) {
        self.ledger.push(Evaluation::new(name, date, value, source));
    }

    /// Append the current value of asset `idx`.
    pub fn record_asset(&mut self, idx: usize, date: Date, source: &str) {
        let asset = &self.assets[idx];
        let (name, total) = (asset.name.clone(), asset.total());
        self.record(&name, date, total, source);
    }

    pub fn start_asset(&mut self, idx: usize, date: Date, source: &str) -> Result<()> {
        self.assets[idx].open(date, &self.settings)?;
        self.record_asset(idx, date, source);
        Ok(())
    }

    /// Bring asset `idx` up to `date` by applying growth since it was last
    /// grown. Returns whether its total changed.
    pub fn grow_to(&mut self, idx: usize, date: Date) -> Result<bool> {
        let cpi = self.settings.cpi()?;
        let asset = &self.assets[idx];
        let Some(last) = asset
            .last_grown
            .filter(|last| asset.started && *last < date)
        else {
            return Ok(false);
        };
        let growth = self
            .settings
            .resolve_or_zero(&asset.name, asset.growth.as_ref())?;
        if let Some(word) = &asset.word
            && growth != 0.0
        {
            return Err(InvariantError::WordValueWithGrowth {
                item: asset.name.clone(),
                value: word.clone(),
            }
            .into());
        }

        let multiplier = growth_multiplier(growth, cpi, asset.cpi_immune, days_between(last, date));
        let asset = &mut self.assets[idx];
        asset.last_grown = Some(date);
        if multiplier == 1.0 {
            return Ok(false);
        }
        let before = asset.total();
        match asset.quantity {
            Some(_) => asset.unit_price *= multiplier,
            None => asset.value *= multiplier,
        }
        Ok(asset.total() != before)
    }

    /// Monthly growth step; records only when the value moved.
    pub fn grow_asset(&mut self, idx: usize, date: Date, source: &str) -> Result<()> {
        if self.grow_to(idx, date)? {
            self.record_asset(idx, date, source);
        }
        Ok(())
    }

    /// Bring a named asset up to `date`, if `name` is a started asset.
    pub fn grow_named(&mut self, name: Option<&str>, date: Date) -> Result<()> {
        if let Some(idx) = name.and_then(|n| self.asset_idx(n)) {
            self.grow_to(idx, date)?;
        }
        Ok(())
    }

    /// Accrue an income payment to every person it is liable to.
    pub fn accrue_income(&mut self, liability: &Liability, tax_year: i16, amount: f64) {
        for person in liability.income_people() {
            let income_tax = liability.person(TaxKind::IncomeTax) == Some(person);
            let ni = liability.person(TaxKind::NationalInsurance) == Some(person);
            self.accruals
                .entry((tax_year, person.to_string()))
                .or_default()
                .add_income(amount, income_tax, ni);
        }
    }

    pub fn accrue_gain(&mut self, person: &str, tax_year: i16, gain: f64) {
        self.accruals
            .entry((tax_year, person.to_string()))
            .or_default()
            .add_gain(gain);
    }
}

pub fn unknown_item(transaction: &str, item: &str) -> EvaluationError {
    InvariantError::UnknownItem {
        transaction: transaction.to_string(),
        item: item.to_string(),
    }
    .into()
}
