//! Turning a ledger into per-period chart series
//!
//! Aggregation is a pure function of the model, its ledger and the view
//! settings. Assets and debts are stocks: each period shows the last value
//! on or before its start date (or the change since the previous period).
//! Incomes, expenses and tax lines are flows: each period shows the sum of
//! what fell inside it.

mod data;
mod view;

pub use data::{ChartData, ChartDataPoint, ItemChartData};
pub use view::{
    AssetChartMode, TaxTypeFocus, ViewDetail, ViewFrequency, ViewSettings, in_focus,
};

use std::collections::BTreeMap;

use jiff::civil::Date;
use rustc_hash::FxHashMap;

use crate::convert::parse_model;
use crate::error::ChartError;
use crate::evaluate::RangeOfInterest;
use crate::model::settings::ALL_ITEMS;
use crate::model::{Evaluation, ModelData, SOURCE_TAX, parse_tax_line};
use crate::recurrence::Occurrences;
use crate::resolve::{SettingsTable, TriggerTable};

type SeriesMap = BTreeMap<String, Vec<f64>>;

/// Period start dates across the range of interest
#[derive(Debug, Clone)]
struct Periods {
    starts: Vec<Date>,
    end: Date,
}

impl Periods {
    fn new(roi: RangeOfInterest, frequency: ViewFrequency) -> Self {
        Self {
            starts: Occurrences::new(roi.start, Some(frequency.step()), None, roi.end).collect(),
            end: roi.end,
        }
    }

    fn len(&self) -> usize {
        self.starts.len()
    }

    fn labels(&self) -> Vec<String> {
        self.starts
            .iter()
            .map(|d| d.strftime("%a %b %d %Y").to_string())
            .collect()
    }

    fn period_of(&self, date: Date) -> Option<usize> {
        if date > self.end {
            return None;
        }
        self.starts
            .partition_point(|s| *s <= date)
            .checked_sub(1)
    }

    /// Sum of the values falling in each period
    fn flows(&self, history: &[&Evaluation]) -> Vec<f64> {
        let mut sums = vec![0.0; self.len()];
        for e in history {
            if let Some(k) = self.period_of(e.date) {
                sums[k] += e.value;
            }
        }
        sums
    }

    /// Stock values per period, drawn in `mode`. `sign` flips debts to
    /// positive magnitudes.
    fn stocks(&self, history: &[&Evaluation], mode: AssetChartMode, sign: f64) -> Vec<f64> {
        let value_through = |date: Date, inclusive: bool| {
            let n = history.partition_point(|e| if inclusive { e.date <= date } else { e.date < date });
            n.checked_sub(1).map_or(0.0, |i| history[i].value * sign)
        };

        let values: Vec<f64> = self.starts.iter().map(|d| value_through(*d, true)).collect();
        if mode == AssetChartMode::Value {
            return values;
        }

        let mut previous = self
            .starts
            .first()
            .map_or(0.0, |d| value_through(*d, false));
        values
            .into_iter()
            .map(|v| {
                let delta = v - previous;
                previous = v;
                match mode {
                    AssetChartMode::Additions => delta.max(0.0),
                    AssetChartMode::Reductions => delta.min(0.0),
                    _ => delta,
                }
            })
            .collect()
    }
}

fn series_key(detail: ViewDetail, name: &str, category: &str) -> String {
    match detail {
        ViewDetail::Coarse if !category.is_empty() => category.to_string(),
        _ => name.to_string(),
    }
}

fn add_series(map: &mut SeriesMap, key: String, values: Vec<f64>) {
    let entry = map.entry(key).or_insert_with(|| vec![0.0; values.len()]);
    for (total, v) in entry.iter_mut().zip(values) {
        *total += v;
    }
}

fn finish(map: SeriesMap, labels: &[String]) -> Vec<ItemChartData> {
    map.into_iter()
        .filter(|(_, values)| values.iter().any(|v| v.abs() > 1e-9))
        .map(|(item, values)| ItemChartData {
            chart_data_points: labels
                .iter()
                .zip(values)
                .map(|(label, y)| ChartDataPoint {
                    label: label.clone(),
                    y,
                    tooltip: format!("{label} {item}: {y:.2}"),
                })
                .collect(),
            item,
        })
        .collect()
}

/// Build chart series for a model from its ledger.
pub fn make_chart_data(
    model: &ModelData,
    evaluations: &[Evaluation],
    view: &ViewSettings,
) -> Result<ChartData, ChartError> {
    let parsed = parse_model(model)?;
    let setting_table = SettingsTable::new(&parsed.settings);
    let triggers = TriggerTable::new(&parsed.triggers);
    let roi = RangeOfInterest::from_settings(&setting_table, &triggers)?;
    let periods = Periods::new(roi, view.frequency);
    let labels = periods.labels();

    let mut by_name: FxHashMap<&str, Vec<&Evaluation>> = FxHashMap::default();
    for e in evaluations {
        by_name.entry(e.name.as_str()).or_default().push(e);
    }
    for history in by_name.values_mut() {
        history.sort_by_key(|e| e.date);
    }
    let history = |name: &str| by_name.get(name).map_or(&[][..], Vec::as_slice);

    let mut assets = SeriesMap::new();
    let mut debts = SeriesMap::new();
    for asset in &parsed.assets {
        let (focus, mode, sign, target) = if asset.is_a_debt {
            (&view.debt_focus, view.debt_mode, -1.0, &mut debts)
        } else {
            (&view.asset_focus, view.asset_mode, 1.0, &mut assets)
        };
        if !in_focus(focus, &asset.name, &asset.category) {
            continue;
        }
        let values = periods.stocks(history(&asset.name), mode, sign);
        add_series(target, series_key(view.detail, &asset.name, &asset.category), values);
    }

    let mut incomes = SeriesMap::new();
    for flow in &parsed.incomes {
        if in_focus(&view.income_focus, &flow.name, &flow.category) {
            let values = periods.flows(history(&flow.name));
            add_series(&mut incomes, series_key(view.detail, &flow.name, &flow.category), values);
        }
    }
    let mut expenses = SeriesMap::new();
    for flow in &parsed.expenses {
        if in_focus(&view.expense_focus, &flow.name, &flow.category) {
            let values = periods.flows(history(&flow.name));
            add_series(&mut expenses, series_key(view.detail, &flow.name, &flow.category), values);
        }
    }

    let mut taxes = SeriesMap::new();
    let mut tax_lines: BTreeMap<&str, Vec<&Evaluation>> = BTreeMap::new();
    for e in evaluations.iter().filter(|e| e.source == SOURCE_TAX) {
        let Some((person, kind)) = parse_tax_line(&e.name) else {
            continue;
        };
        let wanted_type = match view.tax_type {
            TaxTypeFocus::Income => kind.is_income(),
            TaxTypeFocus::Gain => !kind.is_income(),
            TaxTypeFocus::All => true,
        };
        let wanted_person = view.tax_person == ALL_ITEMS || view.tax_person == person;
        if wanted_type && wanted_person && (view.show_net || !kind.is_net()) {
            tax_lines.entry(e.name.as_str()).or_default().push(e);
        }
    }
    for (name, lines) in tax_lines {
        add_series(&mut taxes, name.to_string(), periods.flows(&lines));
    }

    Ok(ChartData {
        asset_data: finish(assets, &labels),
        debt_data: finish(debts, &labels),
        expenses_data: finish(expenses, &labels),
        incomes_data: finish(incomes, &labels),
        tax_data: finish(taxes, &labels),
        labels,
    })
}
