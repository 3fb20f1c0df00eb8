//! Reading values back out of a ledger

use std::collections::BTreeMap;

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use crate::model::Evaluation;

/// Final and per-date values of every item in a ledger
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelSummary {
    /// Value of each item at its last evaluation
    pub final_values: BTreeMap<String, f64>,
    /// Date of each item's last evaluation
    pub last_dates: BTreeMap<String, Date>,
    pub evaluation_count: usize,
}

impl ModelSummary {
    pub fn from_ledger(ledger: &[Evaluation]) -> Self {
        let mut summary = ModelSummary {
            evaluation_count: ledger.len(),
            ..Default::default()
        };
        for e in ledger {
            summary.final_values.insert(e.name.clone(), e.value);
            summary.last_dates.insert(e.name.clone(), e.date);
        }
        summary
    }

    pub fn final_value(&self, name: &str) -> Option<f64> {
        self.final_values.get(name).copied()
    }
}

/// Value of `name` as of the end of `date`: its last evaluation on or
/// before that day.
pub fn value_at(ledger: &[Evaluation], name: &str, date: Date) -> Option<f64> {
    ledger
        .iter()
        .filter(|e| e.name == name && e.date <= date)
        .next_back()
        .map(|e| e.value)
}

/// Every evaluation of `name`, in ledger order
pub fn history<'a>(ledger: &'a [Evaluation], name: &'a str) -> impl Iterator<Item = &'a Evaluation> {
    ledger.iter().filter(move |e| e.name == name)
}
