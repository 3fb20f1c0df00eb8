//! Evaluation driver
//!
//! Every dated thing the model can do is a lazy stream of occurrence dates
//! tagged with what happens on it. The streams are merged through a
//! min-heap keyed by `(date, phase, stream)`, which fixes the order of
//! same-day events: asset starts, growth steps, incomes, expenses,
//! transactions (each in declaration order), then tax settlement.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use jiff::civil::Date;
use tracing::info_span;

use crate::apply::{apply_expense, apply_income, apply_transaction, settle_tax_year};
use crate::convert::parse_model;
use crate::date_math::next_tax_year_end;
use crate::error::{InvariantError, ResolveError, Result};
use crate::evaluation_state::EvaluationState;
use crate::model::{
    DateExpr, Evaluation, ModelData, ParsedModel, SOURCE_GROWTH, SOURCE_START, TaxTable,
    settings,
};
use crate::recurrence::{Occurrences, Recurrence};
use crate::resolve::{Resolved, SettingsTable, TriggerTable};

/// Order of events falling on the same date
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    AssetStart,
    GrowthStep,
    IncomeDue,
    ExpenseDue,
    TransactionDue,
    TaxBoundary,
}

/// What happens on an occurrence. Indices are declaration positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Start(usize),
    GrowthStep(usize),
    IncomeDue(usize),
    ExpenseDue(usize),
    TransactionDue(usize),
    TaxBoundary,
}

impl EventKind {
    pub fn phase(self) -> Phase {
        match self {
            EventKind::Start(_) => Phase::AssetStart,
            EventKind::GrowthStep(_) => Phase::GrowthStep,
            EventKind::IncomeDue(_) => Phase::IncomeDue,
            EventKind::ExpenseDue(_) => Phase::ExpenseDue,
            EventKind::TransactionDue(_) => Phase::TransactionDue,
            EventKind::TaxBoundary => Phase::TaxBoundary,
        }
    }
}

#[derive(Debug, Clone)]
struct Stream {
    event: EventKind,
    dates: Occurrences,
}

/// Chronological merge of event streams
#[derive(Debug, Clone)]
pub struct EventQueue {
    streams: Vec<Stream>,
    heap: BinaryHeap<Reverse<(Date, Phase, usize)>>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self {
            streams: Vec::new(),
            heap: BinaryHeap::new(),
        }
    }

    pub fn push(&mut self, event: EventKind, mut dates: Occurrences) {
        let idx = self.streams.len();
        if let Some(first) = dates.next() {
            self.heap.push(Reverse((first, event.phase(), idx)));
        }
        self.streams.push(Stream { event, dates });
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl Iterator for EventQueue {
    type Item = (Date, EventKind);

    fn next(&mut self) -> Option<(Date, EventKind)> {
        let Reverse((date, phase, idx)) = self.heap.pop()?;
        let stream = &mut self.streams[idx];
        if let Some(next) = stream.dates.next() {
            self.heap.push(Reverse((next, phase, idx)));
        }
        Some((date, stream.event))
    }
}

/// The `[start, end]` window the model reports on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeOfInterest {
    pub start: Date,
    pub end: Date,
}

impl RangeOfInterest {
    pub fn from_settings(settings: &SettingsTable, triggers: &TriggerTable) -> Result<Self> {
        Ok(Self {
            start: setting_date(settings, triggers, settings::ROI_START)?,
            end: setting_date(settings, triggers, settings::ROI_END)?,
        })
    }
}

fn setting_date(settings: &SettingsTable, triggers: &TriggerTable, name: &str) -> Result<Date> {
    let expr = settings
        .get(name)
        .ok_or_else(|| InvariantError::MissingSetting(name.to_string()))?;
    match settings.resolve(expr)? {
        Resolved::Word(text) => {
            let date = DateExpr::parse(&text).ok_or_else(|| ResolveError::UnresolvedDate(text))?;
            Ok(triggers.resolve(&date)?)
        }
        Resolved::Number(n) => Err(ResolveError::UnresolvedDate(n.to_string()).into()),
    }
}

/// Evaluate a model with the built-in UK tax table.
pub fn evaluate(model: &ModelData) -> Result<Vec<Evaluation>> {
    let parsed = parse_model(model)?;
    evaluate_parsed(&parsed)
}

pub fn evaluate_parsed(model: &ParsedModel) -> Result<Vec<Evaluation>> {
    evaluate_with_tax_table(model, TaxTable::default())
}

/// Evaluate a model against an explicit tax table.
pub fn evaluate_with_tax_table(model: &ParsedModel, tax_table: TaxTable) -> Result<Vec<Evaluation>> {
    let mut state = EvaluationState::new(model, tax_table);
    let roi = RangeOfInterest::from_settings(&state.settings, &state.triggers)?;
    let _span = info_span!(
        "evaluate",
        assets = model.assets.len(),
        incomes = model.incomes.len(),
        expenses = model.expenses.len(),
        transactions = model.transactions.len(),
    )
    .entered();

    let triggers = &state.triggers;
    let mut queue = EventQueue::new();
    let mut earliest = roi.start;

    let asset_starts = model
        .assets
        .iter()
        .map(|a| triggers.resolve(&a.start))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    for (i, start) in asset_starts.iter().enumerate() {
        earliest = earliest.min(*start);
        queue.push(EventKind::Start(i), Occurrences::new(*start, None, None, roi.end));
    }
    for (i, start) in asset_starts.iter().enumerate() {
        let steps = Occurrences::new(*start, Some(Recurrence::MONTHLY), None, roi.end).skipping(1);
        queue.push(EventKind::GrowthStep(i), steps);
    }

    for (i, flow) in model.incomes.iter().enumerate() {
        let start = triggers.resolve(&flow.start)?;
        let end = triggers.resolve_optional(flow.end.as_ref())?;
        earliest = earliest.min(start);
        let dates = Occurrences::new(start, Some(flow.recurrence), end, roi.end);
        queue.push(EventKind::IncomeDue(i), dates);
    }
    for (i, flow) in model.expenses.iter().enumerate() {
        let start = triggers.resolve(&flow.start)?;
        let end = triggers.resolve_optional(flow.end.as_ref())?;
        earliest = earliest.min(start);
        let dates = Occurrences::new(start, Some(flow.recurrence), end, roi.end);
        queue.push(EventKind::ExpenseDue(i), dates);
    }
    for (i, tx) in model.transactions.iter().enumerate() {
        let date = triggers.resolve(&tx.date)?;
        let stop = triggers.resolve_optional(tx.stop_date.as_ref())?;
        earliest = earliest.min(date);
        queue.push(
            EventKind::TransactionDue(i),
            Occurrences::new(date, tx.recurrence, stop, roi.end),
        );
    }

    queue.push(
        EventKind::TaxBoundary,
        Occurrences::new(
            next_tax_year_end(earliest),
            Some(Recurrence::YEARLY),
            None,
            roi.end,
        ),
    );

    for (date, event) in queue {
        match event {
            EventKind::Start(i) => state.start_asset(i, date, SOURCE_START)?,
            EventKind::GrowthStep(i) => state.grow_asset(i, date, SOURCE_GROWTH)?,
            EventKind::IncomeDue(i) => apply_income(&mut state, i, date)?,
            EventKind::ExpenseDue(i) => apply_expense(&mut state, i, date)?,
            EventKind::TransactionDue(i) => {
                apply_transaction(&mut state, &model.transactions[i], date)?;
            }
            EventKind::TaxBoundary => settle_tax_year(&mut state, date)?,
        }
    }

    Ok(state.ledger)
}

/// Evaluate independent models, in parallel when the `parallel` feature
/// is on. Results keep the input order.
pub fn evaluate_many(models: &[ModelData]) -> Vec<Result<Vec<Evaluation>>> {
    #[cfg(feature = "parallel")]
    let results = models.par_iter().map(evaluate).collect();

    #[cfg(not(feature = "parallel"))]
    let results = models.iter().map(evaluate).collect();

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::civil::date;

    #[test]
    fn test_queue_orders_same_day_by_phase() {
        let d = date(2018, 1, 1);
        let mut queue = EventQueue::new();
        queue.push(EventKind::TaxBoundary, Occurrences::new(d, None, None, d));
        queue.push(EventKind::TransactionDue(0), Occurrences::new(d, None, None, d));
        queue.push(EventKind::IncomeDue(0), Occurrences::new(d, None, None, d));
        queue.push(EventKind::Start(0), Occurrences::new(d, None, None, d));
        let order: Vec<Phase> = queue.map(|(_, e)| e.phase()).collect();
        assert_eq!(
            order,
            vec![
                Phase::AssetStart,
                Phase::IncomeDue,
                Phase::TransactionDue,
                Phase::TaxBoundary
            ]
        );
    }

    #[test]
    fn test_queue_keeps_declaration_order_within_phase() {
        let d = date(2018, 1, 1);
        let mut queue = EventQueue::new();
        queue.push(EventKind::TransactionDue(0), Occurrences::new(d, None, None, d));
        queue.push(EventKind::TransactionDue(1), Occurrences::new(d, None, None, d));
        let events: Vec<EventKind> = queue.map(|(_, e)| e).collect();
        assert_eq!(
            events,
            vec![EventKind::TransactionDue(0), EventKind::TransactionDue(1)]
        );
    }

    #[test]
    fn test_queue_merges_chronologically() {
        let mut queue = EventQueue::new();
        let end = date(2018, 12, 31);
        queue.push(
            EventKind::IncomeDue(0),
            Occurrences::new(date(2018, 1, 15), Some(Recurrence::MONTHLY), None, date(2018, 3, 31)),
        );
        queue.push(
            EventKind::ExpenseDue(0),
            Occurrences::new(date(2018, 1, 1), Some(Recurrence::MONTHLY), None, date(2018, 3, 31)),
        );
        queue.push(EventKind::TaxBoundary, Occurrences::new(date(2018, 4, 5), None, None, end));
        let dates: Vec<Date> = queue.map(|(d, _)| d).collect();
        let mut sorted = dates.clone();
        sorted.sort();
        assert_eq!(dates, sorted);
        assert_eq!(dates.len(), 7);
    }
}
