//! Income and expense builders

use super::{flag_text, number_text};
use crate::model::{Expense, FlowKind, Income};

/// Builder for an income or an expense
#[derive(Debug, Clone)]
pub struct FlowBuilder {
    pub(crate) kind: FlowKind,
    income: Income,
}

impl FlowBuilder {
    /// A recurring income, paid into cash
    #[must_use]
    pub fn income(name: impl Into<String>) -> Self {
        Self::new(FlowKind::Income, name)
    }

    /// A recurring expense, paid out of cash
    #[must_use]
    pub fn expense(name: impl Into<String>) -> Self {
        Self::new(FlowKind::Expense, name)
    }

    fn new(kind: FlowKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            income: Income {
                name: name.into(),
                cpi_immune: flag_text(false),
                recurrence: "1m".into(),
                ..Default::default()
            },
        }
    }

    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.income.category = category.into();
        self
    }

    #[must_use]
    pub fn start(mut self, start: impl Into<String>) -> Self {
        self.income.start = start.into();
        self
    }

    /// Exclusive end date or trigger
    #[must_use]
    pub fn end(mut self, end: impl Into<String>) -> Self {
        self.income.end = end.into();
        self
    }

    #[must_use]
    pub fn value(mut self, value: f64) -> Self {
        self.income.value = number_text(value);
        self
    }

    #[must_use]
    pub fn value_text(mut self, value: impl Into<String>) -> Self {
        self.income.value = value.into();
        self
    }

    /// Date the value applies at
    #[must_use]
    pub fn value_set(mut self, date: impl Into<String>) -> Self {
        self.income.value_set = date.into();
        self
    }

    #[must_use]
    pub fn growth(mut self, percent: f64) -> Self {
        self.income.growth = number_text(percent);
        self
    }

    #[must_use]
    pub fn cpi_immune(mut self) -> Self {
        self.income.cpi_immune = flag_text(true);
        self
    }

    #[must_use]
    pub fn recurrence(mut self, recurrence: impl Into<String>) -> Self {
        self.income.recurrence = recurrence.into();
        self
    }

    #[must_use]
    pub fn monthly(self) -> Self {
        self.recurrence("1m")
    }

    #[must_use]
    pub fn annually(self) -> Self {
        self.recurrence("1y")
    }

    /// Ignored for expenses
    #[must_use]
    pub fn liability(mut self, liability: impl Into<String>) -> Self {
        self.income.liability = liability.into();
        self
    }

    pub fn build_income(self) -> Income {
        self.income
    }

    pub fn build_expense(self) -> Expense {
        let i = self.income;
        Expense {
            name: i.name,
            category: i.category,
            start: i.start,
            end: i.end,
            value: i.value,
            value_set: i.value_set,
            growth: i.growth,
            cpi_immune: i.cpi_immune,
            recurrence: i.recurrence,
        }
    }
}
