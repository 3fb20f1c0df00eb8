//! Model Builder
//!
//! Collects settings, triggers and items into a `ModelData`, filling in the
//! range-of-interest settings every model needs.

use super::{AssetBuilder, FlowBuilder, TransactionBuilder, number_text};
use crate::model::{FlowKind, ModelData, Setting, Trigger, settings};

/// Builder for a complete model
#[derive(Debug, Clone, Default)]
pub struct ModelBuilder {
    model: ModelData,
}

impl ModelBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Settings
    // =========================================================================

    /// Add or replace a setting.
    #[must_use]
    pub fn setting(mut self, name: &str, value: impl Into<String>, kind: &str) -> Self {
        let value = value.into();
        match self.model.settings.iter_mut().find(|s| s.name == name) {
            Some(existing) => {
                existing.value = value;
                existing.kind = kind.to_string();
            }
            None => self.model.settings.push(Setting {
                name: name.to_string(),
                value,
                hint: String::new(),
                kind: kind.to_string(),
            }),
        }
        self
    }

    #[must_use]
    pub fn view_setting(self, name: &str, value: impl Into<String>) -> Self {
        self.setting(name, value, "view")
    }

    /// Range of interest as two dates or triggers
    #[must_use]
    pub fn view_range(self, start: &str, end: &str) -> Self {
        self.view_setting(settings::ROI_START, start)
            .view_setting(settings::ROI_END, end)
    }

    /// Annual CPI in percent
    #[must_use]
    pub fn cpi(self, percent: f64) -> Self {
        self.setting(settings::CPI, number_text(percent), "const")
    }

    // =========================================================================
    // Items
    // =========================================================================

    #[must_use]
    pub fn trigger(mut self, name: &str, date: &str) -> Self {
        self.model.triggers.push(Trigger {
            name: name.to_string(),
            date: date.to_string(),
        });
        self
    }

    #[must_use]
    pub fn asset(mut self, asset: AssetBuilder) -> Self {
        self.model.assets.push(asset.build());
        self
    }

    /// The `Cash` asset, allowed to go negative
    #[must_use]
    pub fn cash(self, start: &str, value: f64) -> Self {
        self.asset(
            AssetBuilder::new(settings::CASH_ASSET)
                .start(start)
                .value(value)
                .cpi_immune()
                .can_be_negative(),
        )
    }

    #[must_use]
    pub fn flow(mut self, flow: FlowBuilder) -> Self {
        match flow.kind {
            FlowKind::Income => self.model.incomes.push(flow.build_income()),
            FlowKind::Expense => self.model.expenses.push(flow.build_expense()),
        }
        self
    }

    #[must_use]
    pub fn transaction(mut self, tx: TransactionBuilder) -> Self {
        self.model.transactions.push(tx.build());
        self
    }

    pub fn build(self) -> ModelData {
        self.model
    }
}
