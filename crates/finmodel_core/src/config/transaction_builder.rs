//! Transaction Builder DSL
//!
//! ```ignore
//! // Sell two units of a quantized holding into cash
//! let sale = TransactionBuilder::liquidate("Sell shares")
//!     .date("1 Jun 2019")
//!     .from("Shares")
//!     .from_absolute(2.0)
//!     .to("Cash");
//!
//! // Raise a setting by 10% every year
//! let rise = TransactionBuilder::revalue_setting("Price rise")
//!     .date("1 Jan 2019")
//!     .to("sharePrice")
//!     .to_proportion(1.1)
//!     .recurrence("1y");
//! ```

use super::{flag_text, number_text};
use crate::model::{Transaction, TransactionType};

#[derive(Debug, Clone)]
pub struct TransactionBuilder {
    tx: Transaction,
}

impl TransactionBuilder {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: TransactionType) -> Self {
        Self {
            tx: Transaction {
                name: name.into(),
                kind: kind.as_str().to_string(),
                ..Default::default()
            },
        }
    }

    #[must_use]
    pub fn custom(name: impl Into<String>) -> Self {
        Self::new(name, TransactionType::Custom)
    }

    #[must_use]
    pub fn liquidate(name: impl Into<String>) -> Self {
        Self::new(name, TransactionType::LiquidateAsset)
    }

    #[must_use]
    pub fn pay_off_debt(name: impl Into<String>) -> Self {
        Self::new(name, TransactionType::PayOffDebt)
    }

    #[must_use]
    pub fn revalue_asset(name: impl Into<String>) -> Self {
        Self::new(name, TransactionType::RevalueAsset)
    }

    #[must_use]
    pub fn revalue_debt(name: impl Into<String>) -> Self {
        Self::new(name, TransactionType::RevalueDebt)
    }

    #[must_use]
    pub fn revalue_income(name: impl Into<String>) -> Self {
        Self::new(name, TransactionType::RevalueIncome)
    }

    #[must_use]
    pub fn revalue_expense(name: impl Into<String>) -> Self {
        Self::new(name, TransactionType::RevalueExpense)
    }

    #[must_use]
    pub fn revalue_setting(name: impl Into<String>) -> Self {
        Self::new(name, TransactionType::RevalueSetting)
    }

    #[must_use]
    pub fn bond_invest(name: impl Into<String>) -> Self {
        Self::new(name, TransactionType::BondInvest)
    }

    #[must_use]
    pub fn bond_mature(name: impl Into<String>) -> Self {
        Self::new(name, TransactionType::BondMature)
    }

    #[must_use]
    pub fn auto(name: impl Into<String>) -> Self {
        Self::new(name, TransactionType::Auto)
    }

    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.tx.category = category.into();
        self
    }

    #[must_use]
    pub fn date(mut self, date: impl Into<String>) -> Self {
        self.tx.date = date.into();
        self
    }

    #[must_use]
    pub fn from(mut self, item: impl Into<String>) -> Self {
        self.tx.from = item.into();
        self
    }

    /// Money, or units for a quantized asset
    #[must_use]
    pub fn from_absolute(mut self, amount: f64) -> Self {
        self.tx.from_absolute = flag_text(true);
        self.tx.from_value = number_text(amount);
        self
    }

    #[must_use]
    pub fn from_proportion(mut self, fraction: f64) -> Self {
        self.tx.from_absolute = flag_text(false);
        self.tx.from_value = number_text(fraction);
        self
    }

    #[must_use]
    pub fn to(mut self, item: impl Into<String>) -> Self {
        self.tx.to = item.into();
        self
    }

    #[must_use]
    pub fn to_absolute(mut self, amount: f64) -> Self {
        self.tx.to_absolute = flag_text(true);
        self.tx.to_value = number_text(amount);
        self
    }

    #[must_use]
    pub fn to_proportion(mut self, fraction: f64) -> Self {
        self.tx.to_absolute = flag_text(false);
        self.tx.to_value = number_text(fraction);
        self
    }

    /// Absolute to-value given as text, e.g. a setting name or word
    #[must_use]
    pub fn to_text(mut self, value: impl Into<String>) -> Self {
        self.tx.to_absolute = flag_text(true);
        self.tx.to_value = value.into();
        self
    }

    #[must_use]
    pub fn recurrence(mut self, recurrence: impl Into<String>) -> Self {
        self.tx.recurrence = recurrence.into();
        self
    }

    /// Exclusive stop date or trigger
    #[must_use]
    pub fn stop(mut self, stop: impl Into<String>) -> Self {
        self.tx.stop_date = stop.into();
        self
    }

    pub fn build(self) -> Transaction {
        self.tx
    }
}
