//! Asset Builder DSL

use super::{flag_text, number_text};
use crate::model::Asset;

/// Builder for an asset or debt
#[derive(Debug, Clone)]
pub struct AssetBuilder {
    asset: Asset,
}

impl AssetBuilder {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            asset: Asset {
                name: name.into(),
                cpi_immune: flag_text(false),
                can_be_negative: flag_text(false),
                is_a_debt: flag_text(false),
                ..Default::default()
            },
        }
    }

    /// A debt; `balance` is the amount owed, as a positive number
    #[must_use]
    pub fn debt(name: impl Into<String>, balance: f64) -> Self {
        let mut builder = Self::new(name).value(balance).cpi_immune();
        builder.asset.is_a_debt = flag_text(true);
        builder.asset.can_be_negative = flag_text(true);
        builder
    }

    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.asset.category = category.into();
        self
    }

    /// Start date or trigger
    #[must_use]
    pub fn start(mut self, start: impl Into<String>) -> Self {
        self.asset.start = start.into();
        self
    }

    /// Opening value (the unit price when `quantity` is set)
    #[must_use]
    pub fn value(mut self, value: f64) -> Self {
        self.asset.value = number_text(value);
        self
    }

    /// Opening value as text, e.g. a setting name
    #[must_use]
    pub fn value_text(mut self, value: impl Into<String>) -> Self {
        self.asset.value = value.into();
        self
    }

    #[must_use]
    pub fn quantity(mut self, units: f64) -> Self {
        self.asset.quantity = number_text(units);
        self
    }

    /// Annual growth in percent
    #[must_use]
    pub fn growth(mut self, percent: f64) -> Self {
        self.asset.growth = number_text(percent);
        self
    }

    #[must_use]
    pub fn growth_text(mut self, growth: impl Into<String>) -> Self {
        self.asset.growth = growth.into();
        self
    }

    #[must_use]
    pub fn cpi_immune(mut self) -> Self {
        self.asset.cpi_immune = flag_text(true);
        self
    }

    #[must_use]
    pub fn can_be_negative(mut self) -> Self {
        self.asset.can_be_negative = flag_text(true);
        self
    }

    /// e.g. `"Joe(CGT)"`
    #[must_use]
    pub fn liability(mut self, liability: impl Into<String>) -> Self {
        self.asset.liability = liability.into();
        self
    }

    #[must_use]
    pub fn purchase_price(mut self, price: f64) -> Self {
        self.asset.purchase_price = number_text(price);
        self
    }

    #[must_use]
    pub fn purchase_price_text(mut self, price: impl Into<String>) -> Self {
        self.asset.purchase_price = price.into();
        self
    }

    pub fn build(self) -> Asset {
        self.asset
    }
}
