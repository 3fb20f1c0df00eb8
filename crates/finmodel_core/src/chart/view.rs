//! View settings read from the model
//!
//! The chart layer is configured by ordinary settings. Missing settings take
//! their defaults; a setting holding text we do not recognise is an error.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ChartError;
use crate::model::{ModelData, parse_flag, settings};
use crate::recurrence::Recurrence;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ViewFrequency {
    #[default]
    Monthly,
    Annual,
}

impl ViewFrequency {
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_ascii_lowercase().as_str() {
            "monthly" | "month" | "1m" => Some(ViewFrequency::Monthly),
            "annual" | "annually" | "yearly" | "year" | "1y" => Some(ViewFrequency::Annual),
            _ => None,
        }
    }

    pub fn step(self) -> Recurrence {
        match self {
            ViewFrequency::Monthly => Recurrence::MONTHLY,
            ViewFrequency::Annual => Recurrence::YEARLY,
        }
    }
}

impl fmt::Display for ViewFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewFrequency::Monthly => f.write_str("monthly"),
            ViewFrequency::Annual => f.write_str("annual"),
        }
    }
}

/// Fine shows each item; coarse sums items by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ViewDetail {
    #[default]
    Fine,
    Coarse,
}

impl ViewDetail {
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_ascii_lowercase().as_str() {
            "fine" | "detailed" => Some(ViewDetail::Fine),
            "coarse" | "categorised" | "categorized" => Some(ViewDetail::Coarse),
            _ => None,
        }
    }
}

impl fmt::Display for ViewDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewDetail::Fine => f.write_str("fine"),
            ViewDetail::Coarse => f.write_str("coarse"),
        }
    }
}

/// How asset and debt series are drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AssetChartMode {
    /// Value at each period boundary
    #[default]
    Value,
    /// Increases over each period
    Additions,
    /// Decreases over each period, as negative numbers
    Reductions,
    /// Net change over each period
    Deltas,
}

impl AssetChartMode {
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim() {
            "val" | "" => Some(AssetChartMode::Value),
            "+" => Some(AssetChartMode::Additions),
            "-" => Some(AssetChartMode::Reductions),
            "+-" => Some(AssetChartMode::Deltas),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TaxTypeFocus {
    Income,
    Gain,
    #[default]
    All,
}

impl TaxTypeFocus {
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_ascii_lowercase().as_str() {
            "income" => Some(TaxTypeFocus::Income),
            "gain" => Some(TaxTypeFocus::Gain),
            "all" | "" => Some(TaxTypeFocus::All),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewSettings {
    pub frequency: ViewFrequency,
    pub detail: ViewDetail,
    pub asset_focus: String,
    pub debt_focus: String,
    pub income_focus: String,
    pub expense_focus: String,
    pub asset_mode: AssetChartMode,
    pub debt_mode: AssetChartMode,
    pub tax_person: String,
    pub tax_type: TaxTypeFocus,
    pub show_net: bool,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            frequency: ViewFrequency::default(),
            detail: ViewDetail::default(),
            asset_focus: settings::ALL_ITEMS.to_string(),
            debt_focus: settings::ALL_ITEMS.to_string(),
            income_focus: settings::ALL_ITEMS.to_string(),
            expense_focus: settings::ALL_ITEMS.to_string(),
            asset_mode: AssetChartMode::default(),
            debt_mode: AssetChartMode::default(),
            tax_person: settings::ALL_ITEMS.to_string(),
            tax_type: TaxTypeFocus::default(),
            show_net: true,
        }
    }
}

impl ViewSettings {
    /// Read the view settings of a model, falling back to defaults for
    /// any that are missing or empty.
    pub fn from_model(model: &ModelData) -> Result<Self, ChartError> {
        let text = |name: &str| {
            model
                .setting(name)
                .map(|s| s.value.trim())
                .filter(|v| !v.is_empty())
        };
        let invalid = |name: &str, value: &str| ChartError::InvalidViewSetting {
            setting: name.to_string(),
            value: value.to_string(),
        };
        fn read<T>(
            value: Option<&str>,
            name: &str,
            default: T,
            parse: impl Fn(&str) -> Option<T>,
            invalid: impl Fn(&str, &str) -> ChartError,
        ) -> Result<T, ChartError> {
            match value {
                Some(v) => parse(v).ok_or_else(|| invalid(name, v)),
                None => Ok(default),
            }
        }

        let defaults = ViewSettings::default();
        let focus = |name: &str| {
            text(name).map_or_else(|| settings::ALL_ITEMS.to_string(), str::to_string)
        };

        Ok(ViewSettings {
            frequency: read(
                text(settings::VIEW_FREQUENCY),
                settings::VIEW_FREQUENCY,
                defaults.frequency,
                ViewFrequency::parse,
                invalid,
            )?,
            detail: read(
                text(settings::VIEW_DETAIL),
                settings::VIEW_DETAIL,
                defaults.detail,
                ViewDetail::parse,
                invalid,
            )?,
            asset_focus: focus(settings::ASSET_CHART_FOCUS),
            debt_focus: focus(settings::DEBT_CHART_FOCUS),
            income_focus: focus(settings::INCOME_CHART_FOCUS),
            expense_focus: focus(settings::EXPENSE_CHART_FOCUS),
            asset_mode: read(
                text(settings::ASSET_CHART_VIEW),
                settings::ASSET_CHART_VIEW,
                defaults.asset_mode,
                AssetChartMode::parse,
                invalid,
            )?,
            debt_mode: read(
                text(settings::DEBT_CHART_VIEW),
                settings::DEBT_CHART_VIEW,
                defaults.debt_mode,
                AssetChartMode::parse,
                invalid,
            )?,
            tax_person: focus(settings::TAX_CHART_FOCUS_PERSON),
            tax_type: read(
                text(settings::TAX_CHART_FOCUS_TYPE),
                settings::TAX_CHART_FOCUS_TYPE,
                defaults.tax_type,
                TaxTypeFocus::parse,
                invalid,
            )?,
            show_net: text(settings::TAX_CHART_SHOW_NET).map_or(defaults.show_net, parse_flag),
        })
    }
}

/// Whether an item passes a focus filter of `All`, its category or its name
pub fn in_focus(focus: &str, name: &str, category: &str) -> bool {
    focus == settings::ALL_ITEMS || focus == name || (!category.is_empty() && focus == category)
}
