//! Model input as authored
//!
//! Every field is kept as the string the author typed, the same shape the
//! storage layer and the validator work with. `convert::parse_model` turns
//! this into typed expressions once, before evaluation starts.

use serde::{Deserialize, Serialize};

/// The schema version this engine evaluates. Older models are upgraded by
/// the caller before they get here.
pub const CURRENT_SCHEMA_VERSION: u32 = 2;

fn current_version() -> u32 {
    CURRENT_SCHEMA_VERSION
}

/// Complete description of a household's finances
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelData {
    #[serde(default = "current_version")]
    pub version: u32,
    #[serde(default)]
    pub triggers: Vec<Trigger>,
    #[serde(default)]
    pub expenses: Vec<Expense>,
    #[serde(default)]
    pub incomes: Vec<Income>,
    #[serde(default)]
    pub assets: Vec<Asset>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub settings: Vec<Setting>,
}

impl Default for ModelData {
    fn default() -> Self {
        Self {
            version: CURRENT_SCHEMA_VERSION,
            triggers: Vec::new(),
            expenses: Vec::new(),
            incomes: Vec::new(),
            assets: Vec::new(),
            transactions: Vec::new(),
            settings: Vec::new(),
        }
    }
}

impl ModelData {
    pub fn setting(&self, name: &str) -> Option<&Setting> {
        self.settings.iter().find(|s| s.name == name)
    }
}

/// A named date other fields can refer to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trigger {
    pub name: String,
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Setting {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub hint: String,
    /// One of `view`, `const`, `adjustable`, `custom`
    #[serde(rename = "type", default)]
    pub kind: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub name: String,
    #[serde(default)]
    pub category: String,
    pub start: String,
    pub value: String,
    /// Non-empty marks the asset as quantized; `value` is then a unit price
    #[serde(default)]
    pub quantity: String,
    #[serde(default)]
    pub growth: String,
    #[serde(default)]
    pub cpi_immune: String,
    #[serde(default)]
    pub can_be_negative: String,
    #[serde(default)]
    pub is_a_debt: String,
    #[serde(default)]
    pub liability: String,
    #[serde(default)]
    pub purchase_price: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Income {
    pub name: String,
    #[serde(default)]
    pub category: String,
    pub start: String,
    #[serde(default)]
    pub end: String,
    pub value: String,
    #[serde(default)]
    pub value_set: String,
    #[serde(default)]
    pub growth: String,
    #[serde(default)]
    pub cpi_immune: String,
    pub recurrence: String,
    #[serde(default)]
    pub liability: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub name: String,
    #[serde(default)]
    pub category: String,
    pub start: String,
    #[serde(default)]
    pub end: String,
    pub value: String,
    #[serde(default)]
    pub value_set: String,
    #[serde(default)]
    pub growth: String,
    #[serde(default)]
    pub cpi_immune: String,
    pub recurrence: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub name: String,
    #[serde(default)]
    pub category: String,
    pub date: String,
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub from_absolute: String,
    #[serde(default)]
    pub from_value: String,
    #[serde(default)]
    pub to: String,
    #[serde(default)]
    pub to_absolute: String,
    #[serde(default)]
    pub to_value: String,
    #[serde(default)]
    pub stop_date: String,
    #[serde(default)]
    pub recurrence: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}
