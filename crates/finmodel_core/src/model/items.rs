//! Typed model items, produced once from `ModelData` by `convert`

use std::fmt;

use serde::{Deserialize, Serialize};

use super::expr::{DateExpr, ValueExpr};
use super::liability::Liability;
use super::settings::SettingKind;
use crate::recurrence::Recurrence;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedTrigger {
    pub name: String,
    pub date: DateExpr,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedSetting {
    pub name: String,
    pub value: ValueExpr,
    pub kind: SettingKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedAsset {
    pub name: String,
    pub category: String,
    pub start: DateExpr,
    /// Total value, or the unit price when `quantity` is set
    pub value: ValueExpr,
    pub quantity: Option<f64>,
    pub growth: Option<ValueExpr>,
    pub cpi_immune: bool,
    pub can_be_negative: bool,
    pub is_a_debt: bool,
    pub liability: Liability,
    pub purchase_price: Option<ValueExpr>,
}

impl ParsedAsset {
    pub fn is_quantized(&self) -> bool {
        self.quantity.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowKind {
    Income,
    Expense,
}

/// An income or an expense: a recurring payment into or out of cash
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedFlow {
    pub kind: FlowKind,
    pub name: String,
    pub category: String,
    pub start: DateExpr,
    pub end: Option<DateExpr>,
    pub value: ValueExpr,
    /// Date `value` applies at; defaults to `start`
    pub value_set: Option<DateExpr>,
    pub growth: Option<ValueExpr>,
    pub cpi_immune: bool,
    pub recurrence: Recurrence,
    pub liability: Liability,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    Custom,
    PayOffDebt,
    RevalueAsset,
    RevalueDebt,
    RevalueExpense,
    RevalueIncome,
    RevalueSetting,
    LiquidateAsset,
    BondInvest,
    BondMature,
    Auto,
}

impl TransactionType {
    /// Empty text is a custom transaction.
    pub fn parse(text: &str) -> Option<TransactionType> {
        match text.trim() {
            "custom" | "" => Some(TransactionType::Custom),
            "payOffDebt" => Some(TransactionType::PayOffDebt),
            "revalueAsset" => Some(TransactionType::RevalueAsset),
            "revalueDebt" => Some(TransactionType::RevalueDebt),
            "revalueExp" => Some(TransactionType::RevalueExpense),
            "revalueInc" => Some(TransactionType::RevalueIncome),
            "revalueSetting" => Some(TransactionType::RevalueSetting),
            "liquidateAsset" => Some(TransactionType::LiquidateAsset),
            "bondInvest" => Some(TransactionType::BondInvest),
            "bondMature" => Some(TransactionType::BondMature),
            "auto" => Some(TransactionType::Auto),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TransactionType::Custom => "custom",
            TransactionType::PayOffDebt => "payOffDebt",
            TransactionType::RevalueAsset => "revalueAsset",
            TransactionType::RevalueDebt => "revalueDebt",
            TransactionType::RevalueExpense => "revalueExp",
            TransactionType::RevalueIncome => "revalueInc",
            TransactionType::RevalueSetting => "revalueSetting",
            TransactionType::LiquidateAsset => "liquidateAsset",
            TransactionType::BondInvest => "bondInvest",
            TransactionType::BondMature => "bondMature",
            TransactionType::Auto => "auto",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One side of a transaction. `absolute` amounts are money (or units for a
/// quantized asset); proportional amounts are fractions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionSide {
    /// `None` is the world outside the model
    pub item: Option<String>,
    pub absolute: bool,
    pub value: Option<ValueExpr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedTransaction {
    pub name: String,
    pub category: String,
    pub date: DateExpr,
    pub from: TransactionSide,
    pub to: TransactionSide,
    pub stop_date: Option<DateExpr>,
    pub recurrence: Option<Recurrence>,
    pub kind: TransactionType,
}

/// A model after the parse boundary
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ParsedModel {
    pub triggers: Vec<ParsedTrigger>,
    pub settings: Vec<ParsedSetting>,
    pub assets: Vec<ParsedAsset>,
    pub incomes: Vec<ParsedFlow>,
    pub expenses: Vec<ParsedFlow>,
    pub transactions: Vec<ParsedTransaction>,
}
