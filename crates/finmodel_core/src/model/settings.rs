//! Names of settings the engine and chart layer read
//!
//! Settings live in the model like any other item; these are the ones with
//! a fixed meaning.

/// Annual CPI, in percent
pub const CPI: &str = "cpi";
/// Start of the range of interest
pub const ROI_START: &str = "Beginning of view range";
/// End of the range of interest
pub const ROI_END: &str = "End of view range";

pub const VIEW_FREQUENCY: &str = "View frequency";
pub const VIEW_DETAIL: &str = "View detail";
pub const ASSET_CHART_FOCUS: &str = "Focus of assets chart";
pub const DEBT_CHART_FOCUS: &str = "Focus of debts chart";
pub const INCOME_CHART_FOCUS: &str = "Focus of incomes chart";
pub const EXPENSE_CHART_FOCUS: &str = "Focus of expenses chart";
pub const ASSET_CHART_VIEW: &str = "Type of view for asset chart";
pub const DEBT_CHART_VIEW: &str = "Type of view for debt chart";
pub const TAX_CHART_FOCUS_PERSON: &str = "Focus of tax chart";
pub const TAX_CHART_FOCUS_TYPE: &str = "Type of taxable item";
pub const TAX_CHART_SHOW_NET: &str = "Show net in tax chart";

/// Focus value selecting every item
pub const ALL_ITEMS: &str = "All";

/// The asset incomes are paid into, expenses are paid from and tax is
/// settled from
pub const CASH_ASSET: &str = "Cash";

/// Kind of a setting row
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SettingKind {
    View,
    Const,
    Adjustable,
    Custom,
}

impl SettingKind {
    /// Empty text is treated as `custom`.
    pub fn parse(text: &str) -> Option<SettingKind> {
        match text.trim() {
            "view" => Some(SettingKind::View),
            "const" => Some(SettingKind::Const),
            "adjustable" => Some(SettingKind::Adjustable),
            "custom" | "" => Some(SettingKind::Custom),
            _ => None,
        }
    }
}
