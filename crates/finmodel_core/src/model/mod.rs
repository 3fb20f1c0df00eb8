mod data;
mod evaluation;
mod expr;
mod items;
mod liability;
pub mod settings;
mod tax_table;

pub use data::{
    Asset, CURRENT_SCHEMA_VERSION, Expense, Income, ModelData, Setting, Transaction, Trigger,
};
pub use evaluation::{
    Evaluation, SOURCE_GROWTH, SOURCE_START, SOURCE_TAX, TaxLineKind, cgt_name,
    income_tax_name, net_gain_name, net_income_name, ni_name, parse_tax_line,
};
pub use expr::{
    BOND_MARKER_PREFIX, CPI_TOKEN, DateExpr, DateOffset, ValueExpr, parse_flag, parse_literal_date,
    parse_number,
};
pub use items::{
    FlowKind, ParsedAsset, ParsedFlow, ParsedModel, ParsedSetting, ParsedTransaction,
    ParsedTrigger, TransactionSide, TransactionType,
};
pub use liability::{Liability, TaxKind};
pub use settings::SettingKind;
pub use tax_table::{ALLOWANCE_TAPER_THRESHOLD, TaxTable, TaxYearRates};
